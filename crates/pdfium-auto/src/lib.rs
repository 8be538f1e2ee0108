//! # pdfium-auto
//!
//! Finds a usable [PDFium](https://pdfium.googlesource.com/pdfium/) shared
//! library for `pdfium-render`, downloading and caching a pinned build the
//! first time one is needed.
//!
//! Resolution order, first hit wins:
//!
//! 1. `PDFIUM_LIB_PATH` pointing at an existing library file.
//! 2. The per-version cache directory (see [`cache_dir`]).
//! 3. A fresh download from
//!    [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries),
//!    unpacked into the cache directory. Only [`ensure_library`] and
//!    [`bind_or_download`] go to the network; [`locate`] never does.
//!
//! ```rust,no_run
//! let library = pdfium_auto::ensure_library(None).expect("pdfium unavailable");
//! let pdfium = pdfium_auto::bind(&library.path).expect("bind failed");
//! ```
//!
//! ## Environment variables
//!
//! - `PDFIUM_LIB_PATH` — use this library file, skip the cache.
//! - `PDFIUM_AUTO_CACHE_DIR` — root of the cache instead of the platform
//!   cache directory.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pdfium_render::prelude::Pdfium;
use thiserror::Error;
use tracing::{debug, info, warn};

/// pdfium-binaries release tag (`chromium/<VERSION>`) fetched on download.
pub const PDFIUM_VERSION: &str = "7690";

const RELEASES_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

/// Directory name under the platform cache root.
const CACHE_NAMESPACE: &str = "dossier-split";

/// Progress hook: `(bytes_so_far, total_bytes_if_known)`.
pub type DownloadProgress<'a> = &'a dyn Fn(u64, Option<u64>);

#[derive(Error, Debug)]
pub enum PdfiumAutoError {
    #[error("No PDFium build is published for {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Cannot prepare cache directory '{path}': {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDFium download failed: {0}")]
    Download(String),

    #[error("PDFium archive could not be unpacked: {0}")]
    Extract(String),

    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },
}

/// Where a resolved library came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryOrigin {
    /// `PDFIUM_LIB_PATH`.
    Environment,
    /// Already present in [`cache_dir`].
    Cache,
    /// Fetched during this call.
    Download,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedLibrary {
    pub path: PathBuf,
    pub origin: LibraryOrigin,
}

/// Release asset and library layout for one OS/arch pair.
#[derive(Debug, Clone, Copy)]
struct Platform {
    asset: &'static str,
    member: &'static str,
    file_name: &'static str,
}

impl Platform {
    fn current() -> Result<Self, PdfiumAutoError> {
        Self::for_target(std::env::consts::OS, std::env::consts::ARCH)
    }

    fn for_target(os: &str, arch: &str) -> Result<Self, PdfiumAutoError> {
        let (asset, member, file_name) = match (os, arch) {
            ("linux", "x86_64") => ("pdfium-linux-x64.tgz", "lib/libpdfium.so", "libpdfium.so"),
            ("linux", "aarch64") => ("pdfium-linux-arm64.tgz", "lib/libpdfium.so", "libpdfium.so"),
            ("macos", "x86_64") => ("pdfium-mac-x64.tgz", "lib/libpdfium.dylib", "libpdfium.dylib"),
            ("macos", "aarch64") => ("pdfium-mac-arm64.tgz", "lib/libpdfium.dylib", "libpdfium.dylib"),
            ("windows", "x86_64") => ("pdfium-win-x64.tgz", "bin/pdfium.dll", "pdfium.dll"),
            ("windows", "aarch64") => ("pdfium-win-arm64.tgz", "bin/pdfium.dll", "pdfium.dll"),
            ("windows", "x86") => ("pdfium-win-x86.tgz", "bin/pdfium.dll", "pdfium.dll"),
            _ => {
                return Err(PdfiumAutoError::UnsupportedPlatform {
                    os: os.to_string(),
                    arch: arch.to_string(),
                })
            }
        };
        Ok(Self {
            asset,
            member,
            file_name,
        })
    }

    fn download_url(&self) -> String {
        format!("{RELEASES_URL}/chromium%2F{PDFIUM_VERSION}/{}", self.asset)
    }
}

/// Per-version cache directory for the library.
///
/// `<cache root>/dossier-split/pdfium-<VERSION>/`, where the root is
/// `PDFIUM_AUTO_CACHE_DIR` when set, else the platform cache directory
/// (`~/.cache` on Linux, `~/Library/Caches` on macOS, `%LOCALAPPDATA%`
/// on Windows).
pub fn cache_dir() -> PathBuf {
    let root = match std::env::var_os("PDFIUM_AUTO_CACHE_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .unwrap_or_else(std::env::temp_dir),
    };
    versioned_dir(&root)
}

fn versioned_dir(root: &Path) -> PathBuf {
    root.join(CACHE_NAMESPACE)
        .join(format!("pdfium-{PDFIUM_VERSION}"))
}

static RESOLVED: OnceLock<LocatedLibrary> = OnceLock::new();

/// Resolve the library from the environment or the cache, without network.
pub fn locate() -> Option<LocatedLibrary> {
    if let Some(found) = RESOLVED.get() {
        return Some(found.clone());
    }

    if let Some(path) = std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from) {
        if path.is_file() {
            return Some(LocatedLibrary {
                path,
                origin: LibraryOrigin::Environment,
            });
        }
        warn!(
            "PDFIUM_LIB_PATH '{}' does not exist; ignoring it",
            path.display()
        );
    }

    let platform = Platform::current().ok()?;
    let cached = cache_dir().join(platform.file_name);
    cached.is_file().then_some(LocatedLibrary {
        path: cached,
        origin: LibraryOrigin::Cache,
    })
}

/// Resolve the library, downloading it into the cache when absent.
///
/// The download happens at most once per process; later calls return the
/// remembered location.
pub fn ensure_library(
    on_progress: Option<DownloadProgress<'_>>,
) -> Result<LocatedLibrary, PdfiumAutoError> {
    if let Some(found) = locate() {
        debug!("Using PDFium at {} ({:?})", found.path.display(), found.origin);
        let _ = RESOLVED.set(found.clone());
        return Ok(found);
    }

    let platform = Platform::current()?;
    let dir = cache_dir();
    std::fs::create_dir_all(&dir).map_err(|source| PdfiumAutoError::CacheDir {
        path: dir.clone(),
        source,
    })?;

    let url = platform.download_url();
    info!("Downloading PDFium {} from {}", PDFIUM_VERSION, url);
    let archive = fetch(&url, on_progress)?;

    let target = dir.join(platform.file_name);
    unpack_member(&archive, platform.member, &target)?;
    info!("PDFium cached at {}", target.display());

    let found = LocatedLibrary {
        path: target,
        origin: LibraryOrigin::Download,
    };
    let _ = RESOLVED.set(found.clone());
    Ok(found)
}

/// Bind the library at `path`.
pub fn bind(path: &Path) -> Result<Pdfium, PdfiumAutoError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| PdfiumAutoError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// [`ensure_library`] followed by [`bind`].
pub fn bind_or_download(
    on_progress: Option<DownloadProgress<'_>>,
) -> Result<Pdfium, PdfiumAutoError> {
    let library = ensure_library(on_progress)?;
    bind(&library.path)
}

fn fetch(url: &str, on_progress: Option<DownloadProgress<'_>>) -> Result<Vec<u8>, PdfiumAutoError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pdfium-auto/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| PdfiumAutoError::Download(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| PdfiumAutoError::Download(format!("GET {url}: {e}")))?;
    if !response.status().is_success() {
        return Err(PdfiumAutoError::Download(format!(
            "HTTP {} for {url}",
            response.status()
        )));
    }

    let total = response.content_length();
    let mut body = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut chunk = [0u8; 64 * 1024];
    loop {
        let n = match response.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(PdfiumAutoError::Download(format!("read error: {e}"))),
        };
        body.extend_from_slice(&chunk[..n]);
        if let Some(report) = on_progress {
            report(body.len() as u64, total);
        }
    }
    Ok(body)
}

/// Copy the archive member named `member` out of a `.tgz` into `target`.
fn unpack_member(archive: &[u8], member: &str, target: &Path) -> Result<(), PdfiumAutoError> {
    let extract_err = |e: std::io::Error| PdfiumAutoError::Extract(e.to_string());

    let mut tarball = tar::Archive::new(flate2::read::GzDecoder::new(archive));
    for entry in tarball.entries().map_err(extract_err)? {
        let mut entry = entry.map_err(extract_err)?;
        let is_member = entry.path().map_err(extract_err)?.to_string_lossy() == member;
        if is_member {
            entry.unpack(target).map_err(extract_err)?;
            return Ok(());
        }
    }
    Err(PdfiumAutoError::Extract(format!(
        "'{member}' is missing from the archive"
    )))
}
