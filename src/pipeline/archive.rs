//! ZIP packaging of exported files.

use crate::error::SplitError;
use crate::output::{ArchiveOutput, NamedFile};
use crate::pipeline::slug;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Pack `files` into a deflated ZIP named after `basename`.
///
/// Entries keep their input order and are stored under their last path
/// component only, so `../x.pdf` or `dir/x.pdf` both land as `x.pdf` at the
/// archive root. Names are not de-duplicated: two files resolving to the
/// same entry name are both written, and readers pick whichever they pick.
pub fn build_zip(
    files: &[NamedFile],
    basename: &str,
    max_slug_len: usize,
) -> Result<ArchiveOutput, SplitError> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for file in files {
        let name = entry_name(&file.filename);
        zip.start_file(name, options)?;
        zip.write_all(&file.content).map_err(|e| SplitError::Archive {
            detail: format!("writing entry '{name}': {e}"),
        })?;
    }

    let content = zip.finish()?.into_inner();
    let filename = slug::archive_filename(basename, max_slug_len);
    debug!("Built {} ({} entries, {} bytes)", filename, files.len(), content.len());

    Ok(ArchiveOutput { filename, content })
}

/// Last meaningful path component of `filename`.
fn entry_name(filename: &str) -> &str {
    filename
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .last()
        .unwrap_or("document.pdf")
}
