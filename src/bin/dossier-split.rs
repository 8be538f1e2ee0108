//! CLI binary for dossier-split.
//!
//! A thin shim over the library crate: maps flags to `SplitConfig`, makes
//! sure a pdfium library is available, runs the split and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dossier_split::{
    page_titles, split_bytes_to_zip_async, split_to_dir_async, PageGroup, PdfSource, SplitConfig,
    SplitFile, SplitProgressCallback, SplitSummary,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn blue(s: &str) -> String {
    format!("\x1b[34m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Prints one line per created file above a progress bar counting groups.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Reading");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl SplitProgressCallback for CliProgressCallback {
    fn on_document_loaded(&self, total_pages: usize) {
        self.bar.println(green(&format!("Pages: {total_pages}")));
        self.bar.set_message("Detecting documents…");
    }

    fn on_groups_detected(&self, groups: &[PageGroup]) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        self.bar.set_length(groups.len() as u64);
        self.bar.set_prefix("Exporting");
    }

    fn on_group_exported(&self, _index: usize, _total: usize, filename: &str, group: &PageGroup) {
        let (first, last) = group.display_range();
        self.bar.println(format!(
            "  {} {}  {}",
            yellow("Created:"),
            filename,
            dim(&format!(
                "(pages {first}-{last}, {} page(s))",
                group.num_pages()
            )),
        ));
        self.bar.inc(1);
    }

    fn on_split_complete(&self, _total_files: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Split next to the source: ./DossierFacile_extracted/01-….pdf
  dossier-split split DossierFacile.pdf

  # Choose the output directory (created if missing)
  dossier-split split DossierFacile.pdf -o ~/dossier/pieces

  # One ZIP instead of loose files
  dossier-split split DossierFacile.pdf --zip

  # Machine-readable summary
  dossier-split split DossierFacile.pdf --json

ENVIRONMENT VARIABLES:
  DOSSIER_SPLIT_OUTPUT    Default output directory
  DOSSIER_SPLIT_PASSWORD  Password of an encrypted export
  PDFIUM_LIB_PATH         Path to an existing libpdfium — skips auto-download
  PDFIUM_AUTO_CACHE_DIR   Override the default pdfium cache directory
  RUST_LOG                Log filter (overrides -v / -q)

PDFium (~30 MB) is downloaded automatically on first run and cached in
~/.cache/dossier-split/pdfium-7690/.
"#;

/// Split a DossierFacile PDF export into one PDF per supporting document.
#[derive(Parser, Debug)]
#[command(
    name = "dossier-split",
    version,
    about = "Split a DossierFacile PDF export into one PDF per supporting document",
    long_about = "Cuts the global PDF exported by DossierFacile into individual PDF files \
(one per supporting document), so each one can be uploaded separately to letting platforms. \
Pages are grouped by the document label printed on each page.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOSSIER_SPLIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOSSIER_SPLIT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split the PDF into one file per detected document.
    Split(SplitArgs),

    /// Print the detected title of every page.
    #[command(hide = true)]
    Titles(SourceArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// DossierFacile PDF to process.
    pdf: PathBuf,

    /// Password of an encrypted export.
    #[arg(long, env = "DOSSIER_SPLIT_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct SplitArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output directory (created if missing). Default: <pdf>_extracted.
    #[arg(short, long, env = "DOSSIER_SPLIT_OUTPUT")]
    output_dir: Option<PathBuf>,

    /// Write a single ZIP archive instead of loose PDF files.
    #[arg(long, conflicts_with = "json")]
    zip: bool,

    /// Print a JSON summary of the created files on stdout.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "DOSSIER_SPLIT_NO_PROGRESS")]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", red("Error:"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Split(args) => {
            // Fail on a bad path before fetching the PDF engine.
            PdfSource::from_path(&args.source.pdf)?;
            ensure_pdfium(cli.quiet)?;
            if args.zip {
                split_zip(args, cli.quiet).await
            } else {
                split_files(args, cli.quiet).await
            }
        }
        Command::Titles(args) => {
            let source = PdfSource::from_path(&args.pdf)?;
            ensure_pdfium(cli.quiet)?;
            print_titles(args, source, cli.quiet).await
        }
    }
}

/// Make sure a pdfium library is cached, downloading it with a progress bar
/// on first run.
fn ensure_pdfium(quiet: bool) -> Result<()> {
    if pdfium_auto::locate().is_some() {
        return Ok(());
    }

    if quiet {
        tokio::task::block_in_place(|| pdfium_auto::ensure_library(None))
            .context("Failed to download PDFium engine")?;
        return Ok(());
    }

    let dl_bar = ProgressBar::new(0);
    dl_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS),
    );
    dl_bar.set_prefix("PDF engine");
    dl_bar.enable_steady_tick(Duration::from_millis(80));

    let bar = dl_bar.clone();
    tokio::task::block_in_place(|| {
        pdfium_auto::ensure_library(Some(&|downloaded, total| {
            if let Some(t) = total {
                if bar.length() != Some(t) {
                    bar.set_length(t);
                }
            }
            bar.set_position(downloaded);
        }))
    })
    .context("Failed to download PDFium engine")?;

    dl_bar.finish_with_message("ready ✓");
    Ok(())
}

fn build_config(source: &SourceArgs, show_progress: bool) -> Result<SplitConfig> {
    let mut builder = SplitConfig::builder();
    if let Some(ref pwd) = source.password {
        builder = builder.password(pwd.clone());
    }
    if show_progress {
        builder = builder.progress_callback(CliProgressCallback::new());
    }
    builder.build().context("Invalid configuration")
}

async fn split_files(args: SplitArgs, quiet: bool) -> Result<()> {
    let pdf = args.source.pdf.clone();
    let dest = args
        .output_dir
        .clone()
        .unwrap_or_else(|| dossier_split::default_output_dir(&pdf));
    let show_progress = !quiet && !args.json && !args.no_progress;
    let config = build_config(&args.source, show_progress)?;

    if !quiet && !args.json {
        eprintln!("{}", blue(&format!("Reading {}", pdf.display())));
    }

    let results = split_to_dir_async(pdf.clone(), Some(dest.clone()), config)
        .await
        .with_context(|| format!("Failed to split '{}'", pdf.display()))?;

    if args.json {
        let summary = SplitSummary {
            source: pdf.display().to_string(),
            total_pages: results.iter().map(|r| r.group.num_pages()).sum(),
            files: results
                .iter()
                .map(|r| SplitFile {
                    name: r.output_path.display().to_string(),
                    group: r.group.clone(),
                })
                .collect(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
        return Ok(());
    }

    if !quiet {
        if !show_progress {
            for r in &results {
                let (first, last) = r.group.display_range();
                eprintln!(
                    "  {} {}  {}",
                    yellow("Created:"),
                    file_name(&r.output_path),
                    dim(&format!(
                        "(pages {first}-{last}, {} page(s))",
                        r.group.num_pages()
                    )),
                );
            }
        }
        eprintln!(
            "{} {} file(s) in '{}'",
            green("✔ Done:"),
            bold(&results.len().to_string()),
            dest.display()
        );
    }
    Ok(())
}

async fn split_zip(args: SplitArgs, quiet: bool) -> Result<()> {
    let pdf = args.source.pdf.clone();
    let dest = match args.output_dir.clone() {
        Some(dir) => dir,
        None => pdf.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let show_progress = !quiet && !args.no_progress;
    let config = build_config(&args.source, show_progress)?;

    if !quiet {
        eprintln!("{}", blue(&format!("Reading {}", pdf.display())));
    }
    let bytes = tokio::fs::read(&pdf)
        .await
        .with_context(|| format!("Failed to read '{}'", pdf.display()))?;
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let basename = format!("{stem}_extracted");

    let (files, archive) = split_bytes_to_zip_async(bytes, Some(basename), config)
        .await
        .with_context(|| format!("Failed to split '{}'", pdf.display()))?;

    tokio::fs::create_dir_all(&dest)
        .await
        .with_context(|| format!("Failed to create '{}'", dest.display()))?;
    let zip_path = dest.join(&archive.filename);
    tokio::fs::write(&zip_path, &archive.content)
        .await
        .with_context(|| format!("Failed to write '{}'", zip_path.display()))?;

    if !quiet {
        eprintln!("{}", bold(&format!("{:<60} {:>10}", "File", "Size (MB)")));
        for f in &files {
            eprintln!("{:<60} {:>10.2}", f.filename, f.size_mib());
        }
        eprintln!(
            "{} {} file(s) → '{}'",
            green("✔ Done:"),
            bold(&files.len().to_string()),
            zip_path.display()
        );
    }
    Ok(())
}

async fn print_titles(args: SourceArgs, source: PdfSource, quiet: bool) -> Result<()> {
    let config = build_config(&args, false)?;
    if !quiet {
        eprintln!("{}", blue(&format!("Reading {}", args.pdf.display())));
    }

    let titles = tokio::task::spawn_blocking(move || page_titles(&source, &config))
        .await
        .context("Title detection task panicked")?
        .with_context(|| format!("Failed to read '{}'", args.pdf.display()))?;

    let total = titles.len();
    if !quiet {
        eprintln!("{}\n", green(&format!("Pages: {total}")));
    }
    for (i, title) in titles.iter().enumerate() {
        println!("{}", bold(&yellow(&format!("--- Page {}/{} ---", i + 1, total))));
        println!("{title}");
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
