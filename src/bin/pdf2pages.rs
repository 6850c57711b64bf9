//! CLI binary for pdf2pages.
//!
//! A thin shim over the library crate that maps CLI flags to `PrepConfig`
//! and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2pages::{
    inspect, process, InspectOptions, Margins, PageSelection, PrepConfig, PrepProgressCallback,
    ProgressCallback, SegmentStrategy,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
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
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-page log
/// lines using [indicatif]. Pages arrive strictly in order.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Count of pages that errored out.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically
    /// by `on_run_start` (called before any pages are processed).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Cropping");
        self.bar.reset_eta();
    }
}

impl PrepProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, written: usize, blank: usize) {
        let detail = if blank > 0 {
            format!("{written} written, {blank} blank")
        } else {
            format!("{written} written")
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&detail),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            let head: String = error.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_pages: usize, success_count: usize) {
        let failed = total_pages.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} pages processed successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages processed  ({} failed)",
                if failed == total_pages {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_pages,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Adaptive cropping (default): split spreads, crop content, skip blanks
  pdf2pages manuscript.pdf out/

  # Fixed margins: trim a viewer header/footer from a screen capture
  pdf2pages --strategy margins --top 280 --bottom 140 capture.pdf out/

  # Higher resolution for small handwriting
  pdf2pages --zoom 3.5 manuscript.pdf out/

  # Specific pages, keeping the raw renders for inspection
  pdf2pages --pages 10-42 --keep-rendered manuscript.pdf out/

  # Check whether the PDF has a usable text layer (no rendering)
  pdf2pages --inspect-only manuscript.pdf out/

  # Machine-readable run report
  pdf2pages --json manuscript.pdf out/ > report.json

OUTPUT LAYOUT:
  out/cropped/page-001.png      single page
  out/cropped/page-014L.png     left half of a split spread
  out/cropped/page-014R.png     right half of a split spread
  out/rendered/page-001.png     raw render (only with --keep-rendered)

  Stale page-*.png files in these directories are removed before each run.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to an existing libpdfium shared library

SETUP:
  pdfium is loaded from next to the executable or from the system library
  path. On most distributions: install the pdfium package, or drop
  libpdfium.so beside the pdf2pages binary.
"#;

/// Convert scanned PDF manuscripts into cropped page images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2pages",
    version,
    about = "Convert scanned PDF manuscripts into cropped page images",
    long_about = "Render each page of a scanned PDF and crop it for downstream transcription. \
Two strategies are available: fixed pixel margins (viewer chrome) or adaptive content \
detection with double-page-spread splitting and blank-page removal.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the input PDF file.
    input: PathBuf,

    /// Output directory (will contain 'cropped' and optionally 'rendered').
    out_dir: PathBuf,

    /// Zoom factor for rendering (0.5–8.0).
    #[arg(long, env = "PDF2PAGES_ZOOM", default_value_t = 2.0)]
    zoom: f32,

    /// Segmentation strategy.
    #[arg(long, env = "PDF2PAGES_STRATEGY", value_enum, default_value = "adaptive")]
    strategy: StrategyArg,

    /// Pixels to remove from the top (margins strategy).
    #[arg(long, default_value_t = 280)]
    top: u32,

    /// Pixels to remove from the bottom (margins strategy).
    #[arg(long, default_value_t = 140)]
    bottom: u32,

    /// Pixels to remove from the left (margins strategy).
    #[arg(long, default_value_t = 0)]
    left: u32,

    /// Pixels to remove from the right (margins strategy).
    #[arg(long, default_value_t = 0)]
    right: u32,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDF2PAGES_PAGES", default_value = "all")]
    pages: String,

    /// Keep intermediate rendered images in <out_dir>/rendered.
    #[arg(long, env = "PDF2PAGES_KEEP_RENDERED")]
    keep_rendered: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2PAGES_PASSWORD")]
    password: Option<String>,

    /// Print document metadata and a text-layer sample, no rendering.
    #[arg(long)]
    inspect_only: bool,

    /// Pages to sample in --inspect-only mode (1-based, comma-separated).
    #[arg(long, default_value = "1,2,3,14")]
    sample_pages: String,

    /// Characters of extracted text to print per sampled page.
    #[arg(long, default_value_t = 800)]
    preview_chars: usize,

    /// Output a structured JSON report instead of human-readable text.
    #[arg(long, env = "PDF2PAGES_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2PAGES_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PAGES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2PAGES_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Margins,
    Adaptive,
}

impl From<StrategyArg> for SegmentStrategy {
    fn from(v: StrategyArg) -> Self {
        match v {
            StrategyArg::Margins => SegmentStrategy::Margins,
            StrategyArg::Adaptive => SegmentStrategy::Adaptive,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let options = InspectOptions {
            sample_pages: parse_page_list(&cli.sample_pages)?,
            preview_chars: cli.preview_chars,
            password: cli.password.clone(),
        };
        let report = inspect(&cli.input, &options)
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
        } else {
            let meta = &report.metadata;
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            for sample in &report.samples {
                println!(
                    "\n--- page {} text chars: {} ---",
                    sample.page_num, sample.chars
                );
                if !sample.preview.is_empty() {
                    println!("{}", sample.preview);
                }
            }
            println!(
                "\n{}",
                if report.is_image_only() {
                    "No text layer found: manuscript is image-only."
                } else {
                    "Text layer present on at least one sampled page."
                }
            );
        }
        return Ok(());
    }

    // ── Build config and run ─────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn PrepProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    let output = process(&cli.input, &cli.out_dir, &config)
        .await
        .context("Run failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        let cropped = cli.out_dir.join("cropped");
        eprintln!(
            "{}  {}/{} pages  →  {} images in {}  ({}ms)",
            if output.stats.failed_pages == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            output.stats.processed_pages,
            output.pages.len(),
            bold(&output.stats.written_images.to_string()),
            bold(&cropped.display().to_string()),
            output.stats.total_duration_ms,
        );
        if output.stats.blank_segments > 0 {
            eprintln!(
                "   {}",
                dim(&format!(
                    "{} blank sub-images skipped",
                    output.stats.blank_segments
                ))
            );
        }
    }

    Ok(())
}

/// Map CLI args to `PrepConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PrepConfig> {
    let pages = parse_pages(&cli.pages)?;

    let mut builder = PrepConfig::builder()
        .zoom(cli.zoom)
        .strategy(cli.strategy.into())
        .margins(Margins::new(cli.top, cli.bottom, cli.left, cli.right))
        .pages(pages)
        .keep_rendered(cli.keep_rendered);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start.trim().parse().context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!("Invalid page range '{}-{}': start must be <= end", start, end);
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        return Ok(PageSelection::Set(parse_page_list(&s)?));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}

/// Parse a comma-separated list of 1-based page numbers.
fn parse_page_list(s: &str) -> Result<Vec<usize>> {
    let pages: Vec<usize> = s
        .split(',')
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            p.trim()
                .parse::<usize>()
                .context(format!("Invalid page number: '{}'", p.trim()))
        })
        .collect::<Result<Vec<_>>>()?;

    for &p in &pages {
        if p < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
        }
    }

    Ok(pages)
}
