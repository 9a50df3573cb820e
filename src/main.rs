use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use tracklist_chapters::fetch::Fetcher;
use tracklist_chapters::parser::layout::Layout;
use tracklist_chapters::parser::timestamp::parse_timestamp;
use tracklist_chapters::settings::Settings;
use tracklist_chapters::{process_page, Chapter, GapPolicy, PipelineOptions, Warning};

#[derive(Parser, Debug)]
#[command(
    name = "tracklist_chapters",
    about = "Extract a 1001tracklists tracklist and write it as FFMETADATA chapter markers"
)]
struct Cli {
    /// URL of the 1001tracklists page to extract
    #[arg(required_unless_present = "html", conflicts_with = "html")]
    url: Option<String>,

    /// Read a saved tracklist page instead of fetching one
    #[arg(long, value_name = "PATH")]
    html: Option<PathBuf>,

    /// Output file path
    #[arg(short, long = "output", default_value = "output.ffmetadata")]
    output_file: PathBuf,

    /// Suppress progress messages
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show detailed processing information
    #[arg(short, long)]
    verbose: bool,

    /// Total mix length (H:MM:SS or MM:SS); sets END on the last chapter
    #[arg(long, value_name = "TIME", value_parser = parse_duration)]
    duration: Option<u64>,

    /// Leave out tracks without a usable timestamp instead of estimating them
    #[arg(long)]
    skip_missing: bool,

    /// Print the metadata to stdout instead of writing the output file
    #[arg(long)]
    stdout: bool,

    /// Also write the chapter list as JSON
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,
}

fn parse_duration(s: &str) -> Result<u64, String> {
    parse_timestamp(s).ok_or_else(|| format!("expected H:MM:SS or MM:SS, got {:?}", s))
}

#[derive(Serialize)]
struct JsonDump<'a> {
    title: Option<&'a str>,
    layout: Layout,
    chapters: &'a [Chapter],
    warnings: &'a [Warning],
}

fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let t0 = Instant::now();
    let settings = Settings::load().context("Failed to load settings")?;

    let page = match (&cli.html, &cli.url) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, Some(url)) => fetch(&settings, url, cli.quiet).await?,
        (None, None) => anyhow::bail!("either a URL or --html is required"),
    };

    let opts = PipelineOptions {
        gap_policy: if cli.skip_missing {
            GapPolicy::Skip
        } else {
            settings.gap_policy
        },
        total_ms: cli.duration,
    };
    let outcome = process_page(&page, &opts).context("Failed to build chapters")?;
    report(&outcome.warnings);

    let file = &outcome.value;
    info!(
        "{} chapters from {} layout{}",
        file.chapters.len(),
        file.layout,
        file.tracklist_title
            .as_deref()
            .map(|t| format!(" ({})", t))
            .unwrap_or_default()
    );

    if cli.stdout {
        print!("{}", file.text);
    } else {
        std::fs::write(&cli.output_file, &file.text)
            .with_context(|| format!("Failed to write {}", cli.output_file.display()))?;
        info!("Wrote {}", cli.output_file.display());
    }

    if let Some(path) = &cli.json {
        let dump = JsonDump {
            title: file.tracklist_title.as_deref(),
            layout: file.layout,
            chapters: &file.chapters,
            warnings: &outcome.warnings,
        };
        let json = serde_json::to_string_pretty(&dump)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {}", path.display());
    }

    debug!("Done in {:.2}s", t0.elapsed().as_secs_f64());
    Ok(())
}

async fn fetch(settings: &Settings, url: &str, quiet: bool) -> anyhow::Result<String> {
    let fetcher = Fetcher::new(settings)?;

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    spinner.set_message(format!("Fetching {}", url));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let page = fetcher.fetch_page(url).await;
    spinner.finish_and_clear();
    page.with_context(|| format!("Failed to fetch {}", url))
}

/// Per-track estimates go to debug; anything that changed the chapter list goes to warn.
fn report(warnings: &[Warning]) {
    let mut estimated = 0usize;
    for w in warnings {
        match w {
            Warning::Estimated { .. } => {
                estimated += 1;
                debug!("{}", w);
            }
            Warning::MissingTimestamp { .. } | Warning::MalformedTimestamp { .. } => {
                debug!("{}", w)
            }
            _ => warn!("{}", w),
        }
    }
    if estimated > 0 {
        warn!("{} start time(s) estimated; use -v for details", estimated);
    }
}
