//! CLI binary for md2cook.
//!
//! A thin shim over the library crate that resolves the credential, maps
//! CLI flags to `ConversionConfig`, and dispatches to single-file or
//! directory mode.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use md2cook::{
    convert_dir, convert_file, BatchProgress, ConversionConfig, FileOutcome, Md2CookError,
    ProgressHandle,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
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

/// Terminal progress callback: a live bar plus one log line per file.
/// Files are converted one at a time, so a single start-time slot is enough.
struct CliProgress {
    bar: ProgressBar,
    current_start: Mutex<Option<Instant>>,
}

impl CliProgress {
    /// Create a callback whose bar length is set by `on_batch_start`.
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning for recipes…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            current_start: Mutex::new(None),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.current_start
            .lock()
            .unwrap()
            .take()
            .map(|t| t.elapsed().as_millis() as f64 / 1000.0)
            .unwrap_or(0.0)
    }
}

impl BatchProgress for CliProgress {
    fn on_batch_start(&self, total_files: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_files as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_files} recipes…"))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, input: &Path) {
        *self.current_start.lock().unwrap() = Some(Instant::now());
        self.bar.set_message(
            input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
    }

    fn on_file_converted(&self, _index: usize, _total: usize, output: &Path, bytes: usize) {
        self.bar.println(format!(
            "  {} {}  {}  {}",
            green("✓"),
            output.display(),
            dim(&format!("{bytes:>5} bytes")),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_file_skipped(&self, _index: usize, _total: usize, output: &Path) {
        self.elapsed_secs();
        self.bar.println(format!(
            "  {} {}  {}",
            dim("−"),
            output.display(),
            dim("already exists"),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, _index: usize, _total: usize, input: &Path, error: &str) {
        let elapsed = self.elapsed_secs();

        // Keep long service errors to one tidy line.
        let msg: String = if error.chars().count() > 80 {
            let head: String = error.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {}  {}  {}",
            red("✗"),
            input.display(),
            red(&msg),
            dim(&format!("{elapsed:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, converted: usize) {
        self.bar.finish_and_clear();

        let rest = total_files.saturating_sub(converted);
        if rest == 0 {
            eprintln!(
                "{} {} files converted",
                green("✔"),
                bold(&converted.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} skipped or failed)",
                cyan("⚠"),
                bold(&converted.to_string()),
                total_files,
                rest,
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one recipe (writes soup.cook next to it)
  md2cook recipes/soup.md

  # Convert a whole directory tree
  md2cook recipes/

  # Top level only
  md2cook --no-recursive recipes/

  # Custom instructions, passed verbatim to the model
  md2cook -i "convert to English" recipes/

  # Use your own copy of the Cooklang spec
  md2cook --spec-path my-spec.md recipes/soup.md

  # Local OpenAI-compatible server (Ollama, vLLM, …)
  md2cook --base-url http://localhost:11434/v1 --model llama3.2 recipes/

  # Machine-readable summary
  md2cook --json recipes/ > summary.json

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY       API key (also read from a local .env file)
  MD2COOK_MODEL        Override the model ID
  MD2COOK_BASE_URL     Override the endpoint base URL

SETUP:
  1. Set API key:  export OPENAI_API_KEY=sk-...
  2. Convert:      md2cook recipes/

An existing .cook file is never overwritten; delete it to reconvert.
"#;

/// Convert markdown recipes to Cooklang using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "md2cook",
    version,
    about = "Convert markdown recipes to Cooklang using an LLM",
    long_about = "Convert markdown-formatted recipes to Cooklang markup by sending each document, \
together with the Cooklang format specification, to an LLM chat-completion service. \
INPUT can be a single .md file or a directory of recipes.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown recipe file or directory of recipes.
    input: PathBuf,

    /// Do not descend into subdirectories.
    #[arg(long)]
    no_recursive: bool,

    /// OpenAI API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Path to a Cooklang specification file (default: bundled copy).
    #[arg(long, env = "MD2COOK_SPEC_PATH")]
    spec_path: Option<PathBuf>,

    /// Custom instructions for the conversion (e.g. "convert to English").
    #[arg(short, long, env = "MD2COOK_INSTRUCTIONS")]
    instructions: Option<String>,

    /// Model ID sent to the service.
    #[arg(long, env = "MD2COOK_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "MD2COOK_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max tokens the service may generate per recipe.
    #[arg(long, env = "MD2COOK_MAX_TOKENS")]
    max_tokens: Option<u32>,

    /// OpenAI-compatible endpoint base URL (Ollama, vLLM, …).
    #[arg(long, env = "MD2COOK_BASE_URL")]
    base_url: Option<String>,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, env = "MD2COOK_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Output a structured JSON summary instead of plain text.
    #[arg(long, env = "MD2COOK_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "MD2COOK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2COOK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2COOK_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load a local .env before clap reads OPENAI_API_KEY from the
    // environment, so all three credential sources compose.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && cli.input.is_dir();
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
        .with_writer(std::io::stderr)
        .init();

    // ── Credential check ─────────────────────────────────────────────────
    // clap already consulted the environment (and, through dotenv, the
    // .env file); a missing key here means all three sources came up empty.
    let Some(api_key) = cli.api_key.clone() else {
        return Err(Md2CookError::ApiKeyMissing.into());
    };

    // ── Build config ─────────────────────────────────────────────────────
    let progress: Option<ProgressHandle> = if show_progress {
        Some(CliProgress::new() as Arc<dyn BatchProgress>)
    } else {
        None
    };

    let mut builder = ConversionConfig::builder()
        .api_key(api_key)
        .model(&cli.model)
        .temperature(cli.temperature)
        .recursive(!cli.no_recursive)
        .api_timeout_secs(cli.api_timeout);

    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(ref path) = cli.spec_path {
        builder = builder.spec_path(path);
    }
    if let Some(ref text) = cli.instructions {
        builder = builder.instructions(text);
    }
    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url);
    }
    if let Some(cb) = progress {
        builder = builder.progress(cb);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Dispatch ─────────────────────────────────────────────────────────
    if cli.input.is_file() {
        run_single_file(&cli, &config).await
    } else if cli.input.is_dir() {
        run_directory(&cli, &config).await
    } else {
        Err(Md2CookError::InputNotFound {
            path: cli.input.clone(),
        }
        .into())
    }
}

async fn run_single_file(cli: &Cli, config: &ConversionConfig) -> Result<()> {
    let outcome = convert_file(&cli.input, config).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        FileOutcome::Converted { output } => {
            println!(
                "Converted {} -> {}",
                cli.input.display(),
                bold(&output.display().to_string())
            );
        }
        FileOutcome::Skipped { output } => {
            println!(
                "Skipped {} — {} already exists",
                cli.input.display(),
                output.display()
            );
        }
        // convert_file surfaces failures as Err, never as an outcome.
        FileOutcome::Failed { error, .. } => anyhow::bail!(error),
    }

    Ok(())
}

async fn run_directory(cli: &Cli, config: &ConversionConfig) -> Result<()> {
    let batch = convert_dir(&cli.input, config).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }

    let converted = batch.converted_paths();
    if !cli.quiet {
        println!("Converted {} files:", converted.len());
        for path in &converted {
            println!("  {}", path.display());
        }
    }

    // Summary line (the progress callback, when active, already printed
    // the per-file log).
    if !cli.quiet {
        eprintln!(
            "{}  {} converted, {} skipped, {} failed  {}",
            if batch.stats.failed == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            batch.stats.converted,
            batch.stats.skipped,
            batch.stats.failed,
            dim(&format!("{}ms", batch.stats.total_duration_ms)),
        );
    }

    Ok(())
}
