//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use inkpress_content::{parse_frontmatter, validate_frontmatter};
use inkpress_core::{
    Orchestrator, ProcessOptions, ProcessedDocument, ProgressReporter, Stage,
    compose_social_message, read_document, validate_file_path,
};
use inkpress_shared::{
    AppConfig, InkpressError, PipelineConfig, init_config, load_config, parse_upload_url,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// inkpress: prepare Markdown documents for publishing.
#[derive(Parser)]
#[command(
    name = "inkpress",
    version,
    about = "Validate, sanitize, and relocate images for Markdown documents before publishing.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run a document through the pipeline and print the result.
    Process {
        /// Markdown file (.md or .markdown).
        file: PathBuf,

        /// Leave embedded images where they are.
        #[arg(long)]
        no_images: bool,

        /// Image upload endpoint (overrides the config file).
        #[arg(long, env = "INKPRESS_IMAGE_UPLOAD_URL")]
        upload_url: Option<String>,

        /// Print frontmatter, body, and content report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Compose a social media announcement for a document.
    Social {
        /// Markdown file (.md or .markdown).
        file: PathBuf,

        /// Published location as LABEL=URL (repeatable).
        #[arg(long = "link", value_parser = parse_link)]
        links: Vec<(String, String)>,

        /// Maximum message length in characters.
        #[arg(long)]
        max_len: Option<usize>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

/// Parse `LABEL=URL`.
fn parse_link(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((label, url)) if !label.trim().is_empty() && !url.trim().is_empty() => {
            Ok((label.trim().to_string(), url.trim().to_string()))
        }
        _ => Err(format!("expected LABEL=URL, got '{raw}'")),
    }
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "inkpress=info",
        1 => "inkpress=debug",
        _ => "inkpress=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// One-line rendering for errors that reach the user.
pub(crate) fn render_error(err: &InkpressError) -> String {
    format!("error: {err}")
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Process {
            file,
            no_images,
            upload_url,
            json,
        } => cmd_process(&file, !no_images, upload_url.as_deref(), json).await,
        Command::Social {
            file,
            links,
            max_len,
        } => cmd_social(&file, &links, max_len).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Load the config file and apply CLI overrides.
fn pipeline_config(upload_url: Option<&str>) -> Result<PipelineConfig> {
    let config = load_config()?;
    let override_url = upload_url
        .filter(|raw| !raw.trim().is_empty())
        .map(parse_upload_url)
        .transpose()?;
    Ok(PipelineConfig::try_from(&config)?.with_upload_url(override_url))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_process(file: &Path, relocate_images: bool, upload_url: Option<&str>, json: bool) -> Result<()> {
    let config = pipeline_config(upload_url)?;
    info!(
        file = %file.display(),
        relocate_images,
        upload = config.images.upload_url.is_some(),
        "processing document"
    );

    let orchestrator = Orchestrator::new(config)?;
    let options = ProcessOptions { relocate_images };

    let reporter = CliProgress::new();
    let result = orchestrator
        .process_with_progress(file, &options, &reporter)
        .await;
    reporter.finish();
    let doc = result?;

    if !doc.report.verdict {
        eprintln!("warning: content check failed");
        for problem in doc.report.problems(&orchestrator.config().content) {
            eprintln!("  - {problem}");
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&document_json(&doc))?);
    } else {
        print!("{}", render_document(&doc)?);
    }
    Ok(())
}

async fn cmd_social(file: &Path, links: &[(String, String)], max_len: Option<usize>) -> Result<()> {
    let config = PipelineConfig::try_from(&load_config()?)?;

    validate_file_path(file)?;
    let text = read_document(file).await?;
    let (raw, _body) = parse_frontmatter(&text)?;
    let frontmatter = validate_frontmatter(&raw, &config.content)?;

    println!("{}", compose_social_message(&frontmatter, links, max_len));
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Frontmatter block (if any) followed by the body.
fn render_document(doc: &ProcessedDocument) -> Result<String> {
    let yaml = doc
        .frontmatter
        .to_yaml()
        .map_err(|e| eyre!("failed to serialize frontmatter: {e}"))?;
    let mut out = String::new();
    if !yaml.is_empty() {
        out.push_str("---\n");
        out.push_str(&yaml);
        if !yaml.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("---\n");
    }
    out.push_str(&doc.body);
    if !doc.body.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

fn document_json(doc: &ProcessedDocument) -> serde_json::Value {
    serde_json::json!({
        "frontmatter": doc.frontmatter,
        "body": doc.body,
        "report": doc.report,
    })
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, stage: Stage) {
        let message = match stage {
            Stage::Raw => "Reading document",
            Stage::HeaderExtracted => "Validating frontmatter",
            Stage::HeaderValidated => "Sanitizing content",
            Stage::Sanitized => "Relocating images",
            Stage::ImagesResolved => "Checking content",
            Stage::ContentChecked | Stage::Ready => "Done",
        };
        self.spinner.set_message(message);
    }
}
