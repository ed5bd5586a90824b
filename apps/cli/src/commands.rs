//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use htmlpack_core::{BuildOptions, BuildResult, ProgressReporter, Source};
use htmlpack_shared::{AppConfig, BundleOptions, init_config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// htmlpack: bundle a web project into a single HTML file.
#[derive(Parser)]
#[command(
    name = "htmlpack",
    version,
    about = "Bundle a web project (zip, directory, GitHub repo, HTML or MHTML) into one self-contained HTML file.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
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
    /// Bundle a project into one HTML file.
    Bundle {
        /// Zip archive, project directory, .html/.mhtml file, or GitHub URL.
        source: String,

        /// Write the bundle here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Title used when the entry document has none.
        #[arg(long)]
        title: Option<String>,

        /// Size ceiling in KB (defaults to the configured value).
        #[arg(long)]
        max_size_kb: Option<u64>,

        /// Skip minification of assembled bundles.
        #[arg(long)]
        no_minify: bool,
    },

    /// Show the files, entry document, and asset resolutions for a source.
    Inspect {
        /// Zip archive, project directory, .html/.mhtml file, or GitHub URL.
        source: String,
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

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so a bundle
/// written to stdout stays clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "htmlpack=info",
        1 => "htmlpack=debug",
        _ => "htmlpack=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
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

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Bundle {
            source,
            output,
            title,
            max_size_kb,
            no_minify,
        } => {
            let overrides = Overrides {
                title,
                max_size_kb,
                no_minify,
            };
            cmd_bundle(&source, output, &overrides).await
        }
        Command::Inspect { source } => cmd_inspect(&source).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Command-line flags that take precedence over the config file.
#[derive(Debug, Default)]
struct Overrides {
    title: Option<String>,
    max_size_kb: Option<u64>,
    no_minify: bool,
}

fn build_options(config: &AppConfig, overrides: &Overrides) -> BuildOptions {
    let mut bundle = BundleOptions::from(config);
    if let Some(title) = &overrides.title {
        bundle.default_title = title.clone();
    }
    if let Some(limit) = overrides.max_size_kb {
        bundle.max_size_kb = limit;
        bundle.warn_size_kb = bundle.warn_size_kb.min(limit);
    }
    if overrides.no_minify {
        bundle.minify = false;
    }

    BuildOptions {
        bundle,
        github: config.github.clone(),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_bundle(source: &str, output: Option<PathBuf>, overrides: &Overrides) -> Result<()> {
    let config = load_config()?;
    let opts = build_options(&config, overrides);
    let source = Source::detect(source)?;

    info!(%source, "bundling project");

    let reporter = CliProgress::new();
    let result = htmlpack_core::build(&source, &opts, &reporter).await;
    reporter.clear();
    let result = result?;

    match &output {
        Some(path) => std::fs::write(path, &result.html)
            .wrap_err_with(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", result.html),
    }

    // Summary goes to stderr; stdout may be the bundle itself.
    eprintln!();
    eprintln!("  Bundle created successfully!");
    eprintln!(
        "  Entry:   {}",
        result.entry.as_deref().unwrap_or("(synthesized)")
    );
    eprintln!("  Method:  {}", result.method);
    eprintln!("  Project: {}", result.project_type);
    eprintln!(
        "  Size:    {:.2}KB{}",
        result.size_kb,
        if result.near_limit {
            format!(" (approaching {}KB limit)", opts.bundle.max_size_kb)
        } else {
            String::new()
        }
    );
    eprintln!("  SHA-256: {}", result.sha256);
    if !result.appended.is_empty() {
        eprintln!("  Appended:");
        for path in &result.appended {
            eprintln!("    {path}");
        }
    }
    if !result.unresolved.is_empty() {
        eprintln!("  Unresolved references:");
        for locator in &result.unresolved {
            eprintln!("    {locator}");
        }
    }
    if let Some(path) = &output {
        eprintln!("  Output:  {}", path.display());
    }
    eprintln!("  Time:    {:.1}s", result.elapsed.as_secs_f64());
    eprintln!();

    Ok(())
}

async fn cmd_inspect(source: &str) -> Result<()> {
    let config = load_config()?;
    let opts = build_options(&config, &Overrides::default());
    let source = Source::detect(source)?;

    let inspection = htmlpack_core::inspect(&source, &opts).await?;
    let analysis = &inspection.analysis;

    println!("Source:  {source}");
    println!("Files ({}):", inspection.files.len());
    for (path, bytes) in &inspection.files {
        println!("  {bytes:>8}  {path}");
    }
    println!(
        "Entry:   {}",
        analysis.entry.as_deref().unwrap_or("(none, a document will be synthesized)")
    );
    println!("Project: {}", analysis.project_type);

    if analysis.references.is_empty() {
        println!("References: none");
    } else {
        println!("References:");
        for asset in &analysis.references {
            match &asset.path {
                Some(path) => println!(
                    "  {:<10} {} -> {path}",
                    asset.reference.kind.to_string(),
                    asset.reference.locator
                ),
                None => println!(
                    "  {:<10} {} (unresolved)",
                    asset.reference.kind.to_string(),
                    asset.reference.locator
                ),
            }
        }
    }

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
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
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

    fn clear(&self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}
