//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use gitblog_core::{ArtifactMeta, ProgressReporter, RunConfig, RunReport};
use gitblog_shared::{
    AppConfig, CONFIG_FILE_NAME, IssueState, RenderConfig, init_config, load_config,
};
use gitblog_tracker::{GitHubTracker, IssueTracker, MemoryTracker};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Gitblog: a blog built from GitHub issues.
#[derive(Parser)]
#[command(
    name = "gitblog",
    version,
    about = "Render a repository's issues into a categorized README, an Atom feed, and per-issue backups.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./gitblog.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

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
    /// Regenerate the index, the feed, and the issue backups.
    Generate(GenerateArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments of `gitblog generate`.
#[derive(clap::Args, Debug)]
pub(crate) struct GenerateArgs {
    /// Repository as owner/name. Required unless --snapshot is given.
    #[arg(required_unless_present = "snapshot")]
    pub repo: Option<String>,

    /// GitHub access token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// API root, for GitHub Enterprise.
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Only back up this issue.
    #[arg(long)]
    pub issue_number: Option<u64>,

    /// Backup directory.
    #[arg(long)]
    pub dir_name: Option<PathBuf>,

    /// Index document path.
    #[arg(long)]
    pub readme: Option<PathBuf>,

    /// Feed path.
    #[arg(long)]
    pub feed: Option<PathBuf>,

    /// Render for this login instead of the authenticated user.
    #[arg(long)]
    pub owner: Option<String>,

    /// Issue state to list: open, closed, or all.
    #[arg(long)]
    pub state: Option<IssueState>,

    /// Feed author name.
    #[arg(long, env = "GITHUB_NAME")]
    pub author_name: Option<String>,

    /// Feed author email.
    #[arg(long, env = "GITHUB_EMAIL")]
    pub author_email: Option<String>,

    /// Maximum number of feed entries.
    #[arg(long)]
    pub feed_limit: Option<usize>,

    /// Read from a JSON snapshot instead of the GitHub API.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Also write the run report (artifacts, checksums, diagnostics) as JSON.
    #[arg(long)]
    pub report: Option<PathBuf>,
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

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "gitblog=info,gitblog_core=info,gitblog_tracker=info",
        1 => "gitblog=debug,gitblog_core=debug,gitblog_tracker=debug,gitblog_markdown=debug",
        _ => "gitblog=trace,gitblog_core=trace,gitblog_tracker=trace,gitblog_markdown=trace,gitblog_shared=trace",
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

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Generate(args) => cmd_generate(config_path, args).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

/// Merge file config and flags into the pipeline's run configuration.
fn run_config(config: &AppConfig, args: &GenerateArgs) -> RunConfig {
    let mut output = config.output.clone();
    if let Some(dir) = &args.dir_name {
        output.archive_dir = dir.clone();
    }
    if let Some(readme) = &args.readme {
        output.index_path = readme.clone();
    }
    if let Some(feed) = &args.feed {
        output.feed_path = feed.clone();
    }
    if let Some(state) = args.state {
        output.issue_state = state;
    }

    let mut feed = config.feed.clone();
    if args.author_name.is_some() {
        feed.author_name = args.author_name.clone();
    }
    if args.author_email.is_some() {
        feed.author_email = args.author_email.clone();
    }
    if args.feed_limit.is_some() {
        feed.limit = args.feed_limit;
    }

    RunConfig {
        owner: args.owner.clone(),
        issue_number: args.issue_number,
        output,
        feed,
        render: RenderConfig::from(config),
    }
}

async fn cmd_generate(config_path: Option<&Path>, args: GenerateArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let run_config = run_config(&config, &args);

    if let Some(snapshot) = &args.snapshot {
        info!(snapshot = %snapshot.display(), "rendering from snapshot");
        let tracker = MemoryTracker::load(snapshot)?;
        return generate_with(&tracker, &run_config, args.report.as_deref()).await;
    }

    let repo = args
        .repo
        .as_deref()
        .ok_or_else(|| eyre!("a repository (owner/name) is required"))?;
    let token = args
        .token
        .as_deref()
        .ok_or_else(|| eyre!("no token: pass --token or set GITHUB_TOKEN"))?;

    let tracker = match &args.api_url {
        Some(api_url) => GitHubTracker::with_base_url(token, repo, api_url)?,
        None => GitHubTracker::authenticate(token, repo)?,
    };
    info!(repo, issue_number = ?args.issue_number, "generating blog");
    generate_with(&tracker, &run_config, args.report.as_deref()).await
}

async fn generate_with<T: IssueTracker>(
    tracker: &T,
    config: &RunConfig,
    report_path: Option<&Path>,
) -> Result<()> {
    let reporter = CliProgress::new();
    let report = gitblog_core::run(tracker, config, &reporter).await?;
    print_report(&report);

    if let Some(path) = report_path {
        let meta = gitblog_core::write_report(&report, path)?;
        info!(path = %meta.path.display(), "run report written");
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    println!();
    println!("  Blog generated for {} ({})", report.repository, report.owner);
    println!("  Run:      {}", report.run_id);
    println!("  Issues:   {}", report.issue_count);
    println!("  Index:    {}", artifact_line(&report.index));
    println!("  Feed:     {}", artifact_line(&report.feed));
    println!("  Archived: {}", report.archived.len());
    for meta in &report.archived {
        println!("    {}", artifact_line(meta));
    }
    println!("  Time:     {:.1}s", report.elapsed.as_secs_f64());

    if !report.diagnostics.is_empty() {
        println!();
        println!("  {} item(s) skipped:", report.diagnostics.len());
        for diagnostic in report.diagnostics.iter() {
            println!("    {diagnostic}");
        }
    }
    println!();
}

/// `path (N bytes, status) sha256:HEX` for one written file.
fn artifact_line(meta: &ArtifactMeta) -> String {
    format!(
        "{} ({} bytes, {:?}) sha256:{}",
        meta.path.display(),
        meta.size_bytes,
        meta.status,
        meta.sha256
    )
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
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn issue_archived(&self, number: u64, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Archiving [{current}/{total}] #{number}"));
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = init_config(config_path.unwrap_or(Path::new(CONFIG_FILE_NAME)))?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config: AppConfig = load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
