//! Application configuration for Gitblog.
//!
//! Config lives in `gitblog.toml` (working directory by default).
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GitBlogError, Result};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "gitblog.toml";

// ---------------------------------------------------------------------------
// Config structs (matching gitblog.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Index rendering knobs.
    #[serde(default)]
    pub render: RenderSettings,

    /// Reserved label roles.
    #[serde(default)]
    pub labels: LabelsConfig,

    /// Syndication feed settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Output locations.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Items shown in a label section before the rest collapse.
    #[serde(default = "default_anchor_threshold")]
    pub anchor_threshold: usize,

    /// Items listed under "Recent Updates".
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Non-blank body lines shown beneath an item.
    #[serde(default = "default_summary_max_lines")]
    pub summary_max_lines: usize,

    /// Characters kept per summary line before truncation.
    #[serde(default = "default_summary_max_len")]
    pub summary_max_len: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            anchor_threshold: default_anchor_threshold(),
            recent_limit: default_recent_limit(),
            summary_max_lines: default_summary_max_lines(),
            summary_max_len: default_summary_max_len(),
        }
    }
}

fn default_anchor_threshold() -> usize {
    5
}
fn default_recent_limit() -> usize {
    5
}
fn default_summary_max_lines() -> usize {
    3
}
fn default_summary_max_len() -> usize {
    50
}

/// `[labels]` section. Each role matches an issue carrying any of its labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsConfig {
    #[serde(default = "default_pinned_labels")]
    pub pinned: Vec<String>,

    #[serde(default = "default_todo_labels")]
    pub todo: Vec<String>,

    #[serde(default = "default_friends_labels")]
    pub friends: Vec<String>,

    #[serde(default = "default_about_labels")]
    pub about: Vec<String>,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            pinned: default_pinned_labels(),
            todo: default_todo_labels(),
            friends: default_friends_labels(),
            about: default_about_labels(),
        }
    }
}

impl LabelsConfig {
    /// Union of every role list: names never rendered as their own label section.
    pub fn reserved(&self) -> BTreeSet<String> {
        self.pinned
            .iter()
            .chain(&self.todo)
            .chain(&self.friends)
            .chain(&self.about)
            .cloned()
            .collect()
    }
}

fn default_pinned_labels() -> Vec<String> {
    vec!["Top".into()]
}
fn default_todo_labels() -> Vec<String> {
    vec!["TODO".into()]
}
fn default_friends_labels() -> Vec<String> {
    vec!["Friends".into()]
}
fn default_about_labels() -> Vec<String> {
    vec!["About".into()]
}

/// `[feed]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed author display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    /// Feed author email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,

    /// Maximum entries; unlimited when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Branch the published feed is served from (self link).
    #[serde(default = "default_branch")]
    pub branch: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            author_name: None,
            author_email: None,
            limit: None,
            branch: default_branch(),
        }
    }
}

fn default_branch() -> String {
    "master".into()
}

/// Which issues the tracker is asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
    All,
}

impl IssueState {
    /// The tracker's query-string spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

impl std::str::FromStr for IssueState {
    type Err = GitBlogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "all" => Ok(Self::All),
            other => Err(GitBlogError::config(format!(
                "unknown issue state '{other}': expected open, closed or all"
            ))),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Index document path.
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Feed artifact path.
    #[serde(default = "default_feed_path")]
    pub feed_path: PathBuf,

    /// Directory receiving one archive file per issue.
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,

    /// Issue state requested from the tracker.
    #[serde(default)]
    pub issue_state: IssueState,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            feed_path: default_feed_path(),
            archive_dir: default_archive_dir(),
            issue_state: IssueState::default(),
        }
    }
}

fn default_index_path() -> PathBuf {
    "README.md".into()
}
fn default_feed_path() -> PathBuf {
    "feed.xml".into()
}
fn default_archive_dir() -> PathBuf {
    "BACKUP".into()
}

// ---------------------------------------------------------------------------
// Render config (runtime, handed to each component)
// ---------------------------------------------------------------------------

/// Runtime rendering configuration, passed into each pipeline component.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Item count after which a label section's remaining items collapse.
    pub anchor_threshold: usize,
    /// Items listed in the recent section.
    pub recent_limit: usize,
    /// Non-blank lines per item summary.
    pub summary_max_lines: usize,
    /// Characters per summary line.
    pub summary_max_len: usize,
    /// Label names never rendered as their own section.
    pub reserved_labels: BTreeSet<String>,
    pub pinned_labels: Vec<String>,
    pub todo_labels: Vec<String>,
    pub friends_labels: Vec<String>,
    pub about_labels: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for RenderConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            anchor_threshold: config.render.anchor_threshold,
            recent_limit: config.render.recent_limit,
            summary_max_lines: config.render.summary_max_lines,
            summary_max_len: config.render.summary_max_len,
            reserved_labels: config.labels.reserved(),
            pinned_labels: config.labels.pinned.clone(),
            todo_labels: config.labels.todo.clone(),
            friends_labels: config.labels.friends.clone(),
            about_labels: config.labels.about.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the application config.
///
/// An explicit `path` must exist. Without one, `./gitblog.toml` is used when
/// present and defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = path {
        return load_config_from(path);
    }

    let path = Path::new(CONFIG_FILE_NAME);
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| GitBlogError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        GitBlogError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Write a default config file to `path`, refusing to overwrite an existing one.
pub fn init_config(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Err(GitBlogError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| GitBlogError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| GitBlogError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}

/// Reject settings that would make rendering meaningless.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.render.summary_max_len == 0 {
        return Err(GitBlogError::config("render.summary_max_len must be at least 1"));
    }
    if config.feed.branch.trim().is_empty() {
        return Err(GitBlogError::config("feed.branch must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("anchor_threshold"));
        assert!(toml_str.contains("README.md"));
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let toml_str = r#"
[render]
recent_limit = 10

[labels]
pinned = ["Top", "置顶"]

[output]
issue_state = "all"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.render.recent_limit, 10);
        assert_eq!(config.render.anchor_threshold, 5);
        assert_eq!(config.labels.pinned, vec!["Top", "置顶"]);
        assert_eq!(config.labels.todo, vec!["TODO"]);
        assert_eq!(config.output.issue_state, IssueState::All);
        assert_eq!(config.feed.branch, "master");
    }

    #[test]
    fn render_config_collects_reserved_labels() {
        let app = AppConfig::default();
        let render = RenderConfig::from(&app);
        assert_eq!(render.anchor_threshold, 5);
        assert_eq!(render.summary_max_len, 50);
        let reserved: Vec<_> = render.reserved_labels.iter().cloned().collect();
        assert_eq!(reserved, vec!["About", "Friends", "TODO", "Top"]);
    }

    #[test]
    fn issue_state_parses() {
        assert_eq!("closed".parse::<IssueState>().unwrap(), IssueState::Closed);
        assert!("merged".parse::<IssueState>().is_err());
        assert_eq!(IssueState::All.as_str(), "all");
    }

    #[test]
    fn zero_summary_len_rejected() {
        let mut config = AppConfig::default();
        config.render.summary_max_len = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("summary_max_len"));
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = std::env::temp_dir().join(format!("gitblog-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        let _ = std::fs::remove_file(&path);

        init_config(&path).expect("first init");
        let loaded = load_config(Some(&path)).expect("load written config");
        assert_eq!(loaded.render.recent_limit, 5);
        assert!(init_config(&path).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
