//! Core domain types: the issue-tracker records the pipeline consumes.
//!
//! These are immutable snapshots of what the tracker returned for one run.
//! The pipeline borrows them; it never mutates or caches derived state on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Label
// ---------------------------------------------------------------------------

/// A named, optionally described category attached to issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Unique name within the tracker.
    pub name: String,
    /// Human description. `None` and `Some("")` are distinct for ordering.
    #[serde(default)]
    pub description: Option<String>,
}

impl Label {
    /// A label without description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// A label with a description.
    pub fn described(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Issue
// ---------------------------------------------------------------------------

/// A single content record from the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Identity number within the repository.
    pub number: u64,
    pub title: String,
    /// Canonical web URL.
    pub html_url: String,
    /// Markdown body; absent for issues created without text.
    #[serde(default)]
    pub body: Option<String>,
    /// Login of the author.
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Labels in the order the tracker reports them.
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Set for cross-reference/merge records (pull requests), which are not content.
    #[serde(default)]
    pub is_pull_request: bool,
}

impl Issue {
    /// The body, or the empty string when absent.
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    /// Whether the body is absent or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.body_text().trim().is_empty()
    }

    /// Whether `login` authored this issue.
    pub fn is_authored_by(&self, login: &str) -> bool {
        self.author == login
    }

    /// Whether the issue carries the label `name`.
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }

    /// Whether the issue carries at least one of `names`.
    pub fn has_any_label(&self, names: &[String]) -> bool {
        names.iter().any(|n| self.has_label(n))
    }
}

// ---------------------------------------------------------------------------
// Comment / Reaction
// ---------------------------------------------------------------------------

/// A comment on exactly one issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Tracker identifier, used to fetch reactions.
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    /// Login of the author.
    pub author: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Whether `login` authored this comment.
    pub fn is_authored_by(&self, login: &str) -> bool {
        self.author == login
    }
}

/// Reaction kinds as the tracker spells them. Only [`ReactionKind::Heart`] carries meaning here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionKind {
    #[serde(rename = "+1")]
    ThumbsUp,
    #[serde(rename = "-1")]
    ThumbsDown,
    #[serde(rename = "laugh")]
    Laugh,
    #[serde(rename = "confused")]
    Confused,
    #[serde(rename = "heart")]
    Heart,
    #[serde(rename = "hooray")]
    Hooray,
    #[serde(rename = "rocket")]
    Rocket,
    #[serde(rename = "eyes")]
    Eyes,
    #[serde(other)]
    Other,
}

/// An endorsement marker placed on a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub kind: ReactionKind,
    /// Login of whoever reacted.
    pub author: String,
}

impl Reaction {
    /// Whether this is a heart placed by `login`.
    pub fn is_heart_from(&self, login: &str) -> bool {
        self.kind == ReactionKind::Heart && self.author == login
    }
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// The repository coordinate plus the metadata the feed header needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// `owner/name`.
    pub full_name: String,
    pub name: String,
    /// Login of the owning account.
    pub owner: String,
    pub html_url: String,
}

impl Repository {
    /// Build the repository record from an `owner/name` coordinate, using GitHub URL conventions.
    pub fn from_coordinate(coordinate: &str) -> crate::Result<Self> {
        let Some((owner, name)) = coordinate.split_once('/') else {
            return Err(crate::GitBlogError::validation(format!(
                "repository must be given as owner/name, got '{coordinate}'"
            )));
        };
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(crate::GitBlogError::validation(format!(
                "repository must be given as owner/name, got '{coordinate}'"
            )));
        }
        Ok(Self {
            full_name: coordinate.to_string(),
            name: name.to_string(),
            owner: owner.to_string(),
            html_url: format!("https://github.com/{coordinate}"),
        })
    }
}
