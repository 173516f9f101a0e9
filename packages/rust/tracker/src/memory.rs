//! In-memory [`IssueTracker`], backed by a [`Snapshot`].
//!
//! Used for offline rendering from a JSON dump and as the test double for
//! the pipeline. Fetch failures can be injected per issue or per comment.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use gitblog_shared::{Comment, GitBlogError, Issue, Label, Reaction, Repository, Result};

use crate::{IssueFilter, IssueTracker};

/// Everything a pipeline run reads from the tracker, as one JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Login reported as the authenticated identity.
    pub viewer: String,
    pub repository: Repository,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Comments keyed by issue number.
    #[serde(default)]
    pub comments: BTreeMap<u64, Vec<Comment>>,
    /// Reactions keyed by comment id.
    #[serde(default)]
    pub reactions: BTreeMap<u64, Vec<Reaction>>,
}

/// Tracker serving a fixed [`Snapshot`].
///
/// `list_issues` ignores the state filter: the snapshot holds exactly the
/// issues it was captured with.
#[derive(Debug, Clone)]
pub struct MemoryTracker {
    snapshot: Snapshot,
    failing_comments: HashSet<u64>,
    failing_reactions: HashSet<u64>,
}

impl MemoryTracker {
    /// An empty tracker for `viewer` reading `repository`.
    pub fn new(viewer: impl Into<String>, repository: Repository) -> Self {
        Self::from_snapshot(Snapshot {
            viewer: viewer.into(),
            repository,
            issues: Vec::new(),
            labels: Vec::new(),
            comments: BTreeMap::new(),
            reactions: BTreeMap::new(),
        })
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            failing_comments: HashSet::new(),
            failing_reactions: HashSet::new(),
        }
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GitBlogError::io(path, e))?;
        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
            GitBlogError::parse(format!("invalid snapshot {}: {e}", path.display()))
        })?;
        debug!(
            path = %path.display(),
            issues = snapshot.issues.len(),
            labels = snapshot.labels.len(),
            "loaded snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn with_comments(mut self, issue: u64, comments: Vec<Comment>) -> Self {
        self.snapshot.comments.insert(issue, comments);
        self
    }

    pub fn with_reactions(mut self, comment: u64, reactions: Vec<Reaction>) -> Self {
        self.snapshot.reactions.insert(comment, reactions);
        self
    }

    /// Make `list_comments` fail for issue `number`.
    pub fn failing_comments(mut self, number: u64) -> Self {
        self.failing_comments.insert(number);
        self
    }

    /// Make `list_reactions` fail for comment `id`.
    pub fn failing_reactions(mut self, id: u64) -> Self {
        self.failing_reactions.insert(id);
        self
    }
}

impl IssueTracker for MemoryTracker {
    async fn current_user(&self) -> Result<String> {
        Ok(self.snapshot.viewer.clone())
    }

    async fn repository(&self) -> Result<Repository> {
        Ok(self.snapshot.repository.clone())
    }

    async fn list_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        Ok(self
            .snapshot
            .issues
            .iter()
            .filter(|issue| filter.labels.iter().all(|l| issue.has_label(l)))
            .cloned()
            .collect())
    }

    async fn list_labels(&self) -> Result<Vec<Label>> {
        Ok(self.snapshot.labels.clone())
    }

    async fn list_comments(&self, issue: &Issue) -> Result<Vec<Comment>> {
        if self.failing_comments.contains(&issue.number) {
            return Err(GitBlogError::Network(format!(
                "comments for issue #{} unavailable",
                issue.number
            )));
        }
        Ok(self
            .snapshot
            .comments
            .get(&issue.number)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_reactions(&self, comment: &Comment) -> Result<Vec<Reaction>> {
        if self.failing_reactions.contains(&comment.id) {
            return Err(GitBlogError::Network(format!(
                "reactions for comment {} unavailable",
                comment.id
            )));
        }
        Ok(self
            .snapshot
            .reactions
            .get(&comment.id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_issue(&self, number: u64) -> Result<Issue> {
        self.snapshot
            .issues
            .iter()
            .find(|issue| issue.number == number)
            .cloned()
            .ok_or_else(|| GitBlogError::not_found(format!("issue #{number}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> MemoryTracker {
        MemoryTracker::load(Path::new("../../../fixtures/json/snapshot.fixture.json"))
            .expect("load snapshot fixture")
    }

    #[tokio::test]
    async fn snapshot_fixture_loads() {
        let tracker = fixture();
        assert_eq!(tracker.current_user().await.unwrap(), "alice");
        assert_eq!(tracker.repository().await.unwrap().full_name, "alice/gitblog");

        let issues = tracker.list_issues(&IssueFilter::default()).await.unwrap();
        assert_eq!(issues.len(), 6);
        assert_eq!(tracker.list_labels().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn label_filter_requires_all_labels() {
        let tracker = fixture();
        let filter = IssueFilter {
            labels: vec!["Rust".into()],
            ..IssueFilter::default()
        };
        let issues = tracker.list_issues(&filter).await.unwrap();
        assert!(!issues.is_empty());
        assert!(issues.iter().all(|i| i.has_label("Rust")));

        let filter = IssueFilter {
            labels: vec!["Rust".into(), "Nope".into()],
            ..IssueFilter::default()
        };
        assert!(tracker.list_issues(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn comments_and_reactions_by_key() {
        let tracker = fixture();
        let friends = tracker.get_issue(4).await.unwrap();
        let comments = tracker.list_comments(&friends).await.unwrap();
        assert_eq!(comments.len(), 2);

        let reactions = tracker.list_reactions(&comments[0]).await.unwrap();
        assert!(reactions.iter().any(|r| r.is_heart_from("alice")));
    }

    #[tokio::test]
    async fn injected_failures_and_missing_issue() {
        let tracker = fixture().failing_comments(4).failing_reactions(401);
        let friends = tracker.get_issue(4).await.unwrap();
        assert!(tracker.list_comments(&friends).await.is_err());

        let comment = Comment {
            id: 401,
            body: None,
            author: "bob".into(),
            created_at: None,
        };
        assert!(tracker.list_reactions(&comment).await.is_err());

        let err = tracker.get_issue(999).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
