//! Issue-tracker access for Gitblog.
//!
//! This crate provides:
//! - [`IssueTracker`]: the interface the pipeline reads records through
//! - [`GitHubTracker`]: GitHub REST v3 implementation over `reqwest`
//! - [`MemoryTracker`]: in-memory implementation, loadable from a JSON [`Snapshot`]

mod github;
mod memory;

use std::future::Future;

use gitblog_shared::{Comment, Issue, IssueState, Label, Reaction, Repository, Result};

pub use github::{DEFAULT_API_URL, GitHubTracker};
pub use memory::{MemoryTracker, Snapshot};

/// Query for [`IssueTracker::list_issues`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    /// Open, closed, or both.
    pub state: IssueState,
    /// Only issues carrying every one of these labels. Empty means no label filter.
    pub labels: Vec<String>,
}

impl IssueFilter {
    /// Every issue in `state`.
    pub fn with_state(state: IssueState) -> Self {
        Self {
            state,
            labels: Vec::new(),
        }
    }
}

/// Read access to an issue tracker.
///
/// Every call is awaited to completion before the next one is made; nothing
/// here is retried. Implementations report a missing record as
/// [`GitBlogError::NotFound`](gitblog_shared::GitBlogError::NotFound) or a 404
/// [`Api`](gitblog_shared::GitBlogError::Api) error.
pub trait IssueTracker: Send + Sync {
    /// Login of the authenticated identity.
    fn current_user(&self) -> impl Future<Output = Result<String>> + Send;

    /// Metadata of the repository being read.
    fn repository(&self) -> impl Future<Output = Result<Repository>> + Send;

    /// All issues matching `filter`, in tracker order.
    fn list_issues(&self, filter: &IssueFilter) -> impl Future<Output = Result<Vec<Issue>>> + Send;

    /// Every label defined in the repository.
    fn list_labels(&self) -> impl Future<Output = Result<Vec<Label>>> + Send;

    /// Comments on `issue`, oldest first.
    fn list_comments(&self, issue: &Issue) -> impl Future<Output = Result<Vec<Comment>>> + Send;

    /// Reactions placed on `comment`.
    fn list_reactions(
        &self,
        comment: &Comment,
    ) -> impl Future<Output = Result<Vec<Reaction>>> + Send;

    /// A single issue by number, regardless of its state.
    fn get_issue(&self, number: u64) -> impl Future<Output = Result<Issue>> + Send;
}
