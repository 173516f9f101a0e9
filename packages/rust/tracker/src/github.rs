//! GitHub REST v3 implementation of [`IssueTracker`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use gitblog_shared::{
    Comment, GitBlogError, Issue, Label, Reaction, ReactionKind, Repository, Result,
};

use crate::{IssueFilter, IssueTracker};

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com/";

/// User-Agent string for API requests (GitHub rejects requests without one).
const USER_AGENT: &str = concat!("Gitblog/", env!("CARGO_PKG_VERSION"));

/// Items requested per page; a shorter page ends pagination.
const PER_PAGE: usize = 100;

/// Hard stop for pagination loops.
const MAX_PAGES: u32 = 1000;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Stand-in login for records whose author account was deleted.
const GHOST_LOGIN: &str = "ghost";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WireUser {
    login: String,
}

fn login_of(user: Option<WireUser>) -> String {
    user.map(|u| u.login).unwrap_or_else(|| GHOST_LOGIN.to_string())
}

#[derive(Debug, Deserialize)]
struct WireLabel {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

impl From<WireLabel> for Label {
    fn from(w: WireLabel) -> Self {
        Self {
            name: w.name,
            description: w.description,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireIssue {
    number: u64,
    title: String,
    html_url: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    user: Option<WireUser>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    labels: Vec<WireLabel>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

impl From<WireIssue> for Issue {
    fn from(w: WireIssue) -> Self {
        Self {
            number: w.number,
            title: w.title,
            html_url: w.html_url,
            body: w.body,
            author: login_of(w.user),
            created_at: w.created_at,
            updated_at: w.updated_at,
            labels: w.labels.into_iter().map(Label::from).collect(),
            is_pull_request: w.pull_request.is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    user: Option<WireUser>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<WireComment> for Comment {
    fn from(w: WireComment) -> Self {
        Self {
            id: w.id,
            body: w.body,
            author: login_of(w.user),
            created_at: w.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireReaction {
    content: ReactionKind,
    #[serde(default)]
    user: Option<WireUser>,
}

impl From<WireReaction> for Reaction {
    fn from(w: WireReaction) -> Self {
        Self {
            kind: w.content,
            author: login_of(w.user),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireRepository {
    full_name: String,
    name: String,
    owner: WireUser,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Authenticated session against one GitHub repository.
#[derive(Debug, Clone)]
pub struct GitHubTracker {
    client: Client,
    base_url: Url,
    repo: String,
}

impl GitHubTracker {
    /// Authenticate with a personal access token against the public API.
    ///
    /// `repo` is the `owner/name` coordinate. The token is only checked by the
    /// first request; see [`IssueTracker::current_user`].
    pub fn authenticate(token: &str, repo: &str) -> Result<Self> {
        Self::with_base_url(token, repo, DEFAULT_API_URL)
    }

    /// Like [`GitHubTracker::authenticate`] against another API root (GitHub Enterprise, tests).
    pub fn with_base_url(token: &str, repo: &str, base_url: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(GitBlogError::validation("GitHub token is empty"));
        }
        Repository::from_coordinate(repo)?;

        let mut base_url = Url::parse(base_url)
            .map_err(|e| GitBlogError::validation(format!("invalid API URL '{base_url}': {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|e| GitBlogError::validation(format!("token is not a valid header: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| GitBlogError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            repo: repo.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| GitBlogError::validation(format!("bad API path '{path}': {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| GitBlogError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GitBlogError::Network(format!("{url}: failed to read body: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<WireError>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(GitBlogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| GitBlogError::parse(format!("{url}: unexpected response: {e}")))
    }

    /// Follow page-number pagination until a short page.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();

        for page in 1..=MAX_PAGES {
            let mut paged = query.to_vec();
            paged.push(("per_page", PER_PAGE.to_string()));
            paged.push(("page", page.to_string()));

            let batch: Vec<T> = self.get_json(path, &paged).await?;
            let len = batch.len();
            items.extend(batch);
            debug!(path, page, len, "fetched page");

            if len < PER_PAGE {
                break;
            }
        }

        Ok(items)
    }
}

impl IssueTracker for GitHubTracker {
    #[instrument(skip_all)]
    async fn current_user(&self) -> Result<String> {
        let user: WireUser = self.get_json("user", &[]).await?;
        Ok(user.login)
    }

    #[instrument(skip_all, fields(repo = %self.repo))]
    async fn repository(&self) -> Result<Repository> {
        let repo: WireRepository = self.get_json(&format!("repos/{}", self.repo), &[]).await?;
        Ok(Repository {
            full_name: repo.full_name,
            name: repo.name,
            owner: repo.owner.login,
            html_url: repo.html_url,
        })
    }

    #[instrument(skip_all, fields(repo = %self.repo, state = filter.state.as_str()))]
    async fn list_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let mut query = vec![("state", filter.state.as_str().to_string())];
        if !filter.labels.is_empty() {
            query.push(("labels", filter.labels.join(",")));
        }

        let issues: Vec<WireIssue> = self
            .get_all(&format!("repos/{}/issues", self.repo), &query)
            .await?;
        Ok(issues.into_iter().map(Issue::from).collect())
    }

    #[instrument(skip_all, fields(repo = %self.repo))]
    async fn list_labels(&self) -> Result<Vec<Label>> {
        let labels: Vec<WireLabel> = self
            .get_all(&format!("repos/{}/labels", self.repo), &[])
            .await?;
        Ok(labels.into_iter().map(Label::from).collect())
    }

    #[instrument(skip_all, fields(issue = issue.number))]
    async fn list_comments(&self, issue: &Issue) -> Result<Vec<Comment>> {
        let comments: Vec<WireComment> = self
            .get_all(
                &format!("repos/{}/issues/{}/comments", self.repo, issue.number),
                &[],
            )
            .await?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }

    #[instrument(skip_all, fields(comment = comment.id))]
    async fn list_reactions(&self, comment: &Comment) -> Result<Vec<Reaction>> {
        let reactions: Vec<WireReaction> = self
            .get_all(
                &format!("repos/{}/issues/comments/{}/reactions", self.repo, comment.id),
                &[],
            )
            .await?;
        Ok(reactions.into_iter().map(Reaction::from).collect())
    }

    #[instrument(skip_all, fields(number = number))]
    async fn get_issue(&self, number: u64) -> Result<Issue> {
        let issue: WireIssue = self
            .get_json(&format!("repos/{}/issues/{number}", self.repo), &[])
            .await?;
        Ok(issue.into())
    }
}
