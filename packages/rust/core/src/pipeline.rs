//! End-to-end `generate` pipeline: tracker → index, feed, archive files.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Serialize, Serializer};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use gitblog_shared::{FeedConfig, GitBlogError, Issue, OutputConfig, RenderConfig, Result};
use gitblog_tracker::{IssueFilter, IssueTracker};

use crate::archive::archive_issue;
use crate::artifact::{ArtifactMeta, write_artifact};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::feed::{build_feed, raw_feed_url};
use crate::renderer::IndexRenderer;
use crate::selector::select_target;

/// Configuration for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Identity whose content is rendered; the authenticated user when absent.
    pub owner: Option<String>,
    /// Restrict archiving to this issue number.
    pub issue_number: Option<u64>,
    pub output: OutputConfig,
    pub feed: FeedConfig,
    pub render: RenderConfig,
}

/// Result of a pipeline run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Owner identity the run rendered for.
    pub owner: String,
    /// `owner/name` of the repository read.
    pub repository: String,
    /// Size of the issue universe.
    pub issue_count: usize,
    pub index: ArtifactMeta,
    pub feed: ArtifactMeta,
    pub archived: Vec<ArtifactMeta>,
    pub diagnostics: Diagnostics,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: Serializer>(
    elapsed: &Duration,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(elapsed.as_millis() as u64)
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each archive file is written.
    fn issue_archived(&self, number: u64, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn issue_archived(&self, _number: u64, _current: usize, _total: usize) {}
    fn done(&self, _report: &RunReport) {}
}

/// Run the full generate pipeline.
///
/// 1. Resolve owner and repository
/// 2. List issues and labels
/// 3. Render the index (header, friends, pinned, recent, labels, TODO)
/// 4. Build the Atom feed
/// 5. Archive the selected issues
///
/// Listing failures and write failures abort the run. Everything per item
/// is recorded in [`RunReport::diagnostics`].
#[instrument(skip_all, fields(issue_number = ?config.issue_number))]
pub async fn run<T: IssueTracker>(
    tracker: &T,
    config: &RunConfig,
    progress: &dyn ProgressReporter,
) -> Result<RunReport> {
    let start = Instant::now();
    let run_id = Uuid::now_v7();
    let mut diagnostics = Diagnostics::new();

    // --- Phase 1: Identity ---
    progress.phase("Resolving identity");
    let owner = match &config.owner {
        Some(owner) => owner.clone(),
        None => tracker.current_user().await?,
    };
    let repo = tracker.repository().await?;
    info!(%run_id, owner = %owner, repo = %repo.full_name, "starting generate pipeline");

    // --- Phase 2: Fetch ---
    progress.phase("Listing issues");
    let issues = tracker
        .list_issues(&IssueFilter::with_state(config.output.issue_state))
        .await?;
    let labels = match tracker.list_labels().await {
        Ok(labels) => labels,
        Err(e) => {
            diagnostics.record(
                DiagnosticKind::PartialFetch,
                repo.full_name.as_str(),
                format!("labels unavailable: {e}"),
            );
            Vec::new()
        }
    };
    info!(issues = issues.len(), labels = labels.len(), "issue universe loaded");

    // --- Phase 3: Index ---
    progress.phase("Rendering index");
    let now = Utc::now();
    let feed_url = raw_feed_url(
        &repo,
        &config.feed.branch,
        &published_path(&config.output.feed_path),
    );

    let mut renderer = IndexRenderer::new(&config.render, &owner);
    renderer.render_header(&repo, &feed_url, &issues, now);
    renderer
        .render_friends(tracker, &issues, &mut diagnostics)
        .await;
    renderer.render_pinned(&issues);
    renderer.render_recent(&issues);
    renderer.render_labels(&labels, &issues);
    renderer.render_todo(&issues);
    let index = write_artifact(&config.output.index_path, &renderer.finish())?;

    // --- Phase 4: Feed ---
    progress.phase("Building feed");
    let xml = build_feed(&repo, &owner, &issues, &config.feed, &feed_url, now);
    let feed = write_artifact(&config.output.feed_path, &xml)?;

    // --- Phase 5: Archive ---
    progress.phase("Archiving issues");
    let fetched: Issue;
    let targets: Vec<&Issue> = match select_target(&issues, config.issue_number) {
        Ok(targets) => targets,
        Err(unresolved) => match tracker.get_issue(unresolved.number).await {
            Ok(issue) => {
                fetched = issue;
                vec![&fetched]
            }
            Err(e) => {
                let kind = if e.is_not_found() {
                    DiagnosticKind::Resolution
                } else {
                    DiagnosticKind::PartialFetch
                };
                diagnostics.record(kind, format!("issue #{}", unresolved.number), e);
                Vec::new()
            }
        },
    };

    let mut archived = Vec::with_capacity(targets.len());
    for (i, issue) in targets.iter().enumerate() {
        let meta = archive_issue(
            tracker,
            issue,
            &owner,
            &config.output.archive_dir,
            &mut diagnostics,
        )
        .await?;
        archived.push(meta);
        progress.issue_archived(issue.number, i + 1, targets.len());
    }

    let report = RunReport {
        run_id,
        owner,
        repository: repo.full_name,
        issue_count: issues.len(),
        index,
        feed,
        archived,
        diagnostics,
        elapsed: start.elapsed(),
    };

    info!(
        archived = report.archived.len(),
        diagnostics = report.diagnostics.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "generate pipeline complete"
    );
    progress.done(&report);

    Ok(report)
}

/// Write `report` as pretty-printed JSON to `path`.
///
/// The report lists every written artifact with its SHA-256, so a later run
/// or a CI step can check what changed.
pub fn write_report(report: &RunReport, path: &Path) -> Result<ArtifactMeta> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| GitBlogError::Render(format!("run report serialization failed: {e}")))?;
    let meta = write_artifact(path, &json)?;
    debug!(path = %meta.path.display(), "wrote run report");
    Ok(meta)
}

/// The feed path as it appears in the repository, for the raw self link.
fn published_path(path: &Path) -> String {
    if path.is_absolute() {
        return path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    path.to_string_lossy().replace('\\', "/")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
