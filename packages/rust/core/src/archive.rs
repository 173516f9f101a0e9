//! Per-issue archive files.
//!
//! Each archived issue becomes `{number}_{sanitized title}.md` in the archive
//! directory, holding the issue body and the owner's own comments. Files are
//! overwritten on every run.

use std::path::Path;

use tracing::{debug, instrument};

use gitblog_markdown::{format_time, sanitize_filename};
use gitblog_shared::{Comment, Issue, Result};
use gitblog_tracker::IssueTracker;

use crate::artifact::{ArtifactMeta, write_artifact};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

pub const NO_CONTENT: &str = "(no content)";

/// File name for an issue's archive document.
pub fn archive_file_name(issue: &Issue) -> String {
    format!("{}_{}.md", issue.number, sanitize_filename(&issue.title))
}

/// Render the archive document for `issue`.
///
/// `comments` must already be restricted to the owner's comments; the
/// comments section is omitted when it is empty.
pub fn render_archive(issue: &Issue, comments: &[&Comment]) -> String {
    let mut doc = String::new();

    doc.push_str(&format!("# [{}]({})\n\n", issue.title, issue.html_url));

    doc.push_str("## Metadata\n\n");
    doc.push_str(&format!("- Created: {}\n", format_time(Some(&issue.created_at))));
    doc.push_str(&format!("- Updated: {}\n", format_time(Some(&issue.updated_at))));
    if !issue.labels.is_empty() {
        let names: Vec<&str> = issue.labels.iter().map(|l| l.name.as_str()).collect();
        doc.push_str(&format!("- Labels: {}\n", names.join(", ")));
    }
    doc.push('\n');

    doc.push_str("## Content\n\n");
    let body = issue.body_text().trim_end();
    doc.push_str(&format!("{}\n", if body.is_empty() { NO_CONTENT } else { body }));

    if comments.is_empty() {
        return doc;
    }

    doc.push_str("\n## Comments\n\n");
    for comment in comments {
        let body = comment.body.as_deref().unwrap_or_default().trim_end();
        doc.push_str(&format!(
            "### Comment ({})\n\n",
            format_time(comment.created_at.as_ref())
        ));
        doc.push_str(&format!("{}\n\n", if body.is_empty() { NO_CONTENT } else { body }));
        doc.push_str("---\n\n");
    }

    doc
}

/// Fetch the owner's comments on `issue` and write its archive file into `dir`.
///
/// A comment fetch failure is recorded and the file is written without
/// comments. Write failures propagate.
#[instrument(skip_all, fields(number = issue.number))]
pub async fn archive_issue<T: IssueTracker>(
    tracker: &T,
    issue: &Issue,
    owner: &str,
    dir: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<ArtifactMeta> {
    let comments = match tracker.list_comments(issue).await {
        Ok(comments) => comments,
        Err(e) => {
            diagnostics.record(
                DiagnosticKind::PartialFetch,
                format!("issue #{}", issue.number),
                format!("comments unavailable: {e}"),
            );
            Vec::new()
        }
    };
    let owned: Vec<&Comment> = comments.iter().filter(|c| c.is_authored_by(owner)).collect();

    let content = render_archive(issue, &owned);
    let meta = write_artifact(&dir.join(archive_file_name(issue)), &content)?;

    debug!(
        path = %meta.path.display(),
        comments = owned.len(),
        status = ?meta.status,
        "issue archived"
    );
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chrono::{TimeZone, Utc};
    use gitblog_shared::{GitBlogError, Label, Repository};
    use gitblog_tracker::MemoryTracker;

    use crate::artifact::ArtifactStatus;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("gitblog-archive-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn issue(body: Option<&str>) -> Issue {
        let at = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        Issue {
            number: 12,
            title: "Hello/World post".into(),
            html_url: "https://github.com/me/blog/issues/12".into(),
            body: body.map(str::to_string),
            author: "me".into(),
            created_at: at,
            updated_at: at,
            labels: vec![Label::new("Rust"), Label::new("Life")],
            is_pull_request: false,
        }
    }

    fn comment(id: u64, author: &str, body: &str) -> Comment {
        Comment {
            id,
            body: Some(body.into()),
            author: author.into(),
            created_at: Some(Utc.with_ymd_and_hms(2024, 2, 4, 0, 0, 0).unwrap()),
        }
    }

    fn tracker() -> MemoryTracker {
        MemoryTracker::new("me", Repository::from_coordinate("me/blog").unwrap())
    }

    #[test]
    fn file_name_combines_number_and_title() {
        assert_eq!(archive_file_name(&issue(None)), "12_Hello-World.post.md");
    }

    #[test]
    fn document_without_comments() {
        let doc = render_archive(&issue(Some("Body text\n")), &[]);
        assert_eq!(
            doc,
            "# [Hello/World post](https://github.com/me/blog/issues/12)\n\n\
             ## Metadata\n\n\
             - Created: 2024-02-03\n\
             - Updated: 2024-02-03\n\
             - Labels: Rust, Life\n\n\
             ## Content\n\n\
             Body text\n"
        );
        assert!(!doc.contains("## Comments"));
    }

    #[test]
    fn empty_body_gets_placeholder() {
        let doc = render_archive(&issue(None), &[]);
        assert!(doc.ends_with("## Content\n\n(no content)\n"));
    }

    #[test]
    fn comments_section_lists_given_comments() {
        let c = comment(1, "me", "Update: done");
        let doc = render_archive(&issue(Some("x")), &[&c]);
        assert!(doc.contains(
            "\n## Comments\n\n### Comment (2024-02-04)\n\nUpdate: done\n\n---\n\n"
        ));
    }

    #[tokio::test]
    async fn archives_only_owner_comments() {
        let tmp = temp_dir();
        let tracker = tracker().with_comments(
            12,
            vec![comment(1, "me", "mine"), comment(2, "you", "theirs")],
        );
        let mut diagnostics = Diagnostics::new();

        let meta = archive_issue(&tracker, &issue(Some("x")), "me", &tmp, &mut diagnostics)
            .await
            .unwrap();

        assert_eq!(meta.status, ArtifactStatus::Created);
        assert_eq!(meta.path, tmp.join("12_Hello-World.post.md"));
        let written = std::fs::read_to_string(&meta.path).unwrap();
        assert!(written.contains("mine"));
        assert!(!written.contains("theirs"));
        assert!(diagnostics.is_empty());

        // Same snapshot again: same bytes, overwritten in place.
        let again = archive_issue(&tracker, &issue(Some("x")), "me", &tmp, &mut diagnostics)
            .await
            .unwrap();
        assert_eq!(again.status, ArtifactStatus::Unchanged);
        assert_eq!(again.sha256, meta.sha256);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn only_foreign_comments_omit_section() {
        let tmp = temp_dir();
        let tracker = tracker().with_comments(12, vec![comment(2, "you", "theirs")]);
        let mut diagnostics = Diagnostics::new();

        let meta = archive_issue(&tracker, &issue(Some("x")), "me", &tmp, &mut diagnostics)
            .await
            .unwrap();
        let written = std::fs::read_to_string(&meta.path).unwrap();
        assert!(!written.contains("## Comments"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn comment_failure_still_writes_file() {
        let tmp = temp_dir();
        let tracker = tracker().failing_comments(12);
        let mut diagnostics = Diagnostics::new();

        let meta = archive_issue(&tracker, &issue(Some("x")), "me", &tmp, &mut diagnostics)
            .await
            .unwrap();

        assert!(meta.path.exists());
        assert_eq!(diagnostics.count(DiagnosticKind::PartialFetch), 1);
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn unwritable_dir_is_fatal() {
        let tmp = temp_dir();
        // A regular file where the archive directory should be.
        let blocked = tmp.join("BACKUP");
        std::fs::write(&blocked, "").unwrap();
        let mut diagnostics = Diagnostics::new();

        let err = archive_issue(&tracker(), &issue(None), "me", &blocked, &mut diagnostics)
            .await
            .unwrap_err();
        assert!(matches!(err, GitBlogError::Io { .. }));
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
