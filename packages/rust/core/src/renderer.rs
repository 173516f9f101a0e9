//! Index document renderer.
//!
//! [`IndexRenderer`] owns one in-memory Markdown buffer for the whole run.
//! [`IndexRenderer::render_header`] resets it; every other section appends.
//! The caller decides section order and flushes the buffer once with
//! [`IndexRenderer::finish`].
//!
//! Shared contract for the item sections: candidates are owner-authored
//! issues in recency order, an empty candidate set writes nothing, and each
//! item is a link line with an optional indented summary. The recent section
//! is the one exception to the empty rule; its heading is always written.

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use gitblog_markdown::{
    format_datetime, format_time, friends_table, parse_friend_block, parse_todo, render_html,
    summarize,
};
use gitblog_shared::{Issue, Label, RenderConfig, Repository};
use gitblog_tracker::IssueTracker;

use crate::classifier::ordered_labels;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::selector::{select_by_any_label, select_by_label, select_owned, select_recent};

pub const BLOG_DESCRIPTION: &str = "My personal blog using issues and GitHub Actions";
pub const PINNED_HEADING: &str = "## Pinned";
pub const RECENT_HEADING: &str = "## Recent Updates";
pub const TODO_HEADING: &str = "## TODO";
pub const COLLAPSE_OPEN: &str = "<details><summary>Show more</summary>";
pub const COLLAPSE_CLOSE: &str = "</details>";

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Append-only builder for the index document.
#[derive(Debug)]
pub struct IndexRenderer<'a> {
    config: &'a RenderConfig,
    owner: &'a str,
    doc: String,
}

impl<'a> IndexRenderer<'a> {
    pub fn new(config: &'a RenderConfig, owner: &'a str) -> Self {
        Self {
            config,
            owner,
            doc: String::new(),
        }
    }

    /// The document rendered so far.
    pub fn as_str(&self) -> &str {
        &self.doc
    }

    /// Consume the renderer, returning the finished document.
    pub fn finish(self) -> String {
        self.doc
    }

    /// Start a fresh document with the blog header.
    ///
    /// The owner's most recent about issue, if any, is linked as "About Me".
    pub fn render_header(
        &mut self,
        repo: &Repository,
        feed_url: &str,
        issues: &[Issue],
        now: DateTime<Utc>,
    ) {
        self.doc.clear();

        self.doc.push_str(&format!("## [Gitblog]({})\n", repo.html_url));
        self.doc.push_str(&format!("{BLOG_DESCRIPTION}\n"));
        self.doc.push_str(&format!("[RSS Feed]({feed_url})\n"));

        let about = select_owned(
            select_by_any_label(issues, &self.config.about_labels),
            self.owner,
        );
        if let Some(issue) = about.first() {
            self.doc.push_str(&format!("[About Me]({})\n", issue.html_url));
        }

        self.doc.push_str(&format!("**Last updated**: {}\n\n", format_datetime(&now)));
    }

    /// Friend links endorsed by the owner, as a collapsed HTML table.
    ///
    /// Every comment on an owned friends issue that carries a heart from the
    /// owner is parsed as a friend block. Fetch failures and bodiless
    /// comments are recorded and skipped.
    #[instrument(skip_all, fields(owner = self.owner))]
    pub async fn render_friends<T: IssueTracker>(
        &mut self,
        tracker: &T,
        issues: &[Issue],
        diagnostics: &mut Diagnostics,
    ) {
        let candidates = select_owned(
            select_by_any_label(issues, &self.config.friends_labels),
            self.owner,
        );
        let Some(first) = candidates.first() else {
            return;
        };

        let mut rows = Vec::new();
        for issue in &candidates {
            let comments = match tracker.list_comments(issue).await {
                Ok(comments) => comments,
                Err(e) => {
                    diagnostics.record(
                        DiagnosticKind::PartialFetch,
                        format!("issue #{}", issue.number),
                        format!("comments unavailable: {e}"),
                    );
                    continue;
                }
            };

            for comment in &comments {
                let reactions = match tracker.list_reactions(comment).await {
                    Ok(reactions) => reactions,
                    Err(e) => {
                        diagnostics.record(
                            DiagnosticKind::PartialFetch,
                            format!("comment {}", comment.id),
                            format!("reactions unavailable: {e}"),
                        );
                        continue;
                    }
                };
                if !reactions.iter().any(|r| r.is_heart_from(self.owner)) {
                    continue;
                }

                let Some(body) = comment.body.as_deref() else {
                    diagnostics.record(
                        DiagnosticKind::Parse,
                        format!("comment {}", comment.id),
                        "friend comment has no body",
                    );
                    continue;
                };
                rows.push(parse_friend_block(body).to_table_row());
            }
        }

        debug!(friends = rows.len(), "friend entries collected");

        let table = friends_table(rows.iter().map(String::as_str));
        self.doc.push_str(&format!("## [Friends]({})\n", first.html_url));
        self.doc.push_str("<details><summary>Show</summary>\n");
        self.doc.push_str(&render_html(&table));
        self.doc.push_str("</details>\n\n");
    }

    /// Owned issues carrying a pinned label.
    pub fn render_pinned(&mut self, issues: &[Issue]) {
        let pinned = select_owned(
            select_by_any_label(issues, &self.config.pinned_labels),
            self.owner,
        );
        if pinned.is_empty() {
            return;
        }

        self.doc.push_str(&format!("{PINNED_HEADING}\n"));
        for issue in pinned {
            self.write_issue(issue);
        }
    }

    /// The owner's most recently updated issues. The heading is always written.
    pub fn render_recent(&mut self, issues: &[Issue]) {
        self.doc.push_str(&format!("{RECENT_HEADING}\n"));
        for issue in select_recent(issues, self.owner, self.config.recent_limit) {
            self.write_issue(issue);
        }
    }

    /// One section per non-reserved label, in classifier order.
    ///
    /// Items past the anchor threshold go inside a collapsible block.
    pub fn render_labels(&mut self, labels: &[Label], issues: &[Issue]) {
        let anchor = self.config.anchor_threshold;

        for label in ordered_labels(labels, &self.config.reserved_labels) {
            let candidates = select_owned(select_by_label(issues, &label.name), self.owner);
            if candidates.is_empty() {
                continue;
            }

            self.doc.push_str(&format!("## {}\n", label.name));
            for (i, issue) in candidates.iter().enumerate() {
                if i == anchor {
                    self.doc.push_str(&format!("{COLLAPSE_OPEN}\n\n"));
                }
                self.write_issue(issue);
            }
            if candidates.len() > anchor {
                self.doc.push_str(&format!("{COLLAPSE_CLOSE}\n\n"));
            }

            debug!(label = %label.name, items = candidates.len(), "label section rendered");
        }
    }

    /// Task lists from owned TODO issues.
    pub fn render_todo(&mut self, issues: &[Issue]) {
        let todos = select_owned(
            select_by_any_label(issues, &self.config.todo_labels),
            self.owner,
        );
        if todos.is_empty() {
            return;
        }

        self.doc.push_str(&format!("{TODO_HEADING}\n"));
        for issue in todos {
            let todo = parse_todo(issue);
            self.doc.push_str(&format!("TODO list from {}\n", todo.summary));
            for task in &todo.tasks {
                self.doc.push_str(&format!("{task}\n"));
            }
            self.doc.push('\n');
        }
    }

    fn write_issue(&mut self, issue: &Issue) {
        self.doc.push_str(&format!(
            "- [{}]({})--{}\n",
            issue.title,
            issue.html_url,
            format_time(Some(&issue.updated_at))
        ));

        let summary = summarize(
            issue.body.as_deref(),
            self.config.summary_max_lines,
            self.config.summary_max_len,
        );
        if summary.is_empty() {
            return;
        }
        for line in &summary {
            self.doc.push_str(&format!("  - {line}\n"));
        }
        self.doc.push('\n');
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use gitblog_shared::{Comment, Reaction, ReactionKind};
    use gitblog_tracker::MemoryTracker;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn issue(number: u64, author: &str, day: i64, labels: &[&str], body: Option<&str>) -> Issue {
        Issue {
            number,
            title: format!("Post {number}"),
            html_url: format!("https://github.com/me/blog/issues/{number}"),
            body: body.map(str::to_string),
            author: author.into(),
            created_at: base(),
            updated_at: base() + Duration::days(day),
            labels: labels.iter().map(|l| Label::new(*l)).collect(),
            is_pull_request: false,
        }
    }

    fn label_issues(count: u64) -> Vec<Issue> {
        (1..=count)
            .map(|n| issue(n, "me", n as i64, &["Rust"], None))
            .collect()
    }

    fn repo() -> Repository {
        Repository::from_coordinate("me/blog").unwrap()
    }

    #[test]
    fn item_line_and_summary() {
        let config = RenderConfig::default();
        let mut renderer = IndexRenderer::new(&config, "me");
        let issues = vec![issue(1, "me", 0, &[], Some("# Title\n\nfirst line\n"))];

        renderer.render_recent(&issues);

        assert_eq!(
            renderer.finish(),
            "## Recent Updates\n\
             - [Post 1](https://github.com/me/blog/issues/1)--2024-01-01\n  \
             - Title\n  \
             - first line\n\n"
        );
    }

    #[test]
    fn collapse_emitted_past_anchor() {
        let config = RenderConfig::default();
        let anchor = config.anchor_threshold as u64;
        let labels = vec![Label::described("Rust", "1-rust")];

        let mut renderer = IndexRenderer::new(&config, "me");
        renderer.render_labels(&labels, &label_issues(anchor + 1));
        let doc = renderer.finish();
        assert_eq!(doc.matches(COLLAPSE_OPEN).count(), 1);
        assert_eq!(doc.matches(COLLAPSE_CLOSE).count(), 1);

        // Exactly one item sits after the opening tag.
        let after = doc.split(COLLAPSE_OPEN).nth(1).unwrap();
        assert_eq!(after.matches("- [Post").count(), 1);
        assert!(after.contains("- [Post 1]"));
    }

    #[test]
    fn no_collapse_at_anchor() {
        let config = RenderConfig::default();
        let anchor = config.anchor_threshold as u64;
        let labels = vec![Label::new("Rust")];

        let mut renderer = IndexRenderer::new(&config, "me");
        renderer.render_labels(&labels, &label_issues(anchor));
        let doc = renderer.finish();
        assert!(doc.starts_with("## Rust\n"));
        assert!(!doc.contains(COLLAPSE_OPEN));
        assert!(!doc.contains(COLLAPSE_CLOSE));
        assert_eq!(doc.matches("- [Post").count(), anchor as usize);
    }

    #[test]
    fn label_sections_skip_reserved_and_foreign() {
        let config = RenderConfig::default();
        let labels = vec![
            Label::new("Top"),
            Label::new("Go"),
            Label::described("Rust", "1-rust"),
        ];
        let issues = vec![
            issue(1, "me", 1, &["Top"], None),
            issue(2, "you", 2, &["Go"], None),
            issue(3, "me", 3, &["Rust"], None),
        ];

        let mut renderer = IndexRenderer::new(&config, "me");
        renderer.render_labels(&labels, &issues);
        let doc = renderer.finish();

        assert!(doc.contains("## Rust\n"));
        assert!(!doc.contains("## Top"));
        // Only foreign issues: no heading at all.
        assert!(!doc.contains("## Go"));
    }

    #[test]
    fn recent_heading_survives_zero_owned() {
        let config = RenderConfig::default();
        let mut renderer = IndexRenderer::new(&config, "me");
        renderer.render_recent(&[issue(1, "you", 0, &[], Some("hi"))]);

        let doc = renderer.finish();
        assert!(doc.lines().any(|l| l == RECENT_HEADING));
        assert!(!doc.contains("Post 1"));
    }

    #[test]
    fn empty_pinned_and_todo_write_nothing() {
        let config = RenderConfig::default();
        let mut renderer = IndexRenderer::new(&config, "me");
        renderer.render_pinned(&[issue(1, "you", 0, &["Top"], None)]);
        renderer.render_todo(&[]);
        assert!(renderer.as_str().is_empty());
    }

    #[test]
    fn todo_section_lists_done_first() {
        let config = RenderConfig::default();
        let mut renderer = IndexRenderer::new(&config, "me");
        let issues = vec![issue(
            1,
            "me",
            0,
            &["TODO"],
            Some("- [x] a\n- [ ] b\n- [ ] c"),
        )];

        renderer.render_todo(&issues);

        assert_eq!(
            renderer.finish(),
            "## TODO\n\
             TODO list from [Post 1](https://github.com/me/blog/issues/1)--2 jobs to do--1 jobs done\n\
             - [x] a\n\
             - [ ] b\n\
             - [ ] c\n\n"
        );
    }

    #[test]
    fn header_resets_document() {
        let config = RenderConfig::default();
        let mut renderer = IndexRenderer::new(&config, "me");
        renderer.render_recent(&[]);

        let now = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let issues = vec![issue(9, "me", 0, &["About"], Some("me"))];
        renderer.render_header(&repo(), "https://feed", &issues, now);

        let doc = renderer.finish();
        assert!(doc.starts_with("## [Gitblog](https://github.com/me/blog)\n"));
        assert!(doc.contains("[RSS Feed](https://feed)\n"));
        assert!(doc.contains("[About Me](https://github.com/me/blog/issues/9)\n"));
        assert!(doc.ends_with("**Last updated**: 2024-05-06 07:08:09\n\n"));
        assert!(!doc.contains(RECENT_HEADING));
    }

    #[tokio::test]
    async fn friends_keeps_only_owner_hearts() {
        let config = RenderConfig::default();
        let friends = issue(4, "me", 0, &["Friends"], Some("links"));
        let comment = |id: u64, body: &str| Comment {
            id,
            body: Some(body.into()),
            author: "guest".into(),
            created_at: None,
        };
        let heart = |author: &str| Reaction {
            kind: ReactionKind::Heart,
            author: author.into(),
        };

        let tracker = MemoryTracker::new("me", repo())
            .with_comments(
                4,
                vec![
                    comment(1, "名字：Ann\n链接：https://ann.example\n描述：Maps"),
                    comment(2, "名字：Ben\n链接：https://ben.example"),
                    comment(3, "just a thank-you note"),
                    comment(4, "名字：Dee"),
                    Comment {
                        body: None,
                        ..comment(5, "")
                    },
                ],
            )
            .with_reactions(1, vec![heart("me")])
            .with_reactions(2, vec![heart("you")])
            .with_reactions(3, vec![heart("me")])
            .failing_reactions(4)
            .with_reactions(5, vec![heart("me")]);

        let mut diagnostics = Diagnostics::new();
        let mut renderer = IndexRenderer::new(&config, "me");
        renderer
            .render_friends(&tracker, std::slice::from_ref(&friends), &mut diagnostics)
            .await;
        let doc = renderer.finish();

        assert!(doc.starts_with("## [Friends](https://github.com/me/blog/issues/4)\n"));
        assert!(doc.contains("<details><summary>Show</summary>"));
        assert!(doc.contains("<td>Ann</td>"));
        assert!(!doc.contains("Ben"));
        assert!(!doc.contains("Dee"));
        assert!(doc.ends_with("</details>\n\n"));
        // The hearted note without key-value lines is an all-empty row.
        assert_eq!(doc.matches("<td></td>").count(), 3);

        assert_eq!(diagnostics.count(DiagnosticKind::Parse), 1);
        assert_eq!(diagnostics.count(DiagnosticKind::PartialFetch), 1);
    }

    #[tokio::test]
    async fn friends_comment_failure_continues() {
        let config = RenderConfig::default();
        let issues = vec![
            issue(4, "me", 2, &["Friends"], None),
            issue(5, "me", 1, &["Friends"], None),
        ];
        let tracker = MemoryTracker::new("me", repo())
            .with_comments(
                5,
                vec![Comment {
                    id: 50,
                    body: Some("名字：Eve\n链接：https://eve.example".into()),
                    author: "eve".into(),
                    created_at: None,
                }],
            )
            .with_reactions(
                50,
                vec![Reaction {
                    kind: ReactionKind::Heart,
                    author: "me".into(),
                }],
            )
            .failing_comments(4);

        let mut diagnostics = Diagnostics::new();
        let mut renderer = IndexRenderer::new(&config, "me");
        renderer.render_friends(&tracker, &issues, &mut diagnostics).await;
        let doc = renderer.finish();

        // Heading links to the most recently updated friends issue.
        assert!(doc.starts_with("## [Friends](https://github.com/me/blog/issues/4)\n"));
        assert!(doc.contains("<td>Eve</td>"));
        assert_eq!(diagnostics.count(DiagnosticKind::PartialFetch), 1);
    }

    #[tokio::test]
    async fn friends_without_candidates_writes_nothing() {
        let config = RenderConfig::default();
        let tracker = MemoryTracker::new("me", repo());
        let mut diagnostics = Diagnostics::new();
        let mut renderer = IndexRenderer::new(&config, "me");
        renderer
            .render_friends(&tracker, &[issue(1, "you", 0, &["Friends"], None)], &mut diagnostics)
            .await;
        assert!(renderer.as_str().is_empty());
        assert!(diagnostics.is_empty());
    }
}
