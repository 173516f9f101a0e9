//! Atom feed builder.
//!
//! Projects the issue universe into an Atom 1.0 document: owner-authored,
//! non-blank, non-pull-request issues, most recently updated first. Each
//! entry embeds the GFM-rendered body as HTML inside CDATA.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, instrument};

use gitblog_markdown::{filter_valid_text, render_html};
use gitblog_shared::{FeedConfig, Issue, Repository};

use crate::selector::sort_by_recency;

pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const PUBLISHED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Where the published feed is served from, used as the `rel="self"` link.
pub fn raw_feed_url(repo: &Repository, branch: &str, feed_file: &str) -> String {
    format!(
        "https://raw.githubusercontent.com/{}/{branch}/{}",
        repo.full_name,
        feed_file.trim_start_matches("./")
    )
}

/// The issues that become feed entries, in entry order.
pub fn feed_entries<'a>(issues: &'a [Issue], owner: &str, limit: Option<usize>) -> Vec<&'a Issue> {
    let mut entries: Vec<&Issue> = issues
        .iter()
        .filter(|i| !i.is_blank() && i.is_authored_by(owner) && !i.is_pull_request)
        .collect();
    sort_by_recency(&mut entries);
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}

/// Render the complete Atom document.
#[instrument(skip_all, fields(repo = %repo.full_name, owner = owner))]
pub fn build_feed(
    repo: &Repository,
    owner: &str,
    issues: &[Issue],
    config: &FeedConfig,
    self_url: &str,
    now: DateTime<Utc>,
) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version='1.0' encoding='UTF-8'?>\n");
    xml.push_str(&format!("<feed xmlns=\"{ATOM_NS}\">\n"));
    xml.push_str(&format!("  <id>{}</id>\n", escape_xml(&repo.html_url)));
    xml.push_str(&format!(
        "  <title>{}</title>\n",
        escape_xml(&format!("RSS feed of {}'s {}", repo.owner, repo.name))
    ));
    xml.push_str(&format!(
        "  <updated>{}</updated>\n",
        now.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));

    if config.author_name.is_some() || config.author_email.is_some() {
        xml.push_str("  <author>");
        if let Some(name) = &config.author_name {
            xml.push_str(&format!("<name>{}</name>", escape_xml(name)));
        }
        if let Some(email) = &config.author_email {
            xml.push_str(&format!("<email>{}</email>", escape_xml(email)));
        }
        xml.push_str("</author>\n");
    }

    xml.push_str(&format!(
        "  <link href=\"{}\" rel=\"alternate\"/>\n",
        escape_xml(&repo.html_url)
    ));
    xml.push_str(&format!("  <link href=\"{}\" rel=\"self\"/>\n", escape_xml(self_url)));

    let entries = feed_entries(issues, owner, config.limit);
    for issue in &entries {
        write_entry(&mut xml, issue);
    }

    xml.push_str("</feed>\n");
    debug!(entries = entries.len(), bytes = xml.len(), "feed built");
    xml
}

fn write_entry(xml: &mut String, issue: &Issue) {
    let url = escape_xml(&issue.html_url);
    let body = render_html(&filter_valid_text(issue.body_text()));

    xml.push_str("  <entry>\n");
    xml.push_str(&format!("    <id>{url}</id>\n"));
    xml.push_str(&format!("    <link href=\"{url}\"/>\n"));
    xml.push_str(&format!(
        "    <title>{}</title>\n",
        escape_xml(&filter_valid_text(&issue.title))
    ));
    xml.push_str(&format!(
        "    <published>{}</published>\n",
        issue.created_at.format(PUBLISHED_FORMAT)
    ));
    for label in &issue.labels {
        xml.push_str(&format!(
            "    <category term=\"{}\"/>\n",
            escape_xml(&filter_valid_text(&label.name))
        ));
    }
    xml.push_str(&format!("    <content type=\"html\">{}</content>\n", cdata(&body)));
    xml.push_str("  </entry>\n");
}

/// Escape the five XML special characters.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap `text` in CDATA, splitting any embedded `]]>`.
fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}
