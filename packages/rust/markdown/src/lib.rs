//! Text processing for Gitblog output.
//!
//! Holds the small, pure pieces the renderers are built from: date and file
//! name formatting, summaries, the TODO checkbox parser, the friend-link
//! block parser, and Markdown → HTML conversion via `pulldown-cmark`.

mod friends;
mod text;
mod todo;

use pulldown_cmark::{Options, Parser, html};
use tracing::debug;

pub use friends::{FRIENDS_TABLE_HEAD, FriendEntry, SEPARATOR, friends_table, parse_friend_block};
pub use text::{
    ELLIPSIS, UNKNOWN_TIME, filter_valid_text, format_datetime, format_time, sanitize_filename,
    summarize,
};
pub use todo::{TodoList, parse_todo};

/// Render GitHub-flavoured Markdown to an HTML fragment.
///
/// Tables, strikethrough, task lists and footnotes are enabled so issue
/// bodies render the way the tracker shows them.
pub fn render_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);

    debug!(md_len = markdown.len(), html_len = out.len(), "rendered markdown");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_tables() {
        let table = friends_table(["| Alice | https://alice.example | Compilers |\n"]);
        let out = render_html(&table);
        assert!(out.contains("<table>"));
        assert!(out.contains("<th>Name</th>"));
        assert!(out.contains("<td>Alice</td>"));
    }

    #[test]
    fn renders_task_lists_and_strikethrough() {
        let out = render_html("- [x] done\n- [ ] open\n\n~~gone~~");
        assert!(out.contains("checkbox"));
        assert!(out.contains("<del>gone</del>"));
    }

    #[test]
    fn escapes_inline_html_text() {
        let out = render_html("a < b & c");
        assert!(out.contains("a &lt; b &amp; c"));
    }
}
