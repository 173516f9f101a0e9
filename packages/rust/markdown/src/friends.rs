//! Parser for the `key：value` blocks that describe a friend link.
//!
//! A friend entry is written as a comment such as:
//!
//! ```text
//! 名字：Alice
//! 链接：https://alice.example
//! 描述：Writes about compilers
//! ```
//!
//! English keys (`name`, `link`, `desc`/`description`) are accepted as well.

/// Full-width colon separating key from value.
pub const SEPARATOR: char = '：';

/// Header and alignment rows of the friends table.
pub const FRIENDS_TABLE_HEAD: &str = "| Name | Link | Desc |\n| ---- | ---- | ---- |\n";

/// A curated external link taken from an owner-endorsed comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendEntry {
    pub name: String,
    pub link: String,
    pub description: String,
}

impl FriendEntry {
    /// One markdown table row, matching [`FRIENDS_TABLE_HEAD`].
    pub fn to_table_row(&self) -> String {
        format!(
            "| {} | {} | {} |\n",
            escape_cell(&self.name),
            escape_cell(&self.link),
            escape_cell(&self.description)
        )
    }
}

/// Parse a friend block.
///
/// Blank lines and lines without [`SEPARATOR`] are skipped, later keys
/// overwrite earlier ones, and missing keys stay empty. Any text yields an
/// entry, so a comment with no `key：value` line becomes an empty row.
pub fn parse_friend_block(text: &str) -> FriendEntry {
    let mut entry = FriendEntry::default();

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let Some((key, value)) = line.split_once(SEPARATOR) else {
            continue;
        };

        let value = value.trim().to_string();
        match key.trim() {
            "名字" | "name" | "Name" => entry.name = value,
            "链接" | "link" | "Link" => entry.link = value,
            "描述" | "desc" | "Desc" | "description" | "Description" => entry.description = value,
            other => tracing::debug!(key = other, "ignoring unknown friend key"),
        }
    }

    entry
}

/// Assemble the markdown table from rendered rows.
pub fn friends_table<'a>(rows: impl IntoIterator<Item = &'a str>) -> String {
    let mut table = String::from(FRIENDS_TABLE_HEAD);
    for row in rows {
        table.push_str(row);
    }
    table
}

/// Keep a cell from splitting the row.
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
