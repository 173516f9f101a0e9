//! Checkbox task extraction for TODO issues.

use std::sync::LazyLock;

use regex::Regex;

use gitblog_shared::Issue;

/// A TODO issue reduced to its summary line and task lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoList {
    /// `[title](url)--N jobs to do--M jobs done`, or `[title](url) all done`.
    pub summary: String,
    /// Done lines first, then undone lines, each group in body order.
    /// Empty when nothing is left to do.
    pub tasks: Vec<String>,
    pub undone: usize,
    pub done: usize,
}

impl TodoList {
    /// Whether every task is checked (or there were none).
    pub fn all_done(&self) -> bool {
        self.undone == 0
    }
}

enum Task {
    Done,
    Undone,
}

fn classify(line: &str) -> Option<Task> {
    static TASK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^- \[([ xX])\] ").expect("valid regex"));

    let caps = TASK_RE.captures(line)?;
    match &caps[1] {
        " " => Some(Task::Undone),
        _ => Some(Task::Done),
    }
}

/// Split an issue body into done and undone checkbox lines.
///
/// Lines that are neither are ignored.
pub fn parse_todo(issue: &Issue) -> TodoList {
    let mut done = Vec::new();
    let mut undone = Vec::new();

    for line in issue.body_text().lines() {
        match classify(line) {
            Some(Task::Done) => done.push(line.to_string()),
            Some(Task::Undone) => undone.push(line.to_string()),
            None => {}
        }
    }

    let link = format!("[{}]({})", issue.title, issue.html_url);
    let (undone_count, done_count) = (undone.len(), done.len());

    if undone.is_empty() {
        return TodoList {
            summary: format!("{link} all done"),
            tasks: Vec::new(),
            undone: 0,
            done: done_count,
        };
    }

    let summary = format!("{link}--{undone_count} jobs to do--{done_count} jobs done");
    done.extend(undone);

    TodoList {
        summary,
        tasks: done,
        undone: undone_count,
        done: done_count,
    }
}
