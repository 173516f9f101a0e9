//! Run-level record of recoverable, per-item failures.
//!
//! Nothing recorded here stops a run. Each entry is logged when recorded and
//! the full list is handed back in the run report.

use std::fmt;

use serde::Serialize;
use tracing::warn;

/// What kind of per-item failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A requested issue number does not exist.
    Resolution,
    /// A record, or its comments or reactions, could not be fetched.
    PartialFetch,
    /// Input that cannot be read was skipped (a friend comment with no body).
    Parse,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Resolution => "resolution",
            Self::PartialFetch => "partial-fetch",
            Self::Parse => "parse",
        };
        f.write_str(s)
    }
}

/// One absorbed failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// The record concerned, e.g. `issue #12` or `comment 991`.
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.subject, self.message)
    }
}

/// Ordered list of diagnostics collected during one run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a failure.
    pub fn record(
        &mut self,
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl fmt::Display,
    ) {
        let diagnostic = Diagnostic {
            kind,
            subject: subject.into(),
            message: message.to_string(),
        };
        warn!(kind = %diagnostic.kind, subject = %diagnostic.subject, "{}", diagnostic.message);
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of entries of `kind`.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }
}
