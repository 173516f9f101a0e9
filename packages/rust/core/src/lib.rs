//! Content classification and rendering for Gitblog.
//!
//! This crate turns an issue universe into the published artifacts:
//! the categorized index document, the Atom feed, and one archive file
//! per issue. [`pipeline::run`] drives the whole thing end to end.

pub mod archive;
pub mod artifact;
pub mod classifier;
pub mod diagnostics;
pub mod feed;
pub mod pipeline;
pub mod renderer;
pub mod selector;

pub use artifact::{ArtifactMeta, ArtifactStatus};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use pipeline::{ProgressReporter, RunConfig, RunReport, SilentProgress, run, write_report};
