//! Shared types, error model, and configuration for Gitblog.
//!
//! This crate is the foundation depended on by all other Gitblog crates.
//! It provides:
//! - [`GitBlogError`]: the unified error type
//! - Domain types ([`Issue`], [`Comment`], [`Reaction`], [`Label`], [`Repository`])
//! - Configuration ([`AppConfig`], [`RenderConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, FeedConfig, IssueState, LabelsConfig, OutputConfig,
    RenderConfig, RenderSettings, init_config, load_config, load_config_from, validate_config,
};
pub use error::{GitBlogError, Result};
pub use types::{Comment, Issue, Label, Reaction, ReactionKind, Repository};
