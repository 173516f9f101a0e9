//! Atomic artifact writes with content checksums.
//!
//! Every output file (index, feed, archive) goes through [`write_artifact`]:
//! the content lands in a hidden temp file next to the target and is then
//! renamed over it, so a reader never sees a half-written document.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use gitblog_shared::{GitBlogError, Result};

/// How a write compared to what was on disk before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    Created,
    Updated,
    Unchanged,
}

/// Metadata for one written file.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactMeta {
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: usize,
    pub status: ArtifactStatus,
}

/// Hex-encoded SHA-256 of `content`.
pub fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Write `content` to `target`, creating parent directories as needed.
///
/// An existing file is always overwritten. Any filesystem failure is
/// returned as [`GitBlogError::Io`].
pub fn write_artifact(target: &Path, content: &str) -> Result<ArtifactMeta> {
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| GitBlogError::io(parent, e))?;

    let status = match std::fs::read(target) {
        Ok(existing) if existing == content.as_bytes() => ArtifactStatus::Unchanged,
        Ok(_) => ArtifactStatus::Updated,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => ArtifactStatus::Created,
        Err(e) => return Err(GitBlogError::io(target, e)),
    };

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| GitBlogError::validation(format!("not a file path: {}", target.display())))?;
    let temp = parent.join(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| GitBlogError::io(&temp, e))?;
    std::fs::rename(&temp, target).map_err(|e| GitBlogError::io(target, e))?;

    debug!(path = %target.display(), size = content.len(), ?status, "wrote artifact");

    Ok(ArtifactMeta {
        path: target.to_path_buf(),
        sha256: sha256_hex(content.as_bytes()),
        size_bytes: content.len(),
        status,
    })
}
