//! File placement for uploaded emote images.
//!
//! Images live under `<content_dir>/emoticons/uploaded/` in a tree mirroring
//! the emote's canonical name: `a/b` is stored as `a/b.png` and its hover
//! image as `a/b_hover.png`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{AppError, AppResult};

/// Directory, relative to the content directory, holding uploaded emotes.
pub const UPLOAD_ROOT: &str = "emoticons/uploaded";

/// Storage key without extension for an emote's base or hover image.
#[must_use]
pub fn emote_image_stem(canonical_name: &str, hover: bool) -> String {
    let mut stem = String::from(UPLOAD_ROOT);
    for segment in canonical_name.split('/').filter(|s| !s.is_empty()) {
        stem.push('/');
        stem.push_str(segment);
    }
    if hover {
        stem.push_str("_hover");
    }
    stem
}

/// Storage key for an emote image with the given extension.
#[must_use]
pub fn emote_image_key(canonical_name: &str, hover: bool, extension: &str) -> String {
    format!("{}.{extension}", emote_image_stem(canonical_name, hover))
}

/// Glob matching every stored variant of `stem`, whatever its extension.
#[must_use]
pub fn stale_files_pattern(stem: &str) -> String {
    format!("{}.*", glob::Pattern::escape(stem))
}

/// Moves image files into place under a storage root.
#[async_trait::async_trait]
pub trait FilePlacement: Send + Sync {
    /// Move a spooled file to `key`, replacing whatever is there.
    async fn move_file(&self, from: &Path, key: &str) -> AppResult<PathBuf>;

    /// Copy a file to `key`, leaving the source in place.
    async fn copy_file(&self, from: &Path, key: &str) -> AppResult<PathBuf>;

    /// Remove every file whose key matches the glob `pattern`.
    /// Returns the number of files removed.
    async fn purge_matching(&self, pattern: &str) -> AppResult<usize>;

    /// Remove the file at `key` if it exists.
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Absolute path for a key.
    fn path_for(&self, key: &str) -> PathBuf;

    /// URL under which the image of `canonical_name` is served.
    fn public_url(&self, canonical_name: &str) -> String;
}

/// Local filesystem placement rooted at the content directory.
#[derive(Debug, Clone)]
pub struct LocalFilePlacement {
    base_path: PathBuf,
    url_prefix: String,
}

impl LocalFilePlacement {
    /// Create a placement backend rooted at `base_path`, served from `/`.
    #[must_use]
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            url_prefix: "/".to_string(),
        }
    }

    /// Serve images under `prefix` instead, e.g. a CDN host.
    #[must_use]
    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    async fn ensure_parent(path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl FilePlacement for LocalFilePlacement {
    async fn move_file(&self, from: &Path, key: &str) -> AppResult<PathBuf> {
        let to = self.path_for(key);
        Self::ensure_parent(&to).await?;

        if let Err(e) = tokio::fs::rename(from, &to).await {
            // Spool and content directories may sit on different devices.
            debug!(error = %e, from = %from.display(), "Rename failed, falling back to copy");
            tokio::fs::copy(from, &to)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to move file: {e}")))?;
            tokio::fs::remove_file(from)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to remove spooled file: {e}")))?;
        }

        debug!(key = key, "Placed file");
        Ok(to)
    }

    async fn copy_file(&self, from: &Path, key: &str) -> AppResult<PathBuf> {
        let to = self.path_for(key);
        Self::ensure_parent(&to).await?;

        tokio::fs::copy(from, &to)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to copy file: {e}")))?;

        Ok(to)
    }

    async fn purge_matching(&self, pattern: &str) -> AppResult<usize> {
        let full_pattern = format!(
            "{}/{pattern}",
            glob::Pattern::escape(&self.base_path.to_string_lossy())
        );

        let paths = tokio::task::spawn_blocking(move || -> AppResult<Vec<PathBuf>> {
            let entries = glob::glob(&full_pattern)
                .map_err(|e| AppError::Storage(format!("Invalid glob pattern: {e}")))?;
            Ok(entries.filter_map(Result::ok).filter(|p| p.is_file()).collect())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        for path in &paths {
            tokio::fs::remove_file(path)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to delete file: {e}")))?;
        }

        debug!(pattern = pattern, removed = paths.len(), "Purged files");
        Ok(paths.len())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete file: {e}"))),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }

    fn public_url(&self, canonical_name: &str) -> String {
        format!("{}{canonical_name}", self.url_prefix)
    }
}
