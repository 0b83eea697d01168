//! Storage configuration.

/// Behavior knobs for a [`StorageHandle`](crate::StorageHandle).
///
/// # Examples
///
/// ```
/// use plegma_storage::StorageConfig;
///
/// let config = StorageConfig::default()
///     .with_sync_on_commit(false)
///     .with_locking(false);
/// assert!(!config.sync_on_commit);
/// ```
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Whether part files are fsynced at the end of a commit.
    pub sync_on_commit: bool,
    /// Whether a lock file is held for the lifetime of the handle.
    ///
    /// Disable for read-only tooling that inspects a graph directory while
    /// another process holds it open.
    pub locking: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sync_on_commit: true,
            locking: true,
        }
    }
}

impl StorageConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether commits fsync part files.
    #[must_use]
    pub fn with_sync_on_commit(mut self, enabled: bool) -> Self {
        self.sync_on_commit = enabled;
        self
    }

    /// Sets whether the handle holds a lock file.
    #[must_use]
    pub fn with_locking(mut self, enabled: bool) -> Self {
        self.locking = enabled;
        self
    }
}
