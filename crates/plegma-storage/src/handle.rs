//! Open graph locations.
//!
//! A [`StorageHandle`] is an open reference to one graph directory. Opening
//! or creating a handle acquires a lock file that is released when the
//! handle is dropped, on every exit path; everything else in the directory
//! is plain part files described by the manifest.

use crate::codec;
use crate::config::StorageConfig;
use crate::manifest::{GraphManifest, LOCK_FILE, MANIFEST_FILE};
use crate::segment::{self, TopologySegment};
use arrow::record_batch::RecordBatch;
use plegma_common::{Error, Result};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

/// Everything read back from one stored graph.
#[derive(Debug, Clone)]
pub struct StoredGraph {
    /// The graph's manifest; authoritative for entity counts when a table
    /// was materialized without columns.
    pub manifest: GraphManifest,
    /// The CSR topology.
    pub topology: TopologySegment,
    /// Node property table batches, possibly column-projected.
    pub node_batches: Vec<RecordBatch>,
    /// Edge property table batches, possibly column-projected.
    pub edge_batches: Vec<RecordBatch>,
}

/// An open reference to a persisted graph location.
pub struct StorageHandle {
    path: PathBuf,
    config: StorageConfig,
    _lock: Option<LockGuard>,
}

impl StorageHandle {
    /// Opens an existing graph location with the default configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, StorageConfig::default())
    }

    /// Opens an existing graph location.
    ///
    /// Fails with not-found if there is no graph at `path`.
    pub fn open_with(path: impl AsRef<Path>, config: StorageConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.join(MANIFEST_FILE).is_file() {
            return Err(Error::NotFound(format!(
                "no graph at {}",
                path.display()
            )));
        }
        let lock = if config.locking {
            Some(LockGuard::acquire(&path)?)
        } else {
            None
        };
        tracing::debug!(path = %path.display(), "opened graph storage");
        Ok(Self {
            path,
            config,
            _lock: lock,
        })
    }

    /// Creates a brand-new graph location with the default configuration.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::create_with(path, StorageConfig::default())
    }

    /// Creates a brand-new graph location.
    ///
    /// Fails with an `AlreadyExists` io-error if anything is present at
    /// `path`; this never overwrites.
    pub fn create_with(path: impl AsRef<Path>, config: StorageConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination {} already exists", path.display()),
            )));
        }
        std::fs::create_dir_all(&path)?;
        let lock = if config.locking {
            Some(LockGuard::acquire(&path)?)
        } else {
            None
        };
        tracing::debug!(path = %path.display(), "created graph storage");
        Ok(Self {
            path,
            config,
            _lock: lock,
        })
    }

    /// The graph directory this handle refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the full stored graph.
    pub fn load(&self) -> Result<StoredGraph> {
        let manifest: GraphManifest = codec::read_part(&self.path.join(MANIFEST_FILE))?;
        manifest.check_version()?;
        let topology: TopologySegment =
            codec::read_part(&self.path.join(&manifest.topology_file))?;
        let (_, node_batches) = segment::read_table(&self.path.join(&manifest.node_table_file))?;
        let (_, edge_batches) = segment::read_table(&self.path.join(&manifest.edge_table_file))?;
        Ok(StoredGraph {
            manifest,
            topology,
            node_batches,
            edge_batches,
        })
    }

    /// Reads the stored graph, materializing only the named node and edge
    /// properties, in request order per axis.
    ///
    /// Fails with invalid-argument if a requested name is missing or
    /// ambiguous, or if a name is requested twice; an empty list yields a
    /// table with no columns and the manifest's row count.
    pub fn load_selective(
        &self,
        node_properties: &[&str],
        edge_properties: &[&str],
    ) -> Result<StoredGraph> {
        let manifest: GraphManifest = codec::read_part(&self.path.join(MANIFEST_FILE))?;
        manifest.check_version()?;
        let topology: TopologySegment =
            codec::read_part(&self.path.join(&manifest.topology_file))?;
        let (_, node_batches) = segment::read_table_selective(
            &self.path.join(&manifest.node_table_file),
            node_properties,
        )?;
        let (_, edge_batches) = segment::read_table_selective(
            &self.path.join(&manifest.edge_table_file),
            edge_properties,
        )?;
        Ok(StoredGraph {
            manifest,
            topology,
            node_batches,
            edge_batches,
        })
    }

    /// Writes a complete graph to this location, replacing any prior
    /// contents part by part. The manifest lands last via an atomic rename,
    /// so a readable manifest always refers to complete parts.
    pub fn commit(
        &self,
        topology: &TopologySegment,
        node_batches: &[RecordBatch],
        edge_batches: &[RecordBatch],
    ) -> Result<()> {
        let sync = self.config.sync_on_commit;
        let manifest = GraphManifest::new(topology.num_nodes(), topology.num_edges());

        codec::write_part(&self.path.join(&manifest.topology_file), topology, sync)?;
        segment::write_table(&self.path.join(&manifest.node_table_file), node_batches, sync)?;
        segment::write_table(&self.path.join(&manifest.edge_table_file), edge_batches, sync)?;

        let staged = self.path.join(format!("{MANIFEST_FILE}.tmp"));
        codec::write_part(&staged, &manifest, sync)?;
        std::fs::rename(&staged, self.path.join(MANIFEST_FILE))?;

        tracing::debug!(
            path = %self.path.display(),
            num_nodes = manifest.num_nodes,
            num_edges = manifest.num_edges,
            "committed graph"
        );
        Ok(())
    }
}

impl std::fmt::Debug for StorageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageHandle")
            .field("path", &self.path)
            .field("locked", &self._lock.is_some())
            .finish()
    }
}

/// A held lock file, removed on drop.
struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    fn acquire(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::warn!(path = %dir.display(), "graph storage is locked");
                Err(Error::Io(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("graph at {} is locked by another handle", dir.display()),
                )))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
