//! The per-graph manifest.
//!
//! The manifest is the root of a stored graph: it records the format
//! version, the entity counts, and the names of the part files. It is
//! written last during a commit (via a temp file and rename), so a graph
//! directory with a readable manifest always refers to complete parts.

use plegma_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// File name of the manifest inside a graph directory.
pub const MANIFEST_FILE: &str = "graph.meta";

/// File name of the topology segment.
pub const TOPOLOGY_FILE: &str = "topology.bin";

/// File name of the node property table.
pub const NODE_TABLE_FILE: &str = "nodes.arrow";

/// File name of the edge property table.
pub const EDGE_TABLE_FILE: &str = "edges.arrow";

/// File name of the handle lock file.
pub const LOCK_FILE: &str = "LOCK";

/// Root metadata of a stored graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphManifest {
    /// On-disk format version, checked on load.
    pub version: u32,
    /// Number of nodes in the stored topology.
    pub num_nodes: u64,
    /// Number of edges in the stored topology.
    pub num_edges: u64,
    /// Part file holding the topology segment.
    pub topology_file: String,
    /// Part file holding the node property table.
    pub node_table_file: String,
    /// Part file holding the edge property table.
    pub edge_table_file: String,
}

impl GraphManifest {
    /// Creates a manifest for the given entity counts with the default part
    /// file names.
    #[must_use]
    pub fn new(num_nodes: u64, num_edges: u64) -> Self {
        Self {
            version: FORMAT_VERSION,
            num_nodes,
            num_edges,
            topology_file: TOPOLOGY_FILE.to_string(),
            node_table_file: NODE_TABLE_FILE.to_string(),
            edge_table_file: EDGE_TABLE_FILE.to_string(),
        }
    }

    /// Rejects manifests written by an unknown format version.
    pub fn check_version(&self) -> Result<()> {
        if self.version != FORMAT_VERSION {
            return Err(Error::Serialization(format!(
                "unsupported graph format version {} (expected {FORMAT_VERSION})",
                self.version
            )));
        }
        Ok(())
    }
}
