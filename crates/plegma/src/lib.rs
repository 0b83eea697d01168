//! # Plegma
//!
//! A partition-aware property-graph container: a CSR topology paired with
//! columnar node and edge property tables, loadable from and serializable
//! to persistent storage.
//!
//! Start with [`PropertyGraph`] — build one in memory, or load one (fully
//! or column-selectively) from a storage location. Property columns are
//! Arrow arrays; schemas are Arrow schemas.
//!
//! ## Quick Start
//!
//! ```rust
//! use arrow::array::Int64Array;
//! use arrow::datatypes::{DataType, Field};
//! use plegma::{ChunkedColumn, GraphTopology, PropertyGraph, PropertyTable};
//! use std::sync::Arc;
//!
//! // A 4-node, 5-edge graph, CSR-encoded.
//! let mut graph = PropertyGraph::new();
//! graph.set_topology(GraphTopology::from_vecs(
//!     vec![2, 3, 3, 5],
//!     vec![1, 2, 2, 0, 3],
//! ))?;
//!
//! // One property per node.
//! let ranks = PropertyTable::from_columns(vec![ChunkedColumn::from_array(
//!     Arc::new(Field::new("rank", DataType::Int64, false)),
//!     Arc::new(Int64Array::from(vec![10, 20, 30, 40])),
//! )?])?;
//! graph.add_node_properties(&ranks)?;
//!
//! assert_eq!(graph.topology().num_edges(), 5);
//! assert_eq!(graph.node_schema().field(0).name(), "rank");
//! # Ok::<(), plegma::Error>(())
//! ```
//!
//! Persisting and reloading go through [`PropertyGraph::write_to`],
//! [`PropertyGraph::write`], [`PropertyGraph::load`], and
//! [`PropertyGraph::load_selective`].

// Re-export the main graph API
pub use plegma_core::{
    ChunkedColumn, GraphTopology, PropertyGraph, PropertyRole, PropertyTable, PropertyView,
};

// Re-export the storage surface - you'll need these for direct storage
// access and configuration
pub use plegma_storage::{GraphManifest, StorageConfig, StorageHandle, StoredGraph};

// Re-export core result types
pub use plegma_common::{Error, Result};
