//! CSR graph topology.

use arrow::array::{Array, UInt32Array, UInt64Array};
use plegma_common::{Error, Result};
use plegma_storage::TopologySegment;
use std::ops::Range;
use std::sync::Arc;

/// The adjacency information of a graph in CSR format.
///
/// `out_indices[i]` is the cumulative out-degree of nodes `0..=i`, so node
/// `i`'s out-edges occupy `out_dests[out_indices[i-1]..out_indices[i])`
/// (lower bound 0 for node 0). The backing arrays are shared and immutable:
/// cloning a topology is cheap, and a topology handed to a graph can never
/// be mutated in place by either side.
#[derive(Debug, Clone)]
pub struct GraphTopology {
    out_indices: Arc<UInt64Array>,
    out_dests: Arc<UInt32Array>,
}

impl GraphTopology {
    /// Creates a topology from shared arrow arrays.
    #[must_use]
    pub fn new(out_indices: Arc<UInt64Array>, out_dests: Arc<UInt32Array>) -> Self {
        Self {
            out_indices,
            out_dests,
        }
    }

    /// Creates a topology from raw CSR vectors.
    #[must_use]
    pub fn from_vecs(out_indices: Vec<u64>, out_dests: Vec<u32>) -> Self {
        Self::new(
            Arc::new(UInt64Array::from(out_indices)),
            Arc::new(UInt32Array::from(out_dests)),
        )
    }

    /// A topology with no nodes and no edges.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_vecs(Vec::new(), Vec::new())
    }

    /// Rebuilds a topology from its serialized form.
    #[must_use]
    pub fn from_segment(segment: TopologySegment) -> Self {
        Self::from_vecs(segment.out_indices, segment.out_dests)
    }

    /// Copies the topology into its serialized form.
    #[must_use]
    pub fn to_segment(&self) -> TopologySegment {
        TopologySegment::new(
            self.out_indices.values().to_vec(),
            self.out_dests.values().to_vec(),
        )
    }

    /// Number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> u64 {
        self.out_indices.len() as u64
    }

    /// Number of edges.
    #[must_use]
    pub fn num_edges(&self) -> u64 {
        self.out_dests.len() as u64
    }

    /// The cumulative out-degree array.
    #[must_use]
    pub fn out_indices(&self) -> &Arc<UInt64Array> {
        &self.out_indices
    }

    /// The flat destination array.
    #[must_use]
    pub fn out_dests(&self) -> &Arc<UInt32Array> {
        &self.out_dests
    }

    /// The range of `out_dests` positions holding `node`'s out-edges, or
    /// `None` if `node` is not in the graph.
    #[must_use]
    pub fn out_edge_range(&self, node: u64) -> Option<Range<usize>> {
        if node >= self.num_nodes() {
            return None;
        }
        let node = node as usize;
        let start = if node == 0 {
            0
        } else {
            self.out_indices.value(node - 1) as usize
        };
        let end = self.out_indices.value(node) as usize;
        Some(start..end)
    }

    /// The destination nodes of `node`'s out-edges, or `None` if `node` is
    /// not in the graph.
    #[must_use]
    pub fn out_neighbors(&self, node: u64) -> Option<&[u32]> {
        let range = self.out_edge_range(node)?;
        Some(&self.out_dests.values()[range])
    }
}

impl Default for GraphTopology {
    fn default() -> Self {
        Self::empty()
    }
}

/// Checks the CSR invariants of a topology in isolation: null-free arrays,
/// a monotone non-decreasing index array ending at the destination count,
/// and every destination a valid node id.
///
/// Row-count consistency with property tables is the graph's concern, not
/// the topology's, so this stays crate-internal.
pub(crate) fn check_csr(topology: &GraphTopology) -> Result<()> {
    let indices = topology.out_indices();
    let dests = topology.out_dests();

    if indices.null_count() != 0 || dests.null_count() != 0 {
        return Err(Error::Validation(
            "topology arrays must not contain nulls".into(),
        ));
    }

    let mut prev = 0u64;
    for (node, &cumulative) in indices.values().iter().enumerate() {
        if cumulative < prev {
            return Err(Error::Validation(format!(
                "out_indices is not monotone at node {node}: {cumulative} < {prev}"
            )));
        }
        prev = cumulative;
    }

    let declared_edges = indices.values().last().copied().unwrap_or(0);
    if declared_edges != dests.len() as u64 {
        return Err(Error::Validation(format!(
            "out_dests has {} entries but out_indices ends at {declared_edges}",
            dests.len()
        )));
    }

    let num_nodes = indices.len() as u64;
    for (edge, &dest) in dests.values().iter().enumerate() {
        if u64::from(dest) >= num_nodes {
            return Err(Error::Validation(format!(
                "edge {edge} points to node {dest} but the graph has {num_nodes} nodes"
            )));
        }
    }
    Ok(())
}
