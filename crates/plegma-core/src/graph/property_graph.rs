//! The property graph container.

use crate::graph::topology::{GraphTopology, check_csr};
use crate::graph::view::{PropertyRole, PropertyView};
use crate::table::{ChunkedColumn, PropertyTable};
use arrow::datatypes::SchemaRef;
use plegma_common::{Error, Result};
use plegma_storage::{StorageHandle, StoredGraph};
use std::path::Path;

/// A graph whose nodes and edges carry named, typed properties.
///
/// A `PropertyGraph` composes one [`GraphTopology`] with two
/// [`PropertyTable`]s — one row per node, one row per edge — and may be
/// backed by a storage location it was loaded from. It can also represent a
/// partition of a larger logical graph; the partitioning itself is the
/// storage layer's concern.
///
/// Mutation is single-threaded: callers serialize mutating operations
/// themselves. Read-only access between mutations is safe to share because
/// columns and topology arrays are immutable once published — a mutation
/// swaps whole tables or the whole topology, never editing either in place.
///
/// Every mutating operation is atomic: it either fully applies or returns
/// an error leaving the graph exactly as it was.
#[derive(Debug)]
pub struct PropertyGraph {
    /// Present when the graph was loaded from storage; released on drop.
    handle: Option<StorageHandle>,
    topology: GraphTopology,
    node_table: PropertyTable,
    edge_table: PropertyTable,
}

impl PropertyGraph {
    /// Creates an empty in-memory graph with no backing storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handle: None,
            topology: GraphTopology::empty(),
            node_table: PropertyTable::empty(0),
            edge_table: PropertyTable::empty(0),
        }
    }

    /// Loads a property graph from a storage location.
    pub fn load(location: impl AsRef<Path>) -> Result<Self> {
        let handle = StorageHandle::open(location)?;
        let stored = handle.load()?;
        Self::from_stored(handle, stored)
    }

    /// Loads a property graph, materializing only the named node and edge
    /// properties.
    ///
    /// The resulting schemas match the request order exactly, per axis. An
    /// empty list yields a table with no columns and the correct row count.
    /// Fails with invalid-argument if a requested name is missing or
    /// ambiguous in the stored schema, or requested more than once.
    pub fn load_selective(
        location: impl AsRef<Path>,
        node_properties: &[&str],
        edge_properties: &[&str],
    ) -> Result<Self> {
        let handle = StorageHandle::open(location)?;
        let stored = handle.load_selective(node_properties, edge_properties)?;
        Self::from_stored(handle, stored)
    }

    /// Assembles a graph from an already-open handle and its loaded
    /// contents, taking ownership of both, then validates.
    ///
    /// On failure no graph is produced and the handle is released.
    pub fn from_stored(handle: StorageHandle, stored: StoredGraph) -> Result<Self> {
        let StoredGraph {
            manifest,
            topology,
            node_batches,
            edge_batches,
        } = stored;

        let graph = Self {
            handle: Some(handle),
            topology: GraphTopology::from_segment(topology),
            node_table: PropertyTable::from_batches_or_empty(
                node_batches,
                manifest.num_nodes as usize,
            )?,
            edge_table: PropertyTable::from_batches_or_empty(
                edge_batches,
                manifest.num_edges as usize,
            )?,
        };
        graph.validate()?;
        Ok(graph)
    }

    /// Checks the graph's cross-structure invariants: the topology's CSR
    /// shape, and both property tables' row counts against the topology's
    /// entity counts.
    pub fn validate(&self) -> Result<()> {
        check_csr(&self.topology)?;

        let num_nodes = self.topology.num_nodes() as usize;
        if self.node_table.num_rows() != num_nodes {
            return Err(Error::Validation(format!(
                "node table has {} rows but the topology has {num_nodes} nodes",
                self.node_table.num_rows()
            )));
        }
        let num_edges = self.topology.num_edges() as usize;
        if self.edge_table.num_rows() != num_edges {
            return Err(Error::Validation(format!(
                "edge table has {} rows but the topology has {num_edges} edges",
                self.edge_table.num_rows()
            )));
        }
        Ok(())
    }

    /// Whether this graph is backed by a storage location.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    /// The graph's topology.
    #[must_use]
    pub fn topology(&self) -> &GraphTopology {
        &self.topology
    }

    /// Replaces the topology with one supplied by the caller.
    ///
    /// The new topology's CSR invariants must hold on their own
    /// (validation-error otherwise) and its entity counts must match the
    /// row counts of any property table that already has columns
    /// (invalid-usage otherwise). A table that still has no columns has no
    /// physical rows, so it adopts the new topology's count — this is what
    /// lets an in-memory graph grow from empty. On success the topology is
    /// shared with the caller — its arrays are immutable, so neither side
    /// can edit what the other observes. On failure the prior topology
    /// stays active and queryable.
    pub fn set_topology(&mut self, topology: GraphTopology) -> Result<()> {
        check_csr(&topology)?;

        if self.node_table.num_columns() > 0
            && topology.num_nodes() as usize != self.node_table.num_rows()
        {
            return Err(Error::InvalidUsage(format!(
                "topology has {} nodes but the node table has {} rows",
                topology.num_nodes(),
                self.node_table.num_rows()
            )));
        }
        if self.edge_table.num_columns() > 0
            && topology.num_edges() as usize != self.edge_table.num_rows()
        {
            return Err(Error::InvalidUsage(format!(
                "topology has {} edges but the edge table has {} rows",
                topology.num_edges(),
                self.edge_table.num_rows()
            )));
        }

        if self.node_table.num_columns() == 0 {
            self.node_table = PropertyTable::empty(topology.num_nodes() as usize);
        }
        if self.edge_table.num_columns() == 0 {
            self.edge_table = PropertyTable::empty(topology.num_edges() as usize);
        }
        self.topology = topology;
        Ok(())
    }

    /// The node property schema.
    #[must_use]
    pub fn node_schema(&self) -> SchemaRef {
        self.node_table.schema().clone()
    }

    /// The edge property schema.
    #[must_use]
    pub fn edge_schema(&self) -> SchemaRef {
        self.edge_table.schema().clone()
    }

    /// A node property column by position.
    #[must_use]
    pub fn node_property(&self, index: usize) -> Option<&ChunkedColumn> {
        self.node_table.column(index)
    }

    /// An edge property column by position.
    #[must_use]
    pub fn edge_property(&self, index: usize) -> Option<&ChunkedColumn> {
        self.edge_table.column(index)
    }

    /// All node property columns, in schema order.
    #[must_use]
    pub fn node_properties(&self) -> &[ChunkedColumn] {
        self.node_table.columns()
    }

    /// All edge property columns, in schema order.
    #[must_use]
    pub fn edge_properties(&self) -> &[ChunkedColumn] {
        self.edge_table.columns()
    }

    /// The node property table.
    #[must_use]
    pub fn node_table(&self) -> &PropertyTable {
        &self.node_table
    }

    /// The edge property table.
    #[must_use]
    pub fn edge_table(&self) -> &PropertyTable {
        &self.edge_table
    }

    /// Appends `table`'s columns to the node properties.
    ///
    /// See [`PropertyGraph::add_properties`] for the contract.
    pub fn add_node_properties(&mut self, table: &PropertyTable) -> Result<()> {
        self.add_properties(PropertyRole::Node, table)
    }

    /// Appends `table`'s columns to the edge properties.
    pub fn add_edge_properties(&mut self, table: &PropertyTable) -> Result<()> {
        self.add_properties(PropertyRole::Edge, table)
    }

    /// Removes the node property column at `index`.
    pub fn remove_node_property(&mut self, index: usize) -> Result<()> {
        self.remove_property(PropertyRole::Node, index)
    }

    /// Removes the edge property column at `index`.
    pub fn remove_edge_property(&mut self, index: usize) -> Result<()> {
        self.remove_property(PropertyRole::Edge, index)
    }

    /// A view over the node-side properties.
    pub fn node_property_view(&mut self) -> PropertyView<'_> {
        PropertyView::new(self, PropertyRole::Node)
    }

    /// A view over the edge-side properties.
    pub fn edge_property_view(&mut self) -> PropertyView<'_> {
        PropertyView::new(self, PropertyRole::Edge)
    }

    /// Serializes the graph to a brand-new storage location.
    ///
    /// Fails with an `AlreadyExists` io-error if anything is present at
    /// `location`; this never overwrites.
    pub fn write_to(&self, location: impl AsRef<Path>) -> Result<()> {
        let handle = StorageHandle::create(location)?;
        self.do_write(&handle)
    }

    /// Serializes the graph back to the location it was loaded from,
    /// overwriting it.
    ///
    /// Fails with invalid-usage, performing no I/O, if the graph was
    /// constructed in memory rather than loaded.
    pub fn write(&self) -> Result<()> {
        let handle = self.handle.as_ref().ok_or_else(|| {
            Error::InvalidUsage(
                "graph has no backing storage; load it first or use write_to".into(),
            )
        })?;
        self.do_write(handle)
    }

    fn do_write(&self, handle: &StorageHandle) -> Result<()> {
        let topology = self.topology.to_segment();
        let node_batches = self.node_table.to_batches()?;
        let edge_batches = self.edge_table.to_batches()?;
        handle.commit(&topology, &node_batches, &edge_batches)
    }

    fn table(&self, role: PropertyRole) -> &PropertyTable {
        match role {
            PropertyRole::Node => &self.node_table,
            PropertyRole::Edge => &self.edge_table,
        }
    }

    fn table_mut(&mut self, role: PropertyRole) -> &mut PropertyTable {
        match role {
            PropertyRole::Node => &mut self.node_table,
            PropertyRole::Edge => &mut self.edge_table,
        }
    }

    fn entity_count(&self, role: PropertyRole) -> usize {
        match role {
            PropertyRole::Node => self.topology.num_nodes() as usize,
            PropertyRole::Edge => self.topology.num_edges() as usize,
        }
    }

    pub(crate) fn schema_for(&self, role: PropertyRole) -> SchemaRef {
        self.table(role).schema().clone()
    }

    pub(crate) fn property_for(&self, role: PropertyRole, index: usize) -> Option<&ChunkedColumn> {
        self.table(role).column(index)
    }

    pub(crate) fn properties_for(&self, role: PropertyRole) -> &[ChunkedColumn] {
        self.table(role).columns()
    }

    /// Appends `table`'s columns to the given axis.
    ///
    /// The table's row count must equal the axis's entity count and none of
    /// its column names may collide with the existing schema. A candidate
    /// table is built first and swapped in only after every check passes,
    /// so any failure leaves the graph untouched.
    pub(crate) fn add_properties(
        &mut self,
        role: PropertyRole,
        table: &PropertyTable,
    ) -> Result<()> {
        let expected = self.entity_count(role);
        if table.num_rows() != expected {
            return Err(Error::InvalidArgument(format!(
                "property table has {} rows but the graph has {expected} {}s",
                table.num_rows(),
                role.entity()
            )));
        }
        let merged = self.table(role).with_appended(table)?;
        *self.table_mut(role) = merged;
        Ok(())
    }

    /// Removes the property column at `index` from the given axis; columns
    /// after it shift down one position, invalidating previously issued
    /// indices. An out-of-range index fails with invalid-argument and
    /// leaves the graph untouched.
    pub(crate) fn remove_property(&mut self, role: PropertyRole, index: usize) -> Result<()> {
        let trimmed = self.table(role).with_column_removed(index)?;
        *self.table_mut(role) = trimmed;
        Ok(())
    }
}

impl Default for PropertyGraph {
    fn default() -> Self {
        Self::new()
    }
}
