//! Role-parameterized access to graph properties.

use crate::graph::PropertyGraph;
use crate::table::{ChunkedColumn, PropertyTable};
use arrow::datatypes::SchemaRef;
use plegma_common::Result;

/// The axis of a property graph a view operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyRole {
    /// The node-side property table.
    Node,
    /// The edge-side property table.
    Edge,
}

impl PropertyRole {
    /// The entity name used in error messages.
    pub(crate) fn entity(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
        }
    }
}

/// A uniform interface over one axis of a [`PropertyGraph`], for callers
/// that don't need to distinguish node from edge properties.
///
/// Every call forwards verbatim to the corresponding role-specific
/// operation on the bound graph and inherits its contract; the view itself
/// holds no state beyond the binding and is meant to live only for the
/// duration of a call chain.
pub struct PropertyView<'g> {
    graph: &'g mut PropertyGraph,
    role: PropertyRole,
}

impl<'g> PropertyView<'g> {
    pub(crate) fn new(graph: &'g mut PropertyGraph, role: PropertyRole) -> Self {
        Self { graph, role }
    }

    /// The bound role.
    #[must_use]
    pub fn role(&self) -> PropertyRole {
        self.role
    }

    /// The bound table's schema.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.graph.schema_for(self.role)
    }

    /// A property column by position.
    #[must_use]
    pub fn property(&self, index: usize) -> Option<&ChunkedColumn> {
        self.graph.property_for(self.role, index)
    }

    /// All property columns, in schema order.
    #[must_use]
    pub fn properties(&self) -> &[ChunkedColumn] {
        self.graph.properties_for(self.role)
    }

    /// Appends `table`'s columns to the bound axis.
    pub fn add_properties(&mut self, table: &PropertyTable) -> Result<()> {
        self.graph.add_properties(self.role, table)
    }

    /// Removes the property column at `index` from the bound axis.
    pub fn remove_property(&mut self, index: usize) -> Result<()> {
        self.graph.remove_property(self.role, index)
    }
}
