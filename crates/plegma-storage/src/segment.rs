//! Topology segments and Arrow IPC table files.
//!
//! The topology travels as a framed bincode part (see [`crate::codec`]);
//! property tables travel as Arrow IPC files, one per axis. Selective reads
//! use IPC projection pushdown so unrequested columns are never
//! materialized, and the returned column order is the request order.

use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use plegma_common::utils::hash::{FxHashMap, FxHashSet};
use plegma_common::{Error, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// Serialized CSR adjacency of a stored graph.
///
/// `out_indices[i]` is the cumulative out-degree of nodes `0..=i`;
/// `out_dests` holds the flat destination list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologySegment {
    /// Cumulative out-degree per node.
    pub out_indices: Vec<u64>,
    /// Flat destination node ids.
    pub out_dests: Vec<u32>,
}

impl TopologySegment {
    /// Creates a segment from raw CSR arrays.
    #[must_use]
    pub fn new(out_indices: Vec<u64>, out_dests: Vec<u32>) -> Self {
        Self {
            out_indices,
            out_dests,
        }
    }

    /// Number of nodes in the segment.
    #[must_use]
    pub fn num_nodes(&self) -> u64 {
        self.out_indices.len() as u64
    }

    /// Number of edges in the segment.
    #[must_use]
    pub fn num_edges(&self) -> u64 {
        self.out_dests.len() as u64
    }
}

fn map_arrow(e: ArrowError) -> Error {
    match e {
        ArrowError::IoError(_, io) => Error::Io(io),
        other => Error::Serialization(other.to_string()),
    }
}

/// Writes a property table as an Arrow IPC file.
///
/// An empty batch list writes a file with an empty schema; the table's row
/// count is carried by the manifest in that case.
pub fn write_table(path: &Path, batches: &[RecordBatch], sync: bool) -> Result<()> {
    let schema = batches
        .first()
        .map_or_else(|| Arc::new(Schema::empty()), |b| b.schema());

    let file = File::create(path)?;
    let mut writer = FileWriter::try_new(BufWriter::new(file), &schema).map_err(map_arrow)?;
    for batch in batches {
        writer.write(batch).map_err(map_arrow)?;
    }
    writer.finish().map_err(map_arrow)?;

    let mut inner = writer.into_inner().map_err(map_arrow)?;
    inner.flush()?;
    if sync {
        inner.get_ref().sync_all()?;
    }
    Ok(())
}

/// Reads a full property table from an Arrow IPC file.
pub fn read_table(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let file = File::open(path)?;
    let reader = FileReader::try_new(BufReader::new(file), None).map_err(map_arrow)?;
    let schema = reader.schema();
    let batches = reader
        .collect::<std::result::Result<Vec<_>, ArrowError>>()
        .map_err(map_arrow)?;
    Ok((schema, batches))
}

/// Reads only the named columns of a property table, in request order.
///
/// Fails with invalid-argument if a requested name is missing from the
/// stored schema, if a name is requested more than once, or if the stored
/// schema itself carries duplicate column names.
pub fn read_table_selective(
    path: &Path,
    names: &[&str],
) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let stored_schema = read_schema(path)?;
    let requested = resolve_projection(&stored_schema, names)?;
    tracing::debug!(
        path = %path.display(),
        stored_columns = stored_schema.fields().len(),
        requested_columns = requested.len(),
        "selective table read"
    );
    if requested.is_empty() {
        return Ok((Arc::new(Schema::empty()), Vec::new()));
    }

    // Read with a sorted projection, then permute to request order; the
    // permutation is explicit so the contract does not depend on how the
    // reader orders projected columns.
    let mut sorted: Vec<usize> = requested.iter().copied().collect();
    sorted.sort_unstable();

    let file = File::open(path)?;
    let reader =
        FileReader::try_new(BufReader::new(file), Some(sorted.clone())).map_err(map_arrow)?;
    let raw = reader
        .collect::<std::result::Result<Vec<RecordBatch>, ArrowError>>()
        .map_err(map_arrow)?;

    let fields: Vec<Field> = requested
        .iter()
        .map(|&i| stored_schema.field(i).clone())
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let mut batches = Vec::with_capacity(raw.len());
    for batch in raw {
        let mut columns = Vec::with_capacity(requested.len());
        for &stored_index in &requested {
            let position = sorted
                .binary_search(&stored_index)
                .map_err(|_| Error::Serialization("column projection out of sync".into()))?;
            columns.push(batch.column(position).clone());
        }
        batches.push(RecordBatch::try_new(schema.clone(), columns).map_err(map_arrow)?);
    }
    Ok((schema, batches))
}

/// Resolves requested column names against a stored schema.
pub fn resolve_projection(schema: &Schema, names: &[&str]) -> Result<SmallVec<[usize; 8]>> {
    // The stored schema must be unambiguous before any name can resolve.
    let mut positions: FxHashMap<&str, usize> = FxHashMap::default();
    for (i, field) in schema.fields().iter().enumerate() {
        if positions.insert(field.name().as_str(), i).is_some() {
            return Err(Error::InvalidArgument(format!(
                "stored schema has multiple columns named '{}'",
                field.name()
            )));
        }
    }

    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut projection = SmallVec::new();
    for &name in names {
        if !seen.insert(name) {
            return Err(Error::InvalidArgument(format!(
                "property '{name}' requested more than once"
            )));
        }
        let Some(&index) = positions.get(name) else {
            return Err(Error::InvalidArgument(format!(
                "property '{name}' not found in stored schema"
            )));
        };
        projection.push(index);
    }
    Ok(projection)
}

fn read_schema(path: &Path) -> Result<SchemaRef> {
    let file = File::open(path)?;
    let reader = FileReader::try_new(BufReader::new(file), None).map_err(map_arrow)?;
    Ok(reader.schema())
}
