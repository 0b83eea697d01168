//! Chunked property columns.

use arrow::array::{Array, ArrayRef, new_empty_array};
use arrow::datatypes::{DataType, FieldRef};
use plegma_common::{Error, Result};
use std::sync::Arc;

/// One logical property column, possibly split into segments.
///
/// Chunking lets a column be assembled from streamed record batches without
/// copying; externally the column behaves as a single sequence of `len`
/// values. Chunks are immutable once the column is built, so handles cloned
/// out of a table stay valid when the table is later mutated.
#[derive(Debug, Clone)]
pub struct ChunkedColumn {
    field: FieldRef,
    chunks: Arc<[ArrayRef]>,
    len: usize,
}

impl ChunkedColumn {
    /// Builds a column from segments, all of the field's data type.
    ///
    /// An empty segment list is normalized to one zero-length segment so a
    /// column always carries at least its type.
    pub fn from_chunks(field: FieldRef, mut chunks: Vec<ArrayRef>) -> Result<Self> {
        for chunk in &chunks {
            if chunk.data_type() != field.data_type() {
                return Err(Error::InvalidArgument(format!(
                    "chunk of type {} does not match column '{}' of type {}",
                    chunk.data_type(),
                    field.name(),
                    field.data_type()
                )));
            }
        }
        if chunks.is_empty() {
            chunks.push(new_empty_array(field.data_type()));
        }
        let len = chunks.iter().map(|c| c.len()).sum();
        Ok(Self {
            field,
            chunks: chunks.into(),
            len,
        })
    }

    /// Builds a single-segment column.
    pub fn from_array(field: FieldRef, array: ArrayRef) -> Result<Self> {
        Self::from_chunks(field, vec![array])
    }

    /// The column's field (name, type, nullability).
    #[must_use]
    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    /// The column name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.field.name()
    }

    /// The column's data type.
    #[must_use]
    pub fn data_type(&self) -> &DataType {
        self.field.data_type()
    }

    /// Total number of values across all segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the column has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of segments.
    #[must_use]
    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// A single segment by index.
    #[must_use]
    pub fn chunk(&self, index: usize) -> Option<&ArrayRef> {
        self.chunks.get(index)
    }

    /// All segments, in order.
    #[must_use]
    pub fn chunks(&self) -> &[ArrayRef] {
        &self.chunks
    }

    /// Concatenates the segments into one contiguous array.
    pub fn to_array(&self) -> Result<ArrayRef> {
        if self.chunks.len() == 1 {
            return Ok(self.chunks[0].clone());
        }
        let parts: Vec<&dyn Array> = self.chunks.iter().map(|c| c.as_ref()).collect();
        arrow::compute::concat(&parts).map_err(|e| Error::Serialization(e.to_string()))
    }
}
