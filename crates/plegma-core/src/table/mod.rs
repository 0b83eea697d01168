//! Chunked columnar property tables.
//!
//! A [`PropertyTable`] is a named, ordered collection of typed columns
//! sharing one row count — the store for one entity axis (nodes or edges)
//! of a property graph. Tables are immutable values: every "mutation"
//! builds a new table, which is what makes graph-level mutation atomic
//! (candidate-then-swap) and keeps column handles held by readers valid.

mod column;

pub use column::ChunkedColumn;

use arrow::datatypes::{FieldRef, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use plegma_common::utils::hash::FxHashSet;
use plegma_common::{Error, Result};
use std::sync::Arc;

/// A named, ordered collection of typed columns with a shared row count.
///
/// The row count is explicit so a table with zero columns still has a
/// definite number of rows.
#[derive(Debug, Clone)]
pub struct PropertyTable {
    schema: SchemaRef,
    columns: Vec<ChunkedColumn>,
    num_rows: usize,
}

impl PropertyTable {
    /// Creates a table with no columns and the given row count.
    #[must_use]
    pub fn empty(num_rows: usize) -> Self {
        Self {
            schema: Arc::new(Schema::empty()),
            columns: Vec::new(),
            num_rows,
        }
    }

    /// Builds a table from columns.
    ///
    /// Fails with invalid-argument on unequal column lengths or duplicate
    /// column names. The row count is taken from the first column; use
    /// [`PropertyTable::empty`] for a column-less table.
    pub fn from_columns(columns: Vec<ChunkedColumn>) -> Result<Self> {
        let Some(first) = columns.first() else {
            return Err(Error::InvalidArgument(
                "cannot infer a row count from zero columns".into(),
            ));
        };
        let num_rows = first.len();

        let mut names: FxHashSet<&str> = FxHashSet::default();
        for col in &columns {
            if col.len() != num_rows {
                return Err(Error::InvalidArgument(format!(
                    "column '{}' has {} rows, expected {num_rows}",
                    col.name(),
                    col.len()
                )));
            }
            if !names.insert(col.name()) {
                return Err(Error::InvalidArgument(format!(
                    "duplicate column name '{}'",
                    col.name()
                )));
            }
        }
        drop(names);

        let schema = schema_of(&columns);
        Ok(Self {
            schema,
            columns,
            num_rows,
        })
    }

    /// Builds a table from record batches sharing one schema; each batch
    /// contributes one segment per column.
    pub fn from_batches(batches: Vec<RecordBatch>) -> Result<Self> {
        let Some(first) = batches.first() else {
            return Err(Error::InvalidArgument(
                "cannot build a table from zero batches".into(),
            ));
        };
        let schema = first.schema();
        for batch in &batches[1..] {
            if batch.schema() != schema {
                return Err(Error::InvalidArgument(
                    "record batches disagree on schema".into(),
                ));
            }
        }

        let mut names: FxHashSet<&str> = FxHashSet::default();
        for field in schema.fields() {
            if !names.insert(field.name().as_str()) {
                return Err(Error::InvalidArgument(format!(
                    "duplicate column name '{}'",
                    field.name()
                )));
            }
        }
        drop(names);

        let num_rows = batches.iter().map(|b| b.num_rows()).sum();
        let mut columns = Vec::with_capacity(schema.fields().len());
        for (i, field) in schema.fields().iter().enumerate() {
            let chunks: Vec<_> = batches.iter().map(|b| b.column(i).clone()).collect();
            columns.push(ChunkedColumn::from_chunks(field.clone(), chunks)?);
        }
        Ok(Self {
            schema,
            columns,
            num_rows,
        })
    }

    /// Builds a table from batches when columns are present, or an empty
    /// table with `num_rows` rows when they are not — the shape a selective
    /// load with an empty request list produces.
    pub fn from_batches_or_empty(batches: Vec<RecordBatch>, num_rows: usize) -> Result<Self> {
        let has_columns = batches.first().is_some_and(|b| b.num_columns() > 0);
        if has_columns {
            Self::from_batches(batches)
        } else {
            Ok(Self::empty(num_rows))
        }
    }

    /// The table's schema: ordered (name, type) pairs.
    #[must_use]
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// A column by position.
    #[must_use]
    pub fn column(&self, index: usize) -> Option<&ChunkedColumn> {
        self.columns.get(index)
    }

    /// All columns, in schema order.
    #[must_use]
    pub fn columns(&self) -> &[ChunkedColumn] {
        &self.columns
    }

    /// The position of a column by name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// A new table with `other`'s columns appended after this table's,
    /// preserving both orders.
    ///
    /// Fails with invalid-argument on a row-count mismatch or a column-name
    /// collision; this table is unaffected either way.
    pub fn with_appended(&self, other: &PropertyTable) -> Result<PropertyTable> {
        if other.num_rows != self.num_rows {
            return Err(Error::InvalidArgument(format!(
                "cannot append a table with {} rows to a table with {} rows",
                other.num_rows, self.num_rows
            )));
        }

        let mut names: FxHashSet<&str> = self.columns.iter().map(|c| c.name()).collect();
        for col in &other.columns {
            if !names.insert(col.name()) {
                return Err(Error::InvalidArgument(format!(
                    "column '{}' already exists",
                    col.name()
                )));
            }
        }

        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        let schema = schema_of(&columns);
        Ok(PropertyTable {
            schema,
            columns,
            num_rows: self.num_rows,
        })
    }

    /// A new table without the column at `index`; later columns shift down
    /// by one position.
    ///
    /// Fails with invalid-argument if `index` is out of range; this table
    /// is unaffected either way.
    pub fn with_column_removed(&self, index: usize) -> Result<PropertyTable> {
        if index >= self.columns.len() {
            return Err(Error::InvalidArgument(format!(
                "column index {index} out of range for a table with {} columns",
                self.columns.len()
            )));
        }
        let mut columns = self.columns.clone();
        columns.remove(index);
        let schema = schema_of(&columns);
        Ok(PropertyTable {
            schema,
            columns,
            num_rows: self.num_rows,
        })
    }

    /// Converts the table to record batches for serialization.
    ///
    /// Columns with aligned segment boundaries serialize one batch per
    /// segment; otherwise each column is concatenated and a single batch is
    /// produced. A zero-column table produces no batches — its row count
    /// travels out of band.
    pub fn to_batches(&self) -> Result<Vec<RecordBatch>> {
        if self.columns.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(num_chunks) = self.aligned_chunk_count() {
            let mut batches = Vec::with_capacity(num_chunks);
            for chunk_index in 0..num_chunks {
                let arrays: Vec<_> = self
                    .columns
                    .iter()
                    .map(|c| c.chunks()[chunk_index].clone())
                    .collect();
                batches.push(
                    RecordBatch::try_new(self.schema.clone(), arrays)
                        .map_err(|e| Error::Serialization(e.to_string()))?,
                );
            }
            return Ok(batches);
        }

        let arrays = self
            .columns
            .iter()
            .map(|c| c.to_array())
            .collect::<Result<Vec<_>>>()?;
        let batch = RecordBatch::try_new(self.schema.clone(), arrays)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(vec![batch])
    }

    /// Returns the shared segment count when all columns have identical
    /// segment boundaries.
    fn aligned_chunk_count(&self) -> Option<usize> {
        let first = &self.columns[0];
        let lengths: Vec<usize> = first.chunks().iter().map(|c| c.len()).collect();
        for col in &self.columns[1..] {
            if col.num_chunks() != lengths.len() {
                return None;
            }
            if col.chunks().iter().zip(&lengths).any(|(c, &l)| c.len() != l) {
                return None;
            }
        }
        Some(lengths.len())
    }
}

fn schema_of(columns: &[ChunkedColumn]) -> SchemaRef {
    let fields: Vec<FieldRef> = columns.iter().map(|c| c.field().clone()).collect();
    Arc::new(Schema::new(fields))
}
