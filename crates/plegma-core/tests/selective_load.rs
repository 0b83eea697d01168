//! Selective property materialization from storage.

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use plegma_common::Error;
use plegma_core::{ChunkedColumn, GraphTopology, PropertyGraph, PropertyTable};
use plegma_storage::{StorageHandle, TopologySegment};
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn field(name: &str, data_type: DataType) -> FieldRef {
    Arc::new(Field::new(name, data_type, false))
}

/// Writes a graph with node schema [p0, p1, p2, p3] and edge schema [e0].
fn write_sample(location: &Path) {
    let mut graph = PropertyGraph::new();
    graph
        .set_topology(GraphTopology::from_vecs(vec![1, 2], vec![1, 0]))
        .unwrap();

    let node_props = PropertyTable::from_columns(vec![
        ChunkedColumn::from_array(
            field("p0", DataType::Int64),
            Arc::new(Int64Array::from(vec![0, 1])),
        )
        .unwrap(),
        ChunkedColumn::from_array(
            field("p1", DataType::Utf8),
            Arc::new(StringArray::from(vec!["one", "two"])),
        )
        .unwrap(),
        ChunkedColumn::from_array(
            field("p2", DataType::Float64),
            Arc::new(Float64Array::from(vec![0.25, 0.75])),
        )
        .unwrap(),
        ChunkedColumn::from_array(
            field("p3", DataType::Int64),
            Arc::new(Int64Array::from(vec![30, 31])),
        )
        .unwrap(),
    ])
    .unwrap();
    graph.add_node_properties(&node_props).unwrap();

    let edge_props = PropertyTable::from_columns(vec![
        ChunkedColumn::from_array(
            field("e0", DataType::Int64),
            Arc::new(Int64Array::from(vec![7, 8])),
        )
        .unwrap(),
    ])
    .unwrap();
    graph.add_edge_properties(&edge_props).unwrap();

    graph.write_to(location).unwrap();
}

fn schema_names(graph: &PropertyGraph) -> Vec<String> {
    graph
        .node_schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect()
}

#[test]
fn selective_load_preserves_request_order() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("graph");
    write_sample(&location);

    let graph = PropertyGraph::load_selective(&location, &["p1", "p3"], &["e0"]).unwrap();
    assert_eq!(schema_names(&graph), vec!["p1", "p3"]);
    assert_eq!(graph.node_table().num_rows(), 2);

    let p1 = graph.node_property(0).unwrap().to_array().unwrap();
    let p1 = p1.as_any().downcast_ref::<StringArray>().unwrap();
    assert_eq!(p1.value(0), "one");

    let p3 = graph.node_property(1).unwrap().to_array().unwrap();
    let p3 = p3.as_any().downcast_ref::<Int64Array>().unwrap();
    assert_eq!(p3.value(1), 31);
}

#[test]
fn selective_load_honors_reversed_order() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("graph");
    write_sample(&location);

    let graph = PropertyGraph::load_selective(&location, &["p3", "p0"], &[]).unwrap();
    assert_eq!(schema_names(&graph), vec!["p3", "p0"]);
}

#[test]
fn selective_load_with_empty_lists_keeps_row_counts() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("graph");
    write_sample(&location);

    let graph = PropertyGraph::load_selective(&location, &[], &[]).unwrap();
    assert_eq!(graph.node_schema().fields().len(), 0);
    assert_eq!(graph.edge_schema().fields().len(), 0);
    assert_eq!(graph.node_table().num_rows(), 2);
    assert_eq!(graph.edge_table().num_rows(), 2);
    assert!(graph.validate().is_ok());
}

#[test]
fn selective_load_rejects_missing_property() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("graph");
    write_sample(&location);

    let err = PropertyGraph::load_selective(&location, &["p1", "absent"], &[]).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "got {err:?}");
}

#[test]
fn selective_load_rejects_duplicate_request() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("graph");
    write_sample(&location);

    let err = PropertyGraph::load_selective(&location, &["p1", "p1"], &[]).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "got {err:?}");

    let err = PropertyGraph::load_selective(&location, &[], &["e0", "e0"]).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "got {err:?}");
}

#[test]
fn selective_load_rejects_ambiguous_stored_schema() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("graph");

    // Hand-build storage whose node table carries two columns of one name;
    // the storage layer writes whatever it is given.
    {
        let handle = StorageHandle::create(&location).unwrap();
        let schema = Arc::new(Schema::new(vec![
            Field::new("dup", DataType::Int64, false),
            Field::new("dup", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1])) as ArrayRef,
                Arc::new(Int64Array::from(vec![2])) as ArrayRef,
            ],
        )
        .unwrap();
        handle
            .commit(&TopologySegment::new(vec![0], Vec::new()), &[batch], &[])
            .unwrap();
    }

    let err = PropertyGraph::load_selective(&location, &["dup"], &[]).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "got {err:?}");

    // A full load refuses the ambiguous schema as well.
    let err = PropertyGraph::load(&location).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "got {err:?}");
}
