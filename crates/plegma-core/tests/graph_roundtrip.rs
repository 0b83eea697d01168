//! End-to-end write/load round trips through real storage.

use arrow::array::{Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, FieldRef};
use plegma_common::Error;
use plegma_core::{ChunkedColumn, GraphTopology, PropertyGraph, PropertyTable};
use plegma_storage::{StorageHandle, TopologySegment};
use std::sync::Arc;
use tempfile::tempdir;

fn field(name: &str, data_type: DataType) -> FieldRef {
    Arc::new(Field::new(name, data_type, false))
}

/// A 4-node, 5-edge graph with two node properties and one edge property.
fn sample_graph() -> PropertyGraph {
    let mut graph = PropertyGraph::new();
    graph
        .set_topology(GraphTopology::from_vecs(
            vec![2, 3, 3, 5],
            vec![1, 2, 2, 0, 3],
        ))
        .unwrap();

    let node_props = PropertyTable::from_columns(vec![
        ChunkedColumn::from_array(
            field("rank", DataType::Int64),
            Arc::new(Int64Array::from(vec![10, 20, 30, 40])),
        )
        .unwrap(),
        ChunkedColumn::from_array(
            field("name", DataType::Utf8),
            Arc::new(StringArray::from(vec!["a", "b", "c", "d"])),
        )
        .unwrap(),
    ])
    .unwrap();
    graph.add_node_properties(&node_props).unwrap();

    let edge_props = PropertyTable::from_columns(vec![
        ChunkedColumn::from_array(
            field("weight", DataType::Float64),
            Arc::new(Float64Array::from(vec![0.5, 1.0, 1.5, 2.0, 2.5])),
        )
        .unwrap(),
    ])
    .unwrap();
    graph.add_edge_properties(&edge_props).unwrap();
    graph
}

fn assert_same_columns(got: &[ChunkedColumn], want: &[ChunkedColumn]) {
    assert_eq!(got.len(), want.len());
    for (g, w) in got.iter().zip(want) {
        assert_eq!(g.name(), w.name());
        assert_eq!(g.data_type(), w.data_type());
        assert_eq!(
            g.to_array().unwrap().to_data(),
            w.to_array().unwrap().to_data()
        );
    }
}

#[test]
fn roundtrip_preserves_schemas_values_and_topology() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("graph");

    let graph = sample_graph();
    graph.write_to(&location).unwrap();

    let loaded = PropertyGraph::load(&location).unwrap();
    assert!(loaded.is_loaded());
    assert!(loaded.validate().is_ok());

    assert_eq!(loaded.node_schema(), graph.node_schema());
    assert_eq!(loaded.edge_schema(), graph.edge_schema());
    assert_same_columns(loaded.node_properties(), graph.node_properties());
    assert_same_columns(loaded.edge_properties(), graph.edge_properties());

    assert_eq!(
        loaded.topology().out_indices().values(),
        graph.topology().out_indices().values()
    );
    assert_eq!(
        loaded.topology().out_dests().values(),
        graph.topology().out_dests().values()
    );
}

#[test]
fn roundtrip_of_property_less_graph_keeps_row_counts() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("graph");

    let mut graph = PropertyGraph::new();
    graph
        .set_topology(GraphTopology::from_vecs(vec![0, 1], vec![0]))
        .unwrap();
    graph.write_to(&location).unwrap();

    let loaded = PropertyGraph::load(&location).unwrap();
    assert_eq!(loaded.topology().num_nodes(), 2);
    assert_eq!(loaded.node_schema().fields().len(), 0);
    assert_eq!(loaded.node_table().num_rows(), 2);
    assert_eq!(loaded.edge_table().num_rows(), 1);
}

#[test]
fn roundtrip_of_empty_graph() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("graph");

    PropertyGraph::new().write_to(&location).unwrap();

    let loaded = PropertyGraph::load(&location).unwrap();
    assert_eq!(loaded.topology().num_nodes(), 0);
    assert_eq!(loaded.topology().num_edges(), 0);
}

#[test]
fn write_to_never_overwrites() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("graph");

    let graph = sample_graph();
    graph.write_to(&location).unwrap();

    let err = graph.write_to(&location).unwrap_err();
    assert!(err.is_already_exists(), "got {err:?}");
}

#[test]
fn write_back_overwrites_loaded_location() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("graph");
    sample_graph().write_to(&location).unwrap();

    let mut loaded = PropertyGraph::load(&location).unwrap();
    let score = PropertyTable::from_columns(vec![
        ChunkedColumn::from_array(
            field("score", DataType::Int64),
            Arc::new(Int64Array::from(vec![1, 2, 3, 4])),
        )
        .unwrap(),
    ])
    .unwrap();
    loaded.add_node_properties(&score).unwrap();
    loaded.write().unwrap();
    drop(loaded);

    let reloaded = PropertyGraph::load(&location).unwrap();
    assert_eq!(reloaded.node_schema().fields().len(), 3);
    assert_eq!(reloaded.node_table().column_index("score"), Some(2));
}

#[test]
fn load_missing_location_is_not_found() {
    let dir = tempdir().unwrap();
    let err = PropertyGraph::load(dir.path().join("absent")).unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
}

#[test]
fn load_of_inconsistent_storage_fails_validation() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("graph");

    // Commit a node table with two rows against a one-node topology; the
    // storage layer does not judge consistency, the load must.
    {
        let handle = StorageHandle::create(&location).unwrap();
        let schema = Arc::new(arrow::datatypes::Schema::new(vec![Field::new(
            "rank",
            DataType::Int64,
            false,
        )]));
        let batch = arrow::record_batch::RecordBatch::try_new(
            schema,
            vec![Arc::new(Int64Array::from(vec![1, 2])) as arrow::array::ArrayRef],
        )
        .unwrap();
        handle
            .commit(&TopologySegment::new(vec![0], Vec::new()), &[batch], &[])
            .unwrap();
    }

    let err = PropertyGraph::load(&location).unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "got {err:?}");
}

#[test]
fn failed_load_releases_the_storage_lock() {
    let dir = tempdir().unwrap();
    let location = dir.path().join("graph");
    sample_graph().write_to(&location).unwrap();

    // Corrupt the topology part so loading fails mid-way.
    let topology_path = location.join("topology.bin");
    let mut bytes = std::fs::read(&topology_path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    std::fs::write(&topology_path, &bytes).unwrap();

    let err = PropertyGraph::load(&location).unwrap_err();
    assert!(matches!(err, Error::Serialization(_)), "got {err:?}");

    // The failed load released its handle, so the location can be opened.
    assert!(StorageHandle::open(&location).is_ok());
}
