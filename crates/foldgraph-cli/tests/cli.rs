use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

const GRAPH: &str = r#"{
    "nodes": [
        {"id": 1, "label": "P"},
        {"id": 2, "label": "A", "parent": 1},
        {"id": 3, "label": "B", "parent": 2},
        {"id": 4, "label": "X"}
    ],
    "edges": [{"id": 1, "source": 3, "target": 4, "data": {"kind": "call"}}]
}"#;

fn graph_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(GRAPH.as_bytes()).unwrap();
    file
}

#[test]
fn collapse_recursively_prints_graph() {
    let graph = graph_file();
    let output = Command::new(env!("CARGO_BIN_EXE_foldgraph"))
        .arg("--graph")
        .arg(graph.path())
        .args(["--op", "collapse-recursively:1"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let nodes = doc["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    let edges = doc["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["source"], 1);
    assert_eq!(edges[0]["target"], 4);
}

#[test]
fn output_file_round_trips_after_undo() {
    let graph = graph_file();
    let out = NamedTempFile::new().unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_foldgraph"))
        .arg("--graph")
        .arg(graph.path())
        .args(["--op", "collapseAll", "--op", "expand:1", "--undo", "2"])
        .arg("--output")
        .arg(out.path())
        .status()
        .unwrap();
    assert!(status.success());

    let written = std::fs::read_to_string(out.path()).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(doc["nodes"].as_array().unwrap().len(), 4);
    assert_eq!(doc["edges"][0]["data"]["kind"], "call");
}

#[test]
fn unknown_operation_fails() {
    let graph = graph_file();
    let output = Command::new(env!("CARGO_BIN_EXE_foldgraph"))
        .arg("--graph")
        .arg(graph.path())
        .args(["--op", "fold:1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("fold"));
}
