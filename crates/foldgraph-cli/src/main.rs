use anyhow::{Context, Result, bail};
use clap::Parser;
use foldgraph_core::NodeId;
use foldgraph_graph::{CompoundGraph, ExpandCollapse, ExpandCollapseOptions, GraphDocument, Operation};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about = "Collapse and expand compound graph nodes", long_about = None)]
struct Args {
    /// Graph document (JSON)
    #[arg(short, long)]
    graph: PathBuf,

    /// Option overrides (JSON object with camelCase keys)
    #[arg(long)]
    options: Option<PathBuf>,

    /// Operation to apply, e.g. `collapse:1,2` or `expand-all`. Repeatable; applied in order.
    #[arg(long = "op", value_parser = parse_operation)]
    ops: Vec<Operation>,

    /// Undo this many operations after applying them
    #[arg(long, default_value_t = 0)]
    undo: usize,

    /// Write the resulting graph here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// `NAME[:ID,ID...]`
fn parse_operation(raw: &str) -> Result<Operation, String> {
    let (name, ids) = raw.split_once(':').unwrap_or((raw, ""));
    let nodes = ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<i64>()
                .map(NodeId)
                .map_err(|e| format!("invalid node id `{}`: {}", id, e))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Operation::from_name(name, nodes).map_err(|e| e.to_string())
}

fn load_options(path: Option<&Path>) -> Result<ExpandCollapseOptions> {
    let defaults = ExpandCollapseOptions::default();
    let Some(path) = path else {
        return Ok(defaults);
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading options {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing options {}", path.display()))?;
    let Some(overrides) = value.as_object() else {
        bail!("options file {} must contain a JSON object", path.display());
    };
    Ok(defaults.merged(overrides)?)
}

fn run(args: &Args) -> Result<GraphDocument> {
    let raw = std::fs::read_to_string(&args.graph)
        .with_context(|| format!("reading graph {}", args.graph.display()))?;
    let doc: GraphDocument = serde_json::from_str(&raw)
        .with_context(|| format!("parsing graph {}", args.graph.display()))?;
    let options = load_options(args.options.as_deref())?;

    let mut api = ExpandCollapse::new(CompoundGraph::from_document(doc), options);
    for op in &args.ops {
        let output = api.dispatch(op.clone())?;
        tracing::info!("{} affected {} nodes", op, output.affected().len());
    }
    for step in 0..args.undo {
        api.undo()
            .with_context(|| format!("undo {} of {}", step + 1, args.undo))?;
    }
    Ok(api.into_graph().to_document())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let args = Args::parse();

    let doc = run(&args)?;
    let json = serde_json::to_string_pretty(&doc)?;
    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const GRAPH: &str = r#"{
        "nodes": [
            {"id": 1, "label": "P"},
            {"id": 2, "label": "A", "parent": 1},
            {"id": 3, "label": "X"}
        ],
        "edges": [{"id": 1, "source": 2, "target": 3}]
    }"#;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn args(graph: &Path, ops: &[&str]) -> Args {
        let mut argv = vec!["foldgraph".to_string(), "--graph".to_string()];
        argv.push(graph.display().to_string());
        for op in ops {
            argv.push("--op".to_string());
            argv.push(op.to_string());
        }
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_operation() {
        assert_eq!(
            parse_operation("collapse:1, 2"),
            Ok(Operation::Collapse(vec![NodeId(1), NodeId(2)]))
        );
        assert_eq!(parse_operation("expand-all"), Ok(Operation::ExpandAll));
        assert!(parse_operation("collapse:x").is_err());
        assert!(parse_operation("shrink:1").is_err());
    }

    #[test]
    fn test_unknown_operation_rejected_by_parser() {
        let graph = write_temp(GRAPH);
        let result = Args::try_parse_from([
            "foldgraph",
            "--graph",
            &graph.path().display().to_string(),
            "--op",
            "shrink:1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_collapse() {
        let graph = write_temp(GRAPH);
        let doc = run(&args(graph.path(), &["collapse:1"])).unwrap();
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.edges.len(), 1);
        assert_eq!(doc.edges[0].source, NodeId(1));
        assert_eq!(doc.edges[0].target, NodeId(3));
    }

    #[test]
    fn test_run_with_undo_restores_input() {
        let graph = write_temp(GRAPH);
        let mut parsed = args(graph.path(), &["collapse-all"]);
        parsed.undo = 1;
        let doc = run(&parsed).unwrap();
        assert_eq!(doc.nodes.len(), 3);
        assert_eq!(doc.edges.len(), 1);
        assert_eq!(doc.edges[0].source, NodeId(2));
    }

    #[test]
    fn test_undo_past_history_fails() {
        let graph = write_temp(GRAPH);
        let mut parsed = args(graph.path(), &[]);
        parsed.undo = 1;
        assert!(run(&parsed).is_err());
    }

    #[test]
    fn test_options_file() {
        let graph = write_temp(GRAPH);
        let options = write_temp(r#"{"undoable": false, "somethingElse": 1}"#);
        let mut parsed = args(graph.path(), &["collapse:1"]);
        parsed.options = Some(options.path().to_path_buf());
        parsed.undo = 1;
        // Nothing recorded, so there is nothing to undo.
        assert!(run(&parsed).is_err());

        let bad = write_temp("[1, 2]");
        assert!(load_options(Some(bad.path())).is_err());
    }
}
