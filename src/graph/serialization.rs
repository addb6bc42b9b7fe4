use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::graph::model::GraphModel;

/// Writes graphs back in the adjacency-matrix block format understood by
/// [`AdjacencyParser`](crate::graph::parser::AdjacencyParser). Parsing the
/// output reproduces the graph up to isomorphism.
pub struct AdjacencyWriter;

impl AdjacencyWriter {
    pub fn to_text(graph: &GraphModel) -> String {
        let n = graph.vertex_count();
        let mut counts = vec![vec![0u64; n]; n];
        for (origin, target) in graph.edge_list() {
            counts[origin][target] += 1;
            if !graph.is_directed() && origin != target {
                counts[target][origin] += 1;
            }
        }

        let mut out = String::new();
        let _ = writeln!(out, "{n}");
        for row in &counts {
            let cells: Vec<String> = row.iter().map(u64::to_string).collect();
            let _ = writeln!(out, "{}", cells.join(" "));
        }
        out
    }

    pub fn pair_to_text(pattern: &GraphModel, target: &GraphModel) -> String {
        format!("{}\n{}", Self::to_text(pattern), Self::to_text(target))
    }

    pub fn write_pair_to_path(
        pattern: &GraphModel,
        target: &GraphModel,
        path: &Path,
    ) -> Result<()> {
        fs::write(path, Self::pair_to_text(pattern, target))
            .with_context(|| format!("write adjacency matrices to {:?}", path))
    }
}
