use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::debug;

use crate::graph::model::{GraphBuilder, GraphKind, GraphModel};

/// How the adjacency matrices of an input file are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixMode {
    /// Undirected simple graph: symmetric 0/1 matrix, zero diagonal.
    Simple,
    /// Undirected multigraph: symmetric matrix, entry `w` creates `w`
    /// parallel edges, diagonal `w` creates `w` self-loops.
    Multigraph,
    /// Directed graph: entry `w` at (i, j) creates `w` arcs i -> j.
    Directed,
}

impl MatrixMode {
    fn graph_kind(self) -> GraphKind {
        match self {
            MatrixMode::Directed => GraphKind::Directed,
            _ => GraphKind::Undirected,
        }
    }
}

/// Reads a pattern/target graph pair from adjacency-matrix text.
///
/// The input holds two blocks back to back, each consisting of a vertex
/// count line followed by that many matrix rows. Empty lines are skipped.
pub struct AdjacencyParser;

impl AdjacencyParser {
    pub fn parse_path(path: &Path, mode: MatrixMode) -> Result<(GraphModel, GraphModel)> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read adjacency matrix file {:?}", path))?;
        Self::parse_pair(&text, mode)
    }

    pub fn parse_pair(text: &str, mode: MatrixMode) -> Result<(GraphModel, GraphModel)> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let (pattern, consumed) = Self::parse_block(&lines, 0, 1, mode)
            .context("parse pattern graph (first block)")?;
        let (target, _) = Self::parse_block(&lines, consumed, 2, mode)
            .context("parse target graph (second block)")?;

        debug!(
            "parsed pattern |V|={} |E|={}, target |V|={} |E|={}",
            pattern.vertex_count(),
            pattern.edge_count(),
            target.vertex_count(),
            target.edge_count()
        );
        Ok((pattern, target))
    }

    /// Parses one block starting at `start`; returns the graph and the
    /// index of the first unconsumed line.
    fn parse_block(
        lines: &[&str],
        start: usize,
        block: usize,
        mode: MatrixMode,
    ) -> Result<(GraphModel, usize)> {
        let Some(header) = lines.get(start) else {
            bail!("unexpected end of input while reading graph {block}");
        };
        let vertex_count: usize = header
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .with_context(|| format!("invalid vertex count '{header}' for graph {block}"))?;

        if start + 1 + vertex_count > lines.len() {
            bail!(
                "graph {block}: expected {vertex_count} matrix rows, found {}",
                lines.len() - start - 1
            );
        }

        let matrix = Self::read_matrix(&lines[start + 1..start + 1 + vertex_count], block)?;
        let graph = Self::build_graph(&matrix, block, mode)?;
        Ok((graph, start + 1 + vertex_count))
    }

    fn read_matrix(rows: &[&str], block: usize) -> Result<Vec<Vec<u64>>> {
        let n = rows.len();
        let mut matrix = Vec::with_capacity(n);
        for (i, row) in rows.iter().enumerate() {
            let mut values = Vec::with_capacity(n);
            for (j, token) in row.split_whitespace().enumerate() {
                let value: u64 = token.parse().with_context(|| {
                    format!(
                        "graph {block}: value '{token}' at position ({},{}) \
                         is not a non-negative integer",
                        i + 1,
                        j + 1
                    )
                })?;
                values.push(value);
            }
            if values.len() != n {
                bail!(
                    "graph {block}: row {} has {} values, expected {n}",
                    i + 1,
                    values.len()
                );
            }
            matrix.push(values);
        }
        Ok(matrix)
    }

    fn build_graph(matrix: &[Vec<u64>], block: usize, mode: MatrixMode) -> Result<GraphModel> {
        let n = matrix.len();
        let mut builder = GraphBuilder::with_capacity(mode.graph_kind(), n, n);
        for i in 0..n {
            builder.add_vertex(i.to_string())?;
        }

        match mode {
            MatrixMode::Simple | MatrixMode::Multigraph => {
                for i in 0..n {
                    for j in 0..n {
                        if matrix[i][j] != matrix[j][i] {
                            bail!(
                                "graph {block}: matrix is not symmetric at position \
                                 ({},{}): {} vs {}",
                                i + 1,
                                j + 1,
                                matrix[i][j],
                                matrix[j][i]
                            );
                        }
                    }
                }
                for i in 0..n {
                    for j in i..n {
                        let value = matrix[i][j];
                        if value == 0 {
                            continue;
                        }
                        if mode == MatrixMode::Simple {
                            if i == j {
                                bail!(
                                    "graph {block}: self-loop value {value} at position \
                                     ({},{}) requires multigraph mode",
                                    i + 1,
                                    j + 1
                                );
                            }
                            if value != 1 {
                                bail!(
                                    "graph {block}: value {value} at position ({},{}) \
                                     is not 0 or 1 (use multigraph mode)",
                                    i + 1,
                                    j + 1
                                );
                            }
                            builder.add_edge(i, j)?;
                        } else {
                            for _ in 0..value {
                                builder.add_edge(i, j)?;
                            }
                        }
                    }
                }
            }
            MatrixMode::Directed => {
                for (i, row) in matrix.iter().enumerate() {
                    for (j, &value) in row.iter().enumerate() {
                        for _ in 0..value {
                            builder.add_edge(i, j)?;
                        }
                    }
                }
            }
        }

        Ok(builder.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_and_square() -> &'static str {
        "3\n0 1 1\n1 0 1\n1 1 0\n\n4\n0 1 0 1\n1 0 1 0\n0 1 0 1\n1 0 1 0\n"
    }

    #[test]
    fn parses_two_blocks() {
        let (pattern, target) =
            AdjacencyParser::parse_pair(triangle_and_square(), MatrixMode::Simple)
                .expect("parse pair");
        assert_eq!(pattern.vertex_count(), 3);
        assert_eq!(pattern.edge_count(), 3);
        assert_eq!(target.vertex_count(), 4);
        assert_eq!(target.edge_count(), 4);
        assert!(pattern.contains_edge(0, 2));
        assert!(!target.contains_edge(0, 2));
        assert_eq!(pattern.vertex_by_id("2"), Some(2));
        assert_eq!(pattern.vertex_by_id("7"), None);
    }

    #[test]
    fn rejects_asymmetric_simple_matrix() {
        let text = "2\n0 1\n0 0\n2\n0 0\n0 0\n";
        let err = AdjacencyParser::parse_pair(text, MatrixMode::Simple).unwrap_err();
        assert!(format!("{err:#}").contains("not symmetric at position (1,2)"));
    }

    #[test]
    fn rejects_self_loop_outside_multigraph() {
        let text = "2\n1 0\n0 0\n2\n0 0\n0 0\n";
        let err = AdjacencyParser::parse_pair(text, MatrixMode::Simple).unwrap_err();
        assert!(format!("{err:#}").contains("self-loop"));
    }

    #[test]
    fn multigraph_creates_parallel_edges() {
        let text = "2\n0 3\n3 0\n2\n1 0\n0 0\n";
        let (pattern, target) = AdjacencyParser::parse_pair(text, MatrixMode::Multigraph)
            .expect("parse multigraph");
        assert_eq!(pattern.edge_count(), 3);
        assert_eq!(target.edge_count(), 1, "diagonal entry is one self-loop");
    }

    #[test]
    fn directed_mode_reads_full_matrix() {
        let text = "2\n0 2\n1 0\n2\n0 0\n0 0\n";
        let (pattern, _) =
            AdjacencyParser::parse_pair(text, MatrixMode::Directed).expect("parse directed");
        assert_eq!(pattern.edge_count(), 3);
        assert!(pattern.contains_edge(0, 1));
        assert!(pattern.contains_edge(1, 0));
    }
}
