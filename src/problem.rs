use std::sync::Arc;

use anyhow::{bail, ensure, Result};
use ndarray::Array2;

use crate::graph::GraphModel;

/// Which matching family a problem instance belongs to. `Subgraph` covers
/// SI, STSM and minimal extension; `EditDistance` additionally charges for
/// unmatched target elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    Subgraph,
    EditDistance,
}

/// A matching instance: the pattern/target graph pair plus dense
/// substitution cost matrices. Costs default to zero (exact matching);
/// the problem holds no algorithmic logic.
#[derive(Debug, Clone)]
pub struct Problem {
    kind: ProblemKind,
    pattern: Arc<GraphModel>,
    target: Arc<GraphModel>,
    vertex_costs: Array2<f64>,
    edge_costs: Array2<f64>,
}

impl Problem {
    pub fn new(
        kind: ProblemKind,
        pattern: Arc<GraphModel>,
        target: Arc<GraphModel>,
    ) -> Result<Self> {
        if pattern.kind() != target.kind() {
            bail!("pattern and target graphs must share the same kind");
        }
        let vertex_costs = Array2::zeros((pattern.vertex_count(), target.vertex_count()));
        let edge_costs = Array2::zeros((pattern.edge_count(), target.edge_count()));
        Ok(Self {
            kind,
            pattern,
            target,
            vertex_costs,
            edge_costs,
        })
    }

    pub fn kind(&self) -> ProblemKind {
        self.kind
    }

    pub fn pattern(&self) -> &GraphModel {
        &self.pattern
    }

    pub fn target(&self) -> &GraphModel {
        &self.target
    }

    /// Substitution cost of mapping pattern element `i` onto target
    /// element `k`. Out-of-range queries return the zero element.
    pub fn cost(&self, is_vertex: bool, i: usize, k: usize) -> f64 {
        let matrix = if is_vertex {
            &self.vertex_costs
        } else {
            &self.edge_costs
        };
        matrix.get((i, k)).copied().unwrap_or(0.0)
    }

    /// Overrides one substitution cost. Values must be finite.
    pub fn set_cost(&mut self, is_vertex: bool, i: usize, k: usize, value: f64) -> Result<()> {
        ensure!(
            value.is_finite(),
            "substitution cost ({i}, {k}) must be finite, got {value}"
        );
        let shape = if is_vertex {
            (self.pattern.vertex_count(), self.target.vertex_count())
        } else {
            (self.pattern.edge_count(), self.target.edge_count())
        };
        ensure!(
            i < shape.0 && k < shape.1,
            "substitution cost index ({i}, {k}) outside matrix of shape {shape:?}"
        );
        let matrix = if is_vertex {
            &mut self.vertex_costs
        } else {
            &mut self.edge_costs
        };
        matrix[[i, k]] = value;
        Ok(())
    }
}
