use crate::problem::{Problem, ProblemKind};
use crate::solver::driver::{SolveOutcome, SolveStatus};

/// A variable counts as selected from this activation level on; solvers
/// are expected to deliver (near-)integral values.
const ACTIVATION: f64 = 0.5;
/// Objectives below this are treated as exactly zero.
const ZERO_TOLERANCE: f64 = 1e-6;

/// The decoded result of a solve: vertex and edge mappings, unmatched
/// element lists, and the derived matching metrics.
#[derive(Debug, Clone)]
pub struct Matching {
    pub status: SolveStatus,
    pub objective: f64,
    /// `vertex_mapping[i] = Some(k)` maps pattern vertex i onto target
    /// vertex k; `None` leaves it unmatched.
    pub vertex_mapping: Vec<Option<usize>>,
    pub edge_mapping: Vec<Option<usize>>,
    pub unmatched_pattern_vertices: Vec<usize>,
    pub unmatched_pattern_edges: Vec<usize>,
    /// Populated for edit-distance problems only.
    pub unmatched_target_vertices: Vec<usize>,
    pub unmatched_target_edges: Vec<usize>,
}

impl Matching {
    /// Decodes the solver's value map against the problem dimensions.
    /// The first activated target candidate wins; the cover constraints
    /// guarantee at most one per pattern element.
    pub fn interpret(problem: &Problem, outcome: &SolveOutcome) -> Self {
        let n_vp = problem.pattern().vertex_count();
        let n_vt = problem.target().vertex_count();
        let n_ep = problem.pattern().edge_count();
        let n_et = problem.target().edge_count();

        let mut vertex_mapping = vec![None; n_vp];
        let mut matched_targets = vec![false; n_vt];
        for (i, slot) in vertex_mapping.iter_mut().enumerate() {
            for k in 0..n_vt {
                if activated(outcome, &format!("x_{i},{k}")) {
                    *slot = Some(k);
                    matched_targets[k] = true;
                    break;
                }
            }
        }

        let mut edge_mapping = vec![None; n_ep];
        let mut matched_target_edges = vec![false; n_et];
        for (ij, slot) in edge_mapping.iter_mut().enumerate() {
            for kl in 0..n_et {
                if activated(outcome, &format!("y_{ij},{kl}")) {
                    *slot = Some(kl);
                    matched_target_edges[kl] = true;
                    break;
                }
            }
        }

        let unmatched_pattern_vertices = unmatched_indices(&vertex_mapping);
        let unmatched_pattern_edges = unmatched_indices(&edge_mapping);
        let (unmatched_target_vertices, unmatched_target_edges) =
            if problem.kind() == ProblemKind::EditDistance {
                (
                    unmatched_flags(&matched_targets),
                    unmatched_flags(&matched_target_edges),
                )
            } else {
                (Vec::new(), Vec::new())
            };

        Self {
            status: outcome.status,
            objective: outcome.objective,
            vertex_mapping,
            edge_mapping,
            unmatched_pattern_vertices,
            unmatched_pattern_edges,
            unmatched_target_vertices,
            unmatched_target_edges,
        }
    }

    /// The pattern embeds without cost.
    pub fn is_subgraph(&self) -> bool {
        self.objective < ZERO_TOLERANCE
    }

    /// Zero edit distance: structurally identical graphs.
    pub fn is_isomorphic(&self) -> bool {
        self.objective.abs() < ZERO_TOLERANCE
    }

    /// The objective rounded to the nearest integer, or `None` when the
    /// program had no solution (reported as `inf` downstream).
    pub fn minimal_extension(&self) -> Option<i64> {
        self.objective
            .is_finite()
            .then(|| self.objective.round() as i64)
    }

    /// Unmatched pattern edges as endpoint pairs, sorted ascending by
    /// (origin, target).
    pub fn unmatched_pattern_edge_pairs(&self, problem: &Problem) -> Vec<(usize, usize)> {
        sorted_endpoint_pairs(problem.pattern(), &self.unmatched_pattern_edges)
    }

    /// Unmatched target edges as endpoint pairs, sorted ascending.
    pub fn unmatched_target_edge_pairs(&self, problem: &Problem) -> Vec<(usize, usize)> {
        sorted_endpoint_pairs(problem.target(), &self.unmatched_target_edges)
    }
}

fn activated(outcome: &SolveOutcome, id: &str) -> bool {
    outcome
        .values
        .get(id)
        .map_or(false, |value| *value >= ACTIVATION)
}

fn unmatched_indices(mapping: &[Option<usize>]) -> Vec<usize> {
    mapping
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_none())
        .map(|(index, _)| index)
        .collect()
}

fn unmatched_flags(matched: &[bool]) -> Vec<usize> {
    matched
        .iter()
        .enumerate()
        .filter(|(_, used)| !**used)
        .map(|(index, _)| index)
        .collect()
}

fn sorted_endpoint_pairs(
    graph: &crate::graph::GraphModel,
    edges: &[usize],
) -> Vec<(usize, usize)> {
    let mut pairs: Vec<(usize, usize)> = edges
        .iter()
        .filter_map(|&edge| graph.endpoints(edge))
        .collect();
    pairs.sort_unstable();
    pairs
}
