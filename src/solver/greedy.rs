use std::cmp::Reverse;
use std::collections::HashMap;

use indexmap::IndexMap;
use log::debug;

use crate::graph::Incidence;
use crate::problem::Problem;
use crate::solver::driver::{SolveOutcome, SolveStatus};

/// Score weight that makes structure preservation dominate degree
/// similarity.
const NEIGHBOUR_WEIGHT: i64 = 1000;

/// Degree-guided greedy matching: a fast feasible solution whose
/// objective (unmatched pattern vertices plus unmatched pattern edges) is
/// an upper bound on the minimal-extension optimum. No mixed-integer
/// engine is involved.
pub struct GreedySolver;

impl GreedySolver {
    pub fn solve(problem: &Problem) -> SolveOutcome {
        let pattern = problem.pattern();
        let target = problem.target();
        let n_vp = pattern.vertex_count();
        let n_vt = target.vertex_count();
        let n_ep = pattern.edge_count();
        let n_et = target.edge_count();

        let mut vertex_matching: Vec<Option<usize>> = vec![None; n_vp];
        let mut edge_matching: Vec<Option<usize>> = vec![None; n_ep];
        let mut target_vertex_used = vec![false; n_vt];
        let mut target_edge_used = vec![false; n_et];
        let mut values = IndexMap::new();

        // (origin, target) -> edge index; undirected edges are reachable
        // under both orderings.
        let mut target_adjacency: HashMap<(usize, usize), usize> = HashMap::new();
        for kl in 0..n_et {
            let Some((k, l)) = target.endpoints(kl) else {
                continue;
            };
            target_adjacency.insert((k, l), kl);
            if !target.is_directed() {
                target_adjacency.insert((l, k), kl);
            }
        }

        // High-degree pattern vertices first: they are the hardest to
        // place and anchor the rest of the matching.
        let mut order: Vec<usize> = (0..n_vp).collect();
        order.sort_by_key(|&i| Reverse(pattern.degree(i)));

        for i in order {
            let mut best: Option<(i64, usize)> = None;
            for k in 0..n_vt {
                if target_vertex_used[k] {
                    continue;
                }

                let mut supported = 0i64;
                for edge in pattern.incident_edges(i, Incidence::Both) {
                    let Some((origin, end)) = pattern.endpoints(edge) else {
                        continue;
                    };
                    let j = if origin == i { end } else { origin };
                    if let Some(l) = vertex_matching[j] {
                        if target_adjacency.contains_key(&(k, l))
                            || target_adjacency.contains_key(&(l, k))
                        {
                            supported += 1;
                        }
                    }
                }

                let degree_gap = (pattern.degree(i) as i64 - target.degree(k) as i64).abs();
                let score = supported * NEIGHBOUR_WEIGHT - degree_gap;
                if best.map_or(true, |(best_score, _)| score > best_score) {
                    best = Some((score, k));
                }
            }

            if let Some((_, k)) = best {
                vertex_matching[i] = Some(k);
                target_vertex_used[k] = true;
                values.insert(format!("x_{i},{k}"), 1.0);
            }
        }

        for ij in 0..n_ep {
            let Some((i, j)) = pattern.endpoints(ij) else {
                continue;
            };
            let (Some(k), Some(l)) = (vertex_matching[i], vertex_matching[j]) else {
                continue;
            };
            let candidate = target_adjacency.get(&(k, l)).copied().or_else(|| {
                if target.is_directed() {
                    None
                } else {
                    target_adjacency.get(&(l, k)).copied()
                }
            });
            if let Some(kl) = candidate {
                if !target_edge_used[kl] {
                    edge_matching[ij] = Some(kl);
                    target_edge_used[kl] = true;
                    values.insert(format!("y_{ij},{kl}"), 1.0);
                }
            }
        }

        let unmatched_vertices = vertex_matching.iter().filter(|m| m.is_none()).count();
        let unmatched_edges = edge_matching.iter().filter(|m| m.is_none()).count();
        let objective = (unmatched_vertices + unmatched_edges) as f64;

        debug!(
            "greedy matching: objective {objective} ({unmatched_vertices} vertices, \
             {unmatched_edges} edges unmatched)"
        );
        SolveOutcome {
            status: SolveStatus::Suboptimal,
            objective,
            values,
        }
    }
}
