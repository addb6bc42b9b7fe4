use anyhow::{ensure, Result};
use ndarray::Array2;

use crate::linprog::{
    Constraint, LinearExpr, LinearProgram, Relation, Sense, VarId, VarKind, Variable,
};
use crate::problem::Problem;

/// Tolerance for every cost-vs-threshold comparison.
pub(crate) const EPSILON: f64 = 1e-9;

/// Which objective coefficients survive assembly.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CoeffFilter {
    /// Keep strictly positive coefficients (exact-matching objectives).
    PositiveOnly,
    /// Keep any coefficient of significant magnitude (credit objectives
    /// with negative terms).
    NonZero,
}

impl CoeffFilter {
    fn keeps(self, coeff: f64) -> bool {
        match self {
            CoeffFilter::PositiveOnly => coeff > EPSILON,
            CoeffFilter::NonZero => coeff.abs() > EPSILON,
        }
    }
}

/// The variable skeleton and constraint families shared by all four
/// matching formulations.
///
/// Builds x[i][k] (pattern vertex i -> target vertex k) and y[ij][kl]
/// (pattern edge ij -> target edge kl) grids over a fresh minimisation
/// program, then lets each variant pick cover relations, optional
/// constraint families and an objective. Pruning never removes variables;
/// it collapses their bounds to [0, 0] so constraint indexing stays
/// stable.
pub(crate) struct MatchingSkeleton {
    lp: LinearProgram,
    x: Vec<Vec<VarId>>,
    y: Vec<Vec<VarId>>,
    x_costs: Array2<f64>,
    y_costs: Array2<f64>,
    pattern_edges: Vec<(usize, usize)>,
    target_edges: Vec<(usize, usize)>,
    n_vp: usize,
    n_vt: usize,
    n_ep: usize,
    n_et: usize,
    directed: bool,
}

impl MatchingSkeleton {
    pub(crate) fn new(problem: &Problem, relaxed: bool) -> Result<Self> {
        let pattern = problem.pattern();
        let target = problem.target();
        ensure!(
            pattern.kind() == target.kind(),
            "pattern and target graphs must share the same kind"
        );
        let n_vp = pattern.vertex_count();
        let n_vt = target.vertex_count();
        let n_ep = pattern.edge_count();
        let n_et = target.edge_count();

        let mut lp = LinearProgram::new(Sense::Minimize);
        let kind = if relaxed {
            VarKind::Continuous
        } else {
            VarKind::Binary
        };

        let mut x = Vec::with_capacity(n_vp);
        for i in 0..n_vp {
            let mut row = Vec::with_capacity(n_vt);
            for k in 0..n_vt {
                row.push(lp.add_variable(Variable::new(format!("x_{i},{k}"), kind)));
            }
            x.push(row);
        }

        let mut y = Vec::with_capacity(n_ep);
        for ij in 0..n_ep {
            let mut row = Vec::with_capacity(n_et);
            for kl in 0..n_et {
                row.push(lp.add_variable(Variable::new(format!("y_{ij},{kl}"), kind)));
            }
            y.push(row);
        }

        let mut x_costs = Array2::zeros((n_vp, n_vt));
        for i in 0..n_vp {
            for k in 0..n_vt {
                x_costs[[i, k]] = problem.cost(true, i, k);
            }
        }
        let mut y_costs = Array2::zeros((n_ep, n_et));
        for ij in 0..n_ep {
            for kl in 0..n_et {
                y_costs[[ij, kl]] = problem.cost(false, ij, kl);
            }
        }

        let pattern_edges = pattern.edge_list();
        let target_edges = target.edge_list();

        Ok(Self {
            lp,
            x,
            y,
            x_costs,
            y_costs,
            pattern_edges,
            target_edges,
            n_vp,
            n_vt,
            n_ep,
            n_et,
            directed: pattern.is_directed(),
        })
    }

    pub(crate) fn dims(&self) -> (usize, usize, usize, usize) {
        (self.n_vp, self.n_vt, self.n_ep, self.n_et)
    }

    pub(crate) fn x_cost(&self, i: usize, k: usize) -> f64 {
        self.x_costs[[i, k]]
    }

    pub(crate) fn y_cost(&self, ij: usize, kl: usize) -> f64 {
        self.y_costs[[ij, kl]]
    }

    /// One cover constraint per pattern vertex: sum over its x row,
    /// related to 1 by `relation`.
    pub(crate) fn vertex_cover(&mut self, relation: Relation) {
        for i in 0..self.n_vp {
            let mut expr = LinearExpr::new();
            for k in 0..self.n_vt {
                expr.add_term(self.x[i][k], 1.0);
            }
            self.lp
                .add_constraint(Constraint::new(format!("vertex_{i}"), expr, relation, 1.0));
        }
    }

    /// Each target vertex receives at most one pattern vertex.
    pub(crate) fn target_vertex_cap(&mut self) {
        for k in 0..self.n_vt {
            let mut expr = LinearExpr::new();
            for i in 0..self.n_vp {
                expr.add_term(self.x[i][k], 1.0);
            }
            self.lp.add_constraint(Constraint::new(
                format!("target_vertex_{k}"),
                expr,
                Relation::LessEq,
                1.0,
            ));
        }
    }

    /// One cover constraint per pattern edge over its y row.
    pub(crate) fn edge_cover(&mut self, relation: Relation) {
        for ij in 0..self.n_ep {
            let mut expr = LinearExpr::new();
            for kl in 0..self.n_et {
                expr.add_term(self.y[ij][kl], 1.0);
            }
            self.lp
                .add_constraint(Constraint::new(format!("edge_{ij}"), expr, relation, 1.0));
        }
    }

    /// Each target edge absorbs at most one pattern edge (the symmetric
    /// cap edit distance needs).
    pub(crate) fn target_edge_cap(&mut self) {
        for kl in 0..self.n_et {
            let mut expr = LinearExpr::new();
            for ij in 0..self.n_ep {
                expr.add_term(self.y[ij][kl], 1.0);
            }
            self.lp.add_constraint(Constraint::new(
                format!("target_edge_{kl}"),
                expr,
                Relation::LessEq,
                1.0,
            ));
        }
    }

    /// F2 incidence coupling: if pattern edge ij maps onto an edge
    /// touching target vertex k, the matching pattern endpoint must map
    /// onto k. Undirected graphs admit either endpoint on either side.
    pub(crate) fn edge_consistency(&mut self) {
        for ij in 0..self.n_ep {
            let (i, j) = self.pattern_edges[ij];
            for k in 0..self.n_vt {
                let mut out_expr = LinearExpr::new();
                let mut in_expr = LinearExpr::new();

                for kl in 0..self.n_et {
                    let (k_out, k_in) = self.target_edges[kl];
                    if k_out == k {
                        out_expr.add_term(self.y[ij][kl], 1.0);
                    }
                    if k_in == k {
                        in_expr.add_term(self.y[ij][kl], 1.0);
                    }
                }

                out_expr.add_term(self.x[i][k], -1.0);
                in_expr.add_term(self.x[j][k], -1.0);
                if !self.directed {
                    out_expr.add_term(self.x[j][k], -1.0);
                    in_expr.add_term(self.x[i][k], -1.0);
                }

                self.lp.add_constraint(Constraint::new(
                    format!("edge_cons_{ij}_{k}_out"),
                    out_expr,
                    Relation::LessEq,
                    0.0,
                ));
                self.lp.add_constraint(Constraint::new(
                    format!("edge_cons_{ij}_{k}_in"),
                    in_expr,
                    Relation::LessEq,
                    0.0,
                ));
            }
        }
    }

    /// Induced-subgraph option: a matched target vertex pair may not
    /// leave the target edge between them unmatched.
    pub(crate) fn induced(&mut self) {
        for kl in 0..self.n_et {
            let (k, l) = self.target_edges[kl];
            let mut expr = LinearExpr::new();
            for i in 0..self.n_vp {
                expr.add_term(self.x[i][k], 1.0);
                expr.add_term(self.x[i][l], 1.0);
            }
            for ij in 0..self.n_ep {
                expr.add_term(self.y[ij][kl], -1.0);
            }
            self.lp.add_constraint(Constraint::new(
                format!("induced_{kl}"),
                expr,
                Relation::LessEq,
                1.0,
            ));
        }
    }

    /// Pruning: keep only the cheapest substitution candidates.
    ///
    /// `up == 1` leaves the problem untouched. Otherwise every x row and
    /// column is thresholded at its floor(n * up)-th smallest cost, and y
    /// variables whose endpoint assignments became inactive are collapsed
    /// as well (directed: the single orientation; undirected: either).
    pub(crate) fn restrict(&mut self, up: f64) -> Result<()> {
        ensure!(
            up > 0.0 && up <= 1.0,
            "upperbound must lie in (0, 1], got {up}"
        );
        if up >= 1.0 {
            return Ok(());
        }

        if self.n_vt > 0 {
            for i in 0..self.n_vp {
                let row: Vec<f64> = (0..self.n_vt).map(|k| self.x_costs[[i, k]]).collect();
                let threshold = rank_threshold(&row, up);
                for k in 0..self.n_vt {
                    if self.x_costs[[i, k]] > threshold + EPSILON {
                        self.lp.variable_mut(self.x[i][k]).deactivate();
                    }
                }
            }
        }

        if self.n_vp > 0 {
            for k in 0..self.n_vt {
                let column: Vec<f64> = (0..self.n_vp).map(|i| self.x_costs[[i, k]]).collect();
                let threshold = rank_threshold(&column, up);
                for i in 0..self.n_vp {
                    if self.x_costs[[i, k]] > threshold + EPSILON {
                        self.lp.variable_mut(self.x[i][k]).deactivate();
                    }
                }
            }
        }

        self.restrict_edge_pairs();
        Ok(())
    }

    /// Optional extra pass thresholding each y row by edge substitution
    /// cost, mirroring the vertex row pass.
    pub(crate) fn restrict_edge_rows(&mut self, up: f64) -> Result<()> {
        ensure!(
            up > 0.0 && up <= 1.0,
            "upperbound must lie in (0, 1], got {up}"
        );
        if up >= 1.0 {
            return Ok(());
        }

        if self.n_et > 0 {
            for ij in 0..self.n_ep {
                let row: Vec<f64> = (0..self.n_et).map(|kl| self.y_costs[[ij, kl]]).collect();
                let threshold = rank_threshold(&row, up);
                for kl in 0..self.n_et {
                    if self.y_costs[[ij, kl]] > threshold + EPSILON {
                        self.lp.variable_mut(self.y[ij][kl]).deactivate();
                    }
                }
            }
        }

        self.restrict_edge_pairs();
        Ok(())
    }

    /// A y variable is only viable while its endpoint x assignments are.
    fn restrict_edge_pairs(&mut self) {
        for ij in 0..self.n_ep {
            let (i, j) = self.pattern_edges[ij];
            for kl in 0..self.n_et {
                let (k, l) = self.target_edges[kl];
                let straight = self.lp.variable(self.x[i][k]).is_active()
                    && self.lp.variable(self.x[j][l]).is_active();
                let viable = if self.directed {
                    straight
                } else {
                    straight
                        || (self.lp.variable(self.x[i][l]).is_active()
                            && self.lp.variable(self.x[j][k]).is_active())
                };
                if !viable {
                    self.lp.variable_mut(self.y[ij][kl]).deactivate();
                }
            }
        }
    }

    /// Assembles the objective from per-assignment coefficient functions
    /// receiving (pattern index, target index, substitution cost).
    pub(crate) fn set_objective_from(
        &mut self,
        constant: f64,
        x_coeff: impl Fn(usize, usize, f64) -> f64,
        y_coeff: impl Fn(usize, usize, f64) -> f64,
        filter: CoeffFilter,
    ) {
        let mut objective = LinearExpr::new();
        objective.set_constant(constant);

        for i in 0..self.n_vp {
            for k in 0..self.n_vt {
                let coeff = x_coeff(i, k, self.x_costs[[i, k]]);
                if filter.keeps(coeff) {
                    objective.add_term(self.x[i][k], coeff);
                }
            }
        }
        for ij in 0..self.n_ep {
            for kl in 0..self.n_et {
                let coeff = y_coeff(ij, kl, self.y_costs[[ij, kl]]);
                if filter.keeps(coeff) {
                    objective.add_term(self.y[ij][kl], coeff);
                }
            }
        }

        self.lp.set_objective(objective);
    }

    pub(crate) fn lp(&self) -> &LinearProgram {
        &self.lp
    }

    pub(crate) fn into_lp(self) -> LinearProgram {
        self.lp
    }
}

/// The floor(n * up)-th smallest value of `costs` (clamped to the last
/// element), used as the keep-threshold of a pruning pass.
fn rank_threshold(costs: &[f64], up: f64) -> f64 {
    debug_assert!(!costs.is_empty());
    let mut sorted = costs.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = ((costs.len() as f64) * up).floor() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_threshold_picks_the_cut_cost() {
        let costs = [4.0, 0.0, 2.0, 1.0];
        assert_eq!(rank_threshold(&costs, 0.5), 2.0);
        assert_eq!(rank_threshold(&costs, 0.25), 1.0);
    }
}
