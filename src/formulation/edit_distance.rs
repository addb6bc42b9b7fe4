use anyhow::Result;
use log::debug;

use crate::formulation::skeleton::{CoeffFilter, MatchingSkeleton};
use crate::linprog::{LinearProgram, Relation};
use crate::problem::Problem;

/// Deletion penalty used by the approximate-minimal-extension mode to
/// make target-side deletions prohibitively expensive.
const INFLATED_DELETION_COST: f64 = 1e6;

/// The four elementary edit operation costs. Pattern-side unmatched
/// elements pay insertion (they must be added to the target), target-side
/// unmatched elements pay deletion.
#[derive(Debug, Clone, Copy)]
pub struct EditCosts {
    pub vertex_insertion: f64,
    pub vertex_deletion: f64,
    pub edge_insertion: f64,
    pub edge_deletion: f64,
}

impl Default for EditCosts {
    fn default() -> Self {
        Self {
            vertex_insertion: 1.0,
            vertex_deletion: 1.0,
            edge_insertion: 1.0,
            edge_deletion: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditDistanceOptions {
    pub upperbound: f64,
    /// Downgrade every variable to continuous, turning the program into
    /// an efficiently solvable lower bound on the integer edit distance.
    pub relaxed: bool,
    pub costs: EditCosts,
}

impl Default for EditDistanceOptions {
    fn default() -> Self {
        Self {
            upperbound: 1.0,
            relaxed: false,
            costs: EditCosts::default(),
        }
    }
}

/// Graph edit distance: both sides may leave elements unmatched, and the
/// symmetric target-edge cap keeps the mapping injective on edges too.
///
/// The objective models "delete everything, then credit each match": one
/// substitution replaces one insertion plus one deletion, hence the
/// insertion+deletion credit on every assignment variable.
pub struct EditDistance {
    lp: LinearProgram,
}

impl EditDistance {
    pub fn build(problem: &Problem, options: &EditDistanceOptions) -> Result<Self> {
        let mut skeleton = MatchingSkeleton::new(problem, options.relaxed)?;
        skeleton.restrict(options.upperbound)?;

        skeleton.vertex_cover(Relation::LessEq);
        skeleton.target_vertex_cap();
        skeleton.edge_cover(Relation::LessEq);
        skeleton.target_edge_cap();
        skeleton.edge_consistency();

        let (n_vp, n_vt, n_ep, n_et) = skeleton.dims();
        let costs = options.costs;
        let constant = costs.vertex_insertion * n_vp as f64
            + costs.vertex_deletion * n_vt as f64
            + costs.edge_insertion * n_ep as f64
            + costs.edge_deletion * n_et as f64;
        let vertex_credit = costs.vertex_insertion + costs.vertex_deletion;
        let edge_credit = costs.edge_insertion + costs.edge_deletion;

        skeleton.set_objective_from(
            constant,
            |_, _, cost| cost - vertex_credit,
            |_, _, cost| cost - edge_credit,
            CoeffFilter::NonZero,
        );

        debug!(
            "edit distance program ({}): {} variables, {} constraints, constant {constant}",
            if options.relaxed { "relaxed" } else { "integer" },
            skeleton.lp().variable_count(),
            skeleton.lp().constraint_count()
        );
        Ok(Self {
            lp: skeleton.into_lp(),
        })
    }

    /// Relaxed edit distance with inflated deletion costs: biases the
    /// lower bound towards keeping every target element, approximating
    /// the minimal-extension objective.
    pub fn approximate_minimal_extension(problem: &Problem, upperbound: f64) -> Result<Self> {
        Self::build(
            problem,
            &EditDistanceOptions {
                upperbound,
                relaxed: true,
                costs: EditCosts {
                    vertex_insertion: 1.0,
                    vertex_deletion: INFLATED_DELETION_COST,
                    edge_insertion: 1.0,
                    edge_deletion: INFLATED_DELETION_COST,
                },
            },
        )
    }

    pub fn lp(&self) -> &LinearProgram {
        &self.lp
    }

    pub fn into_lp(self) -> LinearProgram {
        self.lp
    }
}
