use anyhow::Result;
use log::debug;

use crate::formulation::skeleton::{CoeffFilter, MatchingSkeleton};
use crate::linprog::{LinearProgram, Relation};
use crate::problem::Problem;

#[derive(Debug, Clone)]
pub struct SubgraphOptions {
    /// Enforce induced-subgraph semantics.
    pub induced: bool,
    /// Pruning ratio in (0, 1]; 1 disables pruning.
    pub upperbound: f64,
}

impl Default for SubgraphOptions {
    fn default() -> Self {
        Self {
            induced: false,
            upperbound: 1.0,
        }
    }
}

/// Exact subgraph isomorphism: every pattern vertex and edge must be
/// matched, target elements injectively. Infeasibility of the resulting
/// program means the pattern does not embed into the target.
pub struct SubgraphIsomorphism {
    lp: LinearProgram,
}

impl SubgraphIsomorphism {
    pub fn build(problem: &Problem, options: &SubgraphOptions) -> Result<Self> {
        let mut skeleton = MatchingSkeleton::new(problem, false)?;
        skeleton.restrict(options.upperbound)?;

        skeleton.vertex_cover(Relation::Eq);
        skeleton.target_vertex_cap();
        skeleton.edge_cover(Relation::Eq);
        skeleton.edge_consistency();
        if options.induced {
            skeleton.induced();
        }

        skeleton.set_objective_from(
            0.0,
            |_, _, cost| cost,
            |_, _, cost| cost,
            CoeffFilter::PositiveOnly,
        );

        debug!(
            "subgraph isomorphism program: {} variables, {} constraints",
            skeleton.lp().variable_count(),
            skeleton.lp().constraint_count()
        );
        Ok(Self {
            lp: skeleton.into_lp(),
        })
    }

    pub fn lp(&self) -> &LinearProgram {
        &self.lp
    }

    pub fn into_lp(self) -> LinearProgram {
        self.lp
    }
}
