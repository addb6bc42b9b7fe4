use anyhow::Result;
use log::debug;

use crate::formulation::skeleton::{CoeffFilter, MatchingSkeleton};
use crate::linprog::{LinearProgram, Relation};
use crate::problem::Problem;

#[derive(Debug, Clone)]
pub struct SubstitutionOptions {
    pub induced: bool,
    /// Pruning ratio in (0, 1]; approximation quality trades against
    /// model size through this single knob.
    pub upperbound: f64,
    /// Additionally threshold each edge row by substitution cost, not
    /// just by endpoint viability.
    pub prune_edge_costs: bool,
}

impl Default for SubstitutionOptions {
    fn default() -> Self {
        Self {
            induced: false,
            upperbound: 1.0,
            prune_edge_costs: false,
        }
    }
}

/// Substitution-tolerant subgraph matching: the cover constraints of
/// subgraph isomorphism, but label mismatches are admitted at the cost
/// recorded in the problem's substitution matrices.
pub struct SubstitutionMatching {
    lp: LinearProgram,
}

impl SubstitutionMatching {
    pub fn build(problem: &Problem, options: &SubstitutionOptions) -> Result<Self> {
        let mut skeleton = MatchingSkeleton::new(problem, false)?;
        skeleton.restrict(options.upperbound)?;
        if options.prune_edge_costs {
            skeleton.restrict_edge_rows(options.upperbound)?;
        }

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
            "substitution matching program: {} variables, {} constraints",
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
