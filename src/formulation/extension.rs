use anyhow::Result;
use log::debug;

use crate::formulation::skeleton::{CoeffFilter, MatchingSkeleton};
use crate::linprog::{LinearProgram, Relation};
use crate::problem::Problem;

#[derive(Debug, Clone)]
pub struct ExtensionOptions {
    pub induced: bool,
    pub upperbound: f64,
    /// Cost of leaving a pattern element unmatched. With the default of 1
    /// and zero substitution costs the objective counts unmatched pattern
    /// elements. Non-default substitution costs implicitly discount this
    /// creation credit; the coupling is intentional and kept as is.
    pub creation_cost: f64,
}

impl Default for ExtensionOptions {
    fn default() -> Self {
        Self {
            induced: false,
            upperbound: 1.0,
            creation_cost: 1.0,
        }
    }
}

/// Minimum-cost subgraph matching, a.k.a. minimal extension: pattern
/// elements may stay unmatched at their creation cost, and the optimum is
/// the cheapest way to extend the target until the pattern embeds.
///
/// The objective starts from the constant "create everything" and credits
/// each match with its creation cost minus its substitution cost, so a
/// zero optimum certifies that the pattern already is a subgraph.
pub struct MinimalExtension {
    lp: LinearProgram,
    vertex_creation: Vec<f64>,
    edge_creation: Vec<f64>,
}

impl MinimalExtension {
    pub fn build(problem: &Problem, options: &ExtensionOptions) -> Result<Self> {
        let mut skeleton = MatchingSkeleton::new(problem, false)?;
        skeleton.restrict(options.upperbound)?;

        skeleton.vertex_cover(Relation::LessEq);
        skeleton.target_vertex_cap();
        skeleton.edge_cover(Relation::LessEq);
        skeleton.edge_consistency();
        if options.induced {
            skeleton.induced();
        }

        let (n_vp, _, n_ep, _) = skeleton.dims();
        let vertex_creation = vec![options.creation_cost; n_vp];
        let edge_creation = vec![options.creation_cost; n_ep];
        let constant: f64 =
            vertex_creation.iter().sum::<f64>() + edge_creation.iter().sum::<f64>();

        skeleton.set_objective_from(
            constant,
            |i, _, cost| cost - vertex_creation[i],
            |ij, _, cost| cost - edge_creation[ij],
            CoeffFilter::NonZero,
        );

        debug!(
            "minimal extension program: {} variables, {} constraints, constant {constant}",
            skeleton.lp().variable_count(),
            skeleton.lp().constraint_count()
        );
        Ok(Self {
            lp: skeleton.into_lp(),
            vertex_creation,
            edge_creation,
        })
    }

    pub fn vertex_creation_cost(&self, i: usize) -> f64 {
        self.vertex_creation.get(i).copied().unwrap_or(0.0)
    }

    pub fn edge_creation_cost(&self, ij: usize) -> f64 {
        self.edge_creation.get(ij).copied().unwrap_or(0.0)
    }

    pub fn lp(&self) -> &LinearProgram {
        &self.lp
    }

    pub fn into_lp(self) -> LinearProgram {
        self.lp
    }
}
