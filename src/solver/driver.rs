use std::time::{Duration, Instant};

use anyhow::{bail, ensure, Result};
use indexmap::IndexMap;
use log::{debug, trace};
use microlp::{ComparisonOp, Error as EngineError, OptimizationDirection, Solution};

use crate::linprog::{LinearProgram, Relation, Sense, VarKind};

/// Integrality tolerance when rounding relaxation values.
const INTEGRALITY_EPS: f64 = 1e-6;
/// Default relative MIP gap; anything at or below this means "prove
/// optimality".
const DEFAULT_MIP_GAP: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Suboptimal,
    Infeasible,
    Unbounded,
    NotSolved,
}

#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub verbose: bool,
    pub time_limit: Option<Duration>,
    /// Stop at the first integer-feasible incumbent instead of proving
    /// optimality.
    pub first_feasible: bool,
    /// Relative optimality gap at which the search may stop.
    pub mip_gap: f64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            time_limit: None,
            first_feasible: false,
            mip_gap: DEFAULT_MIP_GAP,
        }
    }
}

/// Result of a solve: a status, the objective (±∞ when no solution
/// exists), and the value of every variable keyed by its id. Infeasible
/// and unbounded outcomes are answers, not errors, and carry an empty
/// value map.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub objective: f64,
    pub values: IndexMap<String, f64>,
}

impl SolveOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self.status, SolveStatus::Optimal | SolveStatus::Suboptimal)
    }

    fn unsolved(status: SolveStatus, sense: Sense) -> Self {
        let objective = match sense {
            Sense::Minimize => f64::INFINITY,
            Sense::Maximize => f64::NEG_INFINITY,
        };
        Self {
            status,
            objective,
            values: IndexMap::new(),
        }
    }
}

/// An engine model together with the column handle of every IR variable,
/// in arena order.
struct LoadedModel {
    model: microlp::Problem,
    columns: Vec<microlp::Variable>,
}

/// Drives a mixed-integer engine over a [`LinearProgram`].
///
/// The engine sees one column per IR variable (bounds taken verbatim, so
/// deactivated variables arrive pinned to zero) and one row per
/// constraint with the expression's intrinsic constant folded into the
/// right-hand side. The objective constant never enters the engine; it is
/// added back onto the reported optimum.
pub struct MipSolver;

impl MipSolver {
    /// Solves the program with integrality enforced on binary and bounded
    /// variables. Plain solves go straight to the engine's own
    /// branch-and-bound; first-feasible mode, a time limit or a loosened
    /// gap switch to the driver's cooperative search.
    pub fn solve_mip(lp: &LinearProgram, options: &SolveOptions) -> Result<SolveOutcome> {
        let needs_control = options.first_feasible
            || options.time_limit.is_some()
            || options.mip_gap > DEFAULT_MIP_GAP;
        if needs_control {
            return branch_and_bound(lp, options);
        }

        let loaded = load(lp, true)?;
        let outcome = match loaded.model.solve() {
            Ok(solution) => finished(lp, &loaded.columns, &solution, SolveStatus::Optimal),
            Err(EngineError::Infeasible) => {
                SolveOutcome::unsolved(SolveStatus::Infeasible, lp.sense())
            }
            Err(EngineError::Unbounded) => {
                SolveOutcome::unsolved(SolveStatus::Unbounded, lp.sense())
            }
            Err(EngineError::InternalError(message)) => {
                bail!("mixed-integer engine failed: {message}")
            }
        };
        if options.verbose {
            debug!(
                "mip solve: status {:?}, objective {}",
                outcome.status, outcome.objective
            );
        }
        Ok(outcome)
    }

    /// Solves the continuous relaxation: every column is loaded as a real
    /// variable regardless of its declared kind.
    pub fn solve_lp(lp: &LinearProgram) -> Result<SolveOutcome> {
        let loaded = load(lp, false)?;
        match loaded.model.solve() {
            Ok(solution) => Ok(finished(
                lp,
                &loaded.columns,
                &solution,
                SolveStatus::Optimal,
            )),
            Err(EngineError::Infeasible) => Ok(SolveOutcome::unsolved(
                SolveStatus::Infeasible,
                lp.sense(),
            )),
            Err(EngineError::Unbounded) => Ok(SolveOutcome::unsolved(
                SolveStatus::Unbounded,
                lp.sense(),
            )),
            Err(EngineError::InternalError(message)) => {
                bail!("linear engine failed: {message}")
            }
        }
    }
}

/// Builds the engine model. `integral` selects integer columns for
/// Binary/Bounded variables; the relaxation loads everything as real.
fn load(lp: &LinearProgram, integral: bool) -> Result<LoadedModel> {
    ensure!(
        !lp.is_empty(),
        "cannot solve an uninitialised linear program (no variables)"
    );

    let direction = match lp.sense() {
        Sense::Minimize => OptimizationDirection::Minimize,
        Sense::Maximize => OptimizationDirection::Maximize,
    };
    let mut model = microlp::Problem::new(direction);
    let objective = lp.objective();

    let mut columns = Vec::with_capacity(lp.variable_count());
    for (var_id, variable) in lp.variables() {
        let coeff = objective.coefficient(var_id);
        let column = match variable.kind() {
            VarKind::Binary | VarKind::Bounded if integral => model.add_integer_var(
                coeff,
                (variable.lower() as i32, variable.upper() as i32),
            ),
            _ => model.add_var(coeff, (variable.lower(), variable.upper())),
        };
        columns.push(column);
    }

    for constraint in lp.constraints() {
        let expr = constraint.expr();
        let terms: Vec<(microlp::Variable, f64)> = expr
            .terms()
            .map(|(var_id, coeff)| (columns[var_id.index()], coeff))
            .collect();
        let rhs = constraint.rhs() - expr.constant();
        let op = match constraint.relation() {
            Relation::LessEq => ComparisonOp::Le,
            Relation::GreaterEq => ComparisonOp::Ge,
            Relation::Eq => ComparisonOp::Eq,
        };
        model.add_constraint(terms, op, rhs);
    }

    trace!(
        "loaded engine model: {} columns, {} rows",
        lp.variable_count(),
        lp.constraint_count()
    );
    Ok(LoadedModel { model, columns })
}

/// Extracts objective and value map from a finished engine solution.
fn finished(
    lp: &LinearProgram,
    columns: &[microlp::Variable],
    solution: &Solution,
    status: SolveStatus,
) -> SolveOutcome {
    let mut values = IndexMap::with_capacity(lp.variable_count());
    for (var_id, variable) in lp.variables() {
        values.insert(
            variable.id().to_string(),
            *solution.var_value(columns[var_id.index()]),
        );
    }
    SolveOutcome {
        status,
        objective: solution.objective() + lp.objective().constant(),
        values,
    }
}

/// Depth-first branch-and-bound over the engine's continuous relaxation.
///
/// Branching fixes the most fractional integer column to its floor or
/// ceiling. Termination is cooperative: the first integral incumbent
/// (first-feasible mode), the deadline, or the incumbent-vs-open-bound
/// gap. Stopping with an incumbent in hand is a successful, merely
/// suboptimal, outcome.
fn branch_and_bound(lp: &LinearProgram, options: &SolveOptions) -> Result<SolveOutcome> {
    let deadline = options.time_limit.map(|limit| Instant::now() + limit);
    let minimize = lp.sense() == Sense::Minimize;

    let loaded = load(lp, false)?;
    let integral_columns: Vec<microlp::Variable> = lp
        .variables()
        .filter(|(_, variable)| matches!(variable.kind(), VarKind::Binary | VarKind::Bounded))
        .map(|(var_id, _)| loaded.columns[var_id.index()])
        .collect();

    let root = match loaded.model.solve() {
        Ok(solution) => solution,
        Err(EngineError::Infeasible) => {
            return Ok(SolveOutcome::unsolved(SolveStatus::Infeasible, lp.sense()))
        }
        Err(EngineError::Unbounded) => {
            return Ok(SolveOutcome::unsolved(SolveStatus::Unbounded, lp.sense()))
        }
        Err(EngineError::InternalError(message)) => bail!("relaxation solve failed: {message}"),
    };

    let mut stack = vec![root];
    let mut incumbent: Option<Solution> = None;
    let mut stopped_early = false;
    let mut nodes = 0usize;

    while let Some(node) = stack.pop() {
        nodes += 1;
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                stopped_early = true;
                break;
            }
        }

        let bound = node.objective();
        if let Some(best) = &incumbent {
            if !improves(bound, best.objective(), minimize) {
                continue;
            }
        }

        match most_fractional(&node, &integral_columns) {
            None => {
                // Integral relaxation: a new incumbent (the bound check
                // above already established it improves).
                incumbent = Some(node);
                if options.first_feasible {
                    stopped_early = true;
                    break;
                }
                let best = incumbent.as_ref().map(Solution::objective);
                if gap_closed(best, open_bound(&stack, minimize), options.mip_gap) {
                    stopped_early = !stack.is_empty();
                    break;
                }
            }
            Some((column, value)) => {
                // Floor branch lands on top of the stack, explored first.
                for target in [value.ceil(), value.floor()] {
                    match node.clone().fix_var(column, target) {
                        Ok(child) => stack.push(child),
                        Err(EngineError::Infeasible) | Err(EngineError::Unbounded) => {}
                        Err(EngineError::InternalError(message)) => {
                            bail!("branching solve failed: {message}")
                        }
                    }
                }
            }
        }
    }

    debug!(
        "branch and bound: {nodes} nodes, incumbent {}, stopped early {stopped_early}",
        incumbent.is_some()
    );

    match incumbent {
        Some(best) => {
            let status = if stopped_early {
                SolveStatus::Suboptimal
            } else {
                SolveStatus::Optimal
            };
            Ok(finished(lp, &loaded.columns, &best, status))
        }
        None if stopped_early => Ok(SolveOutcome::unsolved(SolveStatus::NotSolved, lp.sense())),
        None => Ok(SolveOutcome::unsolved(SolveStatus::Infeasible, lp.sense())),
    }
}

fn improves(candidate: f64, best: f64, minimize: bool) -> bool {
    if minimize {
        candidate < best - INTEGRALITY_EPS
    } else {
        candidate > best + INTEGRALITY_EPS
    }
}

/// The integer column whose relaxation value sits farthest from an
/// integer, if any.
fn most_fractional(
    solution: &Solution,
    integral_columns: &[microlp::Variable],
) -> Option<(microlp::Variable, f64)> {
    let mut best: Option<(microlp::Variable, f64, f64)> = None;
    for &column in integral_columns {
        let value = *solution.var_value(column);
        let distance = (value - value.round()).abs();
        if distance <= INTEGRALITY_EPS {
            continue;
        }
        if best.map_or(true, |(_, _, best_distance)| distance > best_distance) {
            best = Some((column, value, distance));
        }
    }
    best.map(|(column, value, _)| (column, value))
}

/// Best objective still reachable through the open nodes.
fn open_bound(stack: &[Solution], minimize: bool) -> Option<f64> {
    let objectives = stack.iter().map(Solution::objective);
    if minimize {
        objectives.min_by(f64::total_cmp)
    } else {
        objectives.max_by(f64::total_cmp)
    }
}

fn gap_closed(best: Option<f64>, open_bound: Option<f64>, mip_gap: f64) -> bool {
    let (Some(best), Some(bound)) = (best, open_bound) else {
        // No open nodes left: the incumbent is exact.
        return open_bound.is_none();
    };
    let gap = (best - bound).abs() / best.abs().max(1.0);
    gap <= mip_gap
}
