use std::time::Duration;

use anyhow::Result;

use ipgm::linprog::{Constraint, LinearExpr, LinearProgram, Relation, Sense, VarKind, Variable};
use ipgm::{MipSolver, SolveOptions, SolveStatus};

fn knapsack_program() -> LinearProgram {
    // max 3a + 2b + 2c subject to 2a + b + 2c <= 3
    let mut lp = LinearProgram::new(Sense::Maximize);
    let a = lp.add_variable(Variable::new("a", VarKind::Binary));
    let b = lp.add_variable(Variable::new("b", VarKind::Binary));
    let c = lp.add_variable(Variable::new("c", VarKind::Binary));

    let mut weight = LinearExpr::new();
    weight.add_term(a, 2.0);
    weight.add_term(b, 1.0);
    weight.add_term(c, 2.0);
    lp.add_constraint(Constraint::new("capacity", weight, Relation::LessEq, 3.0));

    let mut objective = LinearExpr::new();
    objective.add_term(a, 3.0);
    objective.add_term(b, 2.0);
    objective.add_term(c, 2.0);
    lp.set_objective(objective);
    lp
}

#[test]
fn refuses_an_uninitialised_program() {
    let lp = LinearProgram::new(Sense::Minimize);
    let err = MipSolver::solve_mip(&lp, &SolveOptions::default()).unwrap_err();
    assert!(format!("{err:#}").contains("uninitialised"));
}

#[test]
fn solves_a_small_knapsack_to_optimality() -> Result<()> {
    let lp = knapsack_program();
    let outcome = MipSolver::solve_mip(&lp, &SolveOptions::default())?;
    assert_eq!(outcome.status, SolveStatus::Optimal);
    assert!((outcome.objective - 5.0).abs() < 1e-6, "a + b is optimal");
    assert!(*outcome.values.get("a").unwrap() > 0.5);
    assert!(*outcome.values.get("b").unwrap() > 0.5);
    assert!(*outcome.values.get("c").unwrap() < 0.5);
    Ok(())
}

#[test]
fn infeasible_reports_infinity_and_no_values() -> Result<()> {
    let mut lp = LinearProgram::new(Sense::Minimize);
    let x = lp.add_variable(Variable::new("x", VarKind::Binary));
    let mut expr = LinearExpr::new();
    expr.add_term(x, 1.0);
    lp.add_constraint(Constraint::new("impossible", expr, Relation::GreaterEq, 2.0));

    let outcome = MipSolver::solve_mip(&lp, &SolveOptions::default())?;
    assert_eq!(outcome.status, SolveStatus::Infeasible);
    assert_eq!(outcome.objective, f64::INFINITY);
    assert!(outcome.values.is_empty());
    Ok(())
}

#[test]
fn unbounded_maximisation_reports_negative_infinity() -> Result<()> {
    let mut lp = LinearProgram::new(Sense::Maximize);
    let x = lp.add_variable(Variable::with_bounds(
        "x",
        VarKind::Continuous,
        0.0,
        f64::INFINITY,
    ));
    let mut objective = LinearExpr::new();
    objective.add_term(x, 1.0);
    lp.set_objective(objective);

    let outcome = MipSolver::solve_lp(&lp)?;
    assert_eq!(outcome.status, SolveStatus::Unbounded);
    assert_eq!(outcome.objective, f64::NEG_INFINITY);
    assert!(outcome.values.is_empty());
    Ok(())
}

#[test]
fn constraint_constants_fold_into_the_right_hand_side() -> Result<()> {
    // (x + 1) <= 1 pins x to zero even though maximising it.
    let mut lp = LinearProgram::new(Sense::Maximize);
    let x = lp.add_variable(Variable::new("x", VarKind::Binary));
    let mut expr = LinearExpr::new();
    expr.add_term(x, 1.0);
    expr.set_constant(1.0);
    lp.add_constraint(Constraint::new("shifted", expr, Relation::LessEq, 1.0));

    let mut objective = LinearExpr::new();
    objective.add_term(x, 1.0);
    lp.set_objective(objective);

    let outcome = MipSolver::solve_mip(&lp, &SolveOptions::default())?;
    assert_eq!(outcome.status, SolveStatus::Optimal);
    assert!(*outcome.values.get("x").unwrap() < 0.5);
    Ok(())
}

#[test]
fn objective_constant_is_added_to_the_engine_optimum() -> Result<()> {
    let mut lp = LinearProgram::new(Sense::Minimize);
    let x = lp.add_variable(Variable::new("x", VarKind::Binary));
    let mut objective = LinearExpr::new();
    objective.add_term(x, 2.0);
    objective.set_constant(7.0);
    lp.set_objective(objective);

    let outcome = MipSolver::solve_mip(&lp, &SolveOptions::default())?;
    assert!((outcome.objective - 7.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn deactivated_variables_stay_at_zero() -> Result<()> {
    let mut lp = LinearProgram::new(Sense::Maximize);
    let x = lp.add_variable(Variable::new("x", VarKind::Binary));
    lp.variable_mut(x).deactivate();
    let mut objective = LinearExpr::new();
    objective.add_term(x, 1.0);
    lp.set_objective(objective);

    let outcome = MipSolver::solve_mip(&lp, &SolveOptions::default())?;
    assert_eq!(outcome.status, SolveStatus::Optimal);
    assert!(outcome.objective.abs() < 1e-6);
    assert!(*outcome.values.get("x").unwrap() < 0.5);
    Ok(())
}

#[test]
fn first_feasible_stops_with_a_feasible_incumbent() -> Result<()> {
    let lp = knapsack_program();
    let outcome = MipSolver::solve_mip(
        &lp,
        &SolveOptions {
            first_feasible: true,
            ..SolveOptions::default()
        },
    )?;
    assert!(outcome.is_solved());
    assert!(outcome.objective.is_finite());
    assert!(
        outcome.objective <= 5.0 + 1e-6,
        "a feasible incumbent cannot beat the optimum"
    );

    // The incumbent satisfies the capacity constraint.
    let weight = 2.0 * outcome.values.get("a").unwrap()
        + outcome.values.get("b").unwrap()
        + 2.0 * outcome.values.get("c").unwrap();
    assert!(weight <= 3.0 + 1e-6);
    Ok(())
}

#[test]
fn time_limited_search_still_succeeds_on_tiny_programs() -> Result<()> {
    let lp = knapsack_program();
    let outcome = MipSolver::solve_mip(
        &lp,
        &SolveOptions {
            time_limit: Some(Duration::from_secs(5)),
            ..SolveOptions::default()
        },
    )?;
    assert!(outcome.is_solved());
    assert!((outcome.objective - 5.0).abs() < 1e-6);
    Ok(())
}
