use std::sync::Arc;

use anyhow::Result;

use ipgm::report::{render_edit_distance, render_subgraph, ReportContext, SolutionWriter};
use ipgm::{
    AdjacencyParser, EditDistance, EditDistanceOptions, ExtensionOptions, GreedySolver, Matching,
    MatrixMode, MinimalExtension, MipSolver, Problem, ProblemKind, SolveOptions,
    SubstitutionMatching, SubstitutionOptions,
};

const PATH_VS_TRIANGLE: &str = "\
4
0 1 0 0
1 0 1 0
0 1 0 1
0 0 1 0

3
0 1 1
1 0 1
1 1 0
";

const TRIANGLE_IN_K4: &str = "\
3
0 1 1
1 0 1
1 1 0

4
0 1 1 1
1 0 1 1
1 1 0 1
1 1 1 0
";

fn problem_from(text: &str, kind: ProblemKind) -> Result<Problem> {
    let (pattern, target) = AdjacencyParser::parse_pair(text, MatrixMode::Simple)?;
    Problem::new(kind, Arc::new(pattern), Arc::new(target))
}

#[test]
fn greedy_objective_bounds_the_extension_optimum() -> Result<()> {
    let problem = problem_from(PATH_VS_TRIANGLE, ProblemKind::Subgraph)?;

    let greedy = GreedySolver::solve(&problem);
    assert!(greedy.is_solved());

    let formulation = MinimalExtension::build(&problem, &ExtensionOptions::default())?;
    let optimal = MipSolver::solve_mip(formulation.lp(), &SolveOptions::default())?;

    assert!(
        greedy.objective >= optimal.objective - 1e-6,
        "greedy {} cannot beat the optimum {}",
        greedy.objective,
        optimal.objective
    );
    Ok(())
}

#[test]
fn greedy_finds_the_embedding_when_one_exists() -> Result<()> {
    let problem = problem_from(TRIANGLE_IN_K4, ProblemKind::Subgraph)?;
    let outcome = GreedySolver::solve(&problem);
    let matching = Matching::interpret(&problem, &outcome);
    assert_eq!(matching.minimal_extension(), Some(0));
    assert!(matching.is_subgraph());
    Ok(())
}

#[test]
fn substitution_matching_agrees_with_exact_on_embeddable_patterns() -> Result<()> {
    let problem = problem_from(TRIANGLE_IN_K4, ProblemKind::Subgraph)?;
    let formulation = SubstitutionMatching::build(&problem, &SubstitutionOptions::default())?;
    let outcome = MipSolver::solve_mip(formulation.lp(), &SolveOptions::default())?;
    assert!(outcome.is_solved());
    assert!(outcome.objective.abs() < 1e-6);
    Ok(())
}

#[test]
fn substitution_matching_is_total_and_cost_guided() -> Result<()> {
    // A single edge maps into K4 somewhere; costs make one target vertex
    // poisonous, so the optimum routes around it while still matching
    // every pattern element.
    let text = "\
2
0 1
1 0

4
0 1 1 1
1 0 1 1
1 1 0 1
1 1 1 0
";
    let (pattern, target) = AdjacencyParser::parse_pair(text, MatrixMode::Simple)?;
    let mut problem = Problem::new(ProblemKind::Subgraph, Arc::new(pattern), Arc::new(target))?;
    for i in 0..2 {
        problem.set_cost(true, i, 0, 10.0)?;
    }

    let formulation = SubstitutionMatching::build(&problem, &SubstitutionOptions::default())?;
    let outcome = MipSolver::solve_mip(formulation.lp(), &SolveOptions::default())?;
    let matching = Matching::interpret(&problem, &outcome);

    assert!(outcome.objective.abs() < 1e-6, "zero-cost embedding exists");
    assert!(matching.vertex_mapping.iter().all(Option::is_some));
    assert!(matching.edge_mapping.iter().all(Option::is_some));
    assert!(
        matching.vertex_mapping.iter().flatten().all(|&k| k != 0),
        "the expensive target vertex is avoided"
    );
    Ok(())
}

#[test]
fn edge_cost_pruning_keeps_the_cheap_candidates() -> Result<()> {
    // With all costs zero every candidate sits at the threshold, so even
    // an aggressive ratio with the edge-row pass keeps the embedding.
    let problem = problem_from(TRIANGLE_IN_K4, ProblemKind::Subgraph)?;
    let formulation = SubstitutionMatching::build(
        &problem,
        &SubstitutionOptions {
            upperbound: 0.5,
            prune_edge_costs: true,
            ..SubstitutionOptions::default()
        },
    )?;
    let outcome = MipSolver::solve_mip(formulation.lp(), &SolveOptions::default())?;
    assert!(outcome.is_solved());
    assert!(outcome.objective.abs() < 1e-6);
    Ok(())
}

#[test]
fn subgraph_report_lists_every_key() -> Result<()> {
    let problem = problem_from(PATH_VS_TRIANGLE, ProblemKind::Subgraph)?;
    let formulation = MinimalExtension::build(&problem, &ExtensionOptions::default())?;
    let outcome = MipSolver::solve_mip(formulation.lp(), &SolveOptions::default())?;
    let matching = Matching::interpret(&problem, &outcome);

    let report = render_subgraph(&problem, &matching, &ReportContext::default());
    assert!(report.contains("GED: 2"));
    assert!(report.contains("Is Subgraph: no"));
    assert!(report.contains("Minimal Extension: 2"));
    assert!(report.contains("Vertices to add: 1"));
    assert!(report.contains("Edges to add: 1"));
    assert!(report.contains("Unmatched pattern vertices:"));
    // Either end edge of the path may be the unmatched one.
    assert!(
        report.contains("Unmatched pattern edges: (0,1)")
            || report.contains("Unmatched pattern edges: (2,3)"),
        "got: {report}"
    );
    Ok(())
}

#[test]
fn edit_distance_report_shows_target_side() -> Result<()> {
    let text = "\
3
0 1 1
1 0 1
1 1 0

4
0 1 1 0
1 0 1 0
1 1 0 0
0 0 0 0
";
    let problem = problem_from(text, ProblemKind::EditDistance)?;
    let formulation = EditDistance::build(&problem, &EditDistanceOptions::default())?;
    let outcome = MipSolver::solve_mip(formulation.lp(), &SolveOptions::default())?;
    let matching = Matching::interpret(&problem, &outcome);

    let report = render_edit_distance(&problem, &matching, false, &ReportContext::default());
    assert!(report.contains("GED: 1"));
    assert!(report.contains("Is Isomorphic: no"));
    assert!(report.contains("Unmatched pattern vertices: none"));
    assert!(report.contains("Unmatched target vertices: 3"));
    Ok(())
}

#[test]
fn report_context_lines_are_optional() -> Result<()> {
    let problem = problem_from(TRIANGLE_IN_K4, ProblemKind::Subgraph)?;
    let formulation = MinimalExtension::build(&problem, &ExtensionOptions::default())?;
    let outcome = MipSolver::solve_mip(formulation.lp(), &SolveOptions::default())?;
    let matching = Matching::interpret(&problem, &outcome);

    let bare = render_subgraph(&problem, &matching, &ReportContext::default());
    assert!(!bare.contains("Mode:"));
    assert!(!bare.contains("Upperbound:"));

    let context = ReportContext {
        mode: Some("stsm".to_string()),
        upperbound: Some(0.5),
        ..ReportContext::default()
    };
    let annotated = render_subgraph(&problem, &matching, &context);
    assert!(annotated.contains("Mode: stsm"));
    assert!(annotated.contains("Upperbound: 0.5"));
    Ok(())
}

#[test]
fn solution_xml_records_substitutions_and_insertions() -> Result<()> {
    let problem = problem_from(PATH_VS_TRIANGLE, ProblemKind::Subgraph)?;
    let formulation = MinimalExtension::build(&problem, &ExtensionOptions::default())?;
    let outcome = MipSolver::solve_mip(formulation.lp(), &SolveOptions::default())?;
    let matching = Matching::interpret(&problem, &outcome);

    let xml = SolutionWriter::to_xml(&problem, &matching);
    assert!(xml.contains(r#"<objective status="optimal""#));
    assert_eq!(xml.matches("<substitution cost=").count(), 5, "3 nodes + 2 edges");
    assert_eq!(xml.matches("<insertion cost=").count(), 2, "1 node + 1 edge");
    assert!(!xml.contains("<deletion"), "subgraph mode never deletes");
    assert!(xml.trim_end().ends_with("</solution>"));
    Ok(())
}

#[test]
fn infeasible_solution_xml_reports_inf() -> Result<()> {
    let text = "\
2
0 1
1 0

1
0
";
    let problem = problem_from(text, ProblemKind::Subgraph)?;
    let formulation = ipgm::SubgraphIsomorphism::build(
        &problem,
        &ipgm::SubgraphOptions::default(),
    )?;
    let outcome = MipSolver::solve_mip(formulation.lp(), &SolveOptions::default())?;
    let matching = Matching::interpret(&problem, &outcome);

    let xml = SolutionWriter::to_xml(&problem, &matching);
    assert!(xml.contains(r#"<objective status="infeasible" value="inf"/>"#));
    Ok(())
}
