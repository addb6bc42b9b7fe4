use std::fmt::Write as _;

use crate::problem::Problem;
use crate::solution::Matching;

/// Extra context lines shown alongside a rendered matching.
#[derive(Debug, Clone, Default)]
pub struct ReportContext {
    /// Printed as `Mode: <label>` when present.
    pub mode: Option<String>,
    /// Printed as `Upperbound: <v>` when pruning was active.
    pub upperbound: Option<f64>,
    /// Report the pattern-side unmatched count as an approximate minimal
    /// extension (the inflated-deletion GED mode).
    pub approx_extension: bool,
}

/// Renders a subgraph-mode (minimal extension / STSM) result, one key per
/// line.
pub fn render_subgraph(problem: &Problem, matching: &Matching, context: &ReportContext) -> String {
    let mut out = String::new();

    let extension = matching.minimal_extension();
    let _ = writeln!(out, "GED: {}", format_extension(extension));
    let _ = writeln!(out, "Is Subgraph: {}", yes_no(matching.is_subgraph()));
    let _ = writeln!(out, "Minimal Extension: {}", format_extension(extension));
    let _ = writeln!(
        out,
        "Vertices to add: {}",
        matching.unmatched_pattern_vertices.len()
    );
    let _ = writeln!(
        out,
        "Edges to add: {}",
        matching.unmatched_pattern_edges.len()
    );
    let _ = writeln!(
        out,
        "Unmatched pattern vertices:{}",
        format_indices(&matching.unmatched_pattern_vertices)
    );
    let _ = writeln!(
        out,
        "Unmatched pattern edges:{}",
        format_edge_pairs(&matching.unmatched_pattern_edge_pairs(problem))
    );

    append_context(&mut out, context);
    out
}

/// Renders an edit-distance result, including the target-side unmatched
/// sets the symmetric formulation produces.
pub fn render_edit_distance(
    problem: &Problem,
    matching: &Matching,
    relaxed: bool,
    context: &ReportContext,
) -> String {
    let mut out = String::new();

    if relaxed {
        let _ = writeln!(
            out,
            "GED lower bound (F2LP): {}",
            format_objective(matching.objective)
        );
    } else {
        let _ = writeln!(
            out,
            "GED: {}",
            format_extension(matching.minimal_extension())
        );
    }
    let _ = writeln!(out, "Is Isomorphic: {}", yes_no(matching.is_isomorphic()));
    let _ = writeln!(
        out,
        "Unmatched pattern vertices:{}",
        format_indices(&matching.unmatched_pattern_vertices)
    );
    let _ = writeln!(
        out,
        "Unmatched target vertices:{}",
        format_indices(&matching.unmatched_target_vertices)
    );
    let _ = writeln!(
        out,
        "Unmatched pattern edges:{}",
        format_edge_pairs(&matching.unmatched_pattern_edge_pairs(problem))
    );
    let _ = writeln!(
        out,
        "Unmatched target edges:{}",
        format_edge_pairs(&matching.unmatched_target_edge_pairs(problem))
    );
    if context.approx_extension {
        let _ = writeln!(
            out,
            "Approx minimal extension (pattern side, count): {}",
            matching.unmatched_pattern_vertices.len() + matching.unmatched_pattern_edges.len()
        );
    }

    append_context(&mut out, context);
    out
}

fn append_context(out: &mut String, context: &ReportContext) {
    if let Some(mode) = &context.mode {
        let _ = writeln!(out, "Mode: {mode}");
    }
    if let Some(upperbound) = context.upperbound {
        let _ = writeln!(out, "Upperbound: {upperbound}");
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn format_extension(extension: Option<i64>) -> String {
    match extension {
        Some(value) => value.to_string(),
        None => "inf".to_string(),
    }
}

fn format_objective(objective: f64) -> String {
    if objective.is_finite() {
        format!("{objective}")
    } else {
        "inf".to_string()
    }
}

fn format_indices(indices: &[usize]) -> String {
    if indices.is_empty() {
        return " none".to_string();
    }
    let mut out = String::new();
    for index in indices {
        let _ = write!(out, " {index}");
    }
    out
}

fn format_edge_pairs(pairs: &[(usize, usize)]) -> String {
    if pairs.is_empty() {
        return " none".to_string();
    }
    let mut out = String::new();
    for (origin, target) in pairs {
        let _ = write!(out, " ({origin},{target})");
    }
    out
}
