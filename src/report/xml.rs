use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::problem::{Problem, ProblemKind};
use crate::solution::Matching;

/// Serialises a matching as the `<solution>` XML document: the objective,
/// then per-node and per-edge substitution/insertion records, with
/// target-side deletions for edit-distance problems.
pub struct SolutionWriter;

impl SolutionWriter {
    pub fn write_to_path(path: &Path, problem: &Problem, matching: &Matching) -> Result<()> {
        fs::write(path, Self::to_xml(problem, matching))
            .with_context(|| format!("write solution file {:?}", path))
    }

    pub fn to_xml(problem: &Problem, matching: &Matching) -> String {
        let with_deletions = problem.kind() == ProblemKind::EditDistance;
        let mut out = String::new();
        let _ = writeln!(out, r#"<?xml version="1.0"?>"#);
        let _ = writeln!(out, "<solution>");

        let (status, value) = if matching.objective.is_finite() {
            ("optimal", format!("{}", matching.objective))
        } else {
            ("infeasible", "inf".to_string())
        };
        let _ = writeln!(
            out,
            r#"  <objective status="{status}" value="{value}"/>"#
        );

        let _ = writeln!(out, "  <nodes>");
        for (i, mapped) in matching.vertex_mapping.iter().enumerate() {
            if let Some(k) = mapped {
                let cost = safe_cost(problem.cost(true, i, *k));
                let _ = writeln!(out, r#"    <substitution cost="{cost}">"#);
                let _ = writeln!(out, r#"      <node type="query" index="{i}"/>"#);
                let _ = writeln!(out, r#"      <node type="target" index="{k}"/>"#);
                let _ = writeln!(out, "    </substitution>");
            }
        }
        for i in &matching.unmatched_pattern_vertices {
            let _ = writeln!(out, r#"    <insertion cost="1">"#);
            let _ = writeln!(out, r#"      <node type="query" index="{i}"/>"#);
            let _ = writeln!(out, "    </insertion>");
        }
        if with_deletions {
            for k in &matching.unmatched_target_vertices {
                let _ = writeln!(out, r#"    <deletion cost="1">"#);
                let _ = writeln!(out, r#"      <node type="target" index="{k}"/>"#);
                let _ = writeln!(out, "    </deletion>");
            }
        }
        let _ = writeln!(out, "  </nodes>");

        let _ = writeln!(out, "  <edges>");
        for (ij, mapped) in matching.edge_mapping.iter().enumerate() {
            let Some(kl) = mapped else {
                continue;
            };
            let (Some((qi, qj)), Some((tk, tl))) = (
                problem.pattern().endpoints(ij),
                problem.target().endpoints(*kl),
            ) else {
                continue;
            };
            let cost = safe_cost(problem.cost(false, ij, *kl));
            let _ = writeln!(out, r#"    <substitution cost="{cost}">"#);
            let _ = writeln!(out, r#"      <edge type="query" from="{qi}" to="{qj}"/>"#);
            let _ = writeln!(out, r#"      <edge type="target" from="{tk}" to="{tl}"/>"#);
            let _ = writeln!(out, "    </substitution>");
        }
        for ij in &matching.unmatched_pattern_edges {
            let Some((qi, qj)) = problem.pattern().endpoints(*ij) else {
                continue;
            };
            let _ = writeln!(out, r#"    <insertion cost="1">"#);
            let _ = writeln!(out, r#"      <edge type="query" from="{qi}" to="{qj}"/>"#);
            let _ = writeln!(out, "    </insertion>");
        }
        if with_deletions {
            for kl in &matching.unmatched_target_edges {
                let Some((tk, tl)) = problem.target().endpoints(*kl) else {
                    continue;
                };
                let _ = writeln!(out, r#"    <deletion cost="1">"#);
                let _ = writeln!(out, r#"      <edge type="target" from="{tk}" to="{tl}"/>"#);
                let _ = writeln!(out, "    </deletion>");
            }
        }
        let _ = writeln!(out, "  </edges>");
        let _ = writeln!(out, "</solution>");
        out
    }
}

fn safe_cost(cost: f64) -> f64 {
    if cost.is_finite() {
        cost
    } else {
        0.0
    }
}
