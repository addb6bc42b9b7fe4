use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::Parser;
use log::info;

use ipgm::report::{render_edit_distance, render_subgraph, ReportContext, SolutionWriter};
use ipgm::{
    AdjacencyParser, EditDistance, EditDistanceOptions, ExtensionOptions, GreedySolver, Matching,
    MatrixMode, MinimalExtension, MipSolver, Problem, ProblemKind, SolveOptions,
    SubstitutionMatching, SubstitutionOptions,
};

/// Subgraph matching and graph edit distance through integer programming.
///
/// The input file holds two graphs back to back, each as a vertex count
/// line followed by its adjacency matrix. The default mode computes the
/// minimal extension of the target that embeds the pattern.
#[derive(Debug, Parser)]
#[command(name = "ipgm", version)]
struct Cli {
    /// Input file with pattern and target adjacency matrices.
    input: PathBuf,

    /// Report wall time in milliseconds.
    #[arg(short = 't', long = "time")]
    time: bool,

    /// Compute graph edit distance (penalises both sides).
    #[arg(short = 'g', long = "ged")]
    ged: bool,

    /// Solve the continuous relaxation: an LP lower bound on GED.
    #[arg(long = "f2lp", alias = "lp")]
    f2lp: bool,

    /// Approximate the minimal extension with a relaxed GED whose
    /// deletion costs are inflated.
    #[arg(long = "minext-approx", alias = "approx-minext")]
    minext_approx: bool,

    /// Fast mode: greedy heuristic, or first-feasible MIP for GED.
    #[arg(short = 'f', long = "fast")]
    fast: bool,

    /// Pruning ratio in (0, 1]: keep only the cheapest substitutions.
    #[arg(short = 'u', long = "upperbound")]
    upperbound: Option<f64>,

    /// Disable pruning entirely.
    #[arg(short = 'e', long = "exact", conflicts_with = "approx_stsm")]
    exact: bool,

    /// Substitution-tolerant matching instead of minimal extension.
    #[arg(long = "approx-stsm", alias = "stsm")]
    approx_stsm: bool,

    /// Write the solution as XML to this file.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .try_init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Usage problems exit 1; --help and --version exit 0.
            let failure = err.use_stderr();
            let _ = err.print();
            std::process::exit(if failure { 1 } else { 0 });
        }
    };

    let upperbound = match cli.upperbound {
        Some(value) if value <= 0.0 || value > 1.0 => {
            bail!("upperbound must lie in (0, 1], got {value}")
        }
        Some(value) if cli.exact => {
            info!("--exact overrides --upperbound {value}");
            1.0
        }
        Some(value) => value,
        None => 1.0,
    };

    let ged = cli.ged || cli.f2lp || cli.minext_approx;
    let relaxed = cli.f2lp || cli.minext_approx;

    let start = Instant::now();
    let (pattern, target) = AdjacencyParser::parse_path(&cli.input, MatrixMode::Simple)?;
    let kind = if ged {
        ProblemKind::EditDistance
    } else {
        ProblemKind::Subgraph
    };
    let problem = Problem::new(kind, Arc::new(pattern), Arc::new(target))?;

    let context = ReportContext {
        mode: mode_label(&cli),
        upperbound: (upperbound < 1.0).then_some(upperbound),
        approx_extension: cli.minext_approx,
    };

    let report = if ged {
        run_edit_distance(&cli, &problem, upperbound, relaxed, &context)?
    } else {
        run_subgraph(&cli, &problem, upperbound, &context)?
    };
    print!("{report}");

    if cli.time {
        println!("Time: {} ms", start.elapsed().as_millis());
    }
    Ok(())
}

fn run_edit_distance(
    cli: &Cli,
    problem: &Problem,
    upperbound: f64,
    relaxed: bool,
    context: &ReportContext,
) -> Result<String> {
    let formulation = if cli.minext_approx {
        EditDistance::approximate_minimal_extension(problem, upperbound)?
    } else {
        EditDistance::build(
            problem,
            &EditDistanceOptions {
                upperbound,
                relaxed,
                ..EditDistanceOptions::default()
            },
        )?
    };

    let outcome = if relaxed {
        MipSolver::solve_lp(formulation.lp())?
    } else {
        MipSolver::solve_mip(
            formulation.lp(),
            &SolveOptions {
                first_feasible: cli.fast,
                ..SolveOptions::default()
            },
        )?
    };

    let matching = Matching::interpret(problem, &outcome);
    if let Some(path) = &cli.output {
        SolutionWriter::write_to_path(path, problem, &matching)?;
    }
    Ok(render_edit_distance(problem, &matching, relaxed, context))
}

fn run_subgraph(
    cli: &Cli,
    problem: &Problem,
    upperbound: f64,
    context: &ReportContext,
) -> Result<String> {
    let outcome = if cli.fast {
        GreedySolver::solve(problem)
    } else if cli.approx_stsm {
        let formulation = SubstitutionMatching::build(
            problem,
            &SubstitutionOptions {
                upperbound,
                ..SubstitutionOptions::default()
            },
        )?;
        MipSolver::solve_mip(formulation.lp(), &SolveOptions::default())?
    } else {
        let formulation = MinimalExtension::build(
            problem,
            &ExtensionOptions {
                upperbound,
                ..ExtensionOptions::default()
            },
        )?;
        MipSolver::solve_mip(formulation.lp(), &SolveOptions::default())?
    };

    let matching = Matching::interpret(problem, &outcome);
    if let Some(path) = &cli.output {
        SolutionWriter::write_to_path(path, problem, &matching)?;
    }
    Ok(render_subgraph(problem, &matching, context))
}

fn mode_label(cli: &Cli) -> Option<String> {
    if cli.minext_approx {
        Some("approx-minext".to_string())
    } else if cli.f2lp {
        Some("f2lp".to_string())
    } else if cli.approx_stsm {
        Some("stsm".to_string())
    } else if cli.fast && !cli.ged {
        Some("greedy".to_string())
    } else {
        None
    }
}
