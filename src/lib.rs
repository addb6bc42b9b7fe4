pub mod formulation;
pub mod graph;
pub mod linprog;
pub mod problem;
pub mod report;
pub mod solution;
pub mod solver;

pub use formulation::{
    EditCosts, EditDistance, EditDistanceOptions, ExtensionOptions, MinimalExtension,
    SubgraphIsomorphism, SubgraphOptions, SubstitutionMatching, SubstitutionOptions,
};
pub use graph::{AdjacencyParser, AdjacencyWriter, GraphBuilder, GraphKind, GraphModel, MatrixMode};
pub use problem::{Problem, ProblemKind};
pub use solution::Matching;
pub use solver::{GreedySolver, MipSolver, SolveOptions, SolveOutcome, SolveStatus};
