pub mod driver;
pub mod greedy;

pub use driver::{MipSolver, SolveOptions, SolveOutcome, SolveStatus};
pub use greedy::GreedySolver;
