pub mod model;
pub mod parser;
pub mod serialization;

pub use model::{GraphBuilder, GraphKind, GraphModel, Incidence};
pub use parser::{AdjacencyParser, MatrixMode};
pub use serialization::AdjacencyWriter;
