pub mod text;
pub mod xml;

pub use text::{render_edit_distance, render_subgraph, ReportContext};
pub use xml::SolutionWriter;
