mod skeleton;

pub mod edit_distance;
pub mod extension;
pub mod subgraph;
pub mod substitution;

pub use edit_distance::{EditCosts, EditDistance, EditDistanceOptions};
pub use extension::{ExtensionOptions, MinimalExtension};
pub use subgraph::{SubgraphIsomorphism, SubgraphOptions};
pub use substitution::{SubstitutionMatching, SubstitutionOptions};
