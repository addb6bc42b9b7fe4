pub mod expr;
pub mod program;

pub use expr::{LinearExpr, VarId, VarKind, Variable};
pub use program::{Constraint, LinearProgram, Relation, Sense};
