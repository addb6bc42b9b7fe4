use indexmap::IndexMap;

use crate::linprog::expr::{LinearExpr, VarId, Variable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEq,
    GreaterEq,
    Eq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone)]
pub struct Constraint {
    id: String,
    expr: LinearExpr,
    relation: Relation,
    rhs: f64,
}

impl Constraint {
    pub fn new(id: impl Into<String>, expr: LinearExpr, relation: Relation, rhs: f64) -> Self {
        Self {
            id: id.into(),
            expr,
            relation,
            rhs,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }
}

/// A linear program over an arena of variables.
///
/// The program exclusively owns its variables, constraints and objective.
/// Variable ids are unique; constraints keep insertion order so that a
/// loaded model is reproducible run to run.
#[derive(Debug)]
pub struct LinearProgram {
    sense: Sense,
    variables: Vec<Variable>,
    lookup: IndexMap<String, VarId>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
}

impl LinearProgram {
    pub fn new(sense: Sense) -> Self {
        Self {
            sense,
            variables: Vec::new(),
            lookup: IndexMap::new(),
            constraints: Vec::new(),
            objective: LinearExpr::new(),
        }
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Registers a variable and returns its handle. Re-adding an id that
    /// already exists is a no-op returning the existing handle.
    pub fn add_variable(&mut self, variable: Variable) -> VarId {
        if let Some(existing) = self.lookup.get(variable.id()) {
            return *existing;
        }
        let id = VarId(self.variables.len());
        self.lookup.insert(variable.id().to_string(), id);
        self.variables.push(variable);
        id
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    pub fn variable_mut(&mut self, id: VarId) -> &mut Variable {
        &mut self.variables[id.0]
    }

    pub fn lookup(&self, id: &str) -> Option<VarId> {
        self.lookup.get(id).copied()
    }

    pub fn variables(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(index, var)| (VarId(index), var))
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// An LP with no variables has not been initialised by a formulation.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linprog::expr::VarKind;

    #[test]
    fn re_adding_an_id_is_a_no_op() {
        let mut lp = LinearProgram::new(Sense::Minimize);
        let first = lp.add_variable(Variable::new("x_0,0", VarKind::Binary));
        let second = lp.add_variable(Variable::new("x_0,0", VarKind::Continuous));
        assert_eq!(first, second);
        assert_eq!(lp.variable_count(), 1);
        assert_eq!(lp.variable(first).kind(), VarKind::Binary);
    }

    #[test]
    fn constraints_keep_insertion_order() {
        let mut lp = LinearProgram::new(Sense::Minimize);
        let x = lp.add_variable(Variable::new("x", VarKind::Binary));
        for name in ["first", "second", "third"] {
            let mut expr = LinearExpr::new();
            expr.add_term(x, 1.0);
            lp.add_constraint(Constraint::new(name, expr, Relation::LessEq, 1.0));
        }
        let ids: Vec<&str> = lp.constraints().iter().map(Constraint::id).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }
}
