use indexmap::IndexMap;

/// Handle to a variable inside its owning [`LinearProgram`]'s arena.
///
/// Expressions and constraints key terms by this handle, never by the id
/// string, so renaming a variable cannot detach its coefficients.
///
/// [`LinearProgram`]: crate::linprog::LinearProgram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub(crate) usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Bounded integer variable.
    Bounded,
    /// Binary variable in {0, 1}.
    Binary,
    /// Continuous variable.
    Continuous,
}

/// A decision variable. Activation is expressed purely through bounds:
/// a variable with `lower == upper == 0` is deactivated and cannot take a
/// nonzero value in any feasible solution, while constraint indexing stays
/// stable.
#[derive(Debug, Clone)]
pub struct Variable {
    id: String,
    kind: VarKind,
    lower: f64,
    upper: f64,
}

impl Variable {
    /// Creates a variable with the kind-default unit bounds [0, 1].
    pub fn new(id: impl Into<String>, kind: VarKind) -> Self {
        Self {
            id: id.into(),
            kind,
            lower: 0.0,
            upper: 1.0,
        }
    }

    pub fn with_bounds(id: impl Into<String>, kind: VarKind, lower: f64, upper: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            lower,
            upper,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> VarKind {
        self.kind
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn set_bounds(&mut self, lower: f64, upper: f64) {
        self.lower = lower;
        self.upper = upper;
    }

    /// Restores the unit bounds.
    pub fn activate(&mut self) {
        self.lower = 0.0;
        self.upper = 1.0;
    }

    /// Pins the variable to zero by collapsing its bounds.
    pub fn deactivate(&mut self) {
        self.lower = 0.0;
        self.upper = 0.0;
    }

    pub fn is_active(&self) -> bool {
        !(self.lower == 0.0 && self.upper == 0.0)
    }
}

/// A linear expression: coefficients keyed by variable handle plus a
/// scalar constant. Adding a term for a variable that already appears
/// accumulates the coefficients; no other arithmetic is performed here.
#[derive(Debug, Clone, Default)]
pub struct LinearExpr {
    terms: IndexMap<VarId, f64>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_term(&mut self, var: VarId, coeff: f64) {
        *self.terms.entry(var).or_insert(0.0) += coeff;
    }

    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    pub fn set_constant(&mut self, constant: f64) {
        self.constant = constant;
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn terms(&self) -> impl Iterator<Item = (VarId, f64)> + '_ {
        self.terms.iter().map(|(var, coeff)| (*var, *coeff))
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
