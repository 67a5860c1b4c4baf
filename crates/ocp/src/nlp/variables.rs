use ndarray::Array2;
use stride_core::{Expr, MappedVariables, Symbol};

/// Where the value of one variable row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrigin {
    /// The row owns its decision variables.
    Independent,
    /// The row reuses row `row` of an earlier phase.
    AliasedTo { phase: usize, row: usize },
}

impl RowOrigin {
    #[must_use]
    pub fn is_independent(self) -> bool {
        matches!(self, RowOrigin::Independent)
    }
}

/// Declared variables of one phase.
///
/// Rows are variables and columns are nodes, including collocation points
/// for states. Aliased rows hold clones of the source phase's symbols.
#[derive(Debug, Clone)]
pub struct PhaseVariables {
    pub(crate) x_scaled: Array2<Symbol>,
    pub(crate) x: Array2<Expr>,
    pub(crate) x_origin: Vec<RowOrigin>,
    pub(crate) u_scaled: Array2<Symbol>,
    pub(crate) u: Array2<Expr>,
    pub(crate) u_origin: Vec<RowOrigin>,
}

impl PhaseVariables {
    /// Returns the decision variables, in solver units.
    #[must_use]
    pub fn scaled(&self, block: MappedVariables) -> &Array2<Symbol> {
        match block {
            MappedVariables::States => &self.x_scaled,
            MappedVariables::Controls => &self.u_scaled,
        }
    }

    /// Returns the decision variables multiplied by their scaling.
    #[must_use]
    pub fn unscaled(&self, block: MappedVariables) -> &Array2<Expr> {
        match block {
            MappedVariables::States => &self.x,
            MappedVariables::Controls => &self.u,
        }
    }

    /// Returns the origin of every row.
    #[must_use]
    pub fn origins(&self, block: MappedVariables) -> &[RowOrigin] {
        match block {
            MappedVariables::States => &self.x_origin,
            MappedVariables::Controls => &self.u_origin,
        }
    }

    /// Returns the number of rows owning their decision variables.
    #[must_use]
    pub fn n_independent(&self, block: MappedVariables) -> usize {
        self.origins(block)
            .iter()
            .filter(|origin| origin.is_independent())
            .count()
    }
}
