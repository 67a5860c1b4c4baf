//! Symbolic decision variables.
//!
//! A [`Symbol`] is a handle to one scalar unknown. Cloning a symbol clones the
//! handle, not the unknown: two clones compare equal, share the same
//! [`SymbolId`], and are treated as one variable by a solver. Phases that
//! reuse another phase's variables hold clones of that phase's symbols.
//!
//! [`Expr`] is the expression language used on top of symbols. It only covers
//! what variable bookkeeping needs (scaling, negation, constants) plus
//! evaluation against numeric values.

use std::{
    collections::HashMap,
    fmt,
    hash::{Hash, Hasher},
    ops::{Add, Mul, Neg},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(0);

/// Identifier shared by every clone of a [`Symbol`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(u64);

/// A named scalar unknown.
#[derive(Clone)]
pub struct Symbol(Arc<SymbolData>);

struct SymbolData {
    id: SymbolId,
    name: String,
}

impl Symbol {
    /// Allocates a new unknown.
    ///
    /// Every call produces a distinct variable, even for identical names.
    pub fn new(name: impl Into<String>) -> Self {
        let id = SymbolId(NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed));
        Self(Arc::new(SymbolData {
            id,
            name: name.into(),
        }))
    }

    /// Allocates `size` unknowns named `{name}_{i}`.
    pub fn vector(name: &str, size: usize) -> Vec<Self> {
        (0..size).map(|i| Self::new(format!("{name}_{i}"))).collect()
    }

    #[must_use]
    pub fn id(&self) -> SymbolId {
        self.0.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns `true` if both handles point to the same allocation.
    #[must_use]
    pub fn is_same(&self, other: &Symbol) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name(), self.id().0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scalar symbolic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(f64),
    Sym(Symbol),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
}

impl Expr {
    #[must_use]
    pub fn zero() -> Self {
        Expr::Const(0.0)
    }

    /// Builds `symbol * factor`, or the bare symbol when `factor` is one.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn scaled(symbol: &Symbol, factor: f64) -> Self {
        if factor == 1.0 {
            Expr::Sym(symbol.clone())
        } else {
            Expr::Mul(
                Box::new(Expr::Sym(symbol.clone())),
                Box::new(Expr::Const(factor)),
            )
        }
    }

    /// Returns the symbol if this expression is a bare symbol.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Expr::Sym(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// Collects every symbol this expression depends on, in visiting order.
    #[must_use]
    pub fn symbols(&self) -> Vec<&Symbol> {
        let mut found = Vec::new();
        self.collect_symbols(&mut found);
        found
    }

    fn collect_symbols<'a>(&'a self, found: &mut Vec<&'a Symbol>) {
        match self {
            Expr::Const(_) => {}
            Expr::Sym(symbol) => found.push(symbol),
            Expr::Neg(inner) => inner.collect_symbols(found),
            Expr::Add(lhs, rhs) | Expr::Mul(lhs, rhs) => {
                lhs.collect_symbols(found);
                rhs.collect_symbols(found);
            }
        }
    }

    /// Evaluates the expression, or returns `None` if a symbol has no value.
    #[must_use]
    pub fn eval(&self, values: &HashMap<SymbolId, f64>) -> Option<f64> {
        match self {
            Expr::Const(value) => Some(*value),
            Expr::Sym(symbol) => values.get(&symbol.id()).copied(),
            Expr::Neg(inner) => inner.eval(values).map(|v| -v),
            Expr::Add(lhs, rhs) => Some(lhs.eval(values)? + rhs.eval(values)?),
            Expr::Mul(lhs, rhs) => Some(lhs.eval(values)? * rhs.eval(values)?),
        }
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::Sym(symbol)
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        Expr::Sym(symbol.clone())
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Const(value)
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        match self {
            Expr::Const(value) => Expr::Const(-value),
            Expr::Neg(inner) => *inner,
            other => Expr::Neg(Box::new(other)),
        }
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::Add(Box::new(self), Box::new(rhs))
    }
}

impl Mul<f64> for Expr {
    type Output = Expr;

    fn mul(self, rhs: f64) -> Expr {
        Expr::Mul(Box::new(self), Box::new(Expr::Const(rhs)))
    }
}
