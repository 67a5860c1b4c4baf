//! Named blocks of rows inside a phase's states or controls.

use std::ops::Range;

use thiserror::Error;

use crate::model::BiomechanicalModel;

/// Errors raised while describing variables.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VariableError {
    #[error("variable `{name}` is declared twice")]
    DuplicateName { name: String },

    #[error("scaling factor {index} must be finite and positive, found {value}")]
    InvalidScaling { index: usize, value: f64 },
}

/// One named variable occupying `size` consecutive rows.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableElement {
    pub name: String,
    pub size: usize,
}

/// Ordered named elements making up a block of variables.
///
/// Rows of the block are the rows of each element, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde-derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "UncheckedVariableLayout")
)]
pub struct VariableLayout {
    elements: Vec<VariableElement>,
}

/// Wire form of [`VariableLayout`], checked for duplicate names on conversion.
#[cfg(feature = "serde-derive")]
#[derive(serde::Deserialize)]
struct UncheckedVariableLayout {
    elements: Vec<VariableElement>,
}

#[cfg(feature = "serde-derive")]
impl TryFrom<UncheckedVariableLayout> for VariableLayout {
    type Error = VariableError;

    fn try_from(unchecked: UncheckedVariableLayout) -> Result<Self, Self::Error> {
        unchecked
            .elements
            .into_iter()
            .try_fold(Self::new(), |layout, VariableElement { name, size }| {
                layout.with(name, size)
            })
    }
}

impl VariableLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element.
    ///
    /// # Errors
    ///
    /// Returns [`VariableError::DuplicateName`] if `name` is already declared.
    pub fn with(mut self, name: impl Into<String>, size: usize) -> Result<Self, VariableError> {
        let name = name.into();
        if self.element(&name).is_some() {
            return Err(VariableError::DuplicateName { name });
        }
        self.elements.push(VariableElement { name, size });
        Ok(self)
    }

    /// States of a torque-driven phase: `q` then `qdot`.
    ///
    /// # Errors
    ///
    /// Never fails for a model; the result type is shared with [`with`](Self::with).
    pub fn torque_driven_states<M: BiomechanicalModel>(model: &M) -> Result<Self, VariableError> {
        Self::new().with("q", model.nb_q())?.with("qdot", model.nb_qdot())
    }

    /// Controls of a torque-driven phase: `tau`.
    ///
    /// # Errors
    ///
    /// Never fails for a model; the result type is shared with [`with`](Self::with).
    pub fn torque_driven_controls<M: BiomechanicalModel>(
        model: &M,
    ) -> Result<Self, VariableError> {
        Self::new().with("tau", model.nb_tau())
    }

    #[must_use]
    pub fn elements(&self) -> &[VariableElement] {
        &self.elements
    }

    #[must_use]
    pub fn element(&self, name: &str) -> Option<&VariableElement> {
        self.elements.iter().find(|element| element.name == name)
    }

    /// Returns the total number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.iter().map(|element| element.size).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the first row of `name` within the block.
    #[must_use]
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.rows_of(name).map(|rows| rows.start)
    }

    /// Returns the rows of `name` within the block.
    #[must_use]
    pub fn rows_of(&self, name: &str) -> Option<Range<usize>> {
        self.ranges()
            .find(|(element, _)| element.name == name)
            .map(|(_, rows)| rows)
    }

    /// Iterates over the elements together with their rows.
    pub fn ranges(&self) -> impl Iterator<Item = (&VariableElement, Range<usize>)> {
        self.elements.iter().scan(0, |offset, element| {
            let start = *offset;
            *offset += element.size;
            Some((element, start..*offset))
        })
    }
}

/// One scaling factor per row of a block.
///
/// Optimization variables are the physical values divided by the factor.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableScaling {
    factors: Vec<f64>,
}

impl VariableScaling {
    /// # Errors
    ///
    /// Returns [`VariableError::InvalidScaling`] for a factor that is not
    /// finite and strictly positive.
    pub fn new(factors: impl Into<Vec<f64>>) -> Result<Self, VariableError> {
        let factors = factors.into();
        if let Some((index, &value)) = factors
            .iter()
            .enumerate()
            .find(|(_, value)| !value.is_finite() || **value <= 0.0)
        {
            return Err(VariableError::InvalidScaling { index, value });
        }
        Ok(Self { factors })
    }

    #[must_use]
    pub fn ones(len: usize) -> Self {
        Self {
            factors: vec![1.0; len],
        }
    }

    #[must_use]
    pub fn factors(&self) -> &[f64] {
        &self.factors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}
