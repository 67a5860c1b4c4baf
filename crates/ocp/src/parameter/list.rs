use stride_core::Symbol;
use tracing::info;

use super::{Parameter, ParameterError};

/// The parameter pool of a program, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ParameterList {
    parameters: Vec<Parameter>,
}

impl ParameterList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, merging it into an existing entry of the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry of the same name has a different function
    /// or different extras, in which case the pool is left unchanged.
    pub fn add(&mut self, parameter: Parameter) -> Result<(), ParameterError> {
        match self.index(parameter.name()) {
            Some(index) => {
                let added = parameter.size();
                let existing = &mut self.parameters[index];
                existing.merge(parameter)?;
                info!(
                    name = existing.name(),
                    added,
                    size = existing.size(),
                    "merged parameter"
                );
            }
            None => self.parameters.push(parameter),
        }
        Ok(())
    }

    /// Returns the position of `name` in the pool.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name() == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(Parameter::name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    /// Returns the solver symbols of every parameter, in pool order.
    #[must_use]
    pub fn cx(&self) -> Vec<Symbol> {
        self.parameters
            .iter()
            .flat_map(|p| p.cx().iter().cloned())
            .collect()
    }

    /// Returns the total number of parameter values.
    #[must_use]
    pub fn size(&self) -> usize {
        self.parameters.iter().map(Parameter::size).sum()
    }

    /// Returns the offset of `name` among the parameter values.
    #[must_use]
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        let index = self.index(name)?;
        Some(self.parameters[..index].iter().map(Parameter::size).sum())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParameterList {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}
