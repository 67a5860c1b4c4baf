use std::ops::Range;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::symbolic::Expr;

use super::MappingError;

/// Sign applied to a mapped row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum Sign {
    #[default]
    Positive,
    Negative,
}

impl Sign {
    /// Returns `1.0` or `-1.0`.
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            Sign::Positive => 1.0,
            Sign::Negative => -1.0,
        }
    }
}

/// Element types a [`Mapping`] can be applied to.
///
/// Implemented for numeric values and symbolic expressions, so the same
/// mapping moves bounds, initial guesses and decision variables.
pub trait MapElement: Clone {
    /// The value written for rows mapped to nothing.
    fn zero() -> Self;

    /// The value written for rows with a [`Sign::Negative`] sign.
    #[must_use]
    fn opposite(&self) -> Self;
}

impl MapElement for f64 {
    fn zero() -> Self {
        0.0
    }

    fn opposite(&self) -> Self {
        -*self
    }
}

impl MapElement for Expr {
    fn zero() -> Self {
        Expr::zero()
    }

    fn opposite(&self) -> Self {
        -self.clone()
    }
}

/// Maps the rows of a source set onto a target set.
///
/// Entry `i` of the target is the source row `map_idx[i]` multiplied by
/// `oppose[i]`, or zero when `map_idx[i]` is `None`.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use stride_core::Mapping;
///
/// let to_second = vec![Some(0), Some(1), Some(1), Some(3), None, Some(1)];
/// let mapping = Mapping::new(to_second, &[3]).unwrap();
/// let mapped = mapping.map_vector(array![0.1, 0.2, 0.3, 0.4, 0.5, 0.6].view()).unwrap();
///
/// assert_eq!(mapped, array![0.1, 0.2, 0.2, -0.4, 0.0, 0.2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Mapping {
    map_idx: Vec<Option<usize>>,
    oppose: Vec<Sign>,
}

impl Mapping {
    /// Creates a mapping whose rows listed in `oppose` are negated.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::OpposeOutOfRange`] if an `oppose` entry does not
    /// designate a row of the mapping.
    pub fn new(
        map_idx: impl IntoIterator<Item = Option<usize>>,
        oppose: &[usize],
    ) -> Result<Self, MappingError> {
        let mut mapping = Self::from_indices(map_idx);
        let len = mapping.len();
        for &index in oppose {
            let sign = mapping
                .oppose
                .get_mut(index)
                .ok_or(MappingError::OpposeOutOfRange { index, len })?;
            *sign = Sign::Negative;
        }
        Ok(mapping)
    }

    /// Creates the mapping `0..len` onto itself.
    #[must_use]
    pub fn identity(len: usize) -> Self {
        Self::from(0..len)
    }

    fn from_indices(map_idx: impl IntoIterator<Item = Option<usize>>) -> Self {
        let map_idx: Vec<_> = map_idx.into_iter().collect();
        let oppose = vec![Sign::Positive; map_idx.len()];
        Self { map_idx, oppose }
    }

    #[must_use]
    pub fn map_idx(&self) -> &[Option<usize>] {
        &self.map_idx
    }

    #[must_use]
    pub fn oppose(&self) -> &[Sign] {
        &self.oppose
    }

    /// Returns the number of target rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map_idx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map_idx.is_empty()
    }

    /// Applies the mapping to the rows of `values`; columns are kept as is.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::SourceOutOfRange`] if the mapping reads a row
    /// that `values` does not have.
    pub fn map<T: MapElement>(
        &self,
        values: ArrayView2<'_, T>,
    ) -> Result<Array2<T>, MappingError> {
        let rows = values.nrows();
        let mut mapped = Array2::from_elem((self.len(), values.ncols()), T::zero());

        for (target, (source, sign)) in self.map_idx.iter().zip(&self.oppose).enumerate() {
            let Some(source) = *source else {
                continue;
            };
            if source >= rows {
                return Err(MappingError::SourceOutOfRange {
                    index: source,
                    rows,
                });
            }
            for (out, value) in mapped.row_mut(target).iter_mut().zip(values.row(source)) {
                *out = match sign {
                    Sign::Positive => value.clone(),
                    Sign::Negative => value.opposite(),
                };
            }
        }

        Ok(mapped)
    }

    /// Applies the mapping to a single column.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::SourceOutOfRange`] if the mapping reads an
    /// entry that `values` does not have.
    pub fn map_vector<T: MapElement>(
        &self,
        values: ArrayView1<'_, T>,
    ) -> Result<Array1<T>, MappingError> {
        let mapped = self.map(values.insert_axis(Axis(1)))?;
        Ok(mapped.index_axis_move(Axis(1), 0))
    }
}

impl From<Vec<Option<usize>>> for Mapping {
    fn from(map_idx: Vec<Option<usize>>) -> Self {
        Self::from_indices(map_idx)
    }
}

impl From<Vec<usize>> for Mapping {
    fn from(map_idx: Vec<usize>) -> Self {
        Self::from_indices(map_idx.into_iter().map(Some))
    }
}

impl From<&[usize]> for Mapping {
    fn from(map_idx: &[usize]) -> Self {
        Self::from_indices(map_idx.iter().copied().map(Some))
    }
}

impl From<Range<usize>> for Mapping {
    fn from(range: Range<usize>) -> Self {
        Self::from_indices(range.map(Some))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    use crate::symbolic::Symbol;

    #[test]
    fn maps_rows_with_zeros_and_opposition() {
        let mapping =
            Mapping::new(vec![Some(0), Some(1), Some(1), Some(3), None, Some(1)], &[3]).unwrap();
        let values = array![0.1, 0.2, 0.3, 0.4, 0.5, 0.6];

        let mapped = mapping.map_vector(values.view()).unwrap();

        let expected = [0.1, 0.2, 0.2, -0.4, 0.0, 0.2];
        assert_eq!(mapped.len(), expected.len());
        for (actual, expected) in mapped.iter().zip(expected) {
            assert_relative_eq!(*actual, expected);
        }
    }

    #[test]
    fn preserves_columns() {
        let mapping = Mapping::new(vec![Some(1), None, Some(0)], &[2]).unwrap();
        let values = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];

        let mapped = mapping.map(values.view()).unwrap();

        assert_eq!(
            mapped,
            array![[4.0, 5.0, 6.0], [0.0, 0.0, 0.0], [-1.0, -2.0, -3.0]]
        );
    }

    #[test]
    fn maps_symbolic_rows() {
        let q0 = Symbol::new("q0");
        let q1 = Symbol::new("q1");
        let values = array![Expr::from(&q0), Expr::from(&q1)];
        let mapping = Mapping::new(vec![Some(1), None, Some(0)], &[0]).unwrap();

        let mapped = mapping.map_vector(values.view()).unwrap();

        assert_eq!(mapped[0], -Expr::from(&q1));
        assert_eq!(mapped[1], Expr::zero());
        assert_eq!(mapped[2].as_symbol(), Some(&q0));
    }

    #[test]
    fn length_matches_map_idx() {
        assert_eq!(Mapping::from(vec![0, 0, 1]).len(), 3);
        assert_eq!(Mapping::from(vec![Some(2), None]).len(), 2);
        assert_eq!(Mapping::identity(4).len(), 4);
        assert!(Mapping::from(Vec::<usize>::new()).is_empty());
    }

    #[test]
    fn rejects_source_row_outside_input() {
        let mapping = Mapping::from(vec![0, 3]);
        let result = mapping.map_vector(array![1.0, 2.0].view());

        assert_eq!(
            result,
            Err(MappingError::SourceOutOfRange { index: 3, rows: 2 })
        );
    }

    #[test]
    fn rejects_oppose_outside_mapping() {
        let result = Mapping::new(vec![Some(0), Some(1)], &[2]);
        assert_eq!(
            result,
            Err(MappingError::OpposeOutOfRange { index: 2, len: 2 })
        );
    }
}
