//! Borrowed view of a single elevation band.

use crate::{DemError, Result};

/// Row-major elevation values with an optional validity mask.
///
/// The view never owns its data; it borrows band 1 of a [`crate::Mosaic`]
/// or any caller-provided buffer. A cell is valid when the mask allows it
/// and the value is not NaN.
#[derive(Debug, Clone, Copy)]
pub struct ElevationGrid<'a> {
    width: usize,
    height: usize,
    values: &'a [f32],
    valid: Option<&'a [bool]>,
}

impl<'a> ElevationGrid<'a> {
    /// Wrap `values` (row-major, `width * height` long) without a mask.
    pub fn new(width: usize, height: usize, values: &'a [f32]) -> Result<Self> {
        if width == 0 || height == 0 || values.len() != width * height {
            return Err(DemError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            values,
            valid: None,
        })
    }

    /// Shape is already checked by the caller.
    pub(crate) fn from_parts(
        width: usize,
        height: usize,
        values: &'a [f32],
        valid: Option<&'a [bool]>,
    ) -> Self {
        Self {
            width,
            height,
            values,
            valid,
        }
    }

    /// Attach a validity mask of the same shape.
    pub fn with_mask(mut self, valid: &'a [bool]) -> Result<Self> {
        if valid.len() != self.values.len() {
            return Err(DemError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        self.valid = Some(valid);
        Ok(self)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &'a [f32] {
        self.values
    }

    pub fn mask(&self) -> Option<&'a [bool]> {
        self.valid
    }

    /// Value at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[row * self.width + col]
    }

    /// True when cell `index` holds a usable elevation.
    pub fn is_valid(&self, index: usize) -> bool {
        let masked_in = self.valid.map_or(true, |mask| mask[index]);
        masked_in && !self.values[index].is_nan()
    }

    /// Minimum and maximum over valid cells, `None` if there are none.
    pub fn valid_range(&self) -> Option<(f32, f32)> {
        let mut range: Option<(f32, f32)> = None;
        for (index, &value) in self.values.iter().enumerate() {
            if !self.is_valid(index) {
                continue;
            }
            range = Some(match range {
                Some((lo, hi)) => (lo.min(value), hi.max(value)),
                None => (value, value),
            });
        }
        range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_checked() {
        let values = [1.0, 2.0, 3.0];
        assert!(ElevationGrid::new(2, 2, &values).is_err());
        assert!(ElevationGrid::new(0, 3, &values).is_err());

        let grid = ElevationGrid::new(3, 1, &values).unwrap();
        assert!(grid.with_mask(&[true, false]).is_err());
    }

    #[test]
    fn test_validity_and_range() {
        let values = [5.0, f32::NAN, -3.0, 100.0];
        let mask = [true, true, true, false];
        let grid = ElevationGrid::new(2, 2, &values)
            .unwrap()
            .with_mask(&mask)
            .unwrap();

        assert!(grid.is_valid(0));
        assert!(!grid.is_valid(1)); // NaN
        assert!(!grid.is_valid(3)); // masked out
        assert_eq!(grid.valid_range(), Some((-3.0, 5.0)));
        assert_eq!(grid.get(1, 1), 100.0);
    }
}
