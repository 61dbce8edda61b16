//! The in-memory model of a single OSIRIS diagnostic dump.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::ArrayD;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::attr::AttrValue;
use crate::axis::DataAxis;
use crate::error::{Error, Result};
use crate::units::Units;

/// Dataset-level attributes.
///
/// The convention requires `UNITS` and `LONG_NAME` on the primary
/// dataset; both default to empty. Any further keys pass through
/// untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DataAttrs {
    /// Parsed physical units of the data points.
    pub units: Units,
    /// Display label for the quantity.
    pub long_name: String,
    /// Pass-through dataset attributes.
    pub extra: BTreeMap<String, AttrValue>,
}

/// A labeled N-dimensional grid with units, axes and provenance.
///
/// Axis order follows array-dimension order: `axes[i]` describes
/// `data.shape()[i]`. The reversal the file convention applies to axis
/// records is confined to the store index permutation in the I/O layer.
#[derive(Debug, Clone, PartialEq)]
pub struct GridData {
    /// The numeric payload.
    pub data: ArrayD<f64>,
    /// Iteration token extracted from the source filename.
    pub timestamp: Option<String>,
    /// Logical variable name (e.g. "e1").
    pub name: Option<String>,
    /// Attributes describing the simulation run as a whole.
    pub run_attrs: BTreeMap<String, AttrValue>,
    /// Attributes describing this specific dataset.
    pub data_attrs: DataAttrs,
    /// One axis descriptor per array dimension.
    pub axes: Vec<DataAxis>,
}

impl GridData {
    /// Wraps an array with empty metadata and index-space axes
    /// (one per dimension, spanning `0..len`).
    #[must_use]
    pub fn new(data: ArrayD<f64>) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let axes = data
            .shape()
            .iter()
            .map(|&len| DataAxis::new(0.0, len as f64, len))
            .collect();
        Self {
            data,
            timestamp: None,
            name: None,
            run_attrs: BTreeMap::new(),
            data_attrs: DataAttrs::default(),
            axes,
        }
    }

    /// Number of array dimensions.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.data.ndim()
    }

    /// Checks that the axis list is consistent with the payload shape.
    ///
    /// # Errors
    /// Returns an error if the axis count differs from the array rank,
    /// or if any axis point count differs from its array dimension.
    pub fn validate(&self) -> Result<()> {
        let shape = self.data.shape();
        if self.axes.len() != shape.len() {
            return Err(Error::AxisRankMismatch {
                axes: self.axes.len(),
                rank: shape.len(),
            });
        }
        for (index, (axis, &dim)) in self.axes.iter().zip(shape).enumerate() {
            if axis.len != dim {
                return Err(Error::AxisLengthMismatch {
                    index,
                    len: axis.len,
                    dim,
                });
            }
        }
        Ok(())
    }
}

impl From<ArrayD<f64>> for GridData {
    fn from(data: ArrayD<f64>) -> Self {
        Self::new(data)
    }
}

impl fmt::Display for GridData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {}: shape {:?}, units {}",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.timestamp.as_deref().unwrap_or("<no timestamp>"),
            self.data.shape(),
            self.data_attrs.units,
        )?;
        for axis in &self.axes {
            write!(f, ", axis {}..{} ({} pts)", axis.min, axis.max, axis.len)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> GridData {
        GridData::new(array![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]].into_dyn())
    }

    #[test]
    fn test_new_defaults_index_axes() {
        let grid = sample();
        assert_eq!(grid.rank(), 2);
        assert_eq!(grid.axes.len(), 2);
        assert_eq!(grid.axes[0].len, 2);
        assert_eq!(grid.axes[1].len, 3);
        assert_eq!(grid.axes[1].max, 3.0);
        grid.validate().unwrap();
    }

    #[test]
    fn test_validate_rank_mismatch() {
        let mut grid = sample();
        grid.axes.pop();
        assert!(matches!(
            grid.validate(),
            Err(Error::AxisRankMismatch { axes: 1, rank: 2 })
        ));
    }

    #[test]
    fn test_validate_length_mismatch() {
        let mut grid = sample();
        grid.axes[1].len = 7;
        assert!(matches!(
            grid.validate(),
            Err(Error::AxisLengthMismatch {
                index: 1,
                len: 7,
                dim: 3
            })
        ));
    }

    #[test]
    fn test_display_mentions_name_and_units() {
        let mut grid = sample();
        grid.name = Some("e1".to_string());
        grid.timestamp = Some("000006".to_string());
        grid.data_attrs.units = "n_0".parse().unwrap();
        let text = grid.to_string();
        assert!(text.contains("e1 @ 000006"));
        assert!(text.contains("units n_0"));
    }
}
