//! Axis descriptors for gridded diagnostics.

use std::collections::BTreeMap;

use ndarray::Array1;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::attr::AttrValue;

/// One array dimension's physical coordinate span.
///
/// The file convention persists only the two endpoints; the point count
/// is derived from the payload shape at read time and never stored
/// independently. Endpoints follow the OSIRIS cell-boundary convention:
/// `min` is the first grid point and `max` is the upper boundary, one
/// increment past the last point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DataAxis {
    /// Lower endpoint of the linear range.
    pub min: f64,
    /// Upper endpoint of the linear range.
    pub max: f64,
    /// Number of grid points along this dimension (derived, not persisted).
    pub len: usize,
    /// Per-axis metadata, typically a units string and a label.
    pub attrs: BTreeMap<String, AttrValue>,
}

impl DataAxis {
    /// Creates an axis with no metadata.
    #[must_use]
    pub fn new(min: f64, max: f64, len: usize) -> Self {
        Self {
            min,
            max,
            len,
            attrs: BTreeMap::new(),
        }
    }

    /// Adds a metadata attribute, builder style.
    #[must_use]
    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    /// Grid spacing between adjacent points.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn increment(&self) -> f64 {
        if self.len == 0 {
            0.0
        } else {
            (self.max - self.min) / self.len as f64
        }
    }

    /// The physical coordinate of every grid point (endpoint exclusive).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn coords(&self) -> Array1<f64> {
        let dx = self.increment();
        Array1::from_iter((0..self.len).map(|i| self.min + dx * i as f64))
    }
}
