//! osh5-core: Core data model for OSIRIS/VisXD HDF5 diagnostics.
//!
//! This crate provides the in-memory representation of a single OSIRIS
//! diagnostic dump: the numeric grid, its physical axes, the run- and
//! dataset-level attribute bags, and the parsed physical units.
//!

pub mod attr;
pub mod axis;
pub mod error;
pub mod grid;
pub mod units;

pub use attr::AttrValue;
pub use axis::DataAxis;
pub use error::{Error, Result};
pub use grid::{DataAttrs, GridData};
pub use units::Units;
