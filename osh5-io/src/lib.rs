//! osh5-io: Disk I/O for the OSIRIS/VisXD HDF5 file convention.
//!
//! This crate maps between the on-disk layout written by the
//! OSIRIS/VisXD particle-in-cell codes (one primary dataset, root-level
//! run attributes, reverse-indexed `/AXIS/AXISn` records, text values
//! persisted as 1-element byte-string sequences) and the in-memory
//! [`osh5_core::GridData`] model.
//!

mod attrs;
mod convention;
mod error;

pub use convention::{read_h5, read_h5_from, write_h5, WriteOptions};
pub use error::{Error, Result};
