//! Read/write for the OSIRIS/VisXD HDF5 file convention.
//!
//! A conforming file holds exactly one top-level dataset (the payload),
//! run-level attributes on the file root, dataset-level attributes
//! (`UNITS`, `LONG_NAME`, plus pass-through keys) and a `/AXIS` group
//! of 2-element `[min, max]` records named `AXIS1..AXISk`, indexed in
//! reverse relative to the array dimensions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use hdf5::{Dataset, File};
use ndarray::ArrayView1;
use regex::Regex;

use osh5_core::{AttrValue, DataAttrs, DataAxis, GridData, Units};

use crate::attrs::{decode_attr, write_attr};
use crate::{Error, Result};

/// Filename convention: the iteration digit run sits between a hyphen
/// and the extension dot, as in `e1-000006.h5`.
static TIMESTAMP_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d+)\.").expect("timestamp pattern is valid"));

/// Dataset name used when neither the model nor the caller supplies one.
const DEFAULT_DATASET_NAME: &str = "Data";

/// Store-side (1-based) axis index for a 0-based model axis.
///
/// The permutation is its own inverse: passing a 1-based store index
/// yields the 0-based model index. Read and write both go through this
/// function so the two directions cannot drift apart.
fn axis_store_index(rank: usize, model_index: usize) -> usize {
    rank - model_index
}

/// Required root attributes and their write-time defaults. Model values
/// override these key by key; the table itself is never mutated.
fn default_run_attrs() -> BTreeMap<String, AttrValue> {
    BTreeMap::from([
        ("DT".to_string(), AttrValue::FloatVec(vec![1.0])),
        ("ITER".to_string(), AttrValue::IntVec(vec![0])),
        ("MOVE C".to_string(), AttrValue::IntVec(vec![0])),
        ("PERIODIC".to_string(), AttrValue::IntVec(vec![0])),
        ("TIME".to_string(), AttrValue::FloatVec(vec![0.0])),
        ("TIME UNITS".to_string(), AttrValue::Text(String::new())),
        ("TYPE".to_string(), AttrValue::Text("grid".to_string())),
        ("XMIN".to_string(), AttrValue::FloatVec(vec![0.0])),
        ("XMAX".to_string(), AttrValue::FloatVec(vec![0.0])),
    ])
}

/// Reads an OSIRIS/VisXD file into a [`GridData`].
///
/// # Errors
/// Returns [`Error::NotFound`] if the path does not exist,
/// [`Error::Format`] if it is not a parsable HDF5 container,
/// [`Error::MissingDataset`] if the root holds no dataset,
/// [`Error::TimestampParse`] if the filename lacks the iteration digit
/// run, and [`Error::Encoding`] on attribute decoding failures.
pub fn read_h5<P: AsRef<Path>>(path: P) -> Result<GridData> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| Error::Format(e.to_string()))?;

    let (name, dataset) = find_primary_dataset(&file)?;
    let timestamp = extract_timestamp(path)?;

    let mut run_attrs = BTreeMap::new();
    for key in file.attr_names().map_err(|e| Error::Format(e.to_string()))? {
        let attr = file.attr(&key).map_err(|e| Error::Format(e.to_string()))?;
        run_attrs.insert(key, decode_attr(&attr)?);
    }

    let mut raw_data_attrs = BTreeMap::new();
    for key in dataset
        .attr_names()
        .map_err(|e| Error::Format(e.to_string()))?
    {
        let attr = dataset
            .attr(&key)
            .map_err(|e| Error::Format(e.to_string()))?;
        raw_data_attrs.insert(key, decode_attr(&attr)?);
    }
    let data_attrs = split_data_attrs(raw_data_attrs);

    let axes = read_axes(&file, &dataset.shape())?;
    let data = dataset
        .read_dyn::<f64>()
        .map_err(|e| Error::Format(e.to_string()))?;

    Ok(GridData {
        data,
        timestamp: Some(timestamp),
        name: Some(name),
        run_attrs,
        data_attrs,
        axes,
    })
}

/// Reads `filename` from `dir`; see [`read_h5`].
///
/// # Errors
/// Same as [`read_h5`].
pub fn read_h5_from<P: AsRef<Path>>(dir: P, filename: &str) -> Result<GridData> {
    read_h5(dir.as_ref().join(filename))
}

/// Write configuration; the default resolves everything from the model
/// and closes the file before returning.
#[derive(Clone, Debug)]
pub struct WriteOptions {
    /// Explicit output filename; otherwise `{name}-{timestamp}.h5`.
    pub filename: Option<String>,
    /// Directory the output path is resolved against.
    pub dir: Option<PathBuf>,
    /// Overrides the model's dataset name (default `"Data"`).
    pub dataset_name: Option<String>,
    /// Close the file before returning (the safe default). When false,
    /// the open handle is returned for further writes by the caller.
    pub flush: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            filename: None,
            dir: None,
            dataset_name: None,
            flush: true,
        }
    }
}

/// Writes a [`GridData`] as an OSIRIS/VisXD file, replacing any file
/// already at the resolved path. Attributes required by the convention
/// but absent from the model are synthesized with documented defaults.
///
/// Returns the open file handle if `options.flush` is false, `None`
/// otherwise.
///
/// # Errors
/// Returns [`Error::MissingFilename`] if neither an explicit filename
/// nor a model timestamp is available, [`Error::Encoding`] on text
/// encoding failures, and [`Error::StoreWrite`] on HDF5 write failures.
pub fn write_h5(data: &GridData, options: &WriteOptions) -> Result<Option<File>> {
    let dataset_name = options
        .dataset_name
        .clone()
        .or_else(|| data.name.clone())
        .unwrap_or_else(|| DEFAULT_DATASET_NAME.to_string());

    let path = resolve_output_path(data, options, &dataset_name)?;
    if path.is_file() {
        fs::remove_file(&path)?;
    }
    let file = File::create(&path).map_err(Error::StoreWrite)?;

    let dataset = file
        .new_dataset::<f64>()
        .shape(data.data.shape())
        .create(dataset_name.as_str())
        .map_err(Error::StoreWrite)?;
    dataset.write(data.data.view()).map_err(Error::StoreWrite)?;

    write_data_attrs(&dataset, &data.data_attrs)?;

    let mut run_attrs = default_run_attrs();
    run_attrs.extend(
        data.run_attrs
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    for (key, value) in &run_attrs {
        write_attr(&file, key, value)?;
    }

    write_axes(&file, &data.axes)?;

    if options.flush {
        Ok(None)
    } else {
        Ok(Some(file))
    }
}

fn find_primary_dataset(file: &File) -> Result<(String, Dataset)> {
    let names = file
        .member_names()
        .map_err(|e| Error::Format(e.to_string()))?;
    for name in names {
        // groups (such as /AXIS) do not open as datasets
        if let Ok(dataset) = file.dataset(&name) {
            return Ok((name, dataset));
        }
    }
    Err(Error::MissingDataset)
}

fn extract_timestamp(path: &Path) -> Result<String> {
    let basename = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    TIMESTAMP_RULE
        .captures(&basename)
        .map(|captures| captures[1].to_string())
        .ok_or_else(|| Error::TimestampParse(basename.to_string()))
}

/// Splits the decoded dataset attribute bag into its typed form.
/// A missing or unparsable `UNITS` degrades to dimensionless; a missing
/// `LONG_NAME` degrades to empty.
fn split_data_attrs(mut raw: BTreeMap<String, AttrValue>) -> DataAttrs {
    let units = match raw.remove("UNITS") {
        Some(AttrValue::Text(expr)) => expr.parse().unwrap_or_default(),
        _ => Units::dimensionless(),
    };
    let long_name = match raw.remove("LONG_NAME") {
        Some(AttrValue::Text(label)) => label,
        _ => String::new(),
    };
    DataAttrs {
        units,
        long_name,
        extra: raw,
    }
}

/// Probes `/AXIS/AXIS1`, `/AXIS/AXIS2`, ... until the first missing
/// index; each axis lands at model position `rank - store_index`, its
/// point count reconciled from the payload shape.
fn read_axes(file: &File, shape: &[usize]) -> Result<Vec<DataAxis>> {
    let rank = shape.len();
    let mut axes = Vec::new();
    for store_index in 1_usize.. {
        let Ok(record) = file.dataset(&format!("AXIS/AXIS{store_index}")) else {
            break;
        };
        if store_index > rank {
            return Err(Error::Format(format!(
                "found axis record AXIS{store_index} but payload is only {rank}-dimensional"
            )));
        }
        let endpoints = record
            .read_raw::<f64>()
            .map_err(|e| Error::Format(e.to_string()))?;
        if endpoints.len() < 2 {
            return Err(Error::Format(format!(
                "axis record AXIS{store_index} holds {} values, expected 2",
                endpoints.len()
            )));
        }
        let mut attrs = BTreeMap::new();
        for key in record
            .attr_names()
            .map_err(|e| Error::Format(e.to_string()))?
        {
            let attr = record.attr(&key).map_err(|e| Error::Format(e.to_string()))?;
            attrs.insert(key, decode_attr(&attr)?);
        }
        // the permutation is an involution, so this is the model index
        let model_index = axis_store_index(rank, store_index);
        axes.insert(
            0,
            DataAxis {
                min: endpoints[0],
                max: endpoints[1],
                len: shape[model_index],
                attrs,
            },
        );
    }
    Ok(axes)
}

fn resolve_output_path(
    data: &GridData,
    options: &WriteOptions,
    dataset_name: &str,
) -> Result<PathBuf> {
    let dir = options.dir.clone().unwrap_or_default();
    if let Some(filename) = &options.filename {
        Ok(dir.join(filename))
    } else if let Some(timestamp) = &data.timestamp {
        Ok(dir.join(format!("{dataset_name}-{timestamp}.h5")))
    } else {
        Err(Error::MissingFilename)
    }
}

fn write_data_attrs(dataset: &Dataset, data_attrs: &DataAttrs) -> Result<()> {
    // required keys first, then pass-through; merged so each attribute
    // is created exactly once
    let mut merged = BTreeMap::from([
        (
            "UNITS".to_string(),
            AttrValue::Text(data_attrs.units.to_string()),
        ),
        (
            "LONG_NAME".to_string(),
            AttrValue::Text(data_attrs.long_name.clone()),
        ),
    ]);
    merged.extend(
        data_attrs
            .extra
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    for (key, value) in &merged {
        write_attr(dataset, key, value)?;
    }
    Ok(())
}

fn write_axes(file: &File, axes: &[DataAxis]) -> Result<()> {
    let rank = axes.len();
    for (model_index, axis) in axes.iter().enumerate() {
        let name = format!("AXIS/AXIS{}", axis_store_index(rank, model_index));
        let record = if file.link_exists(&name) {
            file.dataset(&name).map_err(Error::StoreWrite)?
        } else {
            file.new_dataset::<f64>()
                .shape((2,))
                .create(name.as_str())
                .map_err(Error::StoreWrite)?
        };
        let endpoints = [axis.min, axis.max];
        record
            .write(ArrayView1::from(&endpoints[..]))
            .map_err(Error::StoreWrite)?;
        for (key, value) in &axis.attrs {
            write_attr(&record, key, value)?;
        }
    }
    Ok(())
}
