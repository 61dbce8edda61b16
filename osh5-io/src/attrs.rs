//! Attribute normalization between HDF5 storage and [`AttrValue`].
//!
//! This is the single boundary every attribute crosses in both
//! directions. The convention persists text as a 1-element byte-string
//! sequence; numeric scalars and sequences pass through unchanged with
//! their shape preserved.

use std::str::FromStr;

use hdf5::types::{TypeDescriptor, VarLenAscii, VarLenUnicode};
use hdf5::{Attribute, Location};
use ndarray::ArrayView1;

use osh5_core::AttrValue;

use crate::{Error, Result};

/// Decodes a stored attribute into its canonical in-memory form.
///
/// String-typed attributes (fixed or variable length, ASCII or UTF-8)
/// yield the decoded text of their first element; integers widen to
/// `i64`, floats to `f64`.
pub(crate) fn decode_attr(attr: &Attribute) -> Result<AttrValue> {
    let descriptor = attr
        .dtype()
        .and_then(|dtype| dtype.to_descriptor())
        .map_err(|e| Error::Format(e.to_string()))?;
    let scalar = attr.is_scalar();
    match descriptor {
        TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) | TypeDescriptor::Boolean => {
            if scalar {
                let value = attr
                    .read_scalar::<i64>()
                    .map_err(|e| Error::Format(e.to_string()))?;
                Ok(AttrValue::Int(value))
            } else {
                let values = attr
                    .read_raw::<i64>()
                    .map_err(|e| Error::Format(e.to_string()))?;
                Ok(AttrValue::IntVec(values))
            }
        }
        TypeDescriptor::Float(_) => {
            if scalar {
                let value = attr
                    .read_scalar::<f64>()
                    .map_err(|e| Error::Format(e.to_string()))?;
                Ok(AttrValue::Float(value))
            } else {
                let values = attr
                    .read_raw::<f64>()
                    .map_err(|e| Error::Format(e.to_string()))?;
                Ok(AttrValue::FloatVec(values))
            }
        }
        TypeDescriptor::FixedAscii(_) | TypeDescriptor::VarLenAscii => {
            let values = attr
                .read_raw::<VarLenAscii>()
                .map_err(|e| Error::Encoding(e.to_string()))?;
            let first = values
                .first()
                .ok_or_else(|| Error::Encoding("empty string attribute".to_string()))?;
            Ok(AttrValue::Text(first.to_string()))
        }
        TypeDescriptor::FixedUnicode(_) | TypeDescriptor::VarLenUnicode => {
            let values = attr
                .read_raw::<VarLenUnicode>()
                .map_err(|e| Error::Encoding(e.to_string()))?;
            let first = values
                .first()
                .ok_or_else(|| Error::Encoding("empty string attribute".to_string()))?;
            Ok(AttrValue::Text(first.to_string()))
        }
        other => Err(Error::Encoding(format!(
            "unsupported attribute type: {other}"
        ))),
    }
}

/// Writes a value as a new attribute of `location`, applying the
/// inverse convention: text becomes a 1-element UTF-8 string sequence,
/// numerics keep their scalar/sequence shape.
pub(crate) fn write_attr(location: &Location, name: &str, value: &AttrValue) -> Result<()> {
    match value {
        AttrValue::Text(text) => {
            let encoded = VarLenUnicode::from_str(text)
                .map_err(|e| Error::Encoding(format!("cannot encode {name}: {e}")))?;
            let values = [encoded];
            location
                .new_attr::<VarLenUnicode>()
                .shape((1,))
                .create(name)
                .and_then(|attr| attr.write(ArrayView1::from(&values[..])))
                .map_err(Error::StoreWrite)?;
        }
        AttrValue::Int(scalar) => {
            location
                .new_attr::<i64>()
                .create(name)
                .and_then(|attr| attr.write_scalar(scalar))
                .map_err(Error::StoreWrite)?;
        }
        AttrValue::Float(scalar) => {
            location
                .new_attr::<f64>()
                .create(name)
                .and_then(|attr| attr.write_scalar(scalar))
                .map_err(Error::StoreWrite)?;
        }
        AttrValue::IntVec(values) => {
            location
                .new_attr::<i64>()
                .shape((values.len(),))
                .create(name)
                .and_then(|attr| attr.write(ArrayView1::from(values.as_slice())))
                .map_err(Error::StoreWrite)?;
        }
        AttrValue::FloatVec(values) => {
            location
                .new_attr::<f64>()
                .shape((values.len(),))
                .create(name)
                .and_then(|attr| attr.write(ArrayView1::from(values.as_slice())))
                .map_err(Error::StoreWrite)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdf5::File;
    use tempfile::NamedTempFile;

    fn roundtrip(value: &AttrValue) -> AttrValue {
        let tmp = NamedTempFile::new().unwrap();
        let file = File::create(tmp.path()).unwrap();
        write_attr(&file, "probe", value).unwrap();
        decode_attr(&file.attr("probe").unwrap()).unwrap()
    }

    #[test]
    fn test_text_roundtrip() {
        let value = AttrValue::from("c / \\omega_p");
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn test_numeric_roundtrip_preserves_shape() {
        for value in [
            AttrValue::Int(42),
            AttrValue::Float(0.5),
            AttrValue::IntVec(vec![0]),
            AttrValue::FloatVec(vec![1.0, 2.0, 3.0]),
        ] {
            assert_eq!(roundtrip(&value), value);
        }
    }

    #[test]
    fn test_text_is_stored_as_one_element_sequence() {
        let tmp = NamedTempFile::new().unwrap();
        let file = File::create(tmp.path()).unwrap();
        write_attr(&file, "NAME", &AttrValue::from("e1")).unwrap();
        let attr = file.attr("NAME").unwrap();
        assert_eq!(attr.shape(), vec![1]);
    }

    #[test]
    fn test_decode_ascii_byte_string() {
        let tmp = NamedTempFile::new().unwrap();
        let file = File::create(tmp.path()).unwrap();
        let value = VarLenAscii::from_ascii("grid").unwrap();
        let values = [value];
        file.new_attr::<VarLenAscii>()
            .shape((1,))
            .create("TYPE")
            .unwrap()
            .write(ArrayView1::from(&values[..]))
            .unwrap();
        let decoded = decode_attr(&file.attr("TYPE").unwrap()).unwrap();
        assert_eq!(decoded, AttrValue::from("grid"));
    }

    #[test]
    fn test_decode_narrow_integer_widens() {
        let tmp = NamedTempFile::new().unwrap();
        let file = File::create(tmp.path()).unwrap();
        file.new_attr::<i32>()
            .shape((1,))
            .create("ITER")
            .unwrap()
            .write(ArrayView1::from(&[7_i32][..]))
            .unwrap();
        let decoded = decode_attr(&file.attr("ITER").unwrap()).unwrap();
        assert_eq!(decoded, AttrValue::IntVec(vec![7]));
    }
}
