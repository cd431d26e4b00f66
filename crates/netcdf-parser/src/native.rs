//! Helpers around the native netcdf library.
//!
//! The netcdf crate wraps libnetcdf/HDF5. This module holds the pieces shared
//! by the reader and the writer: HDF5 error silencing and the conversion
//! between netcdf attribute values and cube attribute values.

use std::sync::Once;

use spot_common::AttributeValue;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// This function disables that output by calling H5Eset_auto2 with null handlers.
/// It only needs to be called once per process, but is safe to call multiple times.
///
/// **Important**: Call this function early in your program's startup (e.g., in main())
/// before any HDF5/NetCDF operations occur.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
pub(crate) fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get f64 attribute.
pub(crate) fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

/// Helper to get string attribute.
pub(crate) fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// Convert a netcdf attribute value into a cube attribute value.
///
/// String arrays have no cube representation and are dropped.
pub(crate) fn from_netcdf_attr(value: netcdf::AttributeValue) -> Option<AttributeValue> {
    use netcdf::AttributeValue as Nc;

    let value = match value {
        Nc::Str(s) => AttributeValue::Text(s),
        Nc::Uchar(v) => AttributeValue::Int(v as i64),
        Nc::Schar(v) => AttributeValue::Int(v as i64),
        Nc::Ushort(v) => AttributeValue::Int(v as i64),
        Nc::Short(v) => AttributeValue::Int(v as i64),
        Nc::Uint(v) => AttributeValue::Int(v as i64),
        Nc::Int(v) => AttributeValue::Int(v as i64),
        Nc::Longlong(v) => AttributeValue::Int(v),
        Nc::Ulonglong(v) => AttributeValue::Int(i64::try_from(v).ok()?),
        Nc::Float(v) => AttributeValue::Float(v as f64),
        Nc::Double(v) => AttributeValue::Float(v),
        Nc::Uchars(v) => AttributeValue::Ints(v.into_iter().map(i64::from).collect()),
        Nc::Schars(v) => AttributeValue::Ints(v.into_iter().map(i64::from).collect()),
        Nc::Ushorts(v) => AttributeValue::Ints(v.into_iter().map(i64::from).collect()),
        Nc::Shorts(v) => AttributeValue::Ints(v.into_iter().map(i64::from).collect()),
        Nc::Uints(v) => AttributeValue::Ints(v.into_iter().map(i64::from).collect()),
        Nc::Ints(v) => AttributeValue::Ints(v.into_iter().map(i64::from).collect()),
        Nc::Longlongs(v) => AttributeValue::Ints(v),
        Nc::Floats(v) => AttributeValue::Floats(v.into_iter().map(f64::from).collect()),
        Nc::Doubles(v) => AttributeValue::Floats(v),
        _ => return None,
    };
    Some(value)
}

/// Convert a cube attribute value into the narrowest netcdf representation.
pub(crate) fn to_netcdf_attr(value: &AttributeValue) -> netcdf::AttributeValue {
    use netcdf::AttributeValue as Nc;

    match value {
        AttributeValue::Text(s) => Nc::Str(s.clone()),
        AttributeValue::Int(v) => match i32::try_from(*v) {
            Ok(small) => Nc::Int(small),
            Err(_) => Nc::Longlong(*v),
        },
        AttributeValue::Float(v) => Nc::Double(*v),
        AttributeValue::Ints(v) => {
            let small: Result<Vec<i32>, _> = v.iter().map(|&x| i32::try_from(x)).collect();
            match small {
                Ok(small) => Nc::Ints(small),
                Err(_) => Nc::Longlongs(v.clone()),
            }
        }
        AttributeValue::Floats(v) => Nc::Doubles(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_attribute_narrowing() {
        assert!(matches!(
            to_netcdf_attr(&AttributeValue::Int(7)),
            netcdf::AttributeValue::Int(7)
        ));
        assert!(matches!(
            to_netcdf_attr(&AttributeValue::Int(i64::MAX)),
            netcdf::AttributeValue::Longlong(_)
        ));
    }

    #[test]
    fn test_attribute_conversion_back() {
        assert_eq!(
            from_netcdf_attr(netcdf::AttributeValue::Short(3)),
            Some(AttributeValue::Int(3))
        );
        assert_eq!(
            from_netcdf_attr(netcdf::AttributeValue::Str("UK".to_string())),
            Some(AttributeValue::Text("UK".to_string()))
        );
        assert_eq!(
            from_netcdf_attr(netcdf::AttributeValue::Strs(vec!["a".to_string()])),
            None
        );
    }
}
