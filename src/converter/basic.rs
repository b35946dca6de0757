//! Built-in converters for strings, booleans, numbers and optional values.

use crate::converter::TypeConverter;
use crate::error::ConvertError;
use std::any::type_name;
use std::error::Error as StdError;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

/// Passes the cell text through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl TypeConverter<String> for StringConverter {
    fn convert(&self, value: &str) -> Result<String, ConvertError> {
        Ok(value.to_string())
    }
}

/// Accepts `true`/`false`/`1`/`0`, case-insensitive, surrounding whitespace ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolConverter;

impl TypeConverter<bool> for BoolConverter {
    fn convert(&self, value: &str) -> Result<bool, ConvertError> {
        let v = value.trim();
        if v.eq_ignore_ascii_case("true") || v == "1" {
            Ok(true)
        } else if v.eq_ignore_ascii_case("false") || v == "0" {
            Ok(false)
        } else {
            Err(ConvertError::new("bool", value))
        }
    }
}

/// Converts via [`FromStr`]. Surrounding whitespace is an error, as with `str::parse`.
pub struct FromStrConverter<T>(PhantomData<fn() -> T>);

impl<T> FromStrConverter<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for FromStrConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TypeConverter<T> for FromStrConverter<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    fn convert(&self, value: &str) -> Result<T, ConvertError> {
        value
            .parse::<T>()
            .map_err(|e| ConvertError::new(type_name::<T>(), value).with_source(e))
    }
}

/// Wraps a converter for `T` into one for `Option<T>`: blank text becomes `None`.
pub struct NullableConverter<T> {
    inner: Arc<dyn TypeConverter<T>>,
}

impl<T> NullableConverter<T> {
    pub fn new(inner: Arc<dyn TypeConverter<T>>) -> Self {
        Self { inner }
    }
}

impl<T> TypeConverter<Option<T>> for NullableConverter<T> {
    fn convert(&self, value: &str) -> Result<Option<T>, ConvertError> {
        if value.trim().is_empty() {
            return Ok(None);
        }
        self.inner.convert(value).map(Some)
    }
}
