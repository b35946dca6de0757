//! chrono-backed converters for dates, times and timestamps.
//!
//! Each converter carries a `strftime`-style format. The defaults are ISO 8601.

use crate::converter::TypeConverter;
use crate::error::ConvertError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

macro_rules! format_converter {
    ($name:ident, $target:ty, $default:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            format: String,
        }

        impl $name {
            pub fn with_format(format: impl Into<String>) -> Self {
                Self {
                    format: format.into(),
                }
            }

            pub fn format(&self) -> &str {
                &self.format
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::with_format($default)
            }
        }

        impl TypeConverter<$target> for $name {
            fn convert(&self, value: &str) -> Result<$target, ConvertError> {
                <$target>::parse_from_str(value.trim(), &self.format).map_err(|e| {
                    ConvertError::new(stringify!($target), value).with_source(e)
                })
            }
        }
    };
}

format_converter!(DateConverter, NaiveDate, "%Y-%m-%d");
format_converter!(DateTimeConverter, NaiveDateTime, "%Y-%m-%dT%H:%M:%S");
format_converter!(TimeConverter, NaiveTime, "%H:%M:%S");
