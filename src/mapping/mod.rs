//! Column mapping table and row mapper.
//!
//! A [`CsvMapping`] is an ordered, immutable list of column bindings built once per schema by
//! [`CsvMappingBuilder`] (explicit indices) or [`HeaderMappingBuilder`] (header names). It is
//! shared read-only by all workers and turns each tokenized row into a
//! [`CsvMappingResult`].
//!
//! # Example
//! ```
//! use csvbeam::mapping::CsvMapping;
//!
//! #[derive(Default)]
//! struct Person {
//!     first_name: String,
//!     age: u32,
//! }
//!
//! # fn main() -> Result<(), csvbeam::ConfigError> {
//! let mapping = CsvMapping::<Person>::builder()
//!     .map(0, |p: &mut Person, v: String| p.first_name = v)?
//!     .map(1, |p: &mut Person, v: u32| p.age = v)?
//!     .build();
//!
//! let fields = vec!["Philipp".to_string(), "38".to_string()];
//! let person = mapping.map(0, &fields).ok().unwrap();
//! assert_eq!(person.age, 38);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod property;
pub mod result;

use crate::error::CsvMappingError;
use crate::row::TokenizedRow;
use std::fmt;

pub use builder::{CsvMappingBuilder, HeaderMappingBuilder};
pub use property::{CsvPropertyMapping, IndexToPropertyMapping, PropertyMapping};
pub use result::{CsvMappingResult, partition_results};

/// Ordered column bindings for entity type `E`. Column indices are unique.
pub struct CsvMapping<E> {
    mappings: Vec<IndexToPropertyMapping<E>>,
}

impl<E> CsvMapping<E> {
    pub(crate) fn from_mappings(mappings: Vec<IndexToPropertyMapping<E>>) -> Self {
        Self { mappings }
    }

    /// Number of bound columns.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Bound column indices, in application order.
    pub fn column_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.mappings.iter().map(|m| m.column_index)
    }
}

impl<E: Default + 'static> CsvMapping<E> {
    /// Start an index-based mapping using the default converters.
    pub fn builder() -> CsvMappingBuilder<E> {
        CsvMappingBuilder::new()
    }
}

impl<E: Default> CsvMapping<E> {
    /// Map one tokenized row.
    ///
    /// Bindings are applied in table order. The first out-of-range column or failed conversion
    /// ends the row with a failure; a partially populated entity is never returned.
    pub fn map(&self, row_index: usize, fields: &[String]) -> CsvMappingResult<E> {
        let mut entity = E::default();

        for mapping in &self.mappings {
            let column_index = mapping.column_index;
            let Some(value) = fields.get(column_index) else {
                return CsvMappingResult::Failure {
                    row_index,
                    error: CsvMappingError::column_index(column_index),
                };
            };
            if let Err(e) = mapping.property.try_map_value(&mut entity, value) {
                return CsvMappingResult::Failure {
                    row_index,
                    error: CsvMappingError::conversion(column_index, value, e),
                };
            }
        }

        CsvMappingResult::Success { row_index, entity }
    }

    pub fn map_row(&self, row: &TokenizedRow) -> CsvMappingResult<E> {
        self.map(row.index, &row.fields)
    }
}

impl<E> fmt::Debug for CsvMapping<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvMapping")
            .field("mappings", &self.mappings)
            .finish()
    }
}
