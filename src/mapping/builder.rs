//! Configuration-time construction of a [`CsvMapping`].
//!
//! Every check happens here, before any row is parsed: duplicate bindings, unresolvable
//! converters, and (for name-based mappings) header mismatches are [`ConfigError`]s.

use crate::converter::{TypeConverter, TypeConverterProvider};
use crate::error::ConfigError;
use crate::mapping::CsvMapping;
use crate::mapping::property::{CsvPropertyMapping, IndexToPropertyMapping, PropertyMapping};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Builds a mapping from explicit column indices.
pub struct CsvMappingBuilder<E> {
    provider: TypeConverterProvider,
    mappings: Vec<IndexToPropertyMapping<E>>,
}

impl<E: 'static> CsvMappingBuilder<E> {
    /// Builder resolving converters from [`TypeConverterProvider::default`].
    pub fn new() -> Self {
        Self::with_provider(TypeConverterProvider::default())
    }

    pub fn with_provider(provider: TypeConverterProvider) -> Self {
        Self {
            provider,
            mappings: Vec::new(),
        }
    }

    /// Bind `column_index` to `setter`, converting with the provider's converter for `T`.
    ///
    /// # Errors
    /// [`ConfigError::DuplicateColumnIndex`] if the column is already bound, or
    /// [`ConfigError::NoConverter`] if no converter is registered for `T`.
    pub fn map<T, F>(self, column_index: usize, setter: F) -> Result<Self, ConfigError>
    where
        T: 'static,
        F: Fn(&mut E, T) + Send + Sync + 'static,
    {
        self.ensure_unbound(column_index)?;
        let converter = self.provider.resolve::<T>()?;
        Ok(self.push(column_index, setter, converter))
    }

    /// Bind `column_index` to `setter` with an explicit converter.
    ///
    /// # Errors
    /// [`ConfigError::DuplicateColumnIndex`] if the column is already bound.
    pub fn map_with<T, F, C>(
        self,
        column_index: usize,
        setter: F,
        converter: C,
    ) -> Result<Self, ConfigError>
    where
        T: 'static,
        F: Fn(&mut E, T) + Send + Sync + 'static,
        C: TypeConverter<T> + 'static,
    {
        self.ensure_unbound(column_index)?;
        Ok(self.push(column_index, setter, Arc::new(converter)))
    }

    fn ensure_unbound(&self, column_index: usize) -> Result<(), ConfigError> {
        if self.mappings.iter().any(|m| m.column_index == column_index) {
            return Err(ConfigError::DuplicateColumnIndex {
                index: column_index,
            });
        }
        Ok(())
    }

    fn push<T, F>(
        mut self,
        column_index: usize,
        setter: F,
        converter: Arc<dyn TypeConverter<T>>,
    ) -> Self
    where
        T: 'static,
        F: Fn(&mut E, T) + Send + Sync + 'static,
    {
        self.mappings.push(IndexToPropertyMapping {
            column_index,
            property: Arc::new(CsvPropertyMapping::new(setter, converter)),
        });
        self
    }

    pub fn build(self) -> CsvMapping<E> {
        debug!(columns = self.mappings.len(), "built index-based mapping");
        CsvMapping::from_mappings(self.mappings)
    }
}

impl<E: 'static> Default for CsvMappingBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a mapping from column names, resolved against a header row.
///
/// Header columns without a binding are ignored. The resulting table is ordered by header
/// position.
pub struct HeaderMappingBuilder<E> {
    provider: TypeConverterProvider,
    bindings: Vec<(String, Arc<dyn PropertyMapping<E>>)>,
}

impl<E: 'static> HeaderMappingBuilder<E> {
    pub fn new() -> Self {
        Self::with_provider(TypeConverterProvider::default())
    }

    pub fn with_provider(provider: TypeConverterProvider) -> Self {
        Self {
            provider,
            bindings: Vec::new(),
        }
    }

    /// Bind column `name` to `setter`, converting with the provider's converter for `T`.
    ///
    /// # Errors
    /// [`ConfigError::DuplicateColumnName`] if `name` is already bound, or
    /// [`ConfigError::NoConverter`] if no converter is registered for `T`.
    pub fn map<T, F>(self, name: impl Into<String>, setter: F) -> Result<Self, ConfigError>
    where
        T: 'static,
        F: Fn(&mut E, T) + Send + Sync + 'static,
    {
        let name = name.into();
        self.ensure_unbound(&name)?;
        let converter = self.provider.resolve::<T>()?;
        Ok(self.push(name, setter, converter))
    }

    /// Bind column `name` to `setter` with an explicit converter.
    ///
    /// # Errors
    /// [`ConfigError::DuplicateColumnName`] if `name` is already bound.
    pub fn map_with<T, F, C>(
        self,
        name: impl Into<String>,
        setter: F,
        converter: C,
    ) -> Result<Self, ConfigError>
    where
        T: 'static,
        F: Fn(&mut E, T) + Send + Sync + 'static,
        C: TypeConverter<T> + 'static,
    {
        let name = name.into();
        self.ensure_unbound(&name)?;
        Ok(self.push(name, setter, Arc::new(converter)))
    }

    fn ensure_unbound(&self, name: &str) -> Result<(), ConfigError> {
        if self.bindings.iter().any(|(n, _)| n == name) {
            return Err(ConfigError::DuplicateColumnName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn push<T, F>(mut self, name: String, setter: F, converter: Arc<dyn TypeConverter<T>>) -> Self
    where
        T: 'static,
        F: Fn(&mut E, T) + Send + Sync + 'static,
    {
        let property: Arc<dyn PropertyMapping<E>> =
            Arc::new(CsvPropertyMapping::new(setter, converter));
        self.bindings.push((name, property));
        self
    }

    /// Resolve the bound names against `header`.
    ///
    /// # Errors
    /// [`ConfigError::MissingHeader`] for an empty header, [`ConfigError::UnknownColumn`] when a
    /// bound name is absent, [`ConfigError::DuplicateHeaderColumn`] when a bound name occurs
    /// more than once.
    pub fn build<S: AsRef<str>>(&self, header: &[S]) -> Result<CsvMapping<E>, ConfigError> {
        if header.is_empty() {
            return Err(ConfigError::MissingHeader);
        }

        let mut positions: HashMap<&str, usize> = HashMap::with_capacity(header.len());
        for (pos, name) in header.iter().enumerate() {
            let name = name.as_ref();
            let bound = self.bindings.iter().any(|(n, _)| n == name);
            if positions.insert(name, pos).is_some() && bound {
                return Err(ConfigError::DuplicateHeaderColumn {
                    name: name.to_string(),
                });
            }
        }

        let mut mappings = Vec::with_capacity(self.bindings.len());
        for (name, property) in &self.bindings {
            let column_index = *positions
                .get(name.as_str())
                .ok_or_else(|| ConfigError::UnknownColumn { name: name.clone() })?;
            mappings.push(IndexToPropertyMapping {
                column_index,
                property: Arc::clone(property),
            });
        }
        mappings.sort_by_key(|m| m.column_index);

        debug!(
            columns = mappings.len(),
            header_len = header.len(),
            "built header-based mapping"
        );
        Ok(CsvMapping::from_mappings(mappings))
    }
}

impl<E: 'static> Default for HeaderMappingBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}
