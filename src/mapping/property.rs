//! Typed setters bound to converters.

use crate::converter::TypeConverter;
use crate::error::ConvertError;
use std::fmt;
use std::sync::Arc;

/// Converts one cell and stores the value on an entity.
pub trait PropertyMapping<E>: Send + Sync {
    /// # Errors
    /// Returns the converter's [`ConvertError`]; the entity is left untouched in that case.
    fn try_map_value(&self, entity: &mut E, value: &str) -> Result<(), ConvertError>;
}

type Setter<E, T> = Box<dyn Fn(&mut E, T) + Send + Sync>;

/// A setter for a `T`-typed property plus the converter producing that `T`.
pub struct CsvPropertyMapping<E, T> {
    setter: Setter<E, T>,
    converter: Arc<dyn TypeConverter<T>>,
}

impl<E, T> CsvPropertyMapping<E, T> {
    pub fn new<F>(setter: F, converter: Arc<dyn TypeConverter<T>>) -> Self
    where
        F: Fn(&mut E, T) + Send + Sync + 'static,
    {
        Self {
            setter: Box::new(setter),
            converter,
        }
    }
}

impl<E, T> PropertyMapping<E> for CsvPropertyMapping<E, T> {
    fn try_map_value(&self, entity: &mut E, value: &str) -> Result<(), ConvertError> {
        let converted = self.converter.convert(value)?;
        (self.setter)(entity, converted);
        Ok(())
    }
}

/// A column index bound to a property mapping.
pub struct IndexToPropertyMapping<E> {
    pub column_index: usize,
    pub property: Arc<dyn PropertyMapping<E>>,
}

impl<E> Clone for IndexToPropertyMapping<E> {
    fn clone(&self) -> Self {
        Self {
            column_index: self.column_index,
            property: Arc::clone(&self.property),
        }
    }
}

impl<E> fmt::Debug for IndexToPropertyMapping<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexToPropertyMapping")
            .field("column_index", &self.column_index)
            .finish_non_exhaustive()
    }
}
