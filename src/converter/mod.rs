//! Type converters: turn the raw text of one cell into a typed value.
//!
//! The [`TypeConverter`] trait is the whole contract the mapping layer relies on. A
//! [`TypeConverterProvider`] resolves a target type to a converter at configuration time; a
//! missing registration is a [`ConfigError`], never a per-row failure.
//!
//! # Example
//! ```
//! use csvbeam::converter::{TypeConverter, TypeConverterProvider};
//!
//! let provider = TypeConverterProvider::default();
//! let ints = provider.resolve::<i32>().unwrap();
//! assert_eq!(ints.convert("42").unwrap(), 42);
//! assert!(ints.convert("forty-two").is_err());
//! ```

pub mod basic;
#[cfg(feature = "datetime")]
pub mod datetime;

use crate::error::{ConfigError, ConvertError};
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use basic::{BoolConverter, FromStrConverter, NullableConverter, StringConverter};
#[cfg(feature = "datetime")]
pub use datetime::{DateConverter, DateTimeConverter, TimeConverter};

/// Converts cell text into a `T`.
pub trait TypeConverter<T>: Send + Sync {
    /// # Errors
    /// Returns a [`ConvertError`] when `value` is not a valid `T`.
    fn convert(&self, value: &str) -> Result<T, ConvertError>;
}

/// Adapts any closure into a [`TypeConverter`].
pub struct FnConverter<F>(pub F);

impl<T, F> TypeConverter<T> for FnConverter<F>
where
    F: Fn(&str) -> Result<T, ConvertError> + Send + Sync,
{
    fn convert(&self, value: &str) -> Result<T, ConvertError> {
        (self.0)(value)
    }
}

/// Registry of converters keyed by target type.
///
/// [`Default`] registers the built-in converters; [`TypeConverterProvider::empty`] starts with
/// none.
#[derive(Clone)]
pub struct TypeConverterProvider {
    // Each value is an `Arc<dyn TypeConverter<T>>` for the `T` of its key.
    converters: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl TypeConverterProvider {
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Register `converter` for `T`, replacing any existing registration.
    pub fn register<T, C>(&mut self, converter: C) -> &mut Self
    where
        T: 'static,
        C: TypeConverter<T> + 'static,
    {
        let shared: Arc<dyn TypeConverter<T>> = Arc::new(converter);
        self.converters.insert(TypeId::of::<T>(), Arc::new(shared));
        self
    }

    /// Register `converter` for `T` and `NullableConverter` over it for `Option<T>`.
    pub fn register_with_nullable<T, C>(&mut self, converter: C) -> &mut Self
    where
        T: Send + Sync + 'static,
        C: TypeConverter<T> + 'static,
    {
        let shared: Arc<dyn TypeConverter<T>> = Arc::new(converter);
        self.converters
            .insert(TypeId::of::<T>(), Arc::new(Arc::clone(&shared)));
        let nullable: Arc<dyn TypeConverter<Option<T>>> =
            Arc::new(NullableConverter::new(shared));
        self.converters
            .insert(TypeId::of::<Option<T>>(), Arc::new(nullable));
        self
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.converters.contains_key(&TypeId::of::<T>())
    }

    /// Resolve the converter registered for `T`.
    ///
    /// # Errors
    /// Returns [`ConfigError::NoConverter`] when nothing is registered for `T`.
    pub fn resolve<T: 'static>(&self) -> Result<Arc<dyn TypeConverter<T>>, ConfigError> {
        self.converters
            .get(&TypeId::of::<T>())
            .and_then(|c| c.downcast_ref::<Arc<dyn TypeConverter<T>>>())
            .cloned()
            .ok_or(ConfigError::NoConverter {
                type_name: type_name::<T>(),
            })
    }
}

impl Default for TypeConverterProvider {
    fn default() -> Self {
        let mut provider = Self::empty();
        provider.register_with_nullable(StringConverter);
        provider.register_with_nullable(BoolConverter);
        provider.register_with_nullable(FromStrConverter::<char>::new());
        provider.register_with_nullable(FromStrConverter::<i8>::new());
        provider.register_with_nullable(FromStrConverter::<i16>::new());
        provider.register_with_nullable(FromStrConverter::<i32>::new());
        provider.register_with_nullable(FromStrConverter::<i64>::new());
        provider.register_with_nullable(FromStrConverter::<i128>::new());
        provider.register_with_nullable(FromStrConverter::<isize>::new());
        provider.register_with_nullable(FromStrConverter::<u8>::new());
        provider.register_with_nullable(FromStrConverter::<u16>::new());
        provider.register_with_nullable(FromStrConverter::<u32>::new());
        provider.register_with_nullable(FromStrConverter::<u64>::new());
        provider.register_with_nullable(FromStrConverter::<u128>::new());
        provider.register_with_nullable(FromStrConverter::<usize>::new());
        provider.register_with_nullable(FromStrConverter::<f32>::new());
        provider.register_with_nullable(FromStrConverter::<f64>::new());
        #[cfg(feature = "datetime")]
        {
            provider.register_with_nullable(DateConverter::default());
            provider.register_with_nullable(DateTimeConverter::default());
            provider.register_with_nullable(TimeConverter::default());
        }
        provider
    }
}

impl fmt::Debug for TypeConverterProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeConverterProvider")
            .field("registered", &self.converters.len())
            .finish()
    }
}
