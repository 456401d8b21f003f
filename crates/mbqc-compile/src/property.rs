//! `PropertySet` for pass communication.
//!
//! Passes publish their findings (statistics, the audit result) as typed
//! properties, keyed by type.
//!
//! ```
//! use mbqc_compile::PropertySet;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Counter(usize);
//!
//! let mut props = PropertySet::new();
//! props.insert(Counter(3));
//! assert_eq!(props.get::<Counter>(), Some(&Counter(3)));
//! ```

use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};

use crate::options::CompileOptions;

/// Shared context handed to every pass.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Options the pipeline was built with.
    pub options: CompileOptions,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a property set carrying the given options.
    #[must_use]
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}
