use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::{Managed, SharedManaged};

/// Caller-supplied constructor arguments, keyed by parameter name.
///
/// A constructor parameter whose name appears here receives the supplied value
/// verbatim instead of being resolved, even if the container could resolve
/// its type. Names match exactly. Values are passed as the parameter's
/// declared type, so a parameter declared as `Arc<dyn Trait>` needs an
/// `Arc<dyn Trait>` value.
///
/// # Examples
///
/// ```rust
/// # use std::sync::Arc;
/// # use minioc::container::Parameters;
/// let parameters = Parameters::new().with("retries", Arc::new(3u32));
/// assert!(parameters.contains("retries"));
/// assert!(!parameters.contains("Retries"));
/// ```
#[derive(Default)]
pub struct Parameters {
    values: HashMap<String, Box<dyn SharedManaged>>,
}

impl Parameters {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn with<T>(mut self, name: &str, value: Arc<T>) -> Self
    where
        T: Managed + ?Sized,
    {
        self.insert(name, value);
        self
    }

    pub fn insert<T>(&mut self, name: &str, value: Arc<T>)
    where
        T: Managed + ?Sized,
    {
        self.values.insert(name.to_owned(), Box::new(value));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Box<dyn SharedManaged>> {
        self.values.get(name).map(|value| value.dyn_clone())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl Clone for Parameters {
    fn clone(&self) -> Self {
        Self {
            values: self
                .values
                .iter()
                .map(|(name, value)| (name.clone(), value.dyn_clone()))
                .collect(),
        }
    }
}

impl Debug for Parameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_map().entries(self.values.iter()).finish()
    }
}
