use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::container::resolver::ConstructionError;
use crate::container::{SharedManaged, WeakManaged};
use crate::dispose::Disposer;
use crate::introspect::{Implementation, Injectable, TypeInfo};

/// Always hands out the same pre-built object.
pub struct InstanceStrategy {
    object: Box<dyn SharedManaged>,
    implementation: Implementation,
    disposer: Mutex<Option<Disposer>>,
}

impl InstanceStrategy {
    /// Stores `object`. It is disposed with the registration if `T` is
    /// disposable.
    pub fn new<T>(object: Arc<T>) -> Self
    where
        T: Injectable + ?Sized,
    {
        Self::from_erased(Box::new(object), Implementation::of_self(T::type_info()))
    }

    fn from_erased(object: Box<dyn SharedManaged>, implementation: Implementation) -> Self {
        let disposer = implementation.info().disposer_for(object.as_ref());
        Self {
            object,
            implementation,
            disposer: Mutex::new(disposer),
        }
    }

    pub fn produce(&self) -> Box<dyn SharedManaged> {
        self.object.dyn_clone()
    }

    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    /// Gives up ownership, keeping only a weak handle.
    pub fn downgrade(&self) -> WeakInstanceStrategy {
        WeakInstanceStrategy {
            object: self.object.downgrade(),
            implementation: self.implementation.clone(),
        }
    }

    pub fn dispose(&self) {
        if let Some(disposer) = self.disposer.lock().take() {
            debug!(type_name = self.type_info().name(), "disposing instance");
            disposer.run();
        }
    }

    fn type_info(&self) -> &TypeInfo {
        self.implementation.info()
    }
}

impl Debug for InstanceStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("InstanceStrategy")
            .field("object", &self.object)
            .field("disposable", &self.disposer.lock().is_some())
            .finish()
    }
}

/// Hands out an object it does not own for as long as someone else keeps it
/// alive.
pub struct WeakInstanceStrategy {
    object: Box<dyn WeakManaged>,
    implementation: Implementation,
}

impl WeakInstanceStrategy {
    pub fn new<T>(object: &Arc<T>) -> Self
    where
        T: Injectable + ?Sized,
    {
        Self::from_weak(Arc::downgrade(object))
    }

    pub fn from_weak<T>(object: Weak<T>) -> Self
    where
        T: Injectable + ?Sized,
    {
        Self {
            object: Box::new(object),
            implementation: Implementation::of_self(T::type_info()),
        }
    }

    pub fn produce(&self) -> Result<Box<dyn SharedManaged>, ConstructionError> {
        self.object.upgrade().ok_or(ConstructionError::Released)
    }

    pub fn is_alive(&self) -> bool {
        self.object.upgrade().is_some()
    }

    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    /// Takes ownership of the object again if it is still alive.
    pub fn upgrade(&self) -> Option<InstanceStrategy> {
        self.object
            .upgrade()
            .map(|object| InstanceStrategy::from_erased(object, self.implementation.clone()))
    }
}

impl Debug for WeakInstanceStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("WeakInstanceStrategy")
            .field("implementation", &self.implementation)
            .field("alive", &self.is_alive())
            .finish()
    }
}
