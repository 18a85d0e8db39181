//! Explicit teardown of container-owned objects.

use std::any::Any;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

/// A type whose objects need structured teardown when the container that owns
/// them releases them.
///
/// Dropping the last [`Arc`] already frees an object's memory. [`Dispose`] is
/// for the work that should happen at a well-defined point even while callers
/// still hold references, such as flushing buffers or closing connections.
///
/// A type opts in through its [`TypeInfo`], either with
/// [`TypeInfoBuilder::disposable`] or `#[injectable(dispose)]`. The container
/// then disposes registered instances and cached singletons of that type
/// exactly once: when their registration is replaced or removed, or when the
/// container itself is disposed. Objects produced by multi-instance
/// registrations are owned by the caller and never disposed by the container.
///
/// [`TypeInfo`]: crate::introspect::TypeInfo
/// [`TypeInfoBuilder::disposable`]: crate::introspect::TypeInfoBuilder::disposable
pub trait Dispose: Send + Sync + 'static {
    fn dispose(&self);
}

/// A pending [`Dispose::dispose`] call bound to one object.
pub struct Disposer {
    hook: Box<dyn FnOnce() + Send + Sync>,
}

impl Disposer {
    pub fn new<T>(object: Arc<T>) -> Self
    where
        T: Dispose + ?Sized,
    {
        Self {
            hook: Box::new(move || object.dispose()),
        }
    }

    /// Binds to `object` if it is an `Arc<T>`.
    pub(crate) fn erased<T>(object: &dyn Any) -> Option<Self>
    where
        T: Dispose + ?Sized,
    {
        object
            .downcast_ref::<Arc<T>>()
            .map(|object| Self::new(Arc::clone(object)))
    }

    pub fn run(self) {
        (self.hook)();
    }
}

impl Debug for Disposer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Disposer").finish_non_exhaustive()
    }
}
