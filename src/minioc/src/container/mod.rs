pub mod registry;
pub mod resolver;

mod core;
mod handle;
mod options;
mod parameters;
pub(crate) mod selector;

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::{Arc, Weak};

use crate::util::any::AsAny;

pub use handle::Container;
pub use options::{NamedResolutionFailureAction, ResolveOptions, UnregisteredResolutionAction};
pub use parameters::Parameters;

/// Anything a container can hand out. Objects are always shared through an
/// [`Arc`], so `T` may be unsized, e.g. `dyn Trait`.
pub trait Managed: Send + Sync + 'static {}

impl<T> Managed for T where T: ?Sized + Send + Sync + 'static {}

/// A type-erased `Arc<T>`.
pub trait SharedManaged: AsAny + Send + Sync {
    fn dyn_clone(&self) -> Box<dyn SharedManaged>;

    fn downgrade(&self) -> Box<dyn WeakManaged>;

    /// Returns true if both handles point to the same object.
    fn ptr_eq(&self, other: &dyn SharedManaged) -> bool;
}

impl<T> SharedManaged for Arc<T>
where
    T: Managed + ?Sized,
{
    fn dyn_clone(&self) -> Box<dyn SharedManaged> {
        Box::new(Arc::clone(self))
    }

    fn downgrade(&self) -> Box<dyn WeakManaged> {
        Box::new(Arc::downgrade(self))
    }

    fn ptr_eq(&self, other: &dyn SharedManaged) -> bool {
        other
            .as_any()
            .downcast_ref::<Arc<T>>()
            .is_some_and(|other| Arc::ptr_eq(self, other))
    }
}

impl dyn SharedManaged {
    /// Recovers the typed handle if the erased object is an `Arc<T>`.
    pub fn downcast_arc<T>(&self) -> Option<Arc<T>>
    where
        T: Managed + ?Sized,
    {
        self.as_any().downcast_ref::<Arc<T>>().cloned()
    }
}

impl Debug for dyn SharedManaged {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.type_name())
    }
}

/// A type-erased `Weak<T>`.
pub trait WeakManaged: Send + Sync {
    fn upgrade(&self) -> Option<Box<dyn SharedManaged>>;
}

impl<T> WeakManaged for Weak<T>
where
    T: Managed + ?Sized,
{
    fn upgrade(&self) -> Option<Box<dyn SharedManaged>> {
        Weak::upgrade(self).map(|object| -> Box<dyn SharedManaged> { Box::new(object) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape: Send + Sync {
        fn sides(&self) -> u32;
    }

    struct Square;

    impl Shape for Square {
        fn sides(&self) -> u32 {
            4
        }
    }

    #[test]
    fn shared_managed_downcast_succeeds_for_unsized_targets() {
        let shape: Arc<dyn Shape> = Arc::new(Square);
        let erased: Box<dyn SharedManaged> = Box::new(Arc::clone(&shape));

        let recovered = erased.downcast_arc::<dyn Shape>().unwrap();
        assert_eq!(recovered.sides(), 4);
        assert!(Arc::ptr_eq(&shape, &recovered));
        assert!(erased.downcast_arc::<Square>().is_none());
    }

    #[test]
    fn shared_managed_ptr_eq_succeeds() {
        let first: Box<dyn SharedManaged> = Box::new(Arc::new(1i32));
        let clone = first.dyn_clone();
        let second: Box<dyn SharedManaged> = Box::new(Arc::new(1i32));

        assert!(first.ptr_eq(clone.as_ref()));
        assert!(!first.ptr_eq(second.as_ref()));
    }

    #[test]
    fn weak_managed_upgrade_fails_after_release() {
        let object: Box<dyn SharedManaged> = Box::new(Arc::new(String::from("value")));
        let weak = object.downgrade();

        assert!(weak.upgrade().is_some());
        drop(object);
        assert!(weak.upgrade().is_none());
    }
}
