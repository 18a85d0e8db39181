use std::sync::Arc;

use crate::container::{Managed, SharedManaged};
use crate::introspect::{Injectable, TypeInfo};

/// Converts a shared implementation into the shared form of a type it is
/// registered as.
///
/// Every type upcasts to itself. Trait objects need an implementation, which
/// is usually written by [`upcast!`](crate::upcast) or
/// `#[injectable(implements(...))]`.
pub trait Upcast<I: ?Sized>: Managed {
    fn upcast(self: Arc<Self>) -> Arc<I>;
}

impl<T> Upcast<T> for T
where
    T: Managed + ?Sized,
{
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

type Caster = fn(Box<dyn SharedManaged>) -> Box<dyn SharedManaged>;

/// The concrete type behind a registration together with the conversion from
/// its objects to the registered type.
#[derive(Clone)]
pub struct Implementation {
    info: TypeInfo,
    cast: Caster,
}

impl Implementation {
    /// Describes `C` registered as `I`.
    pub fn new<I, C>() -> Self
    where
        I: Managed + ?Sized,
        C: Injectable + Upcast<I> + ?Sized,
    {
        Self {
            info: C::type_info(),
            cast: upcast_erased::<I, C>,
        }
    }

    /// Describes a type registered as itself.
    pub(crate) fn of_self(info: TypeInfo) -> Self {
        Self {
            info,
            cast: identity,
        }
    }

    pub fn info(&self) -> &TypeInfo {
        &self.info
    }

    /// Turns an erased `Arc<C>` into an erased `Arc<I>`.
    pub(crate) fn cast(&self, object: Box<dyn SharedManaged>) -> Box<dyn SharedManaged> {
        (self.cast)(object)
    }
}

impl std::fmt::Debug for Implementation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Implementation")
            .field(&self.info.name())
            .finish()
    }
}

fn upcast_erased<I, C>(object: Box<dyn SharedManaged>) -> Box<dyn SharedManaged>
where
    I: Managed + ?Sized,
    C: Upcast<I> + ?Sized,
{
    match object.downcast_arc::<C>() {
        Some(object) => Box::new(<C as Upcast<I>>::upcast(object)),
        None => unreachable!("the constructed object should be of the implementation type"),
    }
}

fn identity(object: Box<dyn SharedManaged>) -> Box<dyn SharedManaged> {
    object
}
