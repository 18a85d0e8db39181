#![allow(clippy::new_without_default)]

extern crate self as minioc;

pub mod container;
pub mod dispose;
pub mod global;
pub mod introspect;
pub mod key;
pub mod strategy;
mod util;

pub use minioc_derive::injectable;

pub mod prelude {
    pub use crate::container::registry::{RegisterOptions, RegistrationError};
    pub use crate::container::resolver::{Resolver, ResolutionError, TypedResolver};
    pub use crate::container::{
        Container, NamedResolutionFailureAction, Parameters, ResolveOptions,
        UnregisteredResolutionAction,
    };
    pub use crate::dispose::Dispose;
    pub use crate::injectable;
    pub use crate::introspect::{Injectable, TypeInfo, Upcast};
    pub use crate::key::TypeKey;
    pub use crate::{interface, upcast};
}
