//! Type descriptions the container needs to build objects on its own.
//!
//! Rust has no runtime reflection, so every type the container works with
//! describes itself through [`Injectable::type_info`]: whether it is concrete,
//! abstract or a plain value, which constructors it offers and what each of
//! them needs. The [`injectable`](crate::injectable) attribute writes these
//! descriptions for ordinary `impl` blocks; [`TypeInfo::concrete`] and friends
//! are the manual route.

mod constructor;
mod upcast;

use std::any::{self, Any, TypeId};
use std::error::Error;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::{Managed, SharedManaged};
use crate::dispose::{Dispose, Disposer};

pub use constructor::{ArgumentError, Arguments, ConstructorInfo, ParameterInfo, ParameterKind};
pub(crate) use constructor::Argument;
pub use upcast::{Implementation, Upcast};

pub type BoxError = Box<dyn Error + Send + Sync>;

type DisposerFactory = fn(&dyn Any) -> Option<Disposer>;

/// A type the container can describe, and thus register or resolve.
///
/// # Examples
///
/// ```rust
/// # use std::sync::Arc;
/// # use minioc::introspect::{Injectable, ParameterInfo, TypeInfo};
/// struct Port(u16);
///
/// struct Server {
///     port: Arc<Port>,
/// }
///
/// impl Injectable for Port {
///     fn type_info() -> TypeInfo {
///         TypeInfo::concrete::<Self>()
///             .constructor(vec![], |_| Ok(Port(8080)))
///             .build()
///     }
/// }
///
/// impl Injectable for Server {
///     fn type_info() -> TypeInfo {
///         TypeInfo::concrete::<Self>()
///             .constructor(vec![ParameterInfo::new::<Port>("port")], |args| {
///                 Ok(Server { port: args.next()? })
///             })
///             .build()
///     }
/// }
///
/// let info = TypeInfo::of::<Server>();
/// assert_eq!(info.constructors().len(), 1);
/// assert_eq!(info.constructors()[0].parameters()[0].name(), Some("port"));
/// ```
pub trait Injectable: Managed {
    fn type_info() -> TypeInfo;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A type with constructors the container may call.
    Concrete,
    /// A trait object. It can only be produced by a registration.
    Abstract,
    /// A primitive or other plain value. It is never auto-constructed.
    Value,
}

/// The shared description of one type.
#[derive(Clone)]
pub struct TypeInfo {
    inner: Arc<TypeInfoInner>,
}

struct TypeInfoInner {
    id: TypeId,
    name: &'static str,
    kind: TypeKind,
    constructors: Vec<ConstructorInfo>,
    disposer: Option<DisposerFactory>,
}

impl TypeInfo {
    pub fn of<T>() -> Self
    where
        T: Injectable + ?Sized,
    {
        T::type_info()
    }

    pub fn concrete<T>() -> TypeInfoBuilder<T>
    where
        T: Managed + ?Sized,
    {
        TypeInfoBuilder::new(TypeKind::Concrete)
    }

    pub fn interface<T>() -> TypeInfoBuilder<T>
    where
        T: Managed + ?Sized,
    {
        TypeInfoBuilder::new(TypeKind::Abstract)
    }

    pub fn value<T>() -> TypeInfoBuilder<T>
    where
        T: Managed + ?Sized,
    {
        TypeInfoBuilder::new(TypeKind::Value)
    }

    pub fn id(&self) -> TypeId {
        self.inner.id
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn kind(&self) -> TypeKind {
        self.inner.kind
    }

    pub fn is_abstract(&self) -> bool {
        self.inner.kind == TypeKind::Abstract
    }

    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.inner.constructors
    }

    pub fn is_disposable(&self) -> bool {
        self.inner.disposer.is_some()
    }

    /// Binds a disposer to `object` if this type is disposable and `object`
    /// is an `Arc` of it.
    pub(crate) fn disposer_for(&self, object: &dyn SharedManaged) -> Option<Disposer> {
        self.inner
            .disposer
            .and_then(|disposer| disposer(object.as_any()))
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for TypeInfo {}

impl Debug for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TypeInfo")
            .field("name", &self.inner.name)
            .field("kind", &self.inner.kind)
            .field("constructors", &self.inner.constructors)
            .field("disposable", &self.is_disposable())
            .finish()
    }
}

pub struct TypeInfoBuilder<T: ?Sized> {
    kind: TypeKind,
    constructors: Vec<ConstructorInfo>,
    disposer: Option<DisposerFactory>,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<T> TypeInfoBuilder<T>
where
    T: Managed + ?Sized,
{
    fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            constructors: Vec::new(),
            disposer: None,
            _marker: PhantomData,
        }
    }

    /// Makes the container dispose objects of this type it owns.
    pub fn disposable(mut self) -> Self
    where
        T: Dispose,
    {
        self.disposer = Some(Disposer::erased::<T>);
        self
    }

    pub fn build(self) -> TypeInfo {
        TypeInfo {
            inner: Arc::new(TypeInfoInner {
                id: TypeId::of::<T>(),
                name: any::type_name::<T>(),
                kind: self.kind,
                constructors: self.constructors,
                disposer: self.disposer,
            }),
        }
    }
}

impl<T> TypeInfoBuilder<T>
where
    T: Managed,
{
    /// Adds a constructor. Its index is the number of constructors added
    /// before it.
    pub fn constructor<F>(mut self, parameters: Vec<ParameterInfo>, invoke: F) -> Self
    where
        F: Fn(&mut Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.constructors
            .push(ConstructorInfo::new(parameters, invoke));
        self
    }

    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(Vec::new(), |_| Ok(T::default()))
    }
}

macro_rules! impl_value_injectable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Injectable for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::value::<Self>().build()
                }
            }
        )*
    };
}

impl_value_injectable!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
);

/// Declares trait objects as abstract types.
///
/// ```rust
/// # use minioc::interface;
/// # use minioc::introspect::TypeInfo;
/// trait Logger: Send + Sync {}
///
/// interface!(dyn Logger);
///
/// assert!(TypeInfo::of::<dyn Logger>().is_abstract());
/// ```
#[macro_export]
macro_rules! interface {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::introspect::Injectable for $ty {
                fn type_info() -> $crate::introspect::TypeInfo {
                    $crate::introspect::TypeInfo::interface::<Self>().build()
                }
            }
        )+
    };
}

/// Declares that a concrete type may be registered as an implementation of
/// trait objects.
///
/// ```rust
/// # use std::sync::Arc;
/// # use minioc::{interface, upcast};
/// # use minioc::introspect::Upcast;
/// trait Logger: Send + Sync {}
///
/// struct StdoutLogger;
///
/// impl Logger for StdoutLogger {}
///
/// interface!(dyn Logger);
/// upcast!(StdoutLogger => dyn Logger);
///
/// let logger: Arc<dyn Logger> = Upcast::<dyn Logger>::upcast(Arc::new(StdoutLogger));
/// # let _ = logger;
/// ```
#[macro_export]
macro_rules! upcast {
    ($concrete:ty => $($interface:ty),+ $(,)?) => {
        $(
            impl $crate::introspect::Upcast<$interface> for $concrete {
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$interface> {
                    self
                }
            }
        )+
    };
}
