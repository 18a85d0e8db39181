mod context;
mod proxy;

use std::error::Error;
use std::sync::Arc;

use snafu::prelude::*;

use crate::container::{Managed, Parameters, ResolveOptions, SharedManaged};
use crate::introspect::{Injectable, TypeInfo};
use crate::key::TypeKey;

pub use context::{CallContext, Keys};
pub(crate) use proxy::ContextForwardingResolver;

/// The object-safe resolution interface of a container.
///
/// The `*_dependency` variants are used while another object is being
/// constructed and carry the chain of objects under construction, which lets
/// cyclic dependencies fail instead of recursing forever.
#[cfg_attr(test, mockall::automock)]
pub trait Resolver: Send + Sync {
    fn dyn_resolve(&self, request: &Request) -> Result<Box<dyn SharedManaged>, ResolutionError>;

    fn dyn_resolve_dependency<'a>(
        &self,
        request: &Request,
        context: &'a CallContext<'a>,
    ) -> Result<Box<dyn SharedManaged>, ResolutionError>;

    /// Predicts whether [`Resolver::dyn_resolve`] would succeed without
    /// constructing anything. Factories and instances are assumed to succeed.
    fn dyn_can_resolve(&self, request: &Request) -> bool;

    fn dyn_can_resolve_dependency<'a>(
        &self,
        request: &Request,
        context: &'a CallContext<'a>,
    ) -> bool;

    /// Resolves every registration of the requested type, ordered by name.
    fn dyn_resolve_all(
        &self,
        info: &TypeInfo,
        include_unnamed: bool,
    ) -> Result<Vec<Box<dyn SharedManaged>>, ResolutionError>;

    fn dyn_resolve_all_dependency<'a>(
        &self,
        info: &TypeInfo,
        include_unnamed: bool,
        context: &'a CallContext<'a>,
    ) -> Result<Vec<Box<dyn SharedManaged>>, ResolutionError>;
}

pub trait TypedResolver: Resolver {
    fn resolve<T>(&self) -> Result<Arc<T>, ResolutionError>
    where
        T: Injectable + ?Sized,
    {
        self.resolve_with("", Parameters::new(), ResolveOptions::default())
    }

    fn resolve_named<T>(&self, name: &str) -> Result<Arc<T>, ResolutionError>
    where
        T: Injectable + ?Sized,
    {
        self.resolve_with(name, Parameters::new(), ResolveOptions::default())
    }

    fn resolve_with<T>(
        &self,
        name: &str,
        parameters: Parameters,
        options: ResolveOptions,
    ) -> Result<Arc<T>, ResolutionError>
    where
        T: Injectable + ?Sized,
    {
        let request = Request::of::<T>()
            .with_name(name)
            .with_parameters(parameters)
            .with_options(options);
        self.dyn_resolve(&request).map(downcast_object)
    }

    fn try_resolve<T>(&self) -> Option<Arc<T>>
    where
        T: Injectable + ?Sized,
    {
        self.resolve().ok()
    }

    fn can_resolve<T>(&self) -> bool
    where
        T: Injectable + ?Sized,
    {
        self.dyn_can_resolve(&Request::of::<T>())
    }

    fn can_resolve_named<T>(&self, name: &str) -> bool
    where
        T: Injectable + ?Sized,
    {
        self.dyn_can_resolve(&Request::of::<T>().with_name(name))
    }

    fn can_resolve_with<T>(&self, name: &str, parameters: Parameters, options: ResolveOptions) -> bool
    where
        T: Injectable + ?Sized,
    {
        let request = Request::of::<T>()
            .with_name(name)
            .with_parameters(parameters)
            .with_options(options);
        self.dyn_can_resolve(&request)
    }

    fn resolve_all<T>(&self, include_unnamed: bool) -> Result<Vec<Arc<T>>, ResolutionError>
    where
        T: Injectable + ?Sized,
    {
        self.dyn_resolve_all(&T::type_info(), include_unnamed)
            .map(|objects| objects.into_iter().map(downcast_object).collect())
    }

    fn upcast_dyn(&self) -> &dyn Resolver;
}

impl<R> TypedResolver for R
where
    R: Resolver,
{
    fn upcast_dyn(&self) -> &dyn Resolver {
        self
    }
}

impl TypedResolver for dyn Resolver + '_ {
    fn upcast_dyn(&self) -> &dyn Resolver {
        self
    }
}

fn downcast_object<T>(object: Box<dyn SharedManaged>) -> Arc<T>
where
    T: Managed + ?Sized,
{
    match object.downcast_arc::<T>() {
        Some(object) => object,
        None => unreachable!("the object's type should be `Arc<T>`"),
    }
}

/// Everything a single resolution needs to know.
#[derive(Debug, Clone)]
pub struct Request {
    info: TypeInfo,
    name: String,
    parameters: Parameters,
    options: ResolveOptions,
}

impl Request {
    pub fn new(info: TypeInfo) -> Self {
        Self {
            info,
            name: String::new(),
            parameters: Parameters::new(),
            options: ResolveOptions::default(),
        }
    }

    pub fn of<T>() -> Self
    where
        T: Injectable + ?Sized,
    {
        Self::new(T::type_info())
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn info(&self) -> &TypeInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    pub fn key(&self) -> TypeKey {
        TypeKey::from_info(&self.info, &self.name)
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }

    /// The same request against the unnamed registration.
    pub(crate) fn unnamed(&self) -> Self {
        Self {
            name: String::new(),
            ..self.clone()
        }
    }

    /// A request for a constructor dependency: same options, no parameters.
    pub(crate) fn dependency(&self, info: TypeInfo) -> Self {
        Self::new(info).with_options(self.options)
    }
}

#[derive(Debug, Clone, Snafu)]
#[non_exhaustive]
pub enum ResolutionError {
    #[snafu(display("could not resolve {key}"))]
    #[non_exhaustive]
    Unresolvable { key: TypeKey },
    #[snafu(display("could not construct {key}"))]
    #[non_exhaustive]
    Construction {
        key: TypeKey,
        source: ConstructionError,
    },
}

impl ResolutionError {
    /// The key originally requested from the failing call.
    pub fn key(&self) -> &TypeKey {
        match self {
            Self::Unresolvable { key } | Self::Construction { key, .. } => key,
        }
    }

    /// The innermost error of the cause chain.
    pub fn root_cause(&self) -> &(dyn Error + 'static) {
        let mut current: &(dyn Error + 'static) = self;
        while let Some(source) = current.source() {
            current = source;
        }
        current
    }

    pub fn is_cyclic_dependency(&self) -> bool {
        match self {
            Self::Unresolvable { .. } => false,
            Self::Construction { source, .. } => match source {
                ConstructionError::CyclicDependency { .. } => true,
                ConstructionError::Dependency { source, .. } => source.is_cyclic_dependency(),
                ConstructionError::Factory { source } => source
                    .downcast_ref::<ResolutionError>()
                    .is_some_and(ResolutionError::is_cyclic_dependency),
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, Snafu)]
#[non_exhaustive]
pub enum ConstructionError {
    #[snafu(display("no constructor of {implementation} can be satisfied"))]
    #[non_exhaustive]
    NoSuitableConstructor { implementation: &'static str },
    #[snafu(display("{implementation} depends on itself"))]
    #[non_exhaustive]
    CyclicDependency { implementation: &'static str },
    #[snafu(display("could not resolve the constructor parameter `{parameter}`"))]
    #[non_exhaustive]
    Dependency {
        parameter: &'static str,
        source: Box<ResolutionError>,
    },
    #[snafu(display("the constructor parameter at position {position} has no name"))]
    #[non_exhaustive]
    UnnamedParameter { position: usize },
    #[snafu(display("the constructor returned an error"))]
    #[non_exhaustive]
    Constructor { source: Arc<dyn Error + Send + Sync> },
    #[snafu(display("the factory returned an error"))]
    #[non_exhaustive]
    Factory { source: Arc<dyn Error + Send + Sync> },
    #[snafu(display("the weakly referenced instance has been released"))]
    #[non_exhaustive]
    Released,
    #[snafu(display("the construction of {implementation} was abandoned by a panic"))]
    #[non_exhaustive]
    Abandoned { implementation: &'static str },
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn resolution_error_root_cause_succeeds() {
        let err = ResolutionError::Construction {
            key: TypeKey::of::<String>(),
            source: ConstructionError::Dependency {
                parameter: "inner",
                source: Box::new(ResolutionError::Construction {
                    key: TypeKey::of::<i32>(),
                    source: ConstructionError::Factory {
                        source: Arc::new(io::Error::other("boom")),
                    },
                }),
            },
        };

        assert_eq!(err.key(), &TypeKey::of::<String>());
        assert_eq!(err.root_cause().to_string(), "boom");
        assert!(!err.is_cyclic_dependency());
    }

    #[test]
    fn resolution_error_is_cyclic_dependency_succeeds() {
        let err = ResolutionError::Construction {
            key: TypeKey::of::<String>(),
            source: ConstructionError::Dependency {
                parameter: "inner",
                source: Box::new(ResolutionError::Construction {
                    key: TypeKey::of::<i32>(),
                    source: ConstructionError::CyclicDependency {
                        implementation: "i32",
                    },
                }),
            },
        };

        assert!(err.is_cyclic_dependency());
        assert!(!ResolutionError::Unresolvable {
            key: TypeKey::of::<i32>()
        }
        .is_cyclic_dependency());
    }

    #[test]
    fn request_key_succeeds() {
        let request = Request::of::<i32>().with_name("Answer");
        assert_eq!(request.key(), TypeKey::named::<i32>("answer"));
        assert!(request.is_named());
        assert_eq!(request.unnamed().key(), TypeKey::of::<i32>());
    }
}
