use std::sync::Arc;

use tracing::debug;

use crate::container::core::ContainerCore;
use crate::container::registry::{RegisterOptions, RegistrationTable};
use crate::container::resolver::{CallContext, Request, ResolutionError, Resolver};
use crate::container::{Parameters, SharedManaged};
use crate::introspect::{BoxError, Implementation, Injectable, TypeInfo, Upcast};
use crate::key::TypeKey;
use crate::strategy::{
    FactoryStrategy, InstanceStrategy, MultiInstanceStrategy, SingletonStrategy, Strategy,
    WeakInstanceStrategy,
};

/// A thread-safe registry of types and the strategies producing them, which
/// also builds unregistered types by selecting one of their constructors.
///
/// Containers are always shared through an [`Arc`]. Each one registers itself
/// under its own type, so constructors may take an `Arc<Container>`. The
/// registration only holds a weak reference, which keeps the container from
/// owning itself.
///
/// # Examples
///
/// ```rust
/// # use std::sync::Arc;
/// # use minioc::prelude::*;
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// interface!(dyn Greeter);
///
/// struct English;
///
/// #[injectable(implements(dyn Greeter))]
/// impl English {
///     #[inject]
///     fn new() -> Self {
///         English
///     }
/// }
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         String::from("hello")
///     }
/// }
///
/// let container = Container::new();
/// container.register_as::<dyn Greeter, English>();
///
/// let greeter = container.resolve::<dyn Greeter>().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// assert!(Arc::ptr_eq(&greeter, &container.resolve::<dyn Greeter>().unwrap()));
/// ```
pub struct Container {
    core: ContainerCore,
}

impl Container {
    pub fn new() -> Arc<Self> {
        Self::with_core(ContainerCore::new_root())
    }

    /// Creates a container whose lookups fall back to this one. Objects of
    /// registrations found here are still built through the child.
    pub fn child(self: &Arc<Self>) -> Arc<Self> {
        Self::with_core(ContainerCore::new_child(Arc::clone(self)))
    }

    fn with_core(core: ContainerCore) -> Arc<Self> {
        Arc::new_cyclic(|this| {
            core.table().register(
                TypeKey::of::<Container>(),
                Strategy::WeakInstance(WeakInstanceStrategy::from_weak(this.clone())),
            );
            Self { core }
        })
    }

    pub fn parent(&self) -> Option<&Arc<Container>> {
        self.core.parent()
    }

    pub(super) fn core(&self) -> &ContainerCore {
        &self.core
    }

    fn table(&self) -> &RegistrationTable {
        self.core.table()
    }

    /// Registers `T` as itself. It is built by constructor selection for
    /// every request unless modified.
    pub fn register<T>(&self) -> RegisterOptions<'_>
    where
        T: Injectable,
    {
        self.register_as_named::<T, T>("")
    }

    pub fn register_named<T>(&self, name: &str) -> RegisterOptions<'_>
    where
        T: Injectable,
    {
        self.register_as_named::<T, T>(name)
    }

    /// Registers `C` as the implementation of `I`.
    ///
    /// An abstract `I` defaults to a singleton and a concrete one to a new
    /// object per request.
    pub fn register_as<I, C>(&self) -> RegisterOptions<'_>
    where
        I: Injectable + ?Sized,
        C: Injectable + Upcast<I>,
    {
        self.register_as_named::<I, C>("")
    }

    pub fn register_as_named<I, C>(&self, name: &str) -> RegisterOptions<'_>
    where
        I: Injectable + ?Sized,
        C: Injectable + Upcast<I>,
    {
        let implementation = Implementation::new::<I, C>();
        let strategy = if I::type_info().is_abstract() {
            Strategy::Singleton(SingletonStrategy::new(implementation))
        } else {
            Strategy::MultiInstance(MultiInstanceStrategy::new(implementation))
        };
        self.register_strategy(TypeKey::named::<I>(name), strategy)
    }

    /// Registers a pre-built object, handed out for every request. The
    /// container disposes it with the registration if `T` is disposable.
    pub fn register_instance<T>(&self, instance: Arc<T>) -> RegisterOptions<'_>
    where
        T: Injectable + ?Sized,
    {
        self.register_instance_named("", instance)
    }

    pub fn register_instance_named<T>(&self, name: &str, instance: Arc<T>) -> RegisterOptions<'_>
    where
        T: Injectable + ?Sized,
    {
        let strategy = Strategy::Instance(InstanceStrategy::new(instance));
        self.register_strategy(TypeKey::named::<T>(name), strategy)
    }

    /// Registers a function called for every request. It receives a resolver
    /// for its own dependencies and the request's parameters.
    pub fn register_factory<T, F>(&self, factory: F) -> RegisterOptions<'_>
    where
        T: Injectable + ?Sized,
        F: Fn(&dyn Resolver, &Parameters) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        self.register_factory_named("", factory)
    }

    pub fn register_factory_named<T, F>(&self, name: &str, factory: F) -> RegisterOptions<'_>
    where
        T: Injectable + ?Sized,
        F: Fn(&dyn Resolver, &Parameters) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        let strategy = Strategy::Factory(FactoryStrategy::new(factory));
        self.register_strategy(TypeKey::named::<T>(name), strategy)
    }

    fn register_strategy(&self, key: TypeKey, strategy: Strategy) -> RegisterOptions<'_> {
        self.table().register(key.clone(), strategy);
        RegisterOptions::new(self.table(), key)
    }

    /// Removes the unnamed registration of `T` from this container, disposing
    /// what it owns. Returns false if there was none.
    pub fn unregister<T>(&self) -> bool
    where
        T: Injectable + ?Sized,
    {
        self.unregister_named::<T>("")
    }

    pub fn unregister_named<T>(&self, name: &str) -> bool
    where
        T: Injectable + ?Sized,
    {
        self.table().remove(&TypeKey::named::<T>(name))
    }

    /// Returns true if this container or an ancestor has a registration of
    /// `T` under `name`.
    pub fn is_registered<T>(&self, name: &str) -> bool
    where
        T: Injectable + ?Sized,
    {
        self.core.lookup(&TypeKey::named::<T>(name)).is_some()
    }

    /// Disposes every registration of this container and empties it.
    /// Ancestors are left untouched.
    ///
    /// Not meant to run alongside resolutions on other threads. Also runs
    /// when the container is dropped.
    pub fn dispose(&self) {
        debug!(registrations = self.table().len(), "disposing container");
        self.core.dispose();
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Injectable for Container {
    fn type_info() -> TypeInfo {
        TypeInfo::concrete::<Self>().build()
    }
}

impl Resolver for Container {
    fn dyn_resolve(&self, request: &Request) -> Result<Box<dyn SharedManaged>, ResolutionError> {
        self.core.resolve(self, request, &CallContext::root())
    }

    fn dyn_resolve_dependency<'a>(
        &self,
        request: &Request,
        context: &'a CallContext<'a>,
    ) -> Result<Box<dyn SharedManaged>, ResolutionError> {
        self.core.resolve(self, request, context)
    }

    fn dyn_can_resolve(&self, request: &Request) -> bool {
        self.core.can_resolve(self, request, &CallContext::root())
    }

    fn dyn_can_resolve_dependency<'a>(
        &self,
        request: &Request,
        context: &'a CallContext<'a>,
    ) -> bool {
        self.core.can_resolve(self, request, context)
    }

    fn dyn_resolve_all(
        &self,
        info: &TypeInfo,
        include_unnamed: bool,
    ) -> Result<Vec<Box<dyn SharedManaged>>, ResolutionError> {
        self.core
            .resolve_all(self, info, include_unnamed, &CallContext::root())
    }

    fn dyn_resolve_all_dependency<'a>(
        &self,
        info: &TypeInfo,
        include_unnamed: bool,
        context: &'a CallContext<'a>,
    ) -> Result<Vec<Box<dyn SharedManaged>>, ResolutionError> {
        self.core
            .resolve_all(self, info, include_unnamed, context)
    }
}
