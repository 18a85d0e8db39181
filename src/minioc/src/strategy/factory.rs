use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::resolver::{
    CallContext, ConstructionError, ContextForwardingResolver, Request, Resolver, TypedResolver,
};
use crate::container::{Managed, Parameters, SharedManaged};
use crate::introspect::BoxError;

type Factory =
    dyn Fn(&dyn Resolver, &Parameters) -> Result<Box<dyn SharedManaged>, BoxError> + Send + Sync;

/// Calls user code for every request.
pub struct FactoryStrategy {
    factory: Box<Factory>,
    output: &'static str,
}

impl FactoryStrategy {
    pub fn new<T, F>(factory: F) -> Self
    where
        T: Managed + ?Sized,
        F: Fn(&dyn Resolver, &Parameters) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(move |resolver, parameters| {
                factory(resolver, parameters).map(|object| -> Box<dyn SharedManaged> {
                    Box::new(object)
                })
            }),
            output: std::any::type_name::<T>(),
        }
    }

    /// Calls the factory with a resolver that keeps track of the objects
    /// under construction. A factory resolving its own key fails with a
    /// cyclic dependency.
    pub fn produce(
        &self,
        resolver: &dyn Resolver,
        request: &Request,
        context: &CallContext<'_>,
    ) -> Result<Box<dyn SharedManaged>, ConstructionError> {
        let key = request.key();
        if context.contains(&key) {
            return Err(ConstructionError::CyclicDependency {
                implementation: self.output,
            });
        }
        let context = context.append(&key);

        let resolver = ContextForwardingResolver::new(resolver, &context);
        (self.factory)(resolver.upcast_dyn(), request.parameters()).map_err(|source| {
            ConstructionError::Factory {
                source: Arc::from(source),
            }
        })
    }
}

impl Debug for FactoryStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FactoryStrategy")
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::container::resolver::MockResolver;
    use crate::introspect::{Injectable, TypeInfo};

    use super::*;

    struct Greeting(String);

    impl Injectable for Greeting {
        fn type_info() -> TypeInfo {
            TypeInfo::concrete::<Self>().build()
        }
    }

    #[test]
    fn factory_strategy_produce_succeeds() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_dyn_resolve_dependency()
            .returning(|_, _| Ok(Box::new(Arc::new(String::from("world")))));

        let strategy = FactoryStrategy::new(|resolver, parameters| {
            let name = resolver.resolve::<String>()?;
            let punctuation = parameters
                .get("punctuation")
                .and_then(|value| value.downcast_arc::<&'static str>())
                .map_or("", |value| *value);
            Ok(Arc::new(Greeting(format!("hello {name}{punctuation}"))))
        });

        let request = Request::of::<Greeting>()
            .with_parameters(Parameters::new().with("punctuation", Arc::new("!")));
        let object = strategy
            .produce(&resolver, &request, &CallContext::root())
            .unwrap();
        assert_eq!(object.downcast_arc::<Greeting>().unwrap().0, "hello world!");
    }

    #[test]
    fn factory_strategy_produce_fails_on_reentry() {
        let resolver = MockResolver::new();
        let strategy = FactoryStrategy::new::<Greeting, _>(|_, _| {
            Ok(Arc::new(Greeting(String::from("unreachable"))))
        });
        let key = Request::of::<Greeting>().key();
        let root = CallContext::root();
        let context = root.append(&key);

        let err = strategy
            .produce(&resolver, &Request::of::<Greeting>(), &context)
            .unwrap_err();
        assert!(matches!(err, ConstructionError::CyclicDependency { .. }));
    }

    #[test]
    fn factory_strategy_produce_wraps_errors() {
        let resolver = MockResolver::new();
        let strategy = FactoryStrategy::new::<Greeting, _>(|_, _| {
            Err(io::Error::other("unavailable").into())
        });

        let err = strategy
            .produce(&resolver, &Request::of::<Greeting>(), &CallContext::root())
            .unwrap_err();
        match err {
            ConstructionError::Factory { source } => {
                assert_eq!(source.to_string(), "unavailable");
            }
            err => panic!("unexpected error: {err}"),
        }
    }
}
