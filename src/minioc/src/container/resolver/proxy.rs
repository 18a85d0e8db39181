use crate::container::resolver::{CallContext, Request, ResolutionError, Resolver, TypedResolver};
use crate::container::SharedManaged;
use crate::introspect::TypeInfo;

/// Hands a resolver to user code while keeping the construction chain of the
/// call that invoked it.
pub(crate) struct ContextForwardingResolver<'a, R>
where
    R: TypedResolver + ?Sized,
{
    inner: &'a R,
    context: &'a CallContext<'a>,
}

impl<'a, R> ContextForwardingResolver<'a, R>
where
    R: TypedResolver + ?Sized,
{
    pub fn new(inner: &'a R, context: &'a CallContext<'a>) -> Self {
        Self { inner, context }
    }
}

impl<R> Resolver for ContextForwardingResolver<'_, R>
where
    R: TypedResolver + ?Sized,
{
    fn dyn_resolve(&self, request: &Request) -> Result<Box<dyn SharedManaged>, ResolutionError> {
        self.inner.dyn_resolve_dependency(request, self.context)
    }

    fn dyn_resolve_dependency<'a>(
        &self,
        request: &Request,
        context: &'a CallContext<'a>,
    ) -> Result<Box<dyn SharedManaged>, ResolutionError> {
        self.inner.dyn_resolve_dependency(request, context)
    }

    fn dyn_can_resolve(&self, request: &Request) -> bool {
        self.inner.dyn_can_resolve_dependency(request, self.context)
    }

    fn dyn_can_resolve_dependency<'a>(
        &self,
        request: &Request,
        context: &'a CallContext<'a>,
    ) -> bool {
        self.inner.dyn_can_resolve_dependency(request, context)
    }

    fn dyn_resolve_all(
        &self,
        info: &TypeInfo,
        include_unnamed: bool,
    ) -> Result<Vec<Box<dyn SharedManaged>>, ResolutionError> {
        self.inner
            .dyn_resolve_all_dependency(info, include_unnamed, self.context)
    }

    fn dyn_resolve_all_dependency<'a>(
        &self,
        info: &TypeInfo,
        include_unnamed: bool,
        context: &'a CallContext<'a>,
    ) -> Result<Vec<Box<dyn SharedManaged>>, ResolutionError> {
        self.inner
            .dyn_resolve_all_dependency(info, include_unnamed, context)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::container::resolver::MockResolver;
    use crate::key::TypeKey;

    use super::*;

    #[test]
    fn context_forwarding_resolver_keeps_context() {
        let key = TypeKey::of::<String>();
        let root = CallContext::root();
        let context = root.append(&key);

        let mut inner = MockResolver::new();
        inner
            .expect_dyn_resolve_dependency()
            .times(1)
            .returning(|request, context| {
                assert_eq!(request.key(), TypeKey::of::<i32>());
                assert!(context.contains(&TypeKey::of::<String>()));
                Ok(Box::new(Arc::new(1i32)))
            });
        inner
            .expect_dyn_can_resolve_dependency()
            .times(1)
            .returning(|_, context| context.depth() == 1);

        let proxy = ContextForwardingResolver::new(&inner, &context);
        assert_eq!(*proxy.resolve::<i32>().unwrap(), 1);
        assert!(proxy.dyn_can_resolve(&Request::of::<i32>()));
    }
}
