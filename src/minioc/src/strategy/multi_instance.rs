use crate::container::resolver::{CallContext, ConstructionError, Request, Resolver};
use crate::container::selector;
use crate::container::SharedManaged;
use crate::introspect::Implementation;
use crate::strategy::SingletonStrategy;

/// Builds a new object for every request. The objects belong to the caller.
#[derive(Debug, Clone)]
pub struct MultiInstanceStrategy {
    implementation: Implementation,
    constructor: Option<usize>,
}

impl MultiInstanceStrategy {
    pub fn new(implementation: Implementation) -> Self {
        Self {
            implementation,
            constructor: None,
        }
    }

    pub(crate) fn from_parts(implementation: Implementation, constructor: Option<usize>) -> Self {
        Self {
            implementation,
            constructor,
        }
    }

    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    pub fn constructor(&self) -> Option<usize> {
        self.constructor
    }

    pub fn with_constructor(&self, index: usize) -> Self {
        Self::from_parts(self.implementation.clone(), Some(index))
    }

    pub fn to_singleton(&self) -> SingletonStrategy {
        SingletonStrategy::from_parts(self.implementation.clone(), self.constructor)
    }

    pub fn produce(
        &self,
        resolver: &dyn Resolver,
        request: &Request,
        context: &CallContext<'_>,
    ) -> Result<Box<dyn SharedManaged>, ConstructionError> {
        selector::construct(
            resolver,
            &self.implementation,
            self.constructor,
            request,
            context,
        )
        .map(|constructed| constructed.object)
    }

    pub fn can_produce(
        &self,
        resolver: &dyn Resolver,
        request: &Request,
        context: &CallContext<'_>,
    ) -> bool {
        selector::can_construct(
            resolver,
            &self.implementation,
            self.constructor,
            request,
            context,
        )
    }
}
