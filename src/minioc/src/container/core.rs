use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

use tracing::trace;

use crate::container::handle::Container;
use crate::container::registry::RegistrationTable;
use crate::container::resolver::{CallContext, Request, ResolutionError, Resolver};
use crate::container::selector;
use crate::container::SharedManaged;
use crate::introspect::{Implementation, TypeInfo};
use crate::key::TypeKey;
use crate::strategy::Strategy;

/// The registrations of one container plus the way back to its parent.
///
/// All resolution methods take the resolver on whose behalf they run, which
/// is the container the request was made to. Strategies found in an ancestor
/// therefore resolve their dependencies through the descendant.
pub(super) struct ContainerCore {
    table: RegistrationTable,
    parent: Option<Arc<Container>>,
}

impl ContainerCore {
    pub fn new_root() -> Self {
        Self {
            table: RegistrationTable::new(),
            parent: None,
        }
    }

    pub fn new_child(parent: Arc<Container>) -> Self {
        Self {
            table: RegistrationTable::new(),
            parent: Some(parent),
        }
    }

    pub fn table(&self) -> &RegistrationTable {
        &self.table
    }

    pub fn parent(&self) -> Option<&Arc<Container>> {
        self.parent.as_ref()
    }

    /// Finds the strategy of `key` in this container or the closest ancestor
    /// registering it.
    pub fn lookup(&self, key: &TypeKey) -> Option<Arc<Strategy>> {
        self.table.lookup(key).or_else(|| {
            self.parent
                .as_ref()
                .and_then(|parent| parent.core().lookup(key))
        })
    }

    /// Returns the registered keys of a type, closest registration first and
    /// without keys hidden by a descendant.
    pub fn keys_of(&self, target: TypeId) -> Vec<TypeKey> {
        let mut keys = self.table.keys_of(target);
        if let Some(parent) = self.parent.as_ref() {
            let own: HashSet<TypeKey> = keys.iter().cloned().collect();
            keys.extend(
                parent
                    .core()
                    .keys_of(target)
                    .into_iter()
                    .filter(|key| !own.contains(key)),
            );
        }
        keys
    }

    pub fn resolve(
        &self,
        resolver: &dyn Resolver,
        request: &Request,
        context: &CallContext<'_>,
    ) -> Result<Box<dyn SharedManaged>, ResolutionError> {
        let key = request.key();

        if let Some(strategy) = self.lookup(&key) {
            trace!(%key, kind = %strategy.kind(), "resolving registration");
            return strategy
                .produce(resolver, request, context)
                .map_err(|source| ResolutionError::Construction { key, source });
        }

        if request.is_named() {
            if !request.options().attempts_unnamed() {
                trace!(%key, "named registration not found");
                return Err(ResolutionError::Unresolvable { key });
            }

            let unnamed = request.unnamed();
            if let Some(strategy) = self.lookup(&unnamed.key()) {
                trace!(%key, kind = %strategy.kind(), "falling back to unnamed registration");
                return strategy
                    .produce(resolver, &unnamed, context)
                    .map_err(|source| ResolutionError::Construction { key, source });
            }
        }

        if self.attempts_construction(request) {
            trace!(%key, "constructing unregistered type");
            let implementation = Implementation::of_self(request.info().clone());
            return selector::construct(resolver, &implementation, None, request, context)
                .map(|constructed| constructed.object)
                .map_err(|source| ResolutionError::Construction { key, source });
        }

        trace!(%key, "unresolvable");
        Err(ResolutionError::Unresolvable { key })
    }

    /// Mirrors [`ContainerCore::resolve`] without building anything.
    pub fn can_resolve(
        &self,
        resolver: &dyn Resolver,
        request: &Request,
        context: &CallContext<'_>,
    ) -> bool {
        if let Some(strategy) = self.lookup(&request.key()) {
            return strategy.can_produce(resolver, request, context);
        }

        if request.is_named() {
            if !request.options().attempts_unnamed() {
                return false;
            }

            let unnamed = request.unnamed();
            if let Some(strategy) = self.lookup(&unnamed.key()) {
                return strategy.can_produce(resolver, &unnamed, context);
            }
        }

        self.attempts_construction(request)
            && selector::can_construct(
                resolver,
                &Implementation::of_self(request.info().clone()),
                None,
                request,
                context,
            )
    }

    fn attempts_construction(&self, request: &Request) -> bool {
        request.options().attempts_unregistered() && !request.info().is_abstract()
    }

    /// Resolves every registration of `info` with default options, ordered by
    /// case-folded name.
    pub fn resolve_all(
        &self,
        resolver: &dyn Resolver,
        info: &TypeInfo,
        include_unnamed: bool,
        context: &CallContext<'_>,
    ) -> Result<Vec<Box<dyn SharedManaged>>, ResolutionError> {
        let mut keys = self.keys_of(info.id());
        keys.retain(|key| include_unnamed || key.is_named());
        keys.sort_by_cached_key(TypeKey::folded_name);
        trace!(type_name = info.name(), count = keys.len(), "resolving all registrations");

        keys.iter()
            .map(|key| {
                let request = Request::new(info.clone()).with_name(key.name());
                self.resolve(resolver, &request, context)
            })
            .collect()
    }

    pub fn dispose(&self) {
        self.table.dispose_all();
    }
}
