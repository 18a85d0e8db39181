//! Constructor selection and invocation for types the container builds
//! itself.

use std::sync::Arc;

use tracing::trace;

use crate::container::resolver::{CallContext, ConstructionError, Request, Resolver};
use crate::container::SharedManaged;
use crate::dispose::Disposer;
use crate::introspect::{
    Argument, Arguments, ConstructorInfo, Implementation, ParameterInfo, ParameterKind, TypeInfo,
    TypeKind,
};
use crate::key::TypeKey;

/// A freshly built object and, if its type is disposable, the hook that
/// disposes it.
pub(crate) struct Constructed {
    pub object: Box<dyn SharedManaged>,
    pub disposer: Option<Disposer>,
}

/// Picks the constructor of `info` to call: the first one, in ascending order
/// of parameter count, whose parameters can all be satisfied. Only concrete
/// types are considered.
pub(crate) fn select(
    resolver: &dyn Resolver,
    info: &TypeInfo,
    request: &Request,
    context: &CallContext<'_>,
) -> Option<usize> {
    if info.kind() != TypeKind::Concrete {
        return None;
    }

    let mut candidates: Vec<(usize, &ConstructorInfo)> =
        info.constructors().iter().enumerate().collect();
    candidates.sort_by_key(|(_, constructor)| constructor.parameters().len());

    candidates
        .into_iter()
        .find(|(_, constructor)| is_feasible(resolver, constructor, request, context))
        .map(|(index, _)| index)
}

fn is_feasible(
    resolver: &dyn Resolver,
    constructor: &ConstructorInfo,
    request: &Request,
    context: &CallContext<'_>,
) -> bool {
    constructor
        .parameters()
        .iter()
        .all(|parameter| is_satisfiable(resolver, parameter, request, context))
}

fn is_satisfiable(
    resolver: &dyn Resolver,
    parameter: &ParameterInfo,
    request: &Request,
    context: &CallContext<'_>,
) -> bool {
    match parameter.kind() {
        ParameterKind::All => true,
        ParameterKind::Single => match parameter.name() {
            None => false,
            Some(name) => {
                request.parameters().contains(name)
                    || resolver.dyn_can_resolve_dependency(
                        &request.dependency(parameter.type_info()),
                        context,
                    )
            }
        },
    }
}

/// Predicts whether [`construct`] would succeed.
pub(crate) fn can_construct(
    resolver: &dyn Resolver,
    implementation: &Implementation,
    constructor: Option<usize>,
    request: &Request,
    context: &CallContext<'_>,
) -> bool {
    let info = implementation.info();
    let key = TypeKey::from_info(info, "");
    if context.contains(&key) {
        return false;
    }
    let context = context.append(&key);

    match constructor {
        Some(index) => info.kind() == TypeKind::Concrete
            && info
                .constructors()
                .get(index)
                .is_some_and(|constructor| is_feasible(resolver, constructor, request, &context)),
        None => select(resolver, info, request, &context).is_some(),
    }
}

/// Builds a new object of the implementation type and casts it to the
/// requested type.
///
/// Arguments come from the request's parameters by exact name; everything
/// else is resolved through `resolver` with the request's options and no
/// parameters.
pub(crate) fn construct(
    resolver: &dyn Resolver,
    implementation: &Implementation,
    constructor: Option<usize>,
    request: &Request,
    context: &CallContext<'_>,
) -> Result<Constructed, ConstructionError> {
    let info = implementation.info();
    let key = TypeKey::from_info(info, "");
    if context.contains(&key) {
        return Err(ConstructionError::CyclicDependency {
            implementation: info.name(),
        });
    }
    let context = context.append(&key);

    let no_suitable_constructor = || ConstructionError::NoSuitableConstructor {
        implementation: info.name(),
    };
    if info.kind() != TypeKind::Concrete {
        return Err(no_suitable_constructor());
    }
    let index = match constructor {
        Some(index) => index,
        None => select(resolver, info, request, &context).ok_or_else(no_suitable_constructor)?,
    };
    let constructor = info
        .constructors()
        .get(index)
        .ok_or_else(no_suitable_constructor)?;
    trace!(implementation = info.name(), index, "invoking constructor");

    let arguments = constructor
        .parameters()
        .iter()
        .enumerate()
        .map(|(position, parameter)| argument(resolver, position, parameter, request, &context))
        .collect::<Result<Vec<_>, _>>()?;

    let object = constructor
        .invoke(Arguments::new(arguments))
        .map_err(|source| ConstructionError::Constructor {
            source: Arc::from(source),
        })?;
    let disposer = info.disposer_for(object.as_ref());

    Ok(Constructed {
        object: implementation.cast(object),
        disposer,
    })
}

fn argument(
    resolver: &dyn Resolver,
    position: usize,
    parameter: &ParameterInfo,
    request: &Request,
    context: &CallContext<'_>,
) -> Result<Argument, ConstructionError> {
    let name = parameter.name();
    let result = match parameter.kind() {
        ParameterKind::Single => {
            let Some(name) = name else {
                return Err(ConstructionError::UnnamedParameter { position });
            };
            if let Some(value) = request.parameters().get(name) {
                return Ok(Argument::Single(value));
            }
            resolver
                .dyn_resolve_dependency(&request.dependency(parameter.type_info()), context)
                .map(Argument::Single)
        }
        ParameterKind::All => resolver
            .dyn_resolve_all_dependency(&parameter.type_info(), true, context)
            .map(Argument::All),
    };

    result.map_err(|source| ConstructionError::Dependency {
        parameter: name.unwrap_or("_"),
        source: Box::new(source),
    })
}
