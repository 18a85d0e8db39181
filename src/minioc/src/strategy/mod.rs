//! The ways a registration produces its objects.

mod factory;
mod instance;
mod multi_instance;
mod singleton;

use std::fmt::{Display, Formatter, Result as FmtResult};

use snafu::prelude::*;

use crate::container::resolver::{CallContext, ConstructionError, Request, Resolver};
use crate::container::SharedManaged;
use crate::introspect::Implementation;

pub use factory::FactoryStrategy;
pub use instance::{InstanceStrategy, WeakInstanceStrategy};
pub use multi_instance::MultiInstanceStrategy;
pub use singleton::SingletonStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Instance,
    WeakInstance,
    Factory,
    MultiInstance,
    Singleton,
}

impl Display for StrategyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Instance => "instance",
            Self::WeakInstance => "weak instance",
            Self::Factory => "factory",
            Self::MultiInstance => "multi-instance",
            Self::Singleton => "singleton",
        };
        f.write_str(name)
    }
}

/// How a registration produces objects. Owned by the registration table.
#[derive(Debug)]
pub enum Strategy {
    Instance(InstanceStrategy),
    WeakInstance(WeakInstanceStrategy),
    Factory(FactoryStrategy),
    MultiInstance(MultiInstanceStrategy),
    Singleton(SingletonStrategy),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Instance(_) => StrategyKind::Instance,
            Self::WeakInstance(_) => StrategyKind::WeakInstance,
            Self::Factory(_) => StrategyKind::Factory,
            Self::MultiInstance(_) => StrategyKind::MultiInstance,
            Self::Singleton(_) => StrategyKind::Singleton,
        }
    }

    /// Whether resolvability is assumed rather than predicted. Nothing about
    /// a stored instance or an opaque factory can be checked ahead of time.
    pub fn assumes_success(&self) -> bool {
        matches!(self, Self::Instance(_) | Self::Factory(_))
    }

    pub fn produce(
        &self,
        resolver: &dyn Resolver,
        request: &Request,
        context: &CallContext<'_>,
    ) -> Result<Box<dyn SharedManaged>, ConstructionError> {
        match self {
            Self::Instance(strategy) => Ok(strategy.produce()),
            Self::WeakInstance(strategy) => strategy.produce(),
            Self::Factory(strategy) => strategy.produce(resolver, request, context),
            Self::MultiInstance(strategy) => strategy.produce(resolver, request, context),
            Self::Singleton(strategy) => strategy.produce(resolver, request, context),
        }
    }

    /// Predicts whether [`Strategy::produce`] would succeed.
    pub fn can_produce(
        &self,
        resolver: &dyn Resolver,
        request: &Request,
        context: &CallContext<'_>,
    ) -> bool {
        match self {
            Self::Instance(_) | Self::Factory(_) => true,
            Self::WeakInstance(strategy) => strategy.is_alive(),
            Self::MultiInstance(strategy) => strategy.can_produce(resolver, request, context),
            Self::Singleton(strategy) => strategy.can_produce(resolver, request, context),
        }
    }

    /// Computes the strategy a registration should switch to in order to
    /// behave as `target`.
    pub fn convert(&self, target: StrategyKind) -> Result<Conversion, ConversionError> {
        let unsupported = || ConversionError::Unsupported {
            from: self.kind(),
            to: target,
        };

        match (self, target) {
            (Self::Instance(_), StrategyKind::Singleton | StrategyKind::Instance)
            | (Self::WeakInstance(_), StrategyKind::WeakInstance)
            | (Self::Factory(_), StrategyKind::Instance)
            | (Self::MultiInstance(_), StrategyKind::MultiInstance)
            | (Self::Singleton(_), StrategyKind::Singleton) => Ok(Conversion::Unchanged),

            (Self::Instance(strategy), StrategyKind::MultiInstance) => {
                let implementation = strategy.implementation();
                ensure_concrete(implementation)?;
                Ok(Conversion::replace(
                    Self::MultiInstance(MultiInstanceStrategy::new(implementation.clone())),
                    true,
                ))
            }
            (Self::Instance(strategy), StrategyKind::WeakInstance) => Ok(Conversion::replace(
                Self::WeakInstance(strategy.downgrade()),
                false,
            )),
            (Self::WeakInstance(strategy), StrategyKind::MultiInstance) => {
                let implementation = strategy.implementation();
                ensure_concrete(implementation)?;
                Ok(Conversion::replace(
                    Self::MultiInstance(MultiInstanceStrategy::new(implementation.clone())),
                    false,
                ))
            }
            (Self::WeakInstance(strategy), StrategyKind::Instance) => strategy
                .upgrade()
                .map(|strategy| Conversion::replace(Self::Instance(strategy), false))
                .ok_or(ConversionError::InstanceReleased),
            (Self::MultiInstance(strategy), StrategyKind::Singleton) => Ok(Conversion::replace(
                Self::Singleton(strategy.to_singleton()),
                true,
            )),
            (Self::Singleton(strategy), StrategyKind::MultiInstance) => Ok(Conversion::replace(
                Self::MultiInstance(strategy.to_multi_instance()),
                true,
            )),

            _ => Err(unsupported()),
        }
    }

    /// Pins the constructor used by multi-instance and singleton
    /// registrations to the one declared at `index`.
    pub fn with_constructor(&self, index: usize) -> Result<Conversion, ConversionError> {
        let implementation = match self {
            Self::MultiInstance(strategy) => strategy.implementation(),
            Self::Singleton(strategy) => strategy.implementation(),
            _ => {
                return Err(ConversionError::ConstructorNotSupported { kind: self.kind() });
            }
        };

        let info = implementation.info();
        ensure!(
            index < info.constructors().len(),
            ConstructorOutOfRangeSnafu {
                implementation: info.name(),
                index,
            }
        );

        let strategy = match self {
            Self::MultiInstance(strategy) => Self::MultiInstance(strategy.with_constructor(index)),
            Self::Singleton(strategy) => Self::Singleton(strategy.with_constructor(index)),
            _ => unreachable!("only constructed strategies reach here"),
        };
        Ok(Conversion::replace(strategy, true))
    }

    /// Releases whatever object the strategy owns. Runs at most once per
    /// owned object.
    pub fn dispose(&self) {
        match self {
            Self::Instance(strategy) => strategy.dispose(),
            Self::Singleton(strategy) => strategy.dispose(),
            Self::WeakInstance(_) | Self::Factory(_) | Self::MultiInstance(_) => {}
        }
    }
}

fn ensure_concrete(implementation: &Implementation) -> Result<(), ConversionError> {
    ensure!(
        !implementation.info().is_abstract(),
        AbstractImplementationSnafu {
            implementation: implementation.info().name(),
        }
    );
    Ok(())
}

/// The outcome of a successful conversion.
#[derive(Debug)]
pub enum Conversion {
    /// The strategy already behaves as requested.
    Unchanged,
    /// The strategy must be swapped for a new one. If `release_previous` is
    /// set, objects owned by the old strategy are disposed.
    Replaced {
        strategy: Strategy,
        release_previous: bool,
    },
}

impl Conversion {
    fn replace(strategy: Strategy, release_previous: bool) -> Self {
        Self::Replaced {
            strategy,
            release_previous,
        }
    }
}

#[derive(Debug, Clone, Snafu)]
#[non_exhaustive]
pub enum ConversionError {
    #[snafu(display("a {from} registration can't be turned into a {to} registration"))]
    #[non_exhaustive]
    Unsupported { from: StrategyKind, to: StrategyKind },
    #[snafu(display("the weakly referenced instance has already been released"))]
    #[non_exhaustive]
    InstanceReleased,
    #[snafu(display("{implementation} is abstract and can't be constructed"))]
    #[non_exhaustive]
    AbstractImplementation { implementation: &'static str },
    #[snafu(display("{implementation} has no constructor #{index}"))]
    #[non_exhaustive]
    ConstructorOutOfRange {
        implementation: &'static str,
        index: usize,
    },
    #[snafu(display("a {kind} registration doesn't call constructors"))]
    #[non_exhaustive]
    ConstructorNotSupported { kind: StrategyKind },
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::introspect::{Injectable, TypeInfo};

    use super::*;

    #[derive(Default)]
    struct Widget;

    impl Injectable for Widget {
        fn type_info() -> TypeInfo {
            TypeInfo::concrete::<Self>().default_constructor().build()
        }
    }

    trait Gadget: Send + Sync {}

    crate::interface!(dyn Gadget);

    fn instance() -> Strategy {
        Strategy::Instance(InstanceStrategy::new::<Widget>(Arc::new(Widget)))
    }

    fn multi_instance() -> Strategy {
        Strategy::MultiInstance(MultiInstanceStrategy::new(Implementation::of_self(
            TypeInfo::of::<Widget>(),
        )))
    }

    fn replaced_kind(conversion: Conversion) -> StrategyKind {
        match conversion {
            Conversion::Replaced { strategy, .. } => strategy.kind(),
            Conversion::Unchanged => panic!("expected a replacement"),
        }
    }

    #[test]
    fn strategy_assumes_success_succeeds() {
        assert!(instance().assumes_success());
        assert!(!multi_instance().assumes_success());
    }

    #[test]
    fn strategy_convert_instance_succeeds() {
        let strategy = instance();

        assert!(matches!(
            strategy.convert(StrategyKind::Singleton),
            Ok(Conversion::Unchanged)
        ));
        assert_eq!(
            replaced_kind(strategy.convert(StrategyKind::MultiInstance).unwrap()),
            StrategyKind::MultiInstance
        );
        assert_eq!(
            replaced_kind(strategy.convert(StrategyKind::WeakInstance).unwrap()),
            StrategyKind::WeakInstance
        );
    }

    #[test]
    fn strategy_convert_abstract_instance_fails() {
        struct Impl;
        impl Gadget for Impl {}

        let gadget: Arc<dyn Gadget> = Arc::new(Impl);
        let strategy = Strategy::Instance(InstanceStrategy::new::<dyn Gadget>(gadget));

        assert!(matches!(
            strategy.convert(StrategyKind::MultiInstance),
            Err(ConversionError::AbstractImplementation { .. })
        ));
    }

    #[test]
    fn strategy_convert_multi_instance_and_singleton_succeeds() {
        let multi = multi_instance();
        let singleton = replaced_kind(multi.convert(StrategyKind::Singleton).unwrap());
        assert_eq!(singleton, StrategyKind::Singleton);

        assert!(matches!(
            multi.convert(StrategyKind::WeakInstance),
            Err(ConversionError::Unsupported {
                from: StrategyKind::MultiInstance,
                to: StrategyKind::WeakInstance,
            })
        ));
        assert!(matches!(
            multi.convert(StrategyKind::Instance),
            Err(ConversionError::Unsupported { .. })
        ));
    }

    #[test]
    fn strategy_convert_factory_fails() {
        let factory = Strategy::Factory(FactoryStrategy::new::<Widget, _>(|_, _| {
            Ok(Arc::new(Widget))
        }));

        assert!(matches!(
            factory.convert(StrategyKind::Instance),
            Ok(Conversion::Unchanged)
        ));
        for target in [
            StrategyKind::Singleton,
            StrategyKind::MultiInstance,
            StrategyKind::WeakInstance,
        ] {
            assert!(matches!(
                factory.convert(target),
                Err(ConversionError::Unsupported { .. })
            ));
        }
    }

    #[test]
    fn strategy_with_constructor_validates_index() {
        let multi = multi_instance();
        assert!(matches!(
            multi.with_constructor(0),
            Ok(Conversion::Replaced { .. })
        ));
        assert!(matches!(
            multi.with_constructor(1),
            Err(ConversionError::ConstructorOutOfRange { index: 1, .. })
        ));
        assert!(matches!(
            instance().with_constructor(0),
            Err(ConversionError::ConstructorNotSupported {
                kind: StrategyKind::Instance
            })
        ));
    }
}
