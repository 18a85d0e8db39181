use crate::container::registry::{RegistrationError, RegistrationTable};
use crate::key::TypeKey;
use crate::strategy::StrategyKind;

/// Adjusts the registration that was just made.
///
/// Every method fails if the registration has been removed in the meantime
/// or its strategy can't be converted as asked.
///
/// # Examples
///
/// ```rust
/// # use minioc::prelude::*;
/// struct Clock;
///
/// #[injectable]
/// impl Clock {
///     #[inject]
///     fn new() -> Self {
///         Clock
///     }
/// }
///
/// let container = Container::new();
/// container.register::<Clock>().as_singleton().unwrap();
///
/// let first = container.resolve::<Clock>().unwrap();
/// let second = container.resolve::<Clock>().unwrap();
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// ```
pub struct RegisterOptions<'a> {
    table: &'a RegistrationTable,
    key: TypeKey,
}

impl<'a> RegisterOptions<'a> {
    pub(crate) fn new(table: &'a RegistrationTable, key: TypeKey) -> Self {
        Self { table, key }
    }

    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    /// Shares one lazily built object between all requests.
    pub fn as_singleton(self) -> Result<Self, RegistrationError> {
        self.convert(StrategyKind::Singleton)
    }

    /// Builds a new object for every request.
    pub fn as_multi_instance(self) -> Result<Self, RegistrationError> {
        self.convert(StrategyKind::MultiInstance)
    }

    /// Keeps only a weak reference to a registered instance, so it resolves
    /// only while someone else keeps it alive.
    pub fn as_weak_reference(self) -> Result<Self, RegistrationError> {
        self.convert(StrategyKind::WeakInstance)
    }

    /// Makes the container own a registered instance again.
    pub fn as_strong_reference(self) -> Result<Self, RegistrationError> {
        self.convert(StrategyKind::Instance)
    }

    /// Always calls the constructor declared at `index` instead of selecting
    /// one.
    pub fn using_constructor(self, index: usize) -> Result<Self, RegistrationError> {
        self.table
            .convert(&self.key, |strategy| strategy.with_constructor(index))?;
        Ok(self)
    }

    fn convert(self, target: StrategyKind) -> Result<Self, RegistrationError> {
        self.table
            .convert(&self.key, |strategy| strategy.convert(target))?;
        Ok(self)
    }
}

impl std::fmt::Debug for RegisterOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterOptions")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
