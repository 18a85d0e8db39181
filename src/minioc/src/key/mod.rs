use std::any::{self, TypeId};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};

use crate::introspect::TypeInfo;

/// Identifies a registration: the requested type plus an optional name.
///
/// Names compare case-insensitively and the empty name denotes the unnamed
/// registration of a type.
///
/// # Examples
///
/// ```rust
/// # use minioc::key::TypeKey;
/// assert_eq!(TypeKey::named::<i32>("Answer"), TypeKey::named::<i32>("ANSWER"));
/// assert_ne!(TypeKey::named::<i32>("answer"), TypeKey::of::<i32>());
/// assert_ne!(TypeKey::of::<i32>(), TypeKey::of::<i64>());
/// ```
#[derive(Clone)]
pub struct TypeKey {
    target: TypeId,
    type_name: &'static str,
    name: String,
}

impl TypeKey {
    /// Creates the key of the unnamed registration of `T`.
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self::named::<T>("")
    }

    /// Creates the key of the registration of `T` under `name`.
    pub fn named<T>(name: &str) -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            target: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
            name: name.to_owned(),
        }
    }

    pub(crate) fn from_info(info: &TypeInfo, name: &str) -> Self {
        Self {
            target: info.id(),
            type_name: info.name(),
            name: name.to_owned(),
        }
    }

    pub fn target_type(&self) -> TypeId {
        self.target
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }

    /// Returns the key of the unnamed registration of the same type.
    pub fn unnamed(&self) -> Self {
        Self {
            target: self.target,
            type_name: self.type_name,
            name: String::new(),
        }
    }

    pub(crate) fn folded_name(&self) -> String {
        self.name.chars().flat_map(char::to_lowercase).collect()
    }
}

impl Debug for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.is_named() {
            write!(f, "{}@{:?}", self.type_name, self.name)
        } else {
            write!(f, "{}", self.type_name)
        }
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self
                .name
                .chars()
                .flat_map(char::to_lowercase)
                .eq(other.name.chars().flat_map(char::to_lowercase))
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
        for c in self.name.chars().flat_map(char::to_lowercase) {
            c.hash(state);
        }
        0xffu8.hash(state);
    }
}
