use std::any;
use std::collections::VecDeque;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use snafu::prelude::*;

use crate::container::{Managed, SharedManaged};
use crate::introspect::{BoxError, Injectable, TypeInfo};

type Invoke = dyn Fn(&mut Arguments) -> Result<Box<dyn SharedManaged>, BoxError> + Send + Sync;

/// One way of creating a concrete type from positional arguments.
pub struct ConstructorInfo {
    parameters: Vec<ParameterInfo>,
    invoke: Box<Invoke>,
}

impl ConstructorInfo {
    pub(super) fn new<T, F>(parameters: Vec<ParameterInfo>, invoke: F) -> Self
    where
        T: Managed,
        F: Fn(&mut Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            parameters,
            invoke: Box::new(move |arguments| {
                invoke(arguments).map(|object| -> Box<dyn SharedManaged> {
                    Box::new(std::sync::Arc::new(object))
                })
            }),
        }
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    /// Calls the constructor. The result is an erased `Arc` of the described
    /// type.
    pub(crate) fn invoke(
        &self,
        mut arguments: Arguments,
    ) -> Result<Box<dyn SharedManaged>, BoxError> {
        (self.invoke)(&mut arguments)
    }
}

impl Debug for ConstructorInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ConstructorInfo")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Receives one object of the parameter type.
    Single,
    /// Receives every registered object of the parameter type.
    All,
}

/// A declared constructor parameter.
#[derive(Clone, Copy)]
pub struct ParameterInfo {
    name: Option<&'static str>,
    kind: ParameterKind,
    info: fn() -> TypeInfo,
}

impl ParameterInfo {
    pub fn new<T>(name: &'static str) -> Self
    where
        T: Injectable + ?Sized,
    {
        Self {
            name: Some(name),
            kind: ParameterKind::Single,
            info: T::type_info,
        }
    }

    /// A parameter without name information. Constructors declaring one are
    /// never selected.
    pub fn unnamed<T>() -> Self
    where
        T: Injectable + ?Sized,
    {
        Self {
            name: None,
            kind: ParameterKind::Single,
            info: T::type_info,
        }
    }

    pub fn all<T>(name: &'static str) -> Self
    where
        T: Injectable + ?Sized,
    {
        Self {
            name: Some(name),
            kind: ParameterKind::All,
            info: T::type_info,
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn type_info(&self) -> TypeInfo {
        (self.info)()
    }
}

impl Debug for ParameterInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ParameterInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("type", &self.type_info().name())
            .finish()
    }
}

pub(crate) enum Argument {
    Single(Box<dyn SharedManaged>),
    All(Vec<Box<dyn SharedManaged>>),
}

/// The positional arguments handed to a constructor, consumed front to back.
pub struct Arguments {
    values: VecDeque<Argument>,
    index: usize,
}

impl Arguments {
    pub(crate) fn new(values: Vec<Argument>) -> Self {
        Self {
            values: values.into(),
            index: 0,
        }
    }

    pub fn next<T>(&mut self) -> Result<std::sync::Arc<T>, ArgumentError>
    where
        T: Managed + ?Sized,
    {
        let index = self.index;
        self.index += 1;
        match self.values.pop_front() {
            Some(Argument::Single(object)) => {
                object
                    .downcast_arc::<T>()
                    .ok_or_else(|| ArgumentError::Mismatched {
                        index,
                        expected: any::type_name::<T>(),
                    })
            }
            Some(Argument::All(_)) => Err(ArgumentError::Mismatched {
                index,
                expected: any::type_name::<T>(),
            }),
            None => Err(ArgumentError::Missing { index }),
        }
    }

    pub fn next_all<T>(&mut self) -> Result<Vec<std::sync::Arc<T>>, ArgumentError>
    where
        T: Managed + ?Sized,
    {
        let index = self.index;
        self.index += 1;
        let mismatched = || ArgumentError::Mismatched {
            index,
            expected: any::type_name::<Vec<std::sync::Arc<T>>>(),
        };
        match self.values.pop_front() {
            Some(Argument::All(objects)) => objects
                .into_iter()
                .map(|object| object.downcast_arc::<T>().ok_or_else(mismatched))
                .collect(),
            Some(Argument::Single(_)) => Err(mismatched()),
            None => Err(ArgumentError::Missing { index }),
        }
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

#[derive(Debug, Clone, Snafu)]
#[non_exhaustive]
pub enum ArgumentError {
    #[snafu(display("constructor argument #{index} was not supplied"))]
    #[non_exhaustive]
    Missing { index: usize },
    #[snafu(display("constructor argument #{index} is not of type {expected}"))]
    #[non_exhaustive]
    Mismatched {
        index: usize,
        expected: &'static str,
    },
}
