use crate::key::TypeKey;

/// The chain of implementation types under construction on the current call
/// stack.
#[derive(Clone, Default)]
pub struct CallContext<'a> {
    trace: Option<InjectionTrace<'a>>,
}

impl<'a> CallContext<'a> {
    /// A context with nothing under construction.
    pub fn root() -> Self {
        Self { trace: None }
    }

    pub fn append<'b>(&'b self, key: &'b TypeKey) -> CallContext<'b> {
        CallContext {
            trace: Some(InjectionTrace {
                key,
                previous: self.trace.as_ref(),
            }),
        }
    }

    /// Returns true if an object of `key` is already being constructed
    /// further up the stack.
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.keys().any(|k| k == key)
    }

    pub fn depth(&self) -> usize {
        self.keys().count()
    }

    /// Iterates from the innermost key outwards.
    pub fn keys(&self) -> Keys<'_> {
        Keys {
            current: self.trace.as_ref(),
        }
    }
}

pub struct Keys<'a> {
    current: Option<&'a InjectionTrace<'a>>,
}

impl<'a> Iterator for Keys<'a> {
    type Item = &'a TypeKey;

    fn next(&mut self) -> Option<Self::Item> {
        let trace = self.current?;
        self.current = trace.previous;
        Some(trace.key)
    }
}

#[derive(Clone)]
struct InjectionTrace<'a> {
    key: &'a TypeKey,
    previous: Option<&'a InjectionTrace<'a>>,
}
