/// What to do when the requested type has no registration at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnregisteredResolutionAction {
    /// Select a constructor of the requested type and build it, resolving the
    /// constructor's dependencies recursively.
    #[default]
    AttemptResolve,
    Fail,
}

/// What to do when a named registration is requested but doesn't exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NamedResolutionFailureAction {
    /// Retry against the unnamed registration of the same type.
    AttemptUnnamedResolution,
    #[default]
    Fail,
}

/// The policy applied by a single resolution or resolvability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResolveOptions {
    pub unregistered_resolution_action: UnregisteredResolutionAction,
    pub named_resolution_failure_action: NamedResolutionFailureAction,
}

impl ResolveOptions {
    pub const DEFAULT: Self = Self::new(
        UnregisteredResolutionAction::AttemptResolve,
        NamedResolutionFailureAction::Fail,
    );

    pub const FAIL_UNREGISTERED_AND_NAME_NOT_FOUND: Self = Self::new(
        UnregisteredResolutionAction::Fail,
        NamedResolutionFailureAction::Fail,
    );

    pub const FAIL_UNREGISTERED_ONLY: Self = Self::new(
        UnregisteredResolutionAction::Fail,
        NamedResolutionFailureAction::AttemptUnnamedResolution,
    );

    pub const FAIL_NAME_NOT_FOUND_ONLY: Self = Self::new(
        UnregisteredResolutionAction::AttemptResolve,
        NamedResolutionFailureAction::Fail,
    );

    pub const fn new(
        unregistered_resolution_action: UnregisteredResolutionAction,
        named_resolution_failure_action: NamedResolutionFailureAction,
    ) -> Self {
        Self {
            unregistered_resolution_action,
            named_resolution_failure_action,
        }
    }

    pub fn with_unregistered_resolution_action(
        mut self,
        action: UnregisteredResolutionAction,
    ) -> Self {
        self.unregistered_resolution_action = action;
        self
    }

    pub fn with_named_resolution_failure_action(
        mut self,
        action: NamedResolutionFailureAction,
    ) -> Self {
        self.named_resolution_failure_action = action;
        self
    }

    pub(crate) fn attempts_unregistered(&self) -> bool {
        self.unregistered_resolution_action == UnregisteredResolutionAction::AttemptResolve
    }

    pub(crate) fn attempts_unnamed(&self) -> bool {
        self.named_resolution_failure_action
            == NamedResolutionFailureAction::AttemptUnnamedResolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_options_default_succeeds() {
        let options = ResolveOptions::default();
        assert_eq!(options, ResolveOptions::DEFAULT);
        assert!(options.attempts_unregistered());
        assert!(!options.attempts_unnamed());
    }

    #[test]
    fn resolve_options_builder_succeeds() {
        let options = ResolveOptions::default()
            .with_unregistered_resolution_action(UnregisteredResolutionAction::Fail)
            .with_named_resolution_failure_action(
                NamedResolutionFailureAction::AttemptUnnamedResolution,
            );
        assert_eq!(options, ResolveOptions::FAIL_UNREGISTERED_ONLY);
    }
}
