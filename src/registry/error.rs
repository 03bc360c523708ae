//! Registry error types.

use super::action::ActionKind;
use thiserror::Error;

/// Errors raised while registering or resolving named actions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// The name is already taken by a state or a transition
    #[error("Name '{name}' is already registered as a {existing}")]
    DuplicateName { name: String, existing: ActionKind },

    /// No action of the expected kind is registered under the name
    #[error("No {kind} named '{name}' is registered")]
    UnknownName { name: String, kind: ActionKind },
}
