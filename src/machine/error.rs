//! Machine error types.

use crate::core::RunMode;
use crate::diagram::DiagramError;
use crate::registry::{ActionError, RegistryError};
use thiserror::Error;

/// Errors that can occur while declaring or driving a machine.
///
/// Nothing is retried or rolled back: if an action fails after the
/// current state moved, the machine stays where it got to. The rest of
/// the route is dropped and the run mode settles.
#[derive(Debug, Error)]
pub enum FsmError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("State '{name}' is not declared on machine {machine}")]
    NotDeclared { machine: usize, name: String },

    #[error("No route from '{from}' to '{to}'")]
    Unreachable { from: String, to: String },

    #[error("Resume called while the machine is {mode}, not waiting for a callback")]
    InvalidResume { mode: RunMode },

    #[error("Action '{name}' failed: {source}")]
    ActionFailed {
        name: String,
        #[source]
        source: ActionError,
    },

    #[error("Handler for event '{event}' failed: {source}")]
    HandlerFailed {
        event: String,
        #[source]
        source: ActionError,
    },

    #[error(transparent)]
    Diagram(#[from] DiagramError),
}
