//! Build errors for the machine builder.

use crate::machine::FsmError;
use thiserror::Error;

/// Errors that can occur when building a machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(name) before .build()")]
    MissingInitialState,

    #[error(transparent)]
    Fsm(#[from] FsmError),
}
