//! Named actions: the callables behind states and transitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by a user action or event handler.
///
/// # Example
///
/// ```rust
/// use waypoint::registry::ActionError;
///
/// let err = ActionError::new("magazine empty");
/// assert_eq!(err.to_string(), "magazine empty");
///
/// let from_str: ActionError = "jammed".into();
/// assert_eq!(from_str.message(), "jammed");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ActionError {
    message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Outcome of running an action.
pub type ActionResult = Result<(), ActionError>;

/// Callable shared between the registry and every machine that uses it.
///
/// Every action takes the same argument bundle type; steps that receive
/// no arguments are handed `A::default()`.
pub type ActionFn<A> = Arc<dyn Fn(&A) -> ActionResult + Send + Sync>;

/// Whether a name denotes a state or a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    State,
    Transition,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State => f.write_str("state"),
            Self::Transition => f.write_str("transition"),
        }
    }
}

/// A registered state or transition.
///
/// Immutable once registered. `suspends` means the machine parks after
/// this action runs and waits for an explicit resume.
pub struct ActionDef<A> {
    name: String,
    kind: ActionKind,
    suspends: bool,
    action: ActionFn<A>,
}

impl<A> ActionDef<A> {
    pub(crate) fn new(name: String, kind: ActionKind, suspends: bool, action: ActionFn<A>) -> Self {
        Self {
            name,
            kind,
            suspends,
            action,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn suspends(&self) -> bool {
        self.suspends
    }

    pub fn invoke(&self, args: &A) -> ActionResult {
        (self.action)(args)
    }
}

impl<A> fmt::Debug for ActionDef<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("suspends", &self.suspends)
            .finish_non_exhaustive()
    }
}
