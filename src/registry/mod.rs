//! Catalog of named states and transitions.
//!
//! A registry is created empty, filled by registration calls, and then
//! shared read-only by every machine built on it. Names are unique across
//! both kinds: a name registered as a state can never be registered again,
//! as a state or as a transition, and vice versa.
//!
//! # Example
//!
//! ```rust
//! use waypoint::registry::{Registry, RegistryError};
//!
//! let registry: Registry<()> = Registry::new();
//! registry.register_state("idle", |_| Ok(())).unwrap();
//! registry.register_transition("loading", |_| Ok(())).unwrap();
//!
//! let err = registry.register_transition("idle", |_| Ok(())).unwrap_err();
//! assert!(matches!(err, RegistryError::DuplicateName { .. }));
//! ```

pub mod action;
pub mod error;

pub use action::{ActionDef, ActionError, ActionFn, ActionKind, ActionResult};
pub use error::RegistryError;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

struct Catalog<A> {
    states: HashMap<String, Arc<ActionDef<A>>>,
    transitions: HashMap<String, Arc<ActionDef<A>>>,
}

impl<A> Catalog<A> {
    fn kind_of(&self, name: &str) -> Option<ActionKind> {
        if self.states.contains_key(name) {
            Some(ActionKind::State)
        } else if self.transitions.contains_key(name) {
            Some(ActionKind::Transition)
        } else {
            None
        }
    }
}

/// Process-scoped registration service.
///
/// Internally synchronized, so it can be shared as `Arc<Registry<A>>`
/// between machines on different threads. Entries are never removed.
pub struct Registry<A> {
    catalog: RwLock<Catalog<A>>,
    next_machine_id: AtomicUsize,
}

impl<A> Default for Registry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Registry<A> {
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(Catalog {
                states: HashMap::new(),
                transitions: HashMap::new(),
            }),
            next_machine_id: AtomicUsize::new(0),
        }
    }

    /// Register a state that completes without suspending.
    pub fn register_state<F>(&self, name: impl Into<String>, action: F) -> Result<(), RegistryError>
    where
        F: Fn(&A) -> ActionResult + Send + Sync + 'static,
    {
        self.insert(ActionKind::State, name.into(), false, Arc::new(action))
    }

    /// Register a state after which the machine parks until resumed.
    pub fn register_suspending_state<F>(
        &self,
        name: impl Into<String>,
        action: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&A) -> ActionResult + Send + Sync + 'static,
    {
        self.insert(ActionKind::State, name.into(), true, Arc::new(action))
    }

    /// Register a transition that completes without suspending.
    pub fn register_transition<F>(
        &self,
        name: impl Into<String>,
        action: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&A) -> ActionResult + Send + Sync + 'static,
    {
        self.insert(ActionKind::Transition, name.into(), false, Arc::new(action))
    }

    /// Register a transition after which the machine parks until resumed.
    pub fn register_suspending_transition<F>(
        &self,
        name: impl Into<String>,
        action: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&A) -> ActionResult + Send + Sync + 'static,
    {
        self.insert(ActionKind::Transition, name.into(), true, Arc::new(action))
    }

    /// Register an action of either kind with an explicit suspend flag.
    pub fn register(
        &self,
        kind: ActionKind,
        name: impl Into<String>,
        suspends: bool,
        action: ActionFn<A>,
    ) -> Result<(), RegistryError> {
        self.insert(kind, name.into(), suspends, action)
    }

    fn insert(
        &self,
        kind: ActionKind,
        name: String,
        suspends: bool,
        action: ActionFn<A>,
    ) -> Result<(), RegistryError> {
        let mut catalog = self.catalog.write();

        if let Some(existing) = catalog.kind_of(&name) {
            return Err(RegistryError::DuplicateName { name, existing });
        }

        debug!(name = %name, kind = %kind, suspends, "registered action");
        let def = Arc::new(ActionDef::new(name.clone(), kind, suspends, action));
        match kind {
            ActionKind::State => catalog.states.insert(name, def),
            ActionKind::Transition => catalog.transitions.insert(name, def),
        };
        Ok(())
    }

    /// Look up a registered state.
    pub fn state(&self, name: &str) -> Result<Arc<ActionDef<A>>, RegistryError> {
        self.catalog
            .read()
            .states
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownName {
                name: name.to_string(),
                kind: ActionKind::State,
            })
    }

    /// Look up a registered transition.
    pub fn transition(&self, name: &str) -> Result<Arc<ActionDef<A>>, RegistryError> {
        self.catalog
            .read()
            .transitions
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownName {
                name: name.to_string(),
                kind: ActionKind::Transition,
            })
    }

    /// Kind registered under `name`, if any.
    pub fn kind_of(&self, name: &str) -> Option<ActionKind> {
        self.catalog.read().kind_of(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    pub fn state_count(&self) -> usize {
        self.catalog.read().states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.catalog.read().transitions.len()
    }

    /// Hand out machine identifiers in creation order.
    pub(crate) fn allocate_machine_id(&self) -> usize {
        self.next_machine_id.fetch_add(1, Ordering::Relaxed)
    }
}
