//! Shared handle serializing access to one machine.

use crate::core::RunMode;
use crate::machine::error::FsmError;
use crate::machine::fsm::Fsm;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Cloneable, thread-safe handle to a machine.
///
/// Every call takes the machine's lock for its whole duration, so a
/// resume coming from a timer or another thread never interleaves with
/// a traversal. Actions run while the lock is held and must not call
/// back into the same handle.
///
/// # Example
///
/// ```rust
/// use waypoint::machine::{Fsm, FsmHandle};
/// use waypoint::registry::Registry;
/// use std::sync::Arc;
///
/// let registry: Arc<Registry<()>> = Arc::new(Registry::new());
/// registry.register_state("idle", |_| Ok(())).unwrap();
/// registry.register_suspending_state("busy", |_| Ok(())).unwrap();
///
/// let mut fsm = Fsm::new(registry, "idle").unwrap();
/// fsm.connect("idle", "busy").unwrap();
///
/// let handle = FsmHandle::new(fsm);
/// handle.go_to("busy", ()).unwrap();
///
/// let remote = handle.clone();
/// std::thread::spawn(move || remote.resume()).join().unwrap().unwrap();
/// assert!(!handle.run_mode().is_parked());
/// ```
pub struct FsmHandle<A = ()> {
    inner: Arc<Mutex<Fsm<A>>>,
}

impl<A> Clone for FsmHandle<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> FsmHandle<A> {
    pub fn new(fsm: Fsm<A>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(fsm)),
        }
    }

    /// Exclusive access for calls the handle does not wrap.
    pub fn lock(&self) -> MutexGuard<'_, Fsm<A>> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access to the machine.
    pub fn with<R>(&self, f: impl FnOnce(&mut Fsm<A>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn current_state(&self) -> String {
        self.inner.lock().current_state().to_string()
    }

    pub fn run_mode(&self) -> RunMode {
        self.inner.lock().run_mode()
    }

    pub fn pending_destination(&self) -> Option<String> {
        self.inner.lock().pending_destination().map(str::to_string)
    }
}

impl<A: Default> FsmHandle<A> {
    pub fn go_to(&self, destination: &str, args: A) -> Result<(), FsmError> {
        self.inner.lock().go_to(destination, args).map(|_| ())
    }

    pub fn call_with(&self, name: &str, args: A) -> Result<(), FsmError> {
        self.inner.lock().call_with(name, args).map(|_| ())
    }

    pub fn call(&self, name: &str) -> Result<(), FsmError> {
        self.inner.lock().call(name).map(|_| ())
    }

    pub fn run(&self) -> Result<(), FsmError> {
        self.inner.lock().run().map(|_| ())
    }

    /// Continuation hook to hand to whatever completes a suspended step.
    pub fn resume(&self) -> Result<(), FsmError> {
        self.inner.lock().resume().map(|_| ())
    }

    pub fn force_reset(&self) -> Result<(), FsmError> {
        self.inner.lock().force_reset().map(|_| ())
    }
}
