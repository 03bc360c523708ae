//! Waypoint: a route-precomputing finite state machine engine
//!
//! States and transitions are named actions kept in a shared [`Registry`].
//! Each [`Fsm`] connects some of them with edges, precomputes the shortest
//! route between every pair of its states, and, when asked to reach a
//! state, runs every transition and intermediate state along that route.
//! Actions may suspend the machine until an external resume arrives.
//!
//! # Core Concepts
//!
//! - **Registry**: Process-wide catalog of uniquely named actions
//! - **Routes**: Breadth-first shortest paths, rebuilt whenever an edge is added
//! - **Traversal**: Step-by-step execution with suspend and resume
//! - **Events**: "state reached" and "destination reached" notifications
//!
//! # Example
//!
//! ```rust
//! use waypoint::{Fsm, Registry, RunMode};
//! use std::sync::Arc;
//!
//! let registry: Arc<Registry<u32>> = Arc::new(Registry::new());
//! registry.register_state("idle", |_| Ok(())).unwrap();
//! registry.register_state("aim", |_| Ok(())).unwrap();
//! registry.register_state("fire", |shots| {
//!     assert_eq!(*shots, 5);
//!     Ok(())
//! }).unwrap();
//!
//! let mut fsm = Fsm::new(Arc::clone(&registry), "idle").unwrap();
//! fsm.connect("idle", "aim").unwrap()
//!     .connect("aim", "fire").unwrap()
//!     .connect("fire", "idle").unwrap();
//!
//! fsm.call_with("fire", 5).unwrap().call("idle").unwrap();
//! fsm.run().unwrap();
//!
//! assert_eq!(fsm.current_state(), "idle");
//! assert_eq!(fsm.run_mode(), RunMode::Initial);
//! ```

pub mod builder;
pub mod core;
pub mod diagram;
pub mod events;
pub mod machine;
pub mod registry;

// Re-export commonly used types
pub use builder::{BuildError, FsmBuilder};
pub use crate::core::{Edge, Graph, Route, RouteTable, RunMode, Step, TraversalHistory};
pub use diagram::{Diagram, DiagramError, DiagramTransition};
pub use events::{EventDispatcher, DESTINATION_REACHED, STATE_REACHED};
pub use machine::{Fsm, FsmError, FsmHandle};
pub use registry::{ActionError, ActionKind, ActionResult, Registry, RegistryError};
