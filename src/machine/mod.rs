//! Machine instances and their traversal engine.
//!
//! A machine declares edges between registered states, keeps a shortest
//! route table over them, and travels along those routes on request:
//!
//! - [`Fsm::go_to`] travels immediately
//! - [`Fsm::call_with`] queues a request and [`Fsm::run`] drains the queue
//! - [`Fsm::resume`] continues after a suspending action
//!
//! [`FsmHandle`] wraps a machine for use from several threads.

mod error;
mod fsm;
mod handle;

pub use error::FsmError;
pub use fsm::Fsm;
pub use handle::FsmHandle;
