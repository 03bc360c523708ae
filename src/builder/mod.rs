//! Builder API for ergonomic machine construction.
//!
//! This module provides a fluent builder and the [`edges!`](crate::edges)
//! macro for declaring a machine's graph with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::FsmBuilder;
