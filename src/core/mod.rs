//! Core graph and routing types.
//!
//! This module contains the pure part of the engine:
//! - Edge lists and the adjacency graph built from them
//! - All-pairs shortest route precomputation
//! - Run modes and traversal history
//!
//! Nothing in here runs user actions; the machine module drives those.

mod graph;
mod history;
mod mode;
mod route;

pub use graph::{Adjacent, Edge, Graph};
pub use history::{StepRecord, TraversalHistory};
pub use mode::RunMode;
pub use route::{Route, RouteTable, Step};
