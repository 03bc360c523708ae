//! Traversal history tracking.
//!
//! Every routed step a machine executes is appended to its history, in
//! execution order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single executed step.
///
/// # Example
///
/// ```rust
/// use waypoint::core::StepRecord;
/// use chrono::Utc;
///
/// let record = StepRecord {
///     from: "idle".to_string(),
///     to: "load".to_string(),
///     transition: Some("loading".to_string()),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.to, "load");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// The state being left
    pub from: String,
    /// The state being entered
    pub to: String,
    /// The transition taken, if the edge had one
    pub transition: Option<String>,
    /// When the state was entered
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of executed steps.
///
/// # Example
///
/// ```rust
/// use waypoint::core::{StepRecord, TraversalHistory};
/// use chrono::Utc;
///
/// let mut history = TraversalHistory::new();
/// history.record(StepRecord {
///     from: "idle".to_string(),
///     to: "load".to_string(),
///     transition: Some("loading".to_string()),
///     timestamp: Utc::now(),
/// });
/// history.record(StepRecord {
///     from: "load".to_string(),
///     to: "aim".to_string(),
///     transition: None,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.path(), vec!["idle", "load", "aim"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TraversalHistory {
    records: Vec<StepRecord>,
}

impl TraversalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: StepRecord) {
        self.records.push(record);
    }

    /// States traversed: the first `from`, then every `to`.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.first() {
            path.push(first.from.as_str());
        }
        path.extend(self.records.iter().map(|r| r.to.as_str()));
        path
    }

    /// Time between the first and last recorded step.
    ///
    /// Returns `None` when nothing has been recorded.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.first()?, self.records.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&StepRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
