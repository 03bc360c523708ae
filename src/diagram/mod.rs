//! Import of state diagrams that were parsed elsewhere.
//!
//! Parsing a textual diagram notation is left to the caller; this module
//! only consumes the resolved transition records. Records are checked
//! against the registry using `Validation`, so a rejected diagram reports
//! every unknown name at once instead of the first one.
//!
//! # Example
//!
//! ```rust
//! use waypoint::diagram::DiagramTransition;
//!
//! // Parsers infer "source_target" as the name of an unlabelled edge.
//! let plain = DiagramTransition::from_inferred("aim", "fire", "aim_fire");
//! assert!(plain.transition.is_none());
//!
//! let labelled = DiagramTransition::from_inferred("idle", "load", "loading");
//! assert_eq!(labelled.transition.as_deref(), Some("loading"));
//! ```

use crate::registry::{Registry, RegistryError};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// One edge of a parsed diagram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagramTransition {
    pub source: String,
    pub target: String,
    pub transition: Option<String>,
}

impl DiagramTransition {
    pub fn new(source: impl Into<String>, target: impl Into<String>, transition: Option<&str>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            transition: transition.map(str::to_string),
        }
    }

    /// Build a record from a parser's inferred transition name.
    ///
    /// An inferred name equal to `"{source}_{target}"` means the edge has
    /// no transition.
    pub fn from_inferred(source: &str, target: &str, inferred: &str) -> Self {
        let transition = if inferred == unlabelled_name(source, target) {
            None
        } else {
            Some(inferred)
        };
        Self::new(source, target, transition)
    }
}

/// Name a diagram parser infers for an edge without a transition label.
pub fn unlabelled_name(source: &str, target: &str) -> String {
    format!("{source}_{target}")
}

/// A parsed diagram: an ordered collection of transition records.
pub trait Diagram {
    fn transitions(&self) -> Vec<DiagramTransition>;
}

impl Diagram for [DiagramTransition] {
    fn transitions(&self) -> Vec<DiagramTransition> {
        self.to_vec()
    }
}

impl Diagram for Vec<DiagramTransition> {
    fn transitions(&self) -> Vec<DiagramTransition> {
        self.clone()
    }
}

/// A diagram that references names missing from the registry.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Diagram rejected with {} unresolved name(s)", .problems.len())]
pub struct DiagramError {
    problems: Vec<RegistryError>,
}

impl DiagramError {
    pub fn problems(&self) -> &[RegistryError] {
        &self.problems
    }
}

/// Check every record, accumulating ALL lookup failures.
pub fn validate<A>(
    registry: &Registry<A>,
    records: &[DiagramTransition],
) -> Validation<(), NonEmptyVec<RegistryError>> {
    let mut checks: Vec<Validation<(), NonEmptyVec<RegistryError>>> = Vec::new();

    for record in records {
        checks.push(lookup(registry.state(&record.source).map(|_| ())));
        checks.push(lookup(registry.state(&record.target).map(|_| ())));
        if let Some(name) = &record.transition {
            checks.push(lookup(registry.transition(name).map(|_| ())));
        }
    }

    Validation::all_vec(checks).map(|_| ())
}

/// [`validate`], collapsed into a `Result`.
pub fn check<A>(registry: &Registry<A>, records: &[DiagramTransition]) -> Result<(), DiagramError> {
    match validate(registry, records) {
        Validation::Success(_) => Ok(()),
        Validation::Failure(errors) => Err(DiagramError {
            problems: errors.iter().cloned().collect(),
        }),
    }
}

fn lookup(result: Result<(), RegistryError>) -> Validation<(), NonEmptyVec<RegistryError>> {
    match result {
        Ok(()) => Validation::success(()),
        Err(err) => Validation::fail(err),
    }
}
