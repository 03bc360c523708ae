//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::core::Edge;
use crate::diagram::DiagramTransition;
use crate::machine::Fsm;
use crate::registry::Registry;
use std::sync::Arc;

/// Builder for constructing machines with a fluent API.
///
/// Edges are only checked against the registry in [`FsmBuilder::build`].
///
/// # Example
///
/// ```rust
/// use waypoint::builder::FsmBuilder;
/// use waypoint::registry::Registry;
/// use std::sync::Arc;
///
/// let registry: Arc<Registry<()>> = Arc::new(Registry::new());
/// registry.register_state("red", |_| Ok(())).unwrap();
/// registry.register_state("green", |_| Ok(())).unwrap();
/// registry.register_transition("switch", |_| Ok(())).unwrap();
///
/// let fsm = FsmBuilder::new(registry)
///     .initial("red")
///     .via("red", "green", "switch")
///     .transition("green", "red")
///     .build()
///     .unwrap();
///
/// assert_eq!(fsm.edges().len(), 2);
/// ```
pub struct FsmBuilder<A> {
    registry: Arc<Registry<A>>,
    initial: Option<String>,
    edges: Vec<Edge>,
    diagram: Vec<DiagramTransition>,
}

impl<A> FsmBuilder<A> {
    /// Create a new builder on a shared registry.
    pub fn new(registry: Arc<Registry<A>>) -> Self {
        Self {
            registry,
            initial: None,
            edges: Vec::new(),
            diagram: Vec::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: &str) -> Self {
        self.initial = Some(state.to_string());
        self
    }

    /// Add an edge with no transition.
    pub fn transition(mut self, source: &str, target: &str) -> Self {
        self.edges.push(Edge::new(source, target, None));
        self
    }

    /// Add an edge that runs `transition` on the way.
    pub fn via(mut self, source: &str, target: &str, transition: &str) -> Self {
        self.edges.push(Edge::new(source, target, Some(transition)));
        self
    }

    /// Add several edges at once, e.g. from [`edges!`](crate::edges).
    pub fn edges(mut self, edges: impl IntoIterator<Item = Edge>) -> Self {
        self.edges.extend(edges);
        self
    }

    /// Add the records of a parsed diagram, imported after the plain edges.
    pub fn diagram(mut self, records: impl IntoIterator<Item = DiagramTransition>) -> Self {
        self.diagram.extend(records);
        self
    }

    /// Build the machine, declaring every edge in order.
    pub fn build(self) -> Result<Fsm<A>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        let mut fsm = Fsm::new(self.registry, &initial)?;
        for edge in &self.edges {
            fsm.create_transition(&edge.source, &edge.target, edge.transition.as_deref())?;
        }
        if !self.diagram.is_empty() {
            fsm.import_diagram(&self.diagram)?;
        }

        Ok(fsm)
    }
}
