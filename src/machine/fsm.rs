//! Machine instance: declaration, routing and traversal.

use crate::core::{Edge, Graph, RouteTable, RunMode, Step, StepRecord, TraversalHistory};
use crate::diagram::{self, Diagram};
use crate::events::{EventDispatcher, DESTINATION_REACHED, STATE_REACHED};
use crate::machine::error::FsmError;
use crate::registry::{ActionDef, ActionKind, ActionResult, Registry, RegistryError};
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Destination being travelled to, with the steps still ahead.
struct PendingDestination<A> {
    destination: String,
    args: A,
    remaining: VecDeque<Step>,
}

/// Queued request made through [`Fsm::call_with`].
struct Request<A> {
    destination: String,
    args: A,
}

/// A single finite state machine.
///
/// Each machine owns its edges, graph, route table, event handlers and
/// request queue. Machines built on the same registry share only the
/// registered actions.
///
/// # Example
///
/// ```rust
/// use waypoint::registry::Registry;
/// use waypoint::machine::Fsm;
/// use std::sync::Arc;
///
/// let registry: Arc<Registry<u32>> = Arc::new(Registry::new());
/// registry.register_state("idle", |_| Ok(())).unwrap();
/// registry.register_suspending_state("load", |_| Ok(())).unwrap();
/// registry.register_state("aim", |_| Ok(())).unwrap();
/// registry.register_state("fire", |_| Ok(())).unwrap();
/// registry.register_transition("loading", |_| Ok(())).unwrap();
/// registry.register_transition("aiming", |_| Ok(())).unwrap();
///
/// let mut fsm = Fsm::new(Arc::clone(&registry), "idle").unwrap();
/// fsm.create_transition("idle", "load", Some("loading")).unwrap()
///     .create_transition("load", "aim", Some("aiming")).unwrap()
///     .create_transition("aim", "fire", None).unwrap()
///     .create_transition("fire", "idle", None).unwrap();
///
/// fsm.go_to("aim", 0).unwrap();
/// assert_eq!(fsm.current_state(), "load");
/// assert!(fsm.run_mode().is_parked());
///
/// fsm.resume().unwrap();
/// assert_eq!(fsm.current_state(), "aim");
/// ```
pub struct Fsm<A = ()> {
    id: usize,
    registry: Arc<Registry<A>>,
    initial: String,
    current: String,
    mode: RunMode,
    edges: Vec<Edge>,
    states: HashMap<String, Arc<ActionDef<A>>>,
    transitions: HashMap<String, Arc<ActionDef<A>>>,
    graph: Graph,
    routes: RouteTable,
    pending: Option<PendingDestination<A>>,
    queue: VecDeque<Request<A>>,
    events: EventDispatcher,
    history: TraversalHistory,
}

impl<A> Fsm<A> {
    /// Create a machine sitting in `initial`, which must be a registered state.
    pub fn new(registry: Arc<Registry<A>>, initial: &str) -> Result<Self, FsmError> {
        let initial_def = registry.state(initial)?;
        let id = registry.allocate_machine_id();
        let graph = Graph::new().with_node(initial);
        let routes = RouteTable::compute(&graph);

        info!(machine = id, initial, "created state machine");

        Ok(Self {
            id,
            registry,
            initial: initial.to_string(),
            current: initial.to_string(),
            mode: RunMode::Initial,
            edges: Vec::new(),
            states: HashMap::from([(initial.to_string(), initial_def)]),
            transitions: HashMap::new(),
            graph,
            routes,
            pending: None,
            queue: VecDeque::new(),
            events: EventDispatcher::with_events([STATE_REACHED, DESTINATION_REACHED]),
            history: TraversalHistory::new(),
        })
    }

    /// Declare an edge from `source` to `target`, optionally through a transition.
    ///
    /// All names are resolved against the registry before anything is
    /// recorded, so a failed declaration leaves the machine unchanged.
    /// Routes are recomputed from scratch afterwards.
    pub fn create_transition(
        &mut self,
        source: &str,
        target: &str,
        transition: Option<&str>,
    ) -> Result<&mut Self, FsmError> {
        let source_def = self.registry.state(source)?;
        let target_def = self.registry.state(target)?;
        let transition_def = transition
            .map(|name| self.registry.transition(name))
            .transpose()?;

        self.states.insert(source.to_string(), source_def);
        self.states.insert(target.to_string(), target_def);
        if let Some(def) = transition_def {
            self.transitions.insert(def.name().to_string(), def);
        }

        debug!(machine = self.id, from = source, to = target, transition, "declared edge");
        self.edges.push(Edge::new(source, target, transition));
        self.rebuild_routes();
        Ok(self)
    }

    /// Declare an edge with no transition.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<&mut Self, FsmError> {
        self.create_transition(source, target, None)
    }

    /// Declare an edge that runs `transition` on the way.
    pub fn connect_via(
        &mut self,
        source: &str,
        target: &str,
        transition: &str,
    ) -> Result<&mut Self, FsmError> {
        self.create_transition(source, target, Some(transition))
    }

    /// Declare every edge of a parsed diagram, or none of them.
    pub fn import_diagram<D>(&mut self, diagram: &D) -> Result<&mut Self, FsmError>
    where
        D: Diagram + ?Sized,
    {
        let records = diagram.transitions();
        diagram::check(self.registry.as_ref(), &records)?;

        for record in &records {
            self.create_transition(&record.source, &record.target, record.transition.as_deref())?;
        }
        Ok(self)
    }

    fn rebuild_routes(&mut self) {
        self.graph = Graph::from_edges(&self.edges).with_node(&self.initial);
        self.routes = RouteTable::compute(&self.graph);
        debug!(
            machine = self.id,
            states = self.graph.len(),
            edges = self.graph.edge_count(),
            "rebuilt routes"
        );
    }

    /// Subscribe to the event raised after each transition and intermediate state.
    pub fn on_state_reached<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn() -> ActionResult + Send + Sync + 'static,
    {
        self.events.subscribe(STATE_REACHED, handler);
        self
    }

    /// Subscribe to the event raised when a traversal arrives.
    pub fn on_destination_reached<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn() -> ActionResult + Send + Sync + 'static,
    {
        self.events.subscribe(DESTINATION_REACHED, handler);
        self
    }

    /// Escape hatch: jump to `name` and run it with `args`, ignoring routes.
    ///
    /// The pending destination and the request queue are left alone.
    pub fn force_change_state(&mut self, name: &str, args: A) -> Result<&mut Self, FsmError> {
        let def = self.declared_state(name)?;
        warn!(machine = self.id, from = %self.current, to = name, "forcing state change");

        self.mode = RunMode::Idle;
        self.current = name.to_string();
        invoke(&def, &args)?;
        Ok(self)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn initial_state(&self) -> &str {
        &self.initial
    }

    pub fn current_state(&self) -> &str {
        &self.current
    }

    pub fn run_mode(&self) -> RunMode {
        self.mode
    }

    /// Destination of an interrupted traversal, if any.
    pub fn pending_destination(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.destination.as_str())
    }

    /// Number of requests waiting for [`Fsm::run`].
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Whether `name` was connected on this machine (or is its initial state).
    pub fn is_declared(&self, name: &str) -> bool {
        self.states.contains_key(name) || self.transitions.contains_key(name)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn history(&self) -> &TraversalHistory {
        &self.history
    }

    pub fn registry(&self) -> &Arc<Registry<A>> {
        &self.registry
    }

    fn declared_state(&self, name: &str) -> Result<Arc<ActionDef<A>>, FsmError> {
        self.states
            .get(name)
            .cloned()
            .ok_or_else(|| FsmError::NotDeclared {
                machine: self.id,
                name: name.to_string(),
            })
    }

    fn route_def(&self, name: &str, kind: ActionKind) -> Result<Arc<ActionDef<A>>, FsmError> {
        let defs = match kind {
            ActionKind::State => &self.states,
            ActionKind::Transition => &self.transitions,
        };
        defs.get(name).cloned().ok_or_else(|| {
            RegistryError::UnknownName {
                name: name.to_string(),
                kind,
            }
            .into()
        })
    }

    fn raise(&self, event: &str) -> Result<(), FsmError> {
        self.events
            .raise(event)
            .map_err(|source| FsmError::HandlerFailed {
                event: event.to_string(),
                source,
            })
    }

    fn park(&mut self, after: &str) {
        self.mode = RunMode::WaitingForCallback;
        debug!(
            machine = self.id,
            after,
            pending = ?self.pending_destination(),
            "waiting for callback"
        );
    }

    fn settle(&mut self) {
        self.mode = RunMode::settled(&self.current, &self.initial);
    }
}

impl<A: Default> Fsm<A> {
    /// Travel from the current state to `destination` along the shortest route.
    ///
    /// Only the destination state receives `args`; transitions and
    /// intermediate states get `A::default()`. Stops after the first step
    /// whose transition or state suspends; [`Fsm::resume`] continues from
    /// the next step.
    pub fn go_to(&mut self, destination: &str, args: A) -> Result<&mut Self, FsmError> {
        let route = self
            .routes
            .route(&self.current, destination)
            .ok_or_else(|| FsmError::Unreachable {
                from: self.current.clone(),
                to: destination.to_string(),
            })?;

        let mut remaining: VecDeque<Step> = route.steps().iter().cloned().collect();
        if remaining.is_empty() {
            // already there: re-enter the current state as the final step
            remaining.push_back(Step::new(destination, None));
        }

        if let Some(previous) = &self.pending {
            warn!(
                machine = self.id,
                previous = %previous.destination,
                destination,
                "replacing pending destination"
            );
        }
        debug!(
            machine = self.id,
            from = %self.current,
            destination,
            steps = remaining.len(),
            "starting traversal"
        );

        self.pending = Some(PendingDestination {
            destination: destination.to_string(),
            args,
            remaining,
        });
        self.traverse()?;
        Ok(self)
    }

    /// Queue a request to travel to `name` with empty arguments.
    pub fn call(&mut self, name: &str) -> Result<&mut Self, FsmError> {
        self.call_with(name, A::default())
    }

    /// Queue a request to travel to `name`, delivering `args` on arrival.
    ///
    /// Requests are accepted even while the machine waits for a callback;
    /// nothing runs until [`Fsm::run`].
    pub fn call_with(&mut self, name: &str, args: A) -> Result<&mut Self, FsmError> {
        if !self.states.contains_key(name) {
            return Err(FsmError::NotDeclared {
                machine: self.id,
                name: name.to_string(),
            });
        }

        self.queue.push_back(Request {
            destination: name.to_string(),
            args,
        });
        Ok(self)
    }

    /// Drain queued requests in FIFO order.
    ///
    /// Stops as soon as the machine parks; the rest of the queue stays put.
    pub fn run(&mut self) -> Result<&mut Self, FsmError> {
        while !self.mode.is_parked() {
            let Some(request) = self.queue.pop_front() else {
                break;
            };
            self.go_to(&request.destination, request.args)?;
        }
        Ok(self)
    }

    /// Continue after a suspending action.
    ///
    /// Finishes the interrupted route, if any, then drains the queue.
    pub fn resume(&mut self) -> Result<&mut Self, FsmError> {
        if !self.mode.is_parked() {
            warn!(machine = self.id, mode = %self.mode, "rejected resume");
            return Err(FsmError::InvalidResume { mode: self.mode });
        }

        debug!(machine = self.id, pending = ?self.pending_destination(), "resuming");
        self.settle();
        if self.pending.is_some() {
            self.traverse()?;
        }
        self.run()
    }

    /// Escape hatch: run the initial state and move back to it without
    /// taking any route.
    pub fn force_reset(&mut self) -> Result<&mut Self, FsmError> {
        let def = self.declared_state(&self.initial)?;
        warn!(machine = self.id, from = %self.current, "forcing reset");

        invoke(&def, &A::default())?;
        self.current = self.initial.clone();
        self.mode = RunMode::Initial;
        Ok(self)
    }

    /// Walk the pending route. On failure the current state stays where
    /// it got to, but the route is dropped and the mode settles.
    fn traverse(&mut self) -> Result<(), FsmError> {
        let result = self.advance();
        if let Err(err) = &result {
            warn!(
                machine = self.id,
                state = %self.current,
                pending = ?self.pending_destination(),
                error = %err,
                "traversal aborted"
            );
            self.pending = None;
            self.settle();
        }
        result
    }

    fn advance(&mut self) -> Result<(), FsmError> {
        loop {
            let Some(pending) = self.pending.as_mut() else {
                return Ok(());
            };
            let Some(step) = pending.remaining.pop_front() else {
                self.pending = None;
                return Ok(());
            };
            let is_final = step.state == pending.destination;

            let mut suspends_after = None;
            if let Some(name) = step.transition.as_deref() {
                let def = self.route_def(name, ActionKind::Transition)?;
                self.mode = RunMode::InTransition;
                debug!(machine = self.id, transition = name, "running transition");

                invoke(&def, &A::default())?;
                self.raise(STATE_REACHED)?;

                if def.suspends() {
                    suspends_after = Some(name);
                }
            }

            let def = self.route_def(&step.state, ActionKind::State)?;
            self.mode = RunMode::RunningState;
            let from = std::mem::replace(&mut self.current, step.state.clone());
            self.history.record(StepRecord {
                from,
                to: step.state.clone(),
                transition: step.transition.clone(),
                timestamp: Utc::now(),
            });

            if is_final {
                self.raise(DESTINATION_REACHED)?;
                let args = self.pending.take().map(|p| p.args).unwrap_or_default();
                info!(machine = self.id, state = %step.state, "destination reached");
                invoke(&def, &args)?;
            } else {
                self.raise(STATE_REACHED)?;
                debug!(machine = self.id, state = %step.state, "passing through");
                invoke(&def, &A::default())?;
            }

            self.settle();

            if def.suspends() {
                suspends_after = Some(step.state.as_str());
            }
            if let Some(after) = suspends_after {
                self.park(after);
                return Ok(());
            }
            if is_final {
                return Ok(());
            }
        }
    }
}

fn invoke<A>(def: &ActionDef<A>, args: &A) -> Result<(), FsmError> {
    def.invoke(args).map_err(|source| FsmError::ActionFailed {
        name: def.name().to_string(),
        source,
    })
}

impl<A> fmt::Debug for Fsm<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fsm")
            .field("id", &self.id)
            .field("initial", &self.initial)
            .field("current", &self.current)
            .field("mode", &self.mode)
            .field("pending", &self.pending_destination())
            .field("queued", &self.queue.len())
            .field("edges", &self.edges.len())
            .finish_non_exhaustive()
    }
}
