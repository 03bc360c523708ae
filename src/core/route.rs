//! All-pairs shortest routes over a state graph.
//!
//! Edges are unweighted, so a FIFO breadth-first search from each state
//! yields routes with the fewest edges. When several shortest routes
//! exist, the one discovered first wins, which follows the declaration
//! order of the adjacency lists.

use super::graph::Graph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};

/// One hop of a route: the state arrived at and the transition taken to get there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub state: String,
    pub transition: Option<String>,
}

impl Step {
    pub fn new(state: impl Into<String>, transition: Option<&str>) -> Self {
        Self {
            state: state.into(),
            transition: transition.map(str::to_string),
        }
    }
}

/// Ordered steps leading from one state to another.
///
/// The route from a state to itself is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    steps: Vec<Step>,
}

impl Route {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// State names visited along the route, excluding the start.
    pub fn states(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.state.as_str()).collect()
    }

    fn extended(&self, step: Step) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }
}

/// Shortest route between every ordered pair of connected states.
///
/// # Example
///
/// ```rust
/// use waypoint::core::{Edge, Graph, RouteTable};
///
/// let graph = Graph::from_edges(&[
///     Edge::new("idle", "load", Some("loading")),
///     Edge::new("load", "aim", Some("aiming")),
///     Edge::new("aim", "fire", None),
///     Edge::new("fire", "idle", None),
/// ]);
/// let routes = RouteTable::compute(&graph);
///
/// let route = routes.route("idle", "fire").unwrap();
/// assert_eq!(route.states(), vec!["load", "aim", "fire"]);
/// assert!(routes.route("aim", "aim").unwrap().is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    routes: BTreeMap<String, BTreeMap<String, Route>>,
}

impl RouteTable {
    /// Run one breadth-first search per graph state.
    pub fn compute(graph: &Graph) -> Self {
        let routes = graph
            .states()
            .map(|start| (start.to_string(), shortest_from(graph, start)))
            .collect();
        Self { routes }
    }

    /// Shortest route from `from` to `to`, if `to` is reachable.
    pub fn route(&self, from: &str, to: &str) -> Option<&Route> {
        self.routes.get(from).and_then(|targets| targets.get(to))
    }

    pub fn is_reachable(&self, from: &str, to: &str) -> bool {
        self.route(from, to).is_some()
    }

    /// States reachable from `from`, including itself.
    pub fn reachable_from(&self, from: &str) -> Vec<&str> {
        self.routes
            .get(from)
            .map(|targets| targets.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Number of source states in the table.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn shortest_from(graph: &Graph, start: &str) -> BTreeMap<String, Route> {
    let mut found = BTreeMap::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&str, Route)> = VecDeque::from([(start, Route::default())]);

    while let Some((state, route)) = queue.pop_front() {
        // a state can be queued more than once before it is first popped
        if !visited.insert(state) {
            continue;
        }

        for next in graph.neighbors(state) {
            if !visited.contains(next.target.as_str()) {
                let step = Step {
                    state: next.target.clone(),
                    transition: next.transition.clone(),
                };
                queue.push_back((next.target.as_str(), route.extended(step)));
            }
        }

        found.insert(state.to_string(), route);
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Edge;

    fn turret() -> RouteTable {
        RouteTable::compute(&Graph::from_edges(&[
            Edge::new("idle", "load", Some("loading")),
            Edge::new("load", "aim", Some("aiming")),
            Edge::new("aim", "fire", None),
            Edge::new("fire", "idle", None),
        ]))
    }

    #[test]
    fn self_route_is_empty() {
        let routes = turret();
        for state in ["idle", "load", "aim", "fire"] {
            assert!(routes.route(state, state).unwrap().is_empty());
        }
    }

    #[test]
    fn route_carries_transitions() {
        let routes = turret();
        let route = routes.route("idle", "aim").unwrap();

        assert_eq!(
            route.steps(),
            &[
                Step::new("load", Some("loading")),
                Step::new("aim", Some("aiming")),
            ]
        );
    }

    #[test]
    fn cycle_wraps_around() {
        let routes = turret();
        let route = routes.route("fire", "load").unwrap();

        assert_eq!(route.states(), vec!["idle", "load"]);
    }

    #[test]
    fn shortcut_beats_longer_path() {
        let routes = RouteTable::compute(&Graph::from_edges(&[
            Edge::new("a", "b", None),
            Edge::new("b", "c", None),
            Edge::new("c", "d", None),
            Edge::new("a", "d", Some("jump")),
        ]));

        let route = routes.route("a", "d").unwrap();
        assert_eq!(route.steps(), &[Step::new("d", Some("jump"))]);
    }

    #[test]
    fn ties_resolve_in_declaration_order() {
        let routes = RouteTable::compute(&Graph::from_edges(&[
            Edge::new("a", "x", None),
            Edge::new("a", "y", None),
            Edge::new("x", "z", None),
            Edge::new("y", "z", None),
        ]));

        assert_eq!(routes.route("a", "z").unwrap().states(), vec!["x", "z"]);
    }

    #[test]
    fn parallel_edges_use_first_declared() {
        let routes = RouteTable::compute(&Graph::from_edges(&[
            Edge::new("a", "b", Some("first")),
            Edge::new("a", "b", Some("second")),
        ]));

        assert_eq!(
            routes.route("a", "b").unwrap().steps(),
            &[Step::new("b", Some("first"))]
        );
    }

    #[test]
    fn disconnected_states_have_no_route() {
        let routes = RouteTable::compute(&Graph::from_edges(&[
            Edge::new("a", "b", None),
            Edge::new("c", "d", None),
        ]));

        assert!(routes.route("a", "d").is_none());
        assert!(!routes.is_reachable("b", "a"));
        assert_eq!(routes.reachable_from("a"), vec!["a", "b"]);
        assert!(routes.route("missing", "a").is_none());
    }

    #[test]
    fn compute_is_idempotent() {
        let graph = Graph::from_edges(&[
            Edge::new("a", "b", None),
            Edge::new("b", "a", Some("back")),
        ]);

        assert_eq!(RouteTable::compute(&graph), RouteTable::compute(&graph));
    }

    #[test]
    fn isolated_node_routes_only_to_itself() {
        let routes = RouteTable::compute(&Graph::new().with_node("solo"));

        assert_eq!(routes.len(), 1);
        assert!(routes.route("solo", "solo").unwrap().is_empty());
    }
}
