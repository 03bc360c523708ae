//! End-to-end traversal scenarios through the public API.

use parking_lot::Mutex;
use std::sync::Arc;
use waypoint::{
    edges, ActionError, ActionResult, DiagramTransition, FsmBuilder, FsmError, FsmHandle,
    Registry, RegistryError, RouteTable, RunMode, TraversalHistory,
};

type Log = Arc<Mutex<Vec<String>>>;

fn recorder(log: &Log, tag: &'static str) -> impl Fn(&u32) -> ActionResult + Send + Sync {
    let log = Arc::clone(log);
    move |shots: &u32| {
        log.lock().push(match shots {
            0 => tag.to_string(),
            n => format!("{tag}({n})"),
        });
        Ok(())
    }
}

/// Registry for the turret: `load` suspends until the magazine is in.
fn turret_registry(log: &Log) -> Arc<Registry<u32>> {
    let registry = Arc::new(Registry::new());
    registry.register_state("idle", recorder(log, "idle")).unwrap();
    registry
        .register_suspending_state("load", recorder(log, "load"))
        .unwrap();
    registry.register_state("aim", recorder(log, "aim")).unwrap();
    registry.register_state("fire", recorder(log, "fire")).unwrap();
    registry
        .register_transition("loading", recorder(log, "loading"))
        .unwrap();
    registry
        .register_transition("aiming", recorder(log, "aiming"))
        .unwrap();
    registry
}

fn turret(log: &Log) -> waypoint::Fsm<u32> {
    FsmBuilder::new(turret_registry(log))
        .initial("idle")
        .edges(edges![
            "idle" => "load" : "loading",
            "load" => "aim" : "aiming",
            "aim" => "fire",
            "fire" => "idle",
        ])
        .build()
        .unwrap()
}

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn drain(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.lock())
}

#[test]
fn suspension_stops_after_the_suspending_state() {
    let log = new_log();
    let mut fsm = turret(&log);

    fsm.go_to("aim", 0).unwrap();

    assert_eq!(drain(&log), ["loading", "load"]);
    assert_eq!(fsm.current_state(), "load");
    assert_eq!(fsm.run_mode(), RunMode::WaitingForCallback);
    assert_eq!(fsm.pending_destination(), Some("aim"));

    fsm.resume().unwrap();

    assert_eq!(drain(&log), ["aiming", "aim"]);
    assert_eq!(fsm.current_state(), "aim");
    assert_eq!(fsm.run_mode(), RunMode::Idle);
    assert_eq!(fsm.pending_destination(), None);
}

#[test]
fn second_resume_is_rejected() {
    let log = new_log();
    let mut fsm = turret(&log);
    fsm.go_to("aim", 0).unwrap();
    fsm.resume().unwrap();

    let result = fsm.resume();

    assert!(matches!(
        result,
        Err(FsmError::InvalidResume {
            mode: RunMode::Idle
        })
    ));
}

#[test]
fn queued_requests_run_in_call_order() {
    let log = new_log();
    let registry = Arc::new(Registry::new());
    for state in ["idle", "aim", "fire"] {
        registry.register_state(state, recorder(&log, state)).unwrap();
    }
    let mut fsm = FsmBuilder::new(registry)
        .initial("idle")
        .edges(edges!["idle" => "aim", "aim" => "fire", "fire" => "idle"])
        .build()
        .unwrap();

    fsm.call_with("fire", 5)
        .unwrap()
        .call("idle")
        .unwrap()
        .call("aim")
        .unwrap();
    assert!(drain(&log).is_empty());

    fsm.run().unwrap();

    assert_eq!(drain(&log), ["aim", "fire(5)", "idle", "aim"]);
    assert_eq!(fsm.current_state(), "aim");
    assert_eq!(fsm.queued(), 0);
}

#[test]
fn queue_resumes_after_suspension() {
    let log = new_log();
    let mut fsm = turret(&log);

    fsm.call("aim").unwrap().call_with("fire", 3).unwrap();
    fsm.run().unwrap();

    assert_eq!(drain(&log), ["loading", "load"]);
    assert_eq!(fsm.queued(), 1);

    fsm.resume().unwrap();

    assert_eq!(drain(&log), ["aiming", "aim", "fire(3)"]);
    assert_eq!(fsm.current_state(), "fire");
    assert_eq!(fsm.queued(), 0);
}

#[test]
fn unreachable_destination_leaves_machine_untouched() {
    let log = new_log();
    let registry = turret_registry(&log);
    registry.register_state("island", recorder(&log, "island")).unwrap();
    let mut fsm = FsmBuilder::new(registry)
        .initial("idle")
        .edges(edges!["idle" => "aim", "island" => "island"])
        .build()
        .unwrap();

    let result = fsm.go_to("island", 0);

    assert!(matches!(
        result,
        Err(FsmError::Unreachable { ref from, ref to }) if from == "idle" && to == "island"
    ));
    assert_eq!(fsm.current_state(), "idle");
    assert_eq!(fsm.run_mode(), RunMode::Initial);
    assert!(drain(&log).is_empty());
}

#[test]
fn events_fire_once_per_step() {
    let log = new_log();
    let registry = Arc::new(Registry::new());
    for state in ["a", "b", "c", "d"] {
        registry.register_state(state, recorder(&log, state)).unwrap();
    }
    let mut fsm = FsmBuilder::new(registry)
        .initial("a")
        .edges(edges!["a" => "b", "b" => "c", "c" => "d"])
        .build()
        .unwrap();

    let reached = Arc::new(Mutex::new(0));
    let arrived = Arc::new(Mutex::new(0));
    let (r, a) = (Arc::clone(&reached), Arc::clone(&arrived));
    fsm.on_state_reached(move || -> ActionResult {
        *r.lock() += 1;
        Ok(())
    })
    .on_destination_reached(move || -> ActionResult {
        *a.lock() += 1;
        Ok(())
    });

    fsm.go_to("d", 0).unwrap();

    assert_eq!(fsm.current_state(), "d");
    assert_eq!(*reached.lock(), 2);
    assert_eq!(*arrived.lock(), 1);
}

#[test]
fn failing_handler_propagates() {
    let log = new_log();
    let mut fsm = turret(&log);
    fsm.on_destination_reached(|| Err(ActionError::new("jammed")));

    let result = fsm.go_to("idle", 0);

    assert!(matches!(result, Err(FsmError::HandlerFailed { ref event, .. }) if event == "DestinationReached"));
}

#[test]
fn failing_action_does_not_roll_back() {
    let registry: Arc<Registry<()>> = Arc::new(Registry::new());
    registry.register_state("start", |_| Ok(())).unwrap();
    registry
        .register_state("broken", |_| Err(ActionError::new("boom")))
        .unwrap();
    registry.register_state("end", |_| Ok(())).unwrap();
    let mut fsm = FsmBuilder::new(registry)
        .initial("start")
        .edges(edges!["start" => "broken", "broken" => "end"])
        .build()
        .unwrap();

    let err = fsm.go_to("end", ()).unwrap_err();

    assert_eq!(err.to_string(), "Action 'broken' failed: boom");
    assert_eq!(fsm.current_state(), "broken");
    assert_eq!(fsm.pending_destination(), None);
    assert_eq!(fsm.run_mode(), RunMode::Idle);
}

#[test]
fn force_reset_returns_to_initial_after_any_history() {
    let log = new_log();
    let mut fsm = turret(&log);
    fsm.go_to("aim", 0).unwrap();

    fsm.force_reset().unwrap();

    assert_eq!(fsm.current_state(), "idle");
    assert_eq!(fsm.run_mode(), RunMode::Initial);
    assert_eq!(drain(&log).last().map(String::as_str), Some("idle"));
}

#[test]
fn force_change_state_requires_declared_state() {
    let log = new_log();
    let registry = turret_registry(&log);
    registry.register_state("elsewhere", recorder(&log, "elsewhere")).unwrap();
    let mut fsm = FsmBuilder::new(registry)
        .initial("idle")
        .transition("idle", "aim")
        .build()
        .unwrap();

    assert!(matches!(
        fsm.force_change_state("elsewhere", 0),
        Err(FsmError::NotDeclared { .. })
    ));

    fsm.force_change_state("aim", 9).unwrap();
    assert_eq!(fsm.current_state(), "aim");
    assert_eq!(fsm.run_mode(), RunMode::Idle);
    assert_eq!(drain(&log), ["aim(9)"]);
}

#[test]
fn diagram_import_is_all_or_nothing() {
    let log = new_log();
    let mut fsm = FsmBuilder::new(turret_registry(&log))
        .initial("idle")
        .build()
        .unwrap();

    let broken = vec![
        DiagramTransition::from_inferred("idle", "aim", "idle_aim"),
        DiagramTransition::new("aim", "reload", Some("reloading")),
    ];
    let err = fsm.import_diagram(&broken).unwrap_err();
    let FsmError::Diagram(diagram) = err else {
        panic!("expected a diagram error");
    };
    assert_eq!(diagram.problems().len(), 2);
    assert!(fsm.edges().is_empty());

    let records = vec![
        DiagramTransition::from_inferred("idle", "aim", "idle_aim"),
        DiagramTransition::from_inferred("aim", "fire", "aim_fire"),
        DiagramTransition::new("fire", "idle", None),
    ];
    fsm.import_diagram(&records).unwrap();

    assert_eq!(fsm.edges().len(), 3);
    assert!(fsm.edges().iter().all(|e| e.transition.is_none()));
    fsm.go_to("fire", 1).unwrap();
    assert_eq!(drain(&log), ["aim", "fire(1)"]);
}

#[test]
fn machines_on_one_registry_are_independent() {
    let log = new_log();
    let registry = turret_registry(&log);
    let mut first = FsmBuilder::new(Arc::clone(&registry))
        .initial("idle")
        .transition("idle", "aim")
        .build()
        .unwrap();
    let second = FsmBuilder::new(Arc::clone(&registry))
        .initial("idle")
        .build()
        .unwrap();

    first.go_to("aim", 0).unwrap();

    assert_ne!(first.id(), second.id());
    assert_eq!(second.current_state(), "idle");
    assert!(!second.is_declared("aim"));
    assert!(matches!(
        registry.register_state("aim", |_| Ok(())),
        Err(RegistryError::DuplicateName { .. })
    ));
}

#[test]
fn routes_and_history_serialize() {
    let log = new_log();
    let mut fsm = turret(&log);
    fsm.go_to("aim", 0).unwrap();
    fsm.resume().unwrap();

    let routes: RouteTable =
        serde_json::from_str(&serde_json::to_string(fsm.routes()).unwrap()).unwrap();
    assert_eq!(&routes, fsm.routes());
    assert_eq!(routes.route("idle", "fire").map(|r| r.len()), Some(3));

    let history: TraversalHistory =
        serde_json::from_str(&serde_json::to_string(fsm.history()).unwrap()).unwrap();
    assert_eq!(history.path(), ["idle", "load", "aim"]);
}

#[tokio::test]
async fn resume_from_a_blocking_task() {
    let log = new_log();
    let handle = FsmHandle::new(turret(&log));
    handle.go_to("fire", 2).unwrap();
    assert!(handle.run_mode().is_parked());

    let remote = handle.clone();
    tokio::task::spawn_blocking(move || remote.resume())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(handle.current_state(), "fire");
    assert_eq!(drain(&log), ["loading", "load", "aiming", "aim", "fire(2)"]);
}
