// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn make(max: MaxIterations, max_restarts: u32) -> Container {
    Container::new(ContainerKind::Navigate, PlayerId::from("p1"), Metadata::new(), max, max_restarts, 0)
}

#[test]
fn happy_path_finite_iterations() {
    let mut c = make(MaxIterations::Finite(5), 0);
    c.start(1).expect("start");
    for _ in 0..5 {
        c.increment_iteration().expect("increment");
    }
    c.complete(100).expect("complete");
    assert_eq!(c.status(), Status::Completed);
    assert_eq!(c.current_iteration, 5);
    assert!(c.started_at_ms().unwrap() >= c.created_at_ms());
    assert!(c.stopped_at_ms().unwrap() > c.started_at_ms().unwrap());
}

#[test]
fn illegal_complete_before_start() {
    let mut c = make(MaxIterations::Infinite, 0);
    let err = c.complete(5).unwrap_err();
    assert_eq!(c.status(), Status::Pending);
    matches!(err, ContainerError::Lifecycle(LifecycleError::InvalidTransition { .. }));
}

#[test]
fn increment_iteration_requires_running() {
    let mut c = make(MaxIterations::Finite(5), 0);
    let err = c.increment_iteration().unwrap_err();
    assert_eq!(err, ContainerError::NotRunning { status: Status::Pending });
}

#[test]
fn increment_iteration_respects_finite_ceiling() {
    let mut c = make(MaxIterations::Finite(1), 0);
    c.start(1).expect("start");
    c.increment_iteration().expect("first increment ok");
    let err = c.increment_iteration().unwrap_err();
    assert_eq!(err, ContainerError::IterationLimitExceeded { current: 1, max: 1 });
    assert_eq!(c.current_iteration, 1);
}

#[test]
fn should_continue_reflects_running_and_budget() {
    let mut c = make(MaxIterations::Finite(2), 0);
    assert!(!c.should_continue(), "not running yet");
    c.start(1).expect("start");
    assert!(c.should_continue());
    c.increment_iteration().expect("1");
    c.increment_iteration().expect("2");
    assert!(!c.should_continue(), "exhausted finite budget");
}

#[test]
fn infinite_max_iterations_always_continues_while_running() {
    let mut c = make(MaxIterations::Infinite, 0);
    c.start(1).expect("start");
    for _ in 0..1000 {
        c.increment_iteration().expect("increment");
    }
    assert!(c.should_continue());
}

#[test]
fn restart_round_trip_increments_count_and_clears_error() {
    let mut c = make(MaxIterations::Finite(1), 1);
    c.start(1).expect("start");
    c.fail("boom", 2).expect("fail");
    assert!(c.can_restart());

    c.reset_for_restart(3).expect("reset");
    assert_eq!(c.restart_count, 1);
    assert_eq!(c.status(), Status::Pending);
    assert_eq!(c.last_error(), None);

    c.start(4).expect("restart start");
    c.complete(5).expect("complete");
    assert_eq!(c.status(), Status::Completed);
}

#[test]
fn restart_budget_exhausted_performs_no_mutation() {
    let mut c = make(MaxIterations::Finite(1), 1);
    c.start(1).expect("start");
    c.fail("boom", 2).expect("fail");
    c.reset_for_restart(3).expect("first restart");
    c.start(4).expect("start again");
    c.fail("boom again", 5).expect("fail again");

    let before = c.clone();
    let err = c.reset_for_restart(6).unwrap_err();
    assert_eq!(err, ContainerError::RestartBudgetExhausted { restart_count: 1, max_restarts: 1 });
    assert_eq!(c, before, "no mutation when restart budget is exhausted");
}

#[test]
fn once_finished_metadata_and_counters_are_conceptually_frozen() {
    // The state machine itself does not special-case metadata mutation, but
    // every operation after a terminal state is reached returns
    // InvalidTransition and leaves current_iteration untouched — which is
    // what "frozen" means operationally.
    let mut c = make(MaxIterations::Finite(5), 0);
    c.start(1).expect("start");
    c.increment_iteration().expect("increment");
    c.complete(2).expect("complete");

    let before_iteration = c.current_iteration;
    assert!(c.complete(3).is_err());
    assert!(c.fail("x", 3).is_err());
    assert!(c.stop(3).is_err());
    assert_eq!(c.current_iteration, before_iteration);
}
