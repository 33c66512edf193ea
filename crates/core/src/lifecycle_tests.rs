// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn happy_path_pending_running_completed() {
    let mut lc = Lifecycle::new(0);
    lc.start(10).expect("start");
    assert_eq!(lc.status(), Status::Running);
    assert_eq!(lc.started_at_ms(), Some(10));

    lc.complete(20).expect("complete");
    assert_eq!(lc.status(), Status::Completed);
    assert!(lc.is_finished());
    assert_eq!(lc.stopped_at_ms(), Some(20));
    assert_eq!(lc.runtime_duration_ms(100), 10);
}

#[test]
fn illegal_complete_before_start_leaves_state_untouched() {
    let mut lc = Lifecycle::new(0);
    let before = lc.clone();
    let err = lc.complete(5).unwrap_err();
    assert_eq!(
        err,
        LifecycleError::InvalidTransition { from: Status::Pending, op: Operation::Complete }
    );
    assert_eq!(lc, before);
}

#[test]
fn restart_round_trip_clears_error_and_resets_timestamps() {
    let mut lc = Lifecycle::new(0);
    lc.start(1).expect("start");
    lc.fail("boom", 2).expect("fail");
    assert_eq!(lc.last_error(), Some("boom"));

    lc.reset_for_restart(3).expect("reset");
    assert_eq!(lc.status(), Status::Pending);
    assert_eq!(lc.last_error(), None);
    assert_eq!(lc.started_at_ms(), None);

    lc.start(4).expect("restart start");
    lc.complete(5).expect("restart complete");
    assert_eq!(lc.status(), Status::Completed);
    assert_eq!(lc.last_error(), None);
}

#[test]
fn stop_then_mark_stopped_sets_stopped_at() {
    let mut lc = Lifecycle::new(0);
    lc.start(1).expect("start");
    lc.stop(2).expect("stop");
    assert_eq!(lc.status(), Status::Stopping);
    assert_eq!(lc.stopped_at_ms(), None);

    lc.mark_stopped(3).expect("mark_stopped");
    assert_eq!(lc.status(), Status::Stopped);
    assert_eq!(lc.stopped_at_ms(), Some(3));
}

#[parameterized(
    pending_complete = { Status::Pending, Operation::Complete },
    pending_fail = { Status::Pending, Operation::Fail },
    pending_mark_stopped = { Status::Pending, Operation::MarkStopped },
    running_start = { Status::Running, Operation::Start },
    running_mark_stopped = { Status::Running, Operation::MarkStopped },
    running_reset = { Status::Running, Operation::ResetForRestart },
    stopping_start = { Status::Stopping, Operation::Start },
    stopping_complete = { Status::Stopping, Operation::Complete },
    stopping_fail = { Status::Stopping, Operation::Fail },
    stopping_stop = { Status::Stopping, Operation::Stop },
    stopping_reset = { Status::Stopping, Operation::ResetForRestart },
)]
fn illegal_transitions_are_rejected(from: Status, op: Operation) {
    let mut lc = make_lifecycle_in(from);
    let result = apply(&mut lc, op, 99);
    assert_eq!(result.unwrap_err(), LifecycleError::InvalidTransition { from, op });
}

#[parameterized(
    completed = { Status::Completed },
    failed = { Status::Failed },
    stopped = { Status::Stopped },
)]
fn terminal_states_reject_everything_but_reset(terminal: Status) {
    for op in [Operation::Start, Operation::Complete, Operation::Fail, Operation::Stop, Operation::MarkStopped]
    {
        let mut lc = make_lifecycle_in(terminal);
        let result = apply(&mut lc, op, 99);
        assert!(result.is_err(), "{op} should be illegal from {terminal}");
    }
    let mut lc = make_lifecycle_in(terminal);
    apply(&mut lc, Operation::ResetForRestart, 99).expect("reset always legal from terminal");
    assert_eq!(lc.status(), Status::Pending);
}

fn make_lifecycle_in(status: Status) -> Lifecycle {
    let mut lc = Lifecycle::new(0);
    match status {
        Status::Pending => {}
        Status::Running => lc.start(1).expect("start"),
        Status::Completed => {
            lc.start(1).expect("start");
            lc.complete(2).expect("complete");
        }
        Status::Failed => {
            lc.start(1).expect("start");
            lc.fail("e", 2).expect("fail");
        }
        Status::Stopping => lc.stop(1).expect("stop"),
        Status::Stopped => {
            lc.stop(1).expect("stop");
            lc.mark_stopped(2).expect("mark_stopped");
        }
    }
    lc
}

fn apply(lc: &mut Lifecycle, op: Operation, now_ms: u64) -> Result<(), LifecycleError> {
    match op {
        Operation::Start => lc.start(now_ms),
        Operation::Complete => lc.complete(now_ms),
        Operation::Fail => lc.fail("e", now_ms),
        Operation::Stop => lc.stop(now_ms),
        Operation::MarkStopped => lc.mark_stopped(now_ms),
        Operation::ResetForRestart => lc.reset_for_restart(now_ms),
    }
}
