//! Cooperative actions: interruptible units of robot behavior composed
//! into routines and polled to completion by a scheduler.

pub mod device;
pub mod scheduler;

use std::collections::VecDeque;
use std::time::Duration;

use crate::telemetry::{Canvas, TelemetryPacket};
use crate::utils::timer::Timer;

/// A unit of robot behavior polled by a scheduler.
///
/// [`run`](Action::run) performs one increment of work and reports whether
/// the action wants to be polled again (`true`) or has finished (`false`).
/// Returning is the only suspension point, so an action must never block.
/// An action is created, polled to completion once and then discarded.
pub trait Action {
    fn run(&mut self, packet: &mut TelemetryPacket) -> bool;

    /// Draws the planned motion on the overlay before the action runs.
    fn preview(&self, _canvas: &mut Canvas) {}
}

/// Runs children one at a time, in order.
///
/// Exactly the current child is polled each cycle; when it completes, the
/// next child is first polled on the following cycle. The sequence
/// completes on the cycle its last child completes, and an empty sequence
/// completes on its first poll.
pub struct SequentialAction {
    actions: VecDeque<Box<dyn Action>>,
}

impl SequentialAction {
    pub fn new(actions: Vec<Box<dyn Action>>) -> Self {
        Self {
            actions: actions.into(),
        }
    }
}

impl Action for SequentialAction {
    fn run(&mut self, packet: &mut TelemetryPacket) -> bool {
        let Some(current) = self.actions.front_mut() else {
            return false;
        };
        if !current.run(packet) {
            self.actions.pop_front();
        }
        !self.actions.is_empty()
    }

    fn preview(&self, canvas: &mut Canvas) {
        for action in &self.actions {
            action.preview(canvas);
        }
    }
}

/// Runs children concurrently within the polling model.
///
/// Every still-active child is polled once per cycle, in list order;
/// children that complete drop out, and the composite completes once none
/// remain. Children commanding the same actuator in the same cycle resolve
/// by list order, so the later child wins.
pub struct ParallelAction {
    actions: Vec<Box<dyn Action>>,
}

impl ParallelAction {
    pub fn new(actions: Vec<Box<dyn Action>>) -> Self {
        Self { actions }
    }
}

impl Action for ParallelAction {
    fn run(&mut self, packet: &mut TelemetryPacket) -> bool {
        self.actions.retain_mut(|action| action.run(packet));
        !self.actions.is_empty()
    }

    fn preview(&self, canvas: &mut Canvas) {
        for action in &self.actions {
            action.preview(canvas);
        }
    }
}

/// Waits out a fixed duration.
///
/// The countdown starts at the first poll, not at construction. Polls
/// strictly before the duration elapses report `true`; the first poll at
/// or past it reports `false`.
pub struct SleepAction {
    duration: Duration,
    timer: Option<Timer>,
}

impl SleepAction {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            timer: None,
        }
    }

    pub fn seconds(seconds: f64) -> Self {
        Self::new(Duration::from_secs_f64(seconds))
    }
}

impl Action for SleepAction {
    fn run(&mut self, _packet: &mut TelemetryPacket) -> bool {
        let timer = self.timer.get_or_insert_with(|| Timer::new(self.duration));
        !timer.is_done()
    }
}

/// Gates an inner action on a per-poll condition.
///
/// While `condition` holds, the inner action is polled as usual; the first
/// poll that finds it false completes the gate immediately, abandoning
/// whatever the inner action had left. Wrapping each branch of a race in a
/// gate that watches the other branch gives first-to-finish-cancels
/// composition.
pub struct ConditionalAction {
    condition: Box<dyn Fn() -> bool>,
    inner: Box<dyn Action>,
}

impl ConditionalAction {
    pub fn new(condition: impl Fn() -> bool + 'static, inner: Box<dyn Action>) -> Self {
        Self {
            condition: Box::new(condition),
            inner,
        }
    }
}

impl Action for ConditionalAction {
    fn run(&mut self, packet: &mut TelemetryPacket) -> bool {
        if !(self.condition)() {
            return false;
        }
        self.inner.run(packet)
    }

    fn preview(&self, canvas: &mut Canvas) {
        self.inner.preview(canvas);
    }
}

/// Runs a closure once and completes.
pub struct InstantAction {
    f: Option<Box<dyn FnOnce()>>,
}

impl InstantAction {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self {
            f: Some(Box::new(f)),
        }
    }
}

impl Action for InstantAction {
    fn run(&mut self, _packet: &mut TelemetryPacket) -> bool {
        if let Some(f) = self.f.take() {
            f();
        }
        false
    }
}

/// Completes immediately without doing anything.
#[derive(Default)]
pub struct NullAction;

impl Action for NullAction {
    fn run(&mut self, _packet: &mut TelemetryPacket) -> bool {
        false
    }
}

#[macro_export]
macro_rules! sequential {
    ($($action:expr),* $(,)?) => {
        $crate::actions::SequentialAction::new(::std::vec![
            $(::std::boxed::Box::new($action) as ::std::boxed::Box<dyn $crate::actions::Action>),*
        ])
    };
}

#[macro_export]
macro_rules! parallel {
    ($($action:expr),* $(,)?) => {
        $crate::actions::ParallelAction::new(::std::vec![
            $(::std::boxed::Box::new($action) as ::std::boxed::Box<dyn $crate::actions::Action>),*
        ])
    };
}

pub use parallel;
pub use sequential;

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::thread::sleep;

    use super::*;

    struct CountingAction {
        name: &'static str,
        remaining: u32,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl CountingAction {
        fn new(name: &'static str, polls: u32, log: &Rc<RefCell<Vec<&'static str>>>) -> Self {
            Self {
                name,
                remaining: polls,
                log: log.clone(),
            }
        }
    }

    impl Action for CountingAction {
        fn run(&mut self, _packet: &mut TelemetryPacket) -> bool {
            self.log.borrow_mut().push(self.name);
            self.remaining -= 1;
            self.remaining > 0
        }
    }

    #[test]
    fn sequential_polls_one_child_per_cycle() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut action = sequential!(
            CountingAction::new("a", 2, &log),
            CountingAction::new("b", 1, &log),
        );
        let mut packet = TelemetryPacket::new();

        assert!(action.run(&mut packet));
        assert!(action.run(&mut packet));
        // The cycle "a" finished did not touch "b".
        assert_eq!(*log.borrow(), ["a", "a"]);
        assert!(!action.run(&mut packet));
        assert_eq!(*log.borrow(), ["a", "a", "b"]);
    }

    #[test]
    fn sequential_completes_with_its_last_child() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut action = sequential!(CountingAction::new("only", 3, &log));
        let mut packet = TelemetryPacket::new();
        assert!(action.run(&mut packet));
        assert!(action.run(&mut packet));
        assert!(!action.run(&mut packet));
    }

    #[test]
    fn empty_sequence_completes_on_first_poll() {
        let mut action = SequentialAction::new(Vec::new());
        assert!(!action.run(&mut TelemetryPacket::new()));
    }

    #[test]
    fn parallel_completes_with_its_slowest_child() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut action = parallel!(
            CountingAction::new("fast", 2, &log),
            CountingAction::new("slow", 5, &log),
        );
        let mut packet = TelemetryPacket::new();
        for _ in 0..4 {
            assert!(action.run(&mut packet));
        }
        assert!(!action.run(&mut packet));
        let polls = log.borrow();
        assert_eq!(polls.iter().filter(|n| **n == "fast").count(), 2);
        assert_eq!(polls.iter().filter(|n| **n == "slow").count(), 5);
    }

    #[test]
    fn parallel_conflicts_resolve_by_list_order() {
        // Two children command the same actuator in one cycle; the later
        // child in the list wins. Implementation-defined, pinned here so a
        // change is at least noticed.
        let power = Rc::new(Cell::new(0.0));
        let first = power.clone();
        let second = power.clone();
        let mut action = parallel!(
            InstantAction::new(move || first.set(0.3)),
            InstantAction::new(move || second.set(0.9)),
        );
        assert!(!action.run(&mut TelemetryPacket::new()));
        assert_eq!(power.get(), 0.9);
    }

    #[test]
    fn sleep_starts_counting_at_first_poll() {
        let mut action = SleepAction::new(Duration::from_millis(40));
        let mut packet = TelemetryPacket::new();
        // Construction time does not count toward the delay.
        sleep(Duration::from_millis(60));
        assert!(action.run(&mut packet));
        sleep(Duration::from_millis(50));
        assert!(!action.run(&mut packet));
    }

    #[test]
    fn zero_sleep_completes_immediately() {
        let mut action = SleepAction::seconds(0.0);
        assert!(!action.run(&mut TelemetryPacket::new()));
    }

    #[test]
    fn gate_abandons_its_inner_action() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let cancel = Rc::new(Cell::new(false));
        let watched = cancel.clone();
        let mut action = ConditionalAction::new(
            move || !watched.get(),
            Box::new(CountingAction::new("inner", 10, &log)),
        );
        let mut packet = TelemetryPacket::new();
        assert!(action.run(&mut packet));
        assert!(action.run(&mut packet));
        cancel.set(true);
        assert!(!action.run(&mut packet));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn gates_compose_a_first_to_finish_race() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let done = Rc::new(Cell::new(false));
        let signal = done.clone();
        let watched = done.clone();
        let mut race = parallel!(
            sequential!(
                CountingAction::new("winner", 2, &log),
                InstantAction::new(move || signal.set(true)),
            ),
            ConditionalAction::new(
                move || !watched.get(),
                Box::new(CountingAction::new("loser", 100, &log)),
            ),
        );
        let mut packet = TelemetryPacket::new();
        assert!(race.run(&mut packet));
        assert!(race.run(&mut packet));
        assert!(!race.run(&mut packet));
        let polls = log.borrow();
        assert_eq!(polls.iter().filter(|n| **n == "loser").count(), 2);
    }

    #[test]
    fn instant_runs_its_closure_once() {
        let count = Rc::new(Cell::new(0));
        let counted = count.clone();
        let mut action = InstantAction::new(move || counted.set(counted.get() + 1));
        let mut packet = TelemetryPacket::new();
        assert!(!action.run(&mut packet));
        assert!(!action.run(&mut packet));
        assert_eq!(count.get(), 1);
    }
}
