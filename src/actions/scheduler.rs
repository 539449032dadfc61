//! The two execution strategies for queued actions: a blocking runner for
//! autonomous and a caller-paced one for teleop.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use super::Action;
use crate::telemetry::{DiagnosticsSink, TelemetryPacket};

/// Blocking scheduler for autonomous routines.
///
/// Queued actions run strictly in order: each cycle runs the injected
/// callback (pose fusion, sensor refresh), polls only the head action and
/// pops it once it completes. One telemetry packet is built per cycle and
/// sent whole to the sink. [`run`](AutoActionScheduler::run) returns when
/// the queue drains.
pub struct AutoActionScheduler {
    actions: VecDeque<Box<dyn Action>>,
    callback: Option<Box<dyn FnMut()>>,
    sink: Rc<RefCell<dyn DiagnosticsSink>>,
    loop_period: Duration,
    head_previewed: bool,
}

impl AutoActionScheduler {
    pub fn new(sink: Rc<RefCell<dyn DiagnosticsSink>>) -> Self {
        Self {
            actions: VecDeque::new(),
            callback: None,
            sink,
            loop_period: Duration::from_millis(10),
            head_previewed: false,
        }
    }

    /// Installs a callback run once at the top of every cycle.
    pub fn with_callback(mut self, callback: impl FnMut() + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Sets the pacing of the blocking loop.
    pub fn with_loop_period(mut self, period: Duration) -> Self {
        self.loop_period = period;
        self
    }

    pub fn add_action(&mut self, action: impl Action + 'static) {
        self.actions.push_back(Box::new(action));
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Runs the queue to exhaustion.
    pub fn run(&mut self) {
        while !self.actions.is_empty() {
            if let Some(callback) = self.callback.as_mut() {
                callback();
            }
            let Some(head) = self.actions.front_mut() else {
                return;
            };
            let mut packet = TelemetryPacket::new();
            if !self.head_previewed {
                head.preview(packet.field_overlay());
                self.head_previewed = true;
            }
            if !head.run(&mut packet) {
                self.actions.pop_front();
                self.head_previewed = false;
            }
            self.sink.borrow_mut().send(packet);
            std::thread::sleep(self.loop_period);
        }
    }
}

/// Caller-paced scheduler for teleop.
///
/// The owning loop calls [`update`](ActionScheduler::update) once per
/// cycle; only the head action is polled, so queued work behind it waits
/// its turn. Abandoning the queue with
/// [`clear`](ActionScheduler::clear) is the only cancellation there is,
/// and actuators keep their last-commanded state when it happens.
pub struct ActionScheduler {
    actions: VecDeque<Box<dyn Action>>,
    sink: Rc<RefCell<dyn DiagnosticsSink>>,
}

impl ActionScheduler {
    pub fn new(sink: Rc<RefCell<dyn DiagnosticsSink>>) -> Self {
        Self {
            actions: VecDeque::new(),
            sink,
        }
    }

    pub fn queue_action(&mut self, action: impl Action + 'static) {
        self.actions.push_back(Box::new(action));
    }

    /// Polls the head action once; a completed head leaves the queue.
    pub fn update(&mut self) {
        let Some(head) = self.actions.front_mut() else {
            return;
        };
        let mut packet = TelemetryPacket::new();
        if !head.run(&mut packet) {
            self.actions.pop_front();
        }
        self.sink.borrow_mut().send(packet);
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
