//! State that outlives a single phase of the match.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use crate::holonomic::pose::Pose2d;

/// The record handed from autonomous to teleop: the final fused pose plus
/// the reference timestamps the pose-logging action stamps its output with.
///
/// Passed around as an explicit `Rc<RefCell<MatchMemory>>`; each phase gets
/// exactly one logical owner and nothing hides in globals. The record lives
/// only as long as the process.
#[derive(Clone, Debug)]
pub struct MatchMemory {
    /// Last pose fused before the previous phase ended.
    pub last_pose: Pose2d,
    /// Whether an autonomous phase already ran this match.
    pub ran_auto: bool,
    /// When the previous pose log line was emitted.
    pub previous_log_time: Option<Instant>,
    /// When the current phase started.
    pub phase_start: Option<Instant>,
}

impl Default for MatchMemory {
    fn default() -> Self {
        Self {
            last_pose: Pose2d::new(0, 0, 0),
            ran_auto: false,
            previous_log_time: None,
            phase_start: None,
        }
    }
}

impl MatchMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh shared handle for the start of a match.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Marks the start of a phase and clears the log timestamp chain.
    pub fn begin_phase(&mut self) {
        self.phase_start = Some(Instant::now());
        self.previous_log_time = None;
    }

    /// Stamps a pose log line: returns the elapsed time since the previous
    /// stamp and since the phase started, then advances the chain.
    pub fn stamp_log(&mut self) -> (f64, f64) {
        let now = Instant::now();
        let phase_start = *self.phase_start.get_or_insert(now);
        let previous = self.previous_log_time.unwrap_or(phase_start);
        self.previous_log_time = Some(now);
        (
            now.duration_since(previous).as_secs_f64(),
            now.duration_since(phase_start).as_secs_f64(),
        )
    }

    /// Records the hand-off pose at the end of autonomous.
    pub fn finish_auto(&mut self, pose: Pose2d) {
        self.last_pose = pose;
        self.ran_auto = true;
    }
}
