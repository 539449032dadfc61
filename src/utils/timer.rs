use std::time::{Duration, Instant};

/// Tracks elapsed time and manages time-based delays.
///
/// # Examples
/// ```
/// use hololib_rs::utils::timer::Timer;
/// use std::time::Duration;
/// let timer = Timer::new(Duration::from_secs(5));
/// ```
#[derive(Clone)]
pub struct Timer {
    period: Duration,
    elapsed_duration: Duration,
    previous_instant: Instant,
    paused: bool,
}

impl Timer {
    /// Creates a new timer with the specified duration.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            elapsed_duration: Duration::ZERO,
            previous_instant: Instant::now(),
            paused: false,
        }
    }

    /// Returns the timer's configured period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns the remaining time until the timer expires.
    ///
    /// Updates the internal elapsed time before calculation.
    pub fn remaining_time(&mut self) -> Duration {
        self.update();
        self.period.saturating_sub(self.elapsed_duration)
    }

    /// Returns the elapsed time since the timer started.
    ///
    /// Updates the internal elapsed time before calculation.
    pub fn elapsed_time(&mut self) -> Duration {
        self.update();
        self.elapsed_duration
    }

    /// Checks if the timer has completed its period.
    pub fn is_done(&mut self) -> bool {
        self.update();
        self.period.saturating_sub(self.elapsed_duration) == Duration::ZERO
    }

    /// Checks if the timer is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pauses the timer, freezing elapsed time.
    pub fn pause(&mut self) {
        if !self.paused {
            self.update();
        }
        self.paused = true;
    }

    /// Resumes the timer if paused.
    pub fn resume(&mut self) {
        if self.paused {
            self.previous_instant = Instant::now();
        }
        self.paused = false;
    }

    /// Resets the timer to zero elapsed time.
    pub fn reset(&mut self) {
        self.elapsed_duration = Duration::ZERO;
        self.previous_instant = Instant::now();
    }

    /// Updates the timer's period and resets it.
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
        self.reset();
    }

    fn update(&mut self) {
        let current_instant = Instant::now();
        if !self.paused {
            self.elapsed_duration += current_instant - self.previous_instant;
        }
        self.previous_instant = current_instant;
    }
}
