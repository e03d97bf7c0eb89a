//! Rest timer: a tick-driven countdown automaton.
//!
//! The timer is a pure state machine; scheduling belongs to the caller, which
//! invokes [`RestTimer::tick`] once per elapsed second. It auto-starts from a
//! set-completion signal using the profile's default duration, and a new
//! signal while already running replaces the countdown - only one timer
//! instance is ever meaningful.

/// Seconds added or removed by one adjust step
pub const ADJUST_STEP_SECONDS: i64 = 15;

/// Countdown lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Expired,
}

/// One-shot events surfaced by the automaton
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// The countdown reached zero while running. Fired exactly once per run;
    /// the caller turns this into the alert side effect.
    Expired,
}

/// Countdown automaton: Idle -> Running -> {Paused, Expired}
#[derive(Debug)]
pub struct RestTimer {
    state: TimerState,
    total_seconds: u32,
    remaining_seconds: u32,
    default_seconds: u32,
}

impl RestTimer {
    /// Create an idle timer with the profile's default rest duration
    pub fn new(default_seconds: u32) -> Self {
        Self {
            state: TimerState::Idle,
            total_seconds: default_seconds,
            remaining_seconds: 0,
            default_seconds,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    /// Auto-start from a set-completion signal.
    ///
    /// Replaces any countdown already in progress; timers never stack.
    pub fn on_set_completed(&mut self) {
        self.start(self.default_seconds);
    }

    /// Start a countdown of the given duration, replacing the current one
    pub fn start(&mut self, seconds: u32) {
        self.state = TimerState::Running;
        self.total_seconds = seconds;
        self.remaining_seconds = seconds;
        tracing::debug!("Rest timer started ({}s)", seconds);
    }

    /// Pause a running countdown or resume a paused one
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            TimerState::Running => TimerState::Paused,
            TimerState::Paused => TimerState::Running,
            other => other,
        };
    }

    /// Restore the configured total and resume counting down.
    ///
    /// No-op while Idle.
    pub fn reset(&mut self) {
        if self.state == TimerState::Idle {
            return;
        }
        self.remaining_seconds = self.total_seconds;
        self.state = TimerState::Running;
    }

    /// Add or remove seconds, floored at zero.
    ///
    /// Adjusting down to zero does not expire the timer by itself; the next
    /// tick observes it. Only meaningful while Running or Paused.
    pub fn adjust(&mut self, delta_seconds: i64) {
        if !matches!(self.state, TimerState::Running | TimerState::Paused) {
            return;
        }
        let adjusted = i64::from(self.remaining_seconds) + delta_seconds;
        self.remaining_seconds = adjusted.clamp(0, i64::from(u32::MAX)) as u32;
    }

    /// Force the Expired state without firing the alert
    pub fn skip(&mut self) {
        if matches!(self.state, TimerState::Running | TimerState::Paused) {
            self.remaining_seconds = 0;
            self.state = TimerState::Expired;
        }
    }

    /// Stop ticking entirely (component teardown)
    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
        self.remaining_seconds = 0;
    }

    /// Advance the countdown by one second.
    ///
    /// Only a Running timer moves. On reaching zero the timer transitions to
    /// Expired and returns [`TimerEvent::Expired`]; it does not auto-restart,
    /// and the Expired state never ticks again, so the event is one-shot.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if self.state != TimerState::Running {
            return None;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.state = TimerState::Expired;
            tracing::debug!("Rest timer expired");
            return Some(TimerEvent::Expired);
        }
        None
    }
}
