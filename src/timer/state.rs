use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    Idle,
    Running,
    Expired,
}

impl Default for TimerStatus {
    fn default() -> Self {
        TimerStatus::Idle
    }
}

/// Display band for the countdown, matching the colour thresholds the
/// candidate view uses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Urgency {
    Normal,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Counting(u32),
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    /// Bumped on every configure and every activation change. A ticker only
    /// acts while the generation it was spawned under is still current.
    #[serde(skip)]
    pub generation: u64,
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.total_seconds > 0
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        100.0 * f64::from(self.remaining_seconds) / f64::from(self.total_seconds)
    }

    pub fn urgency(&self) -> Urgency {
        let progress = self.progress_percent();
        if progress > 50.0 {
            Urgency::Normal
        } else if progress > 20.0 {
            Urgency::Warning
        } else {
            Urgency::Critical
        }
    }

    pub fn reset(&mut self, duration_seconds: u32) {
        self.generation = self.generation.wrapping_add(1);
        self.status = TimerStatus::Idle;
        self.remaining_seconds = duration_seconds;
        self.total_seconds = duration_seconds;
    }

    pub fn activate(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.status = TimerStatus::Running;
        self.generation
    }

    pub fn deactivate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.status = TimerStatus::Idle;
    }

    /// Applies one elapsed second. Expiry lands on the tick that would bring
    /// the counter to zero, never one tick later.
    pub fn tick(&mut self) -> TickOutcome {
        if self.remaining_seconds <= 1 {
            self.remaining_seconds = 0;
            self.status = TimerStatus::Expired;
            TickOutcome::Expired
        } else {
            self.remaining_seconds -= 1;
            TickOutcome::Counting(self.remaining_seconds)
        }
    }
}

/// Formats seconds as `m:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
