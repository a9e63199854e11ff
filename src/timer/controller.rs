use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time::{self, Instant},
};

use crate::error::TimerError;

use super::{TickOutcome, TimerState, TimerStatus, Urgency};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Signals sent from the ticker task. Both carry the generation they were
/// produced under so the receiver can drop anything from a superseded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { generation: u64, remaining_seconds: u32 },
    Expired { generation: u64 },
}

impl TimerEvent {
    pub fn generation(&self) -> u64 {
        match self {
            TimerEvent::Tick { generation, .. } | TimerEvent::Expired { generation } => *generation,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub progress_percent: f64,
    pub urgency: Urgency,
}

/// Countdown for a single question. Ticks once per `tick_interval` while
/// active and reports expiry on the event channel exactly once per run.
pub struct QuestionTimer {
    state: Arc<Mutex<TimerState>>,
    ticker: Option<JoinHandle<()>>,
    events: mpsc::UnboundedSender<TimerEvent>,
    tick_interval: Duration,
}

impl QuestionTimer {
    pub fn new(tick_interval: Duration) -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let timer = Self {
            state: Arc::new(Mutex::new(TimerState::new())),
            ticker: None,
            events,
            tick_interval,
        };
        (timer, receiver)
    }

    /// Resets the countdown to `duration_seconds`. Any scheduled tick is
    /// cancelled; a running timer restarts its schedule under a new generation.
    pub async fn configure(&mut self, duration_seconds: u32) -> Result<(), TimerError> {
        if duration_seconds == 0 {
            return Err(TimerError::InvalidDuration(duration_seconds));
        }

        self.cancel_ticker();

        let restart = {
            let mut state = self.state.lock().await;
            let was_running = state.is_running();
            state.reset(duration_seconds);
            was_running.then(|| state.activate())
        };

        if let Some(generation) = restart {
            self.spawn_ticker(generation);
        }

        log_info!("question timer configured for {}s", duration_seconds);
        Ok(())
    }

    pub async fn set_active(&mut self, active: bool) -> Result<(), TimerError> {
        let mut state = self.state.lock().await;

        if active {
            if state.is_running() {
                return Ok(());
            }
            if !state.is_configured() {
                return Err(TimerError::NotConfigured);
            }
            if state.status == TimerStatus::Expired {
                return Err(TimerError::Expired);
            }
            let generation = state.activate();
            drop(state);
            self.spawn_ticker(generation);
        } else {
            if !state.is_running() {
                return Ok(());
            }
            state.deactivate();
            drop(state);
            self.cancel_ticker();
        }

        Ok(())
    }

    pub async fn get_state(&self) -> TimerState {
        self.state.lock().await.clone()
    }

    pub async fn get_snapshot(&self) -> TimerSnapshot {
        let state = self.state.lock().await;
        TimerSnapshot {
            progress_percent: state.progress_percent(),
            urgency: state.urgency(),
            state: state.clone(),
        }
    }

    pub async fn remaining_seconds(&self) -> u32 {
        self.state.lock().await.remaining_seconds
    }

    pub async fn generation(&self) -> u64 {
        self.state.lock().await.generation
    }

    fn spawn_ticker(&mut self, generation: u64) {
        self.cancel_ticker();

        let state = self.state.clone();
        let events = self.events.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + tick_interval, tick_interval);
            loop {
                interval.tick().await;

                let outcome = {
                    let mut guard = state.lock().await;
                    if guard.generation != generation || !guard.is_running() {
                        break;
                    }
                    guard.tick()
                };

                let event = match outcome {
                    TickOutcome::Counting(remaining_seconds) => TimerEvent::Tick {
                        generation,
                        remaining_seconds,
                    },
                    TickOutcome::Expired => TimerEvent::Expired { generation },
                };

                if events.send(event).is_err() || matches!(outcome, TickOutcome::Expired) {
                    break;
                }
            }
        });

        self.ticker = Some(handle);
    }

    fn cancel_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl Drop for QuestionTimer {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}
