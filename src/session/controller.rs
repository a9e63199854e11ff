use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::{
    error::{SessionError, StoreError},
    interview::{
        schedule, AnswerRecord, CandidateData, Difficulty, QuestionSlot, SessionSnapshot,
        TOTAL_QUESTIONS,
    },
    store::SessionStore,
    timer::{QuestionTimer, TimerEvent, Urgency},
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum SessionPhase {
    AwaitingCandidateData,
    InProgress { slot: u32 },
    Completed,
}

impl SessionPhase {
    pub fn describe(&self) -> &'static str {
        match self {
            SessionPhase::AwaitingCandidateData => "awaiting candidate data",
            SessionPhase::InProgress { .. } => "an interview is in progress",
            SessionPhase::Completed => "the interview is completed",
        }
    }
}

/// Everything the candidate view needs to render the current question.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub phase: SessionPhase,
    pub candidate_name: Option<String>,
    pub current_slot_index: u32,
    pub current_difficulty: Difficulty,
    pub question: String,
    pub remaining_seconds: u32,
    pub progress_percent: f64,
    pub urgency: Urgency,
    pub is_in_progress: bool,
    pub is_completed: bool,
    pub persistence_available: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    #[serde(rename_all = "camelCase")]
    QuestionStarted {
        slot: u32,
        difficulty: Difficulty,
        question: String,
        time_limit_seconds: u32,
    },
    AnswerSubmitted { record: AnswerRecord },
    #[serde(rename_all = "camelCase")]
    InterviewCompleted {
        candidate_name: String,
        completed_at: DateTime<Utc>,
    },
    /// Storage failed; the interview carries on but cannot be resumed.
    PersistenceWarning { message: String },
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub tick_interval: Duration,
    /// Re-save the snapshot with the live countdown every N ticks; 0 disables.
    pub heartbeat_every_ticks: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            heartbeat_every_ticks: 5,
        }
    }
}

/// Drives one candidate through the six scheduled questions.
pub struct InterviewSession {
    phase: SessionPhase,
    candidate_name: Option<String>,
    draft: String,
    timer: QuestionTimer,
    timer_events: mpsc::UnboundedReceiver<TimerEvent>,
    store: Arc<dyn SessionStore>,
    events: mpsc::UnboundedSender<SessionEvent>,
    persistence_available: bool,
    heartbeat_every_ticks: u32,
}

impl InterviewSession {
    pub fn new(
        store: Arc<dyn SessionStore>,
        options: SessionOptions,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (timer, timer_events) = QuestionTimer::new(options.tick_interval);
        let (events, receiver) = mpsc::unbounded_channel();

        let session = Self {
            phase: SessionPhase::AwaitingCandidateData,
            candidate_name: None,
            draft: String::new(),
            timer,
            timer_events,
            store,
            events,
            persistence_available: true,
            heartbeat_every_ticks: options.heartbeat_every_ticks,
        };
        (session, receiver)
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn candidate_name(&self) -> Option<&str> {
        self.candidate_name.as_deref()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn persistence_available(&self) -> bool {
        self.persistence_available
    }

    pub async fn view(&self) -> SessionView {
        let slot_index = match self.phase {
            SessionPhase::AwaitingCandidateData => 1,
            SessionPhase::InProgress { slot } => slot,
            SessionPhase::Completed => TOTAL_QUESTIONS,
        };
        let slot = schedule::slot(slot_index).unwrap_or_else(schedule::first_slot);
        let in_progress = matches!(self.phase, SessionPhase::InProgress { .. });

        let timer = self.timer.get_snapshot().await;
        let (remaining_seconds, progress_percent, urgency) = if in_progress {
            (timer.state.remaining_seconds, timer.progress_percent, timer.urgency)
        } else {
            (0, 0.0, Urgency::Normal)
        };

        SessionView {
            phase: self.phase,
            candidate_name: self.candidate_name.clone(),
            current_slot_index: slot.index,
            current_difficulty: slot.difficulty,
            question: slot.prompt.to_string(),
            remaining_seconds,
            progress_percent,
            urgency,
            is_in_progress: in_progress,
            is_completed: self.phase == SessionPhase::Completed,
            persistence_available: self.persistence_available,
        }
    }

    /// The stored snapshot, if one is eligible for a "welcome back" prompt.
    pub async fn saved_session(&mut self) -> Option<SessionSnapshot> {
        match self.store.load().await {
            Ok(Some(snapshot)) if snapshot.is_resumable() => match snapshot.validate() {
                Ok(_) => Some(snapshot),
                Err(err) => {
                    log_warn!("ignoring saved session: {}", err);
                    None
                }
            },
            Ok(_) => None,
            Err(StoreError::CorruptSnapshot(reason)) => {
                log_warn!("ignoring corrupt saved session: {}", reason);
                None
            }
            Err(err) => {
                self.report_persistence_failure(err);
                None
            }
        }
    }

    pub async fn begin_with_candidate(&mut self, candidate: &CandidateData) -> Result<(), SessionError> {
        let missing = candidate.missing_fields();
        if !missing.is_empty() {
            return Err(SessionError::MissingCandidateFields(missing));
        }
        self.begin_interview(&candidate.name).await
    }

    pub async fn begin_interview(&mut self, candidate_name: &str) -> Result<(), SessionError> {
        if self.phase != SessionPhase::AwaitingCandidateData {
            return Err(SessionError::InvalidTransition(self.phase.describe()));
        }
        let candidate_name = candidate_name.trim();
        if candidate_name.is_empty() {
            return Err(SessionError::MissingCandidateFields(vec!["name"]));
        }

        let slot = schedule::first_slot();
        self.candidate_name = Some(candidate_name.to_string());
        self.draft.clear();
        self.start_slot(slot, slot.max_time_seconds).await?;
        self.persist(SessionSnapshot::at_slot(candidate_name, slot, slot.max_time_seconds))
            .await;

        log_info!("interview started for {}", candidate_name);
        Ok(())
    }

    /// Keeps the candidate's unsent text so it can be recorded if time runs out.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        if matches!(self.phase, SessionPhase::InProgress { .. }) {
            self.draft = text.into();
        }
    }

    /// Records an answer for the current question and moves on. Outside an
    /// active interview this does nothing.
    pub async fn submit_answer(
        &mut self,
        text: impl Into<String>,
    ) -> Result<Option<AnswerRecord>, SessionError> {
        let Some(slot) = self.current_slot() else {
            log_debug!("submission ignored while {}", self.phase.describe());
            return Ok(None);
        };
        self.advance(slot, text.into(), false).await.map(Some)
    }

    pub async fn next_timer_event(&mut self) -> Option<TimerEvent> {
        self.timer_events.recv().await
    }

    pub async fn handle_timer_event(
        &mut self,
        event: TimerEvent,
    ) -> Result<Option<AnswerRecord>, SessionError> {
        let Some(slot) = self.current_slot() else {
            return Ok(None);
        };
        if event.generation() != self.timer.generation().await {
            log_debug!("dropping stale timer event {:?}", event);
            return Ok(None);
        }

        match event {
            TimerEvent::Tick {
                remaining_seconds, ..
            } => {
                if self.heartbeat_every_ticks > 0
                    && remaining_seconds % self.heartbeat_every_ticks == 0
                {
                    let snapshot =
                        SessionSnapshot::at_slot(self.name(), slot, remaining_seconds);
                    self.persist(snapshot).await;
                }
                Ok(None)
            }
            TimerEvent::Expired { .. } => {
                log_info!("time expired on question {}", slot.index);
                let text = std::mem::take(&mut self.draft);
                self.advance(slot, text, true).await.map(Some)
            }
        }
    }

    /// Picks up a stored interview where it stopped. Returns `false` and
    /// falls back to awaiting candidate data when nothing usable is stored.
    pub async fn resume_interview(&mut self) -> Result<bool, SessionError> {
        let snapshot = match self.store.load().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                self.reset_to_awaiting().await?;
                return Ok(false);
            }
            Err(StoreError::CorruptSnapshot(reason)) => {
                log_warn!("saved session is corrupt, starting fresh: {}", reason);
                self.reset_to_awaiting().await?;
                return Ok(false);
            }
            Err(err) => {
                self.report_persistence_failure(err);
                // An unreadable store never ends the interview already running.
                if !matches!(self.phase, SessionPhase::InProgress { .. }) {
                    self.reset_to_awaiting().await?;
                }
                return Ok(false);
            }
        };

        if !snapshot.is_resumable() {
            log_info!("saved session already finished, discarding it");
            self.clear_snapshot().await;
            self.reset_to_awaiting().await?;
            return Ok(false);
        }

        let slot = match snapshot.validate() {
            Ok(slot) => slot,
            Err(err) => {
                log_warn!("saved session cannot be resumed, starting fresh: {}", err);
                self.reset_to_awaiting().await?;
                return Ok(false);
            }
        };

        if snapshot.current_difficulty != slot.difficulty {
            log_warn!(
                "saved difficulty {} disagrees with question {} ({}); using the schedule",
                snapshot.current_difficulty,
                slot.index,
                slot.difficulty
            );
        }

        self.candidate_name = Some(snapshot.candidate_name.clone());
        self.draft.clear();
        self.start_slot(slot, snapshot.time_left_seconds).await?;

        log_info!(
            "resumed interview for {} at question {} with {}s left",
            snapshot.candidate_name,
            slot.index,
            snapshot.time_left_seconds
        );
        Ok(true)
    }

    /// Abandons whatever is in progress and forgets the stored snapshot.
    pub async fn start_new_interview(&mut self) -> Result<(), SessionError> {
        self.reset_to_awaiting().await?;
        self.clear_snapshot().await;
        Ok(())
    }

    fn current_slot(&self) -> Option<&'static QuestionSlot> {
        match self.phase {
            SessionPhase::InProgress { slot } => schedule::slot(slot),
            _ => None,
        }
    }

    fn name(&self) -> &str {
        self.candidate_name.as_deref().unwrap_or_default()
    }

    async fn advance(
        &mut self,
        slot: &'static QuestionSlot,
        text: String,
        timed_out: bool,
    ) -> Result<AnswerRecord, SessionError> {
        let remaining = if timed_out {
            0
        } else {
            self.timer.remaining_seconds().await
        };
        let record = AnswerRecord::for_slot(slot, text, remaining, timed_out);
        self.draft.clear();
        self.emit(SessionEvent::AnswerSubmitted {
            record: record.clone(),
        });

        match schedule::next_slot(slot.index) {
            Some(next) => {
                self.start_slot(next, next.max_time_seconds).await?;
                let snapshot = SessionSnapshot::at_slot(self.name(), next, next.max_time_seconds);
                self.persist(snapshot).await;
            }
            None => {
                self.timer.set_active(false).await?;
                self.phase = SessionPhase::Completed;
                self.clear_snapshot().await;

                let candidate_name = self.name().to_string();
                log_info!("interview completed for {}", candidate_name);
                self.emit(SessionEvent::InterviewCompleted {
                    candidate_name,
                    completed_at: Utc::now(),
                });
            }
        }

        Ok(record)
    }

    async fn start_slot(
        &mut self,
        slot: &'static QuestionSlot,
        time_left_seconds: u32,
    ) -> Result<(), SessionError> {
        self.timer.configure(time_left_seconds).await?;
        self.timer.set_active(true).await?;
        self.phase = SessionPhase::InProgress { slot: slot.index };

        self.emit(SessionEvent::QuestionStarted {
            slot: slot.index,
            difficulty: slot.difficulty,
            question: slot.prompt.to_string(),
            time_limit_seconds: time_left_seconds,
        });
        Ok(())
    }

    async fn reset_to_awaiting(&mut self) -> Result<(), SessionError> {
        self.timer.set_active(false).await?;
        self.phase = SessionPhase::AwaitingCandidateData;
        self.candidate_name = None;
        self.draft.clear();
        Ok(())
    }

    async fn persist(&mut self, snapshot: SessionSnapshot) {
        match self.store.save(&snapshot).await {
            Ok(()) => self.persistence_available = true,
            Err(err) => self.report_persistence_failure(err),
        }
    }

    async fn clear_snapshot(&mut self) {
        if let Err(err) = self.store.clear().await {
            self.report_persistence_failure(err);
        }
    }

    fn report_persistence_failure(&mut self, err: StoreError) {
        log_warn!("continuing without saved progress: {}", err);
        self.persistence_available = false;
        self.emit(SessionEvent::PersistenceWarning {
            message: err.to_string(),
        });
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}
