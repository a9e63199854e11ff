use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

use super::{schedule, Difficulty, QuestionSlot, TOTAL_QUESTIONS};

/// Persisted progress of an unfinished interview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub candidate_name: String,
    pub questions_answered: u32,
    pub total_questions: u32,
    pub current_difficulty: Difficulty,
    pub time_left_seconds: u32,
    pub last_saved_at: DateTime<Utc>,
}

impl SessionSnapshot {
    /// Snapshot for a candidate about to answer `slot`, with `time_left_seconds`
    /// still on that slot's clock.
    pub fn at_slot(candidate_name: &str, slot: &QuestionSlot, time_left_seconds: u32) -> Self {
        Self {
            candidate_name: candidate_name.to_string(),
            questions_answered: slot.index - 1,
            total_questions: TOTAL_QUESTIONS,
            current_difficulty: slot.difficulty,
            time_left_seconds,
            last_saved_at: Utc::now(),
        }
    }

    pub fn is_resumable(&self) -> bool {
        self.questions_answered < self.total_questions
    }

    pub fn next_slot_index(&self) -> u32 {
        self.questions_answered + 1
    }

    /// Checks that a resumable snapshot can actually drive a countdown.
    pub fn validate(&self) -> Result<&'static QuestionSlot, StoreError> {
        if self.total_questions != TOTAL_QUESTIONS {
            return Err(StoreError::CorruptSnapshot(format!(
                "totalQuestions is {}, expected {}",
                self.total_questions, TOTAL_QUESTIONS
            )));
        }
        if self.candidate_name.trim().is_empty() {
            return Err(StoreError::CorruptSnapshot("candidateName is empty".into()));
        }

        let slot = schedule::slot(self.next_slot_index()).ok_or_else(|| {
            StoreError::CorruptSnapshot(format!(
                "questionsAnswered {} has no following question",
                self.questions_answered
            ))
        })?;

        if self.time_left_seconds == 0 || self.time_left_seconds > slot.max_time_seconds {
            return Err(StoreError::CorruptSnapshot(format!(
                "timeLeftSeconds {} outside 1..={} for question {}",
                self.time_left_seconds, slot.max_time_seconds, slot.index
            )));
        }

        Ok(slot)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|err| StoreError::PersistenceUnavailable(err.into()))
    }

    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(raw)?)
    }
}
