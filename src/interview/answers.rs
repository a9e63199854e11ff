use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Difficulty, QuestionSlot};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_index: u32,
    pub difficulty: Difficulty,
    pub question: String,
    pub text: String,
    pub time_spent_seconds: u32,
    pub max_time_seconds: u32,
    /// Set when the countdown ran out rather than the candidate submitting.
    pub timed_out: bool,
    pub submitted_at: DateTime<Utc>,
}

impl AnswerRecord {
    pub fn for_slot(slot: &QuestionSlot, text: String, remaining_seconds: u32, timed_out: bool) -> Self {
        Self {
            question_index: slot.index,
            difficulty: slot.difficulty,
            question: slot.prompt.to_string(),
            text,
            time_spent_seconds: slot.max_time_seconds.saturating_sub(remaining_seconds),
            max_time_seconds: slot.max_time_seconds,
            timed_out,
            submitted_at: Utc::now(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
