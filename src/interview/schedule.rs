//! The fixed question schedule: six slots, two per difficulty.

use serde::{Deserialize, Serialize};

pub const TOTAL_QUESTIONS: u32 = 6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSlot {
    pub index: u32,
    pub difficulty: Difficulty,
    pub max_time_seconds: u32,
    pub prompt: &'static str,
}

pub const SCHEDULE: [QuestionSlot; TOTAL_QUESTIONS as usize] = [
    QuestionSlot {
        index: 1,
        difficulty: Difficulty::Easy,
        max_time_seconds: 20,
        prompt: "What is the difference between `let`, `const`, and `var` in JavaScript?",
    },
    QuestionSlot {
        index: 2,
        difficulty: Difficulty::Easy,
        max_time_seconds: 20,
        prompt: "Explain the concept of React hooks and provide an example of how you would use useState and useEffect.",
    },
    QuestionSlot {
        index: 3,
        difficulty: Difficulty::Medium,
        max_time_seconds: 60,
        prompt: "How would you implement authentication in a Node.js Express application? Discuss different approaches.",
    },
    QuestionSlot {
        index: 4,
        difficulty: Difficulty::Medium,
        max_time_seconds: 60,
        prompt: "Design a database schema for a social media platform. Consider relationships, indexing, and scalability.",
    },
    QuestionSlot {
        index: 5,
        difficulty: Difficulty::Hard,
        max_time_seconds: 120,
        prompt: "Explain the difference between SQL and NoSQL databases. When would you choose one over the other?",
    },
    QuestionSlot {
        index: 6,
        difficulty: Difficulty::Hard,
        max_time_seconds: 120,
        prompt: "How would you optimize a React application's performance? Discuss specific techniques and tools you would use.",
    },
];

/// Looks up a slot by its 1-based index.
pub fn slot(index: u32) -> Option<&'static QuestionSlot> {
    index
        .checked_sub(1)
        .and_then(|offset| SCHEDULE.get(offset as usize))
}

pub fn first_slot() -> &'static QuestionSlot {
    &SCHEDULE[0]
}

/// The slot after `index`, or `None` once the last question has been asked.
pub fn next_slot(index: u32) -> Option<&'static QuestionSlot> {
    if index >= TOTAL_QUESTIONS {
        return None;
    }
    slot(index + 1)
}
