pub mod answers;
pub mod candidate;
pub mod schedule;
pub mod snapshot;

pub use answers::AnswerRecord;
pub use candidate::CandidateData;
pub use schedule::{Difficulty, QuestionSlot, SCHEDULE, TOTAL_QUESTIONS};
pub use snapshot::SessionSnapshot;
