use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc::UnboundedReceiver,
    time::{self, Instant},
};

use crate::{
    error::SessionError,
    interview::{schedule, AnswerRecord, CandidateData, Difficulty, SessionSnapshot},
    store::{MemorySessionStore, SessionStore},
    timer::Urgency,
};

use super::{InterviewSession, SessionEvent, SessionOptions, SessionPhase};

fn new_session() -> (
    InterviewSession,
    Arc<MemorySessionStore>,
    UnboundedReceiver<SessionEvent>,
) {
    let store = Arc::new(MemorySessionStore::new());
    let (session, events) = InterviewSession::new(store.clone(), SessionOptions::default());
    (session, store, events)
}

fn stored(store: &MemorySessionStore) -> Option<SessionSnapshot> {
    store
        .raw()
        .map(|raw| SessionSnapshot::from_json(&raw).unwrap())
}

async fn run_until_answer(session: &mut InterviewSession) -> AnswerRecord {
    loop {
        let event = session.next_timer_event().await.unwrap();
        if let Some(record) = session.handle_timer_event(event).await.unwrap() {
            return record;
        }
    }
}

fn drain(events: &mut UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

#[tokio::test(start_paused = true)]
async fn ada_answers_all_six_questions() {
    let (mut session, store, mut events) = new_session();

    session.begin_interview("Ada").await.unwrap();
    let snapshot = stored(&store).unwrap();
    assert_eq!(snapshot.candidate_name, "Ada");
    assert_eq!(snapshot.questions_answered, 0);
    assert_eq!(snapshot.current_difficulty, Difficulty::Easy);
    assert_eq!(snapshot.time_left_seconds, 20);

    let record = session
        .submit_answer("var is function scoped")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.question_index, 1);
    assert_eq!(record.text, "var is function scoped");
    assert!(!record.timed_out);

    let snapshot = stored(&store).unwrap();
    assert_eq!(snapshot.questions_answered, 1);
    assert_eq!(snapshot.current_difficulty, Difficulty::Easy);
    assert_eq!(snapshot.time_left_seconds, 20);
    assert_eq!(session.phase(), SessionPhase::InProgress { slot: 2 });

    for answer in ["hooks", "jwt", "schema", "it depends"] {
        session.submit_answer(answer).await.unwrap();
    }
    assert_eq!(stored(&store).unwrap().questions_answered, 5);

    session.submit_answer("memoize").await.unwrap();
    assert_eq!(session.phase(), SessionPhase::Completed);
    assert!(store.raw().is_none());

    let emitted = drain(&mut events);
    let answered = emitted
        .iter()
        .filter(|event| matches!(event, SessionEvent::AnswerSubmitted { .. }))
        .count();
    assert_eq!(answered, 6);
    assert!(matches!(
        emitted.last(),
        Some(SessionEvent::InterviewCompleted { candidate_name, .. }) if candidate_name == "Ada"
    ));

    let view = session.view().await;
    assert!(view.is_completed);
    assert!(!view.is_in_progress);
}

#[tokio::test(start_paused = true)]
async fn submissions_follow_the_difficulty_schedule() {
    let (mut session, _store, _events) = new_session();
    session.begin_interview("Ada").await.unwrap();

    let expected = [
        (2, Difficulty::Easy, 20),
        (3, Difficulty::Medium, 60),
        (4, Difficulty::Medium, 60),
        (5, Difficulty::Hard, 120),
        (6, Difficulty::Hard, 120),
    ];
    for (slot, difficulty, seconds) in expected {
        session.submit_answer("answer").await.unwrap();
        let view = session.view().await;
        assert_eq!(view.current_slot_index, slot);
        assert_eq!(view.current_difficulty, difficulty);
        assert_eq!(view.remaining_seconds, seconds);
        assert_eq!(view.progress_percent, 100.0);
        assert!(view.is_in_progress);
    }
}

#[tokio::test(start_paused = true)]
async fn resume_continues_the_saved_countdown() {
    let (mut session, store, _events) = new_session();
    let snapshot = SessionSnapshot::at_slot("Mike Johnson", schedule::slot(3).unwrap(), 45);
    assert_eq!(snapshot.questions_answered, 2);
    store.save(&snapshot).await.unwrap();

    assert_eq!(session.saved_session().await, Some(snapshot));
    assert!(session.resume_interview().await.unwrap());

    assert_eq!(session.phase(), SessionPhase::InProgress { slot: 3 });
    assert_eq!(session.candidate_name(), Some("Mike Johnson"));
    let view = session.view().await;
    assert_eq!(view.current_difficulty, Difficulty::Medium);
    assert_eq!(view.remaining_seconds, 45);

    let started = Instant::now();
    let record = run_until_answer(&mut session).await;
    assert_eq!(started.elapsed(), Duration::from_secs(45));
    assert_eq!(record.question_index, 3);
    assert_eq!(record.time_spent_seconds, 60);
    assert_eq!(session.phase(), SessionPhase::InProgress { slot: 4 });
}

#[tokio::test(start_paused = true)]
async fn start_new_interview_is_idempotent() {
    let (mut session, store, _events) = new_session();
    session.begin_interview("Ada").await.unwrap();
    session.submit_answer("first").await.unwrap();

    for _ in 0..2 {
        session.start_new_interview().await.unwrap();
        assert_eq!(session.phase(), SessionPhase::AwaitingCandidateData);
        assert!(store.raw().is_none());
        assert!(session.candidate_name().is_none());
        assert_eq!(session.view().await.current_slot_index, 1);
    }

    session.begin_interview("Grace").await.unwrap();
    assert_eq!(session.phase(), SessionPhase::InProgress { slot: 1 });
}

#[tokio::test(start_paused = true)]
async fn expiry_on_the_last_question_completes_with_an_empty_answer() {
    let (mut session, store, _events) = new_session();
    session.begin_interview("Ada").await.unwrap();
    for _ in 0..5 {
        session.submit_answer("answer").await.unwrap();
    }
    assert_eq!(session.phase(), SessionPhase::InProgress { slot: 6 });

    let started = Instant::now();
    let record = run_until_answer(&mut session).await;

    assert_eq!(started.elapsed(), Duration::from_secs(120));
    assert_eq!(record.question_index, 6);
    assert_eq!(record.text, "");
    assert!(record.is_blank());
    assert!(record.timed_out);
    assert_eq!(record.time_spent_seconds, 120);
    assert_eq!(session.phase(), SessionPhase::Completed);
    assert!(store.raw().is_none());
}

#[tokio::test(start_paused = true)]
async fn expiry_records_the_unsent_draft() {
    let (mut session, _store, _events) = new_session();
    session.begin_interview("Ada").await.unwrap();
    session.update_draft("let and const are block scoped");

    let record = run_until_answer(&mut session).await;
    assert_eq!(record.text, "let and const are block scoped");
    assert!(record.timed_out);
    assert_eq!(session.draft(), "");
    assert_eq!(session.phase(), SessionPhase::InProgress { slot: 2 });
}

#[tokio::test(start_paused = true)]
async fn stale_expiry_never_hits_the_next_question() {
    let (mut session, _store, _events) = new_session();
    session.begin_interview("Ada").await.unwrap();

    // Let question 1 expire without processing its events, then answer anyway.
    time::sleep(Duration::from_millis(20_500)).await;
    session.submit_answer("just in time").await.unwrap();
    assert_eq!(session.phase(), SessionPhase::InProgress { slot: 2 });

    while let Ok(Some(event)) =
        time::timeout(Duration::from_millis(10), session.next_timer_event()).await
    {
        assert!(session.handle_timer_event(event).await.unwrap().is_none());
    }

    assert_eq!(session.phase(), SessionPhase::InProgress { slot: 2 });
    assert_eq!(session.view().await.remaining_seconds, 20);
}

#[tokio::test(start_paused = true)]
async fn heartbeat_saves_the_live_countdown() {
    let (mut session, store, _events) = new_session();
    session.begin_interview("Ada").await.unwrap();

    loop {
        let event = session.next_timer_event().await.unwrap();
        session.handle_timer_event(event).await.unwrap();
        if session.view().await.remaining_seconds == 15 {
            break;
        }
    }

    let snapshot = stored(&store).unwrap();
    assert_eq!(snapshot.questions_answered, 0);
    assert_eq!(snapshot.time_left_seconds, 15);
}

#[tokio::test(start_paused = true)]
async fn finished_snapshot_is_not_offered_for_resume() {
    let (mut session, store, _events) = new_session();
    store.set_raw(
        r#"{"candidateName":"Jane Smith","questionsAnswered":6,"totalQuestions":6,
            "currentDifficulty":"Hard","timeLeftSeconds":120,"lastSavedAt":"2024-01-14T15:05:00Z"}"#,
    );

    assert!(session.saved_session().await.is_none());
    assert!(!session.resume_interview().await.unwrap());
    assert_eq!(session.phase(), SessionPhase::AwaitingCandidateData);
    assert!(store.raw().is_none());
}

#[tokio::test(start_paused = true)]
async fn corrupt_snapshot_is_treated_as_absent() {
    let (mut session, store, _events) = new_session();
    store.set_raw("{\"candidateName\": \"Ada\", \"questionsAnswered\": ");

    assert!(session.saved_session().await.is_none());
    assert!(!session.resume_interview().await.unwrap());
    assert_eq!(session.phase(), SessionPhase::AwaitingCandidateData);
    assert!(session.persistence_available());
}

#[tokio::test(start_paused = true)]
async fn unavailable_storage_only_warns() {
    let (mut session, store, mut events) = new_session();
    store.set_unavailable(true);

    session.begin_interview("Ada").await.unwrap();
    assert!(!session.persistence_available());
    assert!(drain(&mut events)
        .iter()
        .any(|event| matches!(event, SessionEvent::PersistenceWarning { .. })));

    session.submit_answer("still works").await.unwrap();
    assert_eq!(session.phase(), SessionPhase::InProgress { slot: 2 });
    assert!(!session.view().await.persistence_available);

    store.set_unavailable(false);
    session.submit_answer("back online").await.unwrap();
    assert!(session.persistence_available());
    assert_eq!(stored(&store).unwrap().questions_answered, 2);
}

#[tokio::test(start_paused = true)]
async fn unreadable_store_on_resume_keeps_the_running_interview() {
    let (mut session, store, mut events) = new_session();
    session.begin_interview("Ada").await.unwrap();
    session.submit_answer("first").await.unwrap();
    time::sleep(Duration::from_millis(3_500)).await;
    drain(&mut events);

    store.set_unavailable(true);
    assert!(!session.resume_interview().await.unwrap());

    assert_eq!(session.phase(), SessionPhase::InProgress { slot: 2 });
    assert_eq!(session.candidate_name(), Some("Ada"));
    assert!(!session.persistence_available());
    assert!(drain(&mut events)
        .iter()
        .any(|event| matches!(event, SessionEvent::PersistenceWarning { .. })));

    let view = session.view().await;
    assert!(view.is_in_progress);
    assert_eq!(view.remaining_seconds, 17);

    time::sleep(Duration::from_secs(1)).await;
    assert_eq!(session.view().await.remaining_seconds, 16);
}

#[tokio::test(start_paused = true)]
async fn unreadable_store_on_resume_without_interview_awaits_candidate() {
    let (mut session, store, _events) = new_session();
    store.set_unavailable(true);

    assert!(!session.resume_interview().await.unwrap());
    assert_eq!(session.phase(), SessionPhase::AwaitingCandidateData);
    assert!(!session.persistence_available());
}

#[tokio::test(start_paused = true)]
async fn view_outside_an_interview_reports_normal_urgency() {
    let (mut session, _store, _events) = new_session();
    session.begin_interview("Ada").await.unwrap();

    time::sleep(Duration::from_millis(16_500)).await;
    let view = session.view().await;
    assert_eq!(view.remaining_seconds, 4);
    assert_eq!(view.urgency, Urgency::Critical);

    session.start_new_interview().await.unwrap();
    let view = session.view().await;
    assert_eq!(view.phase, SessionPhase::AwaitingCandidateData);
    assert_eq!(view.remaining_seconds, 0);
    assert_eq!(view.urgency, Urgency::Normal);
}

#[tokio::test(start_paused = true)]
async fn submissions_outside_an_interview_are_ignored() {
    let (mut session, _store, mut events) = new_session();
    assert!(session.submit_answer("too early").await.unwrap().is_none());
    assert_eq!(session.phase(), SessionPhase::AwaitingCandidateData);
    assert!(drain(&mut events).is_empty());

    session.begin_interview("Ada").await.unwrap();
    for _ in 0..6 {
        session.submit_answer("   ").await.unwrap();
    }
    assert_eq!(session.phase(), SessionPhase::Completed);
    assert!(session.submit_answer("too late").await.unwrap().is_none());
    assert_eq!(session.phase(), SessionPhase::Completed);
}

#[tokio::test(start_paused = true)]
async fn begin_requires_candidate_data_and_a_fresh_session() {
    let (mut session, _store, _events) = new_session();

    let partial = CandidateData::new("John Doe", "john.doe@email.com", "");
    match session.begin_with_candidate(&partial).await {
        Err(SessionError::MissingCandidateFields(fields)) => assert_eq!(fields, vec!["phone"]),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(
        session.begin_interview("  ").await,
        Err(SessionError::MissingCandidateFields(_))
    ));

    let complete = CandidateData::new("John Doe", "john.doe@email.com", "+1-555-0123");
    session.begin_with_candidate(&complete).await.unwrap();
    assert!(matches!(
        session.begin_interview("Someone Else").await,
        Err(SessionError::InvalidTransition(_))
    ));
    assert_eq!(session.candidate_name(), Some("John Doe"));
}

#[tokio::test(start_paused = true)]
async fn resume_trusts_the_schedule_over_a_stale_difficulty() {
    let (mut session, store, _events) = new_session();
    store.set_raw(
        r#"{"candidateName":"Ada","questionsAnswered":4,"totalQuestions":6,
            "currentDifficulty":"Easy","timeLeftSeconds":90,"lastSavedAt":"2024-01-16T09:15:00Z"}"#,
    );

    assert!(session.resume_interview().await.unwrap());
    let view = session.view().await;
    assert_eq!(view.current_slot_index, 5);
    assert_eq!(view.current_difficulty, Difficulty::Hard);
    assert_eq!(view.remaining_seconds, 90);
}
