//! Line-oriented front end: one line of input is one submitted answer.

use std::{io::Write, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::{
    config::{AppConfig, StoreBackend},
    db::{Database, SqliteSessionStore},
    interview::{CandidateData, TOTAL_QUESTIONS},
    session::{spawn_session, InterviewSession, SessionEvent, SessionHandle},
    store::{MemorySessionStore, SessionStore},
    timer::{format_clock, Urgency},
};

type Input = Lines<BufReader<Stdin>>;

const URGENCY_POLL: Duration = Duration::from_secs(1);

pub fn open_store(config: &AppConfig) -> Result<Arc<dyn SessionStore>> {
    match config.store {
        StoreBackend::Sqlite => {
            let database = Database::new(config.database_path())?;
            if let Some(path) = database.path() {
                log::info!("Session snapshots stored in {}", path.display());
            }
            Ok(Arc::new(SqliteSessionStore::new(database)))
        }
        StoreBackend::Memory => {
            log::warn!("Using in-memory session store; progress will not survive a restart");
            Ok(Arc::new(MemorySessionStore::new()))
        }
    }
}

pub async fn run_console(config: AppConfig) -> Result<()> {
    let store = open_store(&config)?;
    let (session, mut events) = InterviewSession::new(store, config.session_options());
    let (handle, task) = spawn_session(session);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    if !offer_resume(&handle, &mut input).await? {
        let candidate = collect_candidate(&mut input).await?;
        handle.begin(candidate).await?;
    }

    println!("Type your answer and press Enter to submit it.");
    let mut poll = tokio::time::interval(URGENCY_POLL);
    let mut last_urgency = Urgency::Normal;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                print_event(&event);
                match event {
                    SessionEvent::QuestionStarted { .. } => last_urgency = Urgency::Normal,
                    SessionEvent::InterviewCompleted { .. } => break,
                    _ => {}
                }
            }
            line = input.next_line() => {
                match line.context("failed to read answer")? {
                    Some(text) => {
                        handle.submit_answer(text).await?;
                    }
                    None => break,
                }
            }
            _ = poll.tick() => {
                let view = handle.view().await?;
                if view.is_in_progress && view.urgency != last_urgency {
                    last_urgency = view.urgency;
                    if view.urgency != Urgency::Normal {
                        println!("  {} left", format_clock(view.remaining_seconds));
                    }
                }
            }
        }
    }

    handle.shutdown();
    task.await.context("session task panicked")?;
    Ok(())
}

/// Returns true when a saved interview was resumed.
async fn offer_resume(handle: &SessionHandle, input: &mut Input) -> Result<bool> {
    let Some(saved) = handle.saved_session().await? else {
        return Ok(false);
    };

    println!(
        "Welcome back, {}! You answered {} of {} questions; {} remained on a {} question (saved {}).",
        saved.candidate_name,
        saved.questions_answered,
        saved.total_questions,
        format_clock(saved.time_left_seconds),
        saved.current_difficulty,
        saved.last_saved_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );

    let answer = prompt(input, "Resume this interview? [Y/n] ").await?;
    let declined = answer.trim().to_ascii_lowercase().starts_with('n');

    if declined {
        handle.start_new_interview().await?;
        return Ok(false);
    }
    Ok(handle.resume_interview().await?)
}

async fn collect_candidate(input: &mut Input) -> Result<CandidateData> {
    loop {
        let name = prompt(input, "Name: ").await?;
        let email = prompt(input, "Email: ").await?;
        let phone = prompt(input, "Phone: ").await?;

        let candidate = CandidateData::new(name, email, phone);
        let missing = candidate.missing_fields();
        if missing.is_empty() {
            return Ok(candidate);
        }
        println!("Please fill in: {}", missing.join(", "));
    }
}

async fn prompt(input: &mut Input, label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush().context("failed to flush stdout")?;
    input
        .next_line()
        .await
        .context("failed to read input")?
        .context("input closed before the interview started")
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::QuestionStarted {
            slot,
            difficulty,
            question,
            time_limit_seconds,
        } => {
            println!();
            println!(
                "Question {slot} of {TOTAL_QUESTIONS} [{difficulty}, {}]",
                format_clock(*time_limit_seconds)
            );
            println!("{question}");
        }
        SessionEvent::AnswerSubmitted { record } if record.timed_out => {
            println!(
                "Time is up for question {}; moving on.",
                record.question_index
            );
        }
        SessionEvent::AnswerSubmitted { record } => {
            println!(
                "Answer to question {} recorded after {}.",
                record.question_index,
                format_clock(record.time_spent_seconds)
            );
        }
        SessionEvent::InterviewCompleted { candidate_name, .. } => {
            println!();
            println!("Thank you, {candidate_name}. The interview is complete.");
        }
        SessionEvent::PersistenceWarning { message } => {
            println!("Warning: progress is not being saved ({message}).");
        }
    }
}
