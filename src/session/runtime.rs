//! Serializes every trigger that can move the interview forward.
//!
//! A single task owns the [`InterviewSession`] and reacts to one thing at a
//! time: a command from the UI or an event from the question timer. Callers
//! talk to it through a cloneable [`SessionHandle`].

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    error::SessionError,
    interview::{AnswerRecord, CandidateData, SessionSnapshot},
};

use super::{InterviewSession, SessionView};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

type Reply<T> = oneshot::Sender<T>;

enum SessionCommand {
    Begin {
        candidate: CandidateData,
        reply: Reply<Result<(), SessionError>>,
    },
    UpdateDraft(String),
    Submit {
        text: String,
        reply: Reply<Result<Option<AnswerRecord>, SessionError>>,
    },
    Resume {
        reply: Reply<Result<bool, SessionError>>,
    },
    StartNew {
        reply: Reply<Result<(), SessionError>>,
    },
    SavedSession {
        reply: Reply<Option<SessionSnapshot>>,
    },
    View {
        reply: Reply<SessionView>,
    },
    Shutdown,
}

#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::UnboundedSender<SessionCommand>,
}

/// Moves `session` onto its own task and returns the handle used to drive it.
pub fn spawn_session(session: InterviewSession) -> (SessionHandle, JoinHandle<()>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let task = tokio::spawn(session_loop(session, receiver));
    (SessionHandle { sender }, task)
}

async fn session_loop(
    mut session: InterviewSession,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
) {
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(SessionCommand::Shutdown) | None => break,
                Some(command) => dispatch(&mut session, command).await,
            },
            Some(event) = session.next_timer_event() => {
                if let Err(err) = session.handle_timer_event(event).await {
                    log_error!("failed to apply timer event {:?}: {}", event, err);
                }
            }
        }
    }

    log_info!("session runtime shutting down");
}

async fn dispatch(session: &mut InterviewSession, command: SessionCommand) {
    match command {
        SessionCommand::Begin { candidate, reply } => {
            let _ = reply.send(session.begin_with_candidate(&candidate).await);
        }
        SessionCommand::UpdateDraft(text) => session.update_draft(text),
        SessionCommand::Submit { text, reply } => {
            let _ = reply.send(session.submit_answer(text).await);
        }
        SessionCommand::Resume { reply } => {
            let _ = reply.send(session.resume_interview().await);
        }
        SessionCommand::StartNew { reply } => {
            let _ = reply.send(session.start_new_interview().await);
        }
        SessionCommand::SavedSession { reply } => {
            let _ = reply.send(session.saved_session().await);
        }
        SessionCommand::View { reply } => {
            let _ = reply.send(session.view().await);
        }
        SessionCommand::Shutdown => {}
    }
}

impl SessionHandle {
    pub async fn begin(&self, candidate: CandidateData) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Begin { candidate, reply })
            .await?
    }

    pub fn update_draft(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.sender
            .send(SessionCommand::UpdateDraft(text.into()))
            .map_err(|_| SessionError::RuntimeClosed)
    }

    pub async fn submit_answer(
        &self,
        text: impl Into<String>,
    ) -> Result<Option<AnswerRecord>, SessionError> {
        let text = text.into();
        self.request(|reply| SessionCommand::Submit { text, reply })
            .await?
    }

    pub async fn resume_interview(&self) -> Result<bool, SessionError> {
        self.request(|reply| SessionCommand::Resume { reply }).await?
    }

    pub async fn start_new_interview(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::StartNew { reply })
            .await?
    }

    pub async fn saved_session(&self) -> Result<Option<SessionSnapshot>, SessionError> {
        self.request(|reply| SessionCommand::SavedSession { reply })
            .await
    }

    pub async fn view(&self) -> Result<SessionView, SessionError> {
        self.request(|reply| SessionCommand::View { reply }).await
    }

    pub fn shutdown(&self) {
        let _ = self.sender.send(SessionCommand::Shutdown);
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .map_err(|_| SessionError::RuntimeClosed)?;
        response.await.map_err(|_| SessionError::RuntimeClosed)
    }
}
