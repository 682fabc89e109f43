use std::sync::Arc;
use chrono::Utc;
use tracing::{debug, info};

use admitbot_common::models::Field;
use admitbot_common::traits::AnswerSink;

use crate::cache::SessionStore;
use crate::eventbus::{BotEvent, EventBus};
use crate::survey::catalog::CANCEL_TEXT;
use crate::survey::{Greeting, Keyboard, Reply, SurveyMachine, SurveyState, RESTART_TRIGGER};

/// What the user did, stripped of transport details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    Start,
    Cancel,
    /// Any other slash-command, without the slash.
    Command(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub user_id: i64,
    pub kind: InboundKind,
}

impl InboundEvent {
    pub fn new(user_id: i64, kind: InboundKind) -> Self {
        Self { user_id, kind }
    }

    pub fn text(user_id: i64, text: impl Into<String>) -> Self {
        Self::new(user_id, InboundKind::Text(text.into()))
    }
}

/// Routes inbound events to per-user sessions and returns what to send back.
pub struct SurveyService {
    sessions: SessionStore,
    machine: SurveyMachine,
    event_bus: Option<Arc<EventBus>>,
}

impl SurveyService {
    pub fn new(sink: Arc<dyn AnswerSink>, event_bus: Option<Arc<EventBus>>) -> Self {
        debug!("SurveyService::new() sink_mode={}", sink.mode());
        Self {
            sessions: SessionStore::new(),
            machine: SurveyMachine::new(sink),
            event_bus,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handles one event. `None` means nothing should be sent back.
    ///
    /// The user's session lock is held for the whole step, sink call included,
    /// so one user's events never interleave.
    pub async fn handle(&self, event: InboundEvent) -> Option<Reply> {
        let user_id = event.user_id;
        match event.kind {
            InboundKind::Start => {
                let handle = self.sessions.get_or_create(user_id);
                let reply = {
                    let mut session = handle.lock().await;
                    self.machine.begin(&mut session, Greeting::Start)
                };
                info!("user={} started a survey", user_id);
                self.publish(BotEvent::SurveyStarted { user_id, timestamp: Utc::now() }).await;
                Some(reply)
            }
            InboundKind::Cancel => {
                if self.sessions.remove(user_id).is_none() {
                    debug!("user={} sent /cancel without a session", user_id);
                    return None;
                }
                info!("user={} cancelled the survey", user_id);
                self.publish(BotEvent::SessionCancelled { user_id }).await;
                Some(Reply::new(None, CANCEL_TEXT, Keyboard::Remove))
            }
            InboundKind::Command(name) => {
                debug!("user={} sent unsupported command /{}, ignoring", user_id, name);
                None
            }
            InboundKind::Text(text) => self.handle_text(user_id, &text).await,
        }
    }

    async fn handle_text(&self, user_id: i64, text: &str) -> Option<Reply> {
        let handle = match self.sessions.get(user_id) {
            Some(handle) => handle,
            // Outside a conversation only the restart button opens one.
            None if text == RESTART_TRIGGER => self.sessions.get_or_create(user_id),
            None => {
                debug!("user={} has no session, ignoring text", user_id);
                return None;
            }
        };

        let mut session = handle.lock().await;
        let reply = self.machine.step(&mut session, text).await?;
        // Answers stay in place until the next continue or restart.
        let applicant = session.answers.get_or_empty(Field::Fio);
        drop(session);

        if let Some(stored) = reply.submission {
            self.publish(BotEvent::SubmissionPersisted {
                user_id,
                applicant,
                stored,
                timestamp: Utc::now(),
            })
            .await;
        } else if reply.state == Some(SurveyState::Name) {
            self.publish(BotEvent::SurveyStarted { user_id, timestamp: Utc::now() }).await;
        }

        Some(reply)
    }

    async fn publish(&self, event: BotEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event).await;
        }
    }
}
