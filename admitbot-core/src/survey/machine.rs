// File: admitbot-core/src/survey/machine.rs

use std::sync::Arc;

use chrono::Local;
use tracing::{debug, error, info};

use admitbot_common::traits::AnswerSink;

use crate::survey::catalog::{self, Greeting, InputMode, CONTINUE_TRIGGER, RESTART_TRIGGER};
use crate::survey::session::Session;
use crate::survey::state::SurveyState;

/// Keyboard hint attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Reply buttons, row by row.
    Options(Vec<Vec<String>>),
    /// Hide any keyboard currently shown.
    Remove,
}

/// What the transport should send back after one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// State the session is in after the event; `None` once the session is gone.
    pub state: Option<SurveyState>,
    pub text: String,
    pub keyboard: Keyboard,
    /// Outcome of the sink call, present only on the step that completed a survey.
    pub submission: Option<bool>,
}

impl Reply {
    pub fn new(state: Option<SurveyState>, text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            state,
            text: text.into(),
            keyboard,
            submission: None,
        }
    }

    fn question(state: SurveyState) -> Option<Self> {
        catalog::question(state).map(|q| Self::new(Some(state), q.prompt, Keyboard::Options(q.keyboard())))
    }

    /// Every button label offered with this reply.
    pub fn allowed_options(&self) -> Vec<&str> {
        match &self.keyboard {
            Keyboard::Options(rows) => rows.iter().flatten().map(|s| s.as_str()).collect(),
            Keyboard::Remove => Vec::new(),
        }
    }
}

/// Drives a [`Session`] through the question sequence and hands finished
/// rows to the sink.
#[derive(Clone)]
pub struct SurveyMachine {
    sink: Arc<dyn AnswerSink>,
}

impl SurveyMachine {
    pub fn new(sink: Arc<dyn AnswerSink>) -> Self {
        Self { sink }
    }

    /// Resets the session and asks the first question.
    pub fn begin(&self, session: &mut Session, greeting: Greeting) -> Reply {
        session.reset();
        Reply::new(
            Some(SurveyState::Name),
            catalog::greeting_text(greeting, self.sink.mode()),
            Keyboard::Options(catalog::with_restart_row(&[])),
        )
    }

    /// Applies one text input. Returns `None` when the input is ignored
    /// (anything but the continue or restart trigger after completion).
    pub async fn step(&self, session: &mut Session, input: &str) -> Option<Reply> {
        if input == RESTART_TRIGGER {
            debug!("Restart requested in state {}", session.state);
            return Some(self.begin(session, Greeting::Restart));
        }

        let Some(field) = session.state.field() else {
            if input == CONTINUE_TRIGGER {
                return Some(self.begin(session, Greeting::Continue));
            }
            debug!("Ignoring input after completion: '{}'", input);
            return None;
        };

        if let Some(q) = catalog::question(session.state) {
            if q.mode == InputMode::Choice && !q.offers(input) {
                debug!("Typed answer for {} is not one of the buttons, keeping it", field);
            }
        }
        session.answers.insert(field, input);
        let next = session.state.next(input).unwrap_or(SurveyState::AwaitingContinue);
        debug!("{} -> {} (stored '{}')", session.state, next, field);
        session.state = next;

        if next.is_terminal() {
            self.complete(session).await
        } else {
            Reply::question(next)
        }
    }

    async fn complete(&self, session: &Session) -> Option<Reply> {
        let Some(row) = session.completed_row(Local::now()) else {
            error!("Survey completion requested in non-terminal state {}", session.state);
            return None;
        };

        let stored = self.sink.persist(&row).await;
        info!(
            "Survey for '{}' finished => stored={} mode={}",
            row.applicant,
            stored,
            self.sink.mode()
        );

        let mut reply = Reply::new(
            Some(SurveyState::AwaitingContinue),
            catalog::completion_text(stored, self.sink.mode(), &self.sink.backup_location()),
            Keyboard::Options(catalog::completion_keyboard()),
        );
        reply.submission = Some(stored);
        Some(reply)
    }
}
