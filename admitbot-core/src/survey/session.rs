// File: admitbot-core/src/survey/session.rs

use chrono::{DateTime, Local};

use admitbot_common::models::{Answers, SubmissionRow};

use crate::survey::state::SurveyState;

/// One user's in-progress survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub state: SurveyState,
    pub answers: Answers,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SurveyState::Name,
            answers: Answers::new(),
        }
    }

    /// Forget all answers and go back to the first question.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.state = SurveyState::Name;
    }

    /// The finished row; only available once the survey reached the terminal state.
    pub fn completed_row(&self, now: DateTime<Local>) -> Option<SubmissionRow> {
        self.state
            .is_terminal()
            .then(|| SubmissionRow::from_answers(&self.answers, now))
    }
}
