// File: admitbot-core/tests/test_utils/mod.rs
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use admitbot_common::models::SubmissionRow;
use admitbot_common::traits::{AnswerSink, SinkMode};
use admitbot_core::survey::INELIGIBLE_OBSTACLE;

/// In-memory sink that records every row it is asked to persist.
#[derive(Clone)]
pub struct RecordingSink {
    pub rows: Arc<Mutex<Vec<SubmissionRow>>>,
    pub accept: bool,
    pub mode: SinkMode,
}

impl RecordingSink {
    pub fn accepting() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            accept: true,
            mode: SinkMode::Durable,
        }
    }

    pub fn failing(mode: SinkMode) -> Self {
        Self {
            accept: false,
            mode,
            ..Self::accepting()
        }
    }

    pub fn rows(&self) -> Vec<SubmissionRow> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerSink for RecordingSink {
    async fn persist(&self, row: &SubmissionRow) -> bool {
        self.rows.lock().unwrap().push(row.clone());
        self.accept
    }

    fn mode(&self) -> SinkMode {
        self.mode
    }

    fn backup_location(&self) -> String {
        "backup_data.json".to_string()
    }
}

/// A complete interview, one answer per question in order.
pub fn full_script() -> Vec<&'static str> {
    vec![
        "Ivanov",
        "Fr. X",
        "none",
        "has, blessed",
        "Общительный, открытый",
        "Давно в церкви",
        "Затрудняюсь ответить",
        "Помогает в храме",
        "",
        "Вполне зрелый",
        "none",
        "fine",
        "Yes",
    ]
}

/// The shortest interview: ineligible, straight to the verdict.
pub fn ineligible_script() -> Vec<&'static str> {
    vec!["Petrov", "иер. Иван Воробьев", INELIGIBLE_OBSTACLE, "Нет"]
}
