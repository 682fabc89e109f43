// src/lib.rs

pub mod cache;
pub mod config;
pub mod eventbus;
pub mod platforms;
pub mod services;
pub mod sink;
pub mod survey;

pub use admitbot_common::error::Error;
pub use config::SinkConfig;
pub use services::survey_service::{InboundEvent, InboundKind, SurveyService};
pub use sink::SpreadsheetSink;
