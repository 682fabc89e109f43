pub mod survey_service;

pub use survey_service::{InboundEvent, InboundKind, SurveyService};
