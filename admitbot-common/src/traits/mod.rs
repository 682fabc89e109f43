// File: admitbot-common/src/traits/mod.rs
pub mod sink_traits;

pub use sink_traits::{AnswerSink, FallbackStore, SinkMode, TabularStore};
