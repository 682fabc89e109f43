pub mod catalog;
pub mod machine;
pub mod session;
pub mod state;

pub use catalog::{Greeting, Question, CONTINUE_TRIGGER, INELIGIBLE_OBSTACLE, RESTART_TRIGGER};
pub use machine::{Keyboard, Reply, SurveyMachine};
pub use session::Session;
pub use state::SurveyState;
