pub mod session_store;

pub use session_store::{SessionHandle, SessionStore};
