pub mod runtime;

pub use runtime::{inbound_from_text, reply_markup, TelegramPlatform};
