pub mod client;
pub mod error;
pub mod models;

pub use client::{SheetsClient, Worksheet};
pub use error::{Result, SheetsError};
pub use models::*;
