//! Core business logic for emote-server.

pub mod error;
pub mod services;

pub use error::{EmoteError, EmoteResult};
pub use services::*;
