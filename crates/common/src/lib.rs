//! Common utilities and shared types for emote-server.
//!
//! This crate provides foundational components used across all emote-server crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Storage**: Placement of uploaded emote images under the content directory
//!
//! # Example
//!
//! ```no_run
//! use emotes_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     println!("{} -> {}", config.emotes.content_dir.display(), id_gen.generate());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod storage;

pub use config::{Config, EmoteConfig};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use storage::{
    FilePlacement, LocalFilePlacement, UPLOAD_ROOT, emote_image_key, emote_image_stem,
    stale_files_pattern,
};
