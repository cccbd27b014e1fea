//! Repositories wrapping sea-orm queries.

mod emote;
mod emote_name;
mod tag;

pub use emote::EmoteRepository;
pub use emote_name::EmoteNameRepository;
pub use tag::TagRepository;

use emotes_common::AppError;
use sea_orm::{DbErr, SqlErr};

/// Convert a database error, surfacing unique violations as conflicts.
pub(crate) fn db_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::Conflict(detail),
        _ => AppError::Database(err.to_string()),
    }
}
