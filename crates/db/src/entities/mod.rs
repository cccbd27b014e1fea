//! Database entities.

pub mod emote;
pub mod emote_name;
pub mod emote_tag;
pub mod tag;

pub use emote::Entity as Emote;
pub use emote_name::Entity as EmoteName;
pub use emote_tag::Entity as EmoteTag;
pub use tag::Entity as Tag;
