//! Business logic services.

#![allow(missing_docs)]

pub mod canonical_name;
pub mod emote;
pub mod image_inspector;
pub mod normalize;
pub mod policy;
pub mod reconcile;

#[cfg(test)]
mod test_store;

pub use emote::{
    BulkImportReport, EmoteDetails, EmoteFiles, EmoteInput, EmoteService, LegacyEmote,
    SubmitMode,
};
pub use image_inspector::ImageInspector;
pub use normalize::{OneOrMany, normalize_list, normalize_names, one_or_many, parse_css};
pub use policy::{ActingUser, Role, ensure_may_submit};
pub use reconcile::{ReconcileReport, reconcile_names, reconcile_tags};
