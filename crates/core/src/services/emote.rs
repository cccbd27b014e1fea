//! Emote service: submission, lookup, export and bulk import.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use emotes_common::{
    AppError, EmoteConfig, FilePlacement, emote_image_key, emote_image_stem, stale_files_pattern,
};
use emotes_db::entities::{emote, tag};
use emotes_db::{EmotePatch, EmoteStore, HoverChange, ImageAttributes, NewEmote};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use validator::Validate;

use super::canonical_name;
use super::image_inspector::ImageInspector;
use super::normalize::{normalize_list, normalize_names, one_or_many, parse_css};
use super::policy::{ActingUser, ensure_may_submit};
use super::reconcile::{reconcile_names, reconcile_tags};
use crate::error::{EmoteError, EmoteResult};

/// Whether a submission creates a new emote or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    Update,
}

/// Fields of a submission form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EmoteInput {
    pub canonical_name: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub names: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub tags: Vec<String>,
    /// `prop: value` lines.
    #[serde(default, deserialize_with = "one_or_many")]
    pub css: Vec<String>,
    #[validate(url)]
    pub src: Option<String>,
    #[validate(length(max = 1024))]
    pub alt_text: Option<String>,
    /// Drop the hover image on update.
    #[serde(default)]
    pub remove_hover: bool,
}

/// Spooled images supplied with one submission.
#[derive(Debug, Clone, Default)]
pub struct EmoteFiles {
    pub image: Option<PathBuf>,
    pub hover_image: Option<PathBuf>,
}

/// An emote with its names and tags.
#[derive(Debug, Clone, Serialize)]
pub struct EmoteDetails {
    #[serde(flatten)]
    pub emote: emote::Model,
    pub image_url: String,
    pub names: Vec<String>,
    pub tags: Vec<String>,
}

/// One emote in the legacy bpm JSON format, used by export and bulk import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyEmote {
    pub canonical: String,
    #[serde(
        rename = "background-image",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub background_image: Option<String>,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
    #[serde(default)]
    pub img_animation: bool,
    #[serde(default)]
    pub single_image_extension: Option<String>,
    #[serde(default)]
    pub sr: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub names: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub tags: Vec<String>,
    #[serde(
        rename = "hover-background-position",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hover_background_position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_hover_image_extension: Option<String>,
    #[serde(rename = "hover-width", default, skip_serializing_if = "Option::is_none")]
    pub hover_width: Option<i32>,
    #[serde(rename = "hover-height", default, skip_serializing_if = "Option::is_none")]
    pub hover_height: Option<i32>,
}

/// Counts reported once a bulk import finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkImportReport {
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

enum CoreWrite {
    Create(NewEmote),
    Update(EmotePatch),
}

/// Emote submission and catalog service.
#[derive(Clone)]
pub struct EmoteService {
    store: Arc<dyn EmoteStore>,
    placement: Arc<dyn FilePlacement>,
    inspector: ImageInspector,
    config: EmoteConfig,
}

impl EmoteService {
    /// Create a new emote service.
    #[must_use]
    pub fn new(
        store: Arc<dyn EmoteStore>,
        placement: Arc<dyn FilePlacement>,
        config: EmoteConfig,
    ) -> Self {
        Self {
            store,
            placement,
            inspector: ImageInspector::from_config(&config),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EmoteConfig {
        &self.config
    }

    /// Public URL of an emote's image.
    #[must_use]
    pub fn image_url(&self, canonical_name: &str) -> String {
        self.placement.public_url(canonical_name)
    }

    /// Create or update an emote from a submission.
    ///
    /// Every check that can reject the submission runs before any file is
    /// moved. Files are placed before the database is touched. Tag and name
    /// writes are best-effort and never fail the submission.
    pub async fn submit(
        &self,
        mut input: EmoteInput,
        files: EmoteFiles,
        mode: SubmitMode,
        user: &ActingUser,
    ) -> EmoteResult<emote::Model> {
        let canonical_name = canonical_name::validate(&input.canonical_name)?;

        input.src = input
            .src
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        input.validate()?;

        let remove_hover = mode == SubmitMode::Update && input.remove_hover;
        if remove_hover && files.hover_image.is_some() {
            return Err(EmoteError::ConflictingHoverOperation);
        }
        if mode == SubmitMode::Create && files.image.is_none() {
            return Err(EmoteError::MissingBaseImage);
        }

        ensure_may_submit(
            user,
            &canonical_name,
            &self.config.default_whitelist_emote_subdirs,
        )?;

        let existing = self.store.find_by_canonical_name(&canonical_name).await?;
        match (mode, &existing) {
            (SubmitMode::Create, Some(_)) => {
                return Err(EmoteError::DuplicateName(canonical_name));
            }
            (SubmitMode::Update, None) => return Err(EmoteError::NotFound(canonical_name)),
            _ => {}
        }

        let (image, hover) = tokio::try_join!(
            self.inspect(files.image.as_deref()),
            self.inspect(files.hover_image.as_deref()),
        )?;

        let purge = mode == SubmitMode::Update;
        let (image_key, hover_key) = tokio::try_join!(
            self.place(&canonical_name, files.image.as_deref(), image.as_ref(), false, purge),
            self.place(&canonical_name, files.hover_image.as_deref(), hover.as_ref(), true, purge),
        )?;

        let names = normalize_names(&input.names, &canonical_name, mode == SubmitMode::Create);
        let tags = normalize_list(&input.tags);
        let css = (!input.css.is_empty()).then(|| Value::Object(parse_css(&input.css)));

        let write = match mode {
            SubmitMode::Create => CoreWrite::Create(NewEmote {
                canonical_name: canonical_name.clone(),
                image: image.ok_or(EmoteError::MissingBaseImage)?,
                hover,
                src: input.src,
                alt_text: input.alt_text,
                css,
                created_by: Some(user.id.clone()),
            }),
            SubmitMode::Update => CoreWrite::Update(EmotePatch {
                image,
                hover: match hover {
                    Some(hover) => Some(HoverChange::Set(hover)),
                    None if remove_hover => Some(HoverChange::Remove),
                    None => None,
                },
                src: input.src,
                alt_text: input.alt_text,
                css,
                updated_by: Some(user.id.clone()),
            }),
        };

        match self.persist(&canonical_name, write, &tags, &names).await {
            Ok(emote) => {
                info!(
                    canonical_name = %emote.canonical_name,
                    emote_id = emote.id,
                    mode = ?mode,
                    user_id = %user.id,
                    "Emote submitted"
                );
                Ok(emote)
            }
            Err(e) => {
                if mode == SubmitMode::Create {
                    self.discard(image_key.iter().chain(hover_key.iter())).await;
                }
                Err(e)
            }
        }
    }

    async fn inspect(&self, path: Option<&Path>) -> EmoteResult<Option<ImageAttributes>> {
        match path {
            Some(path) => Ok(Some(self.inspector.inspect(path).await?)),
            None => Ok(None),
        }
    }

    async fn place(
        &self,
        canonical_name: &str,
        source: Option<&Path>,
        attributes: Option<&ImageAttributes>,
        hover: bool,
        purge: bool,
    ) -> EmoteResult<Option<String>> {
        let (Some(source), Some(attributes)) = (source, attributes) else {
            return Ok(None);
        };

        if purge {
            let stem = emote_image_stem(canonical_name, hover);
            let removed = self
                .placement
                .purge_matching(&stale_files_pattern(&stem))
                .await?;
            debug!(stem = %stem, removed, "Removed stale images");
        }

        let key = emote_image_key(canonical_name, hover, &attributes.extension);
        self.placement.move_file(source, &key).await?;
        Ok(Some(key))
    }

    async fn discard<'a>(&self, keys: impl Iterator<Item = &'a String>) {
        for key in keys {
            if let Err(e) = self.placement.remove(key).await {
                warn!(key = %key, error = %e, "Failed to remove image of a rejected emote");
            }
        }
    }

    /// Write the core row, then reconcile tags and names against it.
    async fn persist(
        &self,
        canonical_name: &str,
        write: CoreWrite,
        tags: &[String],
        names: &[String],
    ) -> EmoteResult<emote::Model> {
        let created = matches!(write, CoreWrite::Create(_));
        let emote = match write {
            CoreWrite::Create(new_emote) => {
                self.store.create(new_emote).await.map_err(|e| match e {
                    AppError::Conflict(_) => EmoteError::DuplicateName(canonical_name.to_string()),
                    other => other.into(),
                })?
            }
            CoreWrite::Update(patch) => {
                self.store
                    .update(canonical_name, patch)
                    .await
                    .map_err(|e| match e {
                        AppError::NotFound(_) => EmoteError::NotFound(canonical_name.to_string()),
                        other => other.into(),
                    })?
            }
        };

        let (current_tags, current_names) = if created {
            (Some(Vec::new()), Some(Vec::new()))
        } else {
            (
                current_or_warn(emote.id, "tag", self.store.tags_of(emote.id).await),
                current_or_warn(emote.id, "name", self.store.names_of(emote.id).await),
            )
        };

        if let Some(current) = current_tags {
            reconcile_tags(self.store.as_ref(), emote.id, &current, tags)
                .await
                .log(emote.id);
        }
        if let Some(current) = current_names {
            reconcile_names(self.store.as_ref(), emote.id, &current, names)
                .await
                .log(emote.id);
        }

        Ok(emote)
    }

    /// Resolve an emote by canonical name or numeric id.
    ///
    /// A numeric id may be fractional and is floored.
    pub async fn lookup(&self, id: &str) -> EmoteResult<EmoteDetails> {
        let id = id.trim();
        if id.is_empty() {
            return Err(AppError::BadRequest(
                "You must supply a valid id. A canonical name or a numeric id.".to_string(),
            )
            .into());
        }

        let found = match numeric_id(id) {
            Some(numeric) => self.store.find_by_id(numeric).await?,
            None => self.store.find_by_canonical_name(id).await?,
        };
        let emote = found.ok_or_else(|| EmoteError::NotFound(id.to_string()))?;

        self.details(emote).await
    }

    /// Populate names, tags and image URL of a stored emote.
    pub async fn details(&self, emote: emote::Model) -> EmoteResult<EmoteDetails> {
        let names = self.store.names_of(emote.id).await?;
        let tags = self.store.tags_of(emote.id).await?;

        Ok(EmoteDetails {
            image_url: self.image_url(&emote.canonical_name),
            names: names.into_iter().map(|n| n.name).collect(),
            tags: tags.into_iter().map(|t| t.name).collect(),
            emote,
        })
    }

    /// All known tags.
    pub async fn list_tags(&self) -> EmoteResult<Vec<tag::Model>> {
        Ok(self.store.list_tags().await?)
    }

    /// Every emote in the legacy bpm format.
    pub async fn legacy_export(&self) -> EmoteResult<Vec<LegacyEmote>> {
        let prefix = &self.config.legacy_export_prefix;
        let emotes = self.store.list_all().await?;
        let mut exported = Vec::with_capacity(emotes.len());

        for emote in emotes {
            let names = self.store.names_of(emote.id).await?;
            let tags = self.store.tags_of(emote.id).await?;
            let has_hover = emote.has_hover;

            exported.push(LegacyEmote {
                background_image: Some(format!("{prefix}{}", emote.canonical_name)),
                width: emote.width,
                height: emote.height,
                img_animation: emote.img_animation,
                single_image_extension: Some(emote.single_image_extension),
                sr: emote.src,
                names: names.into_iter().map(|n| n.name).collect(),
                tags: tags.into_iter().map(|t| t.name).collect(),
                hover_background_position: has_hover
                    .then(|| format!("{prefix}{}_hover", emote.canonical_name)),
                single_hover_image_extension: emote
                    .single_hover_image_extension
                    .filter(|_| has_hover),
                hover_width: emote.hover_width.filter(|_| has_hover),
                hover_height: emote.hover_height.filter(|_| has_hover),
                canonical: emote.canonical_name,
            });
        }

        Ok(exported)
    }

    /// Import legacy records one at a time.
    ///
    /// No files are moved; only the catalog entries are written. A failing
    /// record is logged and counted, and the import carries on.
    pub async fn bulk_import(&self, records: Vec<LegacyEmote>) -> BulkImportReport {
        let mut report = BulkImportReport::default();
        info!(records = records.len(), "Bulk import started");

        for record in records {
            report.processed += 1;
            let canonical = record.canonical.clone();

            match self.import_one(record).await {
                Ok(SubmitMode::Create) => report.created += 1,
                Ok(SubmitMode::Update) => report.updated += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(canonical = %canonical, error = %e, "Bulk import: record failed");
                }
            }
        }

        info!(
            processed = report.processed,
            created = report.created,
            updated = report.updated,
            failed = report.failed,
            "Bulk import finished"
        );
        report
    }

    async fn import_one(&self, record: LegacyEmote) -> EmoteResult<SubmitMode> {
        let canonical_name = canonical_name::validate(&record.canonical)?;
        let existing = self.store.find_by_canonical_name(&canonical_name).await?;
        let mode = if existing.is_some() {
            SubmitMode::Update
        } else {
            SubmitMode::Create
        };

        let image = record
            .single_image_extension
            .map(|extension| ImageAttributes {
                extension,
                width: record.width,
                height: record.height,
                animated: record.img_animation,
            });
        let hover = record
            .single_hover_image_extension
            .map(|extension| ImageAttributes {
                extension,
                width: record.hover_width,
                height: record.hover_height,
                animated: false,
            });
        let src = record.sr.filter(|s| !s.trim().is_empty());

        let names = normalize_names(&record.names, &canonical_name, mode == SubmitMode::Create);
        let tags = normalize_list(&record.tags);

        let write = match mode {
            SubmitMode::Create => CoreWrite::Create(NewEmote {
                canonical_name: canonical_name.clone(),
                image: image.ok_or(EmoteError::MissingBaseImage)?,
                hover,
                src,
                alt_text: None,
                css: None,
                created_by: None,
            }),
            SubmitMode::Update => CoreWrite::Update(EmotePatch {
                image,
                hover: hover.map(HoverChange::Set),
                src,
                ..Default::default()
            }),
        };

        let emote = self.persist(&canonical_name, write, &tags, &names).await?;
        debug!(
            emote_id = emote.id,
            canonical_name = %canonical_name,
            mode = ?mode,
            "Bulk import: stored emote"
        );
        Ok(mode)
    }
}

fn current_or_warn<T>(
    emote_id: i32,
    association: &str,
    result: Result<Vec<T>, AppError>,
) -> Option<Vec<T>> {
    result
        .inspect_err(|e| {
            warn!(
                emote_id,
                association,
                error = %e,
                "Could not load current associations, skipping reconciliation"
            );
        })
        .ok()
}

#[allow(clippy::cast_possible_truncation)]
fn numeric_id(id: &str) -> Option<i32> {
    let value = id.parse::<f64>().ok().filter(|v| v.is_finite())?.floor();
    (f64::from(i32::MIN)..=f64::from(i32::MAX))
        .contains(&value)
        .then_some(value as i32)
}
