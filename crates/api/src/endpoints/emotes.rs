//! Emote endpoints.

use std::path::{Path, PathBuf};

use axum::{
    Json, Router,
    extract::{Multipart, Query, State, multipart::Field},
    routing::{get, post},
};
use emotes_common::{AppError, AppResult, IdGenerator};
use emotes_core::{ActingUser, EmoteDetails, EmoteFiles, EmoteInput, LegacyEmote, SubmitMode};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::{
    extractors::{AdminUser, AuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Create emote router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/submit", post(submit_emote))
        .route("/edit", post(edit_emote))
        .route("/lookup", get(lookup_emote))
        .route("/legacy_export", get(legacy_export))
        .route("/bulk_upload", post(bulk_upload))
}

/// A submission read from a multipart form.
struct Submission {
    input: EmoteInput,
    files: EmoteFiles,
}

impl Submission {
    fn spooled(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.image.iter().chain(self.files.hover_image.iter())
    }
}

fn bad_request(e: impl ToString) -> AppError {
    AppError::BadRequest(e.to_string())
}

/// Stream a file field into the upload directory.
///
/// An empty part, as sent by browsers for an untouched file input, yields `None`.
async fn spool_field(
    mut field: Field<'_>,
    upload_dir: &Path,
    id_gen: &IdGenerator,
) -> AppResult<Option<PathBuf>> {
    tokio::fs::create_dir_all(upload_dir).await?;
    let path = upload_dir.join(id_gen.generate());

    let result = async {
        let mut file = tokio::fs::File::create(&path).await?;
        let mut written = 0usize;

        while let Some(chunk) = field.chunk().await.map_err(bad_request)? {
            written += chunk.len();
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok::<_, AppError>(written)
    }
    .await;

    match result {
        Ok(written) if written > 0 => Ok(Some(path)),
        Ok(_) => {
            tokio::fs::remove_file(&path).await?;
            Ok(None)
        }
        Err(e) => {
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                debug!(path = %path.display(), error = %cleanup, "Failed to remove partial upload");
            }
            Err(e)
        }
    }
}

async fn remove_spooled<'a>(paths: impl Iterator<Item = &'a PathBuf>) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "Removed unused upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => debug!(path = %path.display(), error = %e, "Failed to remove upload"),
        }
    }
}

/// Store a spooled file in `slot`. A later non-empty part replaces an earlier
/// one, whose file is removed; an empty part keeps what is there.
async fn replace_spooled(slot: &mut Option<PathBuf>, spooled: Option<PathBuf>) {
    if spooled.is_none() {
        return;
    }
    if let Some(previous) = std::mem::replace(slot, spooled) {
        remove_spooled(std::iter::once(&previous)).await;
    }
}

async fn read_text(field: Field<'_>) -> AppResult<String> {
    field.text().await.map_err(bad_request)
}

async fn read_submission(state: &AppState, multipart: &mut Multipart) -> AppResult<Submission> {
    let upload_dir = state.emote_service.config().upload_dir.clone();
    let mut submission = Submission {
        input: EmoteInput::default(),
        files: EmoteFiles::default(),
    };

    let result = async {
        while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
            let name = field.name().unwrap_or("").to_string();
            let input = &mut submission.input;

            match name.as_str() {
                "emoticon_image" => {
                    let spooled = spool_field(field, &upload_dir, &state.id_gen).await?;
                    replace_spooled(&mut submission.files.image, spooled).await;
                }
                "emoticon_hover_image" => {
                    let spooled = spool_field(field, &upload_dir, &state.id_gen).await?;
                    replace_spooled(&mut submission.files.hover_image, spooled).await;
                }
                "canonical_name" => input.canonical_name = read_text(field).await?,
                "names" => input.names.push(read_text(field).await?),
                "tags" => input.tags.push(read_text(field).await?),
                "css" => input.css.push(read_text(field).await?),
                "src" => input.src = Some(read_text(field).await?),
                "alt_text" => {
                    let text = read_text(field).await?;
                    if !text.trim().is_empty() {
                        input.alt_text = Some(text);
                    }
                }
                "remove_hover" => {
                    let text = read_text(field).await?;
                    input.remove_hover = matches!(text.trim(), "true" | "1" | "on");
                }
                _ => {}
            }
        }
        Ok::<_, AppError>(())
    }
    .await;

    if let Err(e) = result {
        remove_spooled(submission.spooled()).await;
        return Err(e);
    }

    Ok(submission)
}

async fn handle_submission(
    state: &AppState,
    user: &ActingUser,
    mut multipart: Multipart,
    mode: SubmitMode,
) -> AppResult<ApiResponse<EmoteDetails>> {
    let submission = read_submission(state, &mut multipart).await?;
    let spooled: Vec<PathBuf> = submission.spooled().cloned().collect();

    let result = state
        .emote_service
        .submit(submission.input, submission.files, mode, user)
        .await;

    // Placed files have been moved away; anything left was rejected.
    remove_spooled(spooled.iter()).await;

    let emote = result?;
    let details = state.emote_service.details(emote).await?;

    Ok(ApiResponse::ok(details))
}

/// Create an emote.
async fn submit_emote(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<EmoteDetails>> {
    handle_submission(&state, &user, multipart, SubmitMode::Create).await
}

/// Update an existing emote.
async fn edit_emote(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<EmoteDetails>> {
    handle_submission(&state, &user, multipart, SubmitMode::Update).await
}

/// Lookup query.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    /// Canonical name or numeric id.
    #[serde(default)]
    pub id: Option<String>,
}

/// Look up an emote by canonical name or numeric id.
async fn lookup_emote(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> AppResult<ApiResponse<EmoteDetails>> {
    let details = state
        .emote_service
        .lookup(query.id.as_deref().unwrap_or_default())
        .await?;
    Ok(ApiResponse::ok(details))
}

/// Export every emote in the legacy format.
async fn legacy_export(State(state): State<AppState>) -> AppResult<Json<Vec<LegacyEmote>>> {
    Ok(Json(state.emote_service.legacy_export().await?))
}

/// Bulk upload acknowledgement.
#[derive(Debug, Serialize)]
pub struct BulkUploadResponse {
    pub msg: String,
}

/// Import a legacy JSON export in the background.
async fn bulk_upload(
    AdminUser(user): AdminUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<BulkUploadResponse>> {
    let mut records: Option<Vec<LegacyEmote>> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        if field.name() == Some("json_emote_file") {
            let data = field.bytes().await.map_err(bad_request)?;
            records = Some(
                serde_json::from_slice(&data)
                    .map_err(|e| AppError::BadRequest(format!("Invalid emote file: {e}")))?,
            );
        }
    }

    let records =
        records.ok_or_else(|| AppError::BadRequest("No json_emote_file provided".to_string()))?;
    let count = records.len();
    info!(user_id = %user.id, records = count, "Bulk import requested");

    let service = state.emote_service.clone();
    tokio::spawn(async move {
        service.bulk_import(records).await;
    });

    Ok(Json(BulkUploadResponse {
        msg: format!("Processing {count} emotes in background"),
    }))
}
