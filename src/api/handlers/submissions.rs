//! Mission proposal intake.
//!
//! Accepts a multipart form mixing text fields and media files. Files are
//! uploaded to object storage one at a time; a failed upload is logged and
//! skipped rather than failing the whole submission, and the proposal row is
//! inserted once with exactly the URLs that succeeded.

use axum::{
    Json,
    extract::{Multipart, State},
};
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::{
    api::models::{submissions::SubmissionResponse, users::CurrentUser},
    db::{handlers::{Repository, Submissions}, models::submissions::SubmissionCreateDBRequest},
    errors::Error,
    storage::{self, ObjectStorage},
    AppState,
};

/// Storage folder for a repeatable file field, if the field is one of ours.
fn folder_for_field(name: &str) -> Option<&'static str> {
    match name {
        "images" => Some("images"),
        "video" => Some("videos"),
        "documents" => Some("documents"),
        _ => None,
    }
}

/// Accepts RFC 3339 timestamps as well as plain `YYYY-MM-DD` dates.
fn parse_launch_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::from_str(value)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Collected upload results for one submission.
#[derive(Debug, Default)]
struct UploadedUrls {
    images: Vec<String>,
    videos: Vec<String>,
    documents: Vec<String>,
    any_failed: bool,
}

impl UploadedUrls {
    fn list_for(&mut self, folder: &str) -> &mut Vec<String> {
        match folder {
            "images" => &mut self.images,
            "videos" => &mut self.videos,
            _ => &mut self.documents,
        }
    }
}

/// Upload one file, recording its URL on success. Empty or unnamed parts are
/// skipped; an upload failure is logged and flagged but does not propagate.
async fn store_file(
    storage: &dyn ObjectStorage,
    uploaded: &mut UploadedUrls,
    folder: &str,
    file_name: &str,
    content_type: Option<&str>,
    data: Bytes,
) {
    if file_name.is_empty() || data.is_empty() {
        tracing::warn!("Skipping empty or unnamed file in folder: {folder}");
        return;
    }

    let key = storage::object_key(folder, file_name);
    match storage.put_object(&key, content_type, data).await {
        Ok(url) => {
            tracing::info!("Stored {file_name} as {url}");
            uploaded.list_for(folder).push(url);
        }
        Err(e) => {
            tracing::error!("Failed to store file '{file_name}': {e}");
            uploaded.any_failed = true;
        }
    }
}

/// Submit a mission proposal
///
/// Multipart form. Text fields: `title`, `description`, `goals`, `type`,
/// `launchDate`, `teamInfo`, `fundingGoal`, `duration`, `budgetBreakdown`,
/// `rewards`. Repeatable file fields: `images`, `video`, `documents`.
#[utoipa::path(
    post,
    path = "/api/submissions",
    tag = "submissions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Submission stored (check allFilesUploaded)", body = SubmissionResponse),
        (status = 400, description = "Malformed form data"),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn submit(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<SubmissionResponse>, Error> {
    let mut request = SubmissionCreateDBRequest::default();
    let mut uploaded = UploadedUrls::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Malformed multipart request: {e}"),
    })? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(folder) = folder_for_field(&name) {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(|e| Error::BadRequest {
                message: format!("Failed to read file field '{name}': {e}"),
            })?;

            store_file(state.storage.as_ref(), &mut uploaded, folder, &file_name, content_type.as_deref(), data).await;
            continue;
        }

        let value = field.text().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to read text field '{name}': {e}"),
        })?;
        if value.is_empty() {
            continue;
        }

        match name.as_str() {
            "title" => request.title = Some(value),
            "description" => request.description = Some(value),
            "goals" => request.goals = Some(value),
            "type" => request.mission_type = Some(value),
            "teamInfo" => request.team_info = Some(value),
            "budgetBreakdown" => request.budget_breakdown = Some(value),
            "rewards" => request.rewards = Some(value),
            "launchDate" => {
                request.launch_date = Some(parse_launch_date(&value).ok_or_else(|| Error::BadRequest {
                    message: "Invalid launchDate, expected an RFC 3339 timestamp or YYYY-MM-DD".to_string(),
                })?);
            }
            "fundingGoal" => {
                request.funding_goal = Some(Decimal::from_str(&value).map_err(|_| Error::BadRequest {
                    message: "Invalid fundingGoal, expected a decimal number".to_string(),
                })?);
            }
            "duration" => {
                request.duration_days = Some(value.parse::<i32>().map_err(|_| Error::BadRequest {
                    message: "Invalid duration, expected a whole number of days".to_string(),
                })?);
            }
            other => {
                tracing::debug!("Ignoring unknown form field: {other}");
            }
        }
    }

    request.image_urls = uploaded.images;
    request.video_urls = uploaded.videos;
    request.document_urls = uploaded.documents;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let submission = Submissions::new(&mut conn)
        .create(&request)
        .await
        .inspect_err(|_| {
            let orphaned = request.image_urls.len() + request.video_urls.len() + request.document_urls.len();
            if orphaned > 0 {
                // Uploads are not rolled back; leave a trail for manual cleanup
                tracing::error!(
                    "Submission insert failed, {orphaned} stored objects orphaned: {:?} {:?} {:?}",
                    request.image_urls,
                    request.video_urls,
                    request.document_urls
                );
            }
        })?;

    let title = submission.title.as_deref().unwrap_or("N/A");
    let message = if uploaded.any_failed {
        format!("Mission '{title}' data submitted successfully! WARNING: Some files could not be stored.")
    } else {
        format!("Mission '{title}' and all associated files submitted successfully!")
    };
    tracing::info!("Stored submission {} for user {}", submission.id, user.id);

    Ok(Json(SubmissionResponse {
        message,
        submission_id: submission.id,
        all_files_uploaded: !uploaded.any_failed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    #[test]
    fn file_fields_map_to_folders() {
        assert_eq!(folder_for_field("images"), Some("images"));
        assert_eq!(folder_for_field("video"), Some("videos"));
        assert_eq!(folder_for_field("documents"), Some("documents"));
        assert_eq!(folder_for_field("title"), None);
        assert_eq!(folder_for_field("attachments"), None);
    }

    #[test]
    fn launch_date_accepts_both_formats() {
        let rfc = parse_launch_date("2030-06-15T12:30:00Z").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2030-06-15T12:30:00+00:00");

        let plain = parse_launch_date("2030-06-15").unwrap();
        assert_eq!(plain.to_rfc3339(), "2030-06-15T00:00:00+00:00");

        assert!(parse_launch_date("next tuesday").is_none());
    }

    #[tokio::test]
    async fn failed_uploads_are_flagged_and_skipped() {
        // Fails everything routed to the videos folder
        let storage = MemoryStorage::failing_on("videos");
        let mut uploaded = UploadedUrls::default();

        store_file(&storage, &mut uploaded, "images", "a.png", Some("image/png"), Bytes::from_static(b"a")).await;
        store_file(&storage, &mut uploaded, "images", "b.png", Some("image/png"), Bytes::from_static(b"b")).await;
        store_file(&storage, &mut uploaded, "videos", "c.mp4", Some("video/mp4"), Bytes::from_static(b"c")).await;
        store_file(&storage, &mut uploaded, "documents", "d.pdf", None, Bytes::from_static(b"d")).await;

        // 4 files, 1 failure: exactly 3 URLs survive, in upload order
        assert!(uploaded.any_failed);
        assert_eq!(uploaded.images.len(), 2);
        assert!(uploaded.videos.is_empty());
        assert_eq!(uploaded.documents.len(), 1);
        assert_eq!(storage.stored_keys().len(), 3);
    }

    #[tokio::test]
    async fn empty_parts_are_skipped_without_flagging_failure() {
        let storage = MemoryStorage::new();
        let mut uploaded = UploadedUrls::default();

        store_file(&storage, &mut uploaded, "images", "", Some("image/png"), Bytes::from_static(b"data")).await;
        store_file(&storage, &mut uploaded, "images", "empty.png", None, Bytes::new()).await;

        assert!(!uploaded.any_failed);
        assert!(uploaded.images.is_empty());
        assert!(storage.stored_keys().is_empty());
    }

    #[tokio::test]
    async fn uploads_preserve_order_within_a_field() {
        let storage = MemoryStorage::new();
        let mut uploaded = UploadedUrls::default();

        for name in ["first.png", "second.png", "third.png"] {
            store_file(&storage, &mut uploaded, "images", name, Some("image/png"), Bytes::from_static(b"x")).await;
        }

        assert_eq!(uploaded.images.len(), 3);
        // URLs embed the generated keys, which must line up with storage order
        let keys = storage.stored_keys();
        for (url, key) in uploaded.images.iter().zip(keys.iter()) {
            assert!(url.ends_with(key.as_str()));
        }
    }
}
