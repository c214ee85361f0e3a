//! Admin review surface for pending submissions.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    api::models::submissions::SubmissionDetailsResponse,
    auth::current_user::AdminUser,
    db::handlers::{Repository, Submissions},
    errors::Error,
    types::SubmissionId,
    AppState,
};

/// List ids of submissions awaiting review
#[utoipa::path(
    get,
    path = "/api/approvals/pending-ids",
    tag = "approvals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending submission ids, newest first", body = Vec<i64>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not an admin"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn pending_ids(State(state): State<AppState>, AdminUser(user): AdminUser) -> Result<Json<Vec<SubmissionId>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let ids = Submissions::new(&mut conn).list_pending_ids().await?;

    tracing::info!("Retrieved {} pending submission ids for admin {}", ids.len(), user.id);
    Ok(Json(ids))
}

/// Fetch full details for one submission
///
/// Stored media URLs are exchanged for time-limited signed URLs before being
/// returned, so reviewers can view files in private buckets.
#[utoipa::path(
    get,
    path = "/api/approvals/{id}",
    tag = "approvals",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Submission id"),
    ),
    responses(
        (status = 200, description = "Submission details", body = SubmissionDetailsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No submission with this id"),
    )
)]
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn submission_details(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<SubmissionId>,
) -> Result<Json<SubmissionDetailsResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let submission = Submissions::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Submission".to_string(),
            id: id.to_string(),
        })?;

    let mut details = SubmissionDetailsResponse::from(submission);
    details.image_urls = sign_urls(&state, details.image_urls).await?;
    details.video_urls = sign_urls(&state, details.video_urls).await?;
    details.document_urls = sign_urls(&state, details.document_urls).await?;

    tracing::info!("Retrieved details for submission {} for admin {}", id, user.id);
    Ok(Json(details))
}

async fn sign_urls(state: &AppState, urls: Vec<String>) -> Result<Vec<String>, Error> {
    let mut signed = Vec::with_capacity(urls.len());
    for url in urls {
        signed.push(state.storage.presigned_url(&url).await?);
    }
    Ok(signed)
}
