//! API request/response models for mission submissions.

use crate::{db::models::submissions::SubmissionDBResponse, types::SubmissionId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of a submission intake request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub message: String,
    pub submission_id: SubmissionId,
    /// False when one or more files could not be stored. The proposal row is
    /// still created with the URLs that did succeed.
    pub all_files_uploaded: bool,
}

/// Full submission details for the review surface.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetailsResponse {
    pub id: SubmissionId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub goals: Option<String>,
    #[serde(rename = "type")]
    pub mission_type: Option<String>,
    pub launch_date: Option<DateTime<Utc>>,
    pub team_info: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub funding_goal: Option<Decimal>,
    pub duration: Option<i32>,
    pub budget_breakdown: Option<String>,
    pub rewards: Option<String>,
    pub image_urls: Vec<String>,
    pub video_urls: Vec<String>,
    pub document_urls: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<SubmissionDBResponse> for SubmissionDetailsResponse {
    fn from(db: SubmissionDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            description: db.description,
            goals: db.goals,
            mission_type: db.mission_type,
            launch_date: db.launch_date,
            team_info: db.team_info,
            funding_goal: db.funding_goal,
            duration: db.duration_days,
            budget_breakdown: db.budget_breakdown,
            rewards: db.rewards,
            image_urls: db.image_urls,
            video_urls: db.video_urls,
            document_urls: db.document_urls,
            status: db.status,
            created_at: db.created_at,
        }
    }
}
