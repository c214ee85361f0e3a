//! Database models for form submissions.

use crate::types::SubmissionId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Status value new submissions receive via the table default.
pub const STATUS_PENDING: &str = "Pending";

/// Database request for creating a new submission
#[derive(Debug, Clone, Default)]
pub struct SubmissionCreateDBRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goals: Option<String>,
    pub mission_type: Option<String>,
    pub launch_date: Option<DateTime<Utc>>,
    pub team_info: Option<String>,
    pub funding_goal: Option<Decimal>,
    pub duration_days: Option<i32>,
    pub budget_breakdown: Option<String>,
    pub rewards: Option<String>,
    /// URLs of successfully uploaded objects, in upload order.
    pub image_urls: Vec<String>,
    pub video_urls: Vec<String>,
    pub document_urls: Vec<String>,
}

/// Database response for a submission
#[derive(Debug, Clone)]
pub struct SubmissionDBResponse {
    pub id: SubmissionId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub goals: Option<String>,
    pub mission_type: Option<String>,
    pub launch_date: Option<DateTime<Utc>>,
    pub team_info: Option<String>,
    pub funding_goal: Option<Decimal>,
    pub duration_days: Option<i32>,
    pub budget_breakdown: Option<String>,
    pub rewards: Option<String>,
    pub image_urls: Vec<String>,
    pub video_urls: Vec<String>,
    pub document_urls: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
