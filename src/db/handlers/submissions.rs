//! Database repository for mission proposal submissions.

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::submissions::{SubmissionCreateDBRequest, SubmissionDBResponse, STATUS_PENDING},
    },
    types::SubmissionId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct Submission {
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

impl From<Submission> for SubmissionDBResponse {
    fn from(s: Submission) -> Self {
        Self {
            id: s.id,
            title: s.title,
            description: s.description,
            goals: s.goals,
            mission_type: s.mission_type,
            launch_date: s.launch_date,
            team_info: s.team_info,
            funding_goal: s.funding_goal,
            duration_days: s.duration_days,
            budget_breakdown: s.budget_breakdown,
            rewards: s.rewards,
            image_urls: s.image_urls,
            video_urls: s.video_urls,
            document_urls: s.document_urls,
            status: s.status,
            created_at: s.created_at,
        }
    }
}

pub struct Submissions<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Submissions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Ids of submissions still awaiting review, newest first.
    #[instrument(skip(self), err)]
    pub async fn list_pending_ids(&mut self) -> Result<Vec<SubmissionId>> {
        let ids = sqlx::query_scalar::<_, SubmissionId>(
            "SELECT id FROM form_submissions WHERE status = $1 ORDER BY id DESC",
        )
        .bind(STATUS_PENDING)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(ids)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Submissions<'c> {
    type CreateRequest = SubmissionCreateDBRequest;
    type Response = SubmissionDBResponse;
    type Id = SubmissionId;

    #[instrument(skip_all, err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO form_submissions (
                title, description, goals, mission_type, launch_date, team_info,
                funding_goal, duration_days, budget_breakdown, rewards,
                image_urls, video_urls, document_urls, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.goals)
        .bind(&request.mission_type)
        .bind(request.launch_date)
        .bind(&request.team_info)
        .bind(request.funding_goal)
        .bind(request.duration_days)
        .bind(&request.budget_breakdown)
        .bind(&request.rewards)
        .bind(&request.image_urls)
        .bind(&request.video_urls)
        .bind(&request.document_urls)
        .bind(STATUS_PENDING)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(SubmissionDBResponse::from(submission))
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let submission = sqlx::query_as::<_, Submission>("SELECT * FROM form_submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(submission.map(SubmissionDBResponse::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    fn titled(title: &str) -> SubmissionCreateDBRequest {
        SubmissionCreateDBRequest {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[sqlx::test]
    async fn create_without_files_persists_empty_url_arrays(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let created = Submissions::new(&mut conn).create(&titled("Lunar relay")).await.unwrap();

        assert_eq!(created.status, STATUS_PENDING);
        assert!(created.image_urls.is_empty());
        assert!(created.video_urls.is_empty());
        assert!(created.document_urls.is_empty());

        let fetched = Submissions::new(&mut conn).get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title.as_deref(), Some("Lunar relay"));
        assert!(fetched.image_urls.is_empty());
    }

    #[sqlx::test]
    async fn url_arrays_round_trip_in_order(pool: PgPool) {
        let request = SubmissionCreateDBRequest {
            image_urls: vec!["https://cdn.test/images/a.png".into(), "https://cdn.test/images/b.png".into()],
            document_urls: vec!["https://cdn.test/documents/plan.pdf".into()],
            ..titled("Orbital greenhouse")
        };

        let mut conn = pool.acquire().await.unwrap();
        let created = Submissions::new(&mut conn).create(&request).await.unwrap();

        let fetched = Submissions::new(&mut conn).get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.image_urls, request.image_urls);
        assert_eq!(fetched.document_urls, request.document_urls);
        assert!(fetched.video_urls.is_empty());
    }

    #[sqlx::test]
    async fn pending_ids_filters_status_and_sorts_newest_first(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();

        let first = Submissions::new(&mut conn).create(&titled("first")).await.unwrap();
        let second = Submissions::new(&mut conn).create(&titled("second")).await.unwrap();
        let third = Submissions::new(&mut conn).create(&titled("third")).await.unwrap();

        sqlx::query("UPDATE form_submissions SET status = 'Approved' WHERE id = $1")
            .bind(second.id)
            .execute(&mut *conn)
            .await
            .unwrap();

        let ids = Submissions::new(&mut conn).list_pending_ids().await.unwrap();
        assert_eq!(ids, vec![third.id, first.id]);
    }

    #[sqlx::test]
    async fn get_by_id_returns_none_for_missing_rows(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        assert!(Submissions::new(&mut conn).get_by_id(424_242).await.unwrap().is_none());
    }
}
