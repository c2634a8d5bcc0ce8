// src/handlers/profile.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    handlers::auth::fetch_user,
    models::response::{ResponseRecord, Status},
    stats,
    utils::jwt::Claims,
};

/// One row of the profile page's recent-activity list.
#[derive(Debug, Serialize)]
pub struct RecentSubmission {
    pub date: String,
    pub reason: String,
    pub status: Status,
    pub time_taken: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Returns the current user's profile statistics.
///
/// Takes a fresh snapshot of the user's responses and recomputes the whole
/// stats block per request; nothing is cached or maintained incrementally.
pub async fn user_stats(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = fetch_user(&pool, claims.user_id()).await?;

    let responses = sqlx::query_as::<_, ResponseRecord>(
        r#"
        SELECT
            id, name, date, reason, aayush_status, time_taken, reason_not_coming,
            q1, q2, q3, q4, q5, q6, message,
            user_id, user_name, user_email, created_at
        FROM responses
        WHERE user_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch user responses: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let user_stats = stats::compute_user_stats(&responses);

    let recent_submissions: Vec<RecentSubmission> = responses
        .iter()
        .take(5)
        .map(|r| RecentSubmission {
            date: r.date.clone(),
            reason: r.reason.clone(),
            status: r.aayush_status,
            time_taken: r.time_taken.clone(),
            created_at: r.created_at,
        })
        .collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "user": {
            "name": user.name,
            "email": user.email,
            "picture": user.picture,
            "memberSince": user.created_at,
        },
        "stats": user_stats,
        "recentSubmissions": recent_submissions,
    })))
}
