// src/handlers/leaderboard.rs

use axum::{Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{error::AppError, models::response::ResponseRecord, stats};

/// Returns the overall totals and the six ranked top-10 views.
///
/// Each request takes its own snapshot of the full response set and
/// recomputes the boards from scratch; concurrent callers never share
/// mutable state.
pub async fn get_leaderboard(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let responses = sqlx::query_as::<_, ResponseRecord>(
        r#"
        SELECT
            id, name, date, reason, aayush_status, time_taken, reason_not_coming,
            q1, q2, q3, q4, q5, q6, message,
            user_id, user_name, user_email, created_at
        FROM responses
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch leaderboard data: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let (overall, leaderboards) = stats::compute_leaderboards(&responses);

    Ok(Json(serde_json::json!({
        "success": true,
        "overall": overall,
        "leaderboards": leaderboards,
    })))
}
