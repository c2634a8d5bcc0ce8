// src/handlers/response.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    handlers::auth::fetch_user,
    models::response::{NewResponse, ResponseRecord, SubmitRequest},
    notify,
    state::AppState,
    utils::{html::clean_text, jwt::Claims},
};

/// Saves one survey submission.
///
/// * Rejects with 400 when any of name/date/reason/status is absent.
/// * Normalizes the branch invariant (only the status-consistent optional
///   field is stored) and sanitizes free text.
/// * Assigns `created_at` server-side and returns the stored record.
/// * Fires the confirmation email on a background task; a mail failure is
///   logged and never fails the submission.
pub async fn submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut new_response =
        NewResponse::from_request(payload).map_err(|msg| AppError::BadRequest(msg.to_string()))?;

    // Free-text fields end up on the dashboard and in emails.
    new_response.name = clean_text(&new_response.name);
    new_response.reason = clean_text(&new_response.reason);
    new_response.reason_not_coming = new_response.reason_not_coming.map(|s| clean_text(&s));
    new_response.message = new_response.message.map(|s| clean_text(&s));

    let user = fetch_user(&state.pool, claims.user_id()).await?;

    let record = sqlx::query_as::<_, ResponseRecord>(
        r#"
        INSERT INTO responses (
            name, date, reason, aayush_status, time_taken, reason_not_coming,
            q1, q2, q3, q4, q5, q6, message,
            user_id, user_name, user_email, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING
            id, name, date, reason, aayush_status, time_taken, reason_not_coming,
            q1, q2, q3, q4, q5, q6, message,
            user_id, user_name, user_email, created_at
        "#,
    )
    .bind(&new_response.name)
    .bind(&new_response.date)
    .bind(&new_response.reason)
    .bind(new_response.status)
    .bind(&new_response.time_taken)
    .bind(&new_response.reason_not_coming)
    .bind(&new_response.q1)
    .bind(&new_response.q2)
    .bind(&new_response.q3)
    .bind(&new_response.q4)
    .bind(&new_response.q5)
    .bind(&new_response.q6)
    .bind(&new_response.message)
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to save response: {:?}", e);
        AppError::InternalServerError("Failed to save response".to_string())
    })?;

    tracing::info!("Response {} saved for user {}", record.id, user.id);

    // Fire-and-forget confirmation email.
    let notifier = state.notifier.clone();
    let base_url = state.config.base_url.clone();
    let (to, user_name) = (user.email.clone(), user.name.clone());
    tokio::spawn(async move {
        let (subject, body) = notify::submission_email(&user_name, &base_url, &new_response);
        if let Err(e) = notifier.send(&to, &subject, &body).await {
            tracing::error!("Failed to send confirmation email to {}: {}", to, e);
        }
    });

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Response submitted successfully",
        "data": record,
    })))
}

/// Returns every response, newest first.
pub async fn list_responses(
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
        tracing::error!("Failed to list responses: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(responses))
}
