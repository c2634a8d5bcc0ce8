// src/notify.rs

//! The notification collaborator: confirmation emails after a submission.
//!
//! Delivery is fire-and-forget. The submit handler spawns the send on a
//! background task and only logs failures; a broken mail pipeline must
//! never turn a successful submission into an error for the caller.

use async_trait::async_trait;
use serde_json::json;

use crate::config::Config;
use crate::error::AppError;
use crate::models::response::{NewResponse, Status};

/// Anything that can deliver an HTML email.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AppError>;
}

/// Delivers via an HTTP mail API (JSON body, bearer auth).
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "html": html_body,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::InternalServerError(format!(
                "Mail API returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Used when mail is unconfigured (and in tests): logs instead of sending.
pub struct NoopMailer;

#[async_trait]
impl Notifier for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<(), AppError> {
        tracing::info!("Mail disabled, skipping email to {}: {}", to, subject);
        Ok(())
    }
}

/// Builds the configured mailer, falling back to the no-op one.
pub fn from_config(config: &Config) -> Box<dyn Notifier> {
    match (
        config.mail_api_url.clone(),
        config.mail_api_key.clone(),
        config.mail_from.clone(),
    ) {
        (Some(url), Some(key), Some(from)) => Box::new(HttpMailer::new(url, key, from)),
        _ => {
            tracing::warn!("MAIL_API_URL/MAIL_API_KEY/MAIL_FROM not set, emails disabled");
            Box::new(NoopMailer)
        }
    }
}

/// Status-specific confirmation email: subject + HTML body.
pub fn submission_email(user_name: &str, base_url: &str, response: &NewResponse) -> (String, String) {
    match response.status {
        Status::Yes => {
            let subject = "🎉 OMG! Aayush Actually Came Down!".to_string();
            let body = format!(
                r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <h1 style="color: #4CAF50;">🎊 BREAKING NEWS! 🎊</h1>
    <h2>Aayush Actually Showed Up!</h2>
    <p>Hey <strong>{user_name}</strong>! 👋</p>
    <p>Your complaint has been officially logged in the <strong>Aayush Pareshaani Database™</strong></p>
    <div style="background: #f0f8ff; padding: 20px; border-radius: 10px;">
        <h3 style="color: #667eea;">📋 The Tea (Your Submission):</h3>
        <p><strong>📅 Date:</strong> {date}</p>
        <p><strong>🤔 Why you bothered him:</strong> {reason}</p>
        <p><strong>⏱️ How long he took:</strong> {time}</p>
    </div>
    <p>🏆 <strong>Achievement Unlocked:</strong> You successfully summoned Aayush!</p>
    <p><a href="{base_url}/dashboard.html">👀 Stalk the Dashboard</a></p>
    <p style="color: #999; font-size: 12px;">
        This is an automated roast from Aayush Tracker 🤖<br>
        If Aayush is reading this: Bhai tu aagaya? Shocking! 😱
    </p>
</div>"#,
                user_name = user_name,
                date = response.date,
                reason = response.reason,
                time = response.time_taken.as_deref().unwrap_or("unknown"),
                base_url = base_url,
            );
            (subject, body)
        }
        Status::No => {
            let subject = "😤 Aayush Ne Phir Se Dhoka Diya!".to_string();
            let body = format!(
                r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <h1 style="color: #f44336;">💔 SAD NEWS ALERT! 💔</h1>
    <h2>Aayush Didn't Show Up (Surprise Surprise!)</h2>
    <p>Yo <strong>{user_name}</strong>! 😔</p>
    <p>We regret to inform you that your call went unanswered... again. 🙄</p>
    <div style="background: #fff3cd; padding: 20px; border-radius: 10px; border-left: 4px solid #ff9800;">
        <h3 style="color: #f57c00;">📋 Incident Report:</h3>
        <p><strong>📅 Date of Betrayal:</strong> {date}</p>
        <p><strong>🤔 What you wanted:</strong> {reason}</p>
        <p><strong>😤 His Excuse:</strong> {excuse}</p>
    </div>
    <p>📊 <strong>Stats Update:</strong> Aayush's "Not Coming" streak continues!</p>
    <p><a href="{base_url}/dashboard.html">😢 See the Hall of Shame</a></p>
    <p style="color: #999; font-size: 12px;">
        Automated disappointment email from Aayush Tracker 🤖<br>
        Better luck next time! (Who are we kidding? 😂)
    </p>
</div>"#,
                user_name = user_name,
                date = response.date,
                reason = response.reason,
                excuse = response.reason_not_coming.as_deref().unwrap_or("none given"),
                base_url = base_url,
            );
            (subject, body)
        }
        Status::HeheheBhai => {
            let subject = "🤪 HEHEHE BHAI! You Got Aayushed!".to_string();
            let body = format!(
                r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; text-align: center;">
    <h1 style="color: #ff6b6b;">HEHEHE BHAI!</h1>
    <h2 style="color: #4ecdc4;">YOU JUST GOT AAYUSHED! 😂</h2>
    <p style="font-size: 20px;">Wassup <strong>{user_name}</strong>! 🤪</p>
    <div style="background: #667eea; color: white; padding: 30px; border-radius: 15px;">
        <h2>🎯 THE LEGENDARY "HEHEHE BHAI" MOMENT!</h2>
        <p><strong>📅 Date:</strong> {date}<br><strong>🎭 Reason:</strong> {reason}</p>
        <p style="font-size: 24px;">Peak comedy achieved! 😎✨</p>
    </div>
    <p><a href="{base_url}/dashboard.html">🚀 Check the Chaos</a></p>
    <p style="color: #999; font-size: 12px;">
        Auto-generated masti from Aayush Tracker 🤖<br>
        Keep the hehehe bhai energy alive! 😂🔥
    </p>
</div>"#,
                user_name = user_name,
                date = response.date,
                reason = response.reason,
                base_url = base_url,
            );
            (subject, body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::response::SubmitRequest;

    fn new_response(status: &str, extra: fn(&mut SubmitRequest)) -> NewResponse {
        let mut req = SubmitRequest {
            name: Some("Aayush".to_string()),
            date: Some("2024-03-15".to_string()),
            reason: Some("chai".to_string()),
            aayush_status: Status::parse(status),
            ..SubmitRequest::default()
        };
        extra(&mut req);
        NewResponse::from_request(req).unwrap()
    }

    #[test]
    fn yes_email_carries_the_time_bucket() {
        let response = new_response("yes", |r| {
            r.time_taken = Some("5-15 mins".to_string());
        });
        let (subject, body) = submission_email("Rohan", "http://localhost:3000", &response);
        assert!(subject.contains("Actually Came Down"));
        assert!(body.contains("5-15 mins"));
        assert!(body.contains("Rohan"));
        assert!(body.contains("http://localhost:3000/dashboard.html"));
    }

    #[test]
    fn no_email_carries_the_excuse() {
        let response = new_response("no", |r| {
            r.reason_not_coming = Some("was sleeping".to_string());
        });
        let (subject, body) = submission_email("Rohan", "http://localhost:3000", &response);
        assert!(subject.contains("Dhoka"));
        assert!(body.contains("was sleeping"));
    }

    #[test]
    fn hehehe_email_has_neither_branch_field() {
        let response = new_response("hehehe bhai", |_| {});
        let (subject, body) = submission_email("Rohan", "http://localhost:3000", &response);
        assert!(subject.contains("HEHEHE BHAI"));
        assert!(body.contains("Peak comedy"));
    }
}
