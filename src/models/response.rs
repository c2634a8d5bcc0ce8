// src/models/response.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The three-way pivotal survey answer: did Aayush come down or not.
///
/// Stored and transmitted as the literal strings `yes` / `no` /
/// `hehehe bhai`, but closed as an enum so no logic ever does string
/// comparisons on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Status {
    Yes,
    No,
    #[serde(rename = "hehehe bhai")]
    #[sqlx(rename = "hehehe bhai")]
    HeheheBhai,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Yes => "yes",
            Status::No => "no",
            Status::HeheheBhai => "hehehe bhai",
        }
    }

    /// Parses the wire/display form back into the enum.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "yes" => Some(Status::Yes),
            "no" => Some(Status::No),
            "hehehe bhai" => Some(Status::HeheheBhai),
            _ => None,
        }
    }
}

/// Represents the 'responses' table: one survey submission.
///
/// JSON field names keep the historical wire contract: survey fields are
/// snake_case, the submitter snapshot and timestamp are camelCase.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: i64,

    pub name: String,
    pub date: String,
    pub reason: String,
    pub aayush_status: Status,

    /// Present iff `aayush_status` is Yes. One of the fixed bucket labels.
    pub time_taken: Option<String>,

    /// Present iff `aayush_status` is No.
    pub reason_not_coming: Option<String>,

    // Raw wizard answers, stored for audit but never read back as data.
    pub q1: Option<String>,
    pub q2: Option<String>,
    pub q3: Option<String>,
    pub q4: Option<String>,
    pub q5: Option<String>,
    pub q6: Option<String>,

    /// Synthesized one-line summary of the submission.
    pub message: Option<String>,

    /// Denormalized snapshot of the authenticated principal at submit time.
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "userEmail")]
    pub user_email: String,

    /// Assigned at persistence time, immutable.
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for the submission endpoint.
///
/// All required fields are optional at the wire level so the handler can
/// reject missing ones with a 400 instead of a deserialization failure.
/// `flow::FormSession::finalize` produces exactly this shape.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub name: Option<String>,
    pub date: Option<String>,
    pub reason: Option<String>,
    pub aayush_status: Option<Status>,
    pub time_taken: Option<String>,
    pub reason_not_coming: Option<String>,
    pub q1: Option<String>,
    pub q2: Option<String>,
    pub q3: Option<String>,
    pub q4: Option<String>,
    pub q5: Option<String>,
    pub q6: Option<String>,
    pub message: Option<String>,
}

/// A submission that passed the required-field check, with the
/// status/optional-field invariant normalized.
#[derive(Debug, Clone)]
pub struct NewResponse {
    pub name: String,
    pub date: String,
    pub reason: String,
    pub status: Status,
    pub time_taken: Option<String>,
    pub reason_not_coming: Option<String>,
    pub q1: Option<String>,
    pub q2: Option<String>,
    pub q3: Option<String>,
    pub q4: Option<String>,
    pub q5: Option<String>,
    pub q6: Option<String>,
    pub message: Option<String>,
}

impl NewResponse {
    /// Validates the required fields and enforces the invariant that exactly
    /// the status-consistent optional field survives:
    /// Yes keeps `time_taken`, No keeps `reason_not_coming`, HeheheBhai keeps
    /// neither.
    pub fn from_request(req: SubmitRequest) -> Result<Self, &'static str> {
        let name = req.name.filter(|s| !s.trim().is_empty());
        let date = req.date.filter(|s| !s.trim().is_empty());
        let reason = req.reason.filter(|s| !s.trim().is_empty());

        let (Some(name), Some(date), Some(reason), Some(status)) =
            (name, date, reason, req.aayush_status)
        else {
            return Err("Required fields are missing");
        };

        let (time_taken, reason_not_coming) = match status {
            Status::Yes => (req.time_taken, None),
            Status::No => (None, req.reason_not_coming),
            Status::HeheheBhai => (None, None),
        };

        Ok(Self {
            name,
            date,
            reason,
            status,
            time_taken,
            reason_not_coming,
            q1: req.q1,
            q2: req.q2,
            q3: req.q3,
            q4: req.q4,
            q5: req.q5,
            q6: req.q6,
            message: req.message,
        })
    }
}
