// src/flow.rs

//! The multi-step survey wizard as a pure state machine.
//!
//! One `FormSession` is owned by a single interactive session: created on
//! form load, driven by `set_input` / `advance` / `retreat`, consumed by
//! `finalize`, and discarded afterwards. Nothing here touches I/O or
//! persistence.

use std::collections::BTreeMap;
use std::fmt;

use crate::models::response::{Status, SubmitRequest};

/// The question currently shown to the user.
///
/// Internal steps 5 (time taken) and 6 (reason for not coming) are distinct
/// states, but both display as "step 5"; see `display_step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Q1: who called Aayush.
    Name,
    /// Q2: when.
    EventDate,
    /// Q3: why he was called.
    Reason,
    /// Q4: the pivotal answer, did he come.
    Status,
    /// Q5 (yes branch): how long he took, from a fixed set of buckets.
    TimeTaken,
    /// Q6 (no branch): his excuse, free text.
    ReasonNotComing,
}

impl Step {
    /// The question id under which the answer is stored and submitted.
    pub fn key(&self) -> &'static str {
        match self {
            Step::Name => "q1",
            Step::EventDate => "q2",
            Step::Reason => "q3",
            Step::Status => "q4",
            Step::TimeTaken => "q5",
            Step::ReasonNotComing => "q6",
        }
    }

    /// Whether the question is answered by picking an option rather than
    /// typing free text.
    fn is_choice(&self) -> bool {
        matches!(self, Step::Status | Step::TimeTaken)
    }
}

/// Which conditional path the wizard has committed to after Q4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Branch {
    #[default]
    Unset,
    Yes,
    No,
    HeheheBhai,
}

impl From<Status> for Branch {
    fn from(status: Status) -> Self {
        match status {
            Status::Yes => Branch::Yes,
            Status::No => Branch::No,
            Status::HeheheBhai => Branch::HeheheBhai,
        }
    }
}

/// Validation failures reported by the wizard. The session state is never
/// changed when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowError {
    /// A free-text question was left blank.
    MissingAnswer,
    /// A choice question has no (valid) selection.
    MissingSelection,
    /// `finalize` was called before the wizard reached a terminal state.
    NotReady,
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FlowError::MissingAnswer => "Please answer this question before proceeding",
            FlowError::MissingSelection => "Please select an option before proceeding",
            FlowError::NotReady => "The form is not ready to submit yet",
        };
        write!(f, "{}", msg)
    }
}

impl std::error::Error for FlowError {}

/// In-memory state of one survey submission.
#[derive(Debug, Clone)]
pub struct FormSession {
    step: Step,
    branch: Branch,
    total_steps: u8,
    answers: BTreeMap<&'static str, String>,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FormSession {
    pub fn new() -> Self {
        Self {
            step: Step::Name,
            branch: Branch::Unset,
            total_steps: 5,
            answers: BTreeMap::new(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn branch(&self) -> Branch {
        self.branch
    }

    /// The step number shown to the user. Both conditional questions
    /// collapse into "step 5".
    pub fn display_step(&self) -> u8 {
        match self.step {
            Step::Name => 1,
            Step::EventDate => 2,
            Step::Reason => 3,
            Step::Status => 4,
            Step::TimeTaken | Step::ReasonNotComing => 5,
        }
    }

    /// The total question count shown to the user: 4 on the hehehe-bhai
    /// path, 5 otherwise.
    pub fn total_steps(&self) -> u8 {
        self.total_steps
    }

    pub fn answer(&self, key: &str) -> Option<&str> {
        self.answers.get(key).map(String::as_str)
    }

    /// Records the current question's raw input, overwriting any previous
    /// value for it.
    ///
    /// On Q4 the selection takes effect immediately: picking "hehehe bhai"
    /// flips the wizard into the submit-ready state without an explicit
    /// `advance`, and re-picking "yes"/"no" flips it back.
    pub fn set_input(&mut self, value: impl Into<String>) {
        let value = value.into();

        if self.step == Step::Status {
            match Status::parse(&value) {
                Some(Status::HeheheBhai) => {
                    self.branch = Branch::HeheheBhai;
                    self.total_steps = 4;
                }
                _ => {
                    self.branch = Branch::Unset;
                    self.total_steps = 5;
                }
            }
        }

        self.answers.insert(self.step.key(), value);
    }

    /// Whether the submit action is currently available.
    pub fn submit_ready(&self) -> bool {
        match self.step {
            Step::TimeTaken | Step::ReasonNotComing => true,
            Step::Status => self.branch == Branch::HeheheBhai,
            _ => false,
        }
    }

    /// Returns the current question's stored answer if it passes the
    /// required-field / selection check.
    fn validated_answer(&self) -> Result<&str, FlowError> {
        let value = self
            .answers
            .get(self.step.key())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty());

        match value {
            Some(v) => Ok(v),
            None if self.step.is_choice() => Err(FlowError::MissingSelection),
            None => Err(FlowError::MissingAnswer),
        }
    }

    /// Validates the current answer and moves to the next question.
    ///
    /// After Q4 the branch rule applies: Yes goes to the time-taken question,
    /// No goes to the excuse question, HeheheBhai stays terminal at Q4.
    /// A validation failure leaves every part of the session untouched.
    pub fn advance(&mut self) -> Result<(), FlowError> {
        self.validated_answer()?;

        match self.step {
            Step::Name => self.step = Step::EventDate,
            Step::EventDate => self.step = Step::Reason,
            Step::Reason => self.step = Step::Status,
            Step::Status => {
                let answer = self.answers.get(Step::Status.key()).map(String::as_str);
                let status = answer
                    .and_then(Status::parse)
                    .ok_or(FlowError::MissingSelection)?;

                self.branch = Branch::from(status);
                match status {
                    Status::Yes => {
                        self.total_steps = 5;
                        self.step = Step::TimeTaken;
                    }
                    Status::No => {
                        self.total_steps = 5;
                        self.step = Step::ReasonNotComing;
                    }
                    // Terminal right here; nothing more to ask.
                    Status::HeheheBhai => {
                        self.total_steps = 4;
                    }
                }
            }
            // Already terminal; advancing is a no-op.
            Step::TimeTaken | Step::ReasonNotComing => {}
        }

        Ok(())
    }

    /// Moves back to the previous question.
    ///
    /// Retreating from either conditional question discards any stored
    /// branch-specific answers and resets the branch; the user must
    /// re-answer Q4 to re-derive it.
    pub fn retreat(&mut self) {
        match self.step {
            Step::Name => {}
            Step::EventDate => self.step = Step::Name,
            Step::Reason => self.step = Step::EventDate,
            Step::Status => self.step = Step::Reason,
            Step::TimeTaken | Step::ReasonNotComing => {
                self.answers.remove(Step::TimeTaken.key());
                self.answers.remove(Step::ReasonNotComing.key());
                self.branch = Branch::Unset;
                self.total_steps = 5;
                self.step = Step::Status;
            }
        }
    }

    /// Assembles the final submission payload.
    ///
    /// Valid only in a terminal state; validates the current question one
    /// last time (the branch question may still be unanswered). The payload
    /// carries the base fields, the one branch-specific field that matches
    /// the committed branch, the raw per-question answers, and a synthesized
    /// one-line summary.
    pub fn finalize(&self) -> Result<SubmitRequest, FlowError> {
        if !self.submit_ready() {
            return Err(FlowError::NotReady);
        }
        self.validated_answer()?;

        let get = |key: &str| self.answers.get(key).cloned();

        let status = get("q4")
            .as_deref()
            .and_then(Status::parse)
            .ok_or(FlowError::MissingSelection)?;

        let mut payload = SubmitRequest {
            name: get("q1"),
            date: get("q2"),
            reason: get("q3"),
            aayush_status: Some(status),
            q1: get("q1"),
            q2: get("q2"),
            q3: get("q3"),
            q4: get("q4"),
            ..SubmitRequest::default()
        };

        if self.branch == Branch::Yes {
            payload.q5 = get("q5");
            payload.time_taken = get("q5");
        }
        if self.branch == Branch::No {
            payload.q6 = get("q6");
            payload.reason_not_coming = get("q6");
        }

        let mut message = format!(
            "Date: {}, Reason: {}, Status: {}",
            payload.date.as_deref().unwrap_or_default(),
            payload.reason.as_deref().unwrap_or_default(),
            status.as_str()
        );
        if let Some(time) = &payload.time_taken {
            message.push_str(&format!(", Time: {}", time));
        }
        if let Some(excuse) = &payload.reason_not_coming {
            message.push_str(&format!(", Reason for not coming: {}", excuse));
        }
        payload.message = Some(message);

        Ok(payload)
    }
}
