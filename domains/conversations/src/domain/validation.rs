//! Validation rules for manager inputs
//!
//! Checks run in the order they are chained and every failure is recorded,
//! so one response can carry several complaints.

use convos_common::{Outcome, ResultCode};

/// Maximum characters in a message body
pub const BODY_MAX_SIZE: usize = 64_000;

/// Maximum characters in a conversation subject
pub const SUBJECT_MAX_SIZE: usize = 140;

/// Accumulates validation failures into an `Outcome`
pub struct Validation<'a> {
    outcome: &'a mut Outcome,
    valid: bool,
}

impl<'a> Validation<'a> {
    pub fn new(outcome: &'a mut Outcome) -> Self {
        Self {
            outcome,
            valid: true,
        }
    }

    fn reject(&mut self, message: String) {
        self.outcome.fail(ResultCode::InvalidInputData, message);
        self.valid = false;
    }

    /// Identifiers must be strictly positive
    pub fn id(mut self, id: i64, field: &str) -> Self {
        if id <= 0 {
            self.reject(format!("Invalid Id value for {}", field));
        }
        self
    }

    /// Optional identifiers are only checked when present
    pub fn optional_id(self, id: Option<i64>, field: &str) -> Self {
        match id {
            Some(id) => self.id(id, field),
            None => self,
        }
    }

    pub fn range(mut self, value: i32, field: &str, min: i32, max: i32) -> Self {
        if value < min || value > max {
            self.reject(format!("Invalid value for {}", field));
        }
        self
    }

    pub fn subject(mut self, subject: Option<&str>) -> Self {
        if exceeds(subject, SUBJECT_MAX_SIZE) {
            self.reject(format!(
                "The maximum number of characters allowed for the subject is {}",
                SUBJECT_MAX_SIZE
            ));
        }
        self
    }

    pub fn body(mut self, body: Option<&str>) -> Self {
        if exceeds(body, BODY_MAX_SIZE) {
            self.reject(format!(
                "The maximum number of characters allowed for the body is {}",
                BODY_MAX_SIZE
            ));
        }
        self
    }

    /// `true` when every check passed
    pub fn finish(self) -> bool {
        self.valid
    }
}

/// Blank text counts as absent, never as too long
fn exceeds(text: Option<&str>, max: usize) -> bool {
    match text {
        Some(t) if !t.trim().is_empty() => t.chars().count() > max,
        _ => false,
    }
}
