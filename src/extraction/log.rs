//! Extraction Logging
//!
//! Structured per-request trace of the retry loop, for debug surfaces and
//! offline inspection of how a query came to be.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a single attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptOutcome {
    /// Statement executed; extraction is done.
    Executed { row_count: usize },
    /// The safety validator refused the statement.
    SecurityBlocked { reason: String },
    /// The store rejected or failed the statement.
    ExecutionFailed { error: String },
    /// The Coder call itself failed or timed out.
    GenerationFailed { error: String },
    /// The Coder returned empty text; the loop aborts.
    EmptyGeneration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt: u8,
    pub sql: String,
    pub outcome: AttemptOutcome,
    pub elapsed_ms: u64,
}

/// Full trace of one extraction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionLog {
    pub request_id: String,
    pub question: String,
    pub schema_version: String,
    pub attempts: Vec<AttemptRecord>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub success: bool,
}

impl ExtractionLog {
    pub fn new(question: impl Into<String>, schema_version: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            question: question.into(),
            schema_version: schema_version.into(),
            attempts: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            success: false,
        }
    }

    pub fn record_attempt(&mut self, record: AttemptRecord) {
        self.attempts.push(record);
    }

    pub fn finish(&mut self, success: bool) {
        self.finished_at = Some(Utc::now());
        self.success = success;
    }

    pub fn attempt_count(&self) -> u8 {
        self.attempts.len() as u8
    }
}
