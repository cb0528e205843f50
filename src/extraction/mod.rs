//! Data Extraction Agent
//!
//! Turns a free-text analytical question into a validated, executed,
//! read-only SQL query through a bounded Coder -> Validator -> Execute ->
//! Doctor retry loop.

pub mod coder;
pub mod doctor;
pub mod log;
pub mod orchestrator;

pub use coder::SqlCoder;
pub use doctor::QueryDoctor;
pub use log::{AttemptOutcome, AttemptRecord, ExtractionLog};
pub use orchestrator::{ExtractionAgent, ExtractionConfig};

use crate::executor::Row;
use serde::{Deserialize, Serialize};

/// Correction context carried from one failed attempt into the next Coder
/// call. Derived only from the immediately preceding failure; earlier
/// attempts are never accumulated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correction {
    pub failed_query: String,
    pub error: String,
    pub instructions: String,
}

/// Terminal value of the extraction loop. Exactly one variant is produced
/// per request; loop-level failures never cross this boundary as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExtractionResult {
    Success {
        rows: Vec<Row>,
        query: String,
        attempts: u8,
    },
    Failure {
        query: String,
        error: String,
        attempts: u8,
    },
}

impl ExtractionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResult::Success { .. })
    }

    pub fn attempts(&self) -> u8 {
        match self {
            ExtractionResult::Success { attempts, .. } => *attempts,
            ExtractionResult::Failure { attempts, .. } => *attempts,
        }
    }

    /// The last SQL text the Coder produced, successful or not.
    pub fn final_query(&self) -> &str {
        match self {
            ExtractionResult::Success { query, .. } => query,
            ExtractionResult::Failure { query, .. } => query,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ExtractionResult::Success { .. } => None,
            ExtractionResult::Failure { error, .. } => Some(error),
        }
    }
}
