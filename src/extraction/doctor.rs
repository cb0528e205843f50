//! Error-Diagnosis Step (the "Doctor")

use crate::error::Result;
use crate::llm::{ChatMessage, CompletionClient};
use crate::prompts::DOCTOR_FALLBACK_CORRECTION;
use crate::schema::SchemaDescriptor;
use std::sync::Arc;

/// Produces a prose correction plan for a failed query. The output is
/// opaque free text consumed only by the next Coder call; it is never
/// parsed or validated structurally.
pub struct QueryDoctor {
    llm: Arc<dyn CompletionClient>,
    prompt: String,
    schema: SchemaDescriptor,
}

impl QueryDoctor {
    pub fn new(llm: Arc<dyn CompletionClient>, prompt: String, schema: SchemaDescriptor) -> Self {
        Self {
            llm,
            prompt,
            schema,
        }
    }

    /// Diagnose one failed query/error pair from the immediately preceding
    /// attempt. An empty model reply falls back to a generic plan so the
    /// next Coder call always has instructions to follow.
    pub async fn diagnose(&self, failed_query: &str, error_message: &str) -> Result<String> {
        let system_prompt = format!("{}\n\nSCHEMA:\n{}", self.prompt, self.schema.context);

        let messages = vec![ChatMessage::user(format!(
            "FAILED QUERY: {}\nERROR: {}",
            failed_query, error_message
        ))];

        let output = self.llm.complete(&system_prompt, &messages).await?;
        let instructions = output.trim();
        if instructions.is_empty() {
            return Ok(DOCTOR_FALLBACK_CORRECTION.to_string());
        }
        Ok(instructions.to_string())
    }
}
