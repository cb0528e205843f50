//! SQL Generation Step (the "Coder")

use crate::error::Result;
use crate::extraction::Correction;
use crate::llm::{ChatMessage, CompletionClient};
use crate::schema::SchemaDescriptor;
use std::sync::Arc;

/// Generates one candidate SQL statement per call. The model output is
/// trimmed and returned verbatim; no SQL post-processing happens here.
pub struct SqlCoder {
    llm: Arc<dyn CompletionClient>,
    prompt: String,
    schema: SchemaDescriptor,
}

impl SqlCoder {
    pub fn new(llm: Arc<dyn CompletionClient>, prompt: String, schema: SchemaDescriptor) -> Self {
        Self {
            llm,
            prompt,
            schema,
        }
    }

    /// Generate a candidate query for `request`. On retry, `correction`
    /// carries the previous failing query, its error, and the Doctor's
    /// correction plan.
    pub async fn generate(&self, request: &str, correction: Option<&Correction>) -> Result<String> {
        let system_prompt = format!("{}\n\nSCHEMA:\n{}", self.prompt, self.schema.context);

        let mut messages = vec![ChatMessage::user(format!("Original Request: {}", request))];

        if let Some(correction) = correction {
            messages.push(ChatMessage::user(format!(
                "Your previous query failed with this error: \"{}\".\nFAILED QUERY: {}\nFOLLOW THIS CORRECTION PLAN: {}",
                correction.error, correction.failed_query, correction.instructions
            )));
        }

        let output = self.llm.complete(&system_prompt, &messages).await?;
        Ok(output.trim().to_string())
    }
}
