//! Analyst / Synthesis Step
//!
//! Consumes the extraction result plus conversation history and produces a
//! user-facing narrative with an optional visualization artifact. The model
//! is expected to emit markdown prose followed by one fenced ```json block;
//! the block is parsed defensively and stripped from the displayed text.

use crate::artifact::Artifact;
use crate::error::Result;
use crate::extraction::ExtractionResult;
use crate::llm::{ChatMessage, CompletionClient};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

lazy_static! {
    static ref JSON_FENCE: Regex =
        Regex::new(r"(?s)```json\s*\n(.*?)\n```").expect("json fence regex");
}

/// Debug surface exposed alongside the narrative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionDebug {
    pub query: String,
    pub error: Option<String>,
    pub attempts: u8,
}

/// Final response handed to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReply {
    pub text: String,
    pub artifact: Option<Artifact>,
    pub debug: ExtractionDebug,
}

pub struct Analyst {
    llm: Arc<dyn CompletionClient>,
    prompt: String,
}

impl Analyst {
    pub fn new(llm: Arc<dyn CompletionClient>, prompt: String) -> Self {
        Self { llm, prompt }
    }

    /// One model call combining conversation history with either the raw
    /// row data or an explicit data-missing marker, so the user always
    /// receives a coherent textual response even when extraction failed.
    pub async fn synthesize(
        &self,
        message: &str,
        history: &[ChatMessage],
        extraction: &ExtractionResult,
    ) -> Result<DashboardReply> {
        let data_context = build_data_context(extraction)?;

        let mut messages: Vec<ChatMessage> = history.to_vec();
        messages.push(ChatMessage::user(format!(
            "USER REQUEST: \"{}\"\n\n{}",
            message, data_context
        )));

        let content = self.llm.complete(&self.prompt, &messages).await?;
        let (text, artifact) = split_artifact(&content);

        Ok(DashboardReply {
            text,
            artifact,
            debug: ExtractionDebug {
                query: extraction.final_query().to_string(),
                error: extraction.error().map(String::from),
                attempts: extraction.attempts(),
            },
        })
    }
}

/// Serialize the extraction outcome into the analyst's data context. Row
/// values are already JSON-safe (wide integers were stringified at the
/// execution boundary), so plain serialization cannot fail on numeric width.
pub fn build_data_context(extraction: &ExtractionResult) -> Result<String> {
    match extraction {
        ExtractionResult::Success { rows, .. } => Ok(format!(
            "RAW DATA FROM DATABASE: {}",
            serde_json::to_string_pretty(rows)?
        )),
        ExtractionResult::Failure { error, .. } => Ok(format!("ERROR FETCHING DATA: {}", error)),
    }
}

/// Extract the fenced JSON artifact from the model output and return the
/// prose with the fence stripped. A malformed block yields no artifact but
/// never fails the whole response.
pub fn split_artifact(content: &str) -> (String, Option<Artifact>) {
    let artifact = JSON_FENCE.captures(content).and_then(|caps| {
        match serde_json::from_str::<Artifact>(&caps[1]) {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                warn!("Failed to parse analyst artifact: {}", e);
                None
            }
        }
    });

    let text = JSON_FENCE.replace(content, "").trim().to_string();
    (text, artifact)
}
