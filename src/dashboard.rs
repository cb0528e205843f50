//! Dashboard pipeline
//!
//! Front door for the intelligent-dashboard chat: runs the extraction loop
//! for the question, then hands the outcome to the Analyst for synthesis.
//! One question runs to completion per call; there is no speculative or
//! concurrent generation.

use crate::analyst::{Analyst, DashboardReply};
use crate::error::Result;
use crate::executor::QueryExecutor;
use crate::extraction::{ExtractionAgent, ExtractionConfig, ExtractionLog};
use crate::llm::{ChatMessage, CompletionClient};
use crate::prompts::AgentPrompts;
use crate::schema::SchemaDescriptor;
use std::sync::Arc;

pub struct DashboardAgent {
    extraction: ExtractionAgent,
    analyst: Analyst,
}

impl DashboardAgent {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        executor: Arc<dyn QueryExecutor>,
        schema: SchemaDescriptor,
        prompts: AgentPrompts,
        config: ExtractionConfig,
    ) -> Self {
        let extraction =
            ExtractionAgent::new(Arc::clone(&llm), executor, schema, &prompts, config);
        let analyst = Analyst::new(llm, prompts.analyst);
        Self {
            extraction,
            analyst,
        }
    }

    /// Answer one chat message. The Analyst is invoked even when extraction
    /// failed, so the caller always gets a coherent textual reply.
    pub async fn process(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<DashboardReply> {
        let extraction = self.extraction.extract(message).await;
        self.analyst.synthesize(message, history, &extraction).await
    }

    /// Same as `process`, additionally returning the extraction trace.
    pub async fn process_traced(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<(DashboardReply, ExtractionLog)> {
        let (extraction, log) = self.extraction.extract_with_log(message).await;
        let reply = self.analyst.synthesize(message, history, &extraction).await?;
        Ok((reply, log))
    }
}
