//! Extraction Orchestrator
//!
//! Bounded retry state machine: GENERATE -> VALIDATE -> EXECUTE, with a
//! Doctor diagnosis pass between failed attempts. The loop always
//! terminates within `max_retries` attempts and always returns a result
//! value; loop-level failures are folded into `ExtractionResult::Failure`
//! rather than propagated.

use crate::error::AgentError;
use crate::executor::QueryExecutor;
use crate::extraction::coder::SqlCoder;
use crate::extraction::doctor::QueryDoctor;
use crate::extraction::log::{AttemptOutcome, AttemptRecord, ExtractionLog};
use crate::extraction::{Correction, ExtractionResult};
use crate::llm::CompletionClient;
use crate::prompts::{AgentPrompts, SECURITY_BLOCK_CORRECTION};
use crate::safety::{validate_query, QueryVerdict};
use crate::schema::SchemaDescriptor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Knobs for the retry loop. The 3-attempt cap is the contract the
/// surrounding application tests against; the per-attempt timeout bounds
/// model-call latency so a stuck attempt cannot hold a request forever.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub max_retries: u8,
    pub attempt_timeout: Duration,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            attempt_timeout: Duration::from_secs(60),
        }
    }
}

/// The data-extraction agent: owns the Coder and Doctor steps plus the
/// injected execution capability, and drives the retry loop.
pub struct ExtractionAgent {
    coder: SqlCoder,
    doctor: QueryDoctor,
    executor: Arc<dyn QueryExecutor>,
    config: ExtractionConfig,
    schema_version: String,
}

impl ExtractionAgent {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        executor: Arc<dyn QueryExecutor>,
        schema: SchemaDescriptor,
        prompts: &AgentPrompts,
        config: ExtractionConfig,
    ) -> Self {
        let coder = SqlCoder::new(Arc::clone(&llm), prompts.coder.clone(), schema.clone());
        let doctor = QueryDoctor::new(llm, prompts.doctor.clone(), schema.clone());
        Self {
            coder,
            doctor,
            executor,
            config,
            schema_version: schema.version.to_string(),
        }
    }

    /// Run the loop for one request.
    pub async fn extract(&self, request: &str) -> ExtractionResult {
        let (result, _log) = self.extract_with_log(request).await;
        result
    }

    /// Run the loop and also return the per-attempt trace.
    pub async fn extract_with_log(&self, request: &str) -> (ExtractionResult, ExtractionLog) {
        let mut log = ExtractionLog::new(request, self.schema_version.clone());
        let mut attempts: u8 = 0;
        let mut current_query = String::new();
        let mut last_error = String::new();
        let mut correction: Option<Correction> = None;

        info!(request_id = %log.request_id, "Extracting data for request: {}", request);

        while attempts < self.config.max_retries {
            attempts += 1;
            let attempt_start = Instant::now();

            // 1. GENERATE (or regenerate with the previous correction plan)
            let generated = tokio::time::timeout(
                self.config.attempt_timeout,
                self.coder.generate(request, correction.as_ref()),
            )
            .await
            .unwrap_or_else(|_| {
                Err(AgentError::Llm(format!(
                    "Coder call timed out after {:?}",
                    self.config.attempt_timeout
                )))
            });

            let sql = match generated {
                Ok(sql) => sql,
                Err(e) => {
                    last_error = e.to_string();
                    warn!("Attempt {} generation failed: {}", attempts, last_error);
                    log.record_attempt(AttemptRecord {
                        attempt: attempts,
                        sql: String::new(),
                        outcome: AttemptOutcome::GenerationFailed {
                            error: last_error.clone(),
                        },
                        elapsed_ms: attempt_start.elapsed().as_millis() as u64,
                    });
                    continue;
                }
            };

            // Empty text means the model has nothing to offer; further
            // attempts would re-run the same prompt, so stop here.
            if sql.is_empty() {
                log.record_attempt(AttemptRecord {
                    attempt: attempts,
                    sql: String::new(),
                    outcome: AttemptOutcome::EmptyGeneration,
                    elapsed_ms: attempt_start.elapsed().as_millis() as u64,
                });
                warn!("Attempt {} produced empty SQL, aborting loop", attempts);
                break;
            }
            current_query = sql;

            // 2. SAFETY CHECK - a query that fails here is never executed.
            if let QueryVerdict::Blocked(reason) = validate_query(&current_query) {
                last_error = format!("Security Block: {}", reason);
                warn!("Attempt {} blocked: {}", attempts, last_error);
                log.record_attempt(AttemptRecord {
                    attempt: attempts,
                    sql: current_query.clone(),
                    outcome: AttemptOutcome::SecurityBlocked {
                        reason: reason.clone(),
                    },
                    elapsed_ms: attempt_start.elapsed().as_millis() as u64,
                });
                correction = Some(Correction {
                    failed_query: current_query.clone(),
                    error: last_error.clone(),
                    instructions: SECURITY_BLOCK_CORRECTION.to_string(),
                });
                continue;
            }

            // 3. EXECUTE
            let executed = tokio::time::timeout(
                self.config.attempt_timeout,
                self.executor.execute_raw(&current_query),
            )
            .await
            .unwrap_or_else(|_| {
                Err(AgentError::Execution(format!(
                    "Execution timed out after {:?}",
                    self.config.attempt_timeout
                )))
            });

            match executed {
                Ok(rows) => {
                    info!(
                        "Extraction succeeded on attempt {} with {} rows",
                        attempts,
                        rows.len()
                    );
                    log.record_attempt(AttemptRecord {
                        attempt: attempts,
                        sql: current_query.clone(),
                        outcome: AttemptOutcome::Executed {
                            row_count: rows.len(),
                        },
                        elapsed_ms: attempt_start.elapsed().as_millis() as u64,
                    });
                    log.finish(true);
                    debug!(trace = ?log, "extraction trace");
                    return (
                        ExtractionResult::Success {
                            rows,
                            query: current_query,
                            attempts,
                        },
                        log,
                    );
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!("Attempt {} failed: {}", attempts, last_error);
                    log.record_attempt(AttemptRecord {
                        attempt: attempts,
                        sql: current_query.clone(),
                        outcome: AttemptOutcome::ExecutionFailed {
                            error: last_error.clone(),
                        },
                        elapsed_ms: attempt_start.elapsed().as_millis() as u64,
                    });

                    // 4. DIAGNOSE - the Doctor sees only this attempt's
                    // failing query/error pair, never earlier history.
                    let instructions = self
                        .diagnose_with_fallback(&current_query, &last_error)
                        .await;
                    correction = Some(Correction {
                        failed_query: current_query.clone(),
                        error: last_error.clone(),
                        instructions,
                    });
                }
            }
        }

        if last_error.is_empty() {
            last_error =
                "Failed to generate a valid working query after multiple attempts.".to_string();
        }
        log.finish(false);
        debug!(trace = ?log, "extraction trace");
        (
            ExtractionResult::Failure {
                query: current_query,
                error: last_error,
                attempts,
            },
            log,
        )
    }

    /// A Doctor failure must not abort the loop; fall back to a generic
    /// correction plan so the next attempt still has instructions.
    async fn diagnose_with_fallback(&self, failed_query: &str, error_message: &str) -> String {
        let diagnosed = tokio::time::timeout(
            self.config.attempt_timeout,
            self.doctor.diagnose(failed_query, error_message),
        )
        .await;
        match diagnosed {
            Ok(Ok(instructions)) => instructions,
            Ok(Err(e)) => {
                warn!("Doctor diagnosis failed: {}", e);
                crate::prompts::DOCTOR_FALLBACK_CORRECTION.to_string()
            }
            Err(_) => {
                warn!("Doctor diagnosis timed out");
                crate::prompts::DOCTOR_FALLBACK_CORRECTION.to_string()
            }
        }
    }
}
