pub mod analyst;
pub mod artifact;
pub mod dashboard;
pub mod error;
pub mod executor;
pub mod extraction;
pub mod llm;
pub mod prompts;
pub mod safety;
pub mod schema;
