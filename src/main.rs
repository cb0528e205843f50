use anyhow::Result;
use clap::Parser;
use er_insight::dashboard::DashboardAgent;
use er_insight::executor::SqliteExecutor;
use er_insight::extraction::ExtractionConfig;
use er_insight::llm::LlmClient;
use er_insight::prompts::AgentPrompts;
use er_insight::schema::SchemaDescriptor;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "insight")]
#[command(about = "ER intelligent-dashboard data extraction agent")]
struct Args {
    /// The analytical question in natural language
    question: String,

    /// Path to the ER SQLite database (opened read-only)
    #[arg(short, long, default_value = "er.db")]
    database: PathBuf,

    /// Maximum generate/validate/execute attempts
    #[arg(long, default_value_t = 3)]
    max_retries: u8,

    /// Print the per-attempt extraction trace
    #[arg(long)]
    trace: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    info!("Question: {}", args.question);

    let llm = Arc::new(LlmClient::from_env()?);
    let executor = Arc::new(SqliteExecutor::open(&args.database)?);

    let config = ExtractionConfig {
        max_retries: args.max_retries,
        ..ExtractionConfig::default()
    };
    let agent = DashboardAgent::new(
        llm,
        executor,
        SchemaDescriptor::default(),
        AgentPrompts::default(),
        config,
    );

    let (reply, log) = agent.process_traced(&args.question, &[]).await?;

    println!("\n=== Analysis ===");
    println!("{}", reply.text);

    if let Some(artifact) = &reply.artifact {
        println!("\n=== Artifact ===");
        println!("{}", serde_json::to_string_pretty(artifact)?);
    }

    println!(
        "\nquery: {} | attempts: {} | error: {}",
        reply.debug.query,
        reply.debug.attempts,
        reply.debug.error.as_deref().unwrap_or("none")
    );

    if args.trace {
        println!("\n=== Trace ===");
        println!("{}", serde_json::to_string_pretty(&log)?);
    }

    Ok(())
}
