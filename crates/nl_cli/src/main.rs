use clap::Parser;
use nl_core::prelude::*;
use nl_inference::Config;
use nl_pipeline::{Orchestrator, PipelineContext, WorkflowService};
use nl_storage::MemoryStorage;
use nl_web::{AppState, PollConfig};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Personalized newsletter generation service", long_about = None)]
struct Cli {
    /// Base URL of the OpenAI-compatible completions API
    #[arg(long, default_value = "https://api.openai.com/v1")]
    model_url: String,
    /// Model identifier passed to the completions API
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,
    /// API key; falls back to $NL_API_KEY. Without one the offline dummy
    /// model is used.
    #[arg(long)]
    api_key: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP gateway
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },
    /// Run the pipeline once and print the newsletter JSON
    Generate {
        /// Interest keywords
        #[arg(long, required = true, num_args = 1..)]
        interests: Vec<String>,
        /// Source URLs to scrape
        #[arg(long, required = true, num_args = 1..)]
        sources: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let api_key = cli.api_key.or_else(|| std::env::var("NL_API_KEY").ok());
    let generator = nl_inference::create_generator(Config {
        base_url: cli.model_url,
        api_key,
        model: cli.model,
    });
    info!("🧠 text generation model initialized ({})", generator.name());

    let storage = Arc::new(MemoryStorage::new());
    let ctx = PipelineContext {
        generator,
        artifacts: storage.clone(),
        steps: storage.clone(),
        runs: storage,
    };

    match cli.command {
        Commands::Serve { addr } => {
            let state = AppState {
                service: Arc::new(WorkflowService::new(ctx)),
                poll: PollConfig::default(),
            };
            let app = nl_web::create_app(state);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("📰 newsletter gateway listening on {}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Generate { interests, sources } => {
            for source in &sources {
                if url::Url::parse(source).is_err() {
                    anyhow::bail!("invalid source URL: {}", source);
                }
            }
            let params = NewsletterParams { interests, sources };
            let run = ctx.runs.create_run().await?;
            info!("🦗 generating newsletter (run {})", run.id);
            let orchestrator = Orchestrator::new(ctx);
            let newsletter = orchestrator.run(&run.id, &params).await?;
            println!("{}", serde_json::to_string_pretty(&newsletter)?);
        }
    }

    Ok(())
}
