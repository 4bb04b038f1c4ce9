use anyhow::Result;
use chatdigest_common::{logger, AppConfig, ChatdigestError};
use chatdigest_llm::{
    pick_model, GeminiClient, LlmClient, ModelSelector, Summarizer, SummaryRequest,
    NOTHING_TO_SUMMARIZE,
};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    } else {
        // Fallback to default dotenv behavior
        dotenv::dotenv().ok();
    }
}

#[derive(Parser)]
#[command(name = "chatdigest")]
#[command(about = "Chatdigest - group chat summarizer and messaging webhook receiver", long_about = None)]
struct Cli {
    /// Same as the `summarize` subcommand, for callers using the flag form
    #[arg(long, hide = true)]
    summarize: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a transcript read as JSON from stdin
    Summarize {
        /// Preferred model for this call (overrides GEMINI_MODEL)
        #[arg(long)]
        model: Option<String>,
    },

    /// List generation models visible to the API key
    Models,

    /// Start the webhook server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    load_dotenv_from_project_root();

    let command = match cli.command {
        None if cli.summarize => Some(Commands::Summarize { model: None }),
        command => command,
    };

    match command {
        Some(Commands::Summarize { model }) => Ok(run_summarize(model).await),
        Some(Commands::Models) => {
            list_models().await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Serve { host, port }) => {
            serve(host, port).await?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            serve(None, None).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Summarizer process contract: summary on stdout and exit 0, or a single
/// `Summarizer error:` line on stderr and exit 1.
async fn run_summarize(model: Option<String>) -> ExitCode {
    match summarize_from(std::io::stdin().lock(), model, AppConfig::from_env).await {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", error_line(&e));
            ExitCode::FAILURE
        }
    }
}

/// Read the JSON request from `input` and summarize it.
/// Configuration is only loaded once there is a transcript to send.
async fn summarize_from<R, F>(
    mut input: R,
    model: Option<String>,
    load_config: F,
) -> chatdigest_common::Result<String>
where
    R: Read,
    F: FnOnce() -> chatdigest_common::Result<AppConfig>,
{
    let mut raw = String::new();
    input.read_to_string(&mut raw)?;

    let request = SummaryRequest::from_json(&raw)?;
    if request.is_blank() {
        return Ok(NOTHING_TO_SUMMARIZE.to_string());
    }

    let config = load_config()?;

    // Best effort: an unwritable log directory must not fail the summary
    let _ = logger::setup_file_logging(&config.log_dir, &config.log_level);

    let client = GeminiClient::new(&config.gemini_base_url, config.require_api_key()?)?;
    let selector = ModelSelector::new(model.or_else(|| config.gemini_model.clone()));
    let summarizer = Summarizer::new(client, selector).with_language(config.summary_language.clone());

    let summary = summarizer.summarize(&request).await?;
    Ok(summary.text)
}

fn error_line(err: &ChatdigestError) -> String {
    format!("Summarizer error: {}", single_line(&err.to_string()))
}

fn single_line(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}

async fn list_models() -> Result<()> {
    let config = AppConfig::from_env()?;
    let _ = logger::setup_file_logging(&config.log_dir, &config.log_level);

    let client = GeminiClient::new(&config.gemini_base_url, config.require_api_key()?)?;
    let names = client.list_models().await?;
    let picked = pick_model(&names, config.gemini_model.as_deref())?;

    for name in &names {
        let marker = if *name == picked { "*" } else { " " };
        println!("{} {}", marker, name);
    }

    Ok(())
}

async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = AppConfig::from_env()?;

    // Override with CLI arguments
    if let Some(host) = host {
        config.server_host = host;
    }
    if let Some(port) = port {
        config.server_port = port;
    }
    config.validate_server()?;

    logger::setup_logging(&config.log_dir, &config.log_level)?;

    tracing::info!("Chatdigest starting...");
    tracing::info!("  Bind: {}", config.server_bind_address());

    chatdigest_server::start_server(config).await?;

    Ok(())
}
