use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use iso_standards_agent::{Config, Orchestrator, StandardsCatalog};
use llm_common::completion::OpenAiCompletion;
use llm_common::openai::OpenAiClient;

const EXIT_COMMANDS: &[&str] = &["quit", "exit", "bye"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the conversation
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = Config::from_env()?;
    info!(
        base_url = %config.openai.base_url,
        model = %config.model,
        search_model = %config.search_model,
        timeout_ms = config.openai.default_timeout.as_millis(),
        max_retries = config.openai.max_retries,
        "completion service configured"
    );

    let client = Arc::new(OpenAiClient::new(config.openai.clone())?);
    let main_llm = Arc::new(OpenAiCompletion::new(Arc::clone(&client), &config.model));
    let search_llm = Arc::new(OpenAiCompletion::new(client, &config.search_model));
    let catalog = Arc::new(StandardsCatalog::builtin());
    info!(standards = catalog.records().len(), "standards catalog loaded");

    let mut orchestrator = Orchestrator::new(catalog, main_llm, search_llm);
    run_repl(&mut orchestrator).await?;

    info!("session ended");
    Ok(())
}

async fn run_repl(orchestrator: &mut Orchestrator) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(
            "🏥 ISO Medical Device Standards Chatbot\n\
Ask me about ISO standards for medical devices!\n\
Type 'quit' to exit\n\n"
                .as_bytes(),
        )
        .await?;

    loop {
        stdout.write_all(b"You: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if is_exit_command(input) {
            stdout.write_all(b"Goodbye!\n").await?;
            break;
        }
        if input.is_empty() {
            continue;
        }

        let reply = orchestrator.chat(input).await;
        stdout
            .write_all(format!("\nmed_bot: {reply}\n\n").as_bytes())
            .await?;
    }

    stdout.flush().await?;
    Ok(())
}

fn is_exit_command(input: &str) -> bool {
    EXIT_COMMANDS
        .iter()
        .any(|cmd| input.eq_ignore_ascii_case(cmd))
}
