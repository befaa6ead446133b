//! Interactive caller
//!
//! Reads one natural-language request, translates it with the LLM, sends the
//! resulting instruction to the dispatch server and prints the outcome.

use clap::Parser;
use kube_dispatch::agent::{DispatchClient, DEFAULT_SERVER_URL};
use kube_dispatch::core::error::Result;
use kube_dispatch::llm::{translate, LlmClient};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

/// Natural-language front end for the dispatch server
#[derive(Parser, Debug)]
#[command(name = "agent")]
#[command(about = "Translate a Kubernetes question and run it via the dispatch server")]
struct Args {
    /// Dispatch server base URL
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Session id sent with the request (a fresh UUID when omitted)
    #[arg(long)]
    session_id: Option<String>,

    /// The request; prompts on stdin when omitted
    request: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kube_dispatch=warn")),
        )
        .init();

    let args = Args::parse();
    let llm = LlmClient::from_env()?;
    let session_id = args
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let dispatch = DispatchClient::new(&args.server, session_id);

    let input = if args.request.is_empty() {
        print!("Enter your K8s command (natural language): ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        line
    } else {
        args.request.join(" ")
    };

    let instruction = match translate(&llm, &input).await {
        Ok(instruction) => instruction,
        Err(e) => {
            println!("Failed to parse natural language: {}", e);
            return Ok(());
        }
    };

    println!();
    println!("Parsed command:");
    println!("{}", serde_json::to_string_pretty(&instruction)?);

    match dispatch.execute(&instruction).await {
        Ok(result) => {
            println!();
            println!("Command: {}", result.command);
            println!("Output:\n{}", result.output);
        }
        Err(e) => {
            println!("Dispatch server error: {}", e);
        }
    }

    Ok(())
}
