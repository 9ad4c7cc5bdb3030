//! fengchao-chat: interactive streaming chat against a FengChao service.
//!
//! Reads credentials from the config file or `FENGCHAO_KEY`,
//! `FENGCHAO_SECRET` and `FENGCHAO_BASE_URL`, then streams each answer as
//! it is generated.

mod session;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use fengchao::FengchaoClient;
use fengchao_config::{load_config, load_config_from};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::session::{ChatSession, Command, HELP};

#[derive(Parser)]
#[command(name = "fengchao-chat", about = "Interactive streaming chat for FengChao")]
struct Args {
    /// Config file (defaults to the platform config directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model to chat with, overriding the config file.
    #[arg(short, long)]
    model: Option<String>,

    /// System prompt for the conversation.
    #[arg(short, long)]
    system: Option<String>,

    /// Enable the service's sensitive-content filter.
    #[arg(long)]
    sensitive: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fengchao_chat=info,fengchao=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fengchao-chat failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> fengchao_common::Result<()> {
    let mut config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(model) = args.model {
        config.completion.model = model;
    }
    if args.sensitive {
        config.completion.is_sensitive = true;
    }

    let client = FengchaoClient::from_config(&config)?;
    tracing::info!(
        base_url = %client.base_url(),
        model = %config.completion.model,
        "fengchao-chat ready"
    );

    let mut session = ChatSession::new(args.system);
    let mut stdout = std::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("FengChao chat ({})", config.completion.model);
    println!("type :help for commands");
    print_prompt(&mut stdout)?;

    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Help => println!("{HELP}"),
            Command::Clear => {
                session.clear();
                println!("history cleared");
            }
            Command::History => {
                for entry in session.history_lines() {
                    println!("{entry}");
                }
            }
            Command::Exit => break,
            Command::Empty => {}
            Command::Ask(text) => {
                if let Err(e) = session.ask(&client, client.options(), text, &mut stdout).await {
                    tracing::warn!(error = %e, "chat turn failed");
                    println!();
                }
            }
        }
        print_prompt(&mut stdout)?;
    }
    Ok(())
}

fn print_prompt(out: &mut impl Write) -> std::io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}
