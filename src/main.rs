use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};

use convolink::{
    ChatClient, ChatSession, Config, Origin, ReplyService, SubmissionPolicy, DEFAULT_ENDPOINT,
};

#[derive(Parser)]
#[command(name = "convolink")]
#[command(about = "Terminal chat client for the Convolink reply service")]
struct Cli {
    /// Base URL of the reply service
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Language hint sent with every message (e.g. en, hi, de, auto)
    #[arg(short, long)]
    language: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat interactively (default)
    Chat,
    /// Send a single message and print the reply
    Ask {
        /// Your message
        message: String,
    },
    /// Show or persist the preferred language
    Language {
        /// New value to save, e.g. en, hi, de, auto
        value: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|_| Config::new());

    // Flag overrides env, env overrides config file
    let endpoint = cli
        .endpoint
        .or_else(|| std::env::var("CONVOLINK_ENDPOINT").ok())
        .or_else(|| config.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let language = cli
        .language
        .or_else(|| config.language.clone())
        .unwrap_or_else(|| "auto".to_string());

    let policy = config
        .policy
        .as_deref()
        .and_then(SubmissionPolicy::from_str)
        .unwrap_or_default();

    match cli.command {
        None | Some(Commands::Chat) => chat_interactive(&endpoint, &language, policy).await?,
        Some(Commands::Ask { message }) => ask(&endpoint, &language, policy, &message).await?,
        Some(Commands::Language { value }) => show_or_save_language(&config, value)?,
    }

    Ok(())
}

async fn chat_interactive(endpoint: &str, language: &str, policy: SubmissionPolicy) -> Result<()> {
    let client = ChatClient::new(endpoint);
    let mut session = ChatSession::new(language, policy);

    println!("CONVOLINK ({}, language: {})", endpoint, language);
    println!("Press Ctrl-D to quit.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("you> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let Some(submission) = session.begin(&line) else {
            continue;
        };

        println!("typing...");

        let appended_from = session.messages().len();
        let outcome = client.send(&submission.text, session.language()).await;
        session.resolve(submission.id, outcome);

        for message in &session.messages()[appended_from..] {
            if message.origin == Origin::Assistant {
                println!("convolink> {}", message.text);
            }
        }
    }

    Ok(())
}

async fn ask(
    endpoint: &str,
    language: &str,
    policy: SubmissionPolicy,
    message: &str,
) -> Result<()> {
    let client = ChatClient::new(endpoint);
    let mut session = ChatSession::new(language, policy);

    if !session.submit(&client, message).await {
        return Err(anyhow!("Nothing to send"));
    }

    if let Some(last) = session.messages().last() {
        if last.origin == Origin::Assistant {
            println!("{}", last.text);
        }
    }

    Ok(())
}

fn show_or_save_language(config: &Config, value: Option<String>) -> Result<()> {
    match value {
        Some(value) => {
            Config::save_language(&value)?;
            println!("Language preference saved: {}", value);
        }
        None => {
            println!(
                "Language preference: {}",
                config.language.as_deref().unwrap_or("auto")
            );
        }
    }
    Ok(())
}
