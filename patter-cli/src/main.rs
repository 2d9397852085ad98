//! # patter-cli
//!
//! Command-line chat client for a patter server.
//!
//! ## Commands
//!
//! - `history`: fetch and print the current message feed
//! - `send`: submit a single message
//! - `chat`: interactive session (live feed plus stdin sends)
//!
//! ## Example
//!
//! ```bash
//! patter --server http://localhost:5000 --username "Sender 1" chat
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use patter_client::{ChannelError, EngineConfig, EngineError, HttpChannel, HttpChannelConfig, SyncEngine};
use patter_core::display;
use patter_types::Message;

/// Command-line chat client for a patter server.
#[derive(Parser, Debug)]
#[command(name = "patter")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Chat server base URL
    #[arg(long, global = true, default_value = "http://localhost:5000")]
    server: String,

    /// Push endpoint override (defaults to the server URL with a ws scheme)
    #[arg(long, global = true)]
    push_url: Option<String>,

    /// Label stamped on outgoing messages
    #[arg(long, short, global = true, default_value = "anonymous")]
    username: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch and print the current message feed
    History,

    /// Submit a single message
    Send {
        /// Message text
        message: String,
    },

    /// Interactive session: live feed plus stdin sends
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = HttpChannelConfig::new(&cli.server);
    if let Some(url) = &cli.push_url {
        config = config.with_push_url(url);
    }
    let engine = SyncEngine::new(
        EngineConfig::new(cli.username.as_str()),
        HttpChannel::new(config),
    );

    match cli.command {
        Commands::History => history(&engine).await,
        Commands::Send { message } => send(&engine, &message).await,
        Commands::Chat => chat(&engine).await,
    }
}

/// Fetch the snapshot and print it, one line per message.
async fn history(engine: &SyncEngine<HttpChannel>) -> Result<()> {
    engine.load_snapshot().await?;
    let feed = engine.feed().await;
    if feed.is_empty() {
        println!("No messages yet.");
        return Ok(());
    }
    for message in &feed {
        print_message(message);
    }
    Ok(())
}

/// Submit a single message and exit.
async fn send(engine: &SyncEngine<HttpChannel>, message: &str) -> Result<()> {
    engine.set_draft(message).await;
    engine.send().await?;
    println!("Sent.");
    Ok(())
}

/// Interactive session: print the feed as it grows, send stdin lines.
async fn chat(engine: &SyncEngine<HttpChannel>) -> Result<()> {
    engine.start().await?;

    let mut printed = print_new_messages(engine, 0).await;
    println!(
        "Connected as {}. Type a message and press Enter (Ctrl-D to quit).",
        engine.sender_identity()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            pumped = engine.pump_one() => {
                match pumped {
                    Ok(true) => {
                        printed = print_new_messages(engine, printed).await;
                    }
                    Ok(false) => {}
                    Err(EngineError::Channel(ChannelError::ConnectionClosed)) => {
                        println!("Server closed the connection.");
                        break;
                    }
                    Err(e) => {
                        eprintln!("push channel error: {}", e);
                        break;
                    }
                }
            }
            line = lines.next_line() => {
                match line? {
                    Some(text) => {
                        engine.set_draft(text).await;
                        if let Err(e) = engine.send().await {
                            eprintln!("send failed, draft kept: {}", e);
                        }
                    }
                    // stdin closed
                    None => break,
                }
            }
        }
    }

    engine.shutdown().await?;
    Ok(())
}

/// Print feed entries past `printed`; returns the new count.
async fn print_new_messages(engine: &SyncEngine<HttpChannel>, printed: usize) -> usize {
    let feed = engine.feed().await;
    for message in &feed[printed..] {
        print_message(message);
    }
    feed.len()
}

fn print_message(message: &Message) {
    println!(
        "[{}] {}: {}",
        display::format_timestamp(message.created_at.as_deref()),
        display::sender_label(message),
        display::content_text(message),
    );
}
