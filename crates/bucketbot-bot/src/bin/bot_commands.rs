//! Manage the bot's command menu.
//!
//! Reads TELEGRAM_API_TOKEN (and optionally TELEGRAM_API_URL) from the
//! environment or `.env`.

use anyhow::Context;
use bucketbot_bot::commands::menu;
use bucketbot_bot::telegram::TelegramApi;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bot_commands", about = "Get, set or delete the bot command menu")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Show the current command menu (default)
    Get,
    /// Replace the menu with the bot's commands
    Set,
    /// Remove the command menu
    Delete,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let token = std::env::var("TELEGRAM_API_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty())
        .context("Missing bot token. Set TELEGRAM_API_TOKEN")?;
    let api_url = std::env::var("TELEGRAM_API_URL")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "https://api.telegram.org".to_string());
    let api = TelegramApi::with_base_url(token.trim(), &api_url);

    match cli.command.unwrap_or(Commands::Get) {
        Commands::Get => {
            let commands = api
                .get_my_commands()
                .await
                .context("Failed to get commands")?;
            if commands.is_empty() {
                println!("No commands set");
            }
            for command in commands {
                println!("/{} - {}", command.command, command.description);
            }
        }
        Commands::Set => {
            let commands = menu();
            api.set_my_commands(&commands)
                .await
                .context("Failed to set commands")?;
            println!("Set {} commands", commands.len());
        }
        Commands::Delete => {
            api.delete_my_commands()
                .await
                .context("Failed to delete commands")?;
            println!("Commands deleted");
        }
    }

    Ok(())
}
