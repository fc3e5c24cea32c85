use clap::{Parser, Subcommand};

use crate::config::BotConfig;
use crate::error::CycleError;
use crate::runtime;
use crate::tasks::check_loop::CheckOutcome;

#[derive(Parser)]
#[command(about = "Announces calendar feed changes to a Discord channel")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Check on a fixed interval until interrupted
    Run,
    /// Run a single check and exit
    Once,
    /// Print the pending announcement without sending or saving anything
    Preview,
}

pub async fn cli(cli: Cli, config: BotConfig) -> Result<(), CycleError> {
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => runtime::run_bot(config).await,
        Commands::Once => {
            match runtime::run_once(config).await? {
                CheckOutcome::Unchanged => println!("No calendar changes."),
                CheckOutcome::Announced(changes) => {
                    println!("Announced {} change(s).", changes.len())
                }
            }
            Ok(())
        }
        Commands::Preview => {
            match runtime::run_preview(config).await? {
                Some(message) => println!("{}", message),
                None => println!("No calendar changes."),
            }
            Ok(())
        }
    }
}
