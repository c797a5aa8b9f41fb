//! delegate - bounded task-agent delegation.
//!
//! Main entry point for the delegate CLI.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use delegate_config::{ConfigLoader, ConfigValidator};

mod cli;
mod cmd_config;
mod cmd_run;
mod console;
mod logging;

use cli::{Cli, Commands};
use console::ConsoleStatusObserver;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckConfig => {
            cmd_config::check_config(cli.config.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run(args) => {
            let config = ConfigLoader::load_or_default(cli.config.as_deref())?;
            let warnings = ConfigValidator::ensure_valid(&config)?;
            let _guard = logging::init_tracing(&config.logging)?;
            for warning in warnings {
                warn!("Config: {}", warning);
            }

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupted, cancelling sub-agent");
                    on_interrupt.cancel();
                }
            });

            let outcome =
                cmd_run::run_delegation(&config, &args, Arc::new(ConsoleStatusObserver), cancel)
                    .await?;
            println!("{}", outcome.to_message().content);

            Ok(if outcome.ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
