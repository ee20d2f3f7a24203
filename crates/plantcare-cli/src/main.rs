//! Plantcare CLI - a CLI-first plant care tracker.
//!
//! Command-line interface over the plantcare-core library: plant and
//! catalog management, the care calendar, sensor ingestion, and
//! administration.

mod app;
mod cli;
mod commands;
mod config;
mod helpers;
mod output;

use clap::{CommandFactory, Parser};
use clap_complete::generate;

use plantcare_core::VERSION;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    match &cli.command {
        Some(Commands::Init(args)) => commands::init::run(&ctx, args),
        Some(Commands::User { command }) => commands::users::run(&ctx, command),
        Some(Commands::Type { command }) => commands::types::run(&ctx, command),
        Some(Commands::Plant { command }) => commands::plants::run(&ctx, command),
        Some(Commands::Care { command }) => commands::care::run(&ctx, command),
        Some(Commands::Sensor { command }) => commands::sensors::run(&ctx, command),
        Some(Commands::Admin { command }) => commands::admin::run(&ctx, command),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "plantcare", &mut std::io::stdout());
            Ok(())
        }
        None => {
            println!("Plantcare v{}", VERSION);
            println!("\nRun `plantcare --help` for usage information.");
            Ok(())
        }
    }
}
