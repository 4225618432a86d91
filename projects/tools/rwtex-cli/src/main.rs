#![allow(unexpected_cfgs)]
#![cfg(not(tarpaulin_include))]

mod commands;
mod error;
mod util;

use argh::FromArgs;
use std::error::Error;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs, Debug)]
/// Inspect and convert native texture files.
struct TopLevel {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
enum Commands {
    Inspect(commands::inspect::InspectCmd),
    Convert(commands::convert::ConvertCmd),
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli: TopLevel = argh::from_env();
    match cli.command {
        Commands::Inspect(cmd) => commands::inspect::handle_inspect_command(cmd)?,
        Commands::Convert(cmd) => commands::convert::handle_convert_command(cmd)?,
    }

    Ok(())
}
