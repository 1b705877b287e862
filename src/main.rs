use clap::{Parser, Subcommand};
use colflow::{FlowScript, ReplayError, replay};
use std::path::PathBuf;

/// Distributes recorded layout flows into columns and pages.
#[derive(Parser, Debug)]
#[command(name = "colflow", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a flow script and print the resulting rows and columns as JSON
    Replay {
        /// Path to the flow script
        script: PathBuf,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> Result<(), ReplayError> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Replay { script, pretty } => {
            log::info!("Loading script from {}", script.display());
            let script = FlowScript::from_file(&script)?;
            let report = replay(&script)?;
            println!("{}", report.to_json(pretty)?);
        }
    }

    Ok(())
}
