//! savestate - drive a demo save file through its lifecycle.

mod game;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use savestate_core::paths;

use crate::session::{CliError, Session};

const APP_NAME: &str = "savestate";

#[derive(Parser, Debug)]
#[command(name = "savestate")]
#[command(about = "Create, inspect, and reset a savestate save file", long_about = None)]
struct Cli {
    /// Save file to use (defaults to the user data directory)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a new game and save it
    New {
        /// Player name for the new game
        #[arg(long, default_value = "hero")]
        name: String,
    },
    /// Print the current save as JSON
    Show,
    /// Award gold and items, then save
    Play {
        #[arg(long, default_value_t = 0)]
        gold: u64,
        /// Item to add (repeatable)
        #[arg(long = "item")]
        items: Vec<String>,
    },
    /// Clear the save
    Delete,
    /// Print the save file location
    Path,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let path = match cli.file {
        Some(path) => path,
        None => paths::default_save_path(APP_NAME).map_err(CliError::Path)?,
    };

    match cli.command {
        Command::New { name } => {
            Session::open(&path, &name)?.new_game()?;
            println!("New game saved to {}", path.display());
        }
        Command::Show => {
            let json = Session::open(&path, "hero")?.show()?;
            println!("{json}");
        }
        Command::Play { gold, items } => {
            Session::open(&path, "hero")?.play(gold, &items)?;
            println!("Progress saved to {}", path.display());
        }
        Command::Delete => {
            Session::open(&path, "hero")?.delete()?;
            println!("Save cleared at {}", path.display());
        }
        Command::Path => println!("{}", path.display()),
    }

    Ok(())
}
