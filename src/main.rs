use std::path::PathBuf;

use clap::Parser;
use trail::cli::commands::{Cli, Commands};
use trail::cli::handlers;
use trail::io::config_io;
use trail::util::logging::{self, LogDestination};

fn main() {
    let cli = Cli::parse();

    let dir = match cli.config_dir.as_deref() {
        Some(d) => PathBuf::from(d),
        None => PathBuf::from("."),
    };
    let config = match config_io::read_config(&dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    let level = logging::level_for(&config.log_level, cli.verbose);

    match cli.command {
        None | Some(Commands::Tui) => {
            // The terminal belongs to the UI, so logs go to a file
            let log_path = config_io::resolve(&dir, "trail.log");
            logging::initialize(LogDestination::File(log_path), level);
            if let Err(e) = trail::tui::run(&dir, config, cli.tab.as_deref()) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(command) => {
            logging::initialize(LogDestination::Terminal, level);
            if let Err(e) = handlers::dispatch(command, &dir, config, cli.tab.as_deref(), cli.json)
            {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
