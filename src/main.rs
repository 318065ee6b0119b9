mod cli;
mod custodians;
mod detector;
mod error;
mod export;
mod fmt;
mod logging;
mod mapper;
mod models;
mod portfolio;
mod settings;
mod tokenizer;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let settings = settings::load_settings();
    logging::init_logging(cli.verbose, &settings.log_level);

    let result = match cli.command {
        Commands::Init {
            auto_accept,
            sample_rows,
            log_level,
        } => cli::init::run(settings, auto_accept, sample_rows, log_level),
        Commands::Custodians => cli::custodians::run(),
        Commands::Detect { file } => cli::detect::run(&file, &settings),
        Commands::Import {
            file,
            map,
            custodian,
            force,
            json,
            output,
        } => cli::import::run(
            &file,
            &settings,
            &map,
            custodian.as_deref(),
            force,
            json,
            output.as_deref(),
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
