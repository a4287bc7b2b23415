//! Tipsheet CLI entry point.

use clap::Parser;

use tipsheet::cli::{commands, Cli, Commands};
use tipsheet::infrastructure::config::ConfigLoader;
use tipsheet::infrastructure::logging::Logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => tipsheet::cli::handle_error(&err, cli.json),
    };

    // The guard flushes the file appender on drop; keep it for the
    // whole process.
    let _logger = match Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => tipsheet::cli::handle_error(&err, cli.json),
    };

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, cli.json, &config).await,
        Commands::Add(args) => commands::add::execute(args, cli.json, &config).await,
        Commands::List(args) => commands::list::execute(args, cli.json, &config).await,
        Commands::Show(args) => commands::show::execute(args, cli.json, &config).await,
        Commands::Current(args) => commands::current::execute(args, cli.json, &config).await,
        Commands::Delete(args) => commands::delete::execute(args, cli.json, &config).await,
        Commands::Clear(args) => commands::clear::execute(args, cli.json, &config).await,
        Commands::Sync(args) => commands::sync::execute(args, cli.json, &config).await,
        Commands::Stats(args) => commands::stats::execute(args, cli.json, &config).await,
        Commands::Watch(args) => commands::watch::execute(args, cli.json, &config).await,
    };

    if let Err(err) = result {
        tipsheet::cli::handle_error(&err, cli.json);
    }
}
