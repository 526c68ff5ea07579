use anyhow::{Context, Result};
use clap::Parser;

use dishbrain::{
    cli_types::{Cli, Commands},
    logging, CliApp, DishbrainConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = DishbrainConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    let _guard = logging::init_logging(&config.logging)?;

    let app = CliApp::new(config, cli.verbose, !cli.no_color)?;

    match cli.command {
        Commands::List(args) => app.list(args).await,
        Commands::Search(args) => app.search(args).await,
        Commands::Show(args) => app.show(args).await,
        Commands::News(args) => app.news(args).await,
        Commands::Photo(args) => app.photo(args).await,
        Commands::Config => app.show_config().await,
    }
}
