use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::types::Availability;

#[derive(Parser)]
#[command(name = "dishbrain")]
#[command(about = "Browse and search the Dishbrain AI expert directory")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to dishbrain.toml or the user config dir)
    #[arg(short, long, global = true, env = "DISHBRAIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging and timing output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List experts in roster order
    List(ListArgs),
    /// Search experts by text and facets
    Search(SearchArgs),
    /// Show one expert
    Show(ShowArgs),
    /// Look up recent news about a person
    News(NewsArgs),
    /// Look up a profile photo for a person
    Photo(PhotoArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Number of experts to list (defaults to the initial chunk size)
    #[arg(short, long)]
    pub limit: Option<usize>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Free-text query; empty matches everyone
    #[arg(default_value = "")]
    pub query: String,

    /// Expertise tags, exact match (repeat or comma-separate)
    #[arg(short, long, value_delimiter = ',')]
    pub expertise: Vec<String>,

    /// City contained in the institution name
    #[arg(short = 'L', long)]
    pub location: Option<String>,

    #[arg(short, long)]
    pub availability: Option<Availability>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct ShowArgs {
    pub id: String,

    /// Also fetch recent news
    #[arg(long)]
    pub news: bool,

    /// Also look up a profile photo when the expert has none
    #[arg(long)]
    pub photo: bool,
}

#[derive(Args)]
pub struct NewsArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub company: String,

    #[arg(long)]
    pub linkedin: Option<String>,
}

#[derive(Args)]
pub struct PhotoArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub company: String,

    #[arg(long)]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_command() {
        let cli = Cli::try_parse_from([
            "dishbrain",
            "search",
            "learning",
            "--expertise",
            "Machine Learning,NLP",
            "-L",
            "Berlin",
            "--availability",
            "this_week",
        ])
        .unwrap();

        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.query, "learning");
                assert_eq!(args.expertise, vec!["Machine Learning", "NLP"]);
                assert_eq!(args.location.as_deref(), Some("Berlin"));
                assert_eq!(args.availability, Some(Availability::ThisWeek));
                assert_eq!(args.format, OutputFormat::Table);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["dishbrain", "list", "--limit", "5", "-v", "--config", "x.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Commands::List(ListArgs { limit: Some(5), .. })));
    }

    #[test]
    fn test_unknown_availability_is_rejected() {
        let result = Cli::try_parse_from(["dishbrain", "search", "--availability", "someday"]);
        assert!(result.is_err());
    }
}
