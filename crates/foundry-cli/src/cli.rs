//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Foundry CLI - Extract AI-in-manufacturing use cases from news articles.
#[derive(Debug, Parser)]
#[command(name = "foundry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (titles or counts only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract and publish use cases for a batch of articles
    Run(RunArgs),

    /// Extract the use case of a single article without publishing
    Extract(ExtractArgs),

    /// Parse a saved model reply offline
    Parse(ParseArgs),

    /// Print the effective configuration
    Config(ConfigArgs),
}

/// Where `run` publishes use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SinkKind {
    /// Local SQLite archive
    Sqlite,
    /// Notion database
    Notion,
}

/// Model provider credentials.
#[derive(Debug, Clone, clap::Args)]
pub struct ModelSecrets {
    /// OpenRouter API key
    #[arg(long, env = "OPENROUTER_KEY", hide_env_values = true)]
    pub openrouter_key: Option<String>,
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// JSON array of articles (title, url, text or summary/content, published);
    /// the configured feeds are read when omitted
    #[arg(short, long)]
    pub articles: Option<PathBuf>,

    /// Publishing target
    #[arg(long, value_enum, default_value = "sqlite")]
    pub sink: SinkKind,

    /// SQLite archive path
    #[arg(long)]
    pub db: Option<PathBuf>,

    #[command(flatten)]
    pub secrets: ModelSecrets,

    /// Notion integration token
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    pub notion_token: Option<String>,

    /// Notion database id
    #[arg(long, env = "NOTION_DATABASE_ID")]
    pub notion_database_id: Option<String>,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// File holding the article body (plain text or HTML)
    #[arg(short = 'i', long)]
    pub file: Option<PathBuf>,

    /// Read the article body from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Article headline
    #[arg(short, long)]
    pub title: String,

    /// Article URL
    #[arg(short, long)]
    pub url: String,

    /// Publication time (RFC 3339 or RFC 2822)
    #[arg(short, long)]
    pub published: Option<String>,

    #[command(flatten)]
    pub secrets: ModelSecrets,
}

/// Arguments for the parse command.
#[derive(Debug, Parser)]
pub struct ParseArgs {
    /// File holding a raw model reply
    #[arg(short = 'i', long)]
    pub file: Option<PathBuf>,

    /// Read the reply from stdin
    #[arg(long)]
    pub stdin: bool,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Write the effective configuration to the config file
    #[arg(long)]
    pub save: bool,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command() {
        let cli = Cli::try_parse_from([
            "foundry",
            "run",
            "--articles",
            "feed.json",
            "--sink",
            "notion",
            "--openrouter-key",
            "k",
        ])
        .unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.articles, Some(PathBuf::from("feed.json")));
                assert_eq!(args.sink, SinkKind::Notion);
                assert_eq!(args.secrets.openrouter_key.as_deref(), Some("k"));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_defaults_to_sqlite() {
        let cli = Cli::try_parse_from(["foundry", "run", "-a", "feed.json"]).unwrap();
        match cli.command {
            Command::Run(args) => assert_eq!(args.sink, SinkKind::Sqlite),
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_without_articles_reads_feeds() {
        let cli = Cli::try_parse_from(["foundry", "run"]).unwrap();
        match cli.command {
            Command::Run(args) => assert!(args.articles.is_none()),
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_extract_requires_title_and_url() {
        assert!(Cli::try_parse_from(["foundry", "extract", "--stdin"]).is_err());
        let cli = Cli::try_parse_from([
            "foundry", "extract", "--stdin", "-t", "Headline", "-u", "https://x.test/a",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Extract(ref a) if a.stdin));
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "foundry",
            "parse",
            "--stdin",
            "-vv",
            "--no-color",
            "-f",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_color);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
    }
}
