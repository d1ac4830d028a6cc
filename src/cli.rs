use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "countries-etl")]
#[command(version, about = "Normalize REST Countries data into a SQLite star schema")]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides it
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Upstream connection options
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Countries API endpoint (without the field selection)
    #[arg(long, env = "COUNTRIES_API_URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "COUNTRIES_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    /// Custom cache directory for raw snapshots
    #[arg(short, long, env = "COUNTRIES_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, normalize and load into SQLite
    Sync {
        /// Output SQLite database path
        #[arg(env = "COUNTRIES_DB")]
        output_db: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,

        /// Emit the run summary and skipped records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download the raw country records
    Fetch {
        /// Write the records here instead of the cache directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Load a local JSON snapshot into SQLite
    Load {
        /// Output SQLite database path
        output_db: PathBuf,

        /// JSON array of country records (default: cached snapshot)
        input: Option<PathBuf>,

        /// Custom cache directory for raw snapshots
        #[arg(short, long, env = "COUNTRIES_CACHE_DIR")]
        cache_dir: Option<PathBuf>,

        /// Emit the run summary and skipped records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the countries_summary view
    Summary {
        /// SQLite database path
        db: PathBuf,

        /// Only show countries in this region
        #[arg(short, long)]
        region: Option<String>,

        /// List the available regions instead
        #[arg(long, conflicts_with = "region")]
        regions: bool,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List all table names
    ListTables,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_flags() {
        let cli = Cli::try_parse_from(["countries-etl", "summary", "c.db", "--region", "Europe"]).unwrap();
        match cli.command {
            Commands::Summary { db, region, regions, json } => {
                assert_eq!(db, PathBuf::from("c.db"));
                assert_eq!(region.as_deref(), Some("Europe"));
                assert!(!regions);
                assert!(!json);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let conflict = Cli::try_parse_from(["countries-etl", "summary", "c.db", "-r", "Asia", "--regions"]);
        assert!(conflict.is_err());
    }

    #[test]
    fn test_load_with_input() {
        let cli = Cli::try_parse_from(["countries-etl", "--log-level", "debug", "load", "c.db", "raw.json", "--json"]).unwrap();
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Commands::Load { output_db, input, json, .. } => {
                assert_eq!(output_db, PathBuf::from("c.db"));
                assert_eq!(input, Some(PathBuf::from("raw.json")));
                assert!(json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
