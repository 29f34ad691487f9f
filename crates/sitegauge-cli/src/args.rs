use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "sitegauge",
    version,
    about = "Renewable-energy site assessment normalizer and resolver"
)]
pub struct Args {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize a raw analysis document into the canonical shape
    Normalize {
        /// Path to the analysis JSON, or `-` for stdin
        input: PathBuf,

        /// Timestamp to stamp on documents that carry none (RFC 3339)
        #[arg(long)]
        now: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Resolve a catalog site: embedded analysis, then cache, then API
    Site {
        /// Site id as listed by `sitegauge catalog`
        id: String,

        #[arg(long)]
        catalog: PathBuf,

        #[command(flatten)]
        remote: RemoteArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Assess an arbitrary point through the API
    Point {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Snap to a catalog site lying within ~110 m of the point
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[command(flatten)]
        remote: RemoteArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List the sites in a catalog
    Catalog {
        #[arg(long)]
        catalog: PathBuf,

        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, ClapArgs)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, default_value = "json")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Settings for the assessment service and the local analysis cache.
#[derive(Debug, ClapArgs)]
pub struct RemoteArgs {
    /// Base URL of the assessment API
    #[arg(long, env = "SITEGAUGE_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Directory holding cached analyses
    #[arg(long, env = "SITEGAUGE_CACHE_DIR", default_value = ".sitegauge-cache")]
    pub cache_dir: PathBuf,

    /// Request timeout in seconds
    #[arg(long, env = "SITEGAUGE_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    /// Neither read nor write the analysis cache
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
