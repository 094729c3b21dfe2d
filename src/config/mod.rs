pub mod cli;
pub mod settings;
pub mod toml_config;

use crate::utils::logger::LogFormat;
use clap::Parser;
use std::path::PathBuf;

/// Command-line surface. Every setting left unset here falls back to the
/// config file and then to the built-in default, see [`settings::SyncSettings`].
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "price-sync")]
#[command(about = "Upload a local JSON document to a remote JSON bin with a single PUT")]
pub struct CliConfig {
    #[arg(long, env = "PRICE_SYNC_CONFIG", help = "TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "PRICE_SYNC_INPUT", help = "JSON document to upload [default: prices.json]")]
    pub input: Option<String>,

    #[arg(long, env = "PRICE_SYNC_KEY_FILE", help = "File holding the access key [default: apikeys]")]
    pub key_file: Option<String>,

    #[arg(long, env = "PRICE_SYNC_ENDPOINT", help = "Bin URL to PUT the document to")]
    pub endpoint: Option<String>,

    #[arg(
        long,
        env = "PRICE_SYNC_ACCESS_KEY_HEADER",
        help = "Header carrying the access key [default: X-Access-Key]"
    )]
    pub access_key_header: Option<String>,

    #[arg(long, env = "PRICE_SYNC_TIMEOUT_SECONDS", help = "Request deadline [default: 30]")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Print a machine-readable JSON report on stdout")]
    pub json: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
