use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the Retouch binary.
#[derive(Debug, Parser)]
#[command(name = "retouch", version, about = "Retouch inline preview server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "RETOUCH_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP server.
    Serve(Box<ServeArgs>),
    /// Print a stored snapshot as JSON.
    Inspect(InspectArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct StorageOverrides {
    /// Override the bucket holding snapshots.
    #[arg(long = "storage-bucket", value_name = "NAME")]
    pub bucket: Option<String>,

    /// Override the storage region.
    #[arg(long = "storage-region", value_name = "REGION")]
    pub region: Option<String>,

    /// Override the endpoint of an S3-compatible service.
    #[arg(long = "storage-endpoint", value_name = "URL")]
    pub endpoint: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub storage: StorageOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Mark the preview cookie `Secure`.
    #[arg(
        long = "preview-cookie-secure",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub preview_cookie_secure: Option<bool>,

    /// Override how long a preview cookie lives.
    #[arg(long = "preview-max-age-seconds", value_name = "SECONDS")]
    pub preview_max_age_seconds: Option<u64>,

    /// Override the maximum size of a share request body.
    #[arg(long = "share-max-request-bytes", value_name = "BYTES")]
    pub share_max_request_bytes: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub storage: StorageOverrides,

    /// Identifier returned when the snapshot was shared.
    #[arg(value_name = "SNAPSHOT_ID")]
    pub snapshot_id: String,
}
