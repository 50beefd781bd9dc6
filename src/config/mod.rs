//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{fmt, net::SocketAddr, num::NonZeroU64, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

mod cli;

pub use cli::{CliArgs, Command, InspectArgs, ServeArgs, ServeOverrides, StorageOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "retouch";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_PREVIEW_MAX_AGE_SECS: u64 = 24 * 60 * 60;
const DEFAULT_SHARE_REQUEST_LIMIT_BYTES: u64 = 256 * 1024;
pub(crate) const MIN_PREVIEW_SECRET_BYTES: usize = 32;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub storage: StorageSettings,
    pub preview: PreviewSettings,
    pub share: ShareSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Clone)]
pub struct StorageSettings {
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
}

impl fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSettings")
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Clone)]
pub struct PreviewSettings {
    pub secret: String,
    pub cookie_secure: bool,
    pub max_age: Duration,
}

impl fmt::Debug for PreviewSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewSettings")
            .field("secret", &"<redacted>")
            .field("cookie_secure", &self.cookie_secure)
            .field("max_age", &self.max_age)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ShareSettings {
    pub max_request_bytes: NonZeroU64,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("RETOUCH").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Inspect(args)) => raw.apply_storage_overrides(&args.storage),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    storage: RawStorageSettings,
    preview: RawPreviewSettings,
    share: RawShareSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(secure) = overrides.preview_cookie_secure {
            self.preview.cookie_secure = Some(secure);
        }
        if let Some(seconds) = overrides.preview_max_age_seconds {
            self.preview.max_age_seconds = Some(seconds);
        }
        if let Some(limit) = overrides.share_max_request_bytes {
            self.share.max_request_bytes = Some(limit);
        }

        self.apply_storage_overrides(&overrides.storage);
    }

    fn apply_storage_overrides(&mut self, overrides: &StorageOverrides) {
        if let Some(bucket) = overrides.bucket.as_ref() {
            self.storage.bucket = Some(bucket.clone());
        }
        if let Some(region) = overrides.region.as_ref() {
            self.storage.region = Some(region.clone());
        }
        if let Some(endpoint) = overrides.endpoint.as_ref() {
            self.storage.endpoint = Some(endpoint.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            storage,
            preview,
            share,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            storage: build_storage_settings(storage)?,
            preview: build_preview_settings(preview)?,
            share: build_share_settings(share)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_storage_settings(storage: RawStorageSettings) -> Result<StorageSettings, LoadError> {
    let access_key = required(storage.access_key, "storage.access_key")?;
    let secret_key = required(storage.secret_key, "storage.secret_key")?;
    let bucket = required(storage.bucket, "storage.bucket")?;
    let region = non_blank(storage.region).unwrap_or_else(|| DEFAULT_REGION.to_string());
    let endpoint = non_blank(storage.endpoint);

    if let Some(endpoint) = endpoint.as_ref()
        && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
        return Err(LoadError::invalid(
            "storage.endpoint",
            "endpoint must be an http(s) URL",
        ));
    }

    Ok(StorageSettings {
        access_key,
        secret_key,
        bucket,
        region,
        endpoint,
    })
}

fn build_preview_settings(preview: RawPreviewSettings) -> Result<PreviewSettings, LoadError> {
    let secret = required(preview.secret, "preview.secret")?;
    if secret.len() < MIN_PREVIEW_SECRET_BYTES {
        return Err(LoadError::invalid(
            "preview.secret",
            format!("must be at least {MIN_PREVIEW_SECRET_BYTES} bytes"),
        ));
    }

    let max_age_seconds = preview
        .max_age_seconds
        .unwrap_or(DEFAULT_PREVIEW_MAX_AGE_SECS);
    if max_age_seconds == 0 {
        return Err(LoadError::invalid(
            "preview.max_age_seconds",
            "must be greater than zero",
        ));
    }

    Ok(PreviewSettings {
        secret,
        cookie_secure: preview.cookie_secure.unwrap_or(false),
        max_age: Duration::from_secs(max_age_seconds),
    })
}

fn build_share_settings(share: RawShareSettings) -> Result<ShareSettings, LoadError> {
    let value = share
        .max_request_bytes
        .unwrap_or(DEFAULT_SHARE_REQUEST_LIMIT_BYTES);
    let max_request_bytes = NonZeroU64::new(value).ok_or_else(|| {
        LoadError::invalid("share.max_request_bytes", "must be greater than zero")
    })?;
    usize::try_from(value).map_err(|_| {
        LoadError::invalid(
            "share.max_request_bytes",
            "value exceeds supported range for usize",
        )
    })?;

    Ok(ShareSettings { max_request_bytes })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStorageSettings {
    access_key: Option<String>,
    secret_key: Option<String>,
    bucket: Option<String>,
    region: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPreviewSettings {
    secret: Option<String>,
    cookie_secure: Option<bool>,
    max_age_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawShareSettings {
    max_request_bytes: Option<u64>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn required(value: Option<String>, key: &'static str) -> Result<String, LoadError> {
    non_blank(value).ok_or_else(|| LoadError::invalid(key, "must be set"))
}
