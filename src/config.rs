//! Server configuration.
//!
//! # Example
//!
//! ```
//! use neuronkv::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::default()
//!     .with_port(6000)
//!     .with_sweep_interval(Duration::from_secs(5));
//! assert_eq!(config.bind_address(), "127.0.0.1:6000");
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while reading configuration from the command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },

    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

/// What the command line asked for.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Start the server with this configuration
    Run(ServerConfig),
    /// Print usage and exit
    Help,
    /// Print the version and exit
    Version,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Time between value/analytics snapshots (default: 60 seconds)
    pub snapshot_interval: Duration,
    /// Time between expired-key sweeps (default: 60 seconds)
    pub sweep_interval: Duration,
    /// Where the value snapshot is written and restored from
    pub snapshot_path: PathBuf,
    /// Where the analytics snapshot is written
    pub analytics_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: crate::DEFAULT_HOST.to_string(),
            port: crate::DEFAULT_PORT,
            snapshot_interval: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(60),
            snapshot_path: PathBuf::from("neuronus_local_store.rdb"),
            analytics_path: PathBuf::from("generated_analytics.json"),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_snapshot_interval(mut self, interval: Duration) -> Self {
        self.snapshot_interval = interval;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }

    pub fn with_analytics_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.analytics_path = path.into();
        self
    }

    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses command-line arguments, not including the program name.
    pub fn from_args<I>(args: I) -> Result<CliAction, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = ServerConfig::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--host" | "-h" => config.host = value_for(&arg, args.next())?,
                "--port" | "-p" => config.port = parse_value(&arg, args.next())?,
                "--snapshot-interval" => {
                    config.snapshot_interval = seconds_value(&arg, args.next())?
                }
                "--sweep-interval" => config.sweep_interval = seconds_value(&arg, args.next())?,
                "--snapshot-file" => {
                    config.snapshot_path = PathBuf::from(value_for(&arg, args.next())?)
                }
                "--analytics-file" => {
                    config.analytics_path = PathBuf::from(value_for(&arg, args.next())?)
                }
                "--help" => return Ok(CliAction::Help),
                "--version" | "-v" => return Ok(CliAction::Version),
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        Ok(CliAction::Run(config))
    }
}

fn value_for(flag: &str, value: Option<String>) -> Result<String, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, ConfigError> {
    let value = value_for(flag, value)?;
    value.parse().map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_string(),
        value,
    })
}

/// Parses a positive whole number of seconds.
fn seconds_value(flag: &str, value: Option<String>) -> Result<Duration, ConfigError> {
    let secs: u64 = parse_value(flag, value.clone())?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            flag: flag.to_string(),
            value: value.unwrap_or_default(),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Usage text for `--help`.
pub const USAGE: &str = r#"
NeuronKV - A minimal networked key-value store

USAGE:
    neuronkv [OPTIONS]

OPTIONS:
    -h, --host <HOST>                 Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>                 Port to listen on (default: 5002)
        --snapshot-interval <SECS>    Seconds between snapshots (default: 60)
        --sweep-interval <SECS>       Seconds between expiry sweeps (default: 60)
        --snapshot-file <PATH>        Value snapshot file (default: neuronus_local_store.rdb)
        --analytics-file <PATH>       Analytics snapshot file (default: generated_analytics.json)
    -v, --version                     Print version information
        --help                        Print this help message

COMMANDS:
    SET <key> <value>       ->  OK
    GET <key>               ->  <value> | nil
    DEL <key>               ->  1 | 0
    EXPIRE <key> <seconds>  ->  1 | 0
"#;
