use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Rule engine configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "verdikt")]
#[command(about = "Streaming rule-evaluation engine for financial transactions")]
pub struct Config {
    /// HTTP server listen address
    #[arg(long, default_value = "0.0.0.0:8080", env = "VERDIKT_LISTEN_ADDR")]
    pub listen_addr: String,

    /// Number of evaluation workers (transaction stream partitions)
    #[arg(long, default_value = "4", env = "VERDIKT_WORKERS")]
    pub workers: usize,

    /// Buffered rule updates per replica on the broadcast bus
    #[arg(long, default_value = "64", env = "VERDIKT_BUS_CAPACITY")]
    pub bus_capacity: usize,

    /// Per-worker transaction intake capacity before backpressure
    #[arg(long, default_value = "256", env = "VERDIKT_INTAKE_CAPACITY")]
    pub intake_capacity: usize,

    /// Verdict stream capacity
    #[arg(long, default_value = "1024", env = "VERDIKT_VERDICT_CAPACITY")]
    pub verdict_capacity: usize,

    /// Path to a YAML seed rules file published at startup (optional)
    #[arg(long, env = "VERDIKT_RULES_PATH")]
    pub rules_path: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Enable graceful shutdown
    #[arg(long, default_value = "true", env = "VERDIKT_GRACEFUL_SHUTDOWN")]
    pub graceful_shutdown: bool,

    /// Graceful shutdown timeout in seconds
    #[arg(long, default_value = "30", env = "VERDIKT_SHUTDOWN_TIMEOUT_SECS")]
    pub shutdown_timeout_secs: u64,
}

impl Config {
    /// Get shutdown timeout as Duration.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: "0.0.0.0:8080".to_string(),
            workers: 4,
            bus_capacity: 64,
            intake_capacity: 256,
            verdict_capacity: 1024,
            rules_path: None,
            log_level: "info".to_string(),
            graceful_shutdown: true,
            shutdown_timeout_secs: 30,
        }
    }
}
