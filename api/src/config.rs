//! Configuration for the prison management API

use clap::{Parser, ValueEnum};

pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Which document store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// NATS JetStream key-value bucket
    Jetstream,
    /// Process-local map; data is lost on exit
    Memory,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "prisonman-api")]
#[command(about = "REST API for cell blocks, cells, inmates, staff and visitors")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// Document store backend
    #[arg(
        long = "store",
        env = "STORE_BACKEND",
        value_enum,
        default_value_t = StoreBackend::Jetstream
    )]
    pub store_backend: StoreBackend,

    /// NATS server URL
    #[arg(long, env = "NATS_URL", default_value = "nats://127.0.0.1:4222")]
    pub nats_url: String,

    /// Path to NATS credentials file
    #[arg(long, env = "NATS_CREDS_PATH")]
    pub nats_creds_path: Option<String>,

    /// JetStream KV bucket holding all records
    #[arg(long, env = "PRISONMAN_KV_BUCKET", default_value = "prisonman")]
    pub kv_bucket: String,

    /// Front-end origin allowed to call the API cross-origin
    #[arg(long, env = "CORS_ORIGIN", default_value = DEFAULT_CORS_ORIGIN)]
    pub cors_origin: String,

    /// Retries for a cell write that lost a race with another request
    #[arg(long, env = "OCCUPANCY_RETRY_LIMIT", default_value_t = custody::DEFAULT_RETRY_LIMIT)]
    pub occupancy_retry_limit: u32,

    /// Output logs in JSON format
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl Config {
    /// Parse configuration from command-line args and environment variables
    pub fn parse_config() -> Self {
        Config::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_flags() {
        let config = Config::try_parse_from([
            "prisonman-api",
            "--bind-addr",
            "127.0.0.1:9000",
            "--store",
            "memory",
            "--kv-bucket",
            "prison_test",
            "--cors-origin",
            "https://prison.example",
            "--occupancy-retry-limit",
            "2",
            "--log-json",
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.kv_bucket, "prison_test");
        assert_eq!(config.cors_origin, "https://prison.example");
        assert_eq!(config.occupancy_retry_limit, 2);
        assert!(config.log_json);
    }

    #[test]
    fn test_unknown_store_backend_is_rejected() {
        let result = Config::try_parse_from(["prisonman-api", "--store", "mongo"]);
        assert!(result.is_err());
    }
}
