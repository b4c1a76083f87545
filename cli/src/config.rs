use anyhow::Context;
use belay::prelude::*;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr};

/// This is first loaded via the filepath (./cli/config/belay.toml by default, settable via CLI arg --config)
/// Then, the .env file is loaded if specified in the `dotenv` field
/// Finally, any env vars are loaded, overwriting any previous values if found
/// For the environment variables, the prefix `BELAY_` is used and the field name in all caps
/// For example, the field `log_level` would be set by the env var `BELAY_LOG_LEVEL`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConfigInit {
    pub dotenv: Option<PathBuf>,
    pub log_level: LogLevel,
    pub chain_id: ChainId,
    pub rpc_endpoint: Option<String>,
    pub grpc_endpoint: Option<String>,
    pub bech32_prefix: String,
    /// "grpc" or "rpc", if unset the client tries gRPC first
    pub connection_mode: Option<String>,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub tx_search: TxSearchConfig,
}

// This is simply derived from ConfigInit in a format that's more reasonable to pass around
#[derive(Debug, Clone)]
pub struct Config {
    pub tracing_level: tracing::Level,
    pub chain_config: ChainConfig,
    pub query_config: QueryConfig,
    pub connection_mode: Option<ConnectionMode>,
}

impl ConfigInit {
    pub async fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let s = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("couldn't read config at {}", path.display()))?;

        Self::load_inner(&s)
    }

    fn load_inner(s: &str) -> anyhow::Result<Self> {
        // first load from the file
        let mut config: Self = toml::from_str(s)?;

        // next load .env file, if specified
        if let Some(dotenv) = &config.dotenv {
            if dotenvy::from_filename(dotenv).is_err() {
                eprintln!("Failed to load .env file");
            }
        }

        // now update from env vars
        config.apply_env(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Unparseable numbers are errors, everything else silently keeps the file's value
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(log_level) = var("BELAY_LOG_LEVEL") {
            self.log_level = log_level.parse().unwrap_or(self.log_level);
        }

        if let Some(chain_id) = var("BELAY_CHAIN_ID") {
            self.chain_id = ChainId::new(chain_id);
        }

        if let Some(rpc_endpoint) = var("BELAY_RPC_ENDPOINT") {
            self.rpc_endpoint = Some(rpc_endpoint);
        }

        if let Some(grpc_endpoint) = var("BELAY_GRPC_ENDPOINT") {
            self.grpc_endpoint = Some(grpc_endpoint);
        }

        if let Some(bech32_prefix) = var("BELAY_BECH32_PREFIX") {
            self.bech32_prefix = bech32_prefix;
        }

        if let Some(connection_mode) = var("BELAY_CONNECTION_MODE") {
            self.connection_mode = Some(connection_mode);
        }

        if let Some(page_limit) = var("BELAY_PAGE_LIMIT") {
            self.pagination.page_limit = page_limit
                .parse()
                .context("Failed to parse BELAY_PAGE_LIMIT")?;
        }

        if let Some(max_pages) = var("BELAY_MAX_PAGES") {
            self.pagination.max_pages = max_pages
                .parse()
                .context("Failed to parse BELAY_MAX_PAGES")?;
        }

        if let Some(max_items) = var("BELAY_MAX_ITEMS") {
            self.pagination.max_items = max_items
                .parse()
                .context("Failed to parse BELAY_MAX_ITEMS")?;
        }

        if let Some(timeout) = var("BELAY_PAGE_TIMEOUT_MS") {
            self.pagination.page_timeout_ms = Some(
                timeout
                    .parse()
                    .context("Failed to parse BELAY_PAGE_TIMEOUT_MS")?,
            );
        }

        if let Some(timeout) = var("BELAY_TOTAL_TIMEOUT_MS") {
            self.pagination.total_timeout_ms = Some(
                timeout
                    .parse()
                    .context("Failed to parse BELAY_TOTAL_TIMEOUT_MS")?,
            );
        }

        if let Some(per_page) = var("BELAY_TX_PER_PAGE") {
            self.tx_search.per_page = per_page
                .parse()
                .context("Failed to parse BELAY_TX_PER_PAGE")?;
        }

        Ok(())
    }
}

impl TryFrom<ConfigInit> for Config {
    type Error = anyhow::Error;

    fn try_from(config: ConfigInit) -> anyhow::Result<Self> {
        let chain_config = ChainConfig {
            chain_id: config.chain_id,
            rpc_endpoint: config.rpc_endpoint,
            grpc_endpoint: config.grpc_endpoint,
            grpc_web_endpoint: None,
            bech32_prefix: config.bech32_prefix,
        };
        chain_config.validate()?;

        let query_config = QueryConfig {
            pagination: config.pagination,
            tx_search: config.tx_search,
        };
        query_config.tx_search.validate()?;

        let connection_mode = config
            .connection_mode
            .as_deref()
            .map(ConnectionMode::from_str)
            .transpose()?;

        Ok(Self {
            tracing_level: tracing::Level::from(config.log_level),
            chain_config,
            query_config,
            connection_mode,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = include_str!("../config/belay.toml");

    fn sample() -> ConfigInit {
        let mut config: ConfigInit = toml::from_str(SAMPLE).unwrap();
        config.dotenv = None;
        config
    }

    #[test]
    fn sample_config_converts() {
        let config = Config::try_from(sample()).unwrap();

        assert_eq!(config.chain_config.chain_id.as_str(), "pion-1");
        assert_eq!(config.connection_mode, Some(ConnectionMode::Rpc));
        assert_eq!(config.query_config.pagination.max_pages, 10_000);
        assert_eq!(
            config.query_config.tx_search.strategies,
            vec![
                TxQueryStrategy::WasmContractAddress,
                TxQueryStrategy::MessageContractAddress,
                TxQueryStrategy::WasmModuleMessage,
            ]
        );
        assert_eq!(config.tracing_level, tracing::Level::INFO);
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("BELAY_LOG_LEVEL", "debug"),
            ("BELAY_MAX_PAGES", "3"),
            ("BELAY_CONNECTION_MODE", "grpc"),
            ("BELAY_GRPC_ENDPOINT", "http://localhost:9090"),
        ]);

        let mut config = sample();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        let config = Config::try_from(config).unwrap();
        assert_eq!(config.tracing_level, tracing::Level::DEBUG);
        assert_eq!(config.query_config.pagination.max_pages, 3);
        assert_eq!(config.connection_mode, Some(ConnectionMode::Grpc));
        assert_eq!(
            config.chain_config.grpc_endpoint.as_deref(),
            Some("http://localhost:9090")
        );
    }

    #[test]
    fn bad_numbers_are_errors() {
        let mut config = sample();
        let res = config.apply_env(|key| (key == "BELAY_MAX_ITEMS").then(|| "lots".to_string()));
        assert!(res.is_err());
    }

    #[test]
    fn out_of_range_per_page_is_rejected() {
        let mut config = sample();
        config.tx_search.per_page = 0;
        assert!(Config::try_from(config).is_err());
    }
}
