use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::BelayConfigError;

const DEFAULT_PAGE_LIMIT: u64 = 100;
const DEFAULT_MAX_PAGES: u32 = 10_000;
const DEFAULT_MAX_ITEMS: u64 = 1_000_000;

/// Bounds for driving a paginated source to completion.
///
/// `max_pages` and `max_items` are always enforced, a source that keeps
/// handing out continuation keys past either cap fails the aggregation
/// instead of being silently truncated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PaginationConfig {
    /// requested page size for key-paginated module queries
    pub page_limit: u64,
    pub max_pages: u32,
    pub max_items: u64,
    pub page_timeout_ms: Option<u64>,
    pub total_timeout_ms: Option<u64>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            max_pages: DEFAULT_MAX_PAGES,
            max_items: DEFAULT_MAX_ITEMS,
            page_timeout_ms: None,
            total_timeout_ms: None,
        }
    }
}

impl PaginationConfig {
    pub fn page_timeout(&self) -> Option<Duration> {
        self.page_timeout_ms.map(Duration::from_millis)
    }

    pub fn total_timeout(&self) -> Option<Duration> {
        self.total_timeout_ms.map(Duration::from_millis)
    }
}

/// How a contract's transactions are found through `tx_search`.
///
/// Nodes index contract executions under different event keys depending on
/// the chain's wasmd version, so callers list the ones to try, in order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TxQueryStrategy {
    /// `wasm._contract_address='<addr>'`
    WasmContractAddress,
    /// `message.contract_address='<addr>'`
    MessageContractAddress,
    /// `message.module='wasm' AND message.contract_address='<addr>'`
    WasmModuleMessage,
}

impl TxQueryStrategy {
    pub fn event_key(&self) -> &'static str {
        match self {
            Self::WasmContractAddress => "wasm._contract_address",
            Self::MessageContractAddress | Self::WasmModuleMessage => "message.contract_address",
        }
    }

    pub fn query(&self, contract_address: &str) -> String {
        let query = format!("{}='{}'", self.event_key(), contract_address);
        match self {
            Self::WasmModuleMessage => format!("message.module='wasm' AND {query}"),
            _ => query,
        }
    }
}

impl std::fmt::Display for TxQueryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WasmModuleMessage => write!(f, "message.module+{}", self.event_key()),
            _ => write!(f, "{}", self.event_key()),
        }
    }
}

impl std::str::FromStr for TxQueryStrategy {
    type Err = BelayConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wasm_contract_address" | "wasm._contract_address" => Ok(Self::WasmContractAddress),
            "message_contract_address" | "message.contract_address" => {
                Ok(Self::MessageContractAddress)
            }
            "wasm_module_message" | "message.module" => Ok(Self::WasmModuleMessage),
            _ => Err(BelayConfigError::Other(format!(
                "unknown tx query strategy: {s}"
            ))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TxOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TxSearchConfig {
    pub per_page: u8,
    pub order: TxOrder,
    pub strategies: Vec<TxQueryStrategy>,
    pub with_block_time: bool,
    /// pause between block lookups when resolving block times
    pub block_time_delay_ms: u64,
}

impl Default for TxSearchConfig {
    fn default() -> Self {
        Self {
            per_page: 50,
            order: TxOrder::Desc,
            strategies: vec![
                TxQueryStrategy::WasmContractAddress,
                TxQueryStrategy::MessageContractAddress,
                TxQueryStrategy::WasmModuleMessage,
            ],
            with_block_time: false,
            block_time_delay_ms: 40,
        }
    }
}

impl TxSearchConfig {
    /// CometBFT caps `per_page` at 100
    pub const MAX_PER_PAGE: u8 = 100;

    pub fn validate(&self) -> Result<(), BelayConfigError> {
        if self.per_page == 0 || self.per_page > Self::MAX_PER_PAGE {
            return Err(BelayConfigError::InvalidPerPage(self.per_page));
        }
        if self.strategies.is_empty() {
            return Err(BelayConfigError::Other(
                "at least one tx query strategy is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn block_time_delay(&self) -> Duration {
        Duration::from_millis(self.block_time_delay_ms)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strategy_queries() {
        let addr = "neutron1n0h44yyn6lhswspgvgwn4nzak6q8aj5qx0vaj95k2n0pl4zlcv8qcwzcc3";
        assert_eq!(
            TxQueryStrategy::WasmContractAddress.query(addr),
            format!("wasm._contract_address='{addr}'")
        );
        assert_eq!(
            TxQueryStrategy::MessageContractAddress.query(addr),
            format!("message.contract_address='{addr}'")
        );
        assert_eq!(
            TxQueryStrategy::WasmModuleMessage.query(addr),
            format!("message.module='wasm' AND message.contract_address='{addr}'")
        );
    }

    #[test]
    fn default_strategies_fall_back_in_order() {
        assert_eq!(
            TxSearchConfig::default().strategies,
            vec![
                TxQueryStrategy::WasmContractAddress,
                TxQueryStrategy::MessageContractAddress,
                TxQueryStrategy::WasmModuleMessage,
            ]
        );
        assert_eq!(
            TxQueryStrategy::WasmModuleMessage.to_string(),
            "message.module+message.contract_address"
        );
    }

    #[test]
    fn strategy_parses_both_spellings() {
        assert_eq!(
            "message.contract_address".parse::<TxQueryStrategy>().unwrap(),
            TxQueryStrategy::MessageContractAddress
        );
        assert_eq!(
            "wasm_contract_address".parse::<TxQueryStrategy>().unwrap(),
            TxQueryStrategy::WasmContractAddress
        );
        assert_eq!(
            "message.module".parse::<TxQueryStrategy>().unwrap(),
            TxQueryStrategy::WasmModuleMessage
        );
        assert!("tx.height".parse::<TxQueryStrategy>().is_err());
    }

    #[test]
    fn per_page_bounds() {
        let mut config = TxSearchConfig::default();
        assert!(config.validate().is_ok());

        config.per_page = 0;
        assert!(matches!(
            config.validate(),
            Err(BelayConfigError::InvalidPerPage(0))
        ));

        config.per_page = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: PaginationConfig = toml::from_str("max_pages = 3").unwrap();
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.page_limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(config.total_timeout(), None);
    }
}
