use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

use crate::{BelayConfigError, PaginationConfig, TxSearchConfig};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChainConfig {
    pub chain_id: ChainId,
    pub rpc_endpoint: Option<String>,
    pub grpc_endpoint: Option<String>,
    /// only used in the browser, falls back to `grpc_endpoint`
    pub grpc_web_endpoint: Option<String>,
    pub bech32_prefix: String,
}

impl ChainConfig {
    pub fn validate(&self) -> std::result::Result<(), BelayConfigError> {
        if self.rpc_endpoint.is_none() && self.grpc_endpoint.is_none() {
            return Err(BelayConfigError::MissingEndpoint(self.chain_id.to_string()));
        }

        if self.bech32_prefix.is_empty() {
            return Err(BelayConfigError::MissingBech32Prefix);
        }

        Ok(())
    }
}

/// Everything a query client needs beyond the chain itself
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct QueryConfig {
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub tx_search: TxSearchConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ChainId(String);
impl ChainId {
    pub fn new(id: impl ToString) -> Self {
        Self(id.to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ChainId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
