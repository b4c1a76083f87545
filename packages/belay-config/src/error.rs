use thiserror::Error;

#[derive(Error, Debug)]
pub enum BelayConfigError {
    #[error("chain {0} has neither an rpc nor a grpc endpoint")]
    MissingEndpoint(String),

    #[error("missing bech32 prefix")]
    MissingBech32Prefix,

    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("invalid tx search page size {0}, must be between 1 and 100")]
    InvalidPerPage(u8),

    #[error("{0}")]
    Other(String),
}

impl BelayConfigError {
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }
}
