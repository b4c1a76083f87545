use std::time::Duration;
use thiserror::Error;

/// The main error type for belay operations.
///
/// Query methods propagate `anyhow::Error`, and the structured values here
/// travel inside it. Match on them with `err.downcast_ref::<PaginationError>()`
/// (or any of the other enums) to handle specific conditions.
#[derive(Error, Debug)]
pub enum BelayError {
    /// Configuration-related errors
    #[error("configuration error: {0}")]
    Config(#[from] belay_config::BelayConfigError),

    /// Network and RPC-related errors
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Errors from driving a paginated source to completion
    #[error("pagination error: {0}")]
    Pagination(#[from] PaginationError),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Generic error wrapper for compatibility with anyhow
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Network and connectivity errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("RPC request failed: {0}")]
    Rpc(String),

    #[error("gRPC request failed: {0}")]
    Grpc(String),

    #[error("abci query {path} failed with code {code}: {log}")]
    AbciQuery { path: String, code: u32, log: String },

    #[error("no {0} endpoint configured")]
    MissingEndpoint(&'static str),

    #[error("{0}")]
    Other(String),
}

/// Which of the pagination caps was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationLimit {
    Pages(u32),
    Items(u64),
}

impl std::fmt::Display for PaginationLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pages(max) => write!(f, "max {max} pages"),
            Self::Items(max) => write!(f, "max {max} items"),
        }
    }
}

/// Errors raised by the pager itself, as opposed to the pages it fetches
#[derive(Error, Debug)]
pub enum PaginationError {
    #[error("pagination limit exceeded ({limit}) after {pages} pages and {items} items")]
    LimitExceeded {
        limit: PaginationLimit,
        pages: u32,
        items: u64,
    },

    #[error("pagination aborted after {pages} pages")]
    Aborted { pages: u32 },

    #[error("page {page} timed out after {timeout:?}")]
    PageTimeout { page: u32, timeout: Duration },

    #[error("pagination timed out after {timeout:?}")]
    TotalTimeout { timeout: Duration },

    /// the source answered with the same cursor it was asked to continue from
    #[error("page {page} returned the cursor it was fetched with ({cursor})")]
    StalledCursor { page: u32, cursor: String },

    #[error("malformed page: {0}")]
    Malformed(String),

    #[error("no query strategies to try")]
    NoStrategies,
}

impl BelayError {
    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl PaginationError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn is_limit_exceeded(&self) -> bool {
        matches!(self, Self::LimitExceeded { .. })
    }
}

impl NetworkError {
    pub fn rpc(msg: impl ToString) -> Self {
        Self::Rpc(msg.to_string())
    }

    pub fn grpc(msg: impl ToString) -> Self {
        Self::Grpc(msg.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pagination_error_survives_anyhow() {
        let err: anyhow::Error = PaginationError::Aborted { pages: 2 }.into();
        let err = err.context("listing records");
        assert!(matches!(
            err.downcast_ref::<PaginationError>(),
            Some(PaginationError::Aborted { pages: 2 })
        ));
    }

    #[test]
    fn limit_message_names_the_cap() {
        let err = PaginationError::LimitExceeded {
            limit: PaginationLimit::Pages(3),
            pages: 3,
            items: 30,
        };
        assert!(err.is_limit_exceeded());
        assert_eq!(
            err.to_string(),
            "pagination limit exceeded (max 3 pages) after 3 pages and 30 items"
        );
    }
}
