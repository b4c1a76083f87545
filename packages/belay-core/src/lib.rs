pub mod cache;
pub mod contract_helpers;
pub mod error;
pub mod ibc_types;
pub mod network;
pub mod pagination;
pub mod prelude;
pub mod querier;
