use crate::ibc::query::{PageRequest, PageResponse};

// reached through a plain unary call, there is no generated client
pub const DENOM_TRACES_PATH: &str = "/ibc.applications.transfer.v1.Query/DenomTraces";

/// A denomination trace: the port/channel path a token took and its base denom
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DenomTrace {
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub base_denom: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryDenomTracesRequest {
    #[prost(message, optional, tag = "1")]
    pub pagination: ::core::option::Option<PageRequest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryDenomTracesResponse {
    #[prost(message, repeated, tag = "1")]
    pub denom_traces: ::prost::alloc::vec::Vec<DenomTrace>,
    #[prost(message, optional, tag = "2")]
    pub pagination: ::core::option::Option<PageResponse>,
}

impl DenomTrace {
    /// The full `{path}/{base_denom}` form, or just the base denom for native tokens
    pub fn full_path(&self) -> String {
        if self.path.is_empty() {
            self.base_denom.clone()
        } else {
            format!("{}/{}", self.path, self.base_denom)
        }
    }
}
