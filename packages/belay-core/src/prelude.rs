// local "prelude" that isn't exported
// some of these may be exported in the main prelude
pub(crate) use crate::network::{apply_grpc_height, GrpcChannel};
pub(crate) use anyhow::{anyhow, Context, Result};
pub(crate) use belay_address::Address;
pub(crate) use belay_config::*;
pub(crate) use belay_proto::Message;

// common types
pub use crate::{
    cache::BelayCache,
    contract_helpers::contract_str_to_msg,
    error::{BelayError, NetworkError, PaginationError, PaginationLimit},
    ibc_types::{IbcClientId, IbcConnectionId},
    pagination::{
        AbortHandle, AbortSignal, Aggregate, CountedMeta, CountedPage, CursorPage, KeyedPage,
        Page, Pager, StrategyAggregate,
    },
    querier::{
        records::{CidEntry, RecordFilter, RecordList, StoredRecord},
        tx_search::{TxRow, TxSearchResult},
        ConnectionMode, PagedRequest, QueryClient, QueryRequest,
    },
};
