pub mod basic;
pub mod contract;
pub mod ibc;
pub mod middleware;
pub mod records;
pub mod tx_search;

use std::{
    future::Future,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
};

use basic::BlockHeightReq;
use middleware::{QueryMiddlewareMapReq, QueryMiddlewareMapResp, QueryMiddlewareRun};
use tracing::instrument;

use crate::{
    cache::BelayCache,
    network::rpc::RpcClient,
    pagination::{AbortSignal, Aggregate, Page, Pager},
    prelude::*,
};

#[derive(Clone)]
pub struct QueryClient {
    pub chain_config: ChainConfig,
    pub query_config: QueryConfig,
    pub cache: BelayCache,
    pub middleware_map_req: Arc<Vec<QueryMiddlewareMapReq>>,
    pub middleware_map_resp: Arc<Vec<QueryMiddlewareMapResp>>,
    pub middleware_run: Arc<Vec<QueryMiddlewareRun>>,
    /// checked by every pager this client builds
    pub abort: Option<AbortSignal>,
    _grpc_channel: Option<GrpcChannel>,
    _rpc_client: Option<RpcClient>,
    _connection_mode: Arc<AtomicU8>,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("chain_id", &self.chain_config.chain_id)
            .field("connection_mode", &self.get_connection_mode())
            .finish()
    }
}

/// A single remote call, run through the client's middleware
pub trait QueryRequest: Clone + std::fmt::Debug + Send {
    type QueryResponse: std::fmt::Debug + Send;

    fn request(&self, client: QueryClient) -> impl Future<Output = Result<Self::QueryResponse>>;
}

/// A request for one page of a paginated source.
///
/// The request holds every fixed parameter of the source, the pager only
/// ever swaps the cursor.
pub trait PagedRequest: QueryRequest {
    type Cursor;

    fn with_cursor(&self, cursor: Option<Self::Cursor>) -> Self;
}

impl QueryClient {
    pub async fn new(
        chain_config: ChainConfig,
        query_config: QueryConfig,
        default_connection_mode: Option<ConnectionMode>,
    ) -> Result<Self> {
        let cache = BelayCache::default();
        Self::new_with_cache(chain_config, query_config, cache, default_connection_mode).await
    }

    /// Without a preferred mode, gRPC is tried first and RPC is kept as the fallback
    pub async fn new_with_cache(
        chain_config: ChainConfig,
        query_config: QueryConfig,
        cache: BelayCache,
        default_connection_mode: Option<ConnectionMode>,
    ) -> Result<Self> {
        chain_config.validate()?;
        query_config.tx_search.validate()?;

        let _grpc_channel = cache.get_grpc(&chain_config).await?;
        let _rpc_client = cache.chain_rpc_client(&chain_config)?;

        let initial_mode = match (&_grpc_channel, default_connection_mode) {
            (_, Some(mode)) => mode,
            (Some(_), None) => ConnectionMode::Grpc,
            (None, None) => ConnectionMode::Rpc,
        };

        let _self = Self {
            chain_config,
            query_config,
            cache,
            middleware_map_req: Arc::new(QueryMiddlewareMapReq::default_list()),
            middleware_map_resp: Arc::new(QueryMiddlewareMapResp::default_list()),
            middleware_run: Arc::new(QueryMiddlewareRun::default_list()),
            abort: None,
            _grpc_channel,
            _rpc_client,
            _connection_mode: Arc::new(AtomicU8::new(initial_mode.into())),
        };

        if default_connection_mode.is_none() {
            _self.set_connection_mode(None).await?;
        }

        Ok(_self)
    }

    pub fn with_abort(mut self, abort: AbortSignal) -> Self {
        self.abort = Some(abort);
        self
    }

    // if None, will make a best-guess attempt via a block height query
    #[instrument]
    pub async fn set_connection_mode(&self, mode: Option<ConnectionMode>) -> Result<()> {
        match mode {
            Some(mode) => {
                self._connection_mode.store(mode.into(), Ordering::SeqCst);
            }
            None => {
                let modes = [ConnectionMode::Grpc, ConnectionMode::Rpc];

                for mode in modes {
                    if !self.supports_mode(mode) {
                        continue;
                    }

                    self._connection_mode.store(mode.into(), Ordering::SeqCst);

                    let req = BlockHeightReq {};
                    match req.request(self.clone()).await {
                        Ok(_) => {
                            tracing::debug!(%mode, "connection mode selected");
                            break;
                        }
                        Err(err) => tracing::warn!(%mode, "connection mode check failed: {err:?}"),
                    }
                }
            }
        };

        Ok(())
    }

    pub fn get_connection_mode(&self) -> ConnectionMode {
        self._connection_mode.load(Ordering::SeqCst).into()
    }

    pub fn supports_mode(&self, mode: ConnectionMode) -> bool {
        match mode {
            ConnectionMode::Grpc => self._grpc_channel.is_some(),
            ConnectionMode::Rpc => self._rpc_client.is_some(),
        }
    }

    pub fn rpc_client(&self) -> Result<&RpcClient> {
        self._rpc_client
            .as_ref()
            .ok_or_else(|| NetworkError::MissingEndpoint("rpc").into())
    }

    pub fn clone_grpc_channel(&self) -> Result<GrpcChannel> {
        self._grpc_channel
            .clone()
            .ok_or_else(|| NetworkError::MissingEndpoint("grpc").into())
    }

    /// A pager bounded by this client's pagination config
    pub fn pager(&self) -> Pager {
        let pager = Pager::new(self.query_config.pagination.clone());
        match &self.abort {
            Some(abort) => pager.with_abort(abort.clone()),
            None => pager,
        }
    }

    /// Fetches every page of `req`, each page through the middleware on its own
    pub async fn run_paginated<REQ>(
        &self,
        req: REQ,
    ) -> Result<Aggregate<<REQ::QueryResponse as Page>::Item, <REQ::QueryResponse as Page>::Meta>>
    where
        REQ: PagedRequest,
        REQ::QueryResponse: Page<Cursor = REQ::Cursor>,
    {
        self.pager()
            .collect(|cursor| self.run_with_middleware(req.with_cursor(cursor)))
            .await
    }

    pub async fn run_with_middleware<REQ: QueryRequest>(
        &self,
        mut req: REQ,
    ) -> Result<REQ::QueryResponse> {
        for middleware in self.middleware_map_req.iter() {
            req = middleware.map_req(req).await?;
        }

        let mut response = None;

        for middleware in self.middleware_run.iter() {
            response = Some(middleware.run(req.clone(), self.clone()).await?);
        }

        let mut response = match response {
            Some(response) => response,
            None => req.request(self.clone()).await?,
        };

        for middleware in self.middleware_map_resp.iter() {
            response = middleware.map_resp(response).await?;
        }

        Ok(response)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionMode {
    Grpc,
    Rpc,
}

impl From<ConnectionMode> for u8 {
    fn from(mode: ConnectionMode) -> u8 {
        mode as u8
    }
}

impl From<u8> for ConnectionMode {
    fn from(mode: u8) -> ConnectionMode {
        match mode {
            0 => ConnectionMode::Grpc,
            _ => ConnectionMode::Rpc,
        }
    }
}

impl std::fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionMode::Grpc => write!(f, "grpc"),
            ConnectionMode::Rpc => write!(f, "rpc"),
        }
    }
}

impl std::str::FromStr for ConnectionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "grpc" => Ok(ConnectionMode::Grpc),
            "rpc" => Ok(ConnectionMode::Rpc),
            _ => Err(anyhow!("unknown connection mode: {s}")),
        }
    }
}

#[cfg(test)]
mod test {
    use super::ConnectionMode;

    #[test]
    fn connection_mode_round_trips_through_atomic_repr() {
        for mode in [ConnectionMode::Grpc, ConnectionMode::Rpc] {
            assert_eq!(ConnectionMode::from(u8::from(mode)), mode);
        }
        assert_eq!("RPC".parse::<ConnectionMode>().unwrap(), ConnectionMode::Rpc);
        assert!("ws".parse::<ConnectionMode>().is_err());
    }
}
