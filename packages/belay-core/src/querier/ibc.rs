use belay_proto::{
    ibc::{channel, client as ibc_client, connection, transfer},
    ibc_next_key, ibc_page_request, RevisionHeight,
};
use tracing::instrument;

use crate::{
    ibc_types::{IbcClientId, IbcConnectionId},
    network::grpc_unary,
    pagination::{Aggregate, KeyedPage},
    prelude::*,
};

pub const CHANNELS_PATH: &str = "/ibc.core.channel.v1.Query/Channels";
pub const CONNECTION_CHANNELS_PATH: &str = "/ibc.core.channel.v1.Query/ConnectionChannels";
pub const CLIENT_STATES_PATH: &str = "/ibc.core.client.v1.Query/ClientStates";
pub const CONSENSUS_STATES_PATH: &str = "/ibc.core.client.v1.Query/ConsensusStates";
pub const CONNECTIONS_PATH: &str = "/ibc.core.connection.v1.Query/Connections";

pub type ChannelsPage = KeyedPage<channel::IdentifiedChannel, Option<RevisionHeight>>;
pub type ClientStatesPage = KeyedPage<ibc_client::IdentifiedClientState>;
pub type ConsensusStatesPage = KeyedPage<ibc_client::ConsensusStateWithHeight>;
pub type ConnectionsPage = KeyedPage<connection::IdentifiedConnection, Option<RevisionHeight>>;
pub type DenomTracesPage = KeyedPage<transfer::DenomTrace>;

impl QueryClient {
    #[instrument]
    pub async fn all_ibc_channels(
        &self,
        height: Option<u64>,
    ) -> Result<channel::QueryChannelsResponse> {
        let aggregate = self
            .run_paginated(IbcChannelsPageReq {
                key: None,
                limit: self.query_config.pagination.page_limit,
                height,
            })
            .await?;

        Ok(into_channels_response(aggregate))
    }

    #[instrument]
    pub async fn ibc_channels_page(
        &self,
        key: Option<Vec<u8>>,
        height: Option<u64>,
    ) -> Result<ChannelsPage> {
        self.run_with_middleware(IbcChannelsPageReq {
            key,
            limit: self.query_config.pagination.page_limit,
            height,
        })
        .await
    }

    #[instrument]
    pub async fn all_ibc_connection_channels(
        &self,
        connection_id: &IbcConnectionId,
        height: Option<u64>,
    ) -> Result<channel::QueryConnectionChannelsResponse> {
        let aggregate = self
            .run_paginated(IbcConnectionChannelsPageReq {
                connection_id: connection_id.clone(),
                key: None,
                limit: self.query_config.pagination.page_limit,
                height,
            })
            .await?;

        Ok(into_connection_channels_response(aggregate))
    }

    #[instrument]
    pub async fn ibc_connection_channels_page(
        &self,
        connection_id: &IbcConnectionId,
        key: Option<Vec<u8>>,
        height: Option<u64>,
    ) -> Result<ChannelsPage> {
        self.run_with_middleware(IbcConnectionChannelsPageReq {
            connection_id: connection_id.clone(),
            key,
            limit: self.query_config.pagination.page_limit,
            height,
        })
        .await
    }

    #[instrument]
    pub async fn all_ibc_client_states(
        &self,
        height: Option<u64>,
    ) -> Result<ibc_client::QueryClientStatesResponse> {
        let aggregate = self
            .run_paginated(IbcClientStatesPageReq {
                key: None,
                limit: self.query_config.pagination.page_limit,
                height,
            })
            .await?;

        Ok(into_client_states_response(aggregate))
    }

    #[instrument]
    pub async fn ibc_client_states_page(
        &self,
        key: Option<Vec<u8>>,
        height: Option<u64>,
    ) -> Result<ClientStatesPage> {
        self.run_with_middleware(IbcClientStatesPageReq {
            key,
            limit: self.query_config.pagination.page_limit,
            height,
        })
        .await
    }

    #[instrument]
    pub async fn all_ibc_consensus_states(
        &self,
        client_id: &IbcClientId,
        height: Option<u64>,
    ) -> Result<ibc_client::QueryConsensusStatesResponse> {
        let aggregate = self
            .run_paginated(IbcConsensusStatesPageReq {
                client_id: client_id.clone(),
                key: None,
                limit: self.query_config.pagination.page_limit,
                height,
            })
            .await?;

        Ok(into_consensus_states_response(aggregate))
    }

    #[instrument]
    pub async fn ibc_consensus_states_page(
        &self,
        client_id: &IbcClientId,
        key: Option<Vec<u8>>,
        height: Option<u64>,
    ) -> Result<ConsensusStatesPage> {
        self.run_with_middleware(IbcConsensusStatesPageReq {
            client_id: client_id.clone(),
            key,
            limit: self.query_config.pagination.page_limit,
            height,
        })
        .await
    }

    #[instrument]
    pub async fn all_ibc_connections(
        &self,
        height: Option<u64>,
    ) -> Result<connection::QueryConnectionsResponse> {
        let aggregate = self
            .run_paginated(IbcConnectionsPageReq {
                key: None,
                limit: self.query_config.pagination.page_limit,
                height,
            })
            .await?;

        Ok(into_connections_response(aggregate))
    }

    #[instrument]
    pub async fn ibc_connections_page(
        &self,
        key: Option<Vec<u8>>,
        height: Option<u64>,
    ) -> Result<ConnectionsPage> {
        self.run_with_middleware(IbcConnectionsPageReq {
            key,
            limit: self.query_config.pagination.page_limit,
            height,
        })
        .await
    }

    #[instrument]
    pub async fn all_denom_traces(
        &self,
        height: Option<u64>,
    ) -> Result<transfer::QueryDenomTracesResponse> {
        let aggregate = self
            .run_paginated(DenomTracesPageReq {
                key: None,
                limit: self.query_config.pagination.page_limit,
                height,
            })
            .await?;

        Ok(into_denom_traces_response(aggregate))
    }

    #[instrument]
    pub async fn denom_traces_page(
        &self,
        key: Option<Vec<u8>>,
        height: Option<u64>,
    ) -> Result<DenomTracesPage> {
        self.run_with_middleware(DenomTracesPageReq {
            key,
            limit: self.query_config.pagination.page_limit,
            height,
        })
        .await
    }
}

pub fn into_channels_response(
    aggregate: Aggregate<channel::IdentifiedChannel, Option<RevisionHeight>>,
) -> channel::QueryChannelsResponse {
    channel::QueryChannelsResponse {
        channels: aggregate.items,
        pagination: None,
        height: aggregate.meta,
    }
}

pub fn into_connection_channels_response(
    aggregate: Aggregate<channel::IdentifiedChannel, Option<RevisionHeight>>,
) -> channel::QueryConnectionChannelsResponse {
    channel::QueryConnectionChannelsResponse {
        channels: aggregate.items,
        pagination: None,
        height: aggregate.meta,
    }
}

pub fn into_client_states_response(
    aggregate: Aggregate<ibc_client::IdentifiedClientState, ()>,
) -> ibc_client::QueryClientStatesResponse {
    ibc_client::QueryClientStatesResponse {
        client_states: aggregate.items,
        pagination: None,
    }
}

pub fn into_consensus_states_response(
    aggregate: Aggregate<ibc_client::ConsensusStateWithHeight, ()>,
) -> ibc_client::QueryConsensusStatesResponse {
    ibc_client::QueryConsensusStatesResponse {
        consensus_states: aggregate.items,
        pagination: None,
    }
}

pub fn into_connections_response(
    aggregate: Aggregate<connection::IdentifiedConnection, Option<RevisionHeight>>,
) -> connection::QueryConnectionsResponse {
    connection::QueryConnectionsResponse {
        connections: aggregate.items,
        pagination: None,
        height: aggregate.meta,
    }
}

pub fn into_denom_traces_response(
    aggregate: Aggregate<transfer::DenomTrace, ()>,
) -> transfer::QueryDenomTracesResponse {
    transfer::QueryDenomTracesResponse {
        denom_traces: aggregate.items,
        pagination: None,
    }
}

#[derive(Clone, Debug)]
pub struct IbcChannelsPageReq {
    pub key: Option<Vec<u8>>,
    pub limit: u64,
    pub height: Option<u64>,
}

impl PagedRequest for IbcChannelsPageReq {
    type Cursor = Vec<u8>;

    fn with_cursor(&self, key: Option<Vec<u8>>) -> Self {
        Self { key, ..self.clone() }
    }
}

impl QueryRequest for IbcChannelsPageReq {
    type QueryResponse = ChannelsPage;

    async fn request(&self, client: QueryClient) -> Result<ChannelsPage> {
        let req = channel::QueryChannelsRequest {
            pagination: Some(ibc_page_request(self.key.clone(), self.limit)),
        };

        let resp: channel::QueryChannelsResponse = match client.get_connection_mode() {
            ConnectionMode::Grpc => {
                let mut req = tonic::Request::new(req);
                apply_grpc_height(&mut req, self.height)?;

                let mut query_client =
                    channel::query_client::QueryClient::new(client.clone_grpc_channel()?);

                query_client
                    .channels(req)
                    .await
                    .map(|res| res.into_inner())
                    .map_err(NetworkError::grpc)?
            }
            ConnectionMode::Rpc => {
                client
                    .rpc_client()?
                    .abci_protobuf_query(CHANNELS_PATH, req, self.height)
                    .await?
            }
        };

        Ok(KeyedPage::new(
            resp.channels,
            ibc_next_key(resp.pagination),
            resp.height,
        ))
    }
}

#[derive(Clone, Debug)]
pub struct IbcConnectionChannelsPageReq {
    pub connection_id: IbcConnectionId,
    pub key: Option<Vec<u8>>,
    pub limit: u64,
    pub height: Option<u64>,
}

impl PagedRequest for IbcConnectionChannelsPageReq {
    type Cursor = Vec<u8>;

    fn with_cursor(&self, key: Option<Vec<u8>>) -> Self {
        Self { key, ..self.clone() }
    }
}

impl QueryRequest for IbcConnectionChannelsPageReq {
    type QueryResponse = ChannelsPage;

    async fn request(&self, client: QueryClient) -> Result<ChannelsPage> {
        let req = channel::QueryConnectionChannelsRequest {
            connection: self.connection_id.to_string(),
            pagination: Some(ibc_page_request(self.key.clone(), self.limit)),
        };

        let resp: channel::QueryConnectionChannelsResponse = match client.get_connection_mode() {
            ConnectionMode::Grpc => {
                let mut req = tonic::Request::new(req);
                apply_grpc_height(&mut req, self.height)?;

                let mut query_client =
                    channel::query_client::QueryClient::new(client.clone_grpc_channel()?);

                query_client
                    .connection_channels(req)
                    .await
                    .map(|res| res.into_inner())
                    .map_err(NetworkError::grpc)?
            }
            ConnectionMode::Rpc => {
                client
                    .rpc_client()?
                    .abci_protobuf_query(CONNECTION_CHANNELS_PATH, req, self.height)
                    .await?
            }
        };

        Ok(KeyedPage::new(
            resp.channels,
            ibc_next_key(resp.pagination),
            resp.height,
        ))
    }
}

#[derive(Clone, Debug)]
pub struct IbcClientStatesPageReq {
    pub key: Option<Vec<u8>>,
    pub limit: u64,
    pub height: Option<u64>,
}

impl PagedRequest for IbcClientStatesPageReq {
    type Cursor = Vec<u8>;

    fn with_cursor(&self, key: Option<Vec<u8>>) -> Self {
        Self { key, ..self.clone() }
    }
}

impl QueryRequest for IbcClientStatesPageReq {
    type QueryResponse = ClientStatesPage;

    async fn request(&self, client: QueryClient) -> Result<ClientStatesPage> {
        let req = ibc_client::QueryClientStatesRequest {
            pagination: Some(ibc_page_request(self.key.clone(), self.limit)),
        };

        let resp: ibc_client::QueryClientStatesResponse = match client.get_connection_mode() {
            ConnectionMode::Grpc => {
                let mut req = tonic::Request::new(req);
                apply_grpc_height(&mut req, self.height)?;

                let mut query_client =
                    ibc_client::query_client::QueryClient::new(client.clone_grpc_channel()?);

                query_client
                    .client_states(req)
                    .await
                    .map(|res| res.into_inner())
                    .map_err(NetworkError::grpc)?
            }
            ConnectionMode::Rpc => {
                client
                    .rpc_client()?
                    .abci_protobuf_query(CLIENT_STATES_PATH, req, self.height)
                    .await?
            }
        };

        Ok(KeyedPage::new(
            resp.client_states,
            ibc_next_key(resp.pagination),
            (),
        ))
    }
}

#[derive(Clone, Debug)]
pub struct IbcConsensusStatesPageReq {
    pub client_id: IbcClientId,
    pub key: Option<Vec<u8>>,
    pub limit: u64,
    pub height: Option<u64>,
}

impl PagedRequest for IbcConsensusStatesPageReq {
    type Cursor = Vec<u8>;

    fn with_cursor(&self, key: Option<Vec<u8>>) -> Self {
        Self { key, ..self.clone() }
    }
}

impl QueryRequest for IbcConsensusStatesPageReq {
    type QueryResponse = ConsensusStatesPage;

    async fn request(&self, client: QueryClient) -> Result<ConsensusStatesPage> {
        let req = ibc_client::QueryConsensusStatesRequest {
            client_id: self.client_id.to_string(),
            pagination: Some(ibc_page_request(self.key.clone(), self.limit)),
        };

        let resp: ibc_client::QueryConsensusStatesResponse = match client.get_connection_mode() {
            ConnectionMode::Grpc => {
                let mut req = tonic::Request::new(req);
                apply_grpc_height(&mut req, self.height)?;

                let mut query_client =
                    ibc_client::query_client::QueryClient::new(client.clone_grpc_channel()?);

                query_client
                    .consensus_states(req)
                    .await
                    .map(|res| res.into_inner())
                    .map_err(NetworkError::grpc)?
            }
            ConnectionMode::Rpc => {
                client
                    .rpc_client()?
                    .abci_protobuf_query(CONSENSUS_STATES_PATH, req, self.height)
                    .await?
            }
        };

        Ok(KeyedPage::new(
            resp.consensus_states,
            ibc_next_key(resp.pagination),
            (),
        ))
    }
}

#[derive(Clone, Debug)]
pub struct IbcConnectionsPageReq {
    pub key: Option<Vec<u8>>,
    pub limit: u64,
    pub height: Option<u64>,
}

impl PagedRequest for IbcConnectionsPageReq {
    type Cursor = Vec<u8>;

    fn with_cursor(&self, key: Option<Vec<u8>>) -> Self {
        Self { key, ..self.clone() }
    }
}

impl QueryRequest for IbcConnectionsPageReq {
    type QueryResponse = ConnectionsPage;

    async fn request(&self, client: QueryClient) -> Result<ConnectionsPage> {
        let req = connection::QueryConnectionsRequest {
            pagination: Some(ibc_page_request(self.key.clone(), self.limit)),
        };

        let resp: connection::QueryConnectionsResponse = match client.get_connection_mode() {
            ConnectionMode::Grpc => {
                let mut req = tonic::Request::new(req);
                apply_grpc_height(&mut req, self.height)?;

                let mut query_client =
                    connection::query_client::QueryClient::new(client.clone_grpc_channel()?);

                query_client
                    .connections(req)
                    .await
                    .map(|res| res.into_inner())
                    .map_err(NetworkError::grpc)?
            }
            ConnectionMode::Rpc => {
                client
                    .rpc_client()?
                    .abci_protobuf_query(CONNECTIONS_PATH, req, self.height)
                    .await?
            }
        };

        Ok(KeyedPage::new(
            resp.connections,
            ibc_next_key(resp.pagination),
            resp.height,
        ))
    }
}

#[derive(Clone, Debug)]
pub struct DenomTracesPageReq {
    pub key: Option<Vec<u8>>,
    pub limit: u64,
    pub height: Option<u64>,
}

impl PagedRequest for DenomTracesPageReq {
    type Cursor = Vec<u8>;

    fn with_cursor(&self, key: Option<Vec<u8>>) -> Self {
        Self { key, ..self.clone() }
    }
}

impl QueryRequest for DenomTracesPageReq {
    type QueryResponse = DenomTracesPage;

    async fn request(&self, client: QueryClient) -> Result<DenomTracesPage> {
        let req = transfer::QueryDenomTracesRequest {
            pagination: Some(ibc_page_request(self.key.clone(), self.limit)),
        };

        // ibc-proto ships no client for the transfer module's legacy denom traces
        let resp: transfer::QueryDenomTracesResponse = match client.get_connection_mode() {
            ConnectionMode::Grpc => {
                let mut req = tonic::Request::new(req);
                apply_grpc_height(&mut req, self.height)?;

                grpc_unary(client.clone_grpc_channel()?, transfer::DENOM_TRACES_PATH, req).await?
            }
            ConnectionMode::Rpc => {
                client
                    .rpc_client()?
                    .abci_protobuf_query(transfer::DENOM_TRACES_PATH, req, self.height)
                    .await?
            }
        };

        Ok(KeyedPage::new(
            resp.denom_traces,
            ibc_next_key(resp.pagination),
            (),
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn channel(id: &str) -> channel::IdentifiedChannel {
        channel::IdentifiedChannel {
            channel_id: id.to_string(),
            port_id: "transfer".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn channels_response_keeps_last_height() {
        let height = RevisionHeight {
            revision_number: 1,
            revision_height: 105,
        };

        let response = into_channels_response(Aggregate {
            items: vec![channel("channel-0"), channel("channel-1")],
            meta: Some(height),
            pages: 2,
        });

        assert!(response.pagination.is_none());
        assert_eq!(response.height, Some(height));
        assert_eq!(
            response
                .channels
                .iter()
                .map(|c| c.channel_id.as_str())
                .collect::<Vec<_>>(),
            ["channel-0", "channel-1"]
        );
    }

    #[test]
    fn with_cursor_only_swaps_the_key() {
        let req = IbcConsensusStatesPageReq {
            client_id: IbcClientId::new("07-tendermint-0"),
            key: None,
            limit: 25,
            height: Some(100),
        };

        let next = req.with_cursor(Some(b"next".to_vec()));
        assert_eq!(next.key.as_deref(), Some(&b"next"[..]));
        assert_eq!(next.client_id, req.client_id);
        assert_eq!(next.limit, 25);
        assert_eq!(next.height, Some(100));
    }
}
