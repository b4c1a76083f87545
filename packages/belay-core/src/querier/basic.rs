use tracing::instrument;

use crate::prelude::*;

impl QueryClient {
    #[instrument]
    pub async fn block_height(&self) -> Result<u64> {
        self.run_with_middleware(BlockHeightReq {}).await
    }

    /// Header time of the block at `height`
    #[instrument]
    pub async fn block_time(&self, height: u64) -> Result<tendermint::Time> {
        self.run_with_middleware(BlockTimeReq { height }).await
    }
}

#[derive(Clone, Debug)]
pub struct BlockHeightReq {}

impl QueryRequest for BlockHeightReq {
    type QueryResponse = u64;

    async fn request(&self, client: QueryClient) -> Result<u64> {
        match client.get_connection_mode() {
            ConnectionMode::Grpc => {
                let mut query_client =
                    belay_proto::tendermint::service_client::ServiceClient::new(
                        client.clone_grpc_channel()?,
                    );

                let resp = query_client
                    .get_latest_block(belay_proto::tendermint::GetLatestBlockRequest {})
                    .await
                    .map(|res| res.into_inner())
                    .map_err(NetworkError::grpc)?;

                let height = match (resp.sdk_block, resp.block) {
                    (Some(block), _) => block.header.map(|header| header.height),
                    (None, Some(block)) => block.header.map(|header| header.height),
                    (None, None) => None,
                }
                .context("no latest block found")?;

                Ok(height.try_into()?)
            }
            ConnectionMode::Rpc => {
                let status = client.rpc_client()?.status().await?;
                Ok(status.sync_info.latest_block_height.value())
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct BlockTimeReq {
    pub height: u64,
}

impl QueryRequest for BlockTimeReq {
    type QueryResponse = tendermint::Time;

    async fn request(&self, client: QueryClient) -> Result<tendermint::Time> {
        match client.get_connection_mode() {
            ConnectionMode::Grpc => {
                let mut query_client =
                    belay_proto::tendermint::service_client::ServiceClient::new(
                        client.clone_grpc_channel()?,
                    );

                let resp = query_client
                    .get_block_by_height(belay_proto::tendermint::GetBlockByHeightRequest {
                        height: self.height.try_into()?,
                    })
                    .await
                    .map(|res| res.into_inner())
                    .map_err(NetworkError::grpc)?;

                let (seconds, nanos) = match (resp.sdk_block, resp.block) {
                    (Some(block), _) => block
                        .header
                        .and_then(|header| header.time)
                        .map(|time| (time.seconds, time.nanos)),
                    (None, Some(block)) => block
                        .header
                        .and_then(|header| header.time)
                        .map(|time| (time.seconds, time.nanos)),
                    (None, None) => None,
                }
                .with_context(|| format!("no block time found at height {}", self.height))?;

                let nanos = u32::try_from(nanos).context("negative block time nanos")?;
                Ok(tendermint::Time::from_unix_timestamp(seconds, nanos)?)
            }
            ConnectionMode::Rpc => {
                let resp = client.rpc_client()?.block(self.height).await?;
                Ok(resp.block.header.time)
            }
        }
    }
}
