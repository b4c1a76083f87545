use crate::prelude::*;
use tendermint_rpc::Response;

/// CometBFT JSON-RPC over plain http
#[derive(Clone, Debug)]
pub struct RpcClient {
    http_client: reqwest::Client,
    url: String,
}

impl RpcClient {
    pub fn new(url: String, http_client: reqwest::Client) -> Self {
        Self { url, http_client }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn status(&self) -> Result<tendermint_rpc::endpoint::status::Response> {
        self.send(tendermint_rpc::endpoint::status::Request).await
    }

    pub async fn block(&self, height: u64) -> Result<tendermint_rpc::endpoint::block::Response> {
        let height = tendermint::block::Height::try_from(height)?;
        let resp: tendermint_rpc::endpoint::block::v0_38::DialectResponse = self
            .send(tendermint_rpc::endpoint::block::Request::new(height))
            .await?;
        Ok(resp.into())
    }

    /// One page of `tx_search`, `page` is 1-based
    pub async fn tx_search(
        &self,
        query: String,
        page: u32,
        per_page: u8,
        order: TxOrder,
    ) -> Result<tendermint_rpc::endpoint::tx_search::Response> {
        let order_by = match order {
            TxOrder::Asc => tendermint_rpc::Order::Ascending,
            TxOrder::Desc => tendermint_rpc::Order::Descending,
        };

        self.send(tendermint_rpc::endpoint::tx_search::Request {
            query,
            prove: false,
            page,
            per_page,
            order_by,
        })
        .await
    }

    pub async fn abci_query(
        &self,
        path: String,
        data: Vec<u8>,
        height: Option<u64>,
        prove: bool,
    ) -> Result<tendermint_rpc::endpoint::abci_query::Response> {
        let height = match height {
            Some(height) => Some(tendermint::block::Height::try_from(height)?),
            None => None,
        };

        self.send(tendermint_rpc::endpoint::abci_query::Request {
            path: Some(path),
            data,
            height,
            prove,
        })
        .await
    }

    /// Runs a gRPC query method through `abci_query`, protobuf on both ends.
    /// A non-zero response code is an error even though the http call succeeded.
    pub async fn abci_protobuf_query<REQ, RESP>(
        &self,
        path: impl ToString,
        req: REQ,
        height: Option<u64>,
    ) -> Result<RESP>
    where
        REQ: Message,
        RESP: Message + Default,
    {
        let path = path.to_string();

        let resp = self
            .abci_query(path.clone(), req.encode_to_vec(), height, false)
            .await?
            .response;

        if resp.code.is_err() {
            return Err(NetworkError::AbciQuery {
                path,
                code: resp.code.value(),
                log: resp.log,
            }
            .into());
        }

        RESP::decode(resp.value.as_slice())
            .with_context(|| format!("couldn't decode abci response from {path}"))
    }

    async fn send<T: tendermint_rpc::Request>(&self, req: T) -> Result<T::Response> {
        let res = self
            .http_client
            .post(self.url.clone())
            .header("Content-Type", "application/json")
            .body(req.into_json().into_bytes())
            .send()
            .await
            .map_err(NetworkError::rpc)?
            .error_for_status()
            .map_err(NetworkError::rpc)?
            .text()
            .await
            .map_err(NetworkError::rpc)?;

        T::Response::from_string(res).map_err(|err| NetworkError::rpc(err).into())
    }
}
