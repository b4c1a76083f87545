use crate::{contract_helpers::contract_msg_to_vec, prelude::*};
use serde::{de::DeserializeOwned, Serialize};
use tracing::instrument;

pub const SMART_CONTRACT_STATE_PATH: &str = "/cosmwasm.wasm.v1.Query/SmartContractState";

impl QueryClient {
    #[instrument]
    pub async fn contract_smart<
        D: DeserializeOwned + Send + std::fmt::Debug + Sync,
        S: Serialize + std::fmt::Debug,
    >(
        &self,
        address: &Address,
        msg: &S,
    ) -> Result<D> {
        self.run_with_middleware(ContractSmartReq {
            address: address.clone(),
            msg: contract_msg_to_vec(&msg)?,
            _phantom: std::marker::PhantomData,
        })
        .await
    }
}

#[derive(Debug)]
struct ContractSmartReq<D> {
    pub address: Address,
    pub msg: Vec<u8>,
    _phantom: std::marker::PhantomData<D>,
}

impl<D> Clone for ContractSmartReq<D> {
    fn clone(&self) -> Self {
        Self {
            address: self.address.clone(),
            msg: self.msg.clone(),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<D: DeserializeOwned + Send + std::fmt::Debug + Sync> QueryRequest for ContractSmartReq<D> {
    type QueryResponse = D;

    async fn request(&self, client: QueryClient) -> Result<D> {
        let res = ContractSmartRawReq {
            address: self.address.clone(),
            msg: self.msg.clone(),
        }
        .request(client)
        .await?;

        let res = cosmwasm_std::from_json(res)
            .map_err(|e| anyhow::anyhow!("couldn't deserialize response {}", e))?;

        Ok(res)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ContractSmartRawReq {
    pub address: Address,
    pub msg: Vec<u8>,
}

impl QueryRequest for ContractSmartRawReq {
    type QueryResponse = Vec<u8>;

    async fn request(&self, client: QueryClient) -> Result<Vec<u8>> {
        let req = belay_proto::wasm::QuerySmartContractStateRequest {
            address: self.address.to_string(),
            query_data: self.msg.clone(),
        };

        let res: belay_proto::wasm::QuerySmartContractStateResponse =
            match client.get_connection_mode() {
                ConnectionMode::Grpc => {
                    let mut query_client = belay_proto::wasm::query_client::QueryClient::new(
                        client.clone_grpc_channel()?,
                    );

                    query_client
                        .smart_contract_state(req)
                        .await
                        .map(|res| res.into_inner())
                        .map_err(NetworkError::grpc)?
                }
                ConnectionMode::Rpc => {
                    client
                        .rpc_client()?
                        .abci_protobuf_query(SMART_CONTRACT_STATE_PATH, req, None)
                        .await?
                }
            };

        Ok(res.data)
    }
}
