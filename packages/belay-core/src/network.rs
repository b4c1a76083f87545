pub mod rpc;

use crate::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub mod grpc_web;
        pub type GrpcChannel = tonic_web_wasm_client::Client;
    } else {
        pub mod grpc_native;
        pub type GrpcChannel = tonic::transport::Channel;
    }
}

/// Pins a gRPC query to a block height, the node answers from latest state otherwise
pub fn apply_grpc_height<T>(req: &mut tonic::Request<T>, height: Option<u64>) -> Result<()> {
    if let Some(height) = height {
        req.metadata_mut()
            .insert("x-cosmos-block-height", height.to_string().try_into()?);
    }

    Ok(())
}

/// A unary call to a service we have no generated client for
pub async fn grpc_unary<REQ, RESP>(
    channel: GrpcChannel,
    path: &'static str,
    req: tonic::Request<REQ>,
) -> Result<RESP>
where
    REQ: Message + Send + Sync + 'static,
    RESP: Message + Default + Send + Sync + 'static,
{
    let mut grpc = tonic::client::Grpc::new(channel);

    grpc.ready()
        .await
        .map_err(|err| NetworkError::grpc(format!("service not ready for {path}: {err}")))?;

    let codec = tonic::codec::ProstCodec::<REQ, RESP>::default();
    let path = tonic::codegen::http::uri::PathAndQuery::from_static(path);

    let resp = grpc
        .unary(req, path, codec)
        .await
        .map_err(NetworkError::grpc)?;

    Ok(resp.into_inner())
}
