use tonic::transport::{Channel, ClientTlsConfig, Endpoint, Uri};

use crate::prelude::*;

pub async fn make_grpc_channel(endpoint: &str) -> Result<Channel> {
    let endpoint_uri = endpoint
        .parse::<Uri>()
        .with_context(|| format!("invalid grpc endpoint {endpoint}"))?;

    let mut channel = Endpoint::new(endpoint_uri).map_err(|err| anyhow!("{}", err))?;

    if endpoint.starts_with("https://") {
        channel = channel.tls_config(ClientTlsConfig::new().with_enabled_roots())?;
    }

    // connect lazily, so a client can still be built while the node is unreachable
    // and fall back to rpc during connection probing
    Ok(channel.connect_lazy())
}
