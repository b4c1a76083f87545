use anyhow::Result;
use belay_config::{normalize_endpoint, ChainConfig};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::network::{rpc::RpcClient, GrpcChannel};

/// Lives on the QueryClient and can be used to either pre-populate
/// connections created on the outside or reuse them between clients.
///
/// Clients hold onto their own connections, so a shared cache is only
/// needed when building many clients for the same endpoints.
#[derive(Clone, Default)]
pub struct BelayCache {
    grpc: Arc<Mutex<HashMap<String, GrpcChannel>>>,
    rpc: Arc<Mutex<HashMap<String, RpcClient>>>,
    http: Arc<Mutex<Option<reqwest::Client>>>,
}

// a poisoned map of connections is still a valid map of connections
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl BelayCache {
    pub fn get_http_client(&self) -> reqwest::Client {
        lock(&self.http)
            .get_or_insert_with(reqwest::Client::new)
            .clone()
    }

    pub fn get_rpc_client(&self, url: &str) -> Result<RpcClient> {
        let url = normalize_endpoint(url)?;

        if let Some(rpc) = lock(&self.rpc).get(&url).cloned() {
            return Ok(rpc);
        }

        let rpc = RpcClient::new(url.clone(), self.get_http_client());
        lock(&self.rpc).insert(url, rpc.clone());
        Ok(rpc)
    }

    /// The rpc client for the chain, if it has an rpc endpoint at all
    pub fn chain_rpc_client(&self, chain_config: &ChainConfig) -> Result<Option<RpcClient>> {
        chain_config
            .rpc_endpoint
            .as_deref()
            .map(|url| self.get_rpc_client(url))
            .transpose()
    }

    pub fn insert_grpc(&self, endpoint: &str, channel: GrpcChannel) {
        lock(&self.grpc).insert(endpoint.to_string(), channel);
    }

    fn cached_grpc(&self, endpoint: &str) -> Option<GrpcChannel> {
        lock(&self.grpc).get(endpoint).cloned()
    }
}

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        impl BelayCache {
            /// The grpc-web client for the chain, if it has a grpc endpoint at all
            pub async fn get_grpc(&self, chain_config: &ChainConfig) -> Result<Option<GrpcChannel>> {
                let endpoint = match chain_config
                    .grpc_web_endpoint
                    .as_deref()
                    .or(chain_config.grpc_endpoint.as_deref())
                {
                    Some(endpoint) => normalize_endpoint(endpoint)?,
                    None => return Ok(None),
                };

                if let Some(grpc) = self.cached_grpc(&endpoint) {
                    return Ok(Some(grpc));
                }

                let grpc = crate::network::grpc_web::make_grpc_client(endpoint.clone()).await?;
                self.insert_grpc(&endpoint, grpc.clone());
                Ok(Some(grpc))
            }
        }
    } else {
        impl BelayCache {
            /// The grpc channel for the chain, if it has a grpc endpoint at all
            pub async fn get_grpc(&self, chain_config: &ChainConfig) -> Result<Option<GrpcChannel>> {
                let endpoint = match chain_config.grpc_endpoint.as_deref() {
                    Some(endpoint) => normalize_endpoint(endpoint)?,
                    None => return Ok(None),
                };

                if let Some(grpc) = self.cached_grpc(&endpoint) {
                    return Ok(Some(grpc));
                }

                let grpc = crate::network::grpc_native::make_grpc_channel(&endpoint).await?;
                self.insert_grpc(&endpoint, grpc.clone());
                Ok(Some(grpc))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::BelayCache;

    #[test]
    fn rpc_clients_are_shared_per_endpoint() {
        let cache = BelayCache::default();
        let a = cache
            .get_rpc_client("https://rpc-palvus.pion-1.ntrn.tech:443/")
            .unwrap();
        let b = cache
            .get_rpc_client("https://rpc-palvus.pion-1.ntrn.tech:443")
            .unwrap();

        assert_eq!(a.url(), b.url());
        assert_eq!(cache.rpc.lock().unwrap().len(), 1);
    }
}
