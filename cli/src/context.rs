use anyhow::Result;
use belay::prelude::*;

use crate::{
    args::CliArgs,
    config::{Config, ConfigInit},
};

pub struct AppContext {
    pub args: CliArgs,
    pub config: Config,
    pub abort: AbortHandle,
}

impl AppContext {
    // Getting a context requires parsing the args first
    pub async fn new(args: CliArgs) -> Result<Self> {
        let config: Config = ConfigInit::load(&args.config).await?.try_into()?;

        Ok(Self {
            args,
            config,
            abort: AbortHandle::new(),
        })
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.args
            .log_level
            .map(tracing::Level::from)
            .unwrap_or(self.config.tracing_level)
    }

    pub async fn query_client(&self) -> Result<QueryClient> {
        let client = QueryClient::new(
            self.config.chain_config.clone(),
            self.config.query_config.clone(),
            self.config.connection_mode,
        )
        .await?;

        Ok(client.with_abort(self.abort.signal()))
    }
}
