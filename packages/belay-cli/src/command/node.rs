use anyhow::Result;
use belay::prelude::*;
use clap::Subcommand;

#[derive(Clone, Subcommand)]
pub enum NodeCommand {
    /// Shows the latest block height, and the connection mode that answered
    Height,
    /// Shows the time of a block
    BlockTime {
        #[arg(long)]
        height: u64,
    },
}

impl NodeCommand {
    pub async fn run(&self, client: &QueryClient, log: impl Fn(NodeLog)) -> Result<()> {
        match self {
            NodeCommand::Height => {
                let height = client.block_height().await?;
                log(NodeLog::Height {
                    height,
                    mode: client.get_connection_mode(),
                });
            }
            NodeCommand::BlockTime { height } => {
                let time = client.block_time(*height).await?;
                log(NodeLog::BlockTime {
                    height: *height,
                    time,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum NodeLog {
    Height { height: u64, mode: ConnectionMode },
    BlockTime { height: u64, time: tendermint::Time },
}
