use anyhow::Result;
use belay::{
    prelude::*,
    proto::{
        ibc::{channel, client, connection, transfer},
        RevisionHeight,
    },
};
use clap::Subcommand;

#[derive(Clone, Subcommand)]
pub enum IbcCommand {
    /// Lists every channel
    Channels {
        /// Query state at this block height instead of the latest
        #[arg(long)]
        height: Option<u64>,
    },

    /// Lists the channels of one connection
    ConnectionChannels {
        /// The connection id, e.g. connection-0
        #[arg(long)]
        connection: String,
        #[arg(long)]
        height: Option<u64>,
    },

    /// Lists every light client state
    ClientStates {
        #[arg(long)]
        height: Option<u64>,
    },

    /// Lists the consensus states stored for one client
    ConsensusStates {
        /// The client id, e.g. 07-tendermint-0
        #[arg(long)]
        client: String,
        #[arg(long)]
        height: Option<u64>,
    },

    /// Lists every connection
    Connections {
        #[arg(long)]
        height: Option<u64>,
    },

    /// Lists every denom trace of the transfer module
    DenomTraces {
        #[arg(long)]
        height: Option<u64>,
    },
}

impl IbcCommand {
    pub async fn run(&self, client: &QueryClient, log: impl Fn(IbcLog)) -> Result<()> {
        match self {
            IbcCommand::Channels { height } => {
                let resp = client.all_ibc_channels(*height).await?;
                log(IbcLog::Channels {
                    channels: resp.channels,
                    height: resp.height,
                });
            }
            IbcCommand::ConnectionChannels { connection, height } => {
                let connection_id: IbcConnectionId = connection.parse()?;
                let resp = client
                    .all_ibc_connection_channels(&connection_id, *height)
                    .await?;
                log(IbcLog::Channels {
                    channels: resp.channels,
                    height: resp.height,
                });
            }
            IbcCommand::ClientStates { height } => {
                let resp = client.all_ibc_client_states(*height).await?;
                log(IbcLog::ClientStates {
                    client_states: resp.client_states,
                });
            }
            IbcCommand::ConsensusStates {
                client: client_id,
                height,
            } => {
                let client_id: IbcClientId = client_id.parse()?;
                let resp = client.all_ibc_consensus_states(&client_id, *height).await?;
                log(IbcLog::ConsensusStates {
                    client_id,
                    consensus_states: resp.consensus_states,
                });
            }
            IbcCommand::Connections { height } => {
                let resp = client.all_ibc_connections(*height).await?;
                log(IbcLog::Connections {
                    connections: resp.connections,
                    height: resp.height,
                });
            }
            IbcCommand::DenomTraces { height } => {
                let resp = client.all_denom_traces(*height).await?;
                log(IbcLog::DenomTraces {
                    denom_traces: resp.denom_traces,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum IbcLog {
    Channels {
        channels: Vec<channel::IdentifiedChannel>,
        height: Option<RevisionHeight>,
    },
    ClientStates {
        client_states: Vec<client::IdentifiedClientState>,
    },
    ConsensusStates {
        client_id: IbcClientId,
        consensus_states: Vec<client::ConsensusStateWithHeight>,
    },
    Connections {
        connections: Vec<connection::IdentifiedConnection>,
        height: Option<RevisionHeight>,
    },
    DenomTraces {
        denom_traces: Vec<transfer::DenomTrace>,
    },
}
