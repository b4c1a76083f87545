use std::path::PathBuf;

use belay_cli::command::{ContractCommand, IbcCommand, NodeCommand, TxCommand};
use clap::{Args, Parser, Subcommand};

use crate::config::LogLevel;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    #[arg(long, default_value = "./cli/config/belay.toml")]
    pub config: PathBuf,

    /// Overrides the log level from the config
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Extra tracing directives, comma separated, e.g. "belay_core=debug"
    #[arg(long, default_value = "")]
    pub tracing_directives: String,

    /// Print results as json instead of log lines
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    /// The command to run
    pub command: Command,
}

#[derive(Clone, Subcommand)]
pub enum Command {
    /// IBC module listings
    Ibc(IbcArgs),
    /// Observation contract queries
    Contract(ContractArgs),
    /// tx_search listings
    Txs(TxArgs),
    /// Node status
    Node(NodeArgs),
}

#[derive(Clone, Args)]
pub struct IbcArgs {
    #[command(subcommand)]
    pub command: IbcCommand,
}

#[derive(Clone, Args)]
pub struct ContractArgs {
    #[command(subcommand)]
    pub command: ContractCommand,
}

#[derive(Clone, Args)]
pub struct TxArgs {
    #[command(subcommand)]
    pub command: TxCommand,
}

#[derive(Clone, Args)]
pub struct NodeArgs {
    #[command(subcommand)]
    pub command: NodeCommand,
}
