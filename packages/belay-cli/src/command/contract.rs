use anyhow::Result;
use belay::prelude::*;
use clap::{Subcommand, ValueEnum};

#[derive(Clone, Subcommand)]
pub enum ContractCommand {
    /// Lists every record of an observation contract
    Records {
        /// The address of the contract
        #[arg(long)]
        address: String,
        #[command(flatten)]
        filter: RecordFilterArgs,
    },

    /// Lists the id and CID of every record
    Cids {
        #[arg(long)]
        address: String,
        #[command(flatten)]
        filter: RecordFilterArgs,
        /// Only keep entries whose id or CID contains this text
        #[arg(long)]
        search: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = CidFormat::Tsv)]
        format: CidFormat,
    },

    /// Shows a single record
    Get {
        #[arg(long)]
        address: String,
        #[arg(long)]
        id: u64,
    },

    /// Counts the records matching a filter
    Count {
        #[arg(long)]
        address: String,
        #[command(flatten)]
        filter: RecordFilterArgs,
    },

    /// Runs an arbitrary smart query
    Query {
        #[arg(long)]
        address: String,
        /// The query message as a json string, `{}` if omitted
        #[arg(long)]
        msg: Option<String>,
    },
}

#[derive(Clone, Debug, Default, clap::Args)]
pub struct RecordFilterArgs {
    #[arg(long)]
    pub species: Option<String>,
    #[arg(long)]
    pub geohash_prefix: Option<String>,
    /// Earliest observation time, unix seconds
    #[arg(long)]
    pub start: Option<u64>,
    /// Latest observation time, unix seconds
    #[arg(long)]
    pub end: Option<u64>,
}

impl From<&RecordFilterArgs> for RecordFilter {
    fn from(args: &RecordFilterArgs) -> Self {
        RecordFilter {
            species: args.species.clone(),
            geohash_prefix: args.geohash_prefix.clone(),
            start: args.start,
            end: args.end,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CidFormat {
    Tsv,
    Csv,
}

impl ContractCommand {
    pub async fn run(&self, client: &QueryClient, log: impl Fn(ContractLog)) -> Result<()> {
        match self {
            ContractCommand::Records { address, filter } => {
                let address = client.chain_config.parse_address(address)?;
                let list = client
                    .all_contract_records(&address, &filter.into())
                    .await?;

                log(ContractLog::Records {
                    records: list.records,
                });
            }
            ContractCommand::Cids {
                address,
                filter,
                search,
                format,
            } => {
                let address = client.chain_config.parse_address(address)?;
                let entries = client.contract_cid_list(&address, &filter.into()).await?;
                let total = entries.len();

                let kept = filter_cids(&entries, search.as_deref().unwrap_or_default());
                let output = match format {
                    CidFormat::Tsv => cids_to_tsv(kept.iter().copied()),
                    CidFormat::Csv => cids_to_csv(kept.iter().copied()),
                };

                log(ContractLog::Cids {
                    total,
                    shown: kept.len(),
                    output,
                });
            }
            ContractCommand::Get { address, id } => {
                let address = client.chain_config.parse_address(address)?;
                let record = client.contract_record(&address, *id).await?;

                log(ContractLog::Record {
                    record: Box::new(record),
                });
            }
            ContractCommand::Count { address, filter } => {
                let address = client.chain_config.parse_address(address)?;
                let count = client
                    .contract_record_count(&address, &filter.into())
                    .await?;

                log(ContractLog::Count { count });
            }
            ContractCommand::Query { address, msg } => {
                let address = client.chain_config.parse_address(address)?;
                let msg = contract_str_to_msg(msg.as_deref())?;
                let response: serde_json::Value = client.contract_smart(&address, &msg).await?;

                log(ContractLog::Query { response });
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ContractLog {
    Records { records: Vec<StoredRecord> },
    Cids {
        total: usize,
        shown: usize,
        output: String,
    },
    Record { record: Box<StoredRecord> },
    Count { count: u64 },
    Query { response: serde_json::Value },
}
