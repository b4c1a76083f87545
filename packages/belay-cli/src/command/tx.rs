use anyhow::Result;
use belay::prelude::*;
use clap::Subcommand;

#[derive(Clone, Subcommand)]
pub enum TxCommand {
    /// Runs a raw tx_search query to the last page
    Search {
        /// e.g. "message.sender='neutron1...'"
        #[arg(long)]
        query: String,
    },

    /// Lists every tx that executed a contract
    Contract {
        #[arg(long)]
        address: String,
        /// Look up the block time of every tx
        #[arg(long)]
        with_block_time: bool,
    },

    /// Fetches a single page of a raw tx_search query
    Page {
        #[arg(long)]
        query: String,
        /// 1-based
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Clamped to 1..=100
        #[arg(long)]
        per_page: Option<u8>,
    },
}

impl TxCommand {
    pub async fn run(&self, client: &QueryClient, log: impl Fn(TxLog)) -> Result<()> {
        match self {
            TxCommand::Search { query } => {
                let result = client.all_tx_search(query).await?;
                log(TxLog::Search { result });
            }
            TxCommand::Contract {
                address,
                with_block_time,
            } => {
                let address = client.chain_config.parse_address(address)?;

                let result = if *with_block_time {
                    let mut client = client.clone();
                    client.query_config.tx_search.with_block_time = true;
                    client.all_contract_txs(&address).await?
                } else {
                    client.all_contract_txs(&address).await?
                };

                log(TxLog::Search { result });
            }
            TxCommand::Page {
                query,
                page,
                per_page,
            } => {
                let page = client.tx_search_page(query, *page, *per_page).await?;
                let next_page = page.next_cursor();
                let number = page.page;
                let total_count = page.total_count;

                log(TxLog::Page {
                    page: number,
                    next_page,
                    total_count,
                    txs: page.items,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum TxLog {
    Search {
        result: TxSearchResult,
    },
    Page {
        page: u32,
        next_page: Option<u32>,
        total_count: u64,
        txs: Vec<TxRow>,
    },
}
