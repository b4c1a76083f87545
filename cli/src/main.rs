mod args;
mod config;
mod context;

use anyhow::Result;
use args::{CliArgs, Command, ContractArgs, IbcArgs, NodeArgs, TxArgs};
use belay::prelude::*;
use belay_cli::command::{ContractLog, IbcLog, NodeLog, TxLog};
use clap::Parser;
use context::AppContext;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load the .env file before anything, in case it's used by args
    if dotenvy::dotenv().is_err() {
        eprintln!("Failed to load .env file");
    }

    let args = CliArgs::parse();

    // the config carries the default log level, so it's loaded before the logger
    let ctx = AppContext::new(args).await?;

    let mut tracing_env = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::from_level(ctx.tracing_level()).into());
    for directive in ctx
        .args
        .tracing_directives
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
    {
        tracing_env = tracing_env.add_directive(directive.parse()?);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false),
        )
        .with(tracing_env)
        .try_init()?;

    // a first ctrl-c stops paging at the next page boundary
    let abort = ctx.abort.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("stopping after the current page");
            abort.abort();
        }
    });

    let client = ctx.query_client().await?;
    let json = ctx.args.json;

    match &ctx.args.command {
        Command::Ibc(IbcArgs { command }) => {
            command
                .run(&client, |line| match line {
                    IbcLog::Channels { channels, height } => {
                        tracing::info!("{} channels at height {:?}", channels.len(), height);
                        for channel in channels {
                            tracing::info!(
                                "{} {} -> {} {}",
                                channel.port_id,
                                channel.channel_id,
                                channel
                                    .counterparty
                                    .as_ref()
                                    .map(|c| c.port_id.as_str())
                                    .unwrap_or_default(),
                                channel
                                    .counterparty
                                    .as_ref()
                                    .map(|c| c.channel_id.as_str())
                                    .unwrap_or_default(),
                            );
                        }
                    }
                    IbcLog::ClientStates { client_states } => {
                        tracing::info!("{} client states", client_states.len());
                        for state in client_states {
                            tracing::info!(
                                "{} {}",
                                state.client_id,
                                state
                                    .client_state
                                    .as_ref()
                                    .map(|any| any.type_url.as_str())
                                    .unwrap_or_default()
                            );
                        }
                    }
                    IbcLog::ConsensusStates {
                        client_id,
                        consensus_states,
                    } => {
                        tracing::info!(
                            "{} consensus states for {}",
                            consensus_states.len(),
                            client_id
                        );
                        for state in consensus_states {
                            if let Some(height) = &state.height {
                                tracing::info!(
                                    "{}-{}",
                                    height.revision_number,
                                    height.revision_height
                                );
                            }
                        }
                    }
                    IbcLog::Connections {
                        connections,
                        height,
                    } => {
                        tracing::info!(
                            "{} connections at height {:?}",
                            connections.len(),
                            height
                        );
                        for connection in connections {
                            tracing::info!("{} {}", connection.id, connection.client_id);
                        }
                    }
                    IbcLog::DenomTraces { denom_traces } => {
                        tracing::info!("{} denom traces", denom_traces.len());
                        for trace in denom_traces {
                            tracing::info!("{}", trace.full_path());
                        }
                    }
                })
                .await?;
        }
        Command::Contract(ContractArgs { command }) => {
            command
                .run(&client, |line| match line {
                    ContractLog::Records { records } => {
                        if json {
                            print_json(&records);
                            return;
                        }
                        tracing::info!("{} records", records.len());
                        for record in records {
                            tracing::info!(
                                "#{} {} {} {}",
                                record.id,
                                record.species.as_deref().unwrap_or("-"),
                                record.geohash_prefix,
                                record.cid
                            );
                        }
                    }
                    ContractLog::Cids {
                        total,
                        shown,
                        output,
                    } => {
                        tracing::info!("showing {} of {} records", shown, total);
                        print!("{output}");
                    }
                    ContractLog::Record { record } => {
                        if json {
                            print_json(&record);
                            return;
                        }
                        tracing::info!("#{} from {}", record.id, record.sender);
                        tracing::info!("cid: {}", record.cid);
                        tracing::info!(
                            "observed at {} in block {}",
                            record.observed_at,
                            record.block_height
                        );
                        if record.hidden {
                            tracing::info!(
                                "hidden: {}",
                                record.hidden_reason.as_deref().unwrap_or_default()
                            );
                        }
                    }
                    ContractLog::Count { count } => {
                        tracing::info!("{} records", count);
                    }
                    ContractLog::Query { response } => {
                        print_json(&response);
                    }
                })
                .await?;
        }
        Command::Txs(TxArgs { command }) => {
            command
                .run(&client, |line| match line {
                    TxLog::Search { result } => {
                        if json {
                            print_json(&result);
                            return;
                        }
                        match result.strategy {
                            Some(strategy) => tracing::info!(
                                "{} of {} txs via {}",
                                result.txs.len(),
                                result.total_count,
                                strategy
                            ),
                            None => tracing::info!(
                                "{} of {} txs",
                                result.txs.len(),
                                result.total_count
                            ),
                        }
                        for tx in &result.txs {
                            log_tx(tx);
                        }
                    }
                    TxLog::Page {
                        page,
                        next_page,
                        total_count,
                        txs,
                    } => {
                        if json {
                            print_json(&txs);
                            return;
                        }
                        tracing::info!("page {} of {} total txs", page, total_count);
                        for tx in &txs {
                            log_tx(tx);
                        }
                        match next_page {
                            Some(next) => tracing::info!("next page: {}", next),
                            None => tracing::info!("last page"),
                        }
                    }
                })
                .await?;
        }
        Command::Node(NodeArgs { command }) => {
            command
                .run(&client, |line| match line {
                    NodeLog::Height { height, mode } => {
                        tracing::info!("block height {} (via {})", height, mode);
                    }
                    NodeLog::BlockTime { height, time } => {
                        tracing::info!("block {} at {}", height, time);
                    }
                })
                .await?;
        }
    }

    Ok(())
}

fn log_tx(tx: &TxRow) {
    let record = tx
        .record_id()
        .map(|id| format!(" record #{id}"))
        .unwrap_or_default();
    let time = tx
        .block_time
        .as_deref()
        .map(|t| format!(" {t}"))
        .unwrap_or_default();

    tracing::info!(
        "{} height {} code {}{}{}",
        tx.hash_hex,
        tx.height,
        tx.code,
        time,
        record
    );
    tracing::info!("  {}", tx.mintscan_url());
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(err) => tracing::error!("couldn't serialize output: {err}"),
    }
}
