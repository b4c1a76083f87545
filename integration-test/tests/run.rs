use std::sync::Mutex;

use belay::prelude::*;
use belay_cli::command::{ContractCommand, ContractLog, RecordFilterArgs};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONTRACT: &str = "neutron1n0h44yyn6lhswspgvgwn4nzak6q8aj5qx0vaj95k2n0pl4zlcv8qcwzcc3";

// None when no live endpoint is configured
async fn client() -> Option<QueryClient> {
    // https://github.com/rustls/rustls/issues/1938#issuecomment-2567934864
    let _ = rustls::crypto::ring::default_provider().install_default();

    if dotenvy::dotenv().is_err() {
        eprintln!("Warning: no .env file found, did you copy .env.example over?");
    }

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Ok(rpc_endpoint) = std::env::var("BELAY_TEST_RPC_ENDPOINT") else {
        eprintln!("BELAY_TEST_RPC_ENDPOINT not set, skipping");
        return None;
    };

    let chain_config = ChainConfig {
        chain_id: "pion-1".parse().unwrap(),
        rpc_endpoint: Some(rpc_endpoint),
        grpc_endpoint: None,
        grpc_web_endpoint: None,
        bech32_prefix: "neutron".to_string(),
    };

    let query_config = QueryConfig {
        pagination: PaginationConfig {
            page_timeout_ms: Some(30_000),
            ..Default::default()
        },
        tx_search: TxSearchConfig::default(),
    };

    Some(
        QueryClient::new(chain_config, query_config, Some(ConnectionMode::Rpc))
            .await
            .unwrap(),
    )
}

fn contract(client: &QueryClient) -> Address {
    let addr = std::env::var("BELAY_TEST_CONTRACT").unwrap_or(DEFAULT_CONTRACT.to_string());
    client.chain_config.parse_address(&addr).unwrap()
}

#[tokio::test]
async fn node_status() {
    let Some(client) = client().await else {
        return;
    };

    let height = client.block_height().await.unwrap();
    assert!(height > 0);

    let time = client.block_time(height).await.unwrap();
    tracing::info!("block {height} at {time}");
}

#[tokio::test]
async fn contract_txs() {
    let Some(client) = client().await else {
        return;
    };

    let result = client.all_contract_txs(&contract(&client)).await.unwrap();

    assert!(!result.attempted.is_empty());
    if !result.txs.is_empty() {
        assert!(result.strategy.is_some());
    }
    for tx in &result.txs {
        assert_eq!(tx.hash_hex.len(), 64);
        assert!(tx.mintscan_url().ends_with(&tx.hash_hex));
    }
}

#[tokio::test]
async fn contract_cids_match_records() {
    let Some(client) = client().await else {
        return;
    };
    let address = contract(&client);

    let filter = RecordFilter::default();
    let entries = client.contract_cid_list(&address, &filter).await.unwrap();
    let count = client
        .contract_record_count(&address, &filter)
        .await
        .unwrap();
    assert_eq!(entries.len() as u64, count);

    if let Some(first) = entries.first() {
        let record = client.contract_record(&address, first.id).await.unwrap();
        assert_eq!(record.cid, first.cid);
    }

    // and through the cli command
    let lines = Mutex::new(Vec::new());
    ContractCommand::Cids {
        address: address.to_string(),
        filter: RecordFilterArgs::default(),
        search: None,
        format: belay_cli::command::CidFormat::Csv,
    }
    .run(&client, |line| lines.lock().unwrap().push(line))
    .await
    .unwrap();

    match lines.into_inner().unwrap().pop() {
        Some(ContractLog::Cids { total, shown, output }) => {
            assert_eq!(total, entries.len());
            assert_eq!(shown, total);
            assert!(output.starts_with("id,cid\n"));
        }
        other => panic!("unexpected log: {other:?}"),
    }
}

#[tokio::test]
async fn tight_page_cap_is_reported() {
    let Some(mut client) = client().await else {
        return;
    };
    client.query_config.pagination.max_pages = 1;
    client.query_config.tx_search.per_page = 1;

    let address = contract(&client);
    let total = client
        .tx_search_page(
            &TxQueryStrategy::WasmContractAddress.query(&address.to_string()),
            1,
            Some(1),
        )
        .await
        .unwrap()
        .total_count;

    let res = client.all_contract_txs(&address).await;
    if total > 1 {
        let err = res.unwrap_err();
        let err = err.downcast_ref::<PaginationError>().unwrap();
        assert!(err.is_limit_exceeded());
    }
}
