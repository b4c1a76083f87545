use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use tendermint::abci::Event;
use tracing::instrument;

use super::basic::BlockTimeReq;
use crate::{
    pagination::{Aggregate, CountedMeta, CountedPage},
    prelude::*,
};

pub const MINTSCAN_TX_URL: &str = "https://www.mintscan.io/neutron-testnet/tx/";

#[derive(Serialize, Debug, Clone)]
pub struct TxRow {
    pub hash_hex: String,
    pub hash_base64: String,
    pub height: u64,
    /// 0 is success
    pub code: u32,
    pub events: Vec<Event>,
    /// RFC 3339, only when block times were requested
    pub block_time: Option<String>,
}

impl TxRow {
    /// The id of the record a `store` execution created, if this tx made one
    pub fn record_id(&self) -> Option<u64> {
        extract_record_id(&self.events)
    }

    pub fn mintscan_url(&self) -> String {
        mintscan_tx_url(&self.hash_hex)
    }
}

impl From<tendermint_rpc::endpoint::tx::Response> for TxRow {
    fn from(resp: tendermint_rpc::endpoint::tx::Response) -> Self {
        let hash = resp.hash.as_bytes();

        Self {
            hash_hex: hex::encode_upper(hash),
            hash_base64: STANDARD.encode(hash),
            height: resp.height.value(),
            code: resp.tx_result.code.value(),
            events: resp.tx_result.events,
            block_time: None,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct TxSearchResult {
    pub txs: Vec<TxRow>,
    /// as reported by the last page
    pub total_count: u64,
    /// the strategy that found the txs, `None` for plain queries or when nothing matched
    pub strategy: Option<TxQueryStrategy>,
    pub attempted: Vec<TxQueryStrategy>,
}

impl QueryClient {
    /// Every tx matching a raw `tx_search` query
    #[instrument]
    pub async fn all_tx_search(&self, query: &str) -> Result<TxSearchResult> {
        let aggregate = self
            .run_paginated(TxSearchPageReq::new(
                query.to_string(),
                &self.query_config.tx_search,
            ))
            .await?;

        Ok(into_tx_search_result(aggregate, None, Vec::new()))
    }

    #[instrument]
    pub async fn tx_search_page(
        &self,
        query: &str,
        page: u32,
        per_page: Option<u8>,
    ) -> Result<CountedPage<TxRow>> {
        let mut req = TxSearchPageReq::new(query.to_string(), &self.query_config.tx_search)
            .with_cursor(Some(page));

        if let Some(per_page) = per_page {
            req.per_page = clamp_per_page(per_page);
        }

        self.run_with_middleware(req).await
    }

    /// Every tx that executed the contract, found with the first strategy
    /// that yields any.
    #[instrument]
    pub async fn all_contract_txs(&self, address: &Address) -> Result<TxSearchResult> {
        let config = &self.query_config.tx_search;
        let address = address.to_string();

        let result = self
            .pager()
            .collect_with_strategies(&config.strategies, |strategy, page| {
                let req = TxSearchPageReq::new(strategy.query(&address), config).with_cursor(page);
                self.run_with_middleware(req)
            })
            .await?;

        Ok(into_tx_search_result(
            result.aggregate,
            result.strategy,
            result.attempted,
        ))
    }
}

pub fn into_tx_search_result(
    aggregate: Aggregate<TxRow, CountedMeta>,
    strategy: Option<TxQueryStrategy>,
    attempted: Vec<TxQueryStrategy>,
) -> TxSearchResult {
    TxSearchResult {
        txs: aggregate.items,
        total_count: aggregate.meta.total_count,
        strategy,
        attempted,
    }
}

pub fn clamp_per_page(per_page: u8) -> u8 {
    per_page.clamp(1, TxSearchConfig::MAX_PER_PAGE)
}

pub fn mintscan_tx_url(hash_hex: &str) -> String {
    format!("{MINTSCAN_TX_URL}{hash_hex}")
}

/// Finds the `id` attribute of the `wasm` event.
/// Nodes on older CometBFT versions send attributes base64 encoded, both forms are accepted.
pub fn extract_record_id(events: &[Event]) -> Option<u64> {
    events
        .iter()
        .filter(|event| event.kind == "wasm")
        .flat_map(|event| event.attributes.iter())
        .find_map(|attr| {
            let key = String::from_utf8_lossy(attr.key_bytes());
            let value = String::from_utf8_lossy(attr.value_bytes());

            if key == "id" {
                return value.trim().parse().ok();
            }

            match decode_printable(&key) {
                Some(key) if key == "id" => decode_printable(&value)
                    .unwrap_or_else(|| value.to_string())
                    .trim()
                    .parse()
                    .ok(),
                _ => None,
            }
        })
}

// base64 text that decodes to printable ascii, anything else is taken as plain
fn decode_printable(s: &str) -> Option<String> {
    let decoded = STANDARD.decode(s).ok()?;
    let printable = !decoded.is_empty()
        && decoded
            .iter()
            .all(|b| matches!(b, b'\t' | b'\n' | b'\r' | 0x20..=0x7e));

    if printable {
        String::from_utf8(decoded).ok()
    } else {
        None
    }
}

#[derive(Clone, Debug)]
pub struct TxSearchPageReq {
    pub query: String,
    /// 1-based
    pub page: u32,
    pub per_page: u8,
    pub order: TxOrder,
    pub with_block_time: bool,
    pub block_time_delay: Duration,
}

impl TxSearchPageReq {
    pub fn new(query: String, config: &TxSearchConfig) -> Self {
        Self {
            query,
            page: 1,
            per_page: clamp_per_page(config.per_page),
            order: config.order,
            with_block_time: config.with_block_time,
            block_time_delay: config.block_time_delay(),
        }
    }
}

impl PagedRequest for TxSearchPageReq {
    type Cursor = u32;

    fn with_cursor(&self, page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1),
            ..self.clone()
        }
    }
}

impl QueryRequest for TxSearchPageReq {
    type QueryResponse = CountedPage<TxRow>;

    async fn request(&self, client: QueryClient) -> Result<CountedPage<TxRow>> {
        let page = self.page.max(1);

        let resp = client
            .rpc_client()?
            .tx_search(self.query.clone(), page, self.per_page, self.order)
            .await
            .inspect_err(|err| {
                tracing::debug!(page, query = %self.query, "tx_search failed: {err}")
            })?;

        let mut rows: Vec<TxRow> = resp.txs.into_iter().map(TxRow::from).collect();

        if self.with_block_time {
            attach_block_times(&client, &mut rows, self.block_time_delay).await?;
        }

        Ok(CountedPage {
            items: rows,
            page,
            per_page: self.per_page.into(),
            total_count: resp.total_count.into(),
        })
    }
}

// one lookup per distinct height, spaced out so public nodes don't rate limit us
async fn attach_block_times(
    client: &QueryClient,
    rows: &mut [TxRow],
    delay: Duration,
) -> Result<()> {
    let mut heights: Vec<u64> = Vec::new();
    for row in rows.iter() {
        if !heights.contains(&row.height) {
            heights.push(row.height);
        }
    }

    let mut times = Vec::with_capacity(heights.len());
    for (i, height) in heights.into_iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            futures_timer::Delay::new(delay).await;
        }

        let time = BlockTimeReq { height }.request(client.clone()).await?;
        times.push((height, time.to_rfc3339()));
    }

    for row in rows.iter_mut() {
        row.block_time = times
            .iter()
            .find(|(height, _)| *height == row.height)
            .map(|(_, time)| time.clone());
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn wasm_event(attributes: Vec<(&str, &str)>) -> Event {
        Event::new("wasm", attributes)
    }

    #[test]
    fn record_id_from_plain_attributes() {
        let events = vec![
            Event::new("message", vec![("id", "99")]),
            wasm_event(vec![
                (
                    "_contract_address",
                    "neutron1n0h44yyn6lhswspgvgwn4nzak6q8aj5qx0vaj95k2n0pl4zlcv8qcwzcc3",
                ),
                ("action", "store"),
                ("id", "42"),
            ]),
        ];
        assert_eq!(extract_record_id(&events), Some(42));
    }

    #[test]
    fn record_id_from_base64_attributes() {
        // "id" / "7"
        let events = vec![wasm_event(vec![("YWN0aW9u", "c3RvcmU="), ("aWQ=", "Nw==")])];
        assert_eq!(extract_record_id(&events), Some(7));
    }

    #[test]
    fn no_record_id() {
        let events = vec![wasm_event(vec![("action", "hide")])];
        assert_eq!(extract_record_id(&events), None);
        assert_eq!(extract_record_id(&[]), None);
    }

    #[test]
    fn binary_base64_is_not_decoded() {
        assert_eq!(decode_printable("aWQ="), Some("id".to_string()));
        // 0xff 0x00
        assert_eq!(decode_printable("/wA="), None);
        assert_eq!(decode_printable("not base64!"), None);
    }

    #[test]
    fn per_page_is_clamped() {
        assert_eq!(clamp_per_page(0), 1);
        assert_eq!(clamp_per_page(50), 50);
        assert_eq!(clamp_per_page(255), 100);
    }

    #[test]
    fn page_requests_start_at_one() {
        let req = TxSearchPageReq::new(
            TxQueryStrategy::WasmContractAddress.query("neutron1abc"),
            &TxSearchConfig::default(),
        );
        assert_eq!(req.page, 1);
        assert_eq!(req.with_cursor(Some(3)).page, 3);
        assert_eq!(req.with_cursor(None).page, 1);
        assert_eq!(req.per_page, 50);
        assert_eq!(req.order, TxOrder::Desc);
    }

    #[tokio::test]
    async fn pager_walks_pages_until_total_count() {
        let config = TxSearchConfig {
            per_page: 2,
            ..Default::default()
        };
        let base = TxSearchPageReq::new(
            TxQueryStrategy::MessageContractAddress.query("neutron1abc"),
            &config,
        );

        let mut sent = Vec::new();
        let aggregate = Pager::default()
            .collect(|page| {
                let req = base.with_cursor(page);
                sent.push((req.page, req.per_page, req.query.clone(), req.order));

                let page = CountedPage {
                    items: vec![req.page; 2],
                    page: req.page,
                    per_page: req.per_page.into(),
                    total_count: 5,
                };
                async move { Ok::<_, anyhow::Error>(page) }
            })
            .await
            .unwrap();

        let query = "message.contract_address='neutron1abc'".to_string();
        assert_eq!(
            sent,
            vec![
                (1, 2, query.clone(), TxOrder::Desc),
                (2, 2, query.clone(), TxOrder::Desc),
                (3, 2, query, TxOrder::Desc),
            ]
        );
        assert_eq!(aggregate.items, vec![1, 1, 2, 2, 3, 3]);
        assert_eq!(aggregate.meta.total_count, 5);
    }

    #[tokio::test]
    async fn transport_error_surfaces_unwrapped() {
        let chain_config = ChainConfig {
            chain_id: ChainId::new("pion-1"),
            rpc_endpoint: Some("http://127.0.0.1:1".to_string()),
            grpc_endpoint: None,
            grpc_web_endpoint: None,
            bech32_prefix: "neutron".to_string(),
        };
        let client = QueryClient::new(
            chain_config,
            QueryConfig::default(),
            Some(ConnectionMode::Rpc),
        )
        .await
        .unwrap();

        let err = client
            .all_tx_search("tx.height=1")
            .await
            .unwrap_err();

        assert_eq!(err.chain().count(), 1);
        assert!(matches!(
            err.downcast_ref::<NetworkError>(),
            Some(NetworkError::Rpc(_))
        ));
    }

    #[test]
    fn mintscan_link() {
        assert_eq!(
            mintscan_tx_url("ABCDEF"),
            "https://www.mintscan.io/neutron-testnet/tx/ABCDEF"
        );
    }
}
