use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::instrument;

use super::contract::ContractSmartRawReq;
use crate::{
    contract_helpers::contract_msg_to_vec,
    pagination::{Aggregate, CursorPage},
    prelude::*,
};

/// Narrows list and count queries, applied by the contract on every page
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geohash_prefix: Option<String>,
    /// earliest `observed_at`, inclusive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    /// latest `observed_at`, inclusive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: u64,
    pub sender: String,
    pub observed_at: u64,
    pub species: Option<String>,
    pub geohash_prefix: String,
    pub cid: String,
    pub payload: serde_json::Value,
    pub block_time: u64,
    pub block_height: u64,
    pub hidden: bool,
    pub hidden_reason: Option<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub verifications: Vec<Verification>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub at: u64,
    pub by: String,
    pub note: Option<String>,
    pub photo_cid: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub at: u64,
    pub verifier: String,
    pub taxon_id: String,
    pub confidence: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecordList {
    pub records: Vec<StoredRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CidEntry {
    pub id: u64,
    pub cid: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
enum RecordQueryMsg {
    List {
        #[serde(skip_serializing_if = "Option::is_none")]
        species: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        geohash_prefix: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        start: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        end: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        start_after: Option<u64>,
    },
    Get {
        id: u64,
    },
    Count {
        #[serde(skip_serializing_if = "Option::is_none")]
        species: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        geohash_prefix: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        start: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        end: Option<u64>,
    },
}

impl RecordQueryMsg {
    fn count(filter: &RecordFilter) -> Self {
        let RecordFilter {
            species,
            geohash_prefix,
            start,
            end,
        } = filter.clone();

        Self::Count {
            species,
            geohash_prefix,
            start,
            end,
        }
    }
}

#[derive(Deserialize, Debug)]
struct ListResp {
    records: Vec<StoredRecord>,
    next_start_after: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct GetResp {
    record: Option<StoredRecord>,
}

#[derive(Deserialize, Debug)]
struct CountResp {
    count: u64,
}

impl QueryClient {
    #[instrument]
    pub async fn all_contract_records(
        &self,
        address: &Address,
        filter: &RecordFilter,
    ) -> Result<RecordList> {
        let aggregate = self
            .run_paginated(ContractRecordsPageReq {
                address: address.clone(),
                filter: filter.clone(),
                limit: self.records_page_limit(),
                start_after: None,
            })
            .await?;

        Ok(into_record_list(aggregate))
    }

    #[instrument]
    pub async fn contract_records_page(
        &self,
        address: &Address,
        filter: &RecordFilter,
        start_after: Option<u64>,
    ) -> Result<CursorPage<StoredRecord>> {
        self.run_with_middleware(ContractRecordsPageReq {
            address: address.clone(),
            filter: filter.clone(),
            limit: self.records_page_limit(),
            start_after,
        })
        .await
    }

    /// Every record's id and CID, in the order the contract listed them
    #[instrument]
    pub async fn contract_cid_list(
        &self,
        address: &Address,
        filter: &RecordFilter,
    ) -> Result<Vec<CidEntry>> {
        let aggregate = self
            .run_paginated(ContractRecordsPageReq {
                address: address.clone(),
                filter: filter.clone(),
                limit: self.records_page_limit(),
                start_after: None,
            })
            .await?;

        Ok(into_cid_list(aggregate))
    }

    #[instrument]
    pub async fn contract_record(&self, address: &Address, id: u64) -> Result<StoredRecord> {
        let resp: GetResp = self
            .run_with_middleware(ContractRecordQueryReq::new(
                address,
                &RecordQueryMsg::Get { id },
            )?)
            .await
            .and_then(|raw| decode_contract_resp(&raw))?;

        resp.record
            .ok_or_else(|| BelayError::not_found(format!("record {id} in {address}")).into())
    }

    #[instrument]
    pub async fn contract_record_count(
        &self,
        address: &Address,
        filter: &RecordFilter,
    ) -> Result<u64> {
        let resp: CountResp = self
            .run_with_middleware(ContractRecordQueryReq::new(
                address,
                &RecordQueryMsg::count(filter),
            )?)
            .await
            .and_then(|raw| decode_contract_resp(&raw))?;

        Ok(resp.count)
    }

    fn records_page_limit(&self) -> u32 {
        u32::try_from(self.query_config.pagination.page_limit).unwrap_or(u32::MAX)
    }
}

pub fn into_record_list(aggregate: Aggregate<StoredRecord, ()>) -> RecordList {
    RecordList {
        records: aggregate.items,
    }
}

pub fn into_cid_list(aggregate: Aggregate<StoredRecord, ()>) -> Vec<CidEntry> {
    aggregate
        .items
        .into_iter()
        .map(|record| CidEntry {
            id: record.id,
            cid: record.cid,
        })
        .collect()
}

/// Keeps entries whose id contains `query`, or whose CID contains it ignoring case.
/// A blank query keeps everything.
pub fn filter_cids<'a>(entries: &'a [CidEntry], query: &str) -> Vec<&'a CidEntry> {
    let query = query.trim();
    if query.is_empty() {
        return entries.iter().collect();
    }

    let lowered = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            entry.id.to_string().contains(query) || entry.cid.to_lowercase().contains(&lowered)
        })
        .collect()
}

/// One `id<TAB>cid` line per entry, no header
pub fn cids_to_tsv<'a>(entries: impl IntoIterator<Item = &'a CidEntry>) -> String {
    entries
        .into_iter()
        .map(|entry| format!("{}\t{}", entry.id, entry.cid))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `id,cid` header, then one row per entry with the CID always quoted
pub fn cids_to_csv<'a>(entries: impl IntoIterator<Item = &'a CidEntry>) -> String {
    let rows = entries
        .into_iter()
        .map(|entry| format!("{},\"{}\"", entry.id, entry.cid.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join("\n");

    format!("id,cid\n{rows}")
}

fn decode_contract_resp<T: DeserializeOwned>(raw: &[u8]) -> Result<T> {
    serde_json::from_slice(raw).map_err(|err| {
        PaginationError::malformed(format!("unexpected contract response: {err}")).into()
    })
}

/// One `{"list":{..,"limit":N,"start_after":K}}` page, continued by the last id returned.
///
/// Species and geohash filtered lists walk id ordered indexes. Unfiltered lists
/// walk the time index and resume after `(start, start_after)`, which sorts
/// before every later observation, so a second page repeats the first and the
/// run ends with a stalled cursor error.
#[derive(Clone, Debug)]
pub struct ContractRecordsPageReq {
    pub address: Address,
    pub filter: RecordFilter,
    pub limit: u32,
    pub start_after: Option<u64>,
}

impl PagedRequest for ContractRecordsPageReq {
    type Cursor = u64;

    fn with_cursor(&self, start_after: Option<u64>) -> Self {
        Self {
            start_after,
            ..self.clone()
        }
    }
}

impl ContractRecordsPageReq {
    fn msg(&self) -> RecordQueryMsg {
        let RecordFilter {
            species,
            geohash_prefix,
            start,
            end,
        } = self.filter.clone();

        RecordQueryMsg::List {
            species,
            geohash_prefix,
            start,
            end,
            limit: Some(self.limit),
            start_after: self.start_after,
        }
    }
}

impl QueryRequest for ContractRecordsPageReq {
    type QueryResponse = CursorPage<StoredRecord>;

    async fn request(&self, client: QueryClient) -> Result<CursorPage<StoredRecord>> {
        let raw = ContractSmartRawReq {
            address: self.address.clone(),
            msg: contract_msg_to_vec(&self.msg())?,
        }
        .request(client)
        .await?;

        let resp: ListResp = decode_contract_resp(&raw)?;

        Ok(CursorPage {
            items: resp.records,
            next_start_after: resp.next_start_after,
        })
    }
}

/// A single non-paginated record query, answered as raw json
#[derive(Clone, Debug)]
struct ContractRecordQueryReq {
    address: Address,
    msg: Vec<u8>,
}

impl ContractRecordQueryReq {
    fn new(address: &Address, msg: &RecordQueryMsg) -> Result<Self> {
        Ok(Self {
            address: address.clone(),
            msg: contract_msg_to_vec(msg)?,
        })
    }
}

impl QueryRequest for ContractRecordQueryReq {
    type QueryResponse = Vec<u8>;

    async fn request(&self, client: QueryClient) -> Result<Vec<u8>> {
        ContractSmartRawReq {
            address: self.address.clone(),
            msg: self.msg.clone(),
        }
        .request(client)
        .await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(id: u64, cid: &str) -> CidEntry {
        CidEntry {
            id,
            cid: cid.to_string(),
        }
    }

    fn record(id: u64) -> StoredRecord {
        StoredRecord {
            id,
            sender: String::new(),
            observed_at: 0,
            species: None,
            geohash_prefix: String::new(),
            cid: format!("bafy{id}"),
            payload: serde_json::Value::Null,
            block_time: 0,
            block_height: 0,
            hidden: false,
            hidden_reason: None,
            annotations: Vec::new(),
            verifications: Vec::new(),
        }
    }

    #[test]
    fn list_msg_shape() {
        let req = ContractRecordsPageReq {
            address: Address::new_str(
                "neutron1n0h44yyn6lhswspgvgwn4nzak6q8aj5qx0vaj95k2n0pl4zlcv8qcwzcc3",
                None,
            )
            .unwrap(),
            filter: RecordFilter {
                species: Some("quercus robur".to_string()),
                ..Default::default()
            },
            limit: 100,
            start_after: None,
        };

        let first: serde_json::Value =
            serde_json::from_slice(&contract_msg_to_vec(&req.msg()).unwrap()).unwrap();
        assert_eq!(
            first,
            serde_json::json!({"list": {"species": "quercus robur", "limit": 100}})
        );

        let second: serde_json::Value = serde_json::from_slice(
            &contract_msg_to_vec(&req.with_cursor(Some(5)).msg()).unwrap(),
        )
        .unwrap();
        assert_eq!(second["list"]["start_after"], 5);
        assert_eq!(second["list"]["species"], "quercus robur");
    }

    #[tokio::test]
    async fn pager_keeps_filter_and_limit_across_pages() {
        let base = ContractRecordsPageReq {
            address: Address::new_str(
                "neutron1n0h44yyn6lhswspgvgwn4nzak6q8aj5qx0vaj95k2n0pl4zlcv8qcwzcc3",
                None,
            )
            .unwrap(),
            filter: RecordFilter {
                geohash_prefix: Some("xn76".to_string()),
                start: Some(1_700_000_000),
                ..Default::default()
            },
            limit: 2,
            start_after: None,
        };

        let mut sent = Vec::new();
        let aggregate = Pager::default()
            .collect(|start_after| {
                let req = base.with_cursor(start_after);
                let msg: serde_json::Value =
                    serde_json::from_slice(&contract_msg_to_vec(&req.msg()).unwrap()).unwrap();
                sent.push(msg);

                let page = match req.start_after {
                    None => CursorPage {
                        items: vec![record(4), record(9)],
                        next_start_after: Some(9),
                    },
                    Some(_) => CursorPage {
                        items: vec![record(15)],
                        next_start_after: None,
                    },
                };
                async move { Ok::<_, anyhow::Error>(page) }
            })
            .await
            .unwrap();

        assert_eq!(
            sent,
            vec![
                serde_json::json!({"list": {"geohash_prefix": "xn76", "start": 1_700_000_000u64, "limit": 2}}),
                serde_json::json!({"list": {"geohash_prefix": "xn76", "start": 1_700_000_000u64, "limit": 2, "start_after": 9}}),
            ]
        );
        assert_eq!(
            into_cid_list(aggregate),
            vec![entry(4, "bafy4"), entry(9, "bafy9"), entry(15, "bafy15")]
        );
    }

    #[test]
    fn get_and_count_msgs() {
        let get = contract_msg_to_vec(&RecordQueryMsg::Get { id: 7 }).unwrap();
        assert_eq!(get, br#"{"get":{"id":7}}"#.to_vec());

        let count = contract_msg_to_vec(&RecordQueryMsg::count(&RecordFilter::default())).unwrap();
        assert_eq!(count, br#"{"count":{}}"#.to_vec());
    }

    #[test]
    fn list_response_without_records_is_malformed() {
        let err = decode_contract_resp::<ListResp>(br#"{"next_start_after":null}"#).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PaginationError>(),
            Some(PaginationError::Malformed(_))
        ));
    }

    #[test]
    fn decodes_stored_records() {
        let raw = br#"{
            "records": [{
                "id": 1,
                "sender": "neutron1sender",
                "observed_at": 1717200000,
                "species": null,
                "geohash_prefix": "xn76",
                "cid": "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi",
                "payload": {"note": "crag base"},
                "block_time": 1717200005,
                "block_height": 1234,
                "hidden": false,
                "hidden_reason": null,
                "annotations": [],
                "verifications": []
            }],
            "next_start_after": 1
        }"#;

        let resp: ListResp = decode_contract_resp(raw).unwrap();
        assert_eq!(resp.next_start_after, Some(1));
        assert_eq!(resp.records[0].geohash_prefix, "xn76");
        assert_eq!(resp.records[0].payload["note"], "crag base");
    }

    #[test]
    fn cid_list_keeps_fetch_order() {
        let cids = into_cid_list(Aggregate {
            items: vec![record(3), record(1), record(2)],
            meta: (),
            pages: 2,
        });
        assert_eq!(
            cids.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![3, 1, 2]
        );
    }

    #[test]
    fn exports() {
        let entries = vec![entry(1, "bafyA"), entry(12, "bafy\"q\"")];
        assert_eq!(cids_to_tsv(&entries), "1\tbafyA\n12\tbafy\"q\"");
        assert_eq!(
            cids_to_csv(&entries),
            "id,cid\n1,\"bafyA\"\n12,\"bafy\"\"q\"\"\""
        );
    }

    #[test]
    fn filtering() {
        let entries = vec![entry(1, "bafyABC"), entry(12, "bafyxyz"), entry(30, "qm12")];

        let ids = |query| {
            filter_cids(&entries, query)
                .into_iter()
                .map(|e| e.id)
                .collect::<Vec<_>>()
        };

        assert_eq!(ids(""), vec![1, 12, 30]);
        assert_eq!(ids("abc"), vec![1]);
        assert_eq!(ids("12"), vec![12, 30]);
    }
}
