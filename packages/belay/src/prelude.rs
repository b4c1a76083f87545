pub use belay_address::*;
pub use belay_config::*;
pub use belay_core::prelude::*;
pub use belay_core::querier::records::{cids_to_csv, cids_to_tsv, filter_cids};
pub use belay_core::querier::tx_search::{extract_record_id, mintscan_tx_url};

#[cfg(test)]
mod test {
    use super::*;

    // the glob import leaves `Result` as std's two-parameter type
    fn parse_height(s: &str) -> Result<u64, std::num::ParseIntError> {
        s.parse()
    }

    #[test]
    fn prelude_keeps_std_result() {
        assert_eq!(parse_height("42"), Ok(42));
        assert!(TxSearchConfig::default().validate().is_ok());
    }
}
