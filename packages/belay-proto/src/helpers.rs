use super::proto::*;

/// Builds the page request for one step of a key-paginated IBC query.
///
/// `key` is passed through verbatim, an absent key asks for the first page.
pub fn ibc_page_request(key: Option<Vec<u8>>, limit: u64) -> ibc::query::PageRequest {
    ibc::query::PageRequest {
        key: key.unwrap_or_default(),
        offset: 0,
        limit,
        count_total: false,
        reverse: false,
    }
}

/// The next key of a module page response, if the node sent one at all
pub fn ibc_next_key(pagination: Option<ibc::query::PageResponse>) -> Option<Vec<u8>> {
    pagination.map(|p| p.next_key)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn first_page_has_empty_key() {
        let req = ibc_page_request(None, 25);
        assert!(req.key.is_empty());
        assert_eq!(req.limit, 25);
        assert!(!req.count_total);
    }

    #[test]
    fn key_passes_through_verbatim() {
        let req = ibc_page_request(Some(vec![0, 1, 2, 255]), 10);
        assert_eq!(req.key, vec![0, 1, 2, 255]);
    }

    #[test]
    fn missing_pagination_has_no_key() {
        assert_eq!(ibc_next_key(None), None);
        assert_eq!(
            ibc_next_key(Some(ibc::query::PageResponse {
                next_key: vec![7],
                total: 0
            })),
            Some(vec![7])
        );
    }
}
