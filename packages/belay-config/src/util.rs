use url::Url;

use crate::BelayConfigError;

/// Trims whitespace and any trailing slash, and checks the endpoint parses as a url.
/// Endpoints without a scheme are treated as http for the check but returned as-is.
pub fn normalize_endpoint(input: &str) -> Result<String, BelayConfigError> {
    let trimmed = input.trim().trim_end_matches('/');

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let url = Url::parse(&with_scheme).map_err(|e| BelayConfigError::invalid_endpoint(input, e))?;

    if url.host_str().is_none() {
        return Err(BelayConfigError::invalid_endpoint(input, "missing host"));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod test {
    use super::normalize_endpoint;

    #[test]
    fn strips_trailing_slash_and_whitespace() {
        assert_eq!(
            normalize_endpoint(" https://rpc-palvus.pion-1.ntrn.tech:443/ ").unwrap(),
            "https://rpc-palvus.pion-1.ntrn.tech:443"
        );
    }

    #[test]
    fn keeps_schemeless_endpoints() {
        assert_eq!(
            normalize_endpoint("127.0.0.1:26657").unwrap(),
            "127.0.0.1:26657"
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(normalize_endpoint("http://").is_err());
    }
}
