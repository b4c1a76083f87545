use serde::Serialize;

use crate::prelude::*;

/// Parses a contract message typed on the command line.
/// `None` encodes the cosmwasm-friendly empty message `{}`.
pub fn contract_str_to_msg<'a>(s: impl Into<Option<&'a str>>) -> Result<serde_json::Value> {
    match s.into() {
        Some(s) => serde_json::from_str(s).map_err(|err| anyhow!("{}", err)),
        None => Ok(serde_json::Value::Object(Default::default())),
    }
}

// internal helper to convert a message to a vec of bytes, not part of the public API
pub(crate) fn contract_msg_to_vec(s: &impl Serialize) -> Result<Vec<u8>> {
    cosmwasm_std::to_json_vec(s).map_err(|err| anyhow!("{}", err))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_message_is_an_object() {
        let msg = contract_str_to_msg(None).unwrap();
        assert_eq!(contract_msg_to_vec(&msg).unwrap(), b"{}".to_vec());
    }

    #[test]
    fn parses_json_messages() {
        let msg = contract_str_to_msg(r#"{"get":{"id":3}}"#).unwrap();
        assert_eq!(msg["get"]["id"], 3);
        assert!(contract_str_to_msg("{get").is_err());
    }
}
