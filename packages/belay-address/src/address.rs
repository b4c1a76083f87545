use std::str::FromStr;

use anyhow::{bail, Context, Result};
use subtle_encoding::bech32;

/// A bech32 account or contract address, validated on construction.
/// Display is the plain bech32 string.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    bech32_addr: String,
    // prefix is the first part of the bech32 address
    prefix_len: usize,
}

impl Address {
    pub fn new_bytes(bytes: Vec<u8>, prefix: &str) -> Result<Self> {
        if !prefix.chars().all(|c| matches!(c, 'a'..='z' | '0'..='9')) {
            bail!("expected prefix to be lowercase alphanumeric characters only");
        }

        if bytes.len() > 255 {
            bail!(
                "account ID should be at most 255 bytes long, but was {} bytes long",
                bytes.len()
            );
        }

        let bech32_addr = bech32::encode(prefix, bytes);

        Ok(Self {
            bech32_addr,
            prefix_len: prefix.len(),
        })
    }

    // if the prefix is supplied, the decoded prefix must match it
    pub fn new_str(value: &str, prefix: Option<&str>) -> Result<Self> {
        let (decoded_prefix, decoded_bytes) = if value.starts_with(|c: char| c.is_uppercase()) {
            bech32::decode_upper(value)
        } else {
            bech32::decode(value)
        }
        .context(format!("invalid bech32: '{value}'"))?;

        if let Some(prefix) = prefix {
            if decoded_prefix != prefix {
                bail!(
                    "Address prefix \"{}\" does not match expected prefix \"{}\"",
                    decoded_prefix,
                    prefix
                );
            }
        }

        Self::new_bytes(decoded_bytes, &decoded_prefix)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let (_, bytes) = bech32::decode(&self.bech32_addr)
            .context(format!("invalid bech32: '{}'", self.bech32_addr))?;
        Ok(bytes)
    }

    pub fn prefix(&self) -> &str {
        &self.bech32_addr[..self.prefix_len]
    }

    pub fn as_str(&self) -> &str {
        &self.bech32_addr
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bech32_addr)
    }
}

impl FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new_str(s, None)
    }
}

impl serde::Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.bech32_addr)
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
