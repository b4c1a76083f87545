use crate::address::Address;
use anyhow::Result;
use belay_config::ChainConfig;

pub trait ConfigAddressExt {
    fn parse_address(&self, value: &str) -> Result<Address>;
}

impl ConfigAddressExt for ChainConfig {
    fn parse_address(&self, value: &str) -> Result<Address> {
        Address::new_str(value.trim(), Some(&self.bech32_prefix))
    }
}
