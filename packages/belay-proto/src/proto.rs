// Exported in the root because it's needed to encode every request
pub use cosmos_sdk_proto::traits::Message;

// ibc-proto carries its own copy of the client height type
pub use ibc_proto::ibc::core::client::v1::Height as RevisionHeight;

// the rest are all in distinct modules
pub mod tendermint {
    pub use cosmos_sdk_proto::cosmos::base::tendermint::v1beta1::*;
}

pub mod wasm {
    pub use cosmos_sdk_proto::cosmwasm::wasm::v1::*;
}

pub mod ibc {
    pub use ibc_proto::ibc::core::channel::v1 as channel;
    pub use ibc_proto::ibc::core::client::v1 as client;
    pub use ibc_proto::ibc::core::connection::v1 as connection;

    /// Pagination types as compiled into ibc-proto.
    /// These are distinct Rust types from cosmos-sdk-proto's,
    /// even though they describe the same protobuf messages.
    pub mod query {
        pub use ibc_proto::cosmos::base::query::v1beta1::{PageRequest, PageResponse};
    }

    pub use crate::transfer;
}
