pub mod prelude;

pub use belay_core::{
    // listing manually so we can exclude the prelude (which is re-exported in the prelude module here, along with config, address, etc.)
    // and not confuse ide's with multiple preludes
    cache,
    contract_helpers,
    error,
    ibc_types,
    network,
    pagination,
    querier,
};

// in case anyone wants to use the protobufs directly
pub mod proto {
    pub use belay_proto::*;
}
