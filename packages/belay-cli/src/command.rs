mod contract;
mod ibc;
mod node;
mod tx;

pub use contract::*;
pub use ibc::*;
pub use node::*;
pub use tx::*;
