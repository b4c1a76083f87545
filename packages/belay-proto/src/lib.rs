mod helpers;
mod proto;
pub mod transfer;

pub use helpers::*;
pub use proto::*;
