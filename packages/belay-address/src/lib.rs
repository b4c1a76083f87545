mod address;
mod config_ext;

pub use address::*;
pub use config_ext::*;
