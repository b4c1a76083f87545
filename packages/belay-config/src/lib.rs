mod config;
mod error;
mod pagination;
mod util;

pub use config::*;
pub use error::*;
pub use pagination::*;
pub use util::*;
