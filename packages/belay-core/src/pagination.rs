mod abort;
mod page;
mod pager;
mod strategy;

pub use abort::{AbortHandle, AbortSignal};
pub use page::{normalize_key, Aggregate, CountedMeta, CountedPage, CursorPage, KeyedPage, Page};
pub use pager::Pager;
pub use strategy::StrategyAggregate;
