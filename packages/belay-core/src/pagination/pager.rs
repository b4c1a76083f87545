use std::{future::Future, time::Duration};

use anyhow::Result;
use belay_config::PaginationConfig;
use futures::future::{select, Either};
use futures_timer::Delay;

use super::{AbortSignal, Aggregate, Page};
use crate::error::{PaginationError, PaginationLimit};

/// Drives a paginated source to completion.
///
/// Pages are fetched strictly one after another, each request carrying the
/// cursor from the page before it. A failing page ends the run with that
/// page's error, nothing collected so far is returned.
#[derive(Clone, Debug, Default)]
pub struct Pager {
    config: PaginationConfig,
    abort: Option<AbortSignal>,
}

impl Pager {
    pub fn new(config: PaginationConfig) -> Self {
        Self {
            config,
            abort: None,
        }
    }

    pub fn with_abort(mut self, abort: AbortSignal) -> Self {
        self.abort = Some(abort);
        self
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    pub async fn collect<P, F, Fut>(&self, fetch_page: F) -> Result<Aggregate<P::Item, P::Meta>>
    where
        P: Page,
        F: FnMut(Option<P::Cursor>) -> Fut,
        Fut: Future<Output = Result<P>>,
    {
        with_timeout(self.drive(fetch_page), self.config.total_timeout(), |timeout| {
            PaginationError::TotalTimeout { timeout }
        })
        .await
    }

    async fn drive<P, F, Fut>(&self, mut fetch_page: F) -> Result<Aggregate<P::Item, P::Meta>>
    where
        P: Page,
        F: FnMut(Option<P::Cursor>) -> Fut,
        Fut: Future<Output = Result<P>>,
    {
        let mut cursor: Option<P::Cursor> = None;
        let mut items: Vec<P::Item> = Vec::new();
        let mut pages: u32 = 0;

        loop {
            if self.is_aborted() {
                return Err(PaginationError::Aborted { pages }.into());
            }

            if pages >= self.config.max_pages {
                return Err(PaginationError::LimitExceeded {
                    limit: PaginationLimit::Pages(self.config.max_pages),
                    pages,
                    items: items.len() as u64,
                }
                .into());
            }

            let page_number = pages + 1;
            let sent = cursor.take();
            let page = with_timeout(
                fetch_page(sent.clone()),
                self.config.page_timeout(),
                |timeout| PaginationError::PageTimeout {
                    page: page_number,
                    timeout,
                },
            )
            .await?;
            pages = page_number;

            let next = page.next_cursor();
            if next.is_some() && next == sent {
                return Err(PaginationError::StalledCursor {
                    page: pages,
                    cursor: format!("{:?}", sent),
                }
                .into());
            }

            let (page_items, meta) = page.into_parts();

            tracing::debug!(
                page = pages,
                items = page_items.len(),
                more = next.is_some(),
                "fetched page"
            );

            items.extend(page_items);

            if items.len() as u64 > self.config.max_items {
                return Err(PaginationError::LimitExceeded {
                    limit: PaginationLimit::Items(self.config.max_items),
                    pages,
                    items: items.len() as u64,
                }
                .into());
            }

            match next {
                Some(next) => cursor = Some(next),
                None => return Ok(Aggregate { items, meta, pages }),
            }
        }
    }

    fn is_aborted(&self) -> bool {
        self.abort
            .as_ref()
            .map(|abort| abort.is_aborted())
            .unwrap_or(false)
    }
}

async fn with_timeout<T>(
    fut: impl Future<Output = Result<T>>,
    timeout: Option<Duration>,
    on_timeout: impl FnOnce(Duration) -> PaginationError,
) -> Result<T> {
    let timeout = match timeout {
        Some(timeout) => timeout,
        None => return fut.await,
    };

    let fut = std::pin::pin!(fut);
    match select(fut, Delay::new(timeout)).await {
        Either::Left((res, _)) => res,
        Either::Right(_) => Err(on_timeout(timeout).into()),
    }
}
