use std::future::Future;

use anyhow::Result;

use super::{Aggregate, Page, Pager};
use crate::error::PaginationError;

/// The outcome of trying query strategies in order
#[derive(Clone, Debug, PartialEq)]
pub struct StrategyAggregate<S, T, M> {
    /// the first strategy that produced items, `None` if none did
    pub strategy: Option<S>,
    /// every strategy that ran, in order
    pub attempted: Vec<S>,
    /// the chosen strategy's aggregate, or the last one tried
    pub aggregate: Aggregate<T, M>,
}

impl Pager {
    /// Runs a full aggregation per strategy until one yields items.
    ///
    /// A strategy is abandoned only when its complete aggregate is empty,
    /// every page of the chosen one is fetched with that same strategy.
    /// Errors stop the search immediately.
    pub async fn collect_with_strategies<S, P, F, Fut>(
        &self,
        strategies: &[S],
        mut fetch_page: F,
    ) -> Result<StrategyAggregate<S, P::Item, P::Meta>>
    where
        S: Clone + std::fmt::Debug,
        P: Page,
        F: FnMut(&S, Option<P::Cursor>) -> Fut,
        Fut: Future<Output = Result<P>>,
    {
        let mut attempted = Vec::with_capacity(strategies.len());
        let mut last = None;

        for strategy in strategies {
            attempted.push(strategy.clone());

            let aggregate = self
                .collect(|cursor| fetch_page(strategy, cursor))
                .await?;

            if !aggregate.is_empty() {
                return Ok(StrategyAggregate {
                    strategy: Some(strategy.clone()),
                    attempted,
                    aggregate,
                });
            }

            tracing::warn!(?strategy, "query strategy returned nothing");
            last = Some(aggregate);
        }

        match last {
            Some(aggregate) => Ok(StrategyAggregate {
                strategy: None,
                attempted,
                aggregate,
            }),
            None => Err(PaginationError::NoStrategies.into()),
        }
    }
}
