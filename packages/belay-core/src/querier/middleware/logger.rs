use std::sync::Arc;

use crate::prelude::*;

type LoggerFn = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Clone)]
pub struct QueryLoggerMiddlewareMapReq {
    pub logger_fn: LoggerFn,
}
impl QueryLoggerMiddlewareMapReq {
    pub fn new<F>(logger_fn: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        Self {
            logger_fn: Arc::new(logger_fn),
        }
    }
}
impl Default for QueryLoggerMiddlewareMapReq {
    fn default() -> Self {
        Self::new(|msg| tracing::debug!(target: "belay::query", "request: {msg}"))
    }
}

impl QueryLoggerMiddlewareMapReq {
    pub async fn map_req<REQ: QueryRequest>(&self, req: REQ) -> Result<REQ> {
        (self.logger_fn)(format!("{req:?}"));
        Ok(req)
    }
}

#[derive(Clone)]
pub struct QueryLoggerMiddlewareMapResp {
    pub logger_fn: LoggerFn,
}
impl QueryLoggerMiddlewareMapResp {
    pub fn new<F>(logger_fn: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        Self {
            logger_fn: Arc::new(logger_fn),
        }
    }
}
impl Default for QueryLoggerMiddlewareMapResp {
    // responses can be whole pages of records, only worth it at trace level
    fn default() -> Self {
        Self::new(|msg| tracing::trace!(target: "belay::query", "response: {msg}"))
    }
}

impl QueryLoggerMiddlewareMapResp {
    pub async fn map_resp<RESP: std::fmt::Debug + Send>(&self, resp: RESP) -> Result<RESP> {
        if tracing::enabled!(target: "belay::query", tracing::Level::TRACE) {
            (self.logger_fn)(format!("{resp:?}"));
        }
        Ok(resp)
    }
}
