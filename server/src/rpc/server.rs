//! JSON-RPC request handling
//!
//! Routes `health`, `recommend` and `batch_recommend` to the shared
//! `ServingContext`. Pipeline work runs on the blocking pool so a slow
//! encoder never stalls the reader loop.

use super::protocol::*;
use super::transport::LineTransport;
use crate::error::{ServerError, ServerResult};
use assessment_core::{
    normalize_top_k, validate_batch_len, validate_query, BatchEntry, ServingContext,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};

const SERVER_NAME: &str = "assessment-recommender";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Request router over a loaded recommender
pub struct RpcServer {
    ctx: Arc<ServingContext>,
    started_at: DateTime<Utc>,
}

impl RpcServer {
    pub fn new(ctx: Arc<ServingContext>) -> Self {
        Self {
            ctx,
            started_at: Utc::now(),
        }
    }

    /// Serve until the input stream closes
    pub async fn run<R, W>(&self, transport: &mut LineTransport<R, W>) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("Server running on stdio");

        while let Some(line) = transport.read_line().await? {
            if line.is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                transport.write_response(&response).await?;
            }
        }

        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    /// Parse and dispatch one raw message. Notifications (no id) get no reply
    /// unless the message could not be parsed at all.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Failed to parse request: {}", e);
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(format!("Parse error: {}", e)),
                ));
            }
        };

        let is_notification = request.id.is_none();
        let response = self.handle_request(request).await;
        if is_notification {
            None
        } else {
            Some(response)
        }
    }

    /// Dispatch a parsed request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("Handling request: {}", request.method);

        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
            );
        }

        let result = match request.method.as_str() {
            "health" => Ok(self.handle_health()),
            "recommend" => self.handle_recommend(request.params).await,
            "batch_recommend" => self.handle_batch(request.params).await,
            other => {
                tracing::warn!("Unknown method: {}", other);
                return JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::method_not_found(other),
                );
            }
        };

        match result {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => {
                tracing::error!("{} failed: {}", request.method, e);
                JsonRpcResponse::error(request.id, e.into())
            }
        }
    }

    fn handle_health(&self) -> Value {
        let now = Utc::now();
        json!({
            "status": "healthy",
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
            "catalog_size": self.ctx.catalog().len(),
            "dimension": self.ctx.index().dimension(),
            "encoder": self.ctx.encoder().model_name(),
            "uptime_secs": (now - self.started_at).num_seconds(),
            "timestamp": now.to_rfc3339(),
        })
    }

    async fn handle_recommend(&self, params: Option<Value>) -> ServerResult<Value> {
        let params: RecommendParams = parse_params(params)?;
        let ranking = &self.ctx.config().ranking;

        let query = params
            .query
            .as_str()
            .ok_or_else(|| ServerError::invalid_params("'query' must be a string"))?;
        let query = validate_query(query, ranking)?;
        let top_k = normalize_top_k(params.top_k.as_ref(), ranking);

        let ctx = Arc::clone(&self.ctx);
        let q = query.clone();
        let recommendations =
            tokio::task::spawn_blocking(move || ctx.recommend(&q, top_k)).await??;

        Ok(json!({
            "query": query,
            "count": recommendations.len(),
            "recommendations": recommendations,
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }

    async fn handle_batch(&self, params: Option<Value>) -> ServerResult<Value> {
        let params: BatchParams = parse_params(params)?;
        let ranking = &self.ctx.config().ranking;

        let queries = match params.queries {
            Value::Array(items) => items,
            _ => return Err(ServerError::invalid_params("'queries' must be a list")),
        };
        validate_batch_len(queries.len(), ranking)?;
        let top_k = normalize_top_k(params.top_k.as_ref(), ranking);

        let ctx = Arc::clone(&self.ctx);
        let results: Vec<BatchEntry> = tokio::task::spawn_blocking(move || {
            queries
                .iter()
                .map(|q| match q.as_str() {
                    Some(text) => BatchEntry::run(&ctx, text, top_k),
                    None => BatchEntry::error(q.to_string(), "query must be a string"),
                })
                .collect()
        })
        .await?;

        let failed = results.iter().filter(|e| e.is_error()).count();
        tracing::info!(
            "Batch of {} queries done ({} failed)",
            results.len(),
            failed
        );

        Ok(json!({
            "results": results,
            "count": results.len(),
            "failed": failed,
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<Value>) -> ServerResult<T> {
    let params = params.ok_or_else(|| ServerError::invalid_params("missing params"))?;
    serde_json::from_value(params).map_err(|e| ServerError::invalid_params(e.to_string()))
}
