//! Assessment recommendation server
//!
//! Wraps `assessment-core` in a JSON-RPC stdio service and a couple of
//! command-line jobs (single query, bulk prediction).

pub mod error;
pub mod predict;
pub mod rpc;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::{ServerError, ServerResult};
pub use predict::{run_predictions, PredictionSummary};
pub use rpc::RpcServer;
