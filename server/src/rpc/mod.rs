//! JSON-RPC server module
//!
//! Serves recommendations over stdio using JSON-RPC 2.0, one message per line.
//!
//! ## Usage
//!
//! ```bash
//! assessment-server serve --data-dir data/processed
//! ```
//!
//! Methods: `health`, `recommend`, `batch_recommend`.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::*;
pub use server::RpcServer;
pub use transport::LineTransport;
