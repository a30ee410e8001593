//! DIS Runtime - Node orchestration and main loop
//!
//! A node owns one transport and one dispatch factory. Each tick:
//! 1. Poll the socket when the receive interval has elapsed
//! 2. Dispatch every received PDU to the registered callbacks
//! 3. Flush the pending bundle when the flush interval has elapsed
//!
//! `Node::tick` is synchronous; `Node::run` drives it from a tokio interval.

pub mod config;
pub mod error;
pub mod node;
pub mod telemetry;

pub use config::*;
pub use error::*;
pub use node::*;
pub use telemetry::*;
