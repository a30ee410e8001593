//! DIS Transport Layer - UDP sockets and PDU bundling
//!
//! This crate provides:
//! - Transport configuration (port, broadcast, multicast, unicast targets)
//! - Non-blocking UDP socket setup with broadcast and multicast membership
//! - Bundling of several PDUs into one datagram
//! - A tick-driven transport that feeds received datagrams to a `PduFactory`

pub mod bundle;
pub mod config;
pub mod socket;
pub mod udp;

pub use bundle::*;
pub use config::*;
pub use socket::*;
pub use udp::*;
