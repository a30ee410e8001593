//! DIS Wire Protocol - Binary PDU format
//!
//! This crate implements the IEEE 1278.1 wire format:
//! - Big-endian byte-order codec (`DisReader` + `bytes::BufMut`)
//! - Fixed-size primitive records (entity type, vectors, appearance, ...)
//! - Discriminator-driven record families and their registries
//! - Count-prefixed collections of polymorphic records
//! - PDU bodies and the dispatch factory that segments bundled datagrams

#[macro_use]
mod macros;

pub mod codec;
pub mod collection;
pub mod datum;
pub mod descriptor;
pub mod dispatch;
pub mod header;
pub mod pdu;
pub mod records;
pub mod registry;
pub mod variable_parameter;

pub use codec::*;
pub use collection::*;
pub use datum::*;
pub use descriptor::*;
pub use dispatch::*;
pub use header::*;
pub use pdu::*;
pub use records::*;
pub use registry::*;
pub use variable_parameter::*;
