//! DIS Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every layer of the DIS stack:
//! - Identifiers (EntityId, EventId, SimulationAddress)
//! - Protocol enumerations (PDU type, protocol family, version, force, kind)
//! - Time primitives (Timestamp, ClockTime)
//! - The error type used by the codec, dispatch and transport layers

#[macro_use]
mod macros;

pub mod enums;
pub mod error;
pub mod id;
pub mod time;

pub use enums::*;
pub use error::*;
pub use id::*;
pub use time::*;
