//! DIS Test Harness - fixtures and protocol validation
//!
//! This crate provides:
//! - Sample PDUs of every built-in type
//! - Datagram corruption for resilience testing
//! - End-to-end checks of encode, bundle and dispatch

pub mod chaos;
pub mod fixtures;
pub mod integration;

pub use chaos::*;
pub use fixtures::*;
pub use integration::*;
