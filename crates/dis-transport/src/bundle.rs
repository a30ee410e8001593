//! PDU bundling
//!
//! Encoded PDUs are appended back to back into one pending datagram. The
//! header length of each PDU is what lets the receiver split them again.

use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

/// Accumulates encoded PDUs up to a datagram size limit
#[derive(Debug)]
pub struct Bundler {
    buffer: BytesMut,
    max_datagram_size: usize,
    pending_pdus: usize,
}

impl Bundler {
    pub fn new(max_datagram_size: usize) -> Self {
        Bundler {
            buffer: BytesMut::with_capacity(max_datagram_size),
            max_datagram_size,
            pending_pdus: 0,
        }
    }

    pub fn max_datagram_size(&self) -> usize {
        self.max_datagram_size
    }

    /// Bytes waiting in the current bundle
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    pub fn pending_pdus(&self) -> usize {
        self.pending_pdus
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Append one encoded PDU.
    ///
    /// Datagrams that became ready are pushed onto `ready`: the previous
    /// bundle when `pdu` would not fit after it, and `pdu` itself when it is
    /// larger than the limit on its own.
    pub fn push(&mut self, pdu: &[u8], ready: &mut Vec<Bytes>) {
        if !self.buffer.is_empty() && self.buffer.len() + pdu.len() > self.max_datagram_size {
            if let Some(datagram) = self.take() {
                ready.push(datagram);
            }
        }

        if pdu.len() > self.max_datagram_size {
            warn!(
                size = pdu.len(),
                max = self.max_datagram_size,
                "PDU exceeds bundle limit, sending unbundled"
            );
            ready.push(Bytes::copy_from_slice(pdu));
            return;
        }

        self.buffer.extend_from_slice(pdu);
        self.pending_pdus += 1;
    }

    /// Take the pending bundle, leaving the bundler empty
    pub fn take(&mut self) -> Option<Bytes> {
        if self.buffer.is_empty() {
            return None;
        }
        debug!(
            pdus = self.pending_pdus,
            bytes = self.buffer.len(),
            "bundle flushed"
        );
        self.pending_pdus = 0;
        Some(self.buffer.split().freeze())
    }

    /// Drop anything pending
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.pending_pdus = 0;
    }
}
