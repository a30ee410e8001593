//! Tick-driven UDP transport
//!
//! `DisTransport` owns one non-blocking socket. Receiving drains every
//! pending datagram into a caller-owned `PduFactory`; sending either writes
//! one datagram per PDU or appends to a bundle flushed on a timer.

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, info, trace, warn};

use dis_core::{DisError, DisResult};
use dis_wire::{Pdu, PduFactory};

use crate::{local_addr, open_socket, Bundler, TransportConfig, MAX_UDP_PAYLOAD};

/// Transport counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportStats {
    pub datagrams_received: u64,
    pub bytes_received: u64,
    pub datagrams_sent: u64,
    pub bytes_sent: u64,
    pub pdus_sent: u64,
    pub bundles_flushed: u64,
    pub receive_errors: u64,
    pub send_errors: u64,
}

/// UDP transport for DIS traffic
pub struct DisTransport {
    config: TransportConfig,
    socket: Option<UdpSocket>,
    destinations: Vec<SocketAddr>,
    bundler: Bundler,
    recv_buf: Vec<u8>,
    stats: TransportStats,
    last_poll: Option<Instant>,
    last_flush: Instant,
}

impl DisTransport {
    /// Create a stopped transport; nothing is bound until `start`
    pub fn new(config: TransportConfig) -> DisResult<Self> {
        config.validate()?;
        Ok(DisTransport {
            destinations: config.destinations(),
            bundler: Bundler::new(config.max_datagram_size),
            config,
            socket: None,
            recv_buf: Vec::new(),
            stats: TransportStats::default(),
            last_poll: None,
            last_flush: Instant::now(),
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn stats(&self) -> &TransportStats {
        &self.stats
    }

    pub fn is_running(&self) -> bool {
        self.socket.is_some()
    }

    /// Bind the socket and join the configured groups
    pub fn start(&mut self) -> DisResult<()> {
        if self.socket.is_some() {
            return Ok(());
        }
        let socket = open_socket(&self.config)?;
        if self.destinations.is_empty() {
            info!("no send destinations configured, transport is receive-only");
        }
        self.recv_buf.resize(MAX_UDP_PAYLOAD, 0);
        self.socket = Some(socket);
        self.last_poll = None;
        self.last_flush = Instant::now();
        Ok(())
    }

    /// Flush anything bundled, then close the socket
    pub fn stop(&mut self) {
        if self.socket.is_none() {
            return;
        }
        if let Err(error) = self.flush() {
            warn!(%error, "dropping pending bundle on stop");
        }
        self.bundler.clear();
        self.socket = None;
        debug!("DIS socket closed");
    }

    pub fn local_addr(&self) -> DisResult<SocketAddr> {
        local_addr(self.socket()?)
    }

    pub fn destinations(&self) -> &[SocketAddr] {
        &self.destinations
    }

    /// Send to `target` as well as the configured destinations
    pub fn add_destination(&mut self, target: SocketAddr) {
        if !self.destinations.contains(&target) {
            self.destinations.push(target);
        }
    }

    pub fn remove_destination(&mut self, target: SocketAddr) -> bool {
        let before = self.destinations.len();
        self.destinations.retain(|d| *d != target);
        self.destinations.len() != before
    }

    fn socket(&self) -> DisResult<&UdpSocket> {
        self.socket
            .as_ref()
            .ok_or_else(|| DisError::Transport("transport is not started".into()))
    }

    fn require_destination(&self) -> DisResult<()> {
        if self.destinations.is_empty() {
            return Err(DisError::Transport("no send destination configured".into()));
        }
        Ok(())
    }

    /// Drain every pending datagram into `factory`.
    ///
    /// Returns the number of datagrams handled; an empty socket is `Ok(0)`.
    pub fn poll_receive(&mut self, factory: &mut PduFactory) -> DisResult<usize> {
        let Some(socket) = self.socket.as_ref() else {
            return Ok(0);
        };

        let mut received = 0;
        loop {
            match socket.recv_from(&mut self.recv_buf) {
                Ok((len, from)) => {
                    received += 1;
                    self.stats.datagrams_received += 1;
                    self.stats.bytes_received += len as u64;
                    let report = factory.dispatch(&self.recv_buf[..len]);
                    trace!(%from, len, pdus = report.pdus_seen, "datagram received");
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                // ICMP port unreachable from an earlier send surfaces here on some platforms
                Err(e) if matches!(e.kind(), ErrorKind::ConnectionReset | ErrorKind::Interrupted) => {
                    self.stats.receive_errors += 1;
                    debug!(error = %e, "transient receive error");
                }
                Err(e) => {
                    self.stats.receive_errors += 1;
                    return Err(DisError::Transport(format!("receive: {e}")));
                }
            }
        }
        Ok(received)
    }

    /// Send a PDU, bundling it when bundling is enabled
    pub fn send(&mut self, pdu: &Pdu) -> DisResult<()> {
        if !self.config.bundling_enabled {
            return self.send_immediate(pdu);
        }

        self.socket()?;
        self.require_destination()?;
        pdu.validate()?;
        let bytes = pdu.to_bytes();
        let mut ready = Vec::new();
        self.bundler.push(&bytes, &mut ready);
        self.stats.pdus_sent += 1;
        self.send_ready(ready)
    }

    /// Send a PDU in its own datagram, bypassing any pending bundle
    pub fn send_immediate(&mut self, pdu: &Pdu) -> DisResult<()> {
        pdu.validate()?;
        let bytes = pdu.to_bytes();
        self.send_datagram(&bytes)?;
        self.stats.pdus_sent += 1;
        Ok(())
    }

    /// Send the pending bundle, if any.
    ///
    /// Without a destination the bundle stays pending and the error is
    /// returned.
    pub fn flush(&mut self) -> DisResult<()> {
        self.last_flush = Instant::now();
        if !self.bundler.is_empty() {
            self.require_destination()?;
        }
        match self.bundler.take() {
            Some(datagram) => {
                self.stats.bundles_flushed += 1;
                self.send_datagram(&datagram)
            }
            None => Ok(()),
        }
    }

    /// Run whatever is due at `now`: the receive poll, then the bundle flush
    pub fn tick(&mut self, now: Instant, factory: &mut PduFactory) -> DisResult<()> {
        if self.socket.is_none() {
            return Ok(());
        }

        let poll_due = self
            .last_poll
            .map_or(true, |last| now.duration_since(last) >= self.config.receive_poll_interval());
        if poll_due {
            self.last_poll = Some(now);
            self.poll_receive(factory)?;
        }

        if self.config.bundling_enabled
            && !self.bundler.is_empty()
            && now.duration_since(self.last_flush) >= self.config.bundle_flush_interval()
        {
            self.flush()?;
        }
        Ok(())
    }

    fn send_ready(&mut self, ready: Vec<Bytes>) -> DisResult<()> {
        for datagram in ready {
            self.stats.bundles_flushed += 1;
            self.send_datagram(&datagram)?;
        }
        Ok(())
    }

    /// Write one datagram to every destination
    pub fn send_datagram(&mut self, datagram: &[u8]) -> DisResult<()> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| DisError::Transport("transport is not started".into()))?;
        self.require_destination()?;

        let mut result = Ok(());
        for dest in &self.destinations {
            match socket.send_to(datagram, dest) {
                Ok(sent) => {
                    self.stats.datagrams_sent += 1;
                    self.stats.bytes_sent += sent as u64;
                }
                Err(e) => {
                    self.stats.send_errors += 1;
                    warn!(%dest, error = %e, "send failed");
                    result = Err(DisError::Transport(format!("send to {dest}: {e}")));
                }
            }
        }
        result
    }
}

impl Drop for DisTransport {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for DisTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisTransport")
            .field("running", &self.is_running())
            .field("destinations", &self.destinations)
            .field("pending_pdus", &self.bundler.pending_pdus())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use dis_core::{EntityId, PduType};
    use dis_wire::{EntityStatePdu, FirePdu, PduDecode};

    fn loopback_config() -> TransportConfig {
        TransportConfig::default()
            .with_port(0)
            .with_bind_address(Ipv4Addr::LOCALHOST)
    }

    /// Transport sending to itself
    fn looped(config: TransportConfig) -> DisTransport {
        let mut transport = DisTransport::new(config).unwrap();
        transport.start().unwrap();
        let addr = transport.local_addr().unwrap();
        transport.add_destination(addr);
        transport
    }

    fn poll_until(transport: &mut DisTransport, factory: &mut PduFactory, dispatched: u64) {
        for _ in 0..200 {
            transport.poll_receive(factory).unwrap();
            if factory.stats().dispatched >= dispatched {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn entity_state(entity: u16) -> Pdu {
        let mut pdu = EntityStatePdu::new();
        pdu.entity_id = EntityId::new(1, 1, entity);
        pdu.into_pdu()
    }

    #[test]
    fn test_not_started() {
        let mut transport = DisTransport::new(loopback_config()).unwrap();
        let mut factory = PduFactory::new();
        assert!(!transport.is_running());
        assert_eq!(transport.poll_receive(&mut factory).unwrap(), 0);
        assert!(matches!(
            transport.send_immediate(&entity_state(1)),
            Err(DisError::Transport(_))
        ));
        assert!(transport.local_addr().is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = loopback_config();
        config.max_datagram_size = 4;
        assert!(DisTransport::new(config).is_err());
    }

    #[test]
    fn test_no_destination() {
        let mut transport = DisTransport::new(loopback_config()).unwrap();
        transport.start().unwrap();
        assert!(matches!(
            transport.send(&entity_state(1)),
            Err(DisError::Transport(_))
        ));
    }

    #[test]
    fn test_bundled_send_without_destination() {
        let config = loopback_config().with_bundling(Duration::from_secs(60), 1400);
        let mut transport = DisTransport::new(config).unwrap();
        transport.start().unwrap();

        assert!(matches!(
            transport.send(&entity_state(1)),
            Err(DisError::Transport(_))
        ));
        assert_eq!(transport.stats().pdus_sent, 0);
        assert_eq!(transport.bundler.pending_pdus(), 0);
        transport.flush().unwrap();
    }

    #[test]
    fn test_pending_bundle_kept_when_destination_removed() {
        let config = loopback_config().with_bundling(Duration::from_secs(60), 1400);
        let mut transport = looped(config);
        let addr = transport.local_addr().unwrap();
        let mut factory = PduFactory::new();

        transport.send(&entity_state(1)).unwrap();
        assert!(transport.remove_destination(addr));
        assert!(matches!(transport.flush(), Err(DisError::Transport(_))));
        assert_eq!(transport.bundler.pending_pdus(), 1);
        assert!(matches!(
            transport.send(&entity_state(2)),
            Err(DisError::Transport(_))
        ));

        transport.add_destination(addr);
        transport.flush().unwrap();
        poll_until(&mut transport, &mut factory, 1);
        assert_eq!(factory.stats().dispatched, 1);
        assert_eq!(transport.stats().pdus_sent, 1);
    }

    #[test]
    fn test_empty_poll() {
        let mut transport = looped(loopback_config());
        let mut factory = PduFactory::new();
        assert_eq!(transport.poll_receive(&mut factory).unwrap(), 0);
    }

    #[test]
    fn test_loopback_immediate() {
        let mut transport = looped(loopback_config());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut factory = PduFactory::new();
        let sink = seen.clone();
        factory.on(PduType::EntityState, move |pdu| {
            if let Some(es) = pdu.body::<EntityStatePdu>() {
                sink.lock().unwrap().push(es.entity_id);
            }
        });

        transport.send_immediate(&entity_state(7)).unwrap();
        poll_until(&mut transport, &mut factory, 1);

        assert_eq!(*seen.lock().unwrap(), vec![EntityId::new(1, 1, 7)]);
        let stats = transport.stats();
        assert_eq!(stats.datagrams_sent, 1);
        assert_eq!(stats.bytes_sent, 144);
        assert_eq!(stats.datagrams_received, 1);
        assert_eq!(stats.bytes_received, 144);
    }

    #[test]
    fn test_loopback_bundle() {
        let config = loopback_config().with_bundling(Duration::from_millis(50), 1400);
        let mut transport = looped(config);
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut factory = PduFactory::new();
        let sink = order.clone();
        factory.on_any(move |pdu| sink.lock().unwrap().push(pdu.pdu_type()));

        transport.send(&entity_state(1)).unwrap();
        transport.send(&FirePdu::new().into_pdu()).unwrap();
        transport.send(&entity_state(2)).unwrap();
        assert_eq!(transport.stats().datagrams_sent, 0);

        transport.flush().unwrap();
        poll_until(&mut transport, &mut factory, 3);

        assert_eq!(
            *order.lock().unwrap(),
            vec![PduType::EntityState, PduType::Fire, PduType::EntityState]
        );
        let stats = transport.stats();
        assert_eq!(stats.datagrams_sent, 1);
        assert_eq!(stats.bundles_flushed, 1);
        assert_eq!(stats.pdus_sent, 3);
        assert_eq!(stats.bytes_sent, 144 + 96 + 144);
        assert_eq!(stats.datagrams_received, 1);
    }

    #[test]
    fn test_bundle_overflow_sends_early() {
        // Room for two entity states per datagram
        let config = loopback_config().with_bundling(Duration::from_secs(60), 300);
        let mut transport = looped(config);
        let mut factory = PduFactory::new();

        for entity in 0..5 {
            transport.send(&entity_state(entity)).unwrap();
        }
        assert_eq!(transport.stats().datagrams_sent, 2);
        transport.flush().unwrap();
        assert_eq!(transport.stats().datagrams_sent, 3);

        poll_until(&mut transport, &mut factory, 5);
        assert_eq!(factory.stats().dispatched, 5);
        assert_eq!(factory.stats().datagrams, 3);
    }

    #[test]
    fn test_tick_flushes_after_interval() {
        let config = loopback_config().with_bundling(Duration::from_secs(5), 1400);
        let mut transport = looped(config);
        let mut factory = PduFactory::new();

        transport.send(&entity_state(1)).unwrap();
        let start = Instant::now();
        transport.tick(start, &mut factory).unwrap();
        assert_eq!(transport.stats().datagrams_sent, 0);

        transport
            .tick(start + Duration::from_secs(6), &mut factory)
            .unwrap();
        assert_eq!(transport.stats().datagrams_sent, 1);
        assert_eq!(transport.stats().bundles_flushed, 1);
    }

    #[test]
    fn test_stop_flushes_and_closes() {
        let config = loopback_config().with_bundling(Duration::from_secs(60), 1400);
        let mut transport = looped(config);
        transport.send(&entity_state(1)).unwrap();

        transport.stop();
        assert!(!transport.is_running());
        assert_eq!(transport.stats().datagrams_sent, 1);

        let mut factory = PduFactory::new();
        assert_eq!(transport.poll_receive(&mut factory).unwrap(), 0);
        transport.tick(Instant::now(), &mut factory).unwrap();
    }

    #[test]
    fn test_invalid_pdu_not_sent() {
        let mut transport = looped(loopback_config());
        let mut pdu = EntityStatePdu::new();
        for _ in 0..300 {
            pdu.variable_parameters.push(dis_wire::AttachedPart::default());
        }
        assert!(transport.send_immediate(&pdu.into_pdu()).is_err());
        assert_eq!(transport.stats().datagrams_sent, 0);
    }

    #[test]
    fn test_destinations() {
        let mut transport = DisTransport::new(loopback_config()).unwrap();
        let target: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        transport.add_destination(target);
        transport.add_destination(target);
        assert_eq!(transport.destinations(), &[target]);
        assert!(transport.remove_destination(target));
        assert!(!transport.remove_destination(target));
    }
}
