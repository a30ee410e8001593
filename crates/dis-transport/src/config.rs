//! Transport configuration

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use dis_core::{DisError, DisResult};
use dis_wire::PDU_HEADER_SIZE;

/// Well-known DIS port
pub const DEFAULT_DIS_PORT: u16 = 3000;

/// Largest UDP payload over IPv4
pub const MAX_UDP_PAYLOAD: usize = 65_507;

/// Default bundle limit, below a typical Ethernet MTU
pub const DEFAULT_MAX_DATAGRAM_SIZE: usize = 1400;

/// UDP transport configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Local port; also the destination port for broadcast and multicast
    pub port: u16,
    pub bind_address: Ipv4Addr,
    pub broadcast_enabled: bool,
    pub broadcast_address: Ipv4Addr,
    /// Groups joined on start and sent to
    pub multicast_groups: Vec<Ipv4Addr>,
    /// Interface used for multicast membership and sending
    pub multicast_interface: Ipv4Addr,
    pub multicast_ttl: u32,
    pub multicast_loopback: bool,
    /// Extra destinations that receive every datagram
    pub unicast_targets: Vec<SocketAddr>,
    pub receive_poll_interval_ms: u64,
    pub bundling_enabled: bool,
    pub bundle_flush_interval_ms: u64,
    /// Largest datagram a bundle may grow to
    pub max_datagram_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            port: DEFAULT_DIS_PORT,
            bind_address: Ipv4Addr::UNSPECIFIED,
            broadcast_enabled: false,
            broadcast_address: Ipv4Addr::BROADCAST,
            multicast_groups: Vec::new(),
            multicast_interface: Ipv4Addr::UNSPECIFIED,
            multicast_ttl: 1,
            multicast_loopback: true,
            unicast_targets: Vec::new(),
            receive_poll_interval_ms: 10,
            bundling_enabled: false,
            bundle_flush_interval_ms: 50,
            max_datagram_size: DEFAULT_MAX_DATAGRAM_SIZE,
        }
    }
}

impl TransportConfig {
    pub fn validate(&self) -> DisResult<()> {
        if !(PDU_HEADER_SIZE..=MAX_UDP_PAYLOAD).contains(&self.max_datagram_size) {
            return Err(DisError::Config(format!(
                "max_datagram_size must be within {}..={}, got {}",
                PDU_HEADER_SIZE, MAX_UDP_PAYLOAD, self.max_datagram_size
            )));
        }
        if let Some(group) = self.multicast_groups.iter().find(|g| !g.is_multicast()) {
            return Err(DisError::Config(format!(
                "{group} is not a multicast address"
            )));
        }
        if self.bundling_enabled && self.bundle_flush_interval_ms == 0 {
            return Err(DisError::Config(
                "bundle_flush_interval_ms must be nonzero when bundling".into(),
            ));
        }
        Ok(())
    }

    /// Local address the socket binds to
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((self.bind_address, self.port))
    }

    pub fn receive_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receive_poll_interval_ms)
    }

    pub fn bundle_flush_interval(&self) -> Duration {
        Duration::from_millis(self.bundle_flush_interval_ms)
    }

    /// Every address an outgoing datagram goes to: broadcast, groups, unicast targets
    pub fn destinations(&self) -> Vec<SocketAddr> {
        let mut destinations = Vec::new();
        if self.broadcast_enabled {
            destinations.push(SocketAddr::from((self.broadcast_address, self.port)));
        }
        destinations.extend(
            self.multicast_groups
                .iter()
                .map(|group| SocketAddr::from((*group, self.port))),
        );
        for target in &self.unicast_targets {
            if !destinations.contains(target) {
                destinations.push(*target);
            }
        }
        destinations
    }

    // Builder helpers

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_bind_address(mut self, address: Ipv4Addr) -> Self {
        self.bind_address = address;
        self
    }

    pub fn with_broadcast(mut self, address: Ipv4Addr) -> Self {
        self.broadcast_enabled = true;
        self.broadcast_address = address;
        self
    }

    pub fn with_multicast_group(mut self, group: Ipv4Addr) -> Self {
        self.multicast_groups.push(group);
        self
    }

    pub fn with_unicast_target(mut self, target: SocketAddr) -> Self {
        self.unicast_targets.push(target);
        self
    }

    pub fn with_bundling(mut self, flush_interval: Duration, max_datagram_size: usize) -> Self {
        self.bundling_enabled = true;
        self.bundle_flush_interval_ms = flush_interval.as_millis() as u64;
        self.max_datagram_size = max_datagram_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransportConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_datagram_size, 1400);
        assert!(!config.broadcast_enabled);
        assert!(config.validate().is_ok());
        assert!(config.destinations().is_empty());
        assert_eq!(config.bind_addr(), "0.0.0.0:3000".parse().unwrap());
    }

    #[test]
    fn test_destinations() {
        let target: SocketAddr = "10.0.0.5:3001".parse().unwrap();
        let config = TransportConfig::default()
            .with_port(3100)
            .with_broadcast(Ipv4Addr::new(192, 168, 1, 255))
            .with_multicast_group(Ipv4Addr::new(239, 1, 2, 3))
            .with_unicast_target(target)
            .with_unicast_target(target);
        assert_eq!(
            config.destinations(),
            vec![
                "192.168.1.255:3100".parse().unwrap(),
                "239.1.2.3:3100".parse().unwrap(),
                target,
            ]
        );
    }

    #[test]
    fn test_validation() {
        let mut config = TransportConfig::default();
        config.max_datagram_size = 11;
        assert!(matches!(config.validate(), Err(DisError::Config(_))));
        config.max_datagram_size = MAX_UDP_PAYLOAD + 1;
        assert!(config.validate().is_err());
        config.max_datagram_size = MAX_UDP_PAYLOAD;
        assert!(config.validate().is_ok());

        let config = TransportConfig::default().with_multicast_group(Ipv4Addr::new(10, 0, 0, 1));
        assert!(config.validate().is_err());

        let mut config = TransportConfig::default().with_bundling(Duration::ZERO, 1400);
        assert!(config.validate().is_err());
        config.bundle_flush_interval_ms = 20;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config: TransportConfig =
            serde_json::from_str(r#"{ "port": 3500, "multicast_groups": ["239.1.2.3"] }"#).unwrap();
        assert_eq!(config.port, 3500);
        assert_eq!(config.multicast_groups, vec![Ipv4Addr::new(239, 1, 2, 3)]);
        assert_eq!(config.receive_poll_interval(), Duration::from_millis(10));

        let text = serde_json::to_string(&config).unwrap();
        let back: TransportConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
