//! UDP socket setup
//!
//! Sockets are created through socket2 so address reuse, broadcast and
//! multicast options are set before bind, then handed over as a plain
//! non-blocking `std::net::UdpSocket`.

use std::net::{SocketAddr, UdpSocket};

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tracing::{debug, info};

use dis_core::{DisError, DisResult};

use crate::TransportConfig;

fn transport_err(what: &str, e: std::io::Error) -> DisError {
    DisError::Transport(format!("{what}: {e}"))
}

/// Create, configure and bind a non-blocking UDP socket for `config`
pub fn open_socket(config: &TransportConfig) -> DisResult<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| transport_err("create socket", e))?;

    // Several simulators on one host share the DIS port
    socket
        .set_reuse_address(true)
        .map_err(|e| transport_err("set SO_REUSEADDR", e))?;
    #[cfg(all(unix, not(any(target_os = "solaris", target_os = "illumos"))))]
    socket
        .set_reuse_port(true)
        .map_err(|e| transport_err("set SO_REUSEPORT", e))?;

    if config.broadcast_enabled {
        socket
            .set_broadcast(true)
            .map_err(|e| transport_err("enable broadcast", e))?;
    }

    let bind_addr = config.bind_addr();
    socket
        .bind(&SockAddr::from(bind_addr))
        .map_err(|e| transport_err(&format!("bind {bind_addr}"), e))?;

    if !config.multicast_groups.is_empty() {
        socket
            .set_multicast_ttl_v4(config.multicast_ttl)
            .map_err(|e| transport_err("set multicast TTL", e))?;
        socket
            .set_multicast_loop_v4(config.multicast_loopback)
            .map_err(|e| transport_err("set multicast loopback", e))?;
        if !config.multicast_interface.is_unspecified() {
            socket
                .set_multicast_if_v4(&config.multicast_interface)
                .map_err(|e| transport_err("set multicast interface", e))?;
        }
        for group in &config.multicast_groups {
            socket
                .join_multicast_v4(group, &config.multicast_interface)
                .map_err(|e| transport_err(&format!("join multicast group {group}"), e))?;
            debug!(%group, interface = %config.multicast_interface, "joined multicast group");
        }
    }

    socket
        .set_nonblocking(true)
        .map_err(|e| transport_err("set non-blocking", e))?;

    let socket: UdpSocket = socket.into();
    let local = local_addr(&socket)?;
    info!(
        %local,
        broadcast = config.broadcast_enabled,
        groups = config.multicast_groups.len(),
        "DIS socket bound"
    );
    Ok(socket)
}

/// Bound address of `socket`
pub fn local_addr(socket: &UdpSocket) -> DisResult<SocketAddr> {
    socket
        .local_addr()
        .map_err(|e| transport_err("query local address", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_open_ephemeral() {
        let config = TransportConfig::default()
            .with_port(0)
            .with_bind_address(Ipv4Addr::LOCALHOST);
        let socket = open_socket(&config).unwrap();
        let addr = local_addr(&socket).unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);

        // Non-blocking: nothing queued
        let mut buf = [0u8; 64];
        let err = socket.recv_from(&mut buf).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::WouldBlock);
    }
}
