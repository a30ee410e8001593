//! DIS Node - owns the transport and the dispatch factory

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use dis_core::{DisResult, PduType};
use dis_transport::{DisTransport, TransportStats};
use dis_wire::{DispatchStats, Pdu, PduFactory};

use crate::{NodeConfig, RuntimeResult};

#[derive(Clone, Debug, Default)]
pub struct RuntimeStats {
    pub ticks: u64,
    /// Ticks whose poll or flush returned an error
    pub tick_errors: u64,
    pub last_tick_duration: Duration,
}

/// DIS Node - the runtime entity
pub struct Node {
    config: NodeConfig,
    transport: DisTransport,
    factory: PduFactory,
    stats: RuntimeStats,
}

impl Node {
    /// Node with the built-in decoders and the configured filters
    pub fn new(config: NodeConfig) -> RuntimeResult<Self> {
        Self::with_factory(config, PduFactory::new())
    }

    /// Node around an application-prepared factory
    pub fn with_factory(config: NodeConfig, mut factory: PduFactory) -> RuntimeResult<Self> {
        config.validate()?;
        config.apply_filters(&mut factory);
        let transport = DisTransport::new(config.transport.clone())?;
        Ok(Node {
            config,
            transport,
            factory,
            stats: RuntimeStats::default(),
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn start(&mut self) -> RuntimeResult<()> {
        self.transport.start()?;
        let local = self.transport.local_addr()?;
        info!(%local, "DIS node started");
        Ok(())
    }

    pub fn stop(&mut self) {
        self.transport.stop();
        info!(ticks = self.stats.ticks, "DIS node stopped");
    }

    pub fn is_running(&self) -> bool {
        self.transport.is_running()
    }

    pub fn factory(&self) -> &PduFactory {
        &self.factory
    }

    /// Register callbacks, filters or decoders
    pub fn factory_mut(&mut self) -> &mut PduFactory {
        &mut self.factory
    }

    pub fn transport(&self) -> &DisTransport {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut DisTransport {
        &mut self.transport
    }

    /// Shorthand for `factory_mut().on(...)`
    pub fn on<C>(&mut self, pdu_type: PduType, callback: C)
    where
        C: FnMut(&Pdu) + Send + 'static,
    {
        self.factory.on(pdu_type, callback);
    }

    pub fn on_any<C>(&mut self, callback: C)
    where
        C: FnMut(&Pdu) + Send + 'static,
    {
        self.factory.on_any(callback);
    }

    pub fn send(&mut self, pdu: &Pdu) -> DisResult<()> {
        self.transport.send(pdu)
    }

    pub fn send_immediate(&mut self, pdu: &Pdu) -> DisResult<()> {
        self.transport.send_immediate(pdu)
    }

    pub fn flush(&mut self) -> DisResult<()> {
        self.transport.flush()
    }

    /// Poll and flush as due at `now`; callbacks run inside this call
    pub fn tick(&mut self, now: Instant) -> DisResult<()> {
        let start = Instant::now();
        self.stats.ticks += 1;
        let result = self.transport.tick(now, &mut self.factory);
        if result.is_err() {
            self.stats.tick_errors += 1;
        }
        self.stats.last_tick_duration = start.elapsed();
        result
    }

    /// Tick on the configured interval until `shutdown` resolves.
    ///
    /// Tick errors are logged and the loop carries on; the node is stopped
    /// on return.
    pub async fn run<S>(&mut self, shutdown: S) -> RuntimeResult<()>
    where
        S: Future<Output = ()>,
    {
        if !self.is_running() {
            self.start()?;
        }

        let mut ticker = interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("shutdown requested");
                    break;
                }
                instant = ticker.tick() => {
                    if let Err(error) = self.tick(instant.into_std()) {
                        warn!(%error, "tick failed");
                    }
                }
            }
        }

        self.stop();
        Ok(())
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    pub fn dispatch_stats(&self) -> &DispatchStats {
        self.factory.stats()
    }

    pub fn transport_stats(&self) -> &TransportStats {
        self.transport.stats()
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("transport", &self.transport)
            .field("factory", &self.factory)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use dis_core::EntityId;
    use dis_wire::{EntityStatePdu, PduDecode};

    fn loopback_config() -> NodeConfig {
        let mut config = NodeConfig::default();
        config.transport.port = 0;
        config.transport.bind_address = Ipv4Addr::LOCALHOST;
        config.tick_interval_ms = 1;
        config
    }

    fn looped_node(config: NodeConfig) -> Node {
        let mut node = Node::new(config).unwrap();
        node.start().unwrap();
        let addr = node.transport().local_addr().unwrap();
        node.transport_mut().add_destination(addr);
        node
    }

    fn entity_state(exercise: u8) -> Pdu {
        let mut pdu = EntityStatePdu::new();
        pdu.header.exercise_id = exercise;
        pdu.entity_id = EntityId::new(2, 3, 4);
        pdu.into_pdu()
    }

    #[test]
    fn test_tick_dispatches() {
        let mut node = looped_node(loopback_config());
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        node.on(PduType::EntityState, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        node.send_immediate(&entity_state(1)).unwrap();
        let mut now = Instant::now();
        for _ in 0..200 {
            node.tick(now).unwrap();
            if count.load(Ordering::SeqCst) > 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
            now += Duration::from_millis(20);
        }

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(node.stats().ticks >= 1);
        assert_eq!(node.dispatch_stats().dispatched, 1);
        assert_eq!(node.transport_stats().datagrams_sent, 1);
    }

    #[test]
    fn test_exercise_filter_from_config() {
        let mut config = loopback_config();
        config.exercise_id = Some(9);
        let mut node = looped_node(config);

        node.send_immediate(&entity_state(1)).unwrap();
        node.send_immediate(&entity_state(9)).unwrap();
        let mut now = Instant::now();
        for _ in 0..200 {
            node.tick(now).unwrap();
            if node.dispatch_stats().pdus_seen >= 2 {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
            now += Duration::from_millis(20);
        }

        assert_eq!(node.dispatch_stats().rejected, 1);
        assert_eq!(node.dispatch_stats().dispatched, 1);
    }

    #[test]
    fn test_tick_before_start_is_noop() {
        let mut node = Node::new(loopback_config()).unwrap();
        node.tick(Instant::now()).unwrap();
        assert_eq!(node.stats().ticks, 1);
        assert!(!node.is_running());
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let mut config = loopback_config();
        config.transport.bundling_enabled = true;
        config.transport.bundle_flush_interval_ms = 5;
        let mut node = looped_node(config);

        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        node.on_any(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        for _ in 0..3 {
            node.send(&entity_state(1)).unwrap();
        }

        node.run(tokio::time::sleep(Duration::from_millis(200)))
            .await
            .unwrap();

        assert!(!node.is_running());
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(node.transport_stats().datagrams_sent, 1);
        assert!(node.stats().ticks > 1);
    }
}
