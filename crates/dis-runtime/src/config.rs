//! Node configuration
//!
//! Loaded from JSON; every field has a default so a file only needs to name
//! what it changes.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use dis_core::ProtocolVersion;
use dis_transport::TransportConfig;
use dis_wire::{filters, PduFactory};

use crate::{RuntimeError, RuntimeResult};

/// DIS node configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub transport: TransportConfig,
    /// Only PDUs of this exercise are dispatched
    pub exercise_id: Option<u8>,
    /// Accepted protocol version numbers; empty accepts all
    pub protocol_versions: Vec<u8>,
    /// How often `run` calls `tick`
    pub tick_interval_ms: u64,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,
    pub json_logging: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            transport: TransportConfig::default(),
            exercise_id: None,
            protocol_versions: Vec::new(),
            tick_interval_ms: 5,
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

impl NodeConfig {
    /// Load and validate a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RuntimeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> RuntimeResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> RuntimeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> RuntimeResult<()> {
        self.transport.validate()?;
        if self.tick_interval_ms == 0 {
            return Err(RuntimeError::Config("tick_interval_ms must be nonzero".into()));
        }
        if let Some(version) = self
            .protocol_versions
            .iter()
            .find(|v| !ProtocolVersion::from_raw(**v).is_known())
        {
            return Err(RuntimeError::Config(format!(
                "unknown protocol version {version}"
            )));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Install the configured acceptance filters on `factory`
    pub fn apply_filters(&self, factory: &mut PduFactory) {
        if let Some(exercise_id) = self.exercise_id {
            factory.add_filter(filters::exercise(exercise_id));
        }
        if !self.protocol_versions.is_empty() {
            let versions = self
                .protocol_versions
                .iter()
                .map(|v| ProtocolVersion::from_raw(*v))
                .collect();
            factory.add_filter(filters::protocol_versions(versions));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dis_wire::{EntityStatePdu, PduBody, PduDecode};

    #[test]
    fn test_minimal_json() {
        let config = NodeConfig::from_json("{}").unwrap();
        assert_eq!(config, NodeConfig::default());
        assert_eq!(config.transport.port, 3000);
        assert_eq!(config.tick_interval(), Duration::from_millis(5));
    }

    #[test]
    fn test_nested_transport() {
        let config = NodeConfig::from_json(
            r#"{
                "exercise_id": 3,
                "protocol_versions": [6, 7],
                "json_logging": true,
                "transport": { "port": 3100, "bundling_enabled": true }
            }"#,
        )
        .unwrap();
        assert_eq!(config.exercise_id, Some(3));
        assert_eq!(config.transport.port, 3100);
        assert!(config.transport.bundling_enabled);
        assert_eq!(config.transport.bundle_flush_interval_ms, 50);
        assert!(config.json_logging);

        let text = config.to_json().unwrap();
        assert_eq!(NodeConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            NodeConfig::from_json(r#"{ "tick_interval_ms": 0 }"#),
            Err(RuntimeError::Config(_))
        ));
        assert!(matches!(
            NodeConfig::from_json(r#"{ "protocol_versions": [42] }"#),
            Err(RuntimeError::Config(_))
        ));
        assert!(matches!(
            NodeConfig::from_json(r#"{ "transport": { "max_datagram_size": 2 } }"#),
            Err(RuntimeError::Dis(_))
        ));
        assert!(matches!(
            NodeConfig::from_json("{ not json"),
            Err(RuntimeError::Json(_))
        ));
    }

    #[test]
    fn test_from_missing_file() {
        let path = std::env::temp_dir().join("dis-runtime-no-such-config.json");
        assert!(matches!(
            NodeConfig::from_file(path),
            Err(RuntimeError::Io(_))
        ));
    }

    #[test]
    fn test_filters_applied() {
        let config = NodeConfig {
            exercise_id: Some(4),
            protocol_versions: vec![7],
            ..Default::default()
        };
        let mut factory = PduFactory::new();
        config.apply_filters(&mut factory);

        let mut pdu = EntityStatePdu::new();
        pdu.header.exercise_id = 4;
        let accepted = pdu.to_bytes();
        pdu.header.exercise_id = 5;
        let other_exercise = pdu.to_bytes();
        pdu.header.exercise_id = 4;
        pdu.header.protocol_version = ProtocolVersion::Ieee1278_1a_1998;
        let old_version = pdu.into_pdu().to_bytes();

        assert_eq!(factory.dispatch(&accepted).dispatched, 1);
        assert_eq!(factory.dispatch(&other_exercise).rejected, 1);
        assert_eq!(factory.dispatch(&old_version).rejected, 1);
    }
}
