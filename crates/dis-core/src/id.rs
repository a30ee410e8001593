//! Identity types for the DIS protocol
//!
//! Identifiers are plain value types. They are owned by whichever PDU embeds
//! them; there is no identity table spanning PDUs.

use std::fmt;

/// Site + application pair identifying a simulation application
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct SimulationAddress {
    pub site: u16,
    pub application: u16,
}

impl SimulationAddress {
    pub const WIRE_SIZE: usize = 4;

    #[inline]
    pub const fn new(site: u16, application: u16) -> Self {
        SimulationAddress { site, application }
    }
}

impl fmt::Debug for SimulationAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sim({}:{})", self.site, self.application)
    }
}

impl fmt::Display for SimulationAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.site, self.application)
    }
}

/// Entity identifier - unique within an exercise
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct EntityId {
    pub site: u16,
    pub application: u16,
    pub entity: u16,
}

impl EntityId {
    pub const WIRE_SIZE: usize = 6;

    /// No specific entity
    pub const NONE: EntityId = EntityId::new(0, 0, 0);
    /// Every entity at every site and application
    pub const ALL: EntityId = EntityId::new(0xFFFF, 0xFFFF, 0xFFFF);

    #[inline]
    pub const fn new(site: u16, application: u16, entity: u16) -> Self {
        EntityId {
            site,
            application,
            entity,
        }
    }

    /// Identifier of the simulation application owning this entity
    #[inline]
    pub fn simulation(self) -> SimulationAddress {
        SimulationAddress::new(self.site, self.application)
    }

    /// Big-endian wire representation
    #[inline]
    pub fn to_bytes(self) -> [u8; 6] {
        let mut out = [0u8; 6];
        out[0..2].copy_from_slice(&self.site.to_be_bytes());
        out[2..4].copy_from_slice(&self.application.to_be_bytes());
        out[4..6].copy_from_slice(&self.entity.to_be_bytes());
        out
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        EntityId {
            site: u16::from_be_bytes([bytes[0], bytes[1]]),
            application: u16::from_be_bytes([bytes[2], bytes[3]]),
            entity: u16::from_be_bytes([bytes[4], bytes[5]]),
        }
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entity({}:{}:{})",
            self.site, self.application, self.entity
        )
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.site, self.application, self.entity)
    }
}

/// Event identifier - ties fire, detonation and collision PDUs together
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct EventId {
    pub site: u16,
    pub application: u16,
    pub event_number: u16,
}

impl EventId {
    pub const WIRE_SIZE: usize = 6;

    #[inline]
    pub const fn new(site: u16, application: u16, event_number: u16) -> Self {
        EventId {
            site,
            application,
            event_number,
        }
    }

    /// Next event number from the same application, wrapping at u16::MAX
    #[inline]
    pub fn next(self) -> Self {
        EventId {
            event_number: self.event_number.wrapping_add(1),
            ..self
        }
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Event({}:{}:{})",
            self.site, self.application, self.event_number
        )
    }
}
