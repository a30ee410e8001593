//! Entity capabilities record (32-bit field)

use bytes::BufMut;

use dis_core::DisResult;

use crate::{DisReader, Record};

/// Services and abilities an entity offers to others
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct EntityCapabilities(pub u32);

impl EntityCapabilities {
    pub const WIRE_SIZE: usize = 4;

    pub const AMMUNITION_SUPPLY: u32 = 1 << 0;
    pub const FUEL_SUPPLY: u32 = 1 << 1;
    pub const RECOVERY: u32 = 1 << 2;
    pub const REPAIR: u32 = 1 << 3;
    pub const ADS_B: u32 = 1 << 4;
    pub const SLING_LOADING: u32 = 1 << 5;
    pub const SLING_LOADABLE: u32 = 1 << 6;
    pub const IED_PRESENCE: u32 = 1 << 7;
    pub const TASK_ORGANIZABLE: u32 = 1 << 8;

    #[inline]
    pub fn new(bits: u32) -> Self {
        EntityCapabilities(bits)
    }

    #[inline]
    pub fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    #[inline]
    pub fn set(&mut self, flag: u32, value: bool) {
        if value {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }

    #[inline]
    pub fn ammunition_supply(self) -> bool {
        self.contains(Self::AMMUNITION_SUPPLY)
    }

    #[inline]
    pub fn fuel_supply(self) -> bool {
        self.contains(Self::FUEL_SUPPLY)
    }

    #[inline]
    pub fn recovery(self) -> bool {
        self.contains(Self::RECOVERY)
    }

    #[inline]
    pub fn repair(self) -> bool {
        self.contains(Self::REPAIR)
    }

    #[inline]
    pub fn ads_b(self) -> bool {
        self.contains(Self::ADS_B)
    }
}

impl From<u32> for EntityCapabilities {
    fn from(bits: u32) -> Self {
        EntityCapabilities(bits)
    }
}

impl Record for EntityCapabilities {
    fn wire_size(&self) -> usize {
        Self::WIRE_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u32(self.0);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(EntityCapabilities(src.read_u32()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_flags() {
        let mut caps = EntityCapabilities::default();
        caps.set(EntityCapabilities::FUEL_SUPPLY, true);
        caps.set(EntityCapabilities::REPAIR, true);
        assert!(caps.fuel_supply());
        assert!(caps.repair());
        assert!(!caps.ammunition_supply());

        caps.set(EntityCapabilities::FUEL_SUPPLY, false);
        assert!(!caps.fuel_supply());
        assert_eq!(caps.0, EntityCapabilities::REPAIR);
    }

    #[test]
    fn test_capabilities_roundtrip() {
        let caps = EntityCapabilities::new(u32::MAX);
        assert_eq!(EntityCapabilities::from_bytes(&caps.to_bytes()).unwrap(), caps);
    }
}
