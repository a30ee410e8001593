//! Entity type taxonomy record (8 bytes)

use std::fmt;

use bytes::BufMut;

use dis_core::{DisResult, EntityKind, PlatformDomain};

use crate::{DisReader, Record};

/// Seven-level entity type: kind.domain.country.category.subcategory.specific.extra
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EntityType {
    pub kind: EntityKind,
    /// Domain; its meaning depends on `kind` (platform domain, munition domain, ...)
    pub domain: u8,
    pub country: u16,
    pub category: u8,
    pub subcategory: u8,
    pub specific: u8,
    pub extra: u8,
}

impl EntityType {
    pub const WIRE_SIZE: usize = 8;

    pub fn new(
        kind: EntityKind,
        domain: u8,
        country: u16,
        category: u8,
        subcategory: u8,
        specific: u8,
        extra: u8,
    ) -> Self {
        EntityType {
            kind,
            domain,
            country,
            category,
            subcategory,
            specific,
            extra,
        }
    }

    /// Platform entity in the given domain
    pub fn platform(domain: PlatformDomain, country: u16, category: u8) -> Self {
        EntityType {
            kind: EntityKind::Platform,
            domain: domain.to_raw(),
            country,
            category,
            ..Default::default()
        }
    }

    /// Domain interpreted as a platform domain. Only meaningful for
    /// platform, life form and sensor/emitter kinds.
    pub fn platform_domain(&self) -> Option<PlatformDomain> {
        match self.kind {
            EntityKind::Platform | EntityKind::LifeForm | EntityKind::SensorEmitter => {
                Some(PlatformDomain::from_raw(self.domain))
            }
            _ => None,
        }
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityType({})", self)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}.{}.{}.{}",
            self.kind.to_raw(),
            self.domain,
            self.country,
            self.category,
            self.subcategory,
            self.specific,
            self.extra
        )
    }
}

impl Record for EntityType {
    fn wire_size(&self) -> usize {
        Self::WIRE_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(self.kind.to_raw());
        dst.put_u8(self.domain);
        dst.put_u16(self.country);
        dst.put_u8(self.category);
        dst.put_u8(self.subcategory);
        dst.put_u8(self.specific);
        dst.put_u8(self.extra);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(EntityType {
            kind: EntityKind::from_raw(src.read_u8()?),
            domain: src.read_u8()?,
            country: src.read_u16()?,
            category: src.read_u8()?,
            subcategory: src.read_u8()?,
            specific: src.read_u8()?,
            extra: src.read_u8()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_layout() {
        let et = EntityType::new(EntityKind::Platform, 2, 225, 1, 1, 0, 0);
        let bytes = et.to_bytes();
        assert_eq!(bytes, [1, 2, 0, 225, 1, 1, 0, 0]);
        assert_eq!(EntityType::from_bytes(&bytes).unwrap(), et);
        assert_eq!(et.to_string(), "1.2.225.1.1.0.0");
    }

    #[test]
    fn test_platform_domain() {
        let et = EntityType::platform(PlatformDomain::Air, 225, 1);
        assert_eq!(et.platform_domain(), Some(PlatformDomain::Air));

        let munition = EntityType::new(EntityKind::Munition, 2, 225, 2, 1, 0, 0);
        assert_eq!(munition.platform_domain(), None);
    }

    #[test]
    fn test_unknown_kind_preserved() {
        let bytes = [0xEE, 9, 0xFF, 0xFF, 255, 255, 255, 255];
        let et = EntityType::from_bytes(&bytes).unwrap();
        assert_eq!(et.kind, EntityKind::Unknown(0xEE));
        assert_eq!(et.country, u16::MAX);
        assert_eq!(et.to_bytes(), bytes);
    }
}
