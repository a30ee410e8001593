//! Fire and detonation descriptors (16 bytes)
//!
//! The descriptor layout is not announced inside the record: it comes from
//! the fire/detonation type indicator in PDU status bits 4-5. Callers pass
//! that indicator to `Descriptor::decode_for`.

use bytes::BufMut;

use dis_core::DisResult;

use crate::{put_padding, DisReader, EntityType, FamilyVariant, Record, RecordFamily, Variant};

pub const DESCRIPTOR_SIZE: usize = 16;

/// Fire/detonation type indicator values (PDU status bits 4-5)
pub mod indicator {
    pub const MUNITION: u8 = 0;
    pub const EXPENDABLE: u8 = 1;
    pub const EXPLOSION: u8 = 2;
}

/// Munition fired or detonated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MunitionDescriptor {
    pub munition_type: EntityType,
    pub warhead: u16,
    pub fuse: u16,
    pub quantity: u16,
    /// Rounds per minute
    pub rate: u16,
}

impl Record for MunitionDescriptor {
    fn wire_size(&self) -> usize {
        DESCRIPTOR_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        self.munition_type.encode(dst);
        dst.put_u16(self.warhead);
        dst.put_u16(self.fuse);
        dst.put_u16(self.quantity);
        dst.put_u16(self.rate);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let bytes = src.read_array::<DESCRIPTOR_SIZE>()?;
        let mut f = DisReader::new(&bytes);
        Ok(MunitionDescriptor {
            munition_type: EntityType::decode(&mut f)?,
            warhead: f.read_u16()?,
            fuse: f.read_u16()?,
            quantity: f.read_u16()?,
            rate: f.read_u16()?,
        })
    }
}

/// Expendable (chaff, flare) released
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExpendableDescriptor {
    pub expendable_type: EntityType,
}

impl Record for ExpendableDescriptor {
    fn wire_size(&self) -> usize {
        DESCRIPTOR_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        self.expendable_type.encode(dst);
        put_padding(dst, 8);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let bytes = src.read_array::<DESCRIPTOR_SIZE>()?;
        Ok(ExpendableDescriptor {
            expendable_type: EntityType::decode(&mut DisReader::new(&bytes))?,
        })
    }
}

/// Non-munition explosion
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExplosionDescriptor {
    pub explosion_type: EntityType,
    pub explosive_material: u16,
    /// TNT equivalent in kilograms
    pub explosive_force: f32,
}

impl Record for ExplosionDescriptor {
    fn wire_size(&self) -> usize {
        DESCRIPTOR_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        self.explosion_type.encode(dst);
        dst.put_u16(self.explosive_material);
        put_padding(dst, 2);
        dst.put_f32(self.explosive_force);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let bytes = src.read_array::<DESCRIPTOR_SIZE>()?;
        let mut f = DisReader::new(&bytes);
        let explosion_type = EntityType::decode(&mut f)?;
        let explosive_material = f.read_u16()?;
        f.skip(2)?;
        Ok(ExplosionDescriptor {
            explosion_type,
            explosive_material,
            explosive_force: f.read_f32()?,
        })
    }
}

/// Descriptor under an indicator with no built-in layout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawDescriptor {
    /// Indicator it was decoded under; written back to the PDU status
    pub indicator: u8,
    pub bytes: [u8; DESCRIPTOR_SIZE],
}

impl Record for RawDescriptor {
    fn wire_size(&self) -> usize {
        DESCRIPTOR_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_slice(&self.bytes);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(RawDescriptor {
            indicator: 3,
            bytes: src.read_array::<DESCRIPTOR_SIZE>()?,
        })
    }
}

record_family! {
    /// Fire/detonation descriptor selected by the PDU status indicator
    pub enum Descriptor {
        Munition(MunitionDescriptor),
        Expendable(ExpendableDescriptor),
        Explosion(ExplosionDescriptor),
        Other(RawDescriptor),
    }
}

family_variant!(Descriptor::Munition(MunitionDescriptor) claims &[indicator::MUNITION as u32]);
family_variant!(Descriptor::Expendable(ExpendableDescriptor) claims &[indicator::EXPENDABLE as u32]);
family_variant!(Descriptor::Explosion(ExplosionDescriptor) claims &[indicator::EXPLOSION as u32]);
family_variant!(Descriptor::Other(RawDescriptor) claims &[]);

impl Descriptor {
    /// Without an indicator the munition layout applies
    fn decode_family(src: &mut DisReader<'_>) -> DisResult<Self> {
        Self::decode_for(indicator::MUNITION, src)
    }

    /// Decode the layout selected by `indicator`
    pub fn decode_for(indicator: u8, src: &mut DisReader<'_>) -> DisResult<Self> {
        let mut descriptor = Self::registry().decode_with(indicator as u32, src)?;
        if let Descriptor::Other(raw) = &mut descriptor {
            raw.indicator = indicator;
        }
        Ok(descriptor)
    }

    /// Indicator value matching this layout
    pub fn indicator(&self) -> u8 {
        match self {
            Descriptor::Munition(_) => indicator::MUNITION,
            Descriptor::Expendable(_) => indicator::EXPENDABLE,
            Descriptor::Explosion(_) => indicator::EXPLOSION,
            Descriptor::Other(raw) => raw.indicator,
        }
    }

    /// Entity type at the start of every built-in layout
    pub fn entity_type(&self) -> Option<EntityType> {
        match self {
            Descriptor::Munition(d) => Some(d.munition_type),
            Descriptor::Expendable(d) => Some(d.expendable_type),
            Descriptor::Explosion(d) => Some(d.explosion_type),
            Descriptor::Other(_) => None,
        }
    }

    pub fn as_munition(&self) -> Option<&MunitionDescriptor> {
        MunitionDescriptor::as_variant(self)
    }
}

impl Default for Descriptor {
    fn default() -> Self {
        Descriptor::Munition(MunitionDescriptor::default())
    }
}

impl RecordFamily for Descriptor {
    const NAME: &'static str = "descriptor";

    fn variants() -> Vec<Variant<Self>> {
        vec![
            Variant::of::<MunitionDescriptor>(),
            Variant::of::<ExpendableDescriptor>(),
            Variant::of::<ExplosionDescriptor>(),
            Variant::of::<RawDescriptor>(),
        ]
    }

    builtin_registry!(Descriptor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use dis_core::EntityKind;

    fn munition() -> MunitionDescriptor {
        MunitionDescriptor {
            munition_type: EntityType::new(EntityKind::Munition, 2, 225, 2, 1, 0, 0),
            warhead: 1000,
            fuse: 1100,
            quantity: 2,
            rate: 600,
        }
    }

    #[test]
    fn test_munition_layout() {
        let bytes = munition().to_bytes();
        assert_eq!(bytes.len(), DESCRIPTOR_SIZE);
        assert_eq!(&bytes[8..10], &1000u16.to_be_bytes());
        assert_eq!(&bytes[14..16], &600u16.to_be_bytes());
        let decoded = Descriptor::decode_for(indicator::MUNITION, &mut DisReader::new(&bytes)).unwrap();
        assert_eq!(decoded, Descriptor::Munition(munition()));
        assert_eq!(decoded.as_munition(), Some(&munition()));
    }

    #[test]
    fn test_indicator_selects_layout() {
        let explosion = ExplosionDescriptor {
            explosion_type: EntityType::new(EntityKind::Other, 0, 0, 1, 0, 0, 0),
            explosive_material: 3,
            explosive_force: 450.5,
        };
        let bytes = explosion.to_bytes();

        let as_explosion = Descriptor::decode_for(indicator::EXPLOSION, &mut DisReader::new(&bytes)).unwrap();
        assert_eq!(as_explosion, Descriptor::Explosion(explosion));
        assert_eq!(as_explosion.indicator(), indicator::EXPLOSION);

        let as_expendable = Descriptor::decode_for(indicator::EXPENDABLE, &mut DisReader::new(&bytes)).unwrap();
        assert_eq!(as_expendable.variant_name(), "Expendable");
        assert_eq!(as_expendable.entity_type(), Some(explosion.explosion_type));
    }

    #[test]
    fn test_unknown_indicator_keeps_bytes() {
        let bytes: Vec<u8> = (1..=16).collect();
        let decoded = Descriptor::decode_for(3, &mut DisReader::new(&bytes)).unwrap();
        assert_eq!(decoded.indicator(), 3);
        assert_eq!(decoded.entity_type(), None);
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn test_plain_decode_is_munition() {
        let bytes = munition().to_bytes();
        assert_eq!(Descriptor::from_bytes(&bytes).unwrap(), Descriptor::Munition(munition()));
        assert_eq!(Descriptor::default().indicator(), indicator::MUNITION);
    }
}
