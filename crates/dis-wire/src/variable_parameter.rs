//! Variable parameter records (16 bytes, discriminated by the first byte)
//!
//! Entity state and detonation PDUs carry a list of these after their fixed
//! fields. The record type byte selects the layout; record types without a
//! built-in layout decode to `RawVariableParameter`, which keeps all 15
//! payload bytes.

use bytes::BufMut;

use dis_core::{DisError, DisResult, EntityId};

use crate::{put_padding, DisReader, EntityType, Record, RecordFamily, StreamDiscriminated, Variant};

/// Encoded size of every variable parameter record
pub const VARIABLE_PARAMETER_SIZE: usize = 16;

/// Bytes following the record type byte
pub const VARIABLE_PARAMETER_PAYLOAD: usize = VARIABLE_PARAMETER_SIZE - 1;

/// Record type codes
pub mod record_type {
    pub const ARTICULATED_PART: u8 = 0;
    pub const ATTACHED_PART: u8 = 1;
    pub const SEPARATION: u8 = 2;
    pub const ENTITY_TYPE: u8 = 3;
    pub const ENTITY_ASSOCIATION: u8 = 4;
}

/// Consume one whole record so a short buffer never leaves a partial read
fn record_fields(src: &mut DisReader<'_>) -> DisResult<[u8; VARIABLE_PARAMETER_SIZE]> {
    src.read_array::<VARIABLE_PARAMETER_SIZE>()
}

/// Movable part of an entity (turret azimuth, gun elevation, ...)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArticulatedPart {
    pub change_indicator: u8,
    /// Zero when attached to the entity itself, else the parent part's station
    pub part_attached_to: u16,
    /// Type class in the upper bits, type metric in the low five bits
    pub parameter_type: u32,
    value: f32,
}

impl ArticulatedPart {
    pub const TYPE_METRIC_BITS: u32 = 5;

    pub fn new(part_attached_to: u16, type_class: u32, type_metric: u32, value: f32) -> Self {
        ArticulatedPart {
            change_indicator: 0,
            part_attached_to,
            parameter_type: (type_class << Self::TYPE_METRIC_BITS)
                | (type_metric & ((1 << Self::TYPE_METRIC_BITS) - 1)),
            value,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_value(&mut self, value: f32) {
        self.value = value;
    }

    pub fn type_metric(&self) -> u32 {
        self.parameter_type & ((1 << Self::TYPE_METRIC_BITS) - 1)
    }

    pub fn type_class(&self) -> u32 {
        self.parameter_type >> Self::TYPE_METRIC_BITS
    }
}

impl Record for ArticulatedPart {
    fn wire_size(&self) -> usize {
        VARIABLE_PARAMETER_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(record_type::ARTICULATED_PART);
        dst.put_u8(self.change_indicator);
        dst.put_u16(self.part_attached_to);
        dst.put_u32(self.parameter_type);
        dst.put_f32(self.value);
        put_padding(dst, 4);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let bytes = record_fields(src)?;
        let mut f = DisReader::new(&bytes[1..]);
        Ok(ArticulatedPart {
            change_indicator: f.read_u8()?,
            part_attached_to: f.read_u16()?,
            parameter_type: f.read_u32()?,
            value: f.read_f32()?,
        })
    }
}

/// Removable part mounted on a station (stores, pods)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttachedPart {
    pub detached_indicator: u8,
    pub part_attached_to: u16,
    /// Station the part is mounted on
    pub parameter_type: u32,
    pub part_type: EntityType,
}

impl AttachedPart {
    pub fn is_detached(&self) -> bool {
        self.detached_indicator != 0
    }
}

impl Record for AttachedPart {
    fn wire_size(&self) -> usize {
        VARIABLE_PARAMETER_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(record_type::ATTACHED_PART);
        dst.put_u8(self.detached_indicator);
        dst.put_u16(self.part_attached_to);
        dst.put_u32(self.parameter_type);
        self.part_type.encode(dst);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let bytes = record_fields(src)?;
        let mut f = DisReader::new(&bytes[1..]);
        Ok(AttachedPart {
            detached_indicator: f.read_u8()?,
            part_attached_to: f.read_u16()?,
            parameter_type: f.read_u32()?,
            part_type: EntityType::decode(&mut f)?,
        })
    }
}

/// Entity created by separating from a parent entity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeparationParameter {
    pub reason: u8,
    pub pre_entity_indicator: u8,
    pub parent_entity: EntityId,
    pub station_name: u16,
    pub station_number: u16,
}

impl Record for SeparationParameter {
    fn wire_size(&self) -> usize {
        VARIABLE_PARAMETER_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(record_type::SEPARATION);
        dst.put_u8(self.reason);
        dst.put_u8(self.pre_entity_indicator);
        put_padding(dst, 1);
        self.parent_entity.encode(dst);
        put_padding(dst, 2);
        dst.put_u16(self.station_name);
        dst.put_u16(self.station_number);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let bytes = record_fields(src)?;
        let mut f = DisReader::new(&bytes[1..]);
        let reason = f.read_u8()?;
        let pre_entity_indicator = f.read_u8()?;
        f.skip(1)?;
        let parent_entity = EntityId::decode(&mut f)?;
        f.skip(2)?;
        Ok(SeparationParameter {
            reason,
            pre_entity_indicator,
            parent_entity,
            station_name: f.read_u16()?,
            station_number: f.read_u16()?,
        })
    }
}

/// Change of the entity's own type (e.g. a transformed vehicle)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntityTypeParameter {
    pub change_indicator: u8,
    pub entity_type: EntityType,
}

impl Record for EntityTypeParameter {
    fn wire_size(&self) -> usize {
        VARIABLE_PARAMETER_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(record_type::ENTITY_TYPE);
        dst.put_u8(self.change_indicator);
        self.entity_type.encode(dst);
        put_padding(dst, 6);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let bytes = record_fields(src)?;
        let mut f = DisReader::new(&bytes[1..]);
        Ok(EntityTypeParameter {
            change_indicator: f.read_u8()?,
            entity_type: EntityType::decode(&mut f)?,
        })
    }
}

/// Association between this entity and another (towing, mounting, ...)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntityAssociationParameter {
    pub change_indicator: u8,
    pub association_status: u8,
    pub association_type: u8,
    pub entity_id: EntityId,
    pub own_station_location: u16,
    pub physical_connection_type: u8,
    pub group_member_type: u8,
    pub group_number: u16,
}

impl Record for EntityAssociationParameter {
    fn wire_size(&self) -> usize {
        VARIABLE_PARAMETER_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(record_type::ENTITY_ASSOCIATION);
        dst.put_u8(self.change_indicator);
        dst.put_u8(self.association_status);
        dst.put_u8(self.association_type);
        self.entity_id.encode(dst);
        dst.put_u16(self.own_station_location);
        dst.put_u8(self.physical_connection_type);
        dst.put_u8(self.group_member_type);
        dst.put_u16(self.group_number);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let bytes = record_fields(src)?;
        let mut f = DisReader::new(&bytes[1..]);
        Ok(EntityAssociationParameter {
            change_indicator: f.read_u8()?,
            association_status: f.read_u8()?,
            association_type: f.read_u8()?,
            entity_id: EntityId::decode(&mut f)?,
            own_station_location: f.read_u16()?,
            physical_connection_type: f.read_u8()?,
            group_member_type: f.read_u8()?,
            group_number: f.read_u16()?,
        })
    }
}

/// Variable parameter with no built-in layout; payload kept verbatim
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawVariableParameter {
    pub record_type: u8,
    payload: [u8; VARIABLE_PARAMETER_PAYLOAD],
}

impl RawVariableParameter {
    pub fn new(record_type: u8, payload: &[u8]) -> DisResult<Self> {
        let mut record = RawVariableParameter {
            record_type,
            payload: [0; VARIABLE_PARAMETER_PAYLOAD],
        };
        record.set_payload(payload)?;
        Ok(record)
    }

    #[inline]
    pub fn payload(&self) -> &[u8; VARIABLE_PARAMETER_PAYLOAD] {
        &self.payload
    }

    /// Replace the payload; anything but exactly 15 bytes is rejected
    pub fn set_payload(&mut self, payload: &[u8]) -> DisResult<()> {
        if payload.len() != VARIABLE_PARAMETER_PAYLOAD {
            return Err(DisError::field_length(
                "variable parameter payload",
                VARIABLE_PARAMETER_PAYLOAD,
                payload.len(),
            ));
        }
        self.payload.copy_from_slice(payload);
        Ok(())
    }
}

impl Record for RawVariableParameter {
    fn wire_size(&self) -> usize {
        VARIABLE_PARAMETER_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(self.record_type);
        dst.put_slice(&self.payload);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let bytes = record_fields(src)?;
        let mut payload = [0; VARIABLE_PARAMETER_PAYLOAD];
        payload.copy_from_slice(&bytes[1..]);
        Ok(RawVariableParameter {
            record_type: bytes[0],
            payload,
        })
    }
}

record_family! {
    /// Any variable parameter record
    pub enum VariableParameter {
        ArticulatedPart(ArticulatedPart),
        AttachedPart(AttachedPart),
        Separation(SeparationParameter),
        EntityType(EntityTypeParameter),
        EntityAssociation(EntityAssociationParameter),
        Other(RawVariableParameter),
    }
}

family_variant!(VariableParameter::ArticulatedPart(ArticulatedPart) claims &[record_type::ARTICULATED_PART as u32]);
family_variant!(VariableParameter::AttachedPart(AttachedPart) claims &[record_type::ATTACHED_PART as u32]);
family_variant!(VariableParameter::Separation(SeparationParameter) claims &[record_type::SEPARATION as u32]);
family_variant!(VariableParameter::EntityType(EntityTypeParameter) claims &[record_type::ENTITY_TYPE as u32]);
family_variant!(VariableParameter::EntityAssociation(EntityAssociationParameter) claims &[record_type::ENTITY_ASSOCIATION as u32]);
family_variant!(VariableParameter::Other(RawVariableParameter) claims &[]);

impl VariableParameter {
    fn decode_family(src: &mut DisReader<'_>) -> DisResult<Self> {
        Self::registry().decode(src)
    }

    /// Record type byte as it appears on the wire
    pub fn record_type(&self) -> u8 {
        match self {
            VariableParameter::ArticulatedPart(_) => record_type::ARTICULATED_PART,
            VariableParameter::AttachedPart(_) => record_type::ATTACHED_PART,
            VariableParameter::Separation(_) => record_type::SEPARATION,
            VariableParameter::EntityType(_) => record_type::ENTITY_TYPE,
            VariableParameter::EntityAssociation(_) => record_type::ENTITY_ASSOCIATION,
            VariableParameter::Other(raw) => raw.record_type,
        }
    }
}

impl RecordFamily for VariableParameter {
    const NAME: &'static str = "variable parameter";

    fn variants() -> Vec<Variant<Self>> {
        vec![
            Variant::of::<ArticulatedPart>(),
            Variant::of::<AttachedPart>(),
            Variant::of::<SeparationParameter>(),
            Variant::of::<EntityTypeParameter>(),
            Variant::of::<EntityAssociationParameter>(),
            Variant::of::<RawVariableParameter>(),
        ]
    }

    builtin_registry!(VariableParameter);
}

impl StreamDiscriminated for VariableParameter {
    fn peek_discriminator(src: &DisReader<'_>) -> DisResult<u32> {
        Ok(src.peek_u8()? as u32)
    }
}
