//! Entity information/interaction PDUs: entity state and collision

use bytes::BufMut;

use dis_core::{DisError, DisResult, EntityId, EventId, ForceId, PduType};

use super::{PduBody, PduDecode};
use crate::{
    Collection, DeadReckoningParameters, DisReader, EntityAppearance, EntityCapabilities,
    EntityMarking, EntityType, EulerAngles, PduHeader, Record, VariableParameter, Vector3Double,
    Vector3Float,
};

/// Largest variable parameter count the one-byte count field can carry
pub const MAX_VARIABLE_PARAMETERS: usize = u8::MAX as usize;

pub(crate) fn check_parameter_count(parameters: &Collection<VariableParameter>) -> DisResult<()> {
    if parameters.len() > MAX_VARIABLE_PARAMETERS {
        return Err(DisError::field_length(
            "variable parameter count",
            MAX_VARIABLE_PARAMETERS,
            parameters.len(),
        ));
    }
    Ok(())
}

/// Entity state PDU (type 1): position, motion and appearance of one entity
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityStatePdu {
    pub header: PduHeader,
    pub entity_id: EntityId,
    pub force_id: ForceId,
    pub entity_type: EntityType,
    pub alternative_entity_type: EntityType,
    pub linear_velocity: Vector3Float,
    pub location: Vector3Double,
    pub orientation: EulerAngles,
    pub appearance: EntityAppearance,
    pub dead_reckoning: DeadReckoningParameters,
    pub marking: EntityMarking,
    pub capabilities: EntityCapabilities,
    pub variable_parameters: Collection<VariableParameter>,
}

impl EntityStatePdu {
    /// Encoded size without variable parameters
    pub const FIXED_SIZE: usize = 144;
}

pdu_new!(EntityStatePdu);

impl PduBody for EntityStatePdu {
    header_accessors!();

    fn body_size(&self) -> usize {
        Self::FIXED_SIZE - crate::PDU_HEADER_SIZE + self.variable_parameters.wire_size()
    }

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.entity_id.encode(dst);
        dst.put_u8(self.force_id.to_raw());
        dst.put_u8(self.variable_parameters.len() as u8);
        self.entity_type.encode(dst);
        self.alternative_entity_type.encode(dst);
        self.linear_velocity.encode(dst);
        self.location.encode(dst);
        self.orientation.encode(dst);
        self.appearance.encode(dst);
        self.dead_reckoning.encode(dst);
        self.marking.encode(dst);
        self.capabilities.encode(dst);
        self.variable_parameters.encode(dst);
    }

    fn validate(&self) -> DisResult<()> {
        self.check_length()?;
        check_parameter_count(&self.variable_parameters)
    }
}

impl PduDecode for EntityStatePdu {
    const PDU_TYPE: PduType = PduType::EntityState;

    fn decode_body(header: PduHeader, src: &mut DisReader<'_>) -> DisResult<Self> {
        let entity_id = EntityId::decode(src)?;
        let force_id = ForceId::from_raw(src.read_u8()?);
        let parameter_count = src.read_u8()? as usize;
        let mut pdu = EntityStatePdu {
            header,
            entity_id,
            force_id,
            entity_type: EntityType::decode(src)?,
            alternative_entity_type: EntityType::decode(src)?,
            linear_velocity: Vector3Float::decode(src)?,
            location: Vector3Double::decode(src)?,
            orientation: EulerAngles::decode(src)?,
            appearance: EntityAppearance::decode(src)?,
            dead_reckoning: DeadReckoningParameters::decode(src)?,
            marking: EntityMarking::decode(src)?,
            capabilities: EntityCapabilities::decode(src)?,
            variable_parameters: Collection::new(),
        };
        pdu.variable_parameters.decode(src, parameter_count)?;
        Ok(pdu)
    }

    pdu_variant!(EntityState);
}

/// Collision PDU (type 4)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionPdu {
    pub header: PduHeader,
    pub issuing_entity: EntityId,
    pub colliding_entity: EntityId,
    pub event_id: EventId,
    pub collision_type: u8,
    pub velocity: Vector3Float,
    /// Kilograms
    pub mass: f32,
    /// Point of impact in the issuing entity's coordinates
    pub location: Vector3Float,
}

impl CollisionPdu {
    pub const SIZE: usize = 60;
}

pdu_new!(CollisionPdu);

impl PduBody for CollisionPdu {
    header_accessors!();

    fn body_size(&self) -> usize {
        Self::SIZE - crate::PDU_HEADER_SIZE
    }

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.issuing_entity.encode(dst);
        self.colliding_entity.encode(dst);
        self.event_id.encode(dst);
        dst.put_u8(self.collision_type);
        dst.put_u8(0);
        self.velocity.encode(dst);
        dst.put_f32(self.mass);
        self.location.encode(dst);
    }
}

impl PduDecode for CollisionPdu {
    const PDU_TYPE: PduType = PduType::Collision;

    fn decode_body(header: PduHeader, src: &mut DisReader<'_>) -> DisResult<Self> {
        let issuing_entity = EntityId::decode(src)?;
        let colliding_entity = EntityId::decode(src)?;
        let event_id = EventId::decode(src)?;
        let collision_type = src.read_u8()?;
        src.skip(1)?;
        Ok(CollisionPdu {
            header,
            issuing_entity,
            colliding_entity,
            event_id,
            collision_type,
            velocity: Vector3Float::decode(src)?,
            mass: src.read_f32()?,
            location: Vector3Float::decode(src)?,
        })
    }

    pdu_variant!(Collision);
}
