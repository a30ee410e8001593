//! Warfare PDUs: fire and detonation
//!
//! Both carry a 16-byte descriptor whose layout is picked by the type
//! indicator in PDU status bits 4-5. Headers older than IEEE 1278.1-2012 have
//! no PDU status field, so for them the descriptor is always a munition.

use bytes::BufMut;

use dis_core::{DisError, DisResult, EntityId, EventId, PduType};

use super::entity_information::check_parameter_count;
use super::{PduBody, PduDecode};
use crate::{
    indicator, Collection, Descriptor, DisReader, MunitionDescriptor, PduHeader, Record,
    VariableParameter, Vector3Double, Vector3Float,
};

/// Descriptor indicator in effect for `header`
pub fn descriptor_indicator(header: &PduHeader) -> u8 {
    if header.protocol_version.has_pdu_status() {
        header.status.type_indicator()
    } else {
        indicator::MUNITION
    }
}

fn store_descriptor(
    header: &mut PduHeader,
    slot: &mut Descriptor,
    descriptor: Descriptor,
) -> DisResult<()> {
    check_descriptor(header, &descriptor)?;
    if header.protocol_version.has_pdu_status() {
        header.status.set_type_indicator(descriptor.indicator());
    }
    *slot = descriptor;
    Ok(())
}

fn check_descriptor(header: &PduHeader, descriptor: &Descriptor) -> DisResult<()> {
    if !header.protocol_version.has_pdu_status() && descriptor.indicator() != indicator::MUNITION {
        return Err(DisError::InvalidWireFormat(format!(
            "{} descriptor needs protocol version 7, header has {:?}",
            descriptor.variant_name(),
            header.protocol_version
        )));
    }
    Ok(())
}

/// Fire PDU (type 2)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FirePdu {
    pub header: PduHeader,
    pub firing_entity: EntityId,
    pub target_entity: EntityId,
    /// Entity id of the munition or expendable, if it is simulated as one
    pub munition_id: EntityId,
    pub event_id: EventId,
    pub fire_mission_index: u32,
    pub location: Vector3Double,
    descriptor: Descriptor,
    pub velocity: Vector3Float,
    /// Meters
    pub range: f32,
}

impl FirePdu {
    pub const SIZE: usize = 96;

    #[inline]
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Replace the descriptor and keep the status indicator in step with it.
    ///
    /// Fails for non-munition descriptors on pre-2012 headers.
    pub fn set_descriptor(&mut self, descriptor: impl Into<Descriptor>) -> DisResult<()> {
        store_descriptor(&mut self.header, &mut self.descriptor, descriptor.into())
    }

    pub fn munition_mut(&mut self) -> Option<&mut MunitionDescriptor> {
        match &mut self.descriptor {
            Descriptor::Munition(munition) => Some(munition),
            _ => None,
        }
    }
}

pdu_new!(FirePdu);

impl PduBody for FirePdu {
    header_accessors!();

    fn body_size(&self) -> usize {
        Self::SIZE - crate::PDU_HEADER_SIZE
    }

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.firing_entity.encode(dst);
        self.target_entity.encode(dst);
        self.munition_id.encode(dst);
        self.event_id.encode(dst);
        dst.put_u32(self.fire_mission_index);
        self.location.encode(dst);
        self.descriptor.encode(dst);
        self.velocity.encode(dst);
        dst.put_f32(self.range);
    }

    fn validate(&self) -> DisResult<()> {
        self.check_length()?;
        check_descriptor(&self.header, &self.descriptor)
    }
}

impl PduDecode for FirePdu {
    const PDU_TYPE: PduType = PduType::Fire;

    fn decode_body(header: PduHeader, src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(FirePdu {
            firing_entity: EntityId::decode(src)?,
            target_entity: EntityId::decode(src)?,
            munition_id: EntityId::decode(src)?,
            event_id: EventId::decode(src)?,
            fire_mission_index: src.read_u32()?,
            location: Vector3Double::decode(src)?,
            descriptor: Descriptor::decode_for(descriptor_indicator(&header), src)?,
            velocity: Vector3Float::decode(src)?,
            range: src.read_f32()?,
            header,
        })
    }

    pdu_variant!(Fire);
}

/// Detonation PDU (type 3)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetonationPdu {
    pub header: PduHeader,
    pub firing_entity: EntityId,
    pub target_entity: EntityId,
    /// Entity id of the exploding munition or expendable
    pub munition_id: EntityId,
    pub event_id: EventId,
    pub velocity: Vector3Float,
    pub location: Vector3Double,
    descriptor: Descriptor,
    /// Detonation point relative to the target entity
    pub location_in_entity: Vector3Float,
    pub detonation_result: u8,
    pub variable_parameters: Collection<VariableParameter>,
}

impl DetonationPdu {
    /// Encoded size without variable parameters
    pub const FIXED_SIZE: usize = 104;

    #[inline]
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Replace the descriptor and keep the status indicator in step with it.
    ///
    /// Fails for non-munition descriptors on pre-2012 headers.
    pub fn set_descriptor(&mut self, descriptor: impl Into<Descriptor>) -> DisResult<()> {
        store_descriptor(&mut self.header, &mut self.descriptor, descriptor.into())
    }

    pub fn munition_mut(&mut self) -> Option<&mut MunitionDescriptor> {
        match &mut self.descriptor {
            Descriptor::Munition(munition) => Some(munition),
            _ => None,
        }
    }
}

pdu_new!(DetonationPdu);

impl PduBody for DetonationPdu {
    header_accessors!();

    fn body_size(&self) -> usize {
        Self::FIXED_SIZE - crate::PDU_HEADER_SIZE + self.variable_parameters.wire_size()
    }

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.firing_entity.encode(dst);
        self.target_entity.encode(dst);
        self.munition_id.encode(dst);
        self.event_id.encode(dst);
        self.velocity.encode(dst);
        self.location.encode(dst);
        self.descriptor.encode(dst);
        self.location_in_entity.encode(dst);
        dst.put_u8(self.detonation_result);
        dst.put_u8(self.variable_parameters.len() as u8);
        dst.put_u16(0);
        self.variable_parameters.encode(dst);
    }

    fn validate(&self) -> DisResult<()> {
        self.check_length()?;
        check_descriptor(&self.header, &self.descriptor)?;
        check_parameter_count(&self.variable_parameters)
    }
}

impl PduDecode for DetonationPdu {
    const PDU_TYPE: PduType = PduType::Detonation;

    fn decode_body(header: PduHeader, src: &mut DisReader<'_>) -> DisResult<Self> {
        let firing_entity = EntityId::decode(src)?;
        let target_entity = EntityId::decode(src)?;
        let munition_id = EntityId::decode(src)?;
        let event_id = EventId::decode(src)?;
        let velocity = Vector3Float::decode(src)?;
        let location = Vector3Double::decode(src)?;
        let descriptor = Descriptor::decode_for(descriptor_indicator(&header), src)?;
        let location_in_entity = Vector3Float::decode(src)?;
        let detonation_result = src.read_u8()?;
        let parameter_count = src.read_u8()? as usize;
        src.skip(2)?;
        Ok(DetonationPdu {
            header,
            firing_entity,
            target_entity,
            munition_id,
            event_id,
            velocity,
            location,
            descriptor,
            location_in_entity,
            detonation_result,
            variable_parameters: Collection::decoded(src, parameter_count)?,
        })
    }

    pdu_variant!(Detonation);
}
