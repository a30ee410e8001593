//! Sample PDUs
//!
//! Every built-in body type with non-trivial field values, for round-trip,
//! bundling and benchmark use.

use dis_core::{
    ClockTime, DisResult, EntityId, EntityKind, EventId, ForceId, PduType, PlatformDomain,
    ProtocolVersion, Timestamp, TimestampKind,
};
use dis_wire::*;

/// Location used by the entity state reference case
pub const REFERENCE_LOCATION: Vector3Double = Vector3Double::new(4_500_000.0, 4_500_000.0, 0.0);

fn header_time(units: u32) -> Timestamp {
    Timestamp::new(TimestampKind::Absolute, units)
}

/// Entity state with id (1,1,1), friendly force, a US air platform and no
/// variable parameters
pub fn reference_entity_state() -> DisResult<EntityStatePdu> {
    let mut pdu = EntityStatePdu::new();
    pdu.entity_id = EntityId::new(1, 1, 1);
    pdu.force_id = ForceId::Friendly;
    pdu.entity_type = EntityType::new(
        EntityKind::Platform,
        PlatformDomain::Air.to_raw(),
        225,
        1,
        1,
        0,
        0,
    );
    pdu.location = REFERENCE_LOCATION;
    pdu.marking = EntityMarking::new("TestUnit1")?;
    Ok(pdu)
}

/// Tank with a turret, a gun and one store, including a parameter record
/// type nothing decodes specially
pub fn articulated_entity_state() -> DisResult<EntityStatePdu> {
    let mut pdu = EntityStatePdu::new();
    pdu.header.timestamp = header_time(123_456);
    pdu.header.exercise_id = 7;
    pdu.entity_id = EntityId::new(17, 23, 4004);
    pdu.force_id = ForceId::Opposing;
    pdu.entity_type = EntityType::new(EntityKind::Platform, 1, 222, 1, 2, 3, 0);
    pdu.alternative_entity_type = EntityType::platform(PlatformDomain::Land, 225, 1);
    pdu.linear_velocity = Vector3Float::new(12.5, -3.25, 0.0);
    pdu.location = Vector3Double::new(-2_707_223.5, -4_353_628.25, 3_781_413.0);
    pdu.orientation = EulerAngles::new(1.5, -0.25, 0.0);
    pdu.appearance = EntityAppearance::new(0x0040_0021);
    pdu.dead_reckoning = DeadReckoningParameters::new(DeadReckoningAlgorithm::FixedVelocityWorld);
    pdu.dead_reckoning.linear_acceleration = Vector3Float::new(0.5, 0.0, -9.75);
    pdu.marking = EntityMarking::new("T72-A")?;
    pdu.capabilities = EntityCapabilities(0x0000_0005);

    // Turret azimuth, gun elevation
    pdu.variable_parameters.push(ArticulatedPart::new(0, 4096, 11, 0.785));
    pdu.variable_parameters.push(ArticulatedPart::new(4096, 4416, 13, -0.05));
    pdu.variable_parameters.push(AttachedPart {
        detached_indicator: 0,
        part_attached_to: 0,
        parameter_type: 896,
        part_type: EntityType::new(EntityKind::Munition, 2, 225, 1, 1, 0, 0),
    });
    pdu.variable_parameters
        .push(RawVariableParameter::new(9, &[0xA5; VARIABLE_PARAMETER_PAYLOAD])?);
    Ok(pdu)
}

pub fn sample_fire() -> DisResult<FirePdu> {
    let mut pdu = FirePdu::new();
    pdu.header.timestamp = header_time(1_000);
    pdu.firing_entity = EntityId::new(1, 1, 1);
    pdu.target_entity = EntityId::new(2, 1, 7);
    pdu.munition_id = EntityId::new(1, 1, 900);
    pdu.event_id = EventId {
        site: 1,
        application: 1,
        event_number: 42,
    };
    pdu.fire_mission_index = 3;
    pdu.location = Vector3Double::new(1.0e6, -2.0e6, 3.0e5);
    pdu.set_descriptor(MunitionDescriptor {
        munition_type: EntityType::new(EntityKind::Munition, 2, 225, 2, 1, 0, 0),
        warhead: 1000,
        fuse: 1010,
        quantity: 1,
        rate: 0,
    })?;
    pdu.velocity = Vector3Float::new(300.0, 0.0, 15.0);
    pdu.range = 2_500.0;
    Ok(pdu)
}

/// Detonation with an explosion descriptor and one articulated part
pub fn sample_detonation() -> DisResult<DetonationPdu> {
    let mut pdu = DetonationPdu::new();
    pdu.header.timestamp = header_time(2_000);
    pdu.firing_entity = EntityId::new(1, 1, 1);
    pdu.target_entity = EntityId::new(2, 1, 7);
    pdu.munition_id = EntityId::new(1, 1, 900);
    pdu.event_id = EventId {
        site: 1,
        application: 1,
        event_number: 42,
    };
    pdu.velocity = Vector3Float::new(-10.0, 2.0, -250.0);
    pdu.location = Vector3Double::new(1.0e6 + 2_400.0, -2.0e6, 0.0);
    pdu.set_descriptor(ExplosionDescriptor {
        explosion_type: EntityType::new(EntityKind::Munition, 8, 0, 1, 0, 0, 0),
        explosive_material: 3,
        explosive_force: 12.5,
    })?;
    pdu.location_in_entity = Vector3Float::new(0.5, 0.0, 1.0);
    pdu.detonation_result = 1;
    pdu.variable_parameters.push(ArticulatedPart::new(0, 4096, 11, 1.0));
    Ok(pdu)
}

pub fn sample_collision() -> CollisionPdu {
    let mut pdu = CollisionPdu::new();
    pdu.issuing_entity = EntityId::new(1, 1, 1);
    pdu.colliding_entity = EntityId::new(1, 1, 2);
    pdu.event_id = EventId {
        site: 1,
        application: 1,
        event_number: 5,
    };
    pdu.collision_type = 1;
    pdu.velocity = Vector3Float::new(3.0, 4.0, 0.0);
    pdu.mass = 42_000.0;
    pdu.location = Vector3Float::new(1.0, -2.0, 0.5);
    pdu
}

fn manager() -> EntityId {
    EntityId::new(1, 100, 0)
}

fn simulator() -> EntityId {
    EntityId::new(1, 200, 0)
}

pub fn sample_create_entity() -> CreateEntityPdu {
    let mut pdu = CreateEntityPdu::new();
    pdu.originating_entity = manager();
    pdu.receiving_entity = simulator();
    pdu.request_id = 1;
    pdu
}

pub fn sample_remove_entity() -> RemoveEntityPdu {
    let mut pdu = RemoveEntityPdu::new();
    pdu.originating_entity = manager();
    pdu.receiving_entity = simulator();
    pdu.request_id = 2;
    pdu
}

pub fn sample_start_resume() -> StartResumePdu {
    let mut pdu = StartResumePdu::new();
    pdu.originating_entity = manager();
    pdu.receiving_entity = EntityId::ALL;
    pdu.real_world_time = ClockTime::new(475_000, header_time(10));
    pdu.simulation_time = ClockTime::new(-1, Timestamp::new(TimestampKind::Relative, 99));
    pdu.request_id = 3;
    pdu
}

pub fn sample_stop_freeze() -> StopFreezePdu {
    let mut pdu = StopFreezePdu::new();
    pdu.originating_entity = manager();
    pdu.receiving_entity = EntityId::ALL;
    pdu.real_world_time = ClockTime::new(475_001, header_time(20));
    pdu.reason = StopFreezeReason::Recess;
    pdu.frozen_behavior.set(FrozenBehavior::PROCESS_UPDATES, true);
    pdu.request_id = 4;
    pdu
}

pub fn sample_acknowledge() -> AcknowledgePdu {
    let mut pdu = AcknowledgePdu::new();
    pdu.originating_entity = simulator();
    pdu.receiving_entity = manager();
    pdu.acknowledge_flag = AcknowledgeFlag::CreateEntity;
    pdu.response_flag = ResponseFlag::AbleToComply;
    pdu.request_id = 1;
    pdu
}

/// One datum of every built-in kind plus generic ones
pub fn sample_datums() -> DisResult<DatumSpecification> {
    let mut datums = DatumSpecification::new();
    let tank = EntityType::new(EntityKind::Platform, 1, 225, 1, 1, 3, 0);
    for field in EntityTypeFieldDatum::split(&tank).into_iter().take(3) {
        datums.push_fixed(field);
    }
    datums.push_fixed(ForceIdDatum::new(ForceId::Friendly));
    datums.push_fixed(GenericFixedDatum::from_f32(50_000, -12.75));
    datums.push_fixed(GenericFixedDatum::from_i32(50_001, -3));

    datums.push_variable(EntityTypeDatum { entity_type: tank });
    datums.push_variable(DescriptionDatum::new("Bravo company, 2nd platoon")?);
    let mut samples = GenericVariableDatum::new(60_000);
    samples.set_f64s(&[1.5, -2.25, 1.0e-9]);
    datums.push_variable(samples);
    datums.push_variable(GenericVariableDatum::new(60_001));
    datums.push_variable(GenericVariableDatum::from_slice(60_002, &[1, 2, 3]));
    Ok(datums)
}

pub fn sample_action_request() -> DisResult<ActionRequestPdu> {
    let mut pdu = ActionRequestPdu::new();
    pdu.originating_entity = manager();
    pdu.receiving_entity = simulator();
    pdu.request_id = 10;
    pdu.action_id = 5;
    pdu.datums = sample_datums()?;
    Ok(pdu)
}

pub fn sample_action_response() -> ActionResponsePdu {
    let mut pdu = ActionResponsePdu::new();
    pdu.originating_entity = simulator();
    pdu.receiving_entity = manager();
    pdu.request_id = 10;
    pdu.request_status = 2;
    pdu.datums.push_fixed(GenericFixedDatum::from_u32(50_002, u32::MAX));
    pdu
}

pub fn sample_data_query() -> DataQueryPdu {
    let mut pdu = DataQueryPdu::new();
    pdu.originating_entity = manager();
    pdu.receiving_entity = simulator();
    pdu.request_id = 11;
    pdu.time_interval = 5_000;
    pdu.fixed_datum_ids = vec![datum_id::FORCE_ID, datum_id::ENTITY_KIND];
    pdu.variable_datum_ids = vec![datum_id::ENTITY_TYPE];
    pdu
}

pub fn sample_set_data() -> DisResult<SetDataPdu> {
    let mut pdu = SetDataPdu::new();
    pdu.originating_entity = manager();
    pdu.receiving_entity = simulator();
    pdu.request_id = 12;
    pdu.datums = sample_datums()?;
    Ok(pdu)
}

pub fn sample_data() -> DisResult<DataPdu> {
    let mut pdu = DataPdu::new();
    pdu.originating_entity = simulator();
    pdu.receiving_entity = manager();
    pdu.request_id = 11;
    pdu.datums = sample_datums()?;
    Ok(pdu)
}

pub fn sample_event_report() -> EventReportPdu {
    let mut pdu = EventReportPdu::new();
    pdu.originating_entity = simulator();
    pdu.receiving_entity = manager();
    pdu.event_type = 9;
    pdu.datums.push_fixed(ForceIdDatum::new(ForceId::Neutral));
    pdu
}

pub fn sample_comment() -> DisResult<CommentPdu> {
    let mut pdu = CommentPdu::new();
    pdu.originating_entity = simulator();
    pdu.receiving_entity = EntityId::ALL;
    pdu.datums
        .push_variable(DescriptionDatum::new("exercise paused for weather")?);
    Ok(pdu)
}

/// Signal PDU, which has no built-in body decoder
pub fn sample_raw() -> RawPdu {
    let mut header = PduHeader::new(PduType::Signal);
    header.length = (PDU_HEADER_SIZE + 8) as u16;
    RawPdu {
        header,
        body: vec![0, 1, 0, 2, 0xDE, 0xAD, 0xBE, 0xEF],
    }
}

/// Fire PDU with a pre-2012 header, which always carries a munition descriptor
pub fn legacy_fire() -> DisResult<FirePdu> {
    let mut pdu = sample_fire()?;
    pdu.header.protocol_version = ProtocolVersion::Ieee1278_1a_1998;
    pdu.header.status = PduStatus::default();
    Ok(pdu)
}

/// One PDU of every built-in type, plus a raw one
pub fn sample_pdus() -> DisResult<Vec<Pdu>> {
    Ok(vec![
        reference_entity_state()?.into_pdu(),
        articulated_entity_state()?.into_pdu(),
        sample_fire()?.into_pdu(),
        legacy_fire()?.into_pdu(),
        sample_detonation()?.into_pdu(),
        sample_collision().into_pdu(),
        sample_create_entity().into_pdu(),
        sample_remove_entity().into_pdu(),
        sample_start_resume().into_pdu(),
        sample_stop_freeze().into_pdu(),
        sample_acknowledge().into_pdu(),
        sample_action_request()?.into_pdu(),
        sample_action_response().into_pdu(),
        sample_data_query().into_pdu(),
        sample_set_data()?.into_pdu(),
        sample_data()?.into_pdu(),
        sample_event_report().into_pdu(),
        sample_comment()?.into_pdu(),
        Pdu::from(sample_raw()),
    ])
}

/// Concatenate encoded PDUs into one datagram
pub fn bundle(pdus: &[Pdu]) -> Vec<u8> {
    let mut datagram = Vec::with_capacity(pdus.iter().map(Pdu::wire_size).sum());
    for pdu in pdus {
        pdu.encode(&mut datagram);
    }
    datagram
}

/// Pdus as they come back from the wire: header lengths filled in
pub fn normalized(pdus: &[Pdu]) -> Vec<Pdu> {
    pdus.iter()
        .map(|pdu| {
            let mut pdu = pdu.clone();
            pdu.update_header();
            pdu
        })
        .collect()
}
