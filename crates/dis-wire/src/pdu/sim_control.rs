//! Simulation management PDUs without datums: entity lifecycle, start/stop
//! and acknowledgement

use bytes::BufMut;

use dis_core::{dis_enum, ClockTime, DisResult, EntityId, PduType};

use super::{PduBody, PduDecode};
use crate::{DisReader, PduHeader, Record, PDU_HEADER_SIZE};

dis_enum! {
    /// Why a simulation was stopped or frozen
    #[derive(Default)]
    pub enum StopFreezeReason: u8 {
        #[default]
        Other = 0,
        Recess = 1,
        Termination = 2,
        SystemFailure = 3,
        SecurityViolation = 4,
        EntityReconstitution = 5,
        StopForReset = 6,
        StopForRestart = 7,
        AbortTrainingReturnToTacticalOperations = 8,
    }
}

dis_enum! {
    /// Which request an acknowledge answers
    #[derive(Default)]
    pub enum AcknowledgeFlag: u16 {
        #[default]
        Unused = 0,
        CreateEntity = 1,
        RemoveEntity = 2,
        StartResume = 3,
        StopFreeze = 4,
        TransferOwnership = 5,
    }
}

dis_enum! {
    /// Whether the acknowledged request could be carried out
    #[derive(Default)]
    pub enum ResponseFlag: u16 {
        #[default]
        Other = 0,
        AbleToComply = 1,
        UnableToComply = 2,
        PendingOperatorAction = 3,
    }
}

/// Frozen behavior bits of a stop/freeze PDU
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FrozenBehavior(pub u8);

impl FrozenBehavior {
    pub const RUN_SIMULATION_CLOCK: u8 = 0b001;
    pub const TRANSMIT_UPDATES: u8 = 0b010;
    pub const PROCESS_UPDATES: u8 = 0b100;

    pub fn contains(self, flag: u8) -> bool {
        self.0 & flag == flag
    }

    pub fn set(&mut self, flag: u8, value: bool) {
        if value {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }
}

macro_rules! entity_request_pdu {
    ($(#[$meta:meta])* $name:ident, $pdu_type:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq)]
        pub struct $name {
            pub header: PduHeader,
            pub originating_entity: EntityId,
            pub receiving_entity: EntityId,
            pub request_id: u32,
        }

        impl $name {
            pub const SIZE: usize = 28;
        }

        pdu_new!($name);

        impl PduBody for $name {
            header_accessors!();

            fn body_size(&self) -> usize {
                Self::SIZE - PDU_HEADER_SIZE
            }

            fn encode_body(&self, dst: &mut impl BufMut) {
                self.originating_entity.encode(dst);
                self.receiving_entity.encode(dst);
                dst.put_u32(self.request_id);
            }
        }

        impl PduDecode for $name {
            const PDU_TYPE: PduType = PduType::$pdu_type;

            fn decode_body(header: PduHeader, src: &mut DisReader<'_>) -> DisResult<Self> {
                Ok($name {
                    header,
                    originating_entity: EntityId::decode(src)?,
                    receiving_entity: EntityId::decode(src)?,
                    request_id: src.read_u32()?,
                })
            }

            pdu_variant!($pdu_type);
        }
    };
}

entity_request_pdu!(
    /// Create entity PDU (type 11)
    CreateEntityPdu,
    CreateEntity
);

entity_request_pdu!(
    /// Remove entity PDU (type 12)
    RemoveEntityPdu,
    RemoveEntity
);

/// Start/resume PDU (type 13)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StartResumePdu {
    pub header: PduHeader,
    pub originating_entity: EntityId,
    pub receiving_entity: EntityId,
    /// Wall clock time at which to start
    pub real_world_time: ClockTime,
    /// Simulation time to start from
    pub simulation_time: ClockTime,
    pub request_id: u32,
}

impl StartResumePdu {
    pub const SIZE: usize = 44;
}

pdu_new!(StartResumePdu);

impl PduBody for StartResumePdu {
    header_accessors!();

    fn body_size(&self) -> usize {
        Self::SIZE - PDU_HEADER_SIZE
    }

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.originating_entity.encode(dst);
        self.receiving_entity.encode(dst);
        self.real_world_time.encode(dst);
        self.simulation_time.encode(dst);
        dst.put_u32(self.request_id);
    }
}

impl PduDecode for StartResumePdu {
    const PDU_TYPE: PduType = PduType::StartResume;

    fn decode_body(header: PduHeader, src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(StartResumePdu {
            header,
            originating_entity: EntityId::decode(src)?,
            receiving_entity: EntityId::decode(src)?,
            real_world_time: ClockTime::decode(src)?,
            simulation_time: ClockTime::decode(src)?,
            request_id: src.read_u32()?,
        })
    }

    pdu_variant!(StartResume);
}

/// Stop/freeze PDU (type 14)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StopFreezePdu {
    pub header: PduHeader,
    pub originating_entity: EntityId,
    pub receiving_entity: EntityId,
    pub real_world_time: ClockTime,
    pub reason: StopFreezeReason,
    pub frozen_behavior: FrozenBehavior,
    pub request_id: u32,
}

impl StopFreezePdu {
    pub const SIZE: usize = 40;
}

pdu_new!(StopFreezePdu);

impl PduBody for StopFreezePdu {
    header_accessors!();

    fn body_size(&self) -> usize {
        Self::SIZE - PDU_HEADER_SIZE
    }

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.originating_entity.encode(dst);
        self.receiving_entity.encode(dst);
        self.real_world_time.encode(dst);
        dst.put_u8(self.reason.to_raw());
        dst.put_u8(self.frozen_behavior.0);
        dst.put_u16(0);
        dst.put_u32(self.request_id);
    }
}

impl PduDecode for StopFreezePdu {
    const PDU_TYPE: PduType = PduType::StopFreeze;

    fn decode_body(header: PduHeader, src: &mut DisReader<'_>) -> DisResult<Self> {
        let originating_entity = EntityId::decode(src)?;
        let receiving_entity = EntityId::decode(src)?;
        let real_world_time = ClockTime::decode(src)?;
        let reason = StopFreezeReason::from_raw(src.read_u8()?);
        let frozen_behavior = FrozenBehavior(src.read_u8()?);
        src.skip(2)?;
        Ok(StopFreezePdu {
            header,
            originating_entity,
            receiving_entity,
            real_world_time,
            reason,
            frozen_behavior,
            request_id: src.read_u32()?,
        })
    }

    pdu_variant!(StopFreeze);
}

/// Acknowledge PDU (type 15)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AcknowledgePdu {
    pub header: PduHeader,
    pub originating_entity: EntityId,
    pub receiving_entity: EntityId,
    pub acknowledge_flag: AcknowledgeFlag,
    pub response_flag: ResponseFlag,
    pub request_id: u32,
}

impl AcknowledgePdu {
    pub const SIZE: usize = 32;
}

pdu_new!(AcknowledgePdu);

impl PduBody for AcknowledgePdu {
    header_accessors!();

    fn body_size(&self) -> usize {
        Self::SIZE - PDU_HEADER_SIZE
    }

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.originating_entity.encode(dst);
        self.receiving_entity.encode(dst);
        dst.put_u16(self.acknowledge_flag.to_raw());
        dst.put_u16(self.response_flag.to_raw());
        dst.put_u32(self.request_id);
    }
}

impl PduDecode for AcknowledgePdu {
    const PDU_TYPE: PduType = PduType::Acknowledge;

    fn decode_body(header: PduHeader, src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(AcknowledgePdu {
            header,
            originating_entity: EntityId::decode(src)?,
            receiving_entity: EntityId::decode(src)?,
            acknowledge_flag: AcknowledgeFlag::from_raw(src.read_u16()?),
            response_flag: ResponseFlag::from_raw(src.read_u16()?),
            request_id: src.read_u32()?,
        })
    }

    pdu_variant!(Acknowledge);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pdu;
    use dis_core::{Timestamp, TimestampKind};

    #[test]
    fn test_entity_request_sizes() {
        let mut create = CreateEntityPdu::new();
        create.originating_entity = EntityId::new(1, 3, 0);
        create.receiving_entity = EntityId::ALL;
        create.request_id = 77;
        create.update_header();
        assert_eq!(create.header.length, 28);
        assert_eq!(create.body_size(), 2 * EntityId::WIRE_SIZE + 4);

        let bytes = create.to_bytes();
        assert_eq!(&bytes[18..24], &[0xFF; 6]);
        assert_eq!(&bytes[24..28], &77u32.to_be_bytes());
        assert_eq!(Pdu::from_bytes(&bytes).unwrap(), Pdu::CreateEntity(create));

        let remove = RemoveEntityPdu::new();
        assert_eq!(remove.to_bytes()[2], 12);
    }

    #[test]
    fn test_start_resume_roundtrip() {
        let mut pdu = StartResumePdu::new();
        pdu.originating_entity = EntityId::new(1, 3, 0);
        pdu.real_world_time = ClockTime::new(
            -1,
            Timestamp::new(TimestampKind::Absolute, 1234),
        );
        pdu.simulation_time = ClockTime::new(12, Timestamp::new(TimestampKind::Relative, 99));
        pdu.request_id = u32::MAX;
        pdu.update_header();

        let bytes = pdu.to_bytes();
        assert_eq!(bytes.len(), StartResumePdu::SIZE);
        assert_eq!(&bytes[24..28], &(-1i32).to_be_bytes());
        assert_eq!(StartResumePdu::from_bytes(&bytes).unwrap(), pdu);
    }

    #[test]
    fn test_stop_freeze_roundtrip() {
        let mut pdu = StopFreezePdu::new();
        pdu.reason = StopFreezeReason::StopForReset;
        pdu.frozen_behavior.set(FrozenBehavior::PROCESS_UPDATES, true);
        pdu.request_id = 3;
        pdu.update_header();

        let bytes = pdu.to_bytes();
        assert_eq!(bytes.len(), 40);
        assert_eq!(bytes[32], 6);
        assert_eq!(bytes[33], 0b100);
        assert_eq!(&bytes[34..36], &[0, 0]);

        let decoded = StopFreezePdu::from_bytes(&bytes).unwrap();
        assert!(decoded.frozen_behavior.contains(FrozenBehavior::PROCESS_UPDATES));
        assert!(!decoded.frozen_behavior.contains(FrozenBehavior::RUN_SIMULATION_CLOCK));
        assert_eq!(decoded, pdu);
    }

    #[test]
    fn test_acknowledge_roundtrip() {
        let mut pdu = AcknowledgePdu::new();
        pdu.acknowledge_flag = AcknowledgeFlag::CreateEntity;
        pdu.response_flag = ResponseFlag::AbleToComply;
        pdu.request_id = 77;
        pdu.update_header();

        let bytes = pdu.to_bytes();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[24..28], &[0, 1, 0, 1]);
        assert_eq!(AcknowledgePdu::from_bytes(&bytes).unwrap(), pdu);
    }

    #[test]
    fn test_unknown_flags_survive() {
        let mut pdu = AcknowledgePdu::new();
        pdu.response_flag = ResponseFlag::Unknown(0x0102);
        let decoded = AcknowledgePdu::from_bytes(&pdu.to_bytes()).unwrap();
        assert_eq!(decoded.response_flag, ResponseFlag::Unknown(0x0102));
        assert!(!decoded.response_flag.is_known());
    }
}
