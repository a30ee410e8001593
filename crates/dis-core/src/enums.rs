//! Protocol enumerations
//!
//! Values follow the SISO-REF-010 enumeration tables for IEEE 1278.1.

dis_enum! {
    /// Protocol version carried in every PDU header
    #[derive(Default)]
    pub enum ProtocolVersion: u8 {
        Other = 0,
        DisPduVersion1_0 = 1,
        Ieee1278_1993 = 2,
        DisPduVersion2_0ThirdDraft = 3,
        DisPduVersion2_0FourthDraft = 4,
        Ieee1278_1_1995 = 5,
        #[allow(non_camel_case_types)]
        Ieee1278_1a_1998 = 6,
        #[default]
        Ieee1278_1_2012 = 7,
    }
}

impl ProtocolVersion {
    /// IEEE 1278.1-2012 introduced the PDU status byte and with it the
    /// fire/detonation descriptor indicator. Earlier versions always carry a
    /// munition descriptor.
    #[inline]
    pub fn has_pdu_status(self) -> bool {
        self.to_raw() >= ProtocolVersion::Ieee1278_1_2012.to_raw()
    }
}

dis_enum! {
    /// Protocol family a PDU type belongs to
    #[derive(Default)]
    pub enum ProtocolFamily: u8 {
        #[default]
        Other = 0,
        EntityInformationInteraction = 1,
        Warfare = 2,
        Logistics = 3,
        RadioCommunications = 4,
        SimulationManagement = 5,
        DistributedEmissionRegeneration = 6,
        EntityManagement = 7,
        Minefield = 8,
        SyntheticEnvironment = 9,
        SimulationManagementWithReliability = 10,
        LiveEntityInformationInteraction = 11,
        NonRealTime = 12,
        InformationOperations = 13,
    }
}

dis_enum! {
    /// PDU type carried in every PDU header
    #[derive(Default)]
    pub enum PduType: u8 {
        #[default]
        Other = 0,
        EntityState = 1,
        Fire = 2,
        Detonation = 3,
        Collision = 4,
        ServiceRequest = 5,
        ResupplyOffer = 6,
        ResupplyReceived = 7,
        ResupplyCancel = 8,
        RepairComplete = 9,
        RepairResponse = 10,
        CreateEntity = 11,
        RemoveEntity = 12,
        StartResume = 13,
        StopFreeze = 14,
        Acknowledge = 15,
        ActionRequest = 16,
        ActionResponse = 17,
        DataQuery = 18,
        SetData = 19,
        Data = 20,
        EventReport = 21,
        Comment = 22,
        ElectromagneticEmission = 23,
        Designator = 24,
        Transmitter = 25,
        Signal = 26,
        Receiver = 27,
        Iff = 28,
        UnderwaterAcoustic = 29,
        SupplementalEmission = 30,
        IntercomSignal = 31,
        IntercomControl = 32,
        AggregateState = 33,
        IsGroupOf = 34,
        TransferOwnership = 35,
        IsPartOf = 36,
        MinefieldState = 37,
        MinefieldQuery = 38,
        MinefieldData = 39,
        MinefieldResponseNack = 40,
        EnvironmentalProcess = 41,
        GriddedData = 42,
        PointObjectState = 43,
        LinearObjectState = 44,
        ArealObjectState = 45,
        Tspi = 46,
        Appearance = 47,
        ArticulatedParts = 48,
        LeFire = 49,
        LeDetonation = 50,
        CreateEntityReliable = 51,
        RemoveEntityReliable = 52,
        StartResumeReliable = 53,
        StopFreezeReliable = 54,
        AcknowledgeReliable = 55,
        ActionRequestReliable = 56,
        ActionResponseReliable = 57,
        DataQueryReliable = 58,
        SetDataReliable = 59,
        DataReliable = 60,
        EventReportReliable = 61,
        CommentReliable = 62,
        RecordReliable = 63,
        SetRecordReliable = 64,
        RecordQueryReliable = 65,
        CollisionElastic = 66,
        EntityStateUpdate = 67,
        DirectedEnergyFire = 68,
        EntityDamageStatus = 69,
        InformationOperationsAction = 70,
        InformationOperationsReport = 71,
        Attribute = 72,
    }
}

impl PduType {
    /// Protocol family this PDU type is defined in
    pub fn family(self) -> ProtocolFamily {
        use PduType::*;
        match self {
            EntityState | Collision | CollisionElastic | EntityStateUpdate | Attribute => {
                ProtocolFamily::EntityInformationInteraction
            }
            Fire | Detonation | DirectedEnergyFire | EntityDamageStatus => ProtocolFamily::Warfare,
            ServiceRequest | ResupplyOffer | ResupplyReceived | ResupplyCancel | RepairComplete
            | RepairResponse => ProtocolFamily::Logistics,
            CreateEntity | RemoveEntity | StartResume | StopFreeze | Acknowledge
            | ActionRequest | ActionResponse | DataQuery | SetData | Data | EventReport
            | Comment => ProtocolFamily::SimulationManagement,
            ElectromagneticEmission | Designator | UnderwaterAcoustic | SupplementalEmission
            | Iff => ProtocolFamily::DistributedEmissionRegeneration,
            Transmitter | Signal | Receiver | IntercomSignal | IntercomControl => {
                ProtocolFamily::RadioCommunications
            }
            AggregateState | IsGroupOf | TransferOwnership | IsPartOf => {
                ProtocolFamily::EntityManagement
            }
            MinefieldState | MinefieldQuery | MinefieldData | MinefieldResponseNack => {
                ProtocolFamily::Minefield
            }
            EnvironmentalProcess | GriddedData | PointObjectState | LinearObjectState
            | ArealObjectState => ProtocolFamily::SyntheticEnvironment,
            CreateEntityReliable | RemoveEntityReliable | StartResumeReliable
            | StopFreezeReliable | AcknowledgeReliable | ActionRequestReliable
            | ActionResponseReliable | DataQueryReliable | SetDataReliable | DataReliable
            | EventReportReliable | CommentReliable | RecordReliable | SetRecordReliable
            | RecordQueryReliable => ProtocolFamily::SimulationManagementWithReliability,
            Tspi | Appearance | ArticulatedParts | LeFire | LeDetonation => {
                ProtocolFamily::LiveEntityInformationInteraction
            }
            InformationOperationsAction | InformationOperationsReport => {
                ProtocolFamily::InformationOperations
            }
            Other | Unknown(_) => ProtocolFamily::Other,
        }
    }
}

dis_enum! {
    /// Force the entity is affiliated with
    #[derive(Default)]
    pub enum ForceId: u8 {
        #[default]
        Other = 0,
        Friendly = 1,
        Opposing = 2,
        Neutral = 3,
        Friendly2 = 4,
        Opposing2 = 5,
        Neutral2 = 6,
    }
}

dis_enum! {
    /// Top level of the entity type taxonomy
    #[derive(Default)]
    pub enum EntityKind: u8 {
        #[default]
        Other = 0,
        Platform = 1,
        Munition = 2,
        LifeForm = 3,
        Environmental = 4,
        CulturalFeature = 5,
        Supply = 6,
        Radio = 7,
        Expendable = 8,
        SensorEmitter = 9,
    }
}

dis_enum! {
    /// Domain of a platform, life form or sensor entity
    #[derive(Default)]
    pub enum PlatformDomain: u8 {
        #[default]
        Other = 0,
        Land = 1,
        Air = 2,
        Surface = 3,
        Subsurface = 4,
        Space = 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdu_type_roundtrip() {
        for raw in 0..=u8::MAX {
            assert_eq!(PduType::from_raw(raw).to_raw(), raw);
        }
        assert_eq!(PduType::from_raw(1), PduType::EntityState);
        assert_eq!(PduType::from_raw(72), PduType::Attribute);
        assert_eq!(PduType::from_raw(200), PduType::Unknown(200));
    }

    #[test]
    fn test_pdu_type_family() {
        assert_eq!(
            PduType::EntityState.family(),
            ProtocolFamily::EntityInformationInteraction
        );
        assert_eq!(PduType::Fire.family(), ProtocolFamily::Warfare);
        assert_eq!(PduType::Comment.family(), ProtocolFamily::SimulationManagement);
        assert_eq!(PduType::Transmitter.family(), ProtocolFamily::RadioCommunications);
        assert_eq!(PduType::Unknown(99).family(), ProtocolFamily::Other);
    }

    #[test]
    fn test_version_status_support() {
        assert!(ProtocolVersion::Ieee1278_1_2012.has_pdu_status());
        assert!(!ProtocolVersion::Ieee1278_1a_1998.has_pdu_status());
        assert!(ProtocolVersion::Unknown(8).has_pdu_status());
        assert_eq!(ProtocolVersion::default(), ProtocolVersion::Ieee1278_1_2012);
        assert_eq!(ProtocolVersion::from_raw(6), ProtocolVersion::Ieee1278_1a_1998);
    }

    #[test]
    fn test_unknown_is_known() {
        assert!(ForceId::Friendly.is_known());
        assert!(!ForceId::Unknown(99).is_known());
        assert_eq!(u8::from(ForceId::Neutral), 3);
        assert_eq!(EntityKind::from(1), EntityKind::Platform);
    }
}
