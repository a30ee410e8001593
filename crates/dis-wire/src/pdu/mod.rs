//! PDU bodies
//!
//! Every PDU is a `PduHeader` followed by fixed fields and, for some types,
//! count-prefixed record collections. Concrete PDUs implement `PduBody` for
//! sizing and encoding and `PduDecode` for decoding; `Pdu` is the closed sum
//! the dispatcher hands to callbacks, with `RawPdu` covering every type that
//! has no built-in body.

pub use entity_information::*;
pub use sim_control::*;
pub use sim_data::*;
pub use warfare::*;

use bytes::BufMut;

use dis_core::{DisError, DisResult, PduType};

use crate::{DisReader, PduHeader, Record, PDU_HEADER_SIZE};

/// Largest length a header can declare
pub const MAX_PDU_SIZE: usize = u16::MAX as usize;

/// Sizing and encoding shared by all PDUs
pub trait PduBody {
    fn header(&self) -> &PduHeader;

    fn header_mut(&mut self) -> &mut PduHeader;

    /// Encoded size of everything after the header
    fn body_size(&self) -> usize;

    /// Append everything after the header
    fn encode_body(&self, dst: &mut impl BufMut);

    /// Type written into the header on encode
    fn pdu_type(&self) -> PduType {
        self.header().pdu_type
    }

    /// Checks that must pass before the PDU can be sent
    fn validate(&self) -> DisResult<()> {
        self.check_length()
    }

    /// The encoded PDU must fit the 16-bit header length
    fn check_length(&self) -> DisResult<()> {
        let size = self.wire_size();
        if size > MAX_PDU_SIZE {
            return Err(DisError::field_length("pdu length", MAX_PDU_SIZE, size));
        }
        Ok(())
    }

    fn wire_size(&self) -> usize {
        PDU_HEADER_SIZE + self.body_size()
    }

    /// Header as it goes on the wire: computed length, consistent type and family
    fn wire_header(&self) -> PduHeader {
        let mut header = *self.header();
        let pdu_type = self.pdu_type();
        if header.pdu_type != pdu_type {
            header.pdu_type = pdu_type;
            header.protocol_family = pdu_type.family();
        }
        header.length = self.wire_size().min(MAX_PDU_SIZE) as u16;
        header
    }

    /// Store the wire header, so `header().length` reflects the current contents
    fn update_header(&mut self) {
        let header = self.wire_header();
        *self.header_mut() = header;
    }

    fn encode(&self, dst: &mut impl BufMut) {
        self.wire_header().encode(dst);
        self.encode_body(dst);
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.wire_size());
        self.encode(&mut buf);
        buf
    }
}

/// Decoding for PDUs with a built-in body
pub trait PduDecode: PduBody + Sized {
    const PDU_TYPE: PduType;

    /// Decode the body following an already decoded header
    fn decode_body(header: PduHeader, src: &mut DisReader<'_>) -> DisResult<Self>;

    fn into_pdu(self) -> Pdu;

    fn from_pdu(pdu: &Pdu) -> Option<&Self>;

    fn from_pdu_mut(pdu: &mut Pdu) -> Option<&mut Self>;

    /// Header plus body
    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let header = PduHeader::decode(src)?;
        Self::decode_body(header, src)
    }

    fn from_bytes(buf: &[u8]) -> DisResult<Self> {
        Self::decode(&mut DisReader::new(buf))
    }
}

/// `header`/`header_mut` for structs with a `header` field
macro_rules! header_accessors {
    () => {
        fn header(&self) -> &$crate::PduHeader {
            &self.header
        }

        fn header_mut(&mut self) -> &mut $crate::PduHeader {
            &mut self.header
        }

        fn pdu_type(&self) -> ::dis_core::PduType {
            <Self as $crate::PduDecode>::PDU_TYPE
        }
    };
}

/// The parts of `PduDecode` that only depend on the `Pdu` variant
macro_rules! pdu_variant {
    ($variant:ident) => {
        fn into_pdu(self) -> $crate::Pdu {
            $crate::Pdu::$variant(self)
        }

        fn from_pdu(pdu: &$crate::Pdu) -> Option<&Self> {
            match pdu {
                $crate::Pdu::$variant(body) => Some(body),
                _ => None,
            }
        }

        fn from_pdu_mut(pdu: &mut $crate::Pdu) -> Option<&mut Self> {
            match pdu {
                $crate::Pdu::$variant(body) => Some(body),
                _ => None,
            }
        }
    };
}

/// Inherent `new` producing a body with a correctly typed header
macro_rules! pdu_new {
    ($ty:ident) => {
        impl $ty {
            pub fn new() -> Self {
                $ty {
                    header: $crate::PduHeader::new(<$ty as $crate::PduDecode>::PDU_TYPE),
                    ..Default::default()
                }
            }
        }
    };
}

mod entity_information;
mod sim_control;
mod sim_data;
mod warfare;

/// PDU of a type without a built-in body; the body bytes are kept verbatim
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawPdu {
    pub header: PduHeader,
    pub body: Vec<u8>,
}

impl RawPdu {
    /// Consume the body announced by `header`.
    ///
    /// A declared length below the header size (including zero) takes the
    /// rest of the reader; a length past the end of the reader is clamped.
    pub fn decode_body(header: PduHeader, src: &mut DisReader<'_>) -> DisResult<Self> {
        let declared = header.length as usize;
        let body_len = if declared < PDU_HEADER_SIZE {
            src.remaining()
        } else {
            (declared - PDU_HEADER_SIZE).min(src.remaining())
        };
        Ok(RawPdu {
            header,
            body: src.read_bytes(body_len)?.to_vec(),
        })
    }
}

impl PduBody for RawPdu {
    fn header(&self) -> &PduHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut PduHeader {
        &mut self.header
    }

    fn body_size(&self) -> usize {
        self.body.len()
    }

    fn encode_body(&self, dst: &mut impl BufMut) {
        dst.put_slice(&self.body);
    }
}

/// Any decoded PDU
#[derive(Clone, Debug, PartialEq)]
pub enum Pdu {
    EntityState(EntityStatePdu),
    Fire(FirePdu),
    Detonation(DetonationPdu),
    Collision(CollisionPdu),
    CreateEntity(CreateEntityPdu),
    RemoveEntity(RemoveEntityPdu),
    StartResume(StartResumePdu),
    StopFreeze(StopFreezePdu),
    Acknowledge(AcknowledgePdu),
    ActionRequest(ActionRequestPdu),
    ActionResponse(ActionResponsePdu),
    DataQuery(DataQueryPdu),
    SetData(SetDataPdu),
    Data(DataPdu),
    EventReport(EventReportPdu),
    Comment(CommentPdu),
    Raw(RawPdu),
}

macro_rules! with_body {
    ($pdu:expr, $body:ident => $e:expr) => {
        match $pdu {
            Pdu::EntityState($body) => $e,
            Pdu::Fire($body) => $e,
            Pdu::Detonation($body) => $e,
            Pdu::Collision($body) => $e,
            Pdu::CreateEntity($body) => $e,
            Pdu::RemoveEntity($body) => $e,
            Pdu::StartResume($body) => $e,
            Pdu::StopFreeze($body) => $e,
            Pdu::Acknowledge($body) => $e,
            Pdu::ActionRequest($body) => $e,
            Pdu::ActionResponse($body) => $e,
            Pdu::DataQuery($body) => $e,
            Pdu::SetData($body) => $e,
            Pdu::Data($body) => $e,
            Pdu::EventReport($body) => $e,
            Pdu::Comment($body) => $e,
            Pdu::Raw($body) => $e,
        }
    };
}

/// PDU types with a built-in body decoder
pub const BUILTIN_PDU_TYPES: &[PduType] = &[
    PduType::EntityState,
    PduType::Fire,
    PduType::Detonation,
    PduType::Collision,
    PduType::CreateEntity,
    PduType::RemoveEntity,
    PduType::StartResume,
    PduType::StopFreeze,
    PduType::Acknowledge,
    PduType::ActionRequest,
    PduType::ActionResponse,
    PduType::DataQuery,
    PduType::SetData,
    PduType::Data,
    PduType::EventReport,
    PduType::Comment,
];

impl Pdu {
    pub fn header(&self) -> &PduHeader {
        with_body!(self, b => b.header())
    }

    pub fn header_mut(&mut self) -> &mut PduHeader {
        with_body!(self, b => b.header_mut())
    }

    pub fn pdu_type(&self) -> PduType {
        with_body!(self, b => b.pdu_type())
    }

    pub fn wire_size(&self) -> usize {
        with_body!(self, b => b.wire_size())
    }

    pub fn validate(&self) -> DisResult<()> {
        with_body!(self, b => b.validate())
    }

    pub fn update_header(&mut self) {
        with_body!(self, b => b.update_header())
    }

    pub fn encode(&self, dst: &mut impl BufMut) {
        with_body!(self, b => b.encode(dst))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        with_body!(self, b => b.to_bytes())
    }

    /// Concrete body, if this PDU holds a `T`
    pub fn body<T: PduDecode>(&self) -> Option<&T> {
        T::from_pdu(self)
    }

    pub fn body_mut<T: PduDecode>(&mut self) -> Option<&mut T> {
        T::from_pdu_mut(self)
    }

    /// Decode the body for `header` with the built-in decoder for its type,
    /// or as `RawPdu` when there is none
    pub fn decode_body(header: PduHeader, src: &mut DisReader<'_>) -> DisResult<Self> {
        fn body<T: PduDecode>(header: PduHeader, src: &mut DisReader<'_>) -> DisResult<Pdu> {
            T::decode_body(header, src).map(PduDecode::into_pdu)
        }
        match header.pdu_type {
            PduType::EntityState => body::<EntityStatePdu>(header, src),
            PduType::Fire => body::<FirePdu>(header, src),
            PduType::Detonation => body::<DetonationPdu>(header, src),
            PduType::Collision => body::<CollisionPdu>(header, src),
            PduType::CreateEntity => body::<CreateEntityPdu>(header, src),
            PduType::RemoveEntity => body::<RemoveEntityPdu>(header, src),
            PduType::StartResume => body::<StartResumePdu>(header, src),
            PduType::StopFreeze => body::<StopFreezePdu>(header, src),
            PduType::Acknowledge => body::<AcknowledgePdu>(header, src),
            PduType::ActionRequest => body::<ActionRequestPdu>(header, src),
            PduType::ActionResponse => body::<ActionResponsePdu>(header, src),
            PduType::DataQuery => body::<DataQueryPdu>(header, src),
            PduType::SetData => body::<SetDataPdu>(header, src),
            PduType::Data => body::<DataPdu>(header, src),
            PduType::EventReport => body::<EventReportPdu>(header, src),
            PduType::Comment => body::<CommentPdu>(header, src),
            _ => Ok(Pdu::Raw(RawPdu::decode_body(header, src)?)),
        }
    }

    /// Decode one PDU, header included
    pub fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let header = PduHeader::decode(src)?;
        Self::decode_body(header, src)
    }

    pub fn from_bytes(buf: &[u8]) -> DisResult<Self> {
        Self::decode(&mut DisReader::new(buf))
    }
}

impl From<RawPdu> for Pdu {
    fn from(raw: RawPdu) -> Self {
        Pdu::Raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dis_core::{EntityId, ProtocolFamily};

    #[test]
    fn test_raw_pdu_roundtrip() {
        let mut raw = RawPdu {
            header: PduHeader::new(PduType::Signal),
            body: vec![1, 2, 3, 4, 5, 6, 7, 8],
        };
        raw.update_header();
        assert_eq!(raw.header.length, 20);

        let bytes = raw.to_bytes();
        let decoded = Pdu::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, Pdu::Raw(raw));
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn test_raw_pdu_length_clamped() {
        let mut header = PduHeader::new(PduType::Signal);
        header.length = 400;
        let mut buf = Vec::new();
        header.encode(&mut buf);
        buf.extend_from_slice(&[9; 10]);

        let mut src = DisReader::new(&buf);
        match Pdu::decode(&mut src).unwrap() {
            Pdu::Raw(raw) => assert_eq!(raw.body, vec![9; 10]),
            other => panic!("unexpected {other:?}"),
        }
        assert!(src.is_empty());
    }

    #[test]
    fn test_zero_length_raw_takes_rest() {
        let header = PduHeader::new(PduType::Unknown(150));
        let mut buf = Vec::new();
        header.encode(&mut buf);
        buf.extend_from_slice(&[1, 2, 3]);
        let pdu = Pdu::from_bytes(&buf).unwrap();
        assert_eq!(pdu.body::<EntityStatePdu>(), None);
        assert_eq!(pdu.wire_size(), 15);
    }

    #[test]
    fn test_default_body_gets_its_type_on_encode() {
        let mut pdu = RemoveEntityPdu::default();
        pdu.originating_entity = EntityId::new(1, 2, 3);
        let bytes = pdu.to_bytes();
        assert_eq!(bytes[2], PduType::RemoveEntity.to_raw());
        assert_eq!(bytes[3], ProtocolFamily::SimulationManagement.to_raw());

        let decoded = Pdu::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.pdu_type(), PduType::RemoveEntity);
        assert_eq!(
            decoded.body::<RemoveEntityPdu>().map(|p| p.originating_entity),
            Some(EntityId::new(1, 2, 3))
        );
    }

    #[test]
    fn test_oversize_pdu_fails_validation() {
        let raw = RawPdu {
            header: PduHeader::new(PduType::Signal),
            body: vec![0; MAX_PDU_SIZE],
        };
        assert!(matches!(
            Pdu::Raw(raw).validate(),
            Err(DisError::FieldLength { field: "pdu length", .. })
        ));
    }

    #[test]
    fn test_every_builtin_type_decodes_to_its_variant() {
        for pdu_type in BUILTIN_PDU_TYPES {
            let mut pdu = RawPdu {
                header: PduHeader::new(*pdu_type),
                body: Vec::new(),
            };
            pdu.update_header();
            let mut bytes = pdu.to_bytes();
            // enough zeroed body for the largest fixed layout
            bytes.resize(PDU_HEADER_SIZE + 200, 0);
            let decoded = Pdu::from_bytes(&bytes).unwrap();
            assert_eq!(decoded.pdu_type(), *pdu_type);
            assert!(!matches!(decoded, Pdu::Raw(_)), "{pdu_type:?}");
        }
    }
}
