//! PDU header for the DIS wire protocol
//!
//! The header is 12 bytes:
//! - Byte 0: Protocol version
//! - Byte 1: Exercise ID
//! - Byte 2: PDU type
//! - Byte 3: Protocol family
//! - Bytes 4-7: Timestamp (BE)
//! - Bytes 8-9: Length of the whole PDU in bytes (BE)
//! - Byte 10: PDU status (padding before IEEE 1278.1-2012)
//! - Byte 11: Padding

use bytes::BufMut;

use dis_core::{DisResult, PduType, ProtocolFamily, ProtocolVersion, Timestamp};

use crate::{DisReader, Record};

/// Header size in bytes
pub const PDU_HEADER_SIZE: usize = 12;

/// Default exercise identifier
pub const DEFAULT_EXERCISE_ID: u8 = 1;

/// PDU status byte
///
/// Bit 0 transferred entity indicator, bits 1-2 LVC indicator, bit 3 coupled
/// extension indicator, bits 4-5 PDU-type specific indicator (fire and
/// detonation use it to select the descriptor record).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PduStatus(pub u8);

impl PduStatus {
    pub const TEI: u8 = 0b0000_0001;
    pub const LVC_MASK: u8 = 0b0000_0110;
    pub const CEI: u8 = 0b0000_1000;
    pub const TYPE_INDICATOR_MASK: u8 = 0b0011_0000;

    #[inline]
    pub fn new(bits: u8) -> Self {
        PduStatus(bits)
    }

    /// Entity ownership has been transferred
    #[inline]
    pub fn is_transferred(self) -> bool {
        self.0 & Self::TEI != 0
    }

    #[inline]
    pub fn set_transferred(&mut self, value: bool) {
        if value {
            self.0 |= Self::TEI;
        } else {
            self.0 &= !Self::TEI;
        }
    }

    /// Live/virtual/constructive indicator (0 none, 1 live, 2 virtual, 3 constructive)
    #[inline]
    pub fn lvc(self) -> u8 {
        (self.0 & Self::LVC_MASK) >> 1
    }

    #[inline]
    pub fn set_lvc(&mut self, lvc: u8) {
        self.0 = (self.0 & !Self::LVC_MASK) | ((lvc << 1) & Self::LVC_MASK);
    }

    /// PDU is coupled with an extension PDU
    #[inline]
    pub fn is_coupled(self) -> bool {
        self.0 & Self::CEI != 0
    }

    #[inline]
    pub fn set_coupled(&mut self, value: bool) {
        if value {
            self.0 |= Self::CEI;
        } else {
            self.0 &= !Self::CEI;
        }
    }

    /// Two-bit type-specific indicator (fire/detonation descriptor type)
    #[inline]
    pub fn type_indicator(self) -> u8 {
        (self.0 & Self::TYPE_INDICATOR_MASK) >> 4
    }

    #[inline]
    pub fn set_type_indicator(&mut self, value: u8) {
        self.0 = (self.0 & !Self::TYPE_INDICATOR_MASK) | ((value << 4) & Self::TYPE_INDICATOR_MASK);
    }
}

/// PDU header structure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PduHeader {
    pub protocol_version: ProtocolVersion,
    pub exercise_id: u8,
    pub pdu_type: PduType,
    pub protocol_family: ProtocolFamily,
    pub timestamp: Timestamp,
    /// Declared length of the whole PDU, header included
    pub length: u16,
    pub status: PduStatus,
    pub padding: u8,
}

impl PduHeader {
    pub const WIRE_SIZE: usize = PDU_HEADER_SIZE;

    /// Header for the given PDU type, with its protocol family filled in
    pub fn new(pdu_type: PduType) -> Self {
        PduHeader {
            protocol_version: ProtocolVersion::default(),
            exercise_id: DEFAULT_EXERCISE_ID,
            pdu_type,
            protocol_family: pdu_type.family(),
            timestamp: Timestamp::ZERO,
            length: 0,
            status: PduStatus::default(),
            padding: 0,
        }
    }

    pub fn with_exercise(mut self, exercise_id: u8) -> Self {
        self.exercise_id = exercise_id;
        self
    }

    pub fn with_version(mut self, version: ProtocolVersion) -> Self {
        self.protocol_version = version;
        self
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Serialize with an explicit length instead of the stored one
    pub fn encode_with_length(&self, length: u16, dst: &mut impl BufMut) {
        dst.put_u8(self.protocol_version.to_raw());
        dst.put_u8(self.exercise_id);
        dst.put_u8(self.pdu_type.to_raw());
        dst.put_u8(self.protocol_family.to_raw());
        dst.put_u32(self.timestamp.to_raw());
        dst.put_u16(length);
        dst.put_u8(self.status.0);
        dst.put_u8(self.padding);
    }
}

impl Default for PduHeader {
    fn default() -> Self {
        PduHeader::new(PduType::Other)
    }
}

impl Record for PduHeader {
    fn wire_size(&self) -> usize {
        PDU_HEADER_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        self.encode_with_length(self.length, dst);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let bytes = src.read_array::<PDU_HEADER_SIZE>()?;
        let mut fields = DisReader::new(&bytes);
        Ok(PduHeader {
            protocol_version: ProtocolVersion::from_raw(fields.read_u8()?),
            exercise_id: fields.read_u8()?,
            pdu_type: PduType::from_raw(fields.read_u8()?),
            protocol_family: ProtocolFamily::from_raw(fields.read_u8()?),
            timestamp: Timestamp::from_raw(fields.read_u32()?),
            length: fields.read_u16()?,
            status: PduStatus(fields.read_u8()?),
            padding: fields.read_u8()?,
        })
    }
}
