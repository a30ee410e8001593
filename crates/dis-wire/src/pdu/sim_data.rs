//! Simulation management PDUs that carry datums

use bytes::BufMut;

use dis_core::{DisResult, EntityId, PduType};

use super::{PduBody, PduDecode};
use crate::{
    decode_datum_ids, encode_datum_ids, put_padding, Collection, DisReader, FixedDatum,
    PduHeader, Record, VariableDatum, PDU_HEADER_SIZE,
};

/// Fixed and variable datums with their two leading counts
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DatumSpecification {
    pub fixed: Collection<FixedDatum>,
    pub variable: Collection<VariableDatum>,
}

impl DatumSpecification {
    /// Size of the two count fields
    pub const COUNTS_SIZE: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fixed.is_empty() && self.variable.is_empty()
    }

    pub fn push_fixed(&mut self, datum: impl Into<FixedDatum>) {
        self.fixed.push(datum);
    }

    pub fn push_variable(&mut self, datum: impl Into<VariableDatum>) {
        self.variable.push(datum);
    }

    /// First fixed datum with `datum_id`
    pub fn fixed_datum(&self, datum_id: u32) -> Option<&FixedDatum> {
        self.fixed.iter().find(|d| d.datum_id() == datum_id)
    }

    /// First variable datum with `datum_id`
    pub fn variable_datum(&self, datum_id: u32) -> Option<&VariableDatum> {
        self.variable.iter().find(|d| d.datum_id() == datum_id)
    }
}

impl Record for DatumSpecification {
    fn wire_size(&self) -> usize {
        Self::COUNTS_SIZE + self.fixed.wire_size() + self.variable.wire_size()
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u32(self.fixed.len() as u32);
        dst.put_u32(self.variable.len() as u32);
        self.fixed.encode(dst);
        self.variable.encode(dst);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        let fixed_count = src.read_u32()? as usize;
        let variable_count = src.read_u32()? as usize;
        Ok(DatumSpecification {
            fixed: Collection::decoded(src, fixed_count)?,
            variable: Collection::decoded(src, variable_count)?,
        })
    }
}

/// Simulation management PDU laid out as endpoints, u32 fields, padding, datums
macro_rules! datum_pdu {
    (
        $(#[$meta:meta])*
        $name:ident, $pdu_type:ident,
        [$($(#[$fmeta:meta])* $field:ident),+],
        padding = $pad:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct $name {
            pub header: PduHeader,
            pub originating_entity: EntityId,
            pub receiving_entity: EntityId,
            $(
                $(#[$fmeta])*
                pub $field: u32,
            )+
            pub datums: DatumSpecification,
        }

        impl $name {
            /// Encoded size without datum records
            pub const FIXED_SIZE: usize = 40;
        }

        pdu_new!($name);

        impl PduBody for $name {
            header_accessors!();

            fn body_size(&self) -> usize {
                Self::FIXED_SIZE - PDU_HEADER_SIZE - DatumSpecification::COUNTS_SIZE
                    + self.datums.wire_size()
            }

            fn encode_body(&self, dst: &mut impl BufMut) {
                self.originating_entity.encode(dst);
                self.receiving_entity.encode(dst);
                $( dst.put_u32(self.$field); )+
                put_padding(dst, $pad);
                self.datums.encode(dst);
            }
        }

        impl PduDecode for $name {
            const PDU_TYPE: PduType = PduType::$pdu_type;

            fn decode_body(header: PduHeader, src: &mut DisReader<'_>) -> DisResult<Self> {
                let originating_entity = EntityId::decode(src)?;
                let receiving_entity = EntityId::decode(src)?;
                $( let $field = src.read_u32()?; )+
                src.skip($pad)?;
                Ok($name {
                    header,
                    originating_entity,
                    receiving_entity,
                    $( $field, )+
                    datums: DatumSpecification::decode(src)?,
                })
            }

            pdu_variant!($pdu_type);
        }
    };
}

datum_pdu!(
    /// Action request PDU (type 16)
    ActionRequestPdu, ActionRequest,
    [request_id, action_id],
    padding = 0
);

datum_pdu!(
    /// Action response PDU (type 17)
    ActionResponsePdu, ActionResponse,
    [request_id, request_status],
    padding = 0
);

datum_pdu!(
    /// Set data PDU (type 19)
    SetDataPdu, SetData,
    [request_id],
    padding = 4
);

datum_pdu!(
    /// Data PDU (type 20), the reply to a data query or set data
    DataPdu, Data,
    [request_id],
    padding = 4
);

datum_pdu!(
    /// Event report PDU (type 21)
    EventReportPdu, EventReport,
    [event_type],
    padding = 4
);

/// Data query PDU (type 18): asks for the datums with the listed ids
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataQueryPdu {
    pub header: PduHeader,
    pub originating_entity: EntityId,
    pub receiving_entity: EntityId,
    pub request_id: u32,
    /// Milliseconds between replies; zero asks for a single reply
    pub time_interval: u32,
    pub fixed_datum_ids: Vec<u32>,
    pub variable_datum_ids: Vec<u32>,
}

impl DataQueryPdu {
    /// Encoded size without datum ids
    pub const FIXED_SIZE: usize = 40;
}

pdu_new!(DataQueryPdu);

impl PduBody for DataQueryPdu {
    header_accessors!();

    fn body_size(&self) -> usize {
        Self::FIXED_SIZE - PDU_HEADER_SIZE
            + 4 * (self.fixed_datum_ids.len() + self.variable_datum_ids.len())
    }

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.originating_entity.encode(dst);
        self.receiving_entity.encode(dst);
        dst.put_u32(self.request_id);
        dst.put_u32(self.time_interval);
        dst.put_u32(self.fixed_datum_ids.len() as u32);
        dst.put_u32(self.variable_datum_ids.len() as u32);
        encode_datum_ids(&self.fixed_datum_ids, dst);
        encode_datum_ids(&self.variable_datum_ids, dst);
    }
}

impl PduDecode for DataQueryPdu {
    const PDU_TYPE: PduType = PduType::DataQuery;

    fn decode_body(header: PduHeader, src: &mut DisReader<'_>) -> DisResult<Self> {
        let originating_entity = EntityId::decode(src)?;
        let receiving_entity = EntityId::decode(src)?;
        let request_id = src.read_u32()?;
        let time_interval = src.read_u32()?;
        let fixed_count = src.read_u32()? as usize;
        let variable_count = src.read_u32()? as usize;
        Ok(DataQueryPdu {
            header,
            originating_entity,
            receiving_entity,
            request_id,
            time_interval,
            fixed_datum_ids: decode_datum_ids(src, fixed_count)?,
            variable_datum_ids: decode_datum_ids(src, variable_count)?,
        })
    }

    pdu_variant!(DataQuery);
}

/// Comment PDU (type 22): free-form datums, normally variable text
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommentPdu {
    pub header: PduHeader,
    pub originating_entity: EntityId,
    pub receiving_entity: EntityId,
    pub datums: DatumSpecification,
}

impl CommentPdu {
    /// Encoded size without datum records
    pub const FIXED_SIZE: usize = 32;
}

pdu_new!(CommentPdu);

impl PduBody for CommentPdu {
    header_accessors!();

    fn body_size(&self) -> usize {
        Self::FIXED_SIZE - PDU_HEADER_SIZE - DatumSpecification::COUNTS_SIZE
            + self.datums.wire_size()
    }

    fn encode_body(&self, dst: &mut impl BufMut) {
        self.originating_entity.encode(dst);
        self.receiving_entity.encode(dst);
        self.datums.encode(dst);
    }
}

impl PduDecode for CommentPdu {
    const PDU_TYPE: PduType = PduType::Comment;

    fn decode_body(header: PduHeader, src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(CommentPdu {
            header,
            originating_entity: EntityId::decode(src)?,
            receiving_entity: EntityId::decode(src)?,
            datums: DatumSpecification::decode(src)?,
        })
    }

    pdu_variant!(Comment);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        datum_id, DescriptionDatum, EntityType, EntityTypeDatum, FamilyVariant, ForceIdDatum,
        GenericFixedDatum, GenericVariableDatum, Pdu,
    };
    use dis_core::{EntityKind, ForceId};

    fn datums() -> DatumSpecification {
        let mut datums = DatumSpecification::new();
        datums.push_fixed(ForceIdDatum::new(ForceId::Friendly));
        datums.push_fixed(GenericFixedDatum::from_f32(400, 12.5));
        datums.push_variable(EntityTypeDatum {
            entity_type: EntityType::new(EntityKind::Platform, 1, 225, 1, 1, 0, 0),
        });
        datums.push_variable(GenericVariableDatum::from_slice(500, &[1, 2, 3]));
        datums
    }

    #[test]
    fn test_datum_specification_size() {
        let datums = datums();
        // counts 8, two fixed 16, entity type 16, three bytes padded to 8 plus 8
        assert_eq!(datums.wire_size(), 8 + 16 + 16 + 16);
        let bytes = datums.to_bytes();
        assert_eq!(&bytes[0..8], &[0, 0, 0, 2, 0, 0, 0, 2]);
        assert_eq!(DatumSpecification::from_bytes(&bytes).unwrap(), datums);
    }

    #[test]
    fn test_action_request_roundtrip() {
        let mut pdu = ActionRequestPdu::new();
        pdu.originating_entity = EntityId::new(1, 3, 0);
        pdu.receiving_entity = EntityId::new(1, 4, 0);
        pdu.request_id = 9;
        pdu.action_id = 13;
        pdu.datums = datums();
        pdu.update_header();
        assert_eq!(pdu.header.length as usize, ActionRequestPdu::FIXED_SIZE + 48);

        let bytes = pdu.to_bytes();
        assert_eq!(&bytes[24..32], &[0, 0, 0, 9, 0, 0, 0, 13]);
        let decoded = Pdu::from_bytes(&bytes).unwrap();
        let body = decoded.body::<ActionRequestPdu>().unwrap();
        assert_eq!(body, &pdu);
        let force = body.datums.fixed_datum(datum_id::FORCE_ID).unwrap();
        assert_eq!(
            ForceIdDatum::as_variant(force).map(|d| d.force()),
            Some(ForceId::Friendly)
        );
        assert!(body.datums.variable_datum(datum_id::ENTITY_TYPE).is_some());
    }

    #[test]
    fn test_empty_datum_pdus() {
        let response = ActionResponsePdu::new();
        assert_eq!(response.wire_size(), 40);
        let set_data = SetDataPdu::new();
        let bytes = set_data.to_bytes();
        assert_eq!(bytes.len(), 40);
        assert_eq!(&bytes[28..40], &[0; 12]);
        assert_eq!(DataPdu::new().to_bytes()[2], 20);
        assert!(SetDataPdu::from_bytes(&bytes).unwrap().datums.is_empty());
    }

    #[test]
    fn test_event_report_roundtrip() {
        let mut pdu = EventReportPdu::new();
        pdu.event_type = 2;
        pdu.datums.push_variable(DescriptionDatum::new("engine failure").unwrap());
        pdu.update_header();

        let bytes = pdu.to_bytes();
        assert_eq!(&bytes[24..28], &2u32.to_be_bytes());
        let decoded = EventReportPdu::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, pdu);
        match decoded.datums.variable_datum(datum_id::DESCRIPTION) {
            Some(crate::VariableDatum::Description(d)) => assert_eq!(d.text(), "engine failure"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_data_query_roundtrip() {
        let mut pdu = DataQueryPdu::new();
        pdu.request_id = 1;
        pdu.time_interval = 1000;
        pdu.fixed_datum_ids = vec![datum_id::FORCE_ID];
        pdu.variable_datum_ids = vec![datum_id::ENTITY_TYPE, datum_id::DESCRIPTION];
        pdu.update_header();
        assert_eq!(pdu.header.length, 52);

        let bytes = pdu.to_bytes();
        assert_eq!(&bytes[32..40], &[0, 0, 0, 1, 0, 0, 0, 2]);
        assert_eq!(DataQueryPdu::from_bytes(&bytes).unwrap(), pdu);
    }

    #[test]
    fn test_comment_roundtrip() {
        let mut pdu = CommentPdu::new();
        pdu.datums.push_variable(DescriptionDatum::new("hello").unwrap());
        pdu.update_header();
        assert_eq!(pdu.header.length, 32 + 16);

        let bytes = pdu.to_bytes();
        assert_eq!(bytes.len(), 48);
        assert_eq!(Pdu::from_bytes(&bytes).unwrap(), Pdu::Comment(pdu));
    }

    #[test]
    fn test_truncated_datums() {
        let mut pdu = CommentPdu::new();
        pdu.datums.push_variable(DescriptionDatum::new("a longer comment").unwrap());
        let bytes = pdu.to_bytes();
        assert!(CommentPdu::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }
}
