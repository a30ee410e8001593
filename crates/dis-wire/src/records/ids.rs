//! Wire encodings for the identifier and clock types defined in `dis-core`

use bytes::BufMut;

use dis_core::{ClockTime, DisResult, EntityId, EventId, SimulationAddress, Timestamp};

use crate::{DisReader, Record};

impl Record for SimulationAddress {
    fn wire_size(&self) -> usize {
        SimulationAddress::WIRE_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u16(self.site);
        dst.put_u16(self.application);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(SimulationAddress {
            site: src.read_u16()?,
            application: src.read_u16()?,
        })
    }
}

impl Record for EntityId {
    fn wire_size(&self) -> usize {
        EntityId::WIRE_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_slice(&EntityId::to_bytes(*self));
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(EntityId::from_bytes(src.read_array()?))
    }
}

impl Record for EventId {
    fn wire_size(&self) -> usize {
        EventId::WIRE_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u16(self.site);
        dst.put_u16(self.application);
        dst.put_u16(self.event_number);
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(EventId {
            site: src.read_u16()?,
            application: src.read_u16()?,
            event_number: src.read_u16()?,
        })
    }
}

impl Record for ClockTime {
    fn wire_size(&self) -> usize {
        ClockTime::WIRE_SIZE
    }

    fn encode(&self, dst: &mut impl BufMut) {
        dst.put_i32(self.hour);
        dst.put_u32(self.time_past_hour.to_raw());
    }

    fn decode(src: &mut DisReader<'_>) -> DisResult<Self> {
        Ok(ClockTime {
            hour: src.read_i32()?,
            time_past_hour: Timestamp::from_raw(src.read_u32()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_bytes() {
        let id = EntityId::new(1, 2, 3);
        assert_eq!(id.to_bytes().to_vec(), Record::to_bytes(&id));
        assert_eq!(<EntityId as Record>::from_bytes(&[0, 1, 0, 2, 0, 3]).unwrap(), id);
    }

    #[test]
    fn test_entity_id_record_encode() {
        let mut buf = Vec::new();
        Record::encode(&EntityId::new(1, 2, 3), &mut buf);
        assert_eq!(buf, vec![0, 1, 0, 2, 0, 3]);

        let mut buf = vec![0xAA];
        EntityId::new(0x0102, 0, 0xFFFF).encode(&mut buf);
        assert_eq!(buf, vec![0xAA, 0x01, 0x02, 0, 0, 0xFF, 0xFF]);
    }

    #[test]
    fn test_clock_time_roundtrip() {
        let ct = ClockTime::new(-5, Timestamp::from_raw(u32::MAX));
        let bytes = ct.to_bytes();
        assert_eq!(bytes.len(), ClockTime::WIRE_SIZE);
        assert_eq!(&bytes[0..4], &[0xFF, 0xFF, 0xFF, 0xFB]);
        assert_eq!(ClockTime::from_bytes(&bytes).unwrap(), ct);
    }

    #[test]
    fn test_event_id_truncated() {
        assert!(EventId::from_bytes(&[0, 1, 0, 2]).is_err());
    }
}
