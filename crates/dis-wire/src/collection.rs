//! Count-prefixed lists of polymorphic records
//!
//! The count lives in a field of the owning PDU, so a collection never reads
//! or writes it itself. Records keep the order they were decoded or pushed
//! in, and encoding writes them back in that order.

use std::fmt;

use bytes::BufMut;

use dis_core::DisResult;

use crate::{DisReader, FamilyVariant, Record, RecordFamily, Registry, StreamDiscriminated};

/// Ordered records of one family
#[derive(Clone, PartialEq)]
pub struct Collection<F> {
    records: Vec<F>,
}

impl<F> Default for Collection<F> {
    fn default() -> Self {
        Collection {
            records: Vec::new(),
        }
    }
}

impl<F: fmt::Debug> fmt::Debug for Collection<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.records).finish()
    }
}

impl<F> Collection<F> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, F> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, F> {
        self.records.iter_mut()
    }

    pub fn push(&mut self, record: impl Into<F>) {
        self.records.push(record.into());
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn retain(&mut self, keep: impl FnMut(&F) -> bool) {
        self.records.retain(keep);
    }

    pub fn as_slice(&self) -> &[F] {
        &self.records
    }

    pub fn into_vec(self) -> Vec<F> {
        self.records
    }
}

impl<F: RecordFamily> Collection<F> {
    /// Records of one concrete variant
    pub fn of<V: FamilyVariant<F> + 'static>(&self) -> impl Iterator<Item = &V> + '_ {
        self.records.iter().filter_map(V::as_variant)
    }

    pub fn of_mut<V: FamilyVariant<F> + 'static>(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.records.iter_mut().filter_map(V::as_variant_mut)
    }

    /// Encoded size of all records
    pub fn wire_size(&self) -> usize {
        self.records.iter().map(Record::wire_size).sum()
    }

    pub fn encode(&self, dst: &mut impl BufMut) {
        for record in &self.records {
            record.encode(dst);
        }
    }

    /// Replace the contents with `count` records decoded by `registry`.
    ///
    /// On error the collection keeps whatever records decoded before the
    /// failing one.
    pub fn decode_with_registry(
        &mut self,
        src: &mut DisReader<'_>,
        count: usize,
        registry: &Registry<F>,
    ) -> DisResult<()>
    where
        F: StreamDiscriminated,
    {
        self.records.clear();
        // a corrupt count cannot force a large allocation
        self.records.reserve(count.min(src.remaining() / 4 + 1));
        for _ in 0..count {
            self.records.push(registry.decode(src)?);
        }
        Ok(())
    }
}

impl<F: StreamDiscriminated> Collection<F> {
    /// Replace the contents with `count` records decoded by the family registry
    pub fn decode(&mut self, src: &mut DisReader<'_>, count: usize) -> DisResult<()> {
        self.decode_with_registry(src, count, F::registry())
    }

    /// Decode a fresh collection of `count` records
    pub fn decoded(src: &mut DisReader<'_>, count: usize) -> DisResult<Self> {
        let mut collection = Self::new();
        collection.decode(src, count)?;
        Ok(collection)
    }
}

impl<F> From<Vec<F>> for Collection<F> {
    fn from(records: Vec<F>) -> Self {
        Collection { records }
    }
}

impl<F, R: Into<F>> FromIterator<R> for Collection<F> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Collection {
            records: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a, F> IntoIterator for &'a Collection<F> {
    type Item = &'a F;
    type IntoIter = std::slice::Iter<'a, F>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<F> IntoIterator for Collection<F> {
    type Item = F;
    type IntoIter = std::vec::IntoIter<F>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ArticulatedPart, AttachedPart, FixedDatum, ForceIdDatum, GenericFixedDatum,
        RawVariableParameter, VariableParameter,
    };
    use dis_core::{DisError, ForceId};

    fn mixed() -> Collection<VariableParameter> {
        let mut parts = Collection::new();
        parts.push(ArticulatedPart::new(0, 4096, 1, 0.5));
        parts.push(AttachedPart::default());
        parts.push(ArticulatedPart::new(0, 4128, 11, -0.5));
        parts.push(RawVariableParameter::new(42, &[7; 15]).unwrap());
        parts
    }

    #[test]
    fn test_preserves_wire_order() {
        let parts = mixed();
        assert_eq!(parts.wire_size(), 64);
        let mut buf = Vec::new();
        parts.encode(&mut buf);
        assert_eq!(buf.len(), 64);
        assert_eq!([buf[0], buf[16], buf[32], buf[48]], [0, 1, 0, 42]);

        let decoded = Collection::<VariableParameter>::decoded(&mut DisReader::new(&buf), 4).unwrap();
        assert_eq!(decoded, parts);

        let mut again = Vec::new();
        decoded.encode(&mut again);
        assert_eq!(again, buf);
    }

    #[test]
    fn test_variant_views() {
        let mut parts = mixed();
        let values: Vec<f32> = parts.of::<ArticulatedPart>().map(ArticulatedPart::value).collect();
        assert_eq!(values, vec![0.5, -0.5]);
        assert_eq!(parts.of::<AttachedPart>().count(), 1);
        assert_eq!(parts.of::<RawVariableParameter>().count(), 1);

        for part in parts.of_mut::<ArticulatedPart>() {
            part.set_value(part.value() * 2.0);
        }
        let values: Vec<f32> = parts.of::<ArticulatedPart>().map(|p| p.value()).collect();
        assert_eq!(values, vec![1.0, -1.0]);
    }

    #[test]
    fn test_decode_replaces_contents() {
        let mut datums: Collection<FixedDatum> = Collection::new();
        datums.push(GenericFixedDatum::from_u32(1, 1));

        let mut buf = Vec::new();
        ForceIdDatum::new(ForceId::Neutral).encode(&mut buf);
        datums.decode(&mut DisReader::new(&buf), 1).unwrap();

        assert_eq!(datums.len(), 1);
        assert_eq!(datums.of::<ForceIdDatum>().next().map(|d| d.force()), Some(ForceId::Neutral));

        datums.decode(&mut DisReader::new(&[]), 0).unwrap();
        assert!(datums.is_empty());
        assert_eq!(datums.wire_size(), 0);
    }

    #[test]
    fn test_count_beyond_buffer() {
        let mut buf = Vec::new();
        GenericFixedDatum::from_u32(5, 5).encode(&mut buf);
        let result = Collection::<FixedDatum>::decoded(&mut DisReader::new(&buf), 1_000_000);
        assert!(matches!(result, Err(DisError::BufferTooShort { .. })));
    }

    #[test]
    fn test_custom_registry() {
        fn as_raw(src: &mut DisReader<'_>) -> DisResult<VariableParameter> {
            Ok(VariableParameter::Other(RawVariableParameter::decode(src)?))
        }
        let registry = Registry::<VariableParameter>::builtin_builder()
            .claim("raw-articulated", 0, as_raw)
            .build()
            .unwrap();

        let mut buf = Vec::new();
        mixed().encode(&mut buf);
        let mut parts = Collection::new();
        parts
            .decode_with_registry(&mut DisReader::new(&buf), 4, &registry)
            .unwrap();
        assert_eq!(parts.of::<ArticulatedPart>().count(), 0);
        assert_eq!(parts.of::<RawVariableParameter>().count(), 3);
    }

    #[test]
    fn test_collect() {
        let datums: Collection<FixedDatum> = (0..3).map(|i| GenericFixedDatum::from_i32(i, -(i as i32))).collect();
        assert_eq!(datums.len(), 3);
        let ids: Vec<u32> = datums.iter().map(FixedDatum::datum_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
