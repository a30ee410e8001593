//! PDU dispatch factory
//!
//! A datagram may hold several PDUs back to back. `PduFactory::dispatch`
//! walks them in wire order: decode the header, run the acceptance filters,
//! decode the body with the decoder registered for the PDU type, then hand
//! the PDU to the type callbacks followed by the catch-all callbacks.
//!
//! The declared header length is the unit of advance. A body that fails to
//! decode, a rejected PDU and a PDU of unregistered type are all skipped by
//! their declared length, so one bad PDU never desynchronizes the rest of
//! the datagram. A declared length of zero falls back to the decode cursor.

use std::collections::HashMap;
use std::fmt;

use dis_core::{DisError, DisResult, PduType, ProtocolFamily, ProtocolVersion};

use crate::{DisReader, Pdu, PduHeader, RawPdu, Record, BUILTIN_PDU_TYPES, PDU_HEADER_SIZE};

/// Body decoder: given the decoded header and a reader over the body bytes
pub type PduDecoder = Box<dyn Fn(PduHeader, &mut DisReader<'_>) -> DisResult<Pdu> + Send + Sync>;

/// Consumer callback
pub type PduCallback = Box<dyn FnMut(&Pdu) + Send>;

/// Acceptance filter; returning false drops the PDU before its body is decoded
pub type PduFilter = Box<dyn Fn(&PduHeader) -> bool + Send + Sync>;

/// Cumulative dispatch counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub datagrams: u64,
    pub pdus_seen: u64,
    pub dispatched: u64,
    pub rejected: u64,
    pub unknown: u64,
    pub decode_failures: u64,
    /// Datagrams whose tail was too short for a header
    pub truncated_headers: u64,
}

/// Outcome of dispatching one datagram
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub pdus_seen: usize,
    pub dispatched: usize,
    pub rejected: usize,
    pub unknown: usize,
    pub failed: usize,
    /// Bytes walked over, capped at the datagram length
    pub bytes_consumed: usize,
    /// Trailing bytes that could not hold a header
    pub bytes_left: usize,
}

/// What happened to one PDU of a datagram
enum Segment {
    Decoded(Pdu),
    Rejected(PduHeader),
    Unknown(PduHeader),
    Failed(PduHeader, DisError),
}

/// Segments a datagram and routes decoded PDUs to callbacks
pub struct PduFactory {
    decoders: HashMap<PduType, PduDecoder>,
    filters: Vec<PduFilter>,
    callbacks: HashMap<PduType, Vec<PduCallback>>,
    catch_all: Vec<PduCallback>,
    stats: DispatchStats,
}

impl PduFactory {
    /// Factory with decoders for every built-in PDU body
    pub fn new() -> Self {
        let mut factory = Self::empty();
        for pdu_type in BUILTIN_PDU_TYPES {
            factory
                .decoders
                .insert(*pdu_type, Box::new(Pdu::decode_body));
        }
        factory
    }

    /// Factory with no decoders at all
    pub fn empty() -> Self {
        PduFactory {
            decoders: HashMap::new(),
            filters: Vec::new(),
            callbacks: HashMap::new(),
            catch_all: Vec::new(),
            stats: DispatchStats::default(),
        }
    }

    /// Install the body decoder for `pdu_type`, replacing any existing one
    pub fn set_decoder<D>(&mut self, pdu_type: PduType, decoder: D)
    where
        D: Fn(PduHeader, &mut DisReader<'_>) -> DisResult<Pdu> + Send + Sync + 'static,
    {
        if self.decoders.insert(pdu_type, Box::new(decoder)).is_some() {
            tracing::warn!(?pdu_type, "replacing pdu decoder");
        }
    }

    /// Decode `pdu_type` as `RawPdu` so it reaches the callbacks
    pub fn pass_through(&mut self, pdu_type: PduType) {
        self.set_decoder(pdu_type, |header, src| {
            RawPdu::decode_body(header, src).map(Pdu::Raw)
        });
    }

    pub fn remove_decoder(&mut self, pdu_type: PduType) -> bool {
        self.decoders.remove(&pdu_type).is_some()
    }

    pub fn has_decoder(&self, pdu_type: PduType) -> bool {
        self.decoders.contains_key(&pdu_type)
    }

    /// Call `callback` for every dispatched PDU of `pdu_type`
    pub fn on<C>(&mut self, pdu_type: PduType, callback: C)
    where
        C: FnMut(&Pdu) + Send + 'static,
    {
        self.callbacks
            .entry(pdu_type)
            .or_default()
            .push(Box::new(callback));
    }

    /// Call `callback` for every dispatched PDU, after the type callbacks
    pub fn on_any<C>(&mut self, callback: C)
    where
        C: FnMut(&Pdu) + Send + 'static,
    {
        self.catch_all.push(Box::new(callback));
    }

    /// Drop all callbacks, keeping decoders and filters
    pub fn clear_callbacks(&mut self) {
        self.callbacks.clear();
        self.catch_all.clear();
    }

    pub fn add_filter<F>(&mut self, filter: F)
    where
        F: Fn(&PduHeader) -> bool + Send + Sync + 'static,
    {
        self.filters.push(Box::new(filter));
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    #[inline]
    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = DispatchStats::default();
    }

    /// Decode every PDU in `datagram` and invoke the callbacks, in wire order
    pub fn dispatch(&mut self, datagram: &[u8]) -> DispatchReport {
        let PduFactory {
            decoders,
            filters,
            callbacks,
            catch_all,
            stats,
        } = self;

        let mut report = DispatchReport::default();
        stats.datagrams += 1;

        let (consumed, left) = walk(decoders, filters, datagram, |offset, segment| {
            report.pdus_seen += 1;
            stats.pdus_seen += 1;
            match segment {
                Segment::Decoded(pdu) => {
                    tracing::trace!(offset, pdu_type = ?pdu.pdu_type(), "dispatching pdu");
                    if let Some(handlers) = callbacks.get_mut(&pdu.pdu_type()) {
                        for handler in handlers.iter_mut() {
                            handler(&pdu);
                        }
                    }
                    for handler in catch_all.iter_mut() {
                        handler(&pdu);
                    }
                    report.dispatched += 1;
                    stats.dispatched += 1;
                }
                Segment::Rejected(header) => {
                    tracing::trace!(offset, pdu_type = ?header.pdu_type, "pdu rejected by filter");
                    report.rejected += 1;
                    stats.rejected += 1;
                }
                Segment::Unknown(header) => {
                    tracing::debug!(
                        offset,
                        pdu_type = header.pdu_type.to_raw(),
                        length = header.length,
                        "no decoder for pdu type, skipping"
                    );
                    report.unknown += 1;
                    stats.unknown += 1;
                }
                Segment::Failed(header, error) => {
                    tracing::warn!(
                        offset,
                        pdu_type = ?header.pdu_type,
                        length = header.length,
                        %error,
                        "pdu body decode failed, skipping"
                    );
                    report.failed += 1;
                    stats.decode_failures += 1;
                }
            }
        });

        report.bytes_consumed = consumed;
        report.bytes_left = left;
        if left > 0 {
            stats.truncated_headers += 1;
            tracing::warn!(
                offset = consumed,
                remaining = left,
                "datagram tail too short for a pdu header"
            );
        }
        report
    }

    /// Decode every PDU in `datagram` that passes the filters, without callbacks
    pub fn decode_all(&self, datagram: &[u8]) -> Vec<Pdu> {
        let mut pdus = Vec::new();
        walk(&self.decoders, &self.filters, datagram, |_, segment| {
            if let Segment::Decoded(pdu) = segment {
                pdus.push(pdu);
            }
        });
        pdus
    }
}

impl Default for PduFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PduFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut decoders: Vec<u8> = self.decoders.keys().map(|t| t.to_raw()).collect();
        decoders.sort_unstable();
        f.debug_struct("PduFactory")
            .field("decoders", &decoders)
            .field("filters", &self.filters.len())
            .field("callbacks", &self.callbacks.values().map(Vec::len).sum::<usize>())
            .field("catch_all", &self.catch_all.len())
            .field("stats", &self.stats)
            .finish()
    }
}

/// Walk the PDUs of one datagram, returning (bytes consumed, bytes left over)
fn walk(
    decoders: &HashMap<PduType, PduDecoder>,
    filters: &[PduFilter],
    datagram: &[u8],
    mut visit: impl FnMut(usize, Segment),
) -> (usize, usize) {
    let mut offset = 0;
    while offset < datagram.len() {
        let start = offset;
        let header = match PduHeader::decode(&mut DisReader::new(&datagram[start..])) {
            Ok(header) => header,
            Err(_) => return (start, datagram.len() - start),
        };

        let declared = header.length as usize;
        let body_start = start + PDU_HEADER_SIZE;
        let body_end = if declared >= PDU_HEADER_SIZE {
            (start + declared).min(datagram.len())
        } else {
            datagram.len()
        };
        let mut body = DisReader::new(&datagram[body_start..body_end]);

        let segment = if !filters.iter().all(|accept| accept(&header)) {
            Segment::Rejected(header)
        } else {
            match decoders.get(&header.pdu_type) {
                Some(decoder) => match decoder(header, &mut body) {
                    Ok(pdu) => Segment::Decoded(pdu),
                    Err(error) => Segment::Failed(header, error),
                },
                None => Segment::Unknown(header),
            }
        };
        visit(start, segment);

        offset = if declared == 0 {
            body_start + body.position()
        } else {
            start + declared
        };
    }
    (datagram.len(), 0)
}

/// Stock acceptance filters
pub mod filters {
    use super::*;

    /// Accept only PDUs of one exercise
    pub fn exercise(exercise_id: u8) -> impl Fn(&PduHeader) -> bool + Send + Sync + 'static {
        move |header| header.exercise_id == exercise_id
    }

    /// Accept only PDUs with one of the listed protocol versions
    pub fn protocol_versions(
        versions: Vec<ProtocolVersion>,
    ) -> impl Fn(&PduHeader) -> bool + Send + Sync + 'static {
        move |header| versions.contains(&header.protocol_version)
    }

    /// Accept only PDUs of one of the listed protocol families
    pub fn protocol_families(
        families: Vec<ProtocolFamily>,
    ) -> impl Fn(&PduHeader) -> bool + Send + Sync + 'static {
        move |header| families.contains(&header.protocol_family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        EntityMarking, EntityStatePdu, EntityType, FirePdu, PduBody, RemoveEntityPdu,
        Vector3Double,
    };
    use dis_core::{EntityId, EntityKind, ForceId};
    use std::sync::{Arc, Mutex};

    fn entity_state() -> EntityStatePdu {
        let mut pdu = EntityStatePdu::new();
        pdu.entity_id = EntityId::new(1, 1, 1);
        pdu.force_id = ForceId::Friendly;
        pdu.entity_type = EntityType::new(EntityKind::Platform, 2, 225, 1, 1, 0, 0);
        pdu.location = Vector3Double::new(4_500_000.0, 4_500_000.0, 0.0);
        pdu.marking = EntityMarking::new("TestUnit1").unwrap();
        pdu
    }

    fn fire() -> FirePdu {
        let mut pdu = FirePdu::new();
        pdu.firing_entity = EntityId::new(1, 1, 1);
        pdu.range = 100.0;
        pdu
    }

    type Log = Arc<Mutex<Vec<String>>>;

    fn recording_factory() -> (PduFactory, Log) {
        let log: Log = Arc::default();
        let mut factory = PduFactory::new();
        let l = log.clone();
        factory.on(PduType::EntityState, move |_| l.lock().unwrap().push("entity-state".into()));
        let l = log.clone();
        factory.on(PduType::Fire, move |_| l.lock().unwrap().push("fire".into()));
        let l = log.clone();
        factory.on_any(move |pdu| l.lock().unwrap().push(format!("any:{}", pdu.pdu_type().to_raw())));
        (factory, log)
    }

    #[test]
    fn test_bundle_callback_order() {
        let (mut factory, log) = recording_factory();
        let mut datagram = entity_state().to_bytes();
        datagram.extend(fire().to_bytes());

        let report = factory.dispatch(&datagram);
        assert_eq!(report.dispatched, 2);
        assert_eq!(report.bytes_consumed, 144 + 96);
        assert_eq!(report.bytes_left, 0);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["entity-state", "any:1", "fire", "any:2"]
        );
    }

    #[test]
    fn test_zero_length_terminates() {
        let (mut factory, log) = recording_factory();
        let mut datagram = Vec::new();
        let mut header = PduHeader::new(PduType::Other);
        header.length = 0;
        header.encode(&mut datagram);
        datagram.extend_from_slice(&[0u8; 30]);

        let report = factory.dispatch(&datagram);
        assert_eq!(report.unknown, 3);
        assert_eq!(report.bytes_consumed, 36);
        assert_eq!(report.bytes_left, 6);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_zero_length_advances_by_decoded_body() {
        let (mut factory, log) = recording_factory();
        // a zero declared length is taken from the decode cursor
        let mut first = entity_state().to_bytes();
        first[8] = 0;
        first[9] = 0;
        let mut datagram = first;
        datagram.extend(fire().to_bytes());

        let report = factory.dispatch(&datagram);
        assert_eq!(report.dispatched, 2);
        assert_eq!(log.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_filter_rejects_but_advances() {
        let (mut factory, log) = recording_factory();
        factory.add_filter(filters::exercise(7));
        let mut other = fire();
        other.header.exercise_id = 7;

        let mut datagram = entity_state().to_bytes();
        datagram.extend(other.to_bytes());
        let report = factory.dispatch(&datagram);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.dispatched, 1);
        assert_eq!(*log.lock().unwrap(), vec!["fire", "any:2"]);
    }

    #[test]
    fn test_unknown_type_skipped_by_length() {
        let (mut factory, log) = recording_factory();
        let raw = RawPdu {
            header: PduHeader::new(PduType::Signal),
            body: vec![1; 20],
        };
        let mut datagram = raw.to_bytes();
        datagram.extend(fire().to_bytes());

        let report = factory.dispatch(&datagram);
        assert_eq!(report.unknown, 1);
        assert_eq!(report.dispatched, 1);
        assert_eq!(*log.lock().unwrap(), vec!["fire", "any:2"]);
        assert_eq!(factory.stats().unknown, 1);
    }

    #[test]
    fn test_pass_through_delivers_raw() {
        let (mut factory, log) = recording_factory();
        factory.pass_through(PduType::Signal);
        let raw = RawPdu {
            header: PduHeader::new(PduType::Signal),
            body: vec![1; 20],
        };
        let report = factory.dispatch(&raw.to_bytes());
        assert_eq!(report.dispatched, 1);
        assert_eq!(*log.lock().unwrap(), vec!["any:26"]);
    }

    #[test]
    fn test_failed_body_does_not_desync() {
        let (mut factory, log) = recording_factory();
        // header claims 20 bytes of remove entity, which needs 28
        let mut short = RemoveEntityPdu::new().to_bytes();
        short.truncate(20);
        short[8..10].copy_from_slice(&20u16.to_be_bytes());
        let mut datagram = short;
        datagram.extend(fire().to_bytes());

        let report = factory.dispatch(&datagram);
        assert_eq!(report.failed, 1);
        assert_eq!(report.dispatched, 1);
        assert_eq!(*log.lock().unwrap(), vec!["fire", "any:2"]);
        assert_eq!(factory.stats().decode_failures, 1);
    }

    #[test]
    fn test_truncated_trailing_header() {
        let (mut factory, _) = recording_factory();
        let mut datagram = fire().to_bytes();
        datagram.extend_from_slice(&[7, 1, 2]);
        let report = factory.dispatch(&datagram);
        assert_eq!(report.dispatched, 1);
        assert_eq!(report.bytes_consumed, 96);
        assert_eq!(report.bytes_left, 3);
        assert_eq!(factory.stats().truncated_headers, 1);
    }

    #[test]
    fn test_declared_length_past_end() {
        let (mut factory, _) = recording_factory();
        let mut datagram = fire().to_bytes();
        datagram[8..10].copy_from_slice(&500u16.to_be_bytes());
        let report = factory.dispatch(&datagram);
        assert_eq!(report.dispatched, 1);
        assert_eq!(report.bytes_consumed, 96);
    }

    #[test]
    fn test_replaced_decoder() {
        let (mut factory, log) = recording_factory();
        factory.set_decoder(PduType::Fire, |header, src| {
            let mut raw = RawPdu::decode_body(header, src)?;
            raw.body.truncate(4);
            Ok(Pdu::Raw(raw))
        });
        factory.dispatch(&fire().to_bytes());
        // raw pdus keep their header type, so the fire callback still runs
        assert_eq!(*log.lock().unwrap(), vec!["fire", "any:2"]);

        assert!(factory.remove_decoder(PduType::Fire));
        assert!(!factory.has_decoder(PduType::Fire));
        factory.dispatch(&fire().to_bytes());
        assert_eq!(factory.stats().unknown, 1);
    }

    #[test]
    fn test_version_and_family_filters() {
        let mut factory = PduFactory::new();
        factory.add_filter(filters::protocol_versions(vec![ProtocolVersion::Ieee1278_1_2012]));
        factory.add_filter(filters::protocol_families(vec![ProtocolFamily::Warfare]));

        let mut legacy = fire();
        legacy.header.protocol_version = ProtocolVersion::Ieee1278_1a_1998;
        let mut datagram = entity_state().to_bytes();
        datagram.extend(legacy.to_bytes());
        datagram.extend(fire().to_bytes());

        let pdus = factory.decode_all(&datagram);
        assert_eq!(pdus.len(), 1);
        assert_eq!(pdus[0].pdu_type(), PduType::Fire);
        assert_eq!(pdus[0].header().protocol_version, ProtocolVersion::Ieee1278_1_2012);
    }

    #[test]
    fn test_empty_factory_decodes_nothing() {
        let mut factory = PduFactory::empty();
        let report = factory.dispatch(&entity_state().to_bytes());
        assert_eq!(report.unknown, 1);
        assert!(factory.decode_all(&entity_state().to_bytes()).is_empty());
        assert!(format!("{factory:?}").contains("PduFactory"));
    }

    #[test]
    fn test_stats_accumulate() {
        let (mut factory, _) = recording_factory();
        for _ in 0..3 {
            factory.dispatch(&fire().to_bytes());
        }
        assert_eq!(factory.stats().datagrams, 3);
        assert_eq!(factory.stats().dispatched, 3);
        factory.reset_stats();
        assert_eq!(factory.stats(), &DispatchStats::default());
    }
}
