//! End-to-end checks
//!
//! Encode, bundle and dispatch the sample PDUs the way two simulators
//! exchanging traffic would:
//! - Reference entity state round trip
//! - Callback order across a bundled datagram
//! - Zero declared length
//! - Bundling under a datagram size limit
//! - Corrupted input

use std::sync::{Arc, Mutex};

use dis_core::{DisResult, PduType};
use dis_transport::Bundler;
use dis_wire::{EntityStatePdu, Pdu, PduBody, PduDecode, PduFactory, PDU_HEADER_SIZE};

use crate::chaos::{Corruption, DatagramChaos};
use crate::fixtures::*;

// ============================================================================
// RESULTS
// ============================================================================

/// Outcome of one scenario
#[derive(Clone, Debug, Default)]
pub struct ScenarioResult {
    pub name: &'static str,
    pub failures: Vec<String>,
}

impl ScenarioResult {
    fn new(name: &'static str) -> Self {
        ScenarioResult {
            name,
            failures: Vec::new(),
        }
    }

    fn check(&mut self, ok: bool, what: impl Into<String>) {
        if !ok {
            self.failures.push(what.into());
        }
    }

    fn fail(name: &'static str, error: impl std::fmt::Display) -> Self {
        ScenarioResult {
            name,
            failures: vec![error.to_string()],
        }
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Records callback invocations as labels
fn recording_factory() -> (PduFactory, Arc<Mutex<Vec<String>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut factory = PduFactory::new();
    for pdu_type in [PduType::EntityState, PduType::Fire] {
        let sink = log.clone();
        factory.on(pdu_type, move |pdu| {
            if let Ok(mut log) = sink.lock() {
                log.push(format!("{:?}", pdu.pdu_type()));
            }
        });
    }
    let sink = log.clone();
    factory.on_any(move |pdu| {
        if let Ok(mut log) = sink.lock() {
            log.push(format!("any:{:?}", pdu.pdu_type()));
        }
    });
    (factory, log)
}

fn take_log(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    log.lock().map(|mut l| std::mem::take(&mut *l)).unwrap_or_default()
}

// ============================================================================
// SCENARIOS
// ============================================================================

/// Reference entity state: exact round trip, 144-byte declared length
pub fn run_entity_state_roundtrip() -> ScenarioResult {
    const NAME: &str = "entity state round trip";
    let pdu = match reference_entity_state() {
        Ok(pdu) => pdu,
        Err(e) => return ScenarioResult::fail(NAME, e),
    };
    let mut result = ScenarioResult::new(NAME);

    let bytes = pdu.to_bytes();
    result.check(bytes.len() == EntityStatePdu::FIXED_SIZE, "encoded size is not 144");
    result.check(bytes[8..10] == [0, 144], "declared length is not 144");

    match EntityStatePdu::from_bytes(&bytes) {
        Ok(decoded) => {
            result.check(decoded.header.length == 144, "decoded length is not 144");
            result.check(decoded.entity_id == pdu.entity_id, "entity id differs");
            result.check(decoded.force_id == pdu.force_id, "force id differs");
            result.check(decoded.entity_type == pdu.entity_type, "entity type differs");
            result.check(decoded.location == REFERENCE_LOCATION, "location differs");
            result.check(decoded.marking.text() == "TestUnit1", "marking differs");
            result.check(decoded.variable_parameters.is_empty(), "unexpected parameters");

            let mut expected = pdu.clone();
            expected.update_header();
            result.check(decoded == expected, "decoded PDU differs");
        }
        Err(e) => result.check(false, format!("decode failed: {e}")),
    }
    result
}

/// Entity state then fire in one datagram: specific then catch-all, per PDU
pub fn run_bundle_dispatch_order() -> ScenarioResult {
    const NAME: &str = "bundle dispatch order";
    let pdus = match (reference_entity_state(), sample_fire()) {
        (Ok(es), Ok(fire)) => vec![es.into_pdu(), fire.into_pdu()],
        (Err(e), _) | (_, Err(e)) => return ScenarioResult::fail(NAME, e),
    };
    let mut result = ScenarioResult::new(NAME);

    let (mut factory, log) = recording_factory();
    let report = factory.dispatch(&bundle(&pdus));
    result.check(
        take_log(&log) == ["EntityState", "any:EntityState", "Fire", "any:Fire"],
        "callbacks out of order",
    );
    result.check(report.dispatched == 2, "expected two dispatched PDUs");
    result.check(report.bytes_left == 0, "bytes left over");
    result.check(
        report.bytes_consumed == EntityStatePdu::FIXED_SIZE + dis_wire::FirePdu::SIZE,
        "not every byte consumed",
    );
    result
}

/// Declared length 0: advance by the decode cursor, never loop
pub fn run_zero_length_datagram() -> ScenarioResult {
    const NAME: &str = "zero declared length";
    let (es, fire) = match (reference_entity_state(), sample_fire()) {
        (Ok(es), Ok(fire)) => (es, fire),
        (Err(e), _) | (_, Err(e)) => return ScenarioResult::fail(NAME, e),
    };
    let mut result = ScenarioResult::new(NAME);
    let (mut factory, log) = recording_factory();

    // Lone PDU with a zeroed length
    let mut datagram = es.to_bytes();
    datagram[8..10].copy_from_slice(&[0, 0]);
    let report = factory.dispatch(&datagram);
    result.check(report.dispatched == 1, "zero-length PDU not dispatched");
    result.check(
        report.bytes_consumed == datagram.len() && report.bytes_left == 0,
        "zero-length PDU not fully consumed",
    );

    // Followed by a well-formed PDU, which must still line up
    datagram.extend_from_slice(&fire.to_bytes());
    take_log(&log);
    let report = factory.dispatch(&datagram);
    result.check(report.dispatched == 2, "PDU after zero-length one lost");
    result.check(
        take_log(&log) == ["EntityState", "any:EntityState", "Fire", "any:Fire"],
        "misaligned after zero-length PDU",
    );

    // Headers only, all zero
    let report = factory.dispatch(&[0u8; PDU_HEADER_SIZE * 4]);
    result.check(report.pdus_seen == 4, "zero headers not walked one by one");
    result.check(report.unknown == 4, "zero headers not skipped");
    result
}

/// Every sample PDU survives encode and decode unchanged
pub fn run_sample_roundtrips() -> ScenarioResult {
    const NAME: &str = "sample round trips";
    let pdus = match sample_pdus() {
        Ok(pdus) => pdus,
        Err(e) => return ScenarioResult::fail(NAME, e),
    };
    let mut result = ScenarioResult::new(NAME);

    for (pdu, expected) in pdus.iter().zip(normalized(&pdus)) {
        let bytes = pdu.to_bytes();
        result.check(
            bytes.len() == pdu.wire_size(),
            format!("{:?}: wire size mismatch", pdu.pdu_type()),
        );
        result.check(
            usize::from(expected.header().length) == bytes.len(),
            format!("{:?}: declared length mismatch", pdu.pdu_type()),
        );
        match Pdu::from_bytes(&bytes) {
            Ok(decoded) => result.check(
                decoded == expected,
                format!("{:?}: round trip differs", pdu.pdu_type()),
            ),
            Err(e) => result.check(false, format!("{:?}: {e}", pdu.pdu_type())),
        }
    }
    result
}

/// Split encoded PDUs into datagrams no larger than `max_datagram_size`
/// (except a PDU that alone exceeds it)
pub fn split_into_datagrams(pdus: &[Pdu], max_datagram_size: usize) -> Vec<Vec<u8>> {
    let mut bundler = Bundler::new(max_datagram_size);
    let mut ready = Vec::new();
    for pdu in pdus {
        bundler.push(&pdu.to_bytes(), &mut ready);
    }
    ready.extend(bundler.take());
    ready.into_iter().map(|datagram| datagram.to_vec()).collect()
}

/// Bundle `pdus`, decode each datagram independently, compare in order
pub fn check_bundling(pdus: &[Pdu], max_datagram_size: usize) -> ScenarioResult {
    let mut result = ScenarioResult::new("bundling");
    let datagrams = split_into_datagrams(pdus, max_datagram_size);
    let total: usize = pdus.iter().map(Pdu::wire_size).sum();

    if total > max_datagram_size {
        result.check(datagrams.len() > 1, "oversized total fit one datagram");
    }

    let factory = PduFactory::new();
    let mut decoded = Vec::new();
    for datagram in &datagrams {
        let fits = datagram.len() <= max_datagram_size;
        let lone = Pdu::from_bytes(datagram).map(|p| p.wire_size() == datagram.len());
        result.check(
            fits || lone.unwrap_or(false),
            "datagram over the limit holds more than one PDU",
        );
        decoded.extend(factory.decode_all(datagram));
    }
    result.check(decoded == normalized(pdus), "bundled PDUs differ from the originals");
    result
}

/// Samples the default factory decodes; the raw Signal PDU has no decoder
pub fn decodable_samples() -> DisResult<Vec<Pdu>> {
    Ok(sample_pdus()?
        .into_iter()
        .filter(|p| p.pdu_type() != PduType::Signal)
        .collect())
}

pub fn run_bundling() -> ScenarioResult {
    const NAME: &str = "bundling";
    let pdus = match decodable_samples() {
        Ok(pdus) => pdus,
        Err(e) => return ScenarioResult::fail(NAME, e),
    };
    check_bundling(&pdus, 512)
}

// ============================================================================
// RESILIENCE
// ============================================================================

/// Outcome of feeding corrupted datagrams to a factory
#[derive(Clone, Debug, Default)]
pub struct ResilienceReport {
    pub datagrams: usize,
    pub pdus_seen: usize,
    pub dispatched: usize,
    pub failed: usize,
    /// Walks whose consumed + left bytes did not cover the datagram
    pub accounting_errors: usize,
}

/// Dispatch `iterations` corrupted sample bundles; every walk must
/// terminate and account for every byte
pub fn run_corruption(seed: u64, iterations: usize) -> DisResult<ResilienceReport> {
    let clean = bundle(&sample_pdus()?);
    let mut chaos = DatagramChaos::new(seed);
    let mut factory = PduFactory::new();
    let mut report = ResilienceReport::default();

    for i in 0..iterations {
        let datagram = if i % 10 == 0 {
            chaos.garbage(256)
        } else {
            chaos.corrupt(&clean).0
        };
        let outcome = factory.dispatch(&datagram);
        report.datagrams += 1;
        report.pdus_seen += outcome.pdus_seen;
        report.dispatched += outcome.dispatched;
        report.failed += outcome.failed;
        if outcome.bytes_consumed + outcome.bytes_left != datagram.len() {
            report.accounting_errors += 1;
        }
    }

    // Zeroing the first length still walks into the second PDU
    let zeroed = chaos.apply(&clean, Corruption::ZeroLength);
    let outcome = factory.dispatch(&zeroed);
    report.datagrams += 1;
    report.pdus_seen += outcome.pdus_seen;
    report.dispatched += outcome.dispatched;
    report.failed += outcome.failed;
    Ok(report)
}

/// Run every scenario
pub fn run_all() -> Vec<ScenarioResult> {
    vec![
        run_entity_state_roundtrip(),
        run_bundle_dispatch_order(),
        run_zero_length_datagram(),
        run_sample_roundtrips(),
        run_bundling(),
    ]
}
