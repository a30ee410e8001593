//! Print every PDU seen on the network.
//!
//! Usage: `cargo run -p dis-runtime --example monitor [config.json]`

use dis_core::PduType;
use dis_runtime::{init_tracing_from, Node, NodeConfig, RuntimeResult};
use dis_wire::{EntityStatePdu, Pdu};

#[tokio::main]
async fn main() -> RuntimeResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => NodeConfig::from_file(path)?,
        None => NodeConfig::default(),
    };
    init_tracing_from(&config)?;

    let mut node = Node::new(config)?;
    node.on(PduType::EntityState, |pdu: &Pdu| {
        if let Some(es) = pdu.body::<EntityStatePdu>() {
            println!(
                "entity {} {} at ({:.1}, {:.1}, {:.1})",
                es.entity_id,
                es.marking.text(),
                es.location.x,
                es.location.y,
                es.location.z
            );
        }
    });
    node.on_any(|pdu: &Pdu| {
        let header = pdu.header();
        tracing::debug!(
            pdu_type = ?header.pdu_type,
            exercise = header.exercise_id,
            length = header.length,
            "pdu"
        );
    });

    node.run(async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    let stats = node.dispatch_stats();
    println!(
        "datagrams {} pdus {} dispatched {} rejected {} unknown {} failed {}",
        stats.datagrams,
        stats.pdus_seen,
        stats.dispatched,
        stats.rejected,
        stats.unknown,
        stats.decode_failures
    );
    Ok(())
}
