//! Ingest command implementation

use super::cmd_load;
use crate::config::Config;
use crate::embed::{embed_in_batches, Embedder};
use crate::error::{Error, Result};
use crate::load::LoadFailure;
use crate::record::Record;
use crate::store::{IndexedPoint, RecordPayload, VectorStore};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// Statistics from an ingestion run
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    pub collection: String,
    pub dimension: usize,
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub records_loaded: usize,
    pub duplicates_merged: usize,
    pub points_upserted: usize,
    pub failures: Vec<LoadFailure>,
    pub snapshot_path: String,
}

/// Collapse records sharing an id; the last one wins but keeps the first slot
fn dedupe_by_id(records: Vec<Record>) -> Vec<Record> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<Record> = Vec::with_capacity(records.len());

    for record in records {
        match slots.get(&record.id) {
            Some(&slot) => unique[slot] = record,
            None => {
                slots.insert(record.id.clone(), unique.len());
                unique.push(record);
            }
        }
    }

    unique
}

fn to_points(records: &[Record], vectors: Vec<Vec<f32>>) -> Result<Vec<IndexedPoint>> {
    records
        .iter()
        .zip(vectors)
        .map(|(record, vector)| {
            let id = Uuid::try_parse(&record.id).map_err(|e| {
                Error::Other(format!("Record id '{}' is not a UUID: {}", record.id, e))
            })?;
            Ok(IndexedPoint {
                id,
                vector,
                payload: RecordPayload::from(record),
            })
        })
        .collect()
}

/// Load `dir`, embed every record and upsert it into the configured collection
pub async fn cmd_ingest(
    config: &Config,
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    dir: &Path,
) -> Result<IngestStats> {
    let report = cmd_load(config, dir)?;

    let mut stats = IngestStats {
        collection: config.collection_name.clone(),
        dimension: embedder.dimension(),
        files_loaded: report.files_loaded,
        files_skipped: report.files_skipped,
        records_loaded: report.record_count,
        failures: report.failures,
        snapshot_path: config.ingest.snapshot_path.clone(),
        ..Default::default()
    };

    let records = dedupe_by_id(report.records);
    stats.duplicates_merged = stats.records_loaded - records.len();
    if stats.duplicates_merged > 0 {
        debug!("Merged {} duplicate records", stats.duplicates_merged);
    }

    store
        .ensure_collection(
            &config.collection_name,
            embedder.dimension(),
            config.store.distance,
        )
        .await?;

    if records.is_empty() {
        info!("Nothing to ingest from {}", dir.display());
        return Ok(stats);
    }

    info!(
        "Embedding {} records with {}",
        records.len(),
        embedder.model_name()
    );
    let texts: Vec<String> = records.iter().map(|r| r.content.clone()).collect();
    let vectors = embed_in_batches(embedder, texts, config.embedding.batch_size).await?;

    let points = to_points(&records, vectors)?;
    for batch in points.chunks(config.embedding.batch_size.max(1)) {
        store.upsert(&config.collection_name, batch.to_vec()).await?;
        stats.points_upserted += batch.len();
    }

    info!(
        "Upserted {} points into {}",
        stats.points_upserted, config.collection_name
    );
    Ok(stats)
}

/// Print ingest statistics to console
pub fn print_ingest_stats(stats: &IngestStats) {
    println!("\n📥 Ingest complete");
    println!("  Collection: {} ({} dimensions)", stats.collection, stats.dimension);
    println!("  Files read: {}", stats.files_loaded);
    println!("  Files skipped: {}", stats.files_skipped);
    println!("  Records loaded: {}", stats.records_loaded);
    if stats.duplicates_merged > 0 {
        println!("  Duplicates merged: {}", stats.duplicates_merged);
    }
    println!("  Points upserted: {}", stats.points_upserted);
    println!("  Snapshot: {}", stats.snapshot_path);

    if !stats.failures.is_empty() {
        println!("\n⚠️  {} files failed:", stats.failures.len());
        for failure in &stats.failures {
            println!("  ✗ {}: {}", failure.file, failure.message);
        }
    }
}
