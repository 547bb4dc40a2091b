//! Load command implementation

use crate::config::Config;
use crate::error::Result;
use crate::load::{load_dir, write_snapshot, LoadOptions, LoadReport};
use std::path::Path;

/// Normalize every supported file under `dir` and write the snapshot
pub fn cmd_load(config: &Config, dir: &Path) -> Result<LoadReport> {
    let options = LoadOptions::from(config);
    let report = load_dir(dir, &options)?;
    write_snapshot(Path::new(&config.ingest.snapshot_path), &report.records)?;
    Ok(report)
}

/// Print a load report to console
pub fn print_load_report(report: &LoadReport, snapshot_path: &str) {
    println!("\n📄 Loaded {} records", report.record_count);
    println!("  Files read: {}", report.files_loaded);
    println!("  Files skipped: {}", report.files_skipped);

    if !report.failures.is_empty() {
        println!("  Files failed: {}", report.failures.len());
        for failure in &report.failures {
            println!("    ✗ {}: {}", failure.file, failure.message);
        }
    }

    println!("  Snapshot: {}", snapshot_path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::read_snapshot;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_writes_snapshot() {
        let tmp = TempDir::new().unwrap();
        let kb = tmp.path().join("kb");
        fs::create_dir_all(&kb).unwrap();
        fs::write(kb.join("faq.yaml"), "- content: one\n- content: two\n").unwrap();

        let mut config = Config::default();
        let snapshot = tmp.path().join("out").join("entries.json");
        config.ingest.snapshot_path = snapshot.display().to_string();

        let report = cmd_load(&config, &kb).unwrap();
        assert_eq!(report.record_count, 2);

        let written = read_snapshot(&snapshot).unwrap();
        assert_eq!(written, report.records);
    }

    #[test]
    fn test_rerun_inside_knowledge_base_ignores_own_snapshot() {
        let tmp = TempDir::new().unwrap();
        let kb = tmp.path().join("kb");
        fs::create_dir_all(&kb).unwrap();
        fs::write(kb.join("notes.md"), "Ownership moves values.").unwrap();

        let mut config = Config::default();
        config.ingest.snapshot_path = kb.join("all_entries.json").display().to_string();

        let first = cmd_load(&config, &kb).unwrap();
        let second = cmd_load(&config, &kb).unwrap();

        assert_eq!(first.record_count, 1);
        assert_eq!(second.record_count, 1);
        assert_eq!(second.files_loaded, 1);
    }
}
