//! JSON snapshot of every record produced by a run

use crate::error::Result;
use crate::record::Record;
use std::path::Path;
use tracing::info;

/// Write records as a pretty-printed JSON array, replacing any existing file
pub fn write_snapshot(path: &Path, records: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(records)?;
    std::fs::write(path, content)?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Read a snapshot written by [`write_snapshot`]
pub fn read_snapshot(path: &Path) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{normalize, IdDigest, RawUnit};
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_has_five_fields_per_record() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out").join("all_entries.json");
        let records = vec![
            normalize(&RawUnit::from_content("first"), Some("a.txt"), IdDigest::Md5),
            normalize(&RawUnit::from_content("second"), Some("b.txt"), IdDigest::Md5),
        ];

        write_snapshot(&path, &records).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let entries = raw.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        let mut keys: Vec<&String> = entries[0].as_object().unwrap().keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["answer", "content", "id", "question", "source"]);

        assert_eq!(read_snapshot(&path).unwrap(), records);
    }

    #[test]
    fn test_snapshot_overwrites_previous_run() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("snap.json");
        let one = normalize(&RawUnit::from_content("one"), None, IdDigest::Md5);

        write_snapshot(&path, &[one.clone(), one.clone()]).unwrap();
        write_snapshot(&path, &[]).unwrap();

        assert!(read_snapshot(&path).unwrap().is_empty());
    }
}
