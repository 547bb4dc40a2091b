//! File readers and directory loading
//!
//! This module handles:
//! - Mapping file extensions to readers
//! - Reading CSV, JSON, YAML, Markdown and plain text into records
//! - Walking a knowledge-base directory in a stable order
//! - Writing and reading the JSON snapshot of a run

mod snapshot;
mod structured;
mod tabular;
mod text;

pub use snapshot::*;
pub use structured::*;
pub use tabular::*;
pub use text::*;

use crate::chunk::ChunkPolicy;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::{IdDigest, Record};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Input formats we can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    Yaml,
    Markdown,
    Text,
}

impl SourceFormat {
    /// Detect format from file extension; `None` means the file is skipped
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(SourceFormat::Csv),
            "json" => Some(SourceFormat::Json),
            "yaml" | "yml" => Some(SourceFormat::Yaml),
            "md" => Some(SourceFormat::Markdown),
            "txt" => Some(SourceFormat::Text),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Json => "json",
            SourceFormat::Yaml => "yaml",
            SourceFormat::Markdown => "markdown",
            SourceFormat::Text => "text",
        };
        write!(f, "{}", name)
    }
}

/// Settings shared by every reader in a run
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub chunk: ChunkPolicy,
    pub digest: IdDigest,
    pub fail_fast: bool,
    /// File never read as input, normally the snapshot a previous run wrote
    pub skip: Option<PathBuf>,
}

impl From<&Config> for LoadOptions {
    fn from(config: &Config) -> Self {
        Self {
            chunk: ChunkPolicy::from(&config.chunk),
            digest: config.ingest.id_digest,
            fail_fast: config.ingest.fail_fast,
            skip: Some(PathBuf::from(&config.ingest.snapshot_path)),
        }
    }
}

/// A file that could not be loaded
#[derive(Debug, Clone, Serialize)]
pub struct LoadFailure {
    pub file: String,
    pub message: String,
}

/// Outcome of loading a directory
#[derive(Debug, Default, Serialize)]
pub struct LoadReport {
    #[serde(skip)]
    pub records: Vec<Record>,
    pub record_count: usize,
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub failures: Vec<LoadFailure>,
}

/// File name used as record provenance
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

/// Read one file; `Ok(None)` for unsupported extensions
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Option<Vec<Record>>> {
    let Some(format) = SourceFormat::from_path(path) else {
        return Ok(None);
    };

    debug!("Loading {} as {}", path.display(), format);

    let records = match format {
        SourceFormat::Csv => load_csv(path, options)?,
        SourceFormat::Json => load_json(path, options)?,
        SourceFormat::Yaml => load_yaml(path, options)?,
        SourceFormat::Markdown | SourceFormat::Text => load_text(path, options)?,
    };

    Ok(Some(records))
}

/// Load every supported file under `dir`, recursively, in file-name order
pub fn load_dir(dir: &Path, options: &LoadOptions) -> Result<LoadReport> {
    if !dir.is_dir() {
        return Err(Error::InvalidPath(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    info!("Loading knowledge base from {}", dir.display());

    let mut report = LoadReport::default();
    let skip = options.skip.as_deref().and_then(|p| p.canonicalize().ok());

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if skip.is_some() && path.canonicalize().ok() == skip {
            debug!("Skipping snapshot file: {}", path.display());
            continue;
        }

        match load_file(path, options) {
            Ok(Some(records)) => {
                debug!("{}: {} records", path.display(), records.len());
                report.files_loaded += 1;
                report.records.extend(records);
            }
            Ok(None) => {
                debug!("Skipping unsupported file: {}", path.display());
                report.files_skipped += 1;
            }
            Err(e) if options.fail_fast => return Err(e),
            Err(e) => {
                warn!("{}: {}", path.display(), e);
                report.failures.push(LoadFailure {
                    file: path.display().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    report.record_count = report.records.len();

    info!(
        "Loaded {} records from {} files ({} skipped, {} failed)",
        report.record_count,
        report.files_loaded,
        report.files_skipped,
        report.failures.len()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn knowledge_base() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("nested")).unwrap();

        fs::write(
            root.join("a_topics.csv"),
            "topic,example,description\ndecorators,@wrap,Adds behaviour\n",
        )
        .unwrap();
        fs::write(
            root.join("b_faq.json"),
            r#"[{"question": "What is X?", "answer": "X is Y."}]"#,
        )
        .unwrap();
        fs::write(root.join("c_notes.md"), "# Notes\n\nShort markdown.").unwrap();
        fs::write(root.join("image.png"), [0u8, 1, 2]).unwrap();
        fs::write(root.join("nested").join("d_more.YML"), "content: nested yaml\n").unwrap();
        fs::write(root.join("nested").join("e_plain.txt"), "plain text").unwrap();

        tmp
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(SourceFormat::from_path(Path::new("a.csv")), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_path(Path::new("a.JSON")), Some(SourceFormat::Json));
        assert_eq!(SourceFormat::from_path(Path::new("a.yml")), Some(SourceFormat::Yaml));
        assert_eq!(SourceFormat::from_path(Path::new("a.yaml")), Some(SourceFormat::Yaml));
        assert_eq!(SourceFormat::from_path(Path::new("a.md")), Some(SourceFormat::Markdown));
        assert_eq!(SourceFormat::from_path(Path::new("a.txt")), Some(SourceFormat::Text));
        assert_eq!(SourceFormat::from_path(Path::new("a.html")), None);
        assert_eq!(SourceFormat::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_unsupported_file_is_skipped_not_errored() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.bin");
        fs::write(&path, [0u8, 159, 146, 150]).unwrap();
        assert!(load_file(&path, &LoadOptions::default()).unwrap().is_none());
    }

    #[test]
    fn test_load_dir_aggregates_in_walk_order() {
        let tmp = knowledge_base();
        let report = load_dir(tmp.path(), &LoadOptions::default()).unwrap();

        let sources: Vec<&str> = report.records.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(
            sources,
            vec!["a_topics.csv", "b_faq.json", "c_notes.md", "d_more.YML", "e_plain.txt"]
        );
        assert_eq!(report.files_loaded, 5);
        assert_eq!(report.files_skipped, 1);
        assert_eq!(report.record_count, 5);
        assert!(report.failures.is_empty());
        assert_eq!(report.records[2].content, "# Notes Short markdown.");
    }

    #[test]
    fn test_bad_file_is_reported_and_others_continue() {
        let tmp = knowledge_base();
        fs::write(tmp.path().join("broken.csv"), "topic\nonly\n").unwrap();

        let report = load_dir(tmp.path(), &LoadOptions::default()).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].file.ends_with("broken.csv"));
        assert!(report.failures[0].message.contains("broken.csv"));
        assert_eq!(report.record_count, 5);
    }

    #[test]
    fn test_fail_fast_aborts_run() {
        let tmp = knowledge_base();
        fs::write(tmp.path().join("broken.json"), "{").unwrap();

        let options = LoadOptions {
            fail_fast: true,
            ..Default::default()
        };
        let err = load_dir(tmp.path(), &options).unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }

    #[test]
    fn test_load_dir_rejects_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(
            load_dir(&missing, &LoadOptions::default()),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.chunk.enabled = false;
        config.ingest.id_digest = IdDigest::Blake3;
        config.ingest.fail_fast = true;

        let options = LoadOptions::from(&config);
        assert!(!options.chunk.enabled);
        assert_eq!(options.digest, IdDigest::Blake3);
        assert!(options.fail_fast);
        assert_eq!(
            options.skip.as_deref(),
            Some(Path::new("all_entries.json"))
        );
    }

    #[test]
    fn test_skip_file_is_not_read() {
        let tmp = knowledge_base();
        let baseline = load_dir(tmp.path(), &LoadOptions::default()).unwrap();

        let snapshot = tmp.path().join("all_entries.json");
        fs::write(&snapshot, r#"[{"content": "from an earlier run"}]"#).unwrap();

        let options = LoadOptions {
            skip: Some(snapshot),
            ..Default::default()
        };
        let report = load_dir(tmp.path(), &options).unwrap();

        assert_eq!(report.files_loaded, baseline.files_loaded);
        assert_eq!(report.record_count, baseline.record_count);
        assert!(report
            .records
            .iter()
            .all(|r| r.content != "from an earlier run"));
    }
}
