//! Markdown and plain-text readers
//!
//! Free text goes through the chunk policy first; each chunk becomes its own
//! record with a `#part<N>` suffix on the file name.

use super::{file_name, LoadOptions};
use crate::error::{Error, Result};
use crate::record::{normalize, RawUnit, Record};
use std::path::Path;

/// Load a Markdown or plain-text file
pub fn load_text(path: &Path, options: &LoadOptions) -> Result<Vec<Record>> {
    let name = file_name(path);
    let content = std::fs::read_to_string(path).map_err(|e| Error::load(&name, e))?;
    Ok(text_records(&normalize_newlines(&content), &name, options))
}

/// Records for one free-text document
pub fn text_records(content: &str, name: &str, options: &LoadOptions) -> Vec<Record> {
    match options.chunk.split(content) {
        Some(chunks) => chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| {
                let source = format!("{}#part{}", name, index);
                normalize(
                    &RawUnit::from_content(chunk.as_str()),
                    Some(source.as_str()),
                    options.digest,
                )
            })
            .collect(),
        None => vec![normalize(
            &RawUnit::from_content(content),
            Some(name),
            options.digest,
        )],
    }
}

/// CRLF and bare CR line endings would hide paragraph breaks from the chunker
fn normalize_newlines(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkPolicy;
    use crate::record::collapse_whitespace;
    use tempfile::TempDir;

    fn policy(max_chars: usize) -> LoadOptions {
        LoadOptions {
            chunk: ChunkPolicy {
                enabled: true,
                max_chars,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_long_text_is_split_into_parts() {
        let text = format!("{}\n\n{}\n\n{}", "a".repeat(30), "b".repeat(30), "c".repeat(30));
        let records = text_records(&text, "notes.md", &policy(70));

        let sources: Vec<&str> = records.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["notes.md#part0", "notes.md#part1"]);
        assert_eq!(records[0].content, format!("{} {}", "a".repeat(30), "b".repeat(30)));
        assert_eq!(records[1].content, "c".repeat(30));
    }

    #[test]
    fn test_short_text_keeps_plain_source() {
        let records = text_records("Short\n\nnote", "readme.txt", &policy(500));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, "readme.txt");
        assert_eq!(records[0].content, "Short note");
    }

    #[test]
    fn test_unchunkable_text_falls_back_to_one_record() {
        let text = " \n\n\t\n\n   \n\n        ";
        let records = text_records(text, "blank.txt", &policy(3));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, collapse_whitespace(text));
        assert_eq!(records[0].source, "blank.txt");
    }

    #[test]
    fn test_disabled_policy_keeps_file_whole() {
        let text = "word ".repeat(400);
        let options = LoadOptions {
            chunk: ChunkPolicy::disabled(),
            ..Default::default()
        };
        let records = text_records(&text, "big.txt", &options);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, collapse_whitespace(&text));
    }

    #[test]
    fn test_crlf_paragraphs_are_detected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("windows.txt");
        let body = format!("{}\r\n\r\n{}", "x".repeat(40), "y".repeat(40));
        std::fs::write(&path, body).unwrap();

        let records = load_text(&path, &policy(50)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].source, "windows.txt#part1");
    }
}
