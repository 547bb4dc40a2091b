//! Content-derived record identifiers

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 128-bit digest used to derive record ids
///
/// Qdrant only accepts unsigned integers or UUIDs as point ids, so the
/// digest is laid out as a UUID. MD5 stays the default so that ids match
/// collections built before the digest became configurable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdDigest {
    #[default]
    Md5,
    Blake3,
}

impl fmt::Display for IdDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdDigest::Md5 => write!(f, "md5"),
            IdDigest::Blake3 => write!(f, "blake3"),
        }
    }
}

impl FromStr for IdDigest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md5" => Ok(IdDigest::Md5),
            "blake3" => Ok(IdDigest::Blake3),
            other => Err(format!("Unknown id digest '{}'; use md5 or blake3", other)),
        }
    }
}

/// Derive the point id for already-collapsed content
pub fn content_id(content: &str, digest: IdDigest) -> Uuid {
    let mut bytes = [0u8; 16];
    match digest {
        IdDigest::Md5 => {
            let hash = Md5::digest(content.as_bytes());
            bytes.copy_from_slice(&hash);
        }
        IdDigest::Blake3 => {
            let hash = blake3::hash(content.as_bytes());
            bytes.copy_from_slice(&hash.as_bytes()[..16]);
        }
    }
    Uuid::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_ids_match_known_digests() {
        assert_eq!(
            content_id("a b c", IdDigest::Md5).to_string(),
            "06f0760e-c7f1-8687-a7fb-c0ddbf1b1722"
        );
        assert_eq!(
            content_id("", IdDigest::Md5).to_string(),
            "d41d8cd9-8f00-b204-e980-0998ecf8427e"
        );
    }

    #[test]
    fn test_blake3_ids_are_stable_and_distinct_from_md5() {
        let first = content_id("a b c", IdDigest::Blake3);
        let second = content_id("a b c", IdDigest::Blake3);
        assert_eq!(first, second);
        assert_ne!(first, content_id("a b c", IdDigest::Md5));

        let expected = &blake3::hash(b"a b c").to_hex()[..32];
        assert_eq!(first.simple().to_string(), expected);
    }

    #[test]
    fn test_digest_parsing() {
        assert_eq!("MD5".parse::<IdDigest>().unwrap(), IdDigest::Md5);
        assert_eq!("blake3".parse::<IdDigest>().unwrap(), IdDigest::Blake3);
        assert!("sha1".parse::<IdDigest>().is_err());
        assert_eq!(IdDigest::Blake3.to_string(), "blake3");
    }
}
