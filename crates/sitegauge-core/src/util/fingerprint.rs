//! Document fingerprints.
//!
//! A report records a hash of the document its analysis was built from, so
//! two reports can be compared without diffing their inputs. `serde_json`
//! maps are key-ordered, so the compact serialization of a value is stable
//! and identical documents hash identically regardless of their original
//! key order or whitespace.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::report::model::DocumentHash;

pub fn fingerprint(doc: &Value) -> DocumentHash {
    let bytes = serde_json::to_vec(doc).unwrap_or_default();
    DocumentHash {
        algorithm: "sha256".to_string(),
        value: hex::encode(Sha256::digest(&bytes)),
    }
}
