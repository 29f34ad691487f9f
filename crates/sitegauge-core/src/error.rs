//! Error types for catalog, cache, API and resolution stages.
//!
//! The normalizer has no error type: it accepts any JSON value.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog is not a GeoJSON feature collection: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("site `{id}`: embedded analysis is not valid JSON: {source}")]
    EmbeddedJson {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("site `{id}`: embedded analysis is not a JSON object")]
    EmbeddedShape { id: String },

    #[error("site `{0}` not found in catalog")]
    UnknownSite(String),
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("{endpoint} returned a body that is not a JSON object")]
    Body { endpoint: String },
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("analysis unavailable: {0}")]
    Analysis(#[source] ApiError),
}
