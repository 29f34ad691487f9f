use serde::Serialize;

use crate::SCHEMA_VERSION;
use crate::analysis::model::AnalysisResult;
use crate::analysis::normalize::{NormalizationTrace, SourceShape};
use crate::catalog::SiteInfo;
use crate::source::pipeline::{DataSource, Resolution};
use crate::weather::LiveWeather;

/// Top-level site report.
///
/// Wraps the canonical analysis with where it came from and how much of it
/// had to be filled in.
#[derive(Debug, Clone, Serialize)]
pub struct SiteReport {
    pub schema_version: String,
    pub tool: ToolInfo,
    pub site: Option<SiteInfo>,
    pub source: SourceInfo,
    /// Absent when the analysis was served from cache.
    pub normalization: Option<NormalizationInfo>,
    pub analysis: AnalysisResult,
    /// Absent when no live-weather lookup was made.
    pub live: Option<LiveWeather>,
}

impl SiteReport {
    /// Report for a site or point resolved through the staged pipeline.
    pub fn from_resolution(tool: ToolInfo, site: Option<SiteInfo>, resolution: Resolution) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            tool,
            site,
            source: SourceInfo {
                kind: resolution.source,
                document: resolution.document,
                weather_fallback: resolution.weather_fallback,
            },
            normalization: resolution.trace.as_ref().map(NormalizationInfo::from_trace),
            analysis: resolution.analysis,
            live: Some(resolution.live),
        }
    }

    /// Report for a document normalized directly, without any lookup.
    pub fn from_document(
        tool: ToolInfo,
        analysis: AnalysisResult,
        trace: &NormalizationTrace,
        document: DocumentHash,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            tool,
            site: None,
            source: SourceInfo {
                kind: DataSource::File,
                document,
                weather_fallback: false,
            },
            normalization: Some(NormalizationInfo::from_trace(trace)),
            analysis,
            live: None,
        }
    }
}

/// Tool metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub kind: DataSource,
    pub document: DocumentHash,
    pub weather_fallback: bool,
}

/// Cryptographic fingerprint of a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentHash {
    pub algorithm: String,
    pub value: String,
}

/// Summary of a normalization pass.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizationInfo {
    pub shape: SourceShape,
    /// Fields that fell back to a fixed default, sorted.
    pub defaulted: Vec<String>,
}

impl NormalizationInfo {
    pub fn from_trace(trace: &NormalizationTrace) -> Self {
        Self {
            shape: trace.shape(),
            defaulted: trace.defaulted().into_iter().map(String::from).collect(),
        }
    }
}
