use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical site analysis.
///
/// This is the only shape report code may assume. Every numeric member is
/// finite and every label is populated, whichever source produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub wind: WindBlock,
    pub solar: SolarBlock,
    pub water: WaterBlock,
    pub suitability: SuitabilityBlock,
    pub location: Location,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Wind section. Auxiliary source keys (`profile`, `physics`, `yield_est`, ...)
/// are carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindBlock {
    pub score: f64,
    pub resource: WindResource,
    pub feasibility: Feasibility,
    pub turbine: Turbine,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindResource {
    pub grade: String,
    pub label: String,
    pub wind_speed: f64,
    pub power_density: f64,
    pub air_density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feasibility {
    pub rix: f64,
    pub slope: f64,
    pub elevation: f64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turbine {
    pub best_fit: String,
    pub cf_iec1: f64,
    pub cf_iec2: f64,
    pub cf_iec3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarBlock {
    pub score: f64,
    pub resource: SolarResource,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarResource {
    pub grade: String,
    pub label: String,
    /// Global horizontal irradiance, kWh/m²/year.
    pub ghi: f64,
    pub dni: f64,
    pub dif: f64,
    /// Specific PV yield, kWh/kWp/year.
    pub pvout: f64,
    pub ltdi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterBlock {
    pub composite_risk_score: f64,
    /// GRACE liquid-water-equivalent anomaly, cm.
    pub grace_anomaly: f64,
    pub pdsi: f64,
    pub interpretation: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityBlock {
    pub overall_score: f64,
    pub rating: String,
    pub insights: Vec<String>,
    pub components: Components,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub solar: f64,
    pub wind: f64,
    pub water: f64,
}

/// Keys of each section that the normalizer owns. Anything else in the
/// source section is passed through as-is.
pub(crate) const WIND_KEYS: &[&str] = &["score", "resource", "feasibility", "turbine"];
pub(crate) const SOLAR_KEYS: &[&str] = &["score", "resource"];
pub(crate) const WATER_KEYS: &[&str] = &[
    "composite_risk_score",
    "grace_anomaly",
    "pdsi",
    "interpretation",
];
