//! Typed view over a loosely-typed analysis document.
//!
//! Analyses arrive in two dialects: the shape the assessment API returns
//! (`wind_speed`, `feasibility`, `turbine`, `resource.ghi`, ...) and the older
//! shape embedded in the site catalog (`ws_100`, `terrain`, `capacity_factors`,
//! `core.ghi_kwh_m2_year`, ...). Both dialects, and any mix of them, parse into
//! the same structs here; every member is optional and reading never fails.
//! Picking between the dialects is the job of `analysis::resolve`.

use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use serde_json::{Map, Value};

use crate::analysis::model::Location;

/// A raw analysis document, split into sections.
#[derive(Debug, Clone, Default)]
pub struct RawAnalysis {
    pub wind: Section<RawWind>,
    pub solar: Section<RawSolar>,
    pub water: Section<RawWater>,
    pub suitability: RawSuitability,
    pub location: Option<Location>,
    pub timestamp: Option<String>,
}

/// One section of the document: the untouched key map, kept so that
/// auxiliary keys survive normalization, plus its typed view.
#[derive(Debug, Clone, Default)]
pub struct Section<T> {
    pub fields: Map<String, Value>,
    pub view: T,
}

impl<T: DeserializeOwned + Default> Section<T> {
    fn read(root: &Value, key: &str) -> Self {
        let Some(fields) = root.get(key).and_then(Value::as_object) else {
            return Self::default();
        };
        let view = serde_json::from_value(Value::Object(fields.clone())).unwrap_or_default();
        Self {
            fields: fields.clone(),
            view,
        }
    }

    pub fn is_present(&self) -> bool {
        !self.fields.is_empty()
    }
}

impl RawAnalysis {
    /// Reads any JSON value. Non-object input yields an empty analysis.
    pub fn from_value(root: &Value) -> Self {
        Self {
            wind: Section::read(root, "wind"),
            solar: Section::read(root, "solar"),
            water: Section::read(root, "water"),
            suitability: root
                .get("suitability")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default(),
            location: root
                .get("location")
                .and_then(|v| serde_json::from_value::<RawLocation>(v.clone()).ok())
                .and_then(RawLocation::complete),
            timestamp: root.get("timestamp").and_then(as_text),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWind {
    #[serde(default, deserialize_with = "number")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub resource: Option<RawWindResource>,
    #[serde(default, deserialize_with = "lenient")]
    pub feasibility: Option<RawFeasibility>,
    #[serde(default, deserialize_with = "lenient")]
    pub terrain: Option<RawTerrain>,
    #[serde(default, deserialize_with = "lenient")]
    pub turbine: Option<RawTurbine>,
    #[serde(default, deserialize_with = "lenient")]
    pub capacity_factors: Option<RawCapacityFactors>,
}

/// Where the site's terrain description comes from.
#[derive(Debug, Clone, Copy)]
pub enum TerrainSource<'a> {
    /// API dialect: `wind.feasibility`, taken as-is.
    Feasibility(&'a RawFeasibility),
    /// Catalog dialect: `wind.terrain`.
    Terrain(&'a RawTerrain),
    Absent,
}

/// Where the turbine recommendation comes from.
#[derive(Debug, Clone, Copy)]
pub enum TurbineSource<'a> {
    /// API dialect: `wind.turbine`, taken as-is.
    Turbine(&'a RawTurbine),
    /// Catalog dialect: `wind.capacity_factors`.
    CapacityFactors(&'a RawCapacityFactors),
    Absent,
}

impl RawWind {
    pub fn terrain_source(&self) -> TerrainSource<'_> {
        match (&self.feasibility, &self.terrain) {
            (Some(f), _) => TerrainSource::Feasibility(f),
            (None, Some(t)) => TerrainSource::Terrain(t),
            (None, None) => TerrainSource::Absent,
        }
    }

    pub fn turbine_source(&self) -> TurbineSource<'_> {
        match (&self.turbine, &self.capacity_factors) {
            (Some(t), _) => TurbineSource::Turbine(t),
            (None, Some(cf)) => TurbineSource::CapacityFactors(cf),
            (None, None) => TurbineSource::Absent,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWindResource {
    #[serde(default, deserialize_with = "text")]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "number")]
    pub wind_speed: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub power_density: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub air_density: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub ws_100: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub pd_100: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub ad_100: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFeasibility {
    #[serde(default, deserialize_with = "number")]
    pub rix: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub slope: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub elevation: Option<f64>,
    #[serde(default, deserialize_with = "text")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTerrain {
    #[serde(default, deserialize_with = "number")]
    pub rix: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub slope: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub elevation: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTurbine {
    #[serde(default, deserialize_with = "text")]
    pub best_fit: Option<String>,
    #[serde(default, deserialize_with = "number")]
    pub cf_iec1: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub cf_iec2: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub cf_iec3: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCapacityFactors {
    #[serde(default, deserialize_with = "number")]
    pub cf_iec1: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub cf_iec2: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub cf_iec3: Option<f64>,
    #[serde(default, deserialize_with = "text")]
    pub best_class: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSolar {
    #[serde(default, deserialize_with = "number")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub resource: Option<RawSolarResource>,
    #[serde(default, deserialize_with = "lenient")]
    pub core: Option<RawSolarCore>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSolarResource {
    #[serde(default, deserialize_with = "text")]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "number")]
    pub ghi: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub dni: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub dif: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub pvout: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub ltdi: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSolarCore {
    #[serde(default, deserialize_with = "number")]
    pub ghi_kwh_m2_year: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub dni: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub dif: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub pvout_kwh_kwp_year: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub dif_fraction: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWater {
    #[serde(default, deserialize_with = "number")]
    pub composite_risk_score: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub grace_anomaly: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub pdsi: Option<f64>,
    #[serde(default, deserialize_with = "text")]
    pub interpretation: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub water_rating: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub groundwater_grace: Option<RawGrace>,
    #[serde(default, deserialize_with = "lenient")]
    pub terraclimate: Option<RawTerraclimate>,
    #[serde(default, deserialize_with = "lenient")]
    pub infrastructure: Option<RawInfrastructure>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGrace {
    #[serde(default, deserialize_with = "number")]
    pub lwe_thickness_cm: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTerraclimate {
    #[serde(default, deserialize_with = "number")]
    pub pdsi: Option<f64>,
}

/// Nearest grid asset (powerhouse / substation) reported with the water data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInfrastructure {
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "number")]
    pub dist_km: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSuitability {
    #[serde(default, deserialize_with = "number")]
    pub overall_score: Option<f64>,
    #[serde(default, deserialize_with = "text")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub insights: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub components: Option<RawComponents>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawComponents {
    #[serde(default, deserialize_with = "number")]
    pub solar: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub wind: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub water: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawLocation {
    #[serde(default, deserialize_with = "number")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    lon: Option<f64>,
}

impl RawLocation {
    fn complete(self) -> Option<Location> {
        Some(Location::new(self.lat?, self.lon?))
    }
}

/// Reads a finite number from a JSON number or a numeric string.
pub fn as_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|x| x.is_finite())
}

/// Reads a non-blank string.
pub fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(as_number(&v))
}

fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(as_text(&v))
}

/// Sub-objects of the wrong type read as absent instead of failing the section.
fn lenient<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Value::deserialize(d)?;
    Ok(serde_json::from_value(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_object_input_reads_as_empty() {
        for v in [json!(null), json!("text"), json!([1, 2]), json!(3.5)] {
            let raw = RawAnalysis::from_value(&v);
            assert!(!raw.wind.is_present());
            assert!(raw.location.is_none());
            assert!(raw.timestamp.is_none());
        }
    }

    #[test]
    fn mistyped_sub_objects_read_as_absent() {
        let raw = RawAnalysis::from_value(&json!({
            "wind": {"resource": "n/a", "terrain": {"rix": 0.2}, "score": "55.5"}
        }));
        assert!(raw.wind.view.resource.is_none());
        assert_eq!(raw.wind.view.terrain.as_ref().and_then(|t| t.rix), Some(0.2));
        assert_eq!(raw.wind.view.score, Some(55.5));
    }

    #[test]
    fn numbers_are_read_leniently() {
        assert_eq!(as_number(&json!(0)), Some(0.0));
        assert_eq!(as_number(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(as_number(&json!("NaN")), None);
        assert_eq!(as_number(&json!("inf")), None);
        assert_eq!(as_number(&json!(null)), None);
        assert_eq!(as_number(&json!(true)), None);
    }

    #[test]
    fn blank_strings_are_absent() {
        assert_eq!(as_text(&json!("  ")), None);
        assert_eq!(as_text(&json!("A")), Some("A".to_string()));
        assert_eq!(as_text(&json!(1)), None);
    }

    #[test]
    fn feasibility_wins_over_terrain() {
        let raw = RawAnalysis::from_value(&json!({
            "wind": {"feasibility": {"rix": 0.1}, "terrain": {"rix": 0.9}}
        }));
        assert!(matches!(
            raw.wind.view.terrain_source(),
            TerrainSource::Feasibility(f) if f.rix == Some(0.1)
        ));
    }

    #[test]
    fn capacity_factors_used_without_turbine() {
        let raw = RawAnalysis::from_value(&json!({
            "wind": {"capacity_factors": {"cf_iec3": 0.31, "best_class": "IEC Class 3"}}
        }));
        assert!(matches!(
            raw.wind.view.turbine_source(),
            TurbineSource::CapacityFactors(cf) if cf.cf_iec3 == Some(0.31)
        ));
    }

    #[test]
    fn partial_location_is_dropped() {
        let raw = RawAnalysis::from_value(&json!({"location": {"lat": 12.9}}));
        assert!(raw.location.is_none());

        let raw = RawAnalysis::from_value(&json!({"location": {"lat": 12.9, "lon": "80.2"}}));
        assert_eq!(raw.location, Some(Location::new(12.9, 80.2)));
    }
}
