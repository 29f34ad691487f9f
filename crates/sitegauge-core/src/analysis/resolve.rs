//! Per-field resolution over the two analysis dialects.
//!
//! Each function here resolves exactly one canonical field (or one block)
//! and reports which branch produced it. The precedence is always:
//! API key, then catalog key, then a derivation or a fixed default.

use serde::Serialize;

use crate::analysis::model::{Feasibility, Turbine};
use crate::analysis::raw::{RawSolar, RawWater, RawWind, TerrainSource, TurbineSource};
use crate::rules::ladder::{self, Grade};

pub const DEFAULT_AIR_DENSITY: f64 = 1.225;

/// Which branch produced a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Read from the assessment API's key.
    Canonical,
    /// Read from the site catalog's key.
    Embedded,
    /// Read from a key both dialects share.
    Source,
    /// Computed from other resolved fields.
    Derived,
    /// Nothing usable in the source.
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Resolved<T> {
    fn new(value: T, origin: Origin) -> Self {
        Self { value, origin }
    }
}

fn first_of(canonical: Option<f64>, embedded: Option<f64>, default: f64) -> Resolved<f64> {
    match (canonical, embedded) {
        (Some(v), _) => Resolved::new(v, Origin::Canonical),
        (None, Some(v)) => Resolved::new(v, Origin::Embedded),
        (None, None) => Resolved::new(default, Origin::Default),
    }
}

fn shared(source: Option<f64>, default: f64) -> Resolved<f64> {
    match source {
        Some(v) => Resolved::new(v, Origin::Source),
        None => Resolved::new(default, Origin::Default),
    }
}

fn or_derived(source: Option<&String>, derived: &str) -> Resolved<String> {
    match source {
        Some(s) => Resolved::new(s.clone(), Origin::Source),
        None => Resolved::new(derived.to_string(), Origin::Derived),
    }
}

pub fn score(source: Option<f64>) -> Resolved<f64> {
    shared(source, 0.0)
}

// ---------------------------------------------------------------------------
// wind
// ---------------------------------------------------------------------------

pub fn wind_speed(wind: &RawWind) -> Resolved<f64> {
    let r = wind.resource.as_ref();
    first_of(
        r.and_then(|r| r.wind_speed),
        r.and_then(|r| r.ws_100),
        0.0,
    )
}

pub fn power_density(wind: &RawWind) -> Resolved<f64> {
    let r = wind.resource.as_ref();
    first_of(
        r.and_then(|r| r.power_density),
        r.and_then(|r| r.pd_100),
        0.0,
    )
}

/// Falls back to sea-level standard density (kg/m³).
pub fn air_density(wind: &RawWind) -> Resolved<f64> {
    let r = wind.resource.as_ref();
    first_of(
        r.and_then(|r| r.air_density),
        r.and_then(|r| r.ad_100),
        DEFAULT_AIR_DENSITY,
    )
}

/// Source grade and label, each falling back to the power-density ladder.
pub fn wind_grade(wind: &RawWind, power_density: f64) -> (Resolved<String>, Resolved<String>) {
    let derived: Grade = ladder::wind_grade(power_density);
    let r = wind.resource.as_ref();
    (
        or_derived(r.and_then(|r| r.grade.as_ref()), derived.grade),
        or_derived(r.and_then(|r| r.label.as_ref()), derived.label),
    )
}

pub fn feasibility(wind: &RawWind) -> Resolved<Feasibility> {
    let (rix, slope, elevation, status, origin) = match wind.terrain_source() {
        TerrainSource::Feasibility(f) => (
            f.rix,
            f.slope,
            f.elevation,
            f.status.clone(),
            Origin::Canonical,
        ),
        TerrainSource::Terrain(t) => (t.rix, t.slope, t.elevation, None, Origin::Embedded),
        TerrainSource::Absent => (None, None, None, None, Origin::Default),
    };
    let rix = rix.unwrap_or(0.0);
    let slope = slope.unwrap_or(0.0);
    let status = status.unwrap_or_else(|| ladder::feasibility_status(rix, slope).to_string());

    Resolved::new(
        Feasibility {
            rix,
            slope,
            elevation: elevation.unwrap_or(0.0),
            status,
        },
        origin,
    )
}

pub fn turbine(wind: &RawWind) -> Resolved<Turbine> {
    let (best_fit, cf1, cf2, cf3, origin) = match wind.turbine_source() {
        TurbineSource::Turbine(t) => (
            t.best_fit.clone(),
            t.cf_iec1,
            t.cf_iec2,
            t.cf_iec3,
            Origin::Canonical,
        ),
        TurbineSource::CapacityFactors(cf) => (
            cf.best_class.clone(),
            cf.cf_iec1,
            cf.cf_iec2,
            cf.cf_iec3,
            Origin::Embedded,
        ),
        TurbineSource::Absent => (None, None, None, None, Origin::Default),
    };

    Resolved::new(
        Turbine {
            best_fit: best_fit.unwrap_or_default(),
            cf_iec1: cf1.unwrap_or(0.0),
            cf_iec2: cf2.unwrap_or(0.0),
            cf_iec3: cf3.unwrap_or(0.0),
        },
        origin,
    )
}

// ---------------------------------------------------------------------------
// solar
// ---------------------------------------------------------------------------

pub fn ghi(solar: &RawSolar) -> Resolved<f64> {
    first_of(
        solar.resource.as_ref().and_then(|r| r.ghi),
        solar.core.as_ref().and_then(|c| c.ghi_kwh_m2_year),
        0.0,
    )
}

pub fn dni(solar: &RawSolar) -> Resolved<f64> {
    first_of(
        solar.resource.as_ref().and_then(|r| r.dni),
        solar.core.as_ref().and_then(|c| c.dni),
        0.0,
    )
}

pub fn dif(solar: &RawSolar) -> Resolved<f64> {
    first_of(
        solar.resource.as_ref().and_then(|r| r.dif),
        solar.core.as_ref().and_then(|c| c.dif),
        0.0,
    )
}

pub fn pvout(solar: &RawSolar) -> Resolved<f64> {
    first_of(
        solar.resource.as_ref().and_then(|r| r.pvout),
        solar.core.as_ref().and_then(|c| c.pvout_kwh_kwp_year),
        0.0,
    )
}

/// Diffuse share of irradiance; the catalog calls it `dif_fraction`.
pub fn ltdi(solar: &RawSolar) -> Resolved<f64> {
    first_of(
        solar.resource.as_ref().and_then(|r| r.ltdi),
        solar.core.as_ref().and_then(|c| c.dif_fraction),
        0.0,
    )
}

pub fn solar_grade(solar: &RawSolar, ghi: f64) -> (Resolved<String>, Resolved<String>) {
    let derived = ladder::solar_grade(ghi);
    let r = solar.resource.as_ref();
    (
        or_derived(r.and_then(|r| r.grade.as_ref()), derived.grade),
        or_derived(r.and_then(|r| r.label.as_ref()), derived.label),
    )
}

// ---------------------------------------------------------------------------
// water
// ---------------------------------------------------------------------------

pub fn composite_risk_score(water: &RawWater) -> Resolved<f64> {
    shared(water.composite_risk_score, 0.0)
}

pub fn grace_anomaly(water: &RawWater) -> Resolved<f64> {
    first_of(
        water.grace_anomaly,
        water.groundwater_grace.as_ref().and_then(|g| g.lwe_thickness_cm),
        0.0,
    )
}

pub fn pdsi(water: &RawWater) -> Resolved<f64> {
    first_of(
        water.pdsi,
        water.terraclimate.as_ref().and_then(|t| t.pdsi),
        0.0,
    )
}

/// `interpretation` (API) or `water_rating` (assessment producer), else the
/// composite ladder.
pub fn interpretation(water: &RawWater, composite: f64) -> Resolved<String> {
    match (&water.interpretation, &water.water_rating) {
        (Some(s), _) => Resolved::new(s.clone(), Origin::Canonical),
        (None, Some(s)) => Resolved::new(s.clone(), Origin::Embedded),
        (None, None) => Resolved::new(
            ladder::water_interpretation(composite).to_string(),
            Origin::Derived,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::raw::RawAnalysis;
    use serde_json::json;

    fn wind(v: serde_json::Value) -> RawWind {
        RawAnalysis::from_value(&json!({ "wind": v })).wind.view
    }

    fn solar(v: serde_json::Value) -> RawSolar {
        RawAnalysis::from_value(&json!({ "solar": v })).solar.view
    }

    fn water(v: serde_json::Value) -> RawWater {
        RawAnalysis::from_value(&json!({ "water": v })).water.view
    }

    #[test]
    fn api_key_wins_over_catalog_key() {
        let w = wind(json!({"resource": {"wind_speed": 6.1, "ws_100": 7.9}}));
        assert_eq!(wind_speed(&w), Resolved::new(6.1, Origin::Canonical));
    }

    #[test]
    fn present_zero_is_not_a_fallthrough() {
        let w = wind(json!({"resource": {"wind_speed": 0, "ws_100": 7.9}}));
        assert_eq!(wind_speed(&w).value, 0.0);
        assert_eq!(wind_speed(&w).origin, Origin::Canonical);
    }

    #[test]
    fn catalog_keys_fill_in() {
        let w = wind(json!({"resource": {"ws_100": 7.2, "pd_100": 450, "ad_100": 1.18}}));
        assert_eq!(wind_speed(&w), Resolved::new(7.2, Origin::Embedded));
        assert_eq!(power_density(&w), Resolved::new(450.0, Origin::Embedded));
        assert_eq!(air_density(&w), Resolved::new(1.18, Origin::Embedded));
    }

    #[test]
    fn air_density_defaults_to_standard_atmosphere() {
        let w = wind(json!({}));
        assert_eq!(air_density(&w), Resolved::new(1.225, Origin::Default));
        assert_eq!(wind_speed(&w), Resolved::new(0.0, Origin::Default));
    }

    #[test]
    fn wind_grade_derived_from_power_density() {
        let w = wind(json!({"resource": {"pd_100": 450}}));
        let (g, l) = wind_grade(&w, 450.0);
        assert_eq!(g, Resolved::new("A".to_string(), Origin::Derived));
        assert_eq!(l.value, "Outstanding potential");

        let w = wind(json!({"resource": {"grade": "B", "label": "Commercial viability"}}));
        let (g, _) = wind_grade(&w, 650.0);
        assert_eq!(g, Resolved::new("B".to_string(), Origin::Source));
    }

    #[test]
    fn feasibility_from_terrain_derives_status() {
        let w = wind(json!({"terrain": {"rix": 0.62, "slope": 4.0, "elevation": 900}}));
        let f = feasibility(&w);
        assert_eq!(f.origin, Origin::Embedded);
        assert_eq!(f.value.status, "Challenging");
        assert_eq!(f.value.elevation, 900.0);
    }

    #[test]
    fn feasibility_as_is_keeps_source_status() {
        let w = wind(json!({"feasibility": {"rix": 0.9, "slope": 30, "elevation": 10, "status": "Feasible"}}));
        let f = feasibility(&w);
        assert_eq!(f.origin, Origin::Canonical);
        assert_eq!(f.value.status, "Feasible");
    }

    #[test]
    fn missing_terrain_is_feasible_at_zero() {
        let f = feasibility(&wind(json!({})));
        assert_eq!(f.origin, Origin::Default);
        assert_eq!(
            f.value,
            Feasibility {
                rix: 0.0,
                slope: 0.0,
                elevation: 0.0,
                status: "Feasible".into()
            }
        );
    }

    #[test]
    fn turbine_from_capacity_factors() {
        let w = wind(json!({"capacity_factors": {
            "cf_iec1": 0.21, "cf_iec2": 0.27, "cf_iec3": 0.33,
            "cf_best": 0.33, "best_class": "IEC Class 3 — Low Wind (5.0–6.5 m/s)"
        }}));
        let t = turbine(&w);
        assert_eq!(t.origin, Origin::Embedded);
        assert_eq!(t.value.best_fit, "IEC Class 3 — Low Wind (5.0–6.5 m/s)");
        assert_eq!(t.value.cf_iec3, 0.33);
    }

    #[test]
    fn missing_turbine_defaults() {
        let t = turbine(&wind(json!({})));
        assert_eq!(t.origin, Origin::Default);
        assert_eq!(t.value.best_fit, "");
        assert_eq!(t.value.cf_iec1, 0.0);
    }

    #[test]
    fn solar_core_fields_map_to_resource() {
        let s = solar(json!({"core": {
            "ghi_kwh_m2_year": 1950.5, "dni": 1600.0, "dif": 780.0,
            "pvout_kwh_kwp_year": 1580.0, "dif_fraction": 0.4
        }}));
        assert_eq!(ghi(&s), Resolved::new(1950.5, Origin::Embedded));
        assert_eq!(dni(&s).value, 1600.0);
        assert_eq!(dif(&s).value, 780.0);
        assert_eq!(pvout(&s).value, 1580.0);
        assert_eq!(ltdi(&s).value, 0.4);

        let (g, l) = solar_grade(&s, 1950.5);
        assert_eq!(g.value, "A");
        assert_eq!(l.value, "Excellent solar resource");
        assert_eq!(g.origin, Origin::Derived);
    }

    #[test]
    fn solar_grade_and_label_resolve_independently() {
        let s = solar(json!({"resource": {"grade": "B+"}}));
        let (g, l) = solar_grade(&s, 2100.0);
        assert_eq!(g.value, "B+");
        assert_eq!(l, Resolved::new("World-class irradiance".to_string(), Origin::Derived));
    }

    #[test]
    fn water_nested_catalog_fields() {
        let w = water(json!({
            "groundwater_grace": {"lwe_thickness_cm": -12.4},
            "terraclimate": {"pdsi": -2.3},
            "composite_risk_score": 41.0
        }));
        assert_eq!(grace_anomaly(&w), Resolved::new(-12.4, Origin::Embedded));
        assert_eq!(pdsi(&w), Resolved::new(-2.3, Origin::Embedded));
        assert_eq!(composite_risk_score(&w), Resolved::new(41.0, Origin::Source));
    }

    #[test]
    fn interpretation_precedence() {
        let w = water(json!({"interpretation": "Custom", "water_rating": "GOOD"}));
        assert_eq!(interpretation(&w, 10.0).value, "Custom");

        let w = water(json!({"water_rating": "GOOD"}));
        assert_eq!(interpretation(&w, 10.0), Resolved::new("GOOD".to_string(), Origin::Embedded));

        let w = water(json!({}));
        assert_eq!(interpretation(&w, 10.0).value, "Water-stressed region");
    }
}
