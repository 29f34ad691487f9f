//! Analysis normalizer.
//!
//! Turns a raw analysis document of either dialect into an `AnalysisResult`.
//! The transform never fails: missing sections, missing sub-objects and
//! mistyped members all degrade to documented defaults or derived values.
//!
//! Determinism: the output depends only on the input document and the
//! injected `Clock`, which is consulted solely when the document carries
//! no `timestamp`.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::analysis::model::*;
use crate::analysis::raw::{RawAnalysis, RawSolar, RawWater, RawWind, Section};
use crate::analysis::resolve::{self, Origin, Resolved};
use crate::rules::composite::{composite_score, stored_overall_score};
use crate::rules::insights::{InsightInputs, site_insights};
use crate::rules::ladder::suitability_rating;

/// Source of "now" for documents without a timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> String;
}

/// Wall clock, RFC 3339 in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}

pub struct NormalizeContext<'a> {
    pub clock: &'a dyn Clock,
    /// Used when the document has no complete `location`, e.g. the
    /// coordinates of the catalog site it was embedded in.
    pub fallback_location: Option<Location>,
}

impl<'a> NormalizeContext<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self {
            clock,
            fallback_location: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.fallback_location = Some(location);
        self
    }
}

/// Which dialect a document was written in, judged from the fields that
/// differ between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceShape {
    Canonical,
    Embedded,
    Mixed,
    Empty,
}

/// Per-field record of which branch produced each normalized value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizationTrace {
    pub origins: BTreeMap<&'static str, Origin>,
}

impl NormalizationTrace {
    fn take<T>(&mut self, field: &'static str, resolved: Resolved<T>) -> T {
        self.origins.insert(field, resolved.origin);
        resolved.value
    }

    pub fn origin(&self, field: &str) -> Option<Origin> {
        self.origins.get(field).copied()
    }

    pub fn shape(&self) -> SourceShape {
        let canonical = self.origins.values().any(|o| *o == Origin::Canonical);
        let embedded = self.origins.values().any(|o| *o == Origin::Embedded);
        match (canonical, embedded) {
            (true, true) => SourceShape::Mixed,
            (true, false) => SourceShape::Canonical,
            (false, true) => SourceShape::Embedded,
            (false, false) => SourceShape::Empty,
        }
    }

    /// Fields that fell back to a fixed default, in field-name order.
    pub fn defaulted(&self) -> Vec<&'static str> {
        self.origins
            .iter()
            .filter(|(_, o)| **o == Origin::Default)
            .map(|(f, _)| *f)
            .collect()
    }
}

/// Normalizes a raw analysis document.
pub fn normalize(raw: &Value, ctx: &NormalizeContext<'_>) -> AnalysisResult {
    normalize_traced(raw, ctx).0
}

/// Normalizes a raw analysis document and reports where each field came from.
pub fn normalize_traced(
    raw: &Value,
    ctx: &NormalizeContext<'_>,
) -> (AnalysisResult, NormalizationTrace) {
    let raw = RawAnalysis::from_value(raw);
    let mut trace = NormalizationTrace::default();

    let wind = normalize_wind(&raw.wind, &mut trace);
    let solar = normalize_solar(&raw.solar, &mut trace);
    let water = normalize_water(&raw.water, &mut trace);
    let suitability = normalize_suitability(&raw, &wind, &solar, &water, &mut trace);

    let location = match (raw.location, ctx.fallback_location) {
        (Some(loc), _) => Resolved {
            value: loc,
            origin: Origin::Source,
        },
        (None, Some(loc)) => Resolved {
            value: loc,
            origin: Origin::Derived,
        },
        (None, None) => Resolved {
            value: Location::default(),
            origin: Origin::Default,
        },
    };
    let location = trace.take("location", location);

    let timestamp = match raw.timestamp {
        Some(ts) => Resolved {
            value: ts,
            origin: Origin::Source,
        },
        None => Resolved {
            value: ctx.clock.now(),
            origin: Origin::Default,
        },
    };
    let timestamp = trace.take("timestamp", timestamp);

    let result = AnalysisResult {
        wind,
        solar,
        water,
        suitability,
        location,
        timestamp,
    };
    (result, trace)
}

/// Source keys minus the ones the normalizer rewrites.
fn passthrough(fields: &Map<String, Value>, owned: &[&str]) -> Map<String, Value> {
    fields
        .iter()
        .filter(|(k, _)| !owned.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn normalize_wind(section: &Section<RawWind>, trace: &mut NormalizationTrace) -> WindBlock {
    let w = &section.view;

    let score = trace.take("wind.score", resolve::score(w.score));
    let wind_speed = trace.take("wind.resource.wind_speed", resolve::wind_speed(w));
    let power_density = trace.take("wind.resource.power_density", resolve::power_density(w));
    let air_density = trace.take("wind.resource.air_density", resolve::air_density(w));
    let (grade, label) = resolve::wind_grade(w, power_density);
    let grade = trace.take("wind.resource.grade", grade);
    let label = trace.take("wind.resource.label", label);

    WindBlock {
        score,
        resource: WindResource {
            grade,
            label,
            wind_speed,
            power_density,
            air_density,
        },
        feasibility: trace.take("wind.feasibility", resolve::feasibility(w)),
        turbine: trace.take("wind.turbine", resolve::turbine(w)),
        extra: passthrough(&section.fields, WIND_KEYS),
    }
}

fn normalize_solar(section: &Section<RawSolar>, trace: &mut NormalizationTrace) -> SolarBlock {
    let s = &section.view;

    let score = trace.take("solar.score", resolve::score(s.score));
    let ghi = trace.take("solar.resource.ghi", resolve::ghi(s));
    let (grade, label) = resolve::solar_grade(s, ghi);

    SolarBlock {
        score,
        resource: SolarResource {
            grade: trace.take("solar.resource.grade", grade),
            label: trace.take("solar.resource.label", label),
            ghi,
            dni: trace.take("solar.resource.dni", resolve::dni(s)),
            dif: trace.take("solar.resource.dif", resolve::dif(s)),
            pvout: trace.take("solar.resource.pvout", resolve::pvout(s)),
            ltdi: trace.take("solar.resource.ltdi", resolve::ltdi(s)),
        },
        extra: passthrough(&section.fields, SOLAR_KEYS),
    }
}

fn normalize_water(section: &Section<RawWater>, trace: &mut NormalizationTrace) -> WaterBlock {
    let w = &section.view;

    let composite = trace.take(
        "water.composite_risk_score",
        resolve::composite_risk_score(w),
    );

    WaterBlock {
        composite_risk_score: composite,
        grace_anomaly: trace.take("water.grace_anomaly", resolve::grace_anomaly(w)),
        pdsi: trace.take("water.pdsi", resolve::pdsi(w)),
        interpretation: trace.take(
            "water.interpretation",
            resolve::interpretation(w, composite),
        ),
        extra: passthrough(&section.fields, WATER_KEYS),
    }
}

fn normalize_suitability(
    raw: &RawAnalysis,
    wind: &WindBlock,
    solar: &SolarBlock,
    water: &WaterBlock,
    trace: &mut NormalizationTrace,
) -> SuitabilityBlock {
    let src = &raw.suitability;

    let overall = match stored_overall_score(src.overall_score) {
        Some(v) => Resolved {
            value: v,
            origin: Origin::Source,
        },
        None => Resolved {
            value: composite_score(solar.score, wind.score, water.composite_risk_score),
            origin: Origin::Derived,
        },
    };
    let overall_score = trace.take("suitability.overall_score", overall);

    let rating = match &src.rating {
        Some(r) => Resolved {
            value: r.clone(),
            origin: Origin::Source,
        },
        None => Resolved {
            value: suitability_rating(overall_score).to_string(),
            origin: Origin::Derived,
        },
    };

    let insights = match &src.insights {
        Some(lines) => Resolved {
            value: lines.clone(),
            origin: Origin::Source,
        },
        None => {
            let grid_asset = raw
                .water
                .view
                .infrastructure
                .as_ref()
                .and_then(|i| Some((i.name.as_deref()?, i.dist_km?)));
            Resolved {
                value: site_insights(&InsightInputs {
                    wind_score: wind.score,
                    solar_score: solar.score,
                    water_score: water.composite_risk_score,
                    grid_asset,
                    slope_deg: wind.feasibility.slope,
                }),
                origin: Origin::Derived,
            }
        }
    };

    let given = src.components.as_ref();
    let components = Components {
        solar: given.and_then(|c| c.solar).unwrap_or(solar.score),
        wind: given.and_then(|c| c.wind).unwrap_or(wind.score),
        water: given
            .and_then(|c| c.water)
            .unwrap_or(water.composite_risk_score),
    };

    SuitabilityBlock {
        overall_score,
        rating: trace.take("suitability.rating", rating),
        insights: trace.take("suitability.insights", insights),
        components,
    }
}
