//! Static site catalog.
//!
//! The catalog is a GeoJSON `FeatureCollection` of point features, one per
//! data-center site. A feature's `properties.analysis` may hold an analysis
//! baked in at catalog build time, either as an object or as a JSON string.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::analysis::model::Location;
use crate::analysis::raw::{as_number, as_text};
use crate::error::CatalogError;

/// Snap radius for matching a map click to a catalog site, degrees (~110 m).
pub const SITE_SNAP_TOLERANCE_DEG: f64 = 0.001;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

impl Geometry {
    /// GeoJSON points are `[lon, lat]`.
    fn point(&self) -> Option<Location> {
        if self.kind != "Point" {
            return None;
        }
        let c = self.coordinates.as_array()?;
        let lon = as_number(c.first()?)?;
        let lat = as_number(c.get(1)?)?;
        Some(Location::new(lat, lon))
    }
}

/// Site metadata shown in the report header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub id: String,
    pub name: String,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub power_mw: Option<String>,
    pub tier: Option<String>,
    pub location: Location,
}

/// One catalog site.
#[derive(Debug, Clone)]
pub struct Site {
    pub info: SiteInfo,
    analysis: Option<Value>,
}

impl Site {
    pub fn id(&self) -> &str {
        &self.info.id
    }

    pub fn location(&self) -> Location {
        self.info.location
    }

    pub fn has_embedded_analysis(&self) -> bool {
        !matches!(self.analysis, None | Some(Value::Null))
    }

    /// Decodes the embedded analysis, if any.
    ///
    /// A string that does not parse, or a value that is not an object, is an
    /// error; callers treat it as "no embedded analysis" and move on.
    pub fn embedded_analysis(&self) -> Result<Option<Value>, CatalogError> {
        let decoded = match &self.analysis {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(text)) => {
                serde_json::from_str::<Value>(text).map_err(|source| {
                    CatalogError::EmbeddedJson {
                        id: self.info.id.clone(),
                        source,
                    }
                })?
            }
            Some(other) => other.clone(),
        };

        if decoded.is_object() {
            Ok(Some(decoded))
        } else {
            Err(CatalogError::EmbeddedShape {
                id: self.info.id.clone(),
            })
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sites: Vec<Site>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parses a feature collection. Features without usable coordinates
    /// are skipped.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let fc: FeatureCollection = serde_json::from_str(text)?;
        let mut sites = Vec::with_capacity(fc.features.len());

        for (index, feature) in fc.features.into_iter().enumerate() {
            match site_from_feature(index, feature) {
                Some(site) => sites.push(site),
                None => debug!(index, "skipping catalog feature without coordinates"),
            }
        }

        Ok(Self { sites })
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn get(&self, id: &str) -> Result<&Site, CatalogError> {
        self.sites
            .iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| CatalogError::UnknownSite(id.to_string()))
    }

    /// Closest site whose coordinates are within `tolerance` degrees on both
    /// axes of `at`.
    pub fn nearest(&self, at: Location, tolerance: f64) -> Option<&Site> {
        self.sites
            .iter()
            .filter(|s| {
                let loc = s.location();
                (loc.lat - at.lat).abs() < tolerance && (loc.lon - at.lon).abs() < tolerance
            })
            .min_by(|a, b| {
                distance2(a.location(), at).total_cmp(&distance2(b.location(), at))
            })
    }
}

fn distance2(a: Location, b: Location) -> f64 {
    (a.lat - b.lat).powi(2) + (a.lon - b.lon).powi(2)
}

fn site_from_feature(index: usize, feature: Feature) -> Option<Site> {
    let mut props = feature.properties.unwrap_or_default();

    let from_props = match (
        props.get("lat").and_then(as_number),
        props.get("lng").and_then(as_number),
    ) {
        (Some(lat), Some(lon)) => Some(Location::new(lat, lon)),
        _ => None,
    };
    let location = from_props.or_else(|| feature.geometry.as_ref().and_then(Geometry::point))?;

    let text = |key: &str| props.get(key).and_then(text_or_number);
    let name = text("name");
    let id = text("id")
        .or_else(|| name.as_deref().map(slug).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| format!("site-{index}"));

    let info = SiteInfo {
        name: name.unwrap_or_else(|| id.clone()),
        id,
        company: text("company"),
        city: text("city"),
        state: text("state"),
        power_mw: text("power_mw"),
        tier: text("tier"),
        location,
    };

    Some(Site {
        info,
        analysis: props.remove("analysis"),
    })
}

fn text_or_number(v: &Value) -> Option<String> {
    match v {
        Value::Number(n) => Some(n.to_string()),
        other => as_text(other),
    }
}

/// Lowercase slug: runs of non-alphanumerics collapse to `-`, trimmed.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}
