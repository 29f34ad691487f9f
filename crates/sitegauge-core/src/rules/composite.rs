//! Composite site suitability.
//!
//! Solar and wind each carry 35% of the overall score and water availability
//! the remaining 30%. All three inputs are on a 0–100 scale; a higher water
//! composite means more water, not more risk.

pub const SOLAR_WEIGHT: f64 = 0.35;
pub const WIND_WEIGHT: f64 = 0.35;
pub const WATER_WEIGHT: f64 = 0.30;

/// Weighted overall score rounded to one decimal.
pub fn composite_score(solar: f64, wind: f64, water: f64) -> f64 {
    round1(solar * SOLAR_WEIGHT + wind * WIND_WEIGHT + water * WATER_WEIGHT)
}

/// Rounds half away from zero to one decimal place.
///
/// Magnitudes of 1e15 and above have no fractional digit left to round and
/// are returned unscaled; an overflowed sum saturates to the largest finite
/// value.
pub fn round1(v: f64) -> f64 {
    round_to(v, 10.0)
}

/// Rounds to `1 / scale`. The result is finite whenever `v` is not NaN.
pub fn round_to(v: f64, scale: f64) -> f64 {
    if !v.is_finite() {
        return v.clamp(f64::MIN, f64::MAX);
    }
    if v.abs() >= 1e15 {
        return v;
    }
    (v * scale).round() / scale
}

/// Returns a stored overall score if it is usable.
///
/// A stored `0` is indistinguishable from "not computed" in catalog data, so
/// only strictly positive scores are honoured.
pub fn stored_overall_score(stored: Option<f64>) -> Option<f64> {
    stored.filter(|s| s.is_finite() && *s > 0.0)
}
