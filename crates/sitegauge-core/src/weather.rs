//! Live hub-height weather for a site.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::analysis::raw::as_number;
use crate::analysis::resolve::DEFAULT_AIR_DENSITY;
use crate::rules::composite::{round_to, round1};

/// Mean sea-level pressure of the standard atmosphere, hPa.
pub const STANDARD_PRESSURE_HPA: f64 = 1013.0;

/// Specific gas constant for dry air, J/(kg·K).
const R_DRY_AIR: f64 = 287.05;

/// Current conditions as returned by the live-weather endpoint.
///
/// Speeds are m/s, directions degrees, temperatures °C, pressure hPa,
/// visibility km. Members missing from a response read as the values of
/// `LiveWeather::default()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveWeather {
    pub wind_speed_80m: f64,
    pub wind_speed_120m: f64,
    pub wind_speed_180m: f64,
    pub wind_direction_80m: f64,
    pub wind_direction_120m: f64,
    pub wind_direction_180m: f64,
    pub temperature_120m: f64,
    pub air_density_120m: f64,
    pub pressure_msl: f64,
    pub humidity: f64,
    pub precipitation: f64,
    pub cloud_cover: f64,
    pub visibility: f64,
    pub apparent_temp: f64,
}

/// The record substituted when live weather is unavailable: calm, standard
/// atmosphere.
impl Default for LiveWeather {
    fn default() -> Self {
        Self {
            wind_speed_80m: 0.0,
            wind_speed_120m: 0.0,
            wind_speed_180m: 0.0,
            wind_direction_80m: 0.0,
            wind_direction_120m: 0.0,
            wind_direction_180m: 0.0,
            temperature_120m: 0.0,
            air_density_120m: DEFAULT_AIR_DENSITY,
            pressure_msl: STANDARD_PRESSURE_HPA,
            humidity: 0.0,
            precipitation: 0.0,
            cloud_cover: 0.0,
            visibility: 0.0,
            apparent_temp: 0.0,
        }
    }
}

impl LiveWeather {
    /// Builds a record from a response body, member by member.
    ///
    /// When the body omits `air_density_120m` but carries both pressure and
    /// temperature, density is computed from them.
    pub fn from_value(v: &Value) -> Self {
        let d = Self::default();
        let get = |key: &str| v.get(key).and_then(as_number);

        let pressure = get("pressure_msl");
        let temperature = get("temperature_120m");
        let density = get("air_density_120m").or_else(|| match (pressure, temperature) {
            (Some(p), Some(t)) => Some(air_density(p, t)),
            _ => None,
        });

        Self {
            wind_speed_80m: get("wind_speed_80m").unwrap_or(d.wind_speed_80m),
            wind_speed_120m: get("wind_speed_120m").unwrap_or(d.wind_speed_120m),
            wind_speed_180m: get("wind_speed_180m").unwrap_or(d.wind_speed_180m),
            wind_direction_80m: get("wind_direction_80m").unwrap_or(d.wind_direction_80m),
            wind_direction_120m: get("wind_direction_120m").unwrap_or(d.wind_direction_120m),
            wind_direction_180m: get("wind_direction_180m").unwrap_or(d.wind_direction_180m),
            temperature_120m: temperature.unwrap_or(d.temperature_120m),
            air_density_120m: density.unwrap_or(d.air_density_120m),
            pressure_msl: pressure.unwrap_or(d.pressure_msl),
            humidity: get("humidity").unwrap_or(d.humidity),
            precipitation: get("precipitation").unwrap_or(d.precipitation),
            cloud_cover: get("cloud_cover").unwrap_or(d.cloud_cover),
            visibility: get("visibility").unwrap_or(d.visibility),
            apparent_temp: get("apparent_temp").unwrap_or(d.apparent_temp),
        }
    }
}

impl<'de> Deserialize<'de> for LiveWeather {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(Self::from_value(&v))
    }
}

/// Dry-air density from the ideal gas law, kg/m³, rounded to 3 decimals.
pub fn air_density(pressure_hpa: f64, temperature_c: f64) -> f64 {
    let kelvin = temperature_c + 273.15;
    if kelvin == 0.0 {
        return DEFAULT_AIR_DENSITY;
    }
    let rho = pressure_hpa / (R_DRY_AIR * kelvin) * 100.0;
    if !rho.is_finite() {
        return DEFAULT_AIR_DENSITY;
    }
    round_to(rho, 1000.0)
}

/// Mean of the three hub-height speeds, one decimal.
pub fn mean_hub_speed(w: &LiveWeather) -> f64 {
    round1(w.wind_speed_80m / 3.0 + w.wind_speed_120m / 3.0 + w.wind_speed_180m / 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_record_is_calm_standard_atmosphere() {
        let d = LiveWeather::default();
        assert_eq!(d.air_density_120m, 1.225);
        assert_eq!(d.pressure_msl, 1013.0);
        assert_eq!(d.wind_speed_120m, 0.0);
        assert_eq!(d.wind_direction_180m, 0.0);
        assert_eq!(d.visibility, 0.0);
    }

    #[test]
    fn partial_body_fills_from_default() {
        let w: LiveWeather = serde_json::from_value(json!({
            "wind_speed_120m": 7.4,
            "humidity": "61",
            "cloud_cover": null
        }))
        .unwrap();
        assert_eq!(w.wind_speed_120m, 7.4);
        assert_eq!(w.humidity, 61.0);
        assert_eq!(w.cloud_cover, 0.0);
        assert_eq!(w.pressure_msl, 1013.0);
        assert_eq!(w.air_density_120m, 1.225);
    }

    #[test]
    fn density_computed_from_pressure_and_temperature() {
        let w = LiveWeather::from_value(&json!({
            "pressure_msl": 1008.2,
            "temperature_120m": 29.4
        }));
        assert_eq!(w.air_density_120m, air_density(1008.2, 29.4));
        assert!((w.air_density_120m - 1.161).abs() < 0.001);
    }

    #[test]
    fn reported_density_is_kept() {
        let w = LiveWeather::from_value(&json!({
            "pressure_msl": 1008.2,
            "temperature_120m": 29.4,
            "air_density_120m": 1.17
        }));
        assert_eq!(w.air_density_120m, 1.17);
    }

    #[test]
    fn absolute_zero_guard() {
        assert_eq!(air_density(1013.0, -273.15), 1.225);
    }

    #[test]
    fn extreme_readings_stay_finite() {
        assert!(air_density(1e308, 15.0).is_finite());
        assert_eq!(air_density(1e308, -273.0), 1.225);

        let w = LiveWeather {
            wind_speed_80m: 1.7e308,
            wind_speed_120m: 1.7e308,
            wind_speed_180m: 1.7e308,
            ..Default::default()
        };
        assert!(mean_hub_speed(&w).is_finite());
    }

    #[test]
    fn mean_hub_speed_averages_three_heights() {
        let w = LiveWeather {
            wind_speed_80m: 6.0,
            wind_speed_120m: 7.0,
            wind_speed_180m: 8.5,
            ..Default::default()
        };
        assert_eq!(mean_hub_speed(&w), 7.2);
    }
}
