/// Inputs for site-level narrative insights.
#[derive(Debug, Clone, Default)]
pub struct InsightInputs<'a> {
    pub wind_score: f64,
    pub solar_score: f64,
    pub water_score: f64,
    /// Nearest grid asset and its distance, when known.
    pub grid_asset: Option<(&'a str, f64)>,
    pub slope_deg: f64,
}

/// Derives the suitability insights shown when the source supplies none.
///
/// At most one archetype line is emitted; water, grid and terrain lines are
/// independent of it and of each other.
pub fn site_insights(inputs: &InsightInputs<'_>) -> Vec<String> {
    let mut out = Vec::new();

    let (w, s) = (inputs.wind_score, inputs.solar_score);
    if w > 60.0 && s > 60.0 {
        out.push("Prime Hybrid Site: Exceptional co-location potential for Wind & Solar.".into());
    } else if w > 70.0 {
        out.push(
            "Wind-Dominant: World-class wind resource detected; prioritize high-hub turbines."
                .into(),
        );
    } else if s > 70.0 {
        out.push(
            "Solar-Dominant: Optimal GHI and sky clarity; ideal for large-scale PV tracking."
                .into(),
        );
    }

    if inputs.water_score < 30.0 {
        out.push(
            "Critical Resource Sync: Severe water stress detected. Air-cooling or dry-cleaning systems recommended."
                .into(),
        );
    } else if inputs.water_score > 70.0 {
        out.push("Hydrological Buffer: Abundant surface/ground water resources available.".into());
    }

    if let Some((name, dist_km)) = inputs.grid_asset {
        if dist_km < 10.0 {
            out.push(format!(
                "Grid Advantage: Proximity to {name} ({dist_km}km) reduces interconnection CAPEX."
            ));
        }
    }

    if inputs.slope_deg > 15.0 {
        out.push(
            "Logistical Note: Steep terrain identified. Civil works may require reinforced foundations."
                .into(),
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes(lines: &[String]) -> Vec<&str> {
        lines
            .iter()
            .map(|l| l.split(':').next().unwrap_or(""))
            .collect()
    }

    #[test]
    fn hybrid_archetype_takes_precedence() {
        let lines = site_insights(&InsightInputs {
            wind_score: 80.0,
            solar_score: 65.0,
            water_score: 50.0,
            ..Default::default()
        });
        assert_eq!(prefixes(&lines), vec!["Prime Hybrid Site"]);
    }

    #[test]
    fn single_resource_archetypes() {
        let wind = site_insights(&InsightInputs {
            wind_score: 71.0,
            solar_score: 10.0,
            water_score: 50.0,
            ..Default::default()
        });
        assert_eq!(prefixes(&wind), vec!["Wind-Dominant"]);

        let solar = site_insights(&InsightInputs {
            wind_score: 10.0,
            solar_score: 71.0,
            water_score: 50.0,
            ..Default::default()
        });
        assert_eq!(prefixes(&solar), vec!["Solar-Dominant"]);
    }

    #[test]
    fn water_grid_and_terrain_lines() {
        let lines = site_insights(&InsightInputs {
            wind_score: 0.0,
            solar_score: 0.0,
            water_score: 12.0,
            grid_asset: Some(("Koyna HEP", 4.5)),
            slope_deg: 18.0,
        });
        assert_eq!(
            prefixes(&lines),
            vec!["Critical Resource Sync", "Grid Advantage", "Logistical Note"]
        );
        assert!(lines[1].contains("Koyna HEP (4.5km)"));
    }

    #[test]
    fn distant_grid_asset_is_not_mentioned() {
        let lines = site_insights(&InsightInputs {
            water_score: 75.0,
            grid_asset: Some(("Far Substation", 42.0)),
            ..Default::default()
        });
        assert_eq!(prefixes(&lines), vec!["Hydrological Buffer"]);
    }
}
