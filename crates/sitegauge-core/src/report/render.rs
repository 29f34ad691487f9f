use serde_json::Value;

use crate::TOOL_NAME;
use crate::report::model::SiteReport;
use crate::weather::mean_hub_speed;

pub fn render_text(report: &SiteReport) -> String {
    let a = &report.analysis;
    let mut out = String::new();

    out.push_str(&format!("{} {}\n", TOOL_NAME, report.tool.version));
    if let Some(site) = &report.site {
        out.push_str(&format!("Site: {} ({})\n", site.name, site.id));
        if let Some(company) = &site.company {
            out.push_str(&format!("Operator: {company}\n"));
        }
    }
    out.push_str(&format!(
        "Location: {:.4}, {:.4}\n",
        a.location.lat, a.location.lon
    ));
    out.push_str(&format!(
        "Source: {:?}  [{}:{}]\n",
        report.source.kind,
        report.source.document.algorithm,
        short(&report.source.document.value)
    ));
    out.push_str(&format!("Assessed: {}\n", a.timestamp));

    let s = &a.suitability;
    out.push_str("\n== Suitability ==\n");
    out.push_str(&format!(
        "Overall: {:.1}  {}\n",
        s.overall_score, s.rating
    ));
    out.push_str(&format!(
        "Components: solar {:.1} | wind {:.1} | water {:.1}\n",
        s.components.solar, s.components.wind, s.components.water
    ));
    for line in &s.insights {
        out.push_str(&format!("  - {line}\n"));
    }

    let w = &a.wind;
    out.push_str("\n== Wind ==\n");
    out.push_str(&format!(
        "Grade: {} ({})  score {:.1}\n",
        w.resource.grade, w.resource.label, w.score
    ));
    out.push_str(&format!(
        "Speed {:.2} m/s | Power density {:.1} W/m² | Air density {:.3} kg/m³\n",
        w.resource.wind_speed, w.resource.power_density, w.resource.air_density
    ));
    out.push_str(&format!(
        "Terrain: RIX {:.2}, slope {:.1}°, elevation {:.0} m  -> {}\n",
        w.feasibility.rix, w.feasibility.slope, w.feasibility.elevation, w.feasibility.status
    ));
    if !w.turbine.best_fit.is_empty() {
        out.push_str(&format!("Turbine: {}\n", w.turbine.best_fit));
    }
    out.push_str(&format!(
        "Capacity factors: IEC1 {:.3} | IEC2 {:.3} | IEC3 {:.3}\n",
        w.turbine.cf_iec1, w.turbine.cf_iec2, w.turbine.cf_iec3
    ));

    let sol = &a.solar;
    out.push_str("\n== Solar ==\n");
    out.push_str(&format!(
        "Grade: {} ({})  score {:.1}\n",
        sol.resource.grade, sol.resource.label, sol.score
    ));
    out.push_str(&format!(
        "GHI {:.0} | DNI {:.0} | DIF {:.0} kWh/m²/yr | PVOUT {:.0} kWh/kWp/yr | LTDI {:.2}\n",
        sol.resource.ghi, sol.resource.dni, sol.resource.dif, sol.resource.pvout, sol.resource.ltdi
    ));

    let h = &a.water;
    out.push_str("\n== Hydrology ==\n");
    out.push_str(&format!(
        "{}  (composite {:.1})\n",
        h.interpretation, h.composite_risk_score
    ));
    out.push_str(&format!(
        "GRACE anomaly {:+.2} cm | PDSI {:+.2}\n",
        h.grace_anomaly, h.pdsi
    ));

    out.push_str("\n== Infrastructure ==\n");
    let infra = infrastructure_lines(h.extra.get("infrastructure"), h.extra.get("admin"));
    if infra.is_empty() {
        out.push_str("No infrastructure data\n");
    }
    for line in infra {
        out.push_str(&line);
        out.push('\n');
    }

    if let Some(live) = &report.live {
        out.push_str("\n== Live Weather ==\n");
        if report.source.weather_fallback {
            out.push_str("(unavailable, showing neutral values)\n");
        }
        out.push_str(&format!(
            "Wind 80/120/180 m: {:.1} / {:.1} / {:.1} m/s (mean {:.1})\n",
            live.wind_speed_80m,
            live.wind_speed_120m,
            live.wind_speed_180m,
            mean_hub_speed(live)
        ));
        out.push_str(&format!(
            "Direction 80/120/180 m: {:.0}° / {:.0}° / {:.0}°\n",
            live.wind_direction_80m, live.wind_direction_120m, live.wind_direction_180m
        ));
        out.push_str(&format!(
            "Temp@120m {:.1} °C | Feels {:.1} °C | Air density {:.3} | MSLP {:.1} hPa\n",
            live.temperature_120m, live.apparent_temp, live.air_density_120m, live.pressure_msl
        ));
        out.push_str(&format!(
            "Humidity {:.0}% | Precip {:.1} mm | Cloud {:.0}% | Visibility {:.1} km\n",
            live.humidity, live.precipitation, live.cloud_cover, live.visibility
        ));
    }

    out
}

fn short(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

fn infrastructure_lines(infra: Option<&Value>, admin: Option<&Value>) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(infra) = infra.filter(|v| v.is_object()) {
        let name = infra.get("name").and_then(Value::as_str).unwrap_or("unnamed asset");
        match infra.get("dist_km").and_then(Value::as_f64) {
            Some(d) => lines.push(format!("Nearest grid asset: {name} ({d:.1} km)")),
            None => lines.push(format!("Nearest grid asset: {name}")),
        }
    }

    if let Some(admin) = admin.filter(|v| v.is_object()) {
        let block = admin.get("block").and_then(Value::as_str).unwrap_or("-");
        let category = admin.get("cat").and_then(Value::as_str).unwrap_or("-");
        let mut line = format!("Groundwater block: {block} [{category}]");
        if let Some(pct) = admin.get("extract_pct").and_then(Value::as_f64) {
            line.push_str(&format!(", extraction {pct:.0}%"));
        }
        lines.push(line);
    }

    lines
}
