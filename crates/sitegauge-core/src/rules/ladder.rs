//! Threshold ladders used when a source omits a label.
//!
//! Every ladder is keyed on a single resolved number and uses inclusive lower
//! bounds, checked from the top rung down:
//!
//!   solar GHI (kWh/m²/yr)   2000 A+ | 1800 A | 1600 B | 1400 C | else D
//!   wind power density      600 A+ | 400 A | 300 B | 200 C | 100 D | else F
//!   suitability score       75 PREMIUM SITE | 60 OPTIMAL | 45 VIABLE | else CHALLENGING
//!   water composite score   60 good | 30 moderate | else water-stressed

/// A letter grade with its human-readable description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub grade: &'static str,
    pub label: &'static str,
}

const fn grade(grade: &'static str, label: &'static str) -> Grade {
    Grade { grade, label }
}

pub fn solar_grade(ghi: f64) -> Grade {
    if ghi >= 2000.0 {
        grade("A+", "World-class irradiance")
    } else if ghi >= 1800.0 {
        grade("A", "Excellent solar resource")
    } else if ghi >= 1600.0 {
        grade("B", "Good commercial viability")
    } else if ghi >= 1400.0 {
        grade("C", "Moderate resource")
    } else {
        grade("D", "Marginal resource")
    }
}

/// Grade by mean power density at hub height (W/m²).
pub fn wind_grade(power_density: f64) -> Grade {
    if power_density >= 600.0 {
        grade("A+", "World-class resource")
    } else if power_density >= 400.0 {
        grade("A", "Outstanding potential")
    } else if power_density >= 300.0 {
        grade("B", "Commercial viability")
    } else if power_density >= 200.0 {
        grade("C", "Moderate resource")
    } else if power_density >= 100.0 {
        grade("D", "Marginal suitability")
    } else {
        grade("F", "Unsuitable")
    }
}

pub fn suitability_rating(overall_score: f64) -> &'static str {
    if overall_score >= 75.0 {
        "PREMIUM SITE"
    } else if overall_score >= 60.0 {
        "OPTIMAL"
    } else if overall_score >= 45.0 {
        "VIABLE"
    } else {
        "CHALLENGING"
    }
}

pub fn water_interpretation(composite_score: f64) -> &'static str {
    if composite_score >= 60.0 {
        "Good water availability"
    } else if composite_score >= 30.0 {
        "Moderate water availability"
    } else {
        "Water-stressed region"
    }
}

/// Turbines are considered buildable on smooth, gentle terrain only.
pub fn feasibility_status(rix: f64, slope: f64) -> &'static str {
    if rix < 0.5 && slope < 20.0 {
        "Feasible"
    } else {
        "Challenging"
    }
}
