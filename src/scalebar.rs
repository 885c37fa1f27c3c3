//! Scale indicator – picks a round ground distance that fits a maximum
//! paper width and reports how wide to draw it.

/// A resolved scale bar: a round ground distance and its width on paper.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBar {
    /// Ground distance the bar represents, in meters.
    pub ground_m: f64,
    /// Width of the bar on the page, in points.
    pub width_pt: f64,
    /// Label text, e.g. "500 m" or "2 km".
    pub label: String,
    /// Scale denominator of the export (1 : N).
    pub denominator: f64,
}

/// Compute a scale bar for an export.
///
/// `meters_per_pt` is the ground distance covered by one point of paper;
/// `max_width_pt` caps the drawn bar. The ground distance is snapped down
/// to a 1/2/5 × 10^n value so the label is a round number.
pub fn compute_scale_bar(meters_per_pt: f64, max_width_pt: f64) -> Option<ScaleBar> {
    if !(meters_per_pt > 0.0) || !(max_width_pt > 0.0) {
        return None;
    }

    let max_ground = meters_per_pt * max_width_pt;
    let magnitude = 10f64.powf(max_ground.log10().floor());
    let normalized = max_ground / magnitude;
    let factor = if normalized >= 5.0 {
        5.0
    } else if normalized >= 2.0 {
        2.0
    } else {
        1.0
    };
    let ground_m = factor * magnitude;

    let label = if ground_m >= 1000.0 {
        format!("{} km", trim_float(ground_m / 1000.0))
    } else {
        format!("{} m", trim_float(ground_m))
    };

    // One point of paper is 0.0254/72 meters; denominator = ground meters
    // per paper meter.
    let denominator = meters_per_pt * 72.0 / 0.0254;

    Some(ScaleBar {
        ground_m,
        width_pt: ground_m / meters_per_pt,
        label,
        denominator,
    })
}

fn trim_float(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}
