//! Graticule grid – evenly spaced coordinate lines drawn over the map
//! image, with labels at the line positions.
//!
//! The interval is snapped to a 1/2/5 × 10^n progression so labels come
//! out as round numbers regardless of zoom level.

use crate::view::Extent;

/// A single grid line in map coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    /// The constant coordinate of the line (x for vertical, y for horizontal).
    pub position: f64,
    pub label: String,
}

/// The grid to overlay on one export: the chosen interval plus every line
/// falling inside the extent.
#[derive(Debug, Clone, PartialEq)]
pub struct Graticule {
    pub interval: f64,
    pub verticals: Vec<GridLine>,
    pub horizontals: Vec<GridLine>,
}

/// Target number of lines across the larger extent axis.
const TARGET_LINES: f64 = 6.0;

/// Snap `raw` up to the nearest 1, 2 or 5 × 10^n.
fn nice_interval(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.abs().log10().floor());
    let normalized = raw / magnitude;
    let factor = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

fn label_for(value: f64, interval: f64) -> String {
    if interval >= 1.0 {
        format!("{value:.0}")
    } else {
        // Sub-meter intervals only occur at extreme zoom; one decimal is
        // enough to keep adjacent labels distinct.
        format!("{value:.1}")
    }
}

/// Compute the graticule for `extent`.
///
/// Returns `None` when the extent is degenerate (no positive span to
/// subdivide); a valid extent always yields at least the interval, even if
/// no line happens to fall inside it.
pub fn compute_graticule(extent: &Extent) -> Option<Graticule> {
    if extent.is_empty() || !extent.width().is_finite() || !extent.height().is_finite() {
        return None;
    }

    let span = extent.width().max(extent.height());
    let interval = nice_interval(span / TARGET_LINES);

    Some(Graticule {
        interval,
        verticals: lines_between(extent.min_x, extent.max_x, interval),
        horizontals: lines_between(extent.min_y, extent.max_y, interval),
    })
}

/// Every multiple of `interval` inside `[min, max]`.
///
/// Positions are derived from integer multiples rather than accumulated —
/// far from the origin, `interval` can be below one ulp of the coordinate
/// and `pos += interval` would never advance. The casts saturate for
/// extents beyond i64 range, where the bounds filter discards the lone
/// out-of-range candidate.
fn lines_between(min: f64, max: f64, interval: f64) -> Vec<GridLine> {
    let k_min = (min / interval).ceil() as i64;
    let k_max = (max / interval).floor() as i64;
    (k_min..=k_max)
        .map(|k| k as f64 * interval)
        .filter(|&pos| pos >= min && pos <= max)
        .map(|pos| GridLine {
            position: pos,
            label: label_for(pos, interval),
        })
        .collect()
}
