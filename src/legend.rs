//! Legend – one swatch + name per visible layer, in layer order.

use crate::view::{LayerInfo, Rgb8};

/// One legend row.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub name: String,
    pub color: Rgb8,
}

/// Swatch square side in points.
pub const SWATCH_PT: f64 = 10.0;
/// Vertical spacing between legend rows in points.
pub const ROW_PT: f64 = 16.0;

/// Collect the legend entries for the visible layers. An empty result is
/// valid; hidden layers never appear.
pub fn collect_entries(layers: &[LayerInfo]) -> Vec<LegendEntry> {
    layers
        .iter()
        .filter(|l| l.visible)
        .map(|l| LegendEntry {
            name: l.name.clone(),
            color: l.color,
        })
        .collect()
}

/// Height of the drawn legend block in points.
pub fn block_height_pt(entries: &[LegendEntry]) -> f64 {
    entries.len() as f64 * ROW_PT
}
