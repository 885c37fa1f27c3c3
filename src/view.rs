//! Map view model – the slice of map state the exporter consumes: a
//! projected extent, a center + resolution view, and the visible layer
//! list that feeds the legend.

use serde::{Deserialize, Serialize};

/// A rectangular extent in projected map units (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
}

/// The live map's view state: where it is looking and how zoomed it is.
///
/// `resolution` is map units per screen pixel, the same convention the
/// rendering engine uses internally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center_x: f64,
    pub center_y: f64,
    pub resolution: f64,
}

impl MapView {
    /// Ground extent covered when this view is rendered at `px_w` × `px_h`,
    /// keeping the view center fixed.
    pub fn extent_for(&self, px_w: u32, px_h: u32) -> Extent {
        let half_w = self.resolution * px_w as f64 / 2.0;
        let half_h = self.resolution * px_h as f64 / 2.0;
        Extent::new(
            self.center_x - half_w,
            self.center_y - half_h,
            self.center_x + half_w,
            self.center_y + half_h,
        )
    }

    /// Scale denominator at `dpi`: map meters represented by one paper
    /// meter. One inch of paper holds `dpi` pixels, each `resolution`
    /// meters of ground.
    pub fn scale_denominator(&self, dpi: f64) -> f64 {
        self.resolution * dpi / 0.0254
    }
}

/// An RGB color, 0–255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb8(pub u8, pub u8, pub u8);

impl Rgb8 {
    /// Channels as 0.0–1.0 floats, the range printpdf expects.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

/// What the legend needs to know about one map layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub name: String,
    pub color: Rgb8,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}
