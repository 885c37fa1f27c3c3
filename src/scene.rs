//! Scene – a serde-described map (view + styled vector layers) and a
//! software rasterizer implementing [`MapRenderer`].
//!
//! This is the stand-in for the live rendering engine: the CLI loads a
//! scene file, and the end-to-end tests drive the real pipeline through
//! it without any tile or GPU backend.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::Cause;
use crate::snapshot::MapRenderer;
use crate::view::{Extent, LayerInfo, MapView, Rgb8};

/// A complete renderable map description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub view: MapView,
    #[serde(default = "default_background")]
    pub background: Rgb8,
    #[serde(default)]
    pub layers: Vec<SceneLayer>,
}

fn default_background() -> Rgb8 {
    // Pale water blue, matching the viewer's default base map tone.
    Rgb8(214, 228, 238)
}

/// One styled vector layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneLayer {
    pub name: String,
    pub color: Rgb8,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub geometry: Vec<Geometry>,
}

fn default_visible() -> bool {
    true
}

/// Drawable geometry in projected map coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    /// A closed ring; filled.
    Polygon { ring: Vec<[f64; 2]> },
    /// An open polyline; stroked one pixel wide.
    Line { points: Vec<[f64; 2]> },
    /// A single marker; drawn as a small filled square.
    Point { at: [f64; 2] },
}

impl Scene {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The layer list as the legend consumes it, in draw order.
    pub fn layer_infos(&self) -> Vec<LayerInfo> {
        self.layers
            .iter()
            .map(|l| LayerInfo {
                name: l.name.clone(),
                color: l.color,
                visible: l.visible,
            })
            .collect()
    }
}

/// Software renderer over a [`Scene`]. Holds a mutable output size like a
/// real render target; rendering rasterizes whatever extent is asked for.
pub struct SceneRenderer {
    scene: Scene,
    size: (u32, u32),
}

impl SceneRenderer {
    /// `width`/`height` is the "screen" size the renderer starts at, the
    /// size an export must restore afterwards.
    pub fn new(scene: Scene, width: u32, height: u32) -> Self {
        Self {
            scene,
            size: (width, height),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

impl MapRenderer for SceneRenderer {
    fn output_size(&self) -> (u32, u32) {
        self.size
    }

    fn set_output_size(&mut self, width: u32, height: u32) -> Result<(), Cause> {
        if width == 0 || height == 0 {
            return Err(format!("render target size must be positive, got {width}x{height}").into());
        }
        self.size = (width, height);
        Ok(())
    }

    fn render(&mut self, extent: &Extent) -> Result<RgbaImage, Cause> {
        if extent.is_empty() {
            return Err("render extent is empty".into());
        }
        let (w, h) = self.size;
        let bg = self.scene.background;
        let mut img = RgbaImage::from_pixel(w, h, Rgba([bg.0, bg.1, bg.2, 255]));

        let raster = Raster {
            extent: *extent,
            w,
            h,
        };
        for layer in self.scene.layers.iter().filter(|l| l.visible) {
            let c = Rgba([layer.color.0, layer.color.1, layer.color.2, 255]);
            for geom in &layer.geometry {
                match geom {
                    Geometry::Polygon { ring } => raster.fill_polygon(&mut img, ring, c),
                    Geometry::Line { points } => raster.stroke_polyline(&mut img, points, c),
                    Geometry::Point { at } => raster.fill_marker(&mut img, *at, c),
                }
            }
        }
        Ok(img)
    }
}

/// Map-units → pixel projection for one render call.
struct Raster {
    extent: Extent,
    w: u32,
    h: u32,
}

impl Raster {
    fn to_px(&self, x: f64, y: f64) -> (f64, f64) {
        let px = (x - self.extent.min_x) / self.extent.width() * self.w as f64;
        let py = (self.extent.max_y - y) / self.extent.height() * self.h as f64;
        (px, py)
    }

    fn put(&self, img: &mut RgbaImage, px: i64, py: i64, c: Rgba<u8>) {
        if px >= 0 && py >= 0 && (px as u32) < self.w && (py as u32) < self.h {
            img.put_pixel(px as u32, py as u32, c);
        }
    }

    /// Even-odd scanline fill over the ring's edges.
    fn fill_polygon(&self, img: &mut RgbaImage, ring: &[[f64; 2]], c: Rgba<u8>) {
        if ring.len() < 3 {
            return;
        }
        let pts: Vec<(f64, f64)> = ring.iter().map(|p| self.to_px(p[0], p[1])).collect();

        for row in 0..self.h {
            let scan_y = row as f64 + 0.5;
            let mut crossings = Vec::new();
            for i in 0..pts.len() {
                let (x1, y1) = pts[i];
                let (x2, y2) = pts[(i + 1) % pts.len()];
                if (y1 <= scan_y && y2 > scan_y) || (y2 <= scan_y && y1 > scan_y) {
                    let t = (scan_y - y1) / (y2 - y1);
                    crossings.push(x1 + t * (x2 - x1));
                }
            }
            crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            for pair in crossings.chunks_exact(2) {
                let start = pair[0].max(0.0).floor() as i64;
                let end = pair[1].min(self.w as f64).ceil() as i64;
                for px in start..end {
                    self.put(img, px, row as i64, c);
                }
            }
        }
    }

    /// DDA stroke, one pixel per step along the longer axis.
    fn stroke_polyline(&self, img: &mut RgbaImage, points: &[[f64; 2]], c: Rgba<u8>) {
        for seg in points.windows(2) {
            let (x1, y1) = self.to_px(seg[0][0], seg[0][1]);
            let (x2, y2) = self.to_px(seg[1][0], seg[1][1]);
            let steps = (x2 - x1).abs().max((y2 - y1).abs()).ceil().max(1.0);
            for i in 0..=steps as i64 {
                let t = i as f64 / steps;
                let px = (x1 + t * (x2 - x1)).round() as i64;
                let py = (y1 + t * (y2 - y1)).round() as i64;
                self.put(img, px, py, c);
            }
        }
    }

    fn fill_marker(&self, img: &mut RgbaImage, at: [f64; 2], c: Rgba<u8>) {
        let (px, py) = self.to_px(at[0], at[1]);
        let (px, py) = (px.round() as i64, py.round() as i64);
        for dy in -2..=2 {
            for dx in -2..=2 {
                self.put(img, px + dx, py + dy, c);
            }
        }
    }
}
