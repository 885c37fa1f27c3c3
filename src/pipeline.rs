//! Pipeline – runs an export through its fixed stage sequence
//! INIT → PAPER → EXTENT → GRID → RENDER_MAP → SCALE → LEGENDS → BUILD
//! and ties paper resolution, snapshot capture, composition, and emission
//! into a single call.
//!
//! No stage is skipped or retried, there is no backward transition, and
//! the first fault aborts everything after it. A failed export restarts
//! from INIT; no partial document is ever returned.

use serde::{Deserialize, Serialize};

use crate::compose::{compose_page, PageContent};
use crate::emit;
use crate::error::{ExportError, ExportStage};
use crate::grid::{compute_graticule, Graticule};
use crate::legend::{self, LegendEntry};
use crate::paper::{Margins, Orientation, PageGeometry, PaperFormat};
use crate::scalebar::compute_scale_bar;
use crate::snapshot::{capture, MapRenderer};
use crate::view::{LayerInfo, MapView};

/// Everything one export action needs. Constructed fresh per export and
/// discarded once the document is returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub format: PaperFormat,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default = "default_dpi")]
    pub dpi: f64,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_true")]
    pub show_grid: bool,
    #[serde(default = "default_true")]
    pub include_legend: bool,
}

fn default_dpi() -> f64 {
    150.0
}

fn default_title() -> String {
    "Mapa".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            format: PaperFormat::A4,
            orientation: Orientation::Vertical,
            margins: Margins::default(),
            dpi: default_dpi(),
            title: default_title(),
            author: String::new(),
            show_grid: true,
            include_legend: true,
        }
    }
}

impl ExportRequest {
    /// A4 landscape with the remaining defaults.
    pub fn a4_horizontal() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            ..Self::default()
        }
    }
}

/// Fraction of the content width the scale bar may occupy.
const SCALE_BAR_MAX_FRACTION: f64 = 1.0 / 3.0;

/// Run the full export pipeline against a live renderer.
///
/// `layers` is the map's layer list in draw order; only visible layers
/// reach the legend. At most one export may be in flight per renderer —
/// the capture stage resizes the shared render target (the `&mut` borrow
/// enforces this within a thread).
pub fn export_map(
    renderer: &mut dyn MapRenderer,
    view: &MapView,
    layers: &[LayerInfo],
    request: &ExportRequest,
) -> Result<Vec<u8>, ExportError> {
    // INIT: the request and view must be coherent before any geometry work.
    enter(ExportStage::Init);
    validate_request(view, request)?;

    // PAPER: named format + orientation + margins → content rectangle.
    enter(ExportStage::Paper);
    let geom = PageGeometry::resolve(
        request.format,
        request.orientation,
        request.margins,
        request.dpi,
    )?;

    // EXTENT: ground rectangle the content pixels will cover.
    enter(ExportStage::Extent);
    let extent = view.extent_for(geom.content_w_px, geom.content_h_px);
    if extent.is_empty() {
        return Err(ExportError::new(
            ExportStage::Extent,
            format!(
                "view produced an empty export extent ({} x {} map units)",
                extent.width(),
                extent.height()
            ),
        ));
    }

    // GRID: graticule lines, when requested.
    enter(ExportStage::Grid);
    let graticule: Option<Graticule> = if request.show_grid {
        Some(compute_graticule(&extent).ok_or_else(|| {
            ExportError::new(ExportStage::Grid, "extent too degenerate for a graticule")
        })?)
    } else {
        None
    };

    // RENDER_MAP: freeze the live map at the content pixel size.
    enter(ExportStage::RenderMap);
    let snapshot =
        capture(renderer, &extent, geom.content_w_px, geom.content_h_px).map_err(|cause| {
            ExportError::with_cause(ExportStage::RenderMap, "map snapshot failed", cause)
        })?;

    // SCALE: bar sized against ground meters per paper point.
    enter(ExportStage::Scale);
    let meters_per_pt = view.resolution * request.dpi / 72.0;
    let scale_bar = compute_scale_bar(meters_per_pt, geom.content_w_pt * SCALE_BAR_MAX_FRACTION)
        .ok_or_else(|| {
            ExportError::new(
                ExportStage::Scale,
                format!(
                    "cannot derive a scale bar from resolution {}",
                    view.resolution
                ),
            )
        })?;
    log::debug!("export scale 1:{:.0}", view.scale_denominator(request.dpi));

    // LEGENDS: swatches for the visible layers, when requested.
    enter(ExportStage::Legends);
    let legend: Vec<LegendEntry> = if request.include_legend {
        legend::collect_entries(layers)
    } else {
        Vec::new()
    };

    // BUILD: compose the page and serialize the document.
    enter(ExportStage::Build);
    let png = emit::encode_png(&snapshot).map_err(|cause| {
        ExportError::with_cause(ExportStage::Build, "snapshot encoding failed", cause)
    })?;
    let bytes = emit::emit_pdf(&request.title, &geom, &png, |map_image| {
        compose_page(&PageContent {
            geometry: &geom,
            map_image,
            map_extent: &extent,
            graticule: graticule.as_ref(),
            scale_bar: Some(&scale_bar),
            legend: &legend,
            title: &request.title,
            author: &request.author,
        })
    })
    .map_err(|cause| {
        ExportError::with_cause(ExportStage::Build, "document serialization failed", cause)
    })?;

    log::info!(
        "export complete: {} bytes, {:?} {:?} at {} dpi",
        bytes.len(),
        request.format,
        request.orientation,
        request.dpi
    );
    Ok(bytes)
}

fn enter(stage: ExportStage) {
    log::debug!("export stage {stage}");
}

fn validate_request(view: &MapView, request: &ExportRequest) -> Result<(), ExportError> {
    let bad = |message: String| Err(ExportError::new(ExportStage::Init, message));

    if !request.dpi.is_finite() || request.dpi <= 0.0 {
        return bad(format!("dpi must be positive, got {}", request.dpi));
    }
    let m = request.margins;
    for (side, v) in [
        ("top", m.top),
        ("right", m.right),
        ("bottom", m.bottom),
        ("left", m.left),
    ] {
        if !v.is_finite() || v < 0.0 {
            return bad(format!(
                "margin {side} must be finite and non-negative, got {v}"
            ));
        }
    }
    if !view.resolution.is_finite() || view.resolution <= 0.0 {
        return bad(format!(
            "view resolution must be positive, got {}",
            view.resolution
        ));
    }
    if !view.center_x.is_finite() || !view.center_y.is_finite() {
        return bad("view center must be finite".to_string());
    }
    Ok(())
}
