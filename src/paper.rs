//! Paper geometry – named formats, orientation, margins, and the
//! point ↔ pixel conversions used by the rest of the pipeline.
//!
//! All paper arithmetic happens in PDF points (1 pt = 1/72 inch); pixel
//! sizes are derived from points at the export DPI and only exist so the
//! snapshot capturer knows how large a raster to ask for.

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportStage};

const POINTS_PER_INCH: f64 = 72.0;

/// Supported paper formats with their portrait dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperFormat {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PaperFormat {
    /// Portrait width/height in points, from the static format table.
    pub fn dimensions_pt(self) -> (f64, f64) {
        match self {
            // A4: 210 × 297 mm
            PaperFormat::A4 => (595.28, 841.89),
            PaperFormat::Letter => (612.0, 792.0),
            PaperFormat::Legal => (612.0, 1008.0),
        }
    }

    /// Parse a format name as it appears in scene files and CLI flags.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Some(PaperFormat::A4),
            "letter" | "carta" => Some(PaperFormat::Letter),
            "legal" | "oficio" => Some(PaperFormat::Legal),
            _ => None,
        }
    }
}

/// Page orientation; `Horizontal` swaps the format's width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Page margins in points, supplied by the caller per export request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub fn uniform(pt: f64) -> Self {
        Self {
            top: pt,
            right: pt,
            bottom: pt,
            left: pt,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(20.0)
    }
}

/// Convert a pixel count at `dpi` into points.
pub fn px_to_pt(px: f64, dpi: f64) -> f64 {
    px * POINTS_PER_INCH / dpi
}

/// Convert points into pixels at `dpi`.
pub fn pt_to_px(pt: f64, dpi: f64) -> f64 {
    pt * dpi / POINTS_PER_INCH
}

/// The resolved geometry of one export: full page size and the content
/// rectangle left after subtracting margins, in points and in pixels at
/// the export DPI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_w_pt: f64,
    pub page_h_pt: f64,
    pub margins: Margins,
    pub dpi: f64,
    pub content_w_pt: f64,
    pub content_h_pt: f64,
    pub content_w_px: u32,
    pub content_h_px: u32,
}

impl PageGeometry {
    /// Resolve format + orientation + margins + DPI into a page geometry.
    ///
    /// Fails with a PAPER-stage configuration error when the margins leave
    /// no positive content area; callers must not proceed to capture after
    /// a rejection here.
    pub fn resolve(
        format: PaperFormat,
        orientation: Orientation,
        margins: Margins,
        dpi: f64,
    ) -> Result<Self, ExportError> {
        let (w, h) = format.dimensions_pt();
        let (page_w_pt, page_h_pt) = match orientation {
            Orientation::Vertical => (w, h),
            Orientation::Horizontal => (h, w),
        };

        let content_w_pt = page_w_pt - margins.left - margins.right;
        let content_h_pt = page_h_pt - margins.top - margins.bottom;
        if content_w_pt <= 0.0 || content_h_pt <= 0.0 {
            return Err(ExportError::new(
                ExportStage::Paper,
                format!(
                    "margins leave no printable area on {format:?} \
                     ({page_w_pt:.0}x{page_h_pt:.0} pt): content would be \
                     {content_w_pt:.1}x{content_h_pt:.1} pt"
                ),
            ));
        }

        let content_w_px = pt_to_px(content_w_pt, dpi).round() as u32;
        let content_h_px = pt_to_px(content_h_pt, dpi).round() as u32;

        Ok(Self {
            page_w_pt,
            page_h_pt,
            margins,
            dpi,
            content_w_pt,
            content_h_pt,
            content_w_px,
            content_h_px,
        })
    }

    /// Top-left corner of the content rectangle, origin at page top-left.
    pub fn content_origin_pt(&self) -> (f64, f64) {
        (self.margins.left, self.margins.top)
    }
}
