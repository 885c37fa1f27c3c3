//! Integration tests for the geoprint export pipeline.
//!
//! These tests validate:
//! - Paper geometry across every format/orientation
//! - Stage-tagged failure behavior (fault at stage N stops stages > N)
//! - End-to-end exports against the software scene renderer
//! - Scene files parse and feed the pipeline

use geoprint::error::{Cause, ExportStage};
use geoprint::paper::{px_to_pt, pt_to_px, Margins, Orientation, PageGeometry, PaperFormat};
use geoprint::pipeline::{export_map, ExportRequest};
use geoprint::scene::{Scene, SceneRenderer};
use geoprint::scenes;
use geoprint::snapshot::MapRenderer;
use geoprint::view::{Extent, LayerInfo, MapView, Rgb8};
use image::RgbaImage;

// =====================================================================
// Helpers
// =====================================================================

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn territory_renderer() -> (SceneRenderer, MapView, Vec<LayerInfo>) {
    let scene = Scene::from_json(scenes::territory_scene()).unwrap();
    let view = scene.view;
    let layers = scene.layer_infos();
    (SceneRenderer::new(scene, 1024, 768), view, layers)
}

// =====================================================================
// Paper geometry
// =====================================================================

#[test]
fn all_formats_swap_iff_horizontal() {
    for format in [PaperFormat::A4, PaperFormat::Letter, PaperFormat::Legal] {
        let (w, h) = format.dimensions_pt();
        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            let geom =
                PageGeometry::resolve(format, orientation, Margins::uniform(10.0), 150.0).unwrap();
            match orientation {
                Orientation::Vertical => {
                    assert_eq!((geom.page_w_pt, geom.page_h_pt), (w, h));
                }
                Orientation::Horizontal => {
                    assert_eq!((geom.page_w_pt, geom.page_h_pt), (h, w));
                }
            }
            assert!(geom.page_w_pt > 0.0 && geom.page_h_pt > 0.0);
            assert!(geom.content_w_pt > 0.0 && geom.content_h_pt > 0.0);
        }
    }
}

#[test]
fn margin_sets_below_paper_size_resolve() {
    // left+right < w and top+bottom < h must always resolve positive.
    let cases = [
        Margins::uniform(0.0),
        Margins::uniform(72.0),
        Margins {
            top: 5.0,
            right: 290.0,
            bottom: 5.0,
            left: 290.0,
        },
    ];
    for margins in cases {
        let geom =
            PageGeometry::resolve(PaperFormat::A4, Orientation::Vertical, margins, 180.0).unwrap();
        assert!(geom.content_w_pt > 0.0);
        assert!(geom.content_h_pt > 0.0);
    }
}

#[test]
fn px_pt_conversions_are_inverse() {
    for dpi in [72.0, 96.0, 150.0, 180.0, 300.0, 600.0] {
        for x in [0.1, 1.0, 42.0, 595.28, 1e6] {
            assert!((px_to_pt(pt_to_px(x, dpi), dpi) - x).abs() < 1e-9);
            assert!((pt_to_px(px_to_pt(x, dpi), dpi) - x).abs() < 1e-9);
        }
    }
}

// =====================================================================
// Stage-tagged failures
// =====================================================================

/// Renderer whose render or resize can be made to fail, recording which
/// operations ran.
struct FailingRenderer {
    size: (u32, u32),
    fail_render: bool,
    fail_resize: bool,
    render_calls: usize,
    resize_calls: usize,
}

impl FailingRenderer {
    fn new() -> Self {
        Self {
            size: (1024, 768),
            fail_render: false,
            fail_resize: false,
            render_calls: 0,
            resize_calls: 0,
        }
    }
}

impl MapRenderer for FailingRenderer {
    fn output_size(&self) -> (u32, u32) {
        self.size
    }

    fn set_output_size(&mut self, width: u32, height: u32) -> Result<(), Cause> {
        self.resize_calls += 1;
        if self.fail_resize {
            return Err("resize refused".into());
        }
        self.size = (width, height);
        Ok(())
    }

    fn render(&mut self, _extent: &Extent) -> Result<RgbaImage, Cause> {
        self.render_calls += 1;
        if self.fail_render {
            return Err("simulated engine fault".into());
        }
        Ok(RgbaImage::from_pixel(
            self.size.0,
            self.size.1,
            image::Rgba([240, 240, 240, 255]),
        ))
    }
}

fn plain_view() -> MapView {
    MapView {
        center_x: 1000.0,
        center_y: 2000.0,
        resolution: 5.0,
    }
}

#[test]
fn render_fault_is_tagged_render_map_and_aborts() {
    let mut renderer = FailingRenderer::new();
    renderer.fail_render = true;

    let err = export_map(&mut renderer, &plain_view(), &[], &ExportRequest::default())
        .unwrap_err();
    assert_eq!(err.stage, ExportStage::RenderMap);
    let cause = err.cause.expect("engine fault must be preserved");
    assert!(cause.to_string().contains("simulated engine fault"));
    // The restore still ran: resize to target + resize back.
    assert_eq!(renderer.resize_calls, 2);
    assert_eq!(renderer.output_size(), (1024, 768));
}

#[test]
fn resize_fault_is_tagged_render_map() {
    let mut renderer = FailingRenderer::new();
    renderer.fail_resize = true;

    let err = export_map(&mut renderer, &plain_view(), &[], &ExportRequest::default())
        .unwrap_err();
    assert_eq!(err.stage, ExportStage::RenderMap);
    assert_eq!(renderer.render_calls, 0, "no render after a failed acquire");
}

#[test]
fn oversized_margins_fail_at_paper_before_any_rendering() {
    let mut renderer = FailingRenderer::new();
    let request = ExportRequest {
        margins: Margins {
            top: 20.0,
            right: 400.0,
            bottom: 20.0,
            left: 400.0,
        },
        ..ExportRequest::default()
    };

    let err = export_map(&mut renderer, &plain_view(), &[], &request).unwrap_err();
    assert_eq!(err.stage, ExportStage::Paper);
    assert_eq!(renderer.resize_calls, 0);
    assert_eq!(renderer.render_calls, 0);
}

#[test]
fn invalid_view_fails_at_init() {
    let mut renderer = FailingRenderer::new();
    let view = MapView {
        center_x: 0.0,
        center_y: 0.0,
        resolution: -1.0,
    };
    let err = export_map(&mut renderer, &view, &[], &ExportRequest::default()).unwrap_err();
    assert_eq!(err.stage, ExportStage::Init);
    assert_eq!(renderer.resize_calls, 0);
}

// =====================================================================
// End-to-end exports
// =====================================================================

#[test]
fn a4_horizontal_with_grid_and_legend() {
    let (mut renderer, view, layers) = territory_renderer();
    let request = ExportRequest {
        format: PaperFormat::A4,
        orientation: Orientation::Horizontal,
        margins: Margins::uniform(20.0),
        dpi: 180.0,
        title: "Línea Negra".to_string(),
        author: "OPIAC".to_string(),
        show_grid: true,
        include_legend: true,
    };

    let bytes = export_map(&mut renderer, &view, &layers, &request).unwrap();
    assert_valid_pdf(&bytes);
    assert_eq!(
        renderer.output_size(),
        (1024, 768),
        "screen size restored after export"
    );
}

#[test]
fn decorations_can_be_toggled_off() {
    let (mut renderer, view, layers) = territory_renderer();
    let request = ExportRequest {
        show_grid: false,
        include_legend: false,
        ..ExportRequest::default()
    };
    let bytes = export_map(&mut renderer, &view, &layers, &request).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn every_format_and_orientation_exports() {
    let (mut renderer, view, layers) = territory_renderer();
    for format in [PaperFormat::A4, PaperFormat::Letter, PaperFormat::Legal] {
        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            let request = ExportRequest {
                format,
                orientation,
                dpi: 96.0,
                ..ExportRequest::default()
            };
            let bytes = export_map(&mut renderer, &view, &layers, &request).unwrap();
            assert_valid_pdf(&bytes);
        }
    }
}

#[test]
fn hidden_layers_export_without_legend_entries() {
    let scene = Scene::from_json(scenes::mixed_visibility_scene()).unwrap();
    let view = scene.view;
    let layers = scene.layer_infos();
    assert_eq!(layers.iter().filter(|l| l.visible).count(), 1);

    let mut renderer = SceneRenderer::new(scene, 640, 480);
    let bytes = export_map(&mut renderer, &view, &layers, &ExportRequest::default()).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn minimal_scene_exports_at_default_settings() {
    let scene = Scene::from_json(scenes::minimal_scene()).unwrap();
    let view = scene.view;
    let layers = scene.layer_infos();
    let mut renderer = SceneRenderer::new(scene, 800, 600);
    let bytes = export_map(&mut renderer, &view, &layers, &ExportRequest::default()).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn exports_are_reusable_per_renderer() {
    // Sequential exports against the same renderer must both succeed; the
    // first export's resize may not leak into the second.
    let (mut renderer, view, layers) = territory_renderer();
    let first = export_map(&mut renderer, &view, &layers, &ExportRequest::default()).unwrap();
    let second =
        export_map(&mut renderer, &view, &layers, &ExportRequest::a4_horizontal()).unwrap();
    assert_valid_pdf(&first);
    assert_valid_pdf(&second);
    assert_eq!(renderer.output_size(), (1024, 768));
}

// =====================================================================
// Request parsing
// =====================================================================

#[test]
fn request_round_trips_through_json() {
    let request = ExportRequest {
        format: PaperFormat::Legal,
        orientation: Orientation::Horizontal,
        dpi: 300.0,
        title: "Gobierno Mayor".to_string(),
        ..ExportRequest::default()
    };
    let json = serde_json::to_string(&request).unwrap();
    let parsed: ExportRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.format, PaperFormat::Legal);
    assert_eq!(parsed.orientation, Orientation::Horizontal);
    assert_eq!(parsed.dpi, 300.0);
    assert_eq!(parsed.title, "Gobierno Mayor");
}

#[test]
fn layer_colors_survive_scene_parse() {
    let scene = Scene::from_json(scenes::territory_scene()).unwrap();
    assert_eq!(scene.layers[0].color, Rgb8(46, 125, 50));
    assert_eq!(scene.layers[1].name, "Río Caquetá");
}
