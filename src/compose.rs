//! Layout composer – places the captured map image and its decorations on
//! the page as printpdf ops (v0.8 ops-based API).
//!
//! Ordering is fixed: background → map image → grid overlay → scale
//! indicator → legend → title/author. Later items may overlay earlier
//! ones. Every decoration is a configuration toggle; its absence is never
//! an error here.

use printpdf::*;

use crate::grid::Graticule;
use crate::legend::{self, LegendEntry};
use crate::paper::PageGeometry;
use crate::scalebar::ScaleBar;
use crate::view::Extent;

const TITLE_PT: f32 = 14.0;
const LABEL_PT: f32 = 7.0;
const META_PT: f32 = 8.0;
const GRID_GRAY: f32 = 0.45;

/// A registered map raster: the XObject plus its source pixel dimensions.
#[derive(Debug, Clone)]
pub struct MapImage {
    pub xobject: XObjectId,
    pub px_width: u32,
    pub px_height: u32,
}

/// Everything the composer needs to lay out one export page.
pub struct PageContent<'a> {
    pub geometry: &'a PageGeometry,
    pub map_image: MapImage,
    pub map_extent: &'a Extent,
    pub graticule: Option<&'a Graticule>,
    pub scale_bar: Option<&'a ScaleBar>,
    pub legend: &'a [LegendEntry],
    pub title: &'a str,
    pub author: &'a str,
}

/// Compose the page into PDF ops. Coordinates handed to printpdf use the
/// PDF convention (origin bottom-left); all layout math here is done in
/// top-left origin and flipped at the edge.
pub fn compose_page(content: &PageContent<'_>) -> Vec<Op> {
    let geom = content.geometry;
    let mut ops = Vec::new();

    let (cx, cy) = geom.content_origin_pt();
    let (cw, ch) = (geom.content_w_pt, geom.content_h_pt);

    // Background: white sheet under the content rectangle, so a map image
    // with transparency does not show through as undefined.
    push_fill_rect(&mut ops, geom, cx, cy, cw, ch, [1.0, 1.0, 1.0]);

    // Map image, scaled from source pixels to the content rectangle.
    // printpdf renders 1 px = 1 pt at dpi 72, so scale = desired_pt / px.
    let scale_x = if content.map_image.px_width > 0 {
        cw as f32 / content.map_image.px_width as f32
    } else {
        1.0
    };
    let scale_y = if content.map_image.px_height > 0 {
        ch as f32 / content.map_image.px_height as f32
    } else {
        1.0
    };
    ops.push(Op::UseXobject {
        id: content.map_image.xobject.clone(),
        transform: XObjectTransform {
            translate_x: Some(Pt(cx as f32)),
            translate_y: Some(Pt((geom.page_h_pt - cy - ch) as f32)),
            dpi: Some(72.0),
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            rotate: None,
        },
    });

    if let Some(grat) = content.graticule {
        push_graticule(&mut ops, content, grat);
    }

    if let Some(bar) = content.scale_bar {
        push_scale_bar(&mut ops, geom, bar);
    }

    if !content.legend.is_empty() {
        push_legend(&mut ops, geom, content.legend);
    }

    if !content.title.is_empty() {
        // Centered across the page, just above the content rectangle when
        // the top margin allows, overlaying the map edge otherwise.
        let approx_w = text_width_pt(content.title, TITLE_PT);
        let x = (geom.page_w_pt as f32 - approx_w) / 2.0;
        let y = if geom.margins.top >= f64::from(TITLE_PT) + 4.0 {
            geom.margins.top - 5.0
        } else {
            geom.margins.top + f64::from(TITLE_PT)
        };
        push_text(
            &mut ops,
            geom,
            content.title,
            x.max(0.0) as f64,
            y,
            TITLE_PT,
            BuiltinFont::HelveticaBold,
            [0.0, 0.0, 0.0],
        );
    }

    if !content.author.is_empty() {
        let text = content.author;
        let x = geom.page_w_pt - geom.margins.right - f64::from(text_width_pt(text, META_PT));
        let y = geom.page_h_pt - (geom.margins.bottom / 2.0).max(f64::from(META_PT) / 2.0);
        push_text(
            &mut ops,
            geom,
            text,
            x.max(0.0),
            y,
            META_PT,
            BuiltinFont::Helvetica,
            [0.25, 0.25, 0.25],
        );
    }

    ops
}

/// Map coordinates → page points, top-left origin.
fn map_to_page(content: &PageContent<'_>, x: f64, y: f64) -> (f64, f64) {
    let geom = content.geometry;
    let ext = content.map_extent;
    let (cx, cy) = geom.content_origin_pt();
    let px = cx + (x - ext.min_x) / ext.width() * geom.content_w_pt;
    let py = cy + (ext.max_y - y) / ext.height() * geom.content_h_pt;
    (px, py)
}

fn push_graticule(ops: &mut Vec<Op>, content: &PageContent<'_>, grat: &Graticule) {
    let geom = content.geometry;
    let (cx, cy) = geom.content_origin_pt();
    let bottom = cy + geom.content_h_pt;
    let right = cx + geom.content_w_pt;

    ops.push(Op::SetOutlineColor {
        col: Color::Rgb(Rgb {
            r: GRID_GRAY,
            g: GRID_GRAY,
            b: GRID_GRAY,
            icc_profile: None,
        }),
    });
    ops.push(Op::SetOutlineThickness { pt: Pt(0.4) });

    for line in &grat.verticals {
        let (x, _) = map_to_page(content, line.position, content.map_extent.min_y);
        push_line(ops, geom, (x, cy), (x, bottom));
        push_text(
            ops,
            geom,
            &line.label,
            x + 1.5,
            cy + f64::from(LABEL_PT) + 1.0,
            LABEL_PT,
            BuiltinFont::Helvetica,
            [GRID_GRAY, GRID_GRAY, GRID_GRAY],
        );
    }
    for line in &grat.horizontals {
        let (_, y) = map_to_page(content, content.map_extent.min_x, line.position);
        push_line(ops, geom, (cx, y), (right, y));
        push_text(
            ops,
            geom,
            &line.label,
            cx + 1.5,
            y - 1.5,
            LABEL_PT,
            BuiltinFont::Helvetica,
            [GRID_GRAY, GRID_GRAY, GRID_GRAY],
        );
    }
}

fn push_scale_bar(ops: &mut Vec<Op>, geom: &PageGeometry, bar: &ScaleBar) {
    let (cx, cy) = geom.content_origin_pt();
    let x = cx + 8.0;
    let y = cy + geom.content_h_pt - 10.0;
    let h = 4.0;

    // White backing so the bar stays readable over dark imagery.
    push_fill_rect(
        ops,
        geom,
        x - 3.0,
        y - h - 12.0,
        bar.width_pt + 6.0,
        h + 16.0,
        [1.0, 1.0, 1.0],
    );

    // Two alternating segments, surveyor style.
    let half = bar.width_pt / 2.0;
    push_fill_rect(ops, geom, x, y - h, half, h, [0.0, 0.0, 0.0]);
    push_fill_rect(ops, geom, x + half, y - h, half, h, [0.55, 0.55, 0.55]);

    push_text(
        ops,
        geom,
        &bar.label,
        x,
        y - h - 3.0,
        LABEL_PT,
        BuiltinFont::Helvetica,
        [0.0, 0.0, 0.0],
    );
    let denom = format!("1:{:.0}", bar.denominator);
    push_text(
        ops,
        geom,
        &denom,
        x + bar.width_pt - f64::from(text_width_pt(&denom, LABEL_PT)),
        y - h - 3.0,
        LABEL_PT,
        BuiltinFont::Helvetica,
        [0.0, 0.0, 0.0],
    );
}

fn push_legend(ops: &mut Vec<Op>, geom: &PageGeometry, entries: &[LegendEntry]) {
    let pad = 6.0;
    let widest = entries
        .iter()
        .map(|e| text_width_pt(&e.name, LABEL_PT))
        .fold(0.0f32, f32::max);
    let box_w = legend::SWATCH_PT + 6.0 + f64::from(widest) + 2.0 * pad;
    let box_h = legend::block_height_pt(entries) + 2.0 * pad;

    let (cx, cy) = geom.content_origin_pt();
    let x0 = cx + geom.content_w_pt - box_w - 8.0;
    let y0 = cy + 8.0;

    push_fill_rect(ops, geom, x0, y0, box_w, box_h, [1.0, 1.0, 1.0]);
    ops.push(Op::SetOutlineColor {
        col: Color::Rgb(Rgb {
            r: 0.3,
            g: 0.3,
            b: 0.3,
            icc_profile: None,
        }),
    });
    ops.push(Op::SetOutlineThickness { pt: Pt(0.6) });
    push_rect_outline(ops, geom, x0, y0, box_w, box_h);

    for (i, entry) in entries.iter().enumerate() {
        let row_y = y0 + pad + i as f64 * legend::ROW_PT;
        let c = entry.color.to_unit();
        push_fill_rect(
            ops,
            geom,
            x0 + pad,
            row_y,
            legend::SWATCH_PT,
            legend::SWATCH_PT,
            c,
        );
        push_text(
            ops,
            geom,
            &entry.name,
            x0 + pad + legend::SWATCH_PT + 6.0,
            row_y + legend::SWATCH_PT - 1.0,
            LABEL_PT,
            BuiltinFont::Helvetica,
            [0.1, 0.1, 0.1],
        );
    }
}

/// Measured text width: sum of Helvetica advance widths at `size`.
fn text_width_pt(text: &str, size: f32) -> f32 {
    text.chars().map(helvetica_advance_em).sum::<f32>() * size
}

/// Helvetica advance width for one character, in em units (AFM widths are
/// per 1000 em). Covers ASCII plus the Latin-1 letters the deployment
/// names use; anything else falls back to the lowercase average.
fn helvetica_advance_em(c: char) -> f32 {
    let milli: u32 = match c {
        '\'' => 191,
        'i' | 'j' | 'l' => 222,
        '|' => 260,
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | '[' | '\\' | ']' | 'f' | 't' | 'I' | 'Í'
        | 'í' | 'ì' | 'î' | 'ï' | '¡' => 278,
        '(' | ')' | '-' | '`' | 'r' | '´' => 333,
        '{' | '}' => 334,
        '"' => 355,
        '*' => 389,
        '^' => 469,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' | 'J' | 'ç' => 500,
        '0'..='9' | '#' | '$' | '?' | '_' | 'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o'
        | 'p' | 'q' | 'u' | 'L' | 'á' | 'à' | 'â' | 'ä' | 'ã' | 'é' | 'è' | 'ê' | 'ë' | 'ñ'
        | 'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ú' | 'ù' | 'û' | 'ü' | '¿' => 556,
        '+' | '<' | '=' | '>' | '~' => 584,
        'F' | 'T' | 'Z' => 611,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' | '&' | 'Á' | 'À' | 'Ä' | 'Ã'
        | 'É' | 'È' => 667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'Ú' | 'Ü' | 'Ñ' => 722,
        'G' | 'O' | 'Q' | 'Ó' | 'Ö' | 'Õ' => 778,
        'M' | 'm' => 833,
        '%' => 889,
        'W' => 944,
        '@' => 1015,
        _ => 556,
    };
    milli as f32 / 1000.0
}

/// Filled axis-aligned rectangle, `(x, y)` = top-left in page points.
fn push_fill_rect(
    ops: &mut Vec<Op>,
    geom: &PageGeometry,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    color: [f32; 3],
) {
    ops.push(Op::SetFillColor {
        col: Color::Rgb(Rgb {
            r: color[0],
            g: color[1],
            b: color[2],
            icc_profile: None,
        }),
    });
    let ring = rect_ring(geom, x, y, w, h);
    ops.push(Op::DrawPolygon {
        polygon: Polygon {
            rings: vec![ring],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        },
    });
}

fn push_rect_outline(ops: &mut Vec<Op>, geom: &PageGeometry, x: f64, y: f64, w: f64, h: f64) {
    let ring = rect_ring(geom, x, y, w, h);
    ops.push(Op::DrawLine {
        line: Line {
            points: ring.points,
            is_closed: true,
        },
    });
}

fn rect_ring(geom: &PageGeometry, x: f64, y: f64, w: f64, h: f64) -> PolygonRing {
    let y_top = (geom.page_h_pt - y) as f32;
    let y_bot = (geom.page_h_pt - y - h) as f32;
    let (x1, x2) = (x as f32, (x + w) as f32);
    let corner = |px: f32, py: f32| LinePoint {
        p: Point {
            x: Pt(px),
            y: Pt(py),
        },
        bezier: false,
    };
    PolygonRing {
        points: vec![
            corner(x1, y_bot),
            corner(x2, y_bot),
            corner(x2, y_top),
            corner(x1, y_top),
        ],
    }
}

fn push_line(ops: &mut Vec<Op>, geom: &PageGeometry, from: (f64, f64), to: (f64, f64)) {
    let point = |(px, py): (f64, f64)| LinePoint {
        p: Point {
            x: Pt(px as f32),
            y: Pt((geom.page_h_pt - py) as f32),
        },
        bezier: false,
    };
    ops.push(Op::DrawLine {
        line: Line {
            points: vec![point(from), point(to)],
            is_closed: false,
        },
    });
}

#[allow(clippy::too_many_arguments)]
fn push_text(
    ops: &mut Vec<Op>,
    geom: &PageGeometry,
    text: &str,
    x: f64,
    baseline_y: f64,
    size: f32,
    font: BuiltinFont,
    color: [f32; 3],
) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(x as f32),
            y: Pt((geom.page_h_pt - baseline_y) as f32),
        },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size),
        font,
    });
    ops.push(Op::SetFillColor {
        col: Color::Rgb(Rgb {
            r: color[0],
            g: color[1],
            b: color[2],
            icc_profile: None,
        }),
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(to_winlatin(text))],
        font,
    });
    ops.push(Op::EndTextSection);
}

/// Transcode UTF-8 into raw WinAnsi bytes wrapped in a `String`, so the
/// builtin-font encoder writes them unchanged. Deployment titles are
/// Spanish ("Línea Negra", "Gobierno Mayor"), so Latin-1 coverage matters.
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{2013}' => 0x96, // en-dash
            '\u{2014}' => 0x97, // em-dash
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{00A0}' => 0x20,
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: intentionally non-UTF-8 in 0x80–0x9F; printpdf passes the
    // bytes straight through for WinAnsi-encoded builtin fonts.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::compute_graticule;
    use crate::legend::LegendEntry;
    use crate::paper::{Margins, Orientation, PaperFormat, PageGeometry};
    use crate::scalebar::compute_scale_bar;
    use crate::view::Rgb8;

    fn geometry() -> PageGeometry {
        PageGeometry::resolve(
            PaperFormat::A4,
            Orientation::Horizontal,
            Margins::uniform(20.0),
            150.0,
        )
        .unwrap()
    }

    /// Register a throwaway raster so tests hold a real XObject id.
    fn map_image(geom: &PageGeometry) -> MapImage {
        let img = ::image::RgbaImage::from_pixel(4, 4, ::image::Rgba([0, 0, 0, 255]));
        let png = crate::emit::encode_png(&img).unwrap();
        let raw = RawImage::decode_from_bytes(&png, &mut Vec::new()).unwrap();
        let mut doc = PdfDocument::new("scratch");
        MapImage {
            xobject: doc.add_image(&raw),
            px_width: geom.content_w_px,
            px_height: geom.content_h_px,
        }
    }

    fn content<'a>(
        geom: &'a PageGeometry,
        extent: &'a Extent,
        grat: Option<&'a Graticule>,
        bar: Option<&'a ScaleBar>,
        legend: &'a [LegendEntry],
    ) -> PageContent<'a> {
        PageContent {
            geometry: geom,
            map_image: map_image(geom),
            map_extent: extent,
            graticule: grat,
            scale_bar: bar,
            legend,
            title: "Línea Negra",
            author: "OPIAC",
        }
    }

    #[test]
    fn bare_page_has_background_image_and_text() {
        let geom = geometry();
        let extent = Extent::new(0.0, 0.0, 10_000.0, 8_000.0);
        let ops = compose_page(&content(&geom, &extent, None, None, &[]));

        let xobjects = ops
            .iter()
            .filter(|op| matches!(op, Op::UseXobject { .. }))
            .count();
        assert_eq!(xobjects, 1);
        let texts = ops
            .iter()
            .filter(|op| matches!(op, Op::WriteTextBuiltinFont { .. }))
            .count();
        assert_eq!(texts, 2, "title + author");
    }

    #[test]
    fn decorations_add_ops_in_order() {
        let geom = geometry();
        let extent = Extent::new(0.0, 0.0, 10_000.0, 8_000.0);
        let grat = compute_graticule(&extent).unwrap();
        let bar = compute_scale_bar(5.0, geom.content_w_pt / 3.0).unwrap();
        let legend = vec![LegendEntry {
            name: "Resguardos".to_string(),
            color: Rgb8(30, 110, 60),
        }];

        let bare = compose_page(&content(&geom, &extent, None, None, &[]));
        let full = compose_page(&content(
            &geom,
            &extent,
            Some(&grat),
            Some(&bar),
            &legend,
        ));
        assert!(full.len() > bare.len());

        // The map image must precede every stroked decoration line.
        let img_idx = full
            .iter()
            .position(|op| matches!(op, Op::UseXobject { .. }))
            .unwrap();
        let first_line = full
            .iter()
            .position(|op| matches!(op, Op::DrawLine { .. }))
            .unwrap();
        assert!(img_idx < first_line);
    }

    #[test]
    fn text_width_tracks_glyph_advances() {
        // 'A' advances 667/1000 em.
        assert!((text_width_pt("A", 10.0) - 6.67).abs() < 1e-3);
        // "Río" = 722 + 278 + 556.
        assert!((text_width_pt("Río", 10.0) - 15.56).abs() < 1e-3);
        // Narrow glyphs must measure well under wide ones, not a flat average.
        let narrow = text_width_pt("illit", 10.0);
        let wide = text_width_pt("MMWWM", 10.0);
        assert!(narrow < wide / 2.0, "narrow={narrow} wide={wide}");
    }

    #[test]
    fn winlatin_keeps_latin1_and_replaces_the_rest() {
        let s = to_winlatin("Línea — 日本");
        let bytes = s.as_bytes();
        assert_eq!(bytes[1], 0xED); // í
        assert!(bytes.contains(&0x97)); // em-dash
        assert!(bytes.contains(&b'?'));
    }
}
