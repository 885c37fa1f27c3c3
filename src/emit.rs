//! Document emitter – encodes the snapshot, registers it with a fresh PDF
//! document, and serializes the composed page into bytes.

use std::io::Cursor;

// printpdf's glob re-exports an `image` module; the leading `::` pins the
// image crate itself.
use ::image::{ImageFormat, RgbaImage};
use printpdf::*;

use crate::compose::MapImage;
use crate::error::Cause;
use crate::paper::PageGeometry;

const PT_TO_MM: f32 = 0.352_778;

/// Encode the captured snapshot as PNG for PDF embedding.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, Cause> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| -> Cause { format!("PNG encoding failed: {e}").into() })?;
    Ok(buf)
}

/// Build the single-page document: register the map raster, let `compose`
/// produce the page ops against it, then serialize.
///
/// The returned buffer is the caller's; this module keeps no state.
pub fn emit_pdf(
    title: &str,
    geom: &PageGeometry,
    map_png: &[u8],
    compose: impl FnOnce(MapImage) -> Vec<Op>,
) -> Result<Vec<u8>, Cause> {
    let mut doc = PdfDocument::new(title);

    // Decode with the `image` crate to obtain pixel dimensions.
    let decoded = ::image::load_from_memory(map_png)
        .map_err(|e| -> Cause { format!("map image decode error: {e}").into() })?;
    let (px_width, px_height) = (decoded.width(), decoded.height());

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let raw = RawImage::decode_from_bytes(map_png, &mut warnings)
        .map_err(|e| -> Cause { format!("map image rejected by PDF encoder: {e}").into() })?;
    let xobject = doc.add_image(&raw);

    let ops = compose(MapImage {
        xobject,
        px_width,
        px_height,
    });

    let page = PdfPage::new(
        Mm(geom.page_w_pt as f32 * PT_TO_MM),
        Mm(geom.page_h_pt as f32 * PT_TO_MM),
        ops,
    );
    doc.with_pages(vec![page]);

    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());
    if bytes.is_empty() {
        return Err("PDF serialization produced an empty buffer".into());
    }
    Ok(bytes)
}
