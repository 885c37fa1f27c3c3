//! Map snapshot capture – freezes the live map at a target pixel size and
//! rasterizes the requested extent.
//!
//! Capturing has one unavoidable side effect: the render target must be
//! resized to the export's pixel dimensions. The resize is scoped — the
//! original size is restored on every exit path, success or failure, so no
//! export attempt leaks view state into the next one. Because the guard
//! borrows the renderer mutably, the compiler already rules out a second
//! in-flight capture against the same renderer.

use image::RgbaImage;

use crate::error::Cause;
use crate::view::Extent;

/// The rendering-engine boundary the exporter drives.
///
/// Implementations wrap whatever actually draws the map (a tile engine, a
/// software rasterizer); the pipeline only needs a resizable target and a
/// render-extent-to-pixels operation.
pub trait MapRenderer {
    /// Current output size in pixels.
    fn output_size(&self) -> (u32, u32);

    /// Resize the render target. Must be reversible with a second call.
    fn set_output_size(&mut self, width: u32, height: u32) -> Result<(), Cause>;

    /// Synchronously render `extent` into the current target, returning the
    /// rasterized pixels. The returned image must match the target size.
    fn render(&mut self, extent: &Extent) -> Result<RgbaImage, Cause>;
}

/// Holds the renderer at a temporary size; [`TargetSizeGuard::restore`]
/// puts the original size back.
struct TargetSizeGuard<'a> {
    renderer: &'a mut dyn MapRenderer,
    original: (u32, u32),
}

impl<'a> TargetSizeGuard<'a> {
    fn acquire(renderer: &'a mut dyn MapRenderer, width: u32, height: u32) -> Result<Self, Cause> {
        let original = renderer.output_size();
        renderer.set_output_size(width, height)?;
        Ok(Self { renderer, original })
    }

    fn restore(self) -> Result<(), Cause> {
        let (w, h) = self.original;
        self.renderer.set_output_size(w, h)
    }
}

/// Render `extent` at exactly `width` × `height` pixels, restoring the
/// renderer's original output size before returning.
///
/// If both the render and the restore fail, the restore error wins: the
/// map is left in an unknown state and that is the more serious fault.
/// There is no retry in either case.
pub fn capture(
    renderer: &mut dyn MapRenderer,
    extent: &Extent,
    width: u32,
    height: u32,
) -> Result<RgbaImage, Cause> {
    if width == 0 || height == 0 {
        return Err(format!("snapshot size must be positive, got {width}x{height}").into());
    }
    if extent.is_empty() {
        return Err(format!(
            "cannot snapshot an empty extent ({} x {})",
            extent.width(),
            extent.height()
        )
        .into());
    }

    let guard = TargetSizeGuard::acquire(renderer, width, height)?;
    let rendered = guard.renderer.render(extent);
    let restored = guard.restore();

    let image = match (rendered, restored) {
        (_, Err(restore_err)) => {
            log::error!("failed to restore render target size: {restore_err}");
            return Err(restore_err);
        }
        (Err(render_err), Ok(())) => return Err(render_err),
        (Ok(image), Ok(())) => image,
    };

    if (image.width(), image.height()) != (width, height) {
        return Err(format!(
            "renderer produced {}x{} pixels, expected {width}x{height}",
            image.width(),
            image.height()
        )
        .into());
    }
    Ok(image)
}
