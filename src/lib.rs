//! # geoprint – map view → PDF export pipeline
//!
//! This crate turns a live map view into a print-ready PDF through a fixed
//! sequence of stages:
//!
//! 1. **INIT** – validate the request and view ([`pipeline`])
//! 2. **PAPER** – resolve format/orientation/margins into a content
//!    rectangle ([`paper`])
//! 3. **EXTENT** – derive the ground extent the export covers ([`view`])
//! 4. **GRID** – compute the graticule overlay ([`grid`])
//! 5. **RENDER_MAP** – snapshot the map at the content pixel size
//!    ([`snapshot`])
//! 6. **SCALE** – size the scale bar ([`scalebar`])
//! 7. **LEGENDS** – collect swatches for the visible layers ([`legend`])
//! 8. **BUILD** – compose the page and serialize the PDF ([`compose`],
//!    [`emit`])
//!
//! Any fault aborts the remaining stages and surfaces as an
//! [`error::ExportError`] tagged with the stage that produced it; no
//! partial document is ever returned.
//!
//! The map engine sits behind the [`snapshot::MapRenderer`] trait; a
//! software implementation over serde scene files lives in [`scene`].

pub mod compose;
pub mod emit;
pub mod error;
pub mod grid;
pub mod legend;
pub mod paper;
pub mod pipeline;
pub mod scalebar;
pub mod scene;
pub mod scenes;
pub mod snapshot;
pub mod view;

// Re-exports for convenience
pub use error::{ExportError, ExportStage};
pub use pipeline::{export_map, ExportRequest};
pub use snapshot::MapRenderer;
