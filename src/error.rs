//! Stage-tagged export errors.
//!
//! Every fault raised while an export is running carries the pipeline stage
//! that produced it, so a caller can tell a bad margin set (PAPER) apart
//! from a render engine fault (RENDER_MAP) without parsing messages.

use std::error::Error;
use std::fmt;

/// One named phase of the export pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportStage {
    Init,
    Paper,
    Extent,
    Grid,
    RenderMap,
    Scale,
    Legends,
    Build,
}

impl ExportStage {
    /// All stages in the order the pipeline runs them.
    pub const ALL: [ExportStage; 8] = [
        ExportStage::Init,
        ExportStage::Paper,
        ExportStage::Extent,
        ExportStage::Grid,
        ExportStage::RenderMap,
        ExportStage::Scale,
        ExportStage::Legends,
        ExportStage::Build,
    ];

    /// Stable uppercase name, matching the stage tags exposed to callers.
    pub fn name(self) -> &'static str {
        match self {
            ExportStage::Init => "INIT",
            ExportStage::Paper => "PAPER",
            ExportStage::Extent => "EXTENT",
            ExportStage::Grid => "GRID",
            ExportStage::RenderMap => "RENDER_MAP",
            ExportStage::Scale => "SCALE",
            ExportStage::Legends => "LEGENDS",
            ExportStage::Build => "BUILD",
        }
    }
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Boxed cause preserved under an [`ExportError`].
pub type Cause = Box<dyn Error + Send + Sync + 'static>;

/// An export fault: the stage it happened in, a human-readable message, and
/// the underlying error when one exists.
///
/// The pipeline never recovers or retries; the first `ExportError` aborts
/// the remaining stages and is the only thing the caller sees.
#[derive(Debug, thiserror::Error)]
#[error("export failed at stage {stage}: {message}")]
pub struct ExportError {
    pub stage: ExportStage,
    pub message: String,
    #[source]
    pub cause: Option<Cause>,
}

impl ExportError {
    /// A stage fault with no underlying cause (configuration errors, mostly).
    pub fn new(stage: ExportStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            cause: None,
        }
    }

    /// A stage fault wrapping the error that triggered it.
    pub fn with_cause(stage: ExportStage, message: impl Into<String>, cause: Cause) -> Self {
        Self {
            stage,
            message: message.into(),
            cause: Some(cause),
        }
    }
}
