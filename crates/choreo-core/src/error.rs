//! Error types for the choreography core.
//!
//! Only construction can fail. Once a scene exists its frame loop degrades
//! instead of erroring (empty shapes, ignored transitions, clamped progress).

use thiserror::Error;

/// A configuration value the caller should have clamped before handing the
/// config to the core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("tree height must be positive, got {0}")]
    TreeHeight(f32),
    #[error("tree base radius must be positive, got {0}")]
    TreeRadius(f32),
    #[error("tree needs at least one layer")]
    TreeLayers,
    #[error("surface fraction must be in [0, 1], got {0}")]
    SurfaceFraction(f32),
    #[error("spiral needs at least one turn")]
    SpiralTurns,
    #[error("text sampling density must be >= 1")]
    TextDensity,
    #[error("text world width must be positive, got {0}")]
    TextWidth(f32),
    #[error("font size must be positive, got {0}")]
    FontSize(f32),
    #[error("phase duration `{name}` must be positive, got {value}")]
    Duration { name: &'static str, value: f32 },
    #[error("damping speed `{name}` must be positive, got {value}")]
    Damping { name: &'static str, value: f32 },
    #[error("palette needs 1 to 3 colors, got {0}")]
    PaletteSize(usize),
    #[error("fade thresholds must satisfy 0 <= start < end <= 1 (got {start}..{end})")]
    FadeWindow { start: f32, end: f32 },
}

/// Errors surfaced while constructing a scene or its collaborators.
#[derive(Debug, Error)]
pub enum ChoreoError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("font data could not be parsed")]
    Font,
}

pub type Result<T> = std::result::Result<T, ChoreoError>;
