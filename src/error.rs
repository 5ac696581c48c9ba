use thiserror::Error;

/// Rejections for values that arrive from outside the engine (CLI flags,
/// environment, HTTP bodies). Contract violations inside the engine panic
/// instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PuzzleError {
    #[error("bounds must have a finite, positive size (got {width}x{height})")]
    InvalidBounds { width: f32, height: f32 },

    #[error("insets must be finite and non-negative (got x={x}, y={y})")]
    InvalidInsets { x: f32, y: f32 },

    #[error(
        "insets of {inset_x}x{inset_y} leave no room to place nodes inside {width}x{height}"
    )]
    PlacementAreaEmpty {
        width: f32,
        height: f32,
        inset_x: f32,
        inset_y: f32,
    },

    #[error("level numbers start at 1 (got {0})")]
    InvalidLevel(u32),

    #[error("a level needs at least {min} nodes (got {count})")]
    TooFewNodes { count: usize, min: usize },

    #[error("successor list {0:?} is not a single cycle through every node")]
    NotACycle(Vec<usize>),

    #[error("cycle covers {cycle} nodes but {positions} positions were supplied")]
    NodeCountMismatch { cycle: usize, positions: usize },

    #[error("node {index} does not exist; the level has {count} nodes")]
    NodeOutOfRange { index: usize, count: usize },

    #[error("position ({x}, {y}) is not a finite point")]
    NonFinitePosition { x: f32, y: f32 },

    #[error("scale must be finite and greater than zero (got {0})")]
    InvalidScale(f32),

    #[error("scale {scale} gives a {width}x{height} raster, outside 1..=u32::MAX pixels")]
    RasterSize { scale: f32, width: f32, height: f32 },
}

pub type Result<T, E = PuzzleError> = std::result::Result<T, E>;
