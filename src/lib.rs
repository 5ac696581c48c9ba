//! Engine for a cycle-untangling puzzle.
//!
//! A level is a ring of nodes joined in a fixed order; the player drags nodes
//! until no two edges cross. The crate covers the crossing test, level
//! generation, and the play state machine. Rendering helpers and the
//! optional HTTP API are thin collaborators built on top.

pub mod config;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod level;
pub mod puzzle;
pub mod render;
#[cfg(feature = "server")]
pub mod serve;
pub mod utils;

pub use config::GameConfig;
pub use error::PuzzleError;
pub use generator::{generate, generate_with_rng, node_count_for};
pub use geometry::{Bounds, Insets, Point, Segment, intersect};
pub use level::{
    Cycle, EdgeStatus, Level, advance_level, edge_status, is_cleared, set_position,
};
pub use puzzle::{EdgeView, NodeView, Phase, Puzzle, PuzzleSnapshot};
#[cfg(feature = "png")]
pub use render::render_png;
pub use render::{render_svg, render_text};
