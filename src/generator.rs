//! Level generation.
//!
//! Nodes are joined in index order and scattered uniformly over the inset
//! placement area. Layouts that come out already untangled are thrown away
//! and placed again, so every level needs at least one move.

use rand::Rng;
use tracing::{debug, trace};

use crate::geometry::{Bounds, Point};
use crate::level::{Cycle, Level, layout_cleared};

/// Nodes added on top of the level number.
pub const EXTRA_NODES: usize = 4;

pub fn node_count_for(level_number: u32) -> usize {
    level_number as usize + EXTRA_NODES
}

pub fn generate(level_number: u32, bounds: &Bounds) -> Level {
    generate_with_rng(level_number, bounds, &mut rand::thread_rng())
}

/// Panics if `level_number` is zero.
pub fn generate_with_rng<R: Rng + ?Sized>(level_number: u32, bounds: &Bounds, rng: &mut R) -> Level {
    assert!(level_number >= 1, "level numbers start at 1 (got 0)");

    let count = node_count_for(level_number);
    let cycle = match Cycle::natural(count) {
        Ok(cycle) => cycle,
        Err(err) => unreachable!("{count} nodes always form a cycle: {err}"),
    };
    let (min, max) = bounds.placement_area();

    // Retries are unbounded; an untangled random layout gets rarer as the
    // node count grows.
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        let positions: Vec<Point> = (0..count)
            .map(|_| Point::new(rng.gen_range(min.x..=max.x), rng.gen_range(min.y..=max.y)))
            .collect();

        if !layout_cleared(&cycle, &positions) {
            debug!(level = level_number, nodes = count, attempts, "generated level");
            return Level::from_parts(level_number, cycle, positions);
        }
        trace!(level = level_number, attempt = attempts, "layout already untangled, placing again");
    }
}
