//! The stateful game a presentation layer drives: drag updates go in through
//! [`Puzzle::set_position`], drag releases through [`Puzzle::release`], and a
//! cleared level is replaced by [`Puzzle::advance_level`].

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::generator::generate_with_rng;
use crate::geometry::{Bounds, Point};
use crate::level::{EdgeStatus, Level, check_finite};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Playing,
    Cleared,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Playing => "playing",
            Phase::Cleared => "cleared",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Puzzle {
    level: Level,
    bounds: Bounds,
    phase: Phase,
    rng: StdRng,
}

impl Puzzle {
    pub fn new(bounds: Bounds) -> Self {
        Self::with_rng(1, bounds, StdRng::from_entropy())
    }

    pub fn seeded(bounds: Bounds, seed: u64) -> Self {
        Self::with_rng(1, bounds, StdRng::seed_from_u64(seed))
    }

    /// Panics if `level_number` is zero.
    pub fn starting_at(level_number: u32, bounds: Bounds, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(level_number, bounds, rng)
    }

    /// Wraps a hand-built level; later levels are generated from `seed`.
    pub fn from_level(level: Level, bounds: Bounds, seed: u64) -> Self {
        Self {
            level,
            bounds,
            phase: Phase::Playing,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn with_rng(level_number: u32, bounds: Bounds, mut rng: StdRng) -> Self {
        let level = generate_with_rng(level_number, &bounds, &mut rng);
        Self {
            level,
            bounds,
            phase: Phase::Playing,
            rng,
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Drag update. The target is clamped onto the playable rectangle.
    /// Updates arriving after the level is cleared are dropped until the
    /// next level starts. Panics if `node` is not a node of the level or the
    /// target is not finite, whatever the phase.
    pub fn set_position(&mut self, node: usize, position: Point) {
        self.level.check_index(node, "node");
        check_finite(position);
        if self.phase == Phase::Cleared {
            debug!(node, "ignoring drag on a cleared level");
            return;
        }
        let clamped = self.bounds.clamp(position);
        self.level.set_position(node, clamped);
    }

    /// Drag finished: checks the layout and reports the resulting phase.
    pub fn release(&mut self) -> Phase {
        if self.phase == Phase::Playing && self.level.is_cleared() {
            info!(level = self.level.number(), "level cleared");
            self.phase = Phase::Cleared;
        }
        self.phase
    }

    pub fn is_cleared(&self) -> bool {
        self.level.is_cleared()
    }

    pub fn edge_status(&self, index: usize) -> EdgeStatus {
        self.level.edge_status(index)
    }

    pub fn edge_statuses(&self) -> Vec<EdgeStatus> {
        self.level.edge_statuses()
    }

    /// Replaces the level wholesale with the next, larger one.
    pub fn advance_level(&mut self) {
        let number = self.level.next_number();
        self.level = generate_with_rng(number, &self.bounds, &mut self.rng);
        self.phase = Phase::Playing;
        debug!(level = number, nodes = self.level.node_count(), "started level");
    }

    pub fn snapshot(&self) -> PuzzleSnapshot {
        PuzzleSnapshot::of(&self.level, self.phase)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleSnapshot {
    pub level: u32,
    pub node_count: usize,
    pub phase: Phase,
    pub cleared: bool,
    pub crossings: usize,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub index: usize,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub index: usize,
    pub from: usize,
    pub to: usize,
    pub crossing: bool,
}

impl PuzzleSnapshot {
    pub fn of(level: &Level, phase: Phase) -> Self {
        let nodes = level
            .positions()
            .iter()
            .enumerate()
            .map(|(index, point)| NodeView {
                index,
                x: point.x,
                y: point.y,
            })
            .collect();

        let edges = level
            .edge_statuses()
            .into_iter()
            .enumerate()
            .map(|(index, status)| EdgeView {
                index,
                from: index,
                to: level.cycle().next(index),
                crossing: status.is_crossing(),
            })
            .collect();

        Self {
            level: level.number(),
            node_count: level.node_count(),
            phase,
            cleared: level.is_cleared(),
            crossings: level.crossing_count(),
            nodes,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Cycle;

    fn bounds() -> Bounds {
        Bounds::new(400.0, 800.0).unwrap()
    }

    fn bow_tie() -> Level {
        Level::new(
            1,
            Cycle::natural(4).unwrap(),
            vec![
                Point::new(100.0, 100.0),
                Point::new(300.0, 100.0),
                Point::new(100.0, 300.0),
                Point::new(300.0, 300.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn release_stays_playing_while_tangled() {
        let mut puzzle = Puzzle::from_level(bow_tie(), bounds(), 1);
        assert_eq!(puzzle.release(), Phase::Playing);
    }

    #[test]
    fn untangling_then_releasing_clears_the_level() {
        let mut puzzle = Puzzle::from_level(bow_tie(), bounds(), 1);
        puzzle.set_position(2, Point::new(300.0, 300.0));
        puzzle.set_position(3, Point::new(100.0, 300.0));
        assert!(puzzle.is_cleared());
        assert_eq!(puzzle.phase(), Phase::Playing);
        assert_eq!(puzzle.release(), Phase::Cleared);
    }

    #[test]
    fn drags_are_ignored_once_cleared() {
        let mut puzzle = Puzzle::from_level(bow_tie(), bounds(), 1);
        puzzle.set_position(2, Point::new(300.0, 300.0));
        puzzle.set_position(3, Point::new(100.0, 300.0));
        puzzle.release();

        puzzle.set_position(3, Point::new(0.0, 0.0));
        assert_eq!(puzzle.level().position(3), Point::new(100.0, 300.0));
    }

    #[test]
    fn drag_targets_are_clamped() {
        let mut puzzle = Puzzle::from_level(bow_tie(), bounds(), 1);
        puzzle.set_position(0, Point::new(-50.0, 1000.0));
        assert_eq!(puzzle.level().position(0), Point::new(0.0, 800.0));
    }

    #[test]
    fn advancing_grows_the_level_and_resets_phase() {
        let mut puzzle = Puzzle::starting_at(3, bounds(), Some(5));
        assert_eq!(puzzle.level().node_count(), 7);

        puzzle.advance_level();
        assert_eq!(puzzle.level().number(), 4);
        assert_eq!(puzzle.level().node_count(), 8);
        assert_eq!(puzzle.phase(), Phase::Playing);
        assert!(!puzzle.is_cleared());
    }

    #[test]
    fn seeded_puzzles_replay_identically() {
        let mut a = Puzzle::seeded(bounds(), 11);
        let mut b = Puzzle::seeded(bounds(), 11);
        assert_eq!(a.level(), b.level());
        a.advance_level();
        b.advance_level();
        assert_eq!(a.level(), b.level());
    }

    #[test]
    fn snapshot_lists_edges_with_status() {
        let puzzle = Puzzle::from_level(bow_tie(), bounds(), 1);
        let snapshot = puzzle.snapshot();
        assert_eq!(snapshot.node_count, 4);
        assert_eq!(snapshot.crossings, 1);
        assert!(!snapshot.cleared);
        let crossing: Vec<usize> = snapshot
            .edges
            .iter()
            .filter(|edge| edge.crossing)
            .map(|edge| edge.index)
            .collect();
        assert_eq!(crossing, vec![1, 3]);
        assert_eq!(snapshot.edges[3].to, 0);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["phase"], "playing");
        assert_eq!(json["nodeCount"], 4);
    }

    #[test]
    #[should_panic(expected = "node 99 out of range")]
    fn unknown_node_panics_even_after_a_clear() {
        let mut puzzle = Puzzle::from_level(bow_tie(), bounds(), 1);
        puzzle.set_position(2, Point::new(300.0, 300.0));
        puzzle.set_position(3, Point::new(100.0, 300.0));
        assert_eq!(puzzle.release(), Phase::Cleared);

        puzzle.set_position(99, Point::new(1.0, 1.0));
    }

    #[test]
    #[should_panic(expected = "not finite")]
    fn nan_drag_target_panics() {
        let mut puzzle = Puzzle::from_level(bow_tie(), bounds(), 1);
        puzzle.set_position(0, Point::new(f32::NAN, 50.0));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn dragging_an_unknown_node_panics() {
        let mut puzzle = Puzzle::seeded(bounds(), 3);
        puzzle.set_position(5, Point::new(1.0, 1.0));
    }
}
