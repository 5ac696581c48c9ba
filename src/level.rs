use serde::Serialize;
use tracing::debug;

use crate::error::{PuzzleError, Result};
use crate::generator;
use crate::geometry::{Bounds, Point, Segment, intersect};

/// Smallest cycle that still encloses an area.
pub const MIN_NODES: usize = 3;

/// Connection order of a level: node `i` is joined to `next(i)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cycle {
    next: Vec<usize>,
}

impl Cycle {
    /// Index order is connection order: `0 -> 1 -> ... -> n-1 -> 0`.
    pub fn natural(count: usize) -> Result<Self> {
        if count < MIN_NODES {
            return Err(PuzzleError::TooFewNodes {
                count,
                min: MIN_NODES,
            });
        }
        Ok(Self {
            next: (0..count).map(|i| (i + 1) % count).collect(),
        })
    }

    /// Accepts `next[i]` for every node, provided it walks every node once
    /// before returning to the start.
    pub fn from_successors(next: Vec<usize>) -> Result<Self> {
        let count = next.len();
        if count < MIN_NODES {
            return Err(PuzzleError::TooFewNodes {
                count,
                min: MIN_NODES,
            });
        }

        let mut visited = vec![false; count];
        let mut current = 0;
        for _ in 0..count {
            if current >= count || visited[current] {
                return Err(PuzzleError::NotACycle(next));
            }
            visited[current] = true;
            current = next[current];
        }
        if current != 0 {
            return Err(PuzzleError::NotACycle(next));
        }

        Ok(Self { next })
    }

    pub fn len(&self) -> usize {
        self.next.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }

    pub fn next(&self, node: usize) -> usize {
        self.next[node]
    }

    pub fn successors(&self) -> &[usize] {
        &self.next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStatus {
    Clear,
    Crossing,
}

impl EdgeStatus {
    pub fn is_crossing(self) -> bool {
        self == EdgeStatus::Crossing
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeStatus::Clear => "clear",
            EdgeStatus::Crossing => "crossing",
        }
    }
}

/// One puzzle level: its number, the fixed connection cycle and the live
/// node positions. Edges are never stored; they are read off the cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    number: u32,
    cycle: Cycle,
    positions: Vec<Point>,
}

impl Level {
    pub fn new(number: u32, cycle: Cycle, positions: Vec<Point>) -> Result<Self> {
        if number == 0 {
            return Err(PuzzleError::InvalidLevel(number));
        }
        if cycle.len() != positions.len() {
            return Err(PuzzleError::NodeCountMismatch {
                cycle: cycle.len(),
                positions: positions.len(),
            });
        }
        Ok(Self::from_parts(number, cycle, positions))
    }

    pub(crate) fn from_parts(number: u32, cycle: Cycle, positions: Vec<Point>) -> Self {
        Self {
            number,
            cycle,
            positions,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    pub fn cycle(&self) -> &Cycle {
        &self.cycle
    }

    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    pub fn position(&self, node: usize) -> Point {
        self.check_index(node, "node");
        self.positions[node]
    }

    /// Segment from node `index` to its successor.
    pub fn edge(&self, index: usize) -> Segment {
        self.check_index(index, "edge");
        edge_segment(&self.cycle, &self.positions, index)
    }

    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        (0..self.node_count()).map(|index| edge_segment(&self.cycle, &self.positions, index))
    }

    /// Panics if `node` is not a node of this level or `position` is not
    /// finite.
    pub fn set_position(&mut self, node: usize, position: Point) {
        self.check_index(node, "node");
        check_finite(position);
        self.positions[node] = position;
    }

    pub fn is_cleared(&self) -> bool {
        layout_cleared(&self.cycle, &self.positions)
    }

    /// Panics if `index` is not an edge of this level.
    pub fn edge_status(&self, index: usize) -> EdgeStatus {
        let edge = self.edge(index);
        if self.edges().any(|other| intersect(edge, other).is_some()) {
            EdgeStatus::Crossing
        } else {
            EdgeStatus::Clear
        }
    }

    pub fn edge_statuses(&self) -> Vec<EdgeStatus> {
        (0..self.node_count())
            .map(|index| self.edge_status(index))
            .collect()
    }

    /// Number of unordered edge pairs that cross.
    pub fn crossing_count(&self) -> usize {
        let edges: Vec<Segment> = self.edges().collect();
        let mut count = 0;
        for (i, a) in edges.iter().enumerate() {
            for b in &edges[i + 1..] {
                if a.crosses(b) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Discards this layout and generates the next, larger level.
    pub fn advance(&self, bounds: &Bounds) -> Level {
        let next = generator::generate(self.next_number(), bounds);
        debug!(
            from = self.number,
            to = next.number,
            nodes = next.node_count(),
            "advanced level"
        );
        next
    }

    /// Panics once the level number can no longer grow.
    pub fn next_number(&self) -> u32 {
        match self.number.checked_add(1) {
            Some(next) => next,
            None => panic!("level {} is the last representable level", self.number),
        }
    }

    /// Validates a drag that arrived from outside the engine.
    pub fn check_move(&self, node: usize, position: Point) -> Result<()> {
        self.check_node(node)?;
        if !position.is_finite() {
            return Err(PuzzleError::NonFinitePosition {
                x: position.x,
                y: position.y,
            });
        }
        Ok(())
    }

    pub fn check_node(&self, node: usize) -> Result<()> {
        if node < self.node_count() {
            Ok(())
        } else {
            Err(PuzzleError::NodeOutOfRange {
                index: node,
                count: self.node_count(),
            })
        }
    }

    pub(crate) fn check_index(&self, index: usize, what: &str) {
        assert!(
            index < self.node_count(),
            "{what} {index} out of range for level {} with {} nodes",
            self.number,
            self.node_count()
        );
    }
}

pub(crate) fn check_finite(position: Point) {
    assert!(
        position.is_finite(),
        "node position {position:?} is not finite"
    );
}

fn edge_segment(cycle: &Cycle, positions: &[Point], index: usize) -> Segment {
    Segment::new(positions[index], positions[cycle.next(index)])
}

/// Every edge against every edge, itself and its neighbours included; the
/// open-interval test makes those pairs harmless.
pub(crate) fn layout_cleared(cycle: &Cycle, positions: &[Point]) -> bool {
    for i in 0..positions.len() {
        let edge = edge_segment(cycle, positions, i);
        for j in 0..positions.len() {
            if intersect(edge, edge_segment(cycle, positions, j)).is_some() {
                return false;
            }
        }
    }
    true
}

pub fn set_position(level: &mut Level, node: usize, position: Point) {
    level.set_position(node, position);
}

pub fn is_cleared(level: &Level) -> bool {
    level.is_cleared()
}

/// `true` when the edge crosses another edge.
pub fn edge_status(level: &Level, edge: usize) -> bool {
    level.edge_status(edge).is_crossing()
}

pub fn advance_level(level: &Level, bounds: &Bounds) -> Level {
    level.advance(bounds)
}
