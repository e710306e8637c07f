//! Hex-grid coordinate math and traversal queries.
//!
//! Positions are stored in odd-r offset form (see
//! [`Position`](crate::state::Position)); distance math converts to cube
//! coordinates where the hex metric is a Chebyshev norm. [`path`] builds the
//! movement queries on top: breadth-first reachability, A* pathfinding, and
//! attackable-target derivation.

mod path;

pub use path::{AttackableNode, GridView, ReachableNode};

use crate::state::Position;

/// Cube-coordinate form of a hex position.
///
/// The three axes always satisfy `x + y + z == 0`; distance between two
/// hexes is `max(|dx|, |dy|, |dz|)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cube {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Cube {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        debug_assert!(x + y + z == 0, "cube coordinate off the zero plane");
        Self { x, y, z }
    }

    /// Hex distance to `other` under the cube Chebyshev metric.
    pub fn distance(self, other: Cube) -> u32 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        let dz = (self.z - other.z).abs();
        dx.max(dy).max(dz) as u32
    }
}

impl From<Position> for Cube {
    fn from(position: Position) -> Self {
        let x = position.x - position.y.div_euclid(2);
        let z = position.y;
        Self { x, y: -x - z, z }
    }
}

impl From<Cube> for Position {
    fn from(cube: Cube) -> Self {
        Position::new(cube.x + cube.z.div_euclid(2), cube.z)
    }
}

/// The six hex directions, named for a pointy-top odd-r layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum HexDirection {
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl HexDirection {
    /// All directions in the canonical iteration order used by the
    /// deterministic traversal queries.
    pub const ALL: [Self; 6] = [
        Self::East,
        Self::NorthEast,
        Self::NorthWest,
        Self::West,
        Self::SouthWest,
        Self::SouthEast,
    ];

    /// Offset delta for a step in this direction from a cell on `row`.
    ///
    /// Odd-r storage means the diagonal deltas differ between even and odd
    /// rows; getting this wrong skews every query on half the board.
    pub fn offset(self, row: i32) -> (i32, i32) {
        if row & 1 == 0 {
            match self {
                Self::East => (1, 0),
                Self::NorthEast => (0, -1),
                Self::NorthWest => (-1, -1),
                Self::West => (-1, 0),
                Self::SouthWest => (-1, 1),
                Self::SouthEast => (0, 1),
            }
        } else {
            match self {
                Self::East => (1, 0),
                Self::NorthEast => (1, -1),
                Self::NorthWest => (0, -1),
                Self::West => (-1, 0),
                Self::SouthWest => (0, 1),
                Self::SouthEast => (1, 1),
            }
        }
    }

    /// Horizontal mirror of this direction.
    pub fn mirrored(self) -> Self {
        match self {
            Self::East => Self::West,
            Self::NorthEast => Self::NorthWest,
            Self::NorthWest => Self::NorthEast,
            Self::West => Self::East,
            Self::SouthWest => Self::SouthEast,
            Self::SouthEast => Self::SouthWest,
        }
    }

    /// Applies this direction to `position`.
    pub fn step(self, position: Position) -> Position {
        let (dx, dy) = self.offset(position.y);
        Position::new(position.x + dx, position.y + dy)
    }
}

/// The six neighbors of `position` in canonical direction order.
pub fn neighbors(position: Position) -> [Position; 6] {
    let mut out = [position; 6];
    for (slot, direction) in out.iter_mut().zip(HexDirection::ALL) {
        *slot = direction.step(position);
    }
    out
}

/// Hex distance between two offset positions.
pub fn hex_distance(a: Position, b: Position) -> u32 {
    Cube::from(a).distance(Cube::from(b))
}

/// A* heuristic over cube deltas: `max(|dx|,|dy|) + min(|dx|,|dy|) / 2`.
///
/// Slightly overestimates along some mixed-sign diagonals, trading strict
/// optimality for fewer expanded nodes. Callers that need the true metric
/// use [`hex_distance`].
pub fn path_heuristic(a: Position, b: Position) -> u32 {
    let ca = Cube::from(a);
    let cb = Cube::from(b);
    let dx = (ca.x - cb.x).abs() as u32;
    let dy = (ca.y - cb.y).abs() as u32;
    dx.max(dy) + dx.min(dy) / 2
}

/// Discretized straight line from `a` to `b`, endpoints inclusive.
///
/// Integer cube interpolation: each sample is rounded back onto the hex
/// lattice with the component carrying the largest rounding error fixed up
/// to restore `x + y + z == 0`. Flying units traverse this line directly
/// instead of pathing around obstacles.
pub fn straight_line(a: Position, b: Position) -> Vec<Position> {
    let start = Cube::from(a);
    let goal = Cube::from(b);
    let steps = start.distance(goal) as i64;
    if steps == 0 {
        return vec![a];
    }

    let mut line = Vec::with_capacity(steps as usize + 1);
    for i in 0..=steps {
        let nx = start.x as i64 * steps + (goal.x - start.x) as i64 * i;
        let ny = start.y as i64 * steps + (goal.y - start.y) as i64 * i;
        let nz = start.z as i64 * steps + (goal.z - start.z) as i64 * i;
        line.push(Position::from(cube_round(nx, ny, nz, steps)));
    }
    line
}

/// Rounds a scaled cube sample `(nx/den, ny/den, nz/den)` to the nearest
/// lattice hex, repairing the axis with the largest rounding error.
fn cube_round(nx: i64, ny: i64, nz: i64, den: i64) -> Cube {
    let mut rx = round_div(nx, den);
    let mut ry = round_div(ny, den);
    let mut rz = round_div(nz, den);

    let dx = (rx * den - nx).abs();
    let dy = (ry * den - ny).abs();
    let dz = (rz * den - nz).abs();

    if dx > dy && dx > dz {
        rx = -ry - rz;
    } else if dy > dz {
        ry = -rx - rz;
    } else {
        rz = -rx - ry;
    }

    Cube::new(rx as i32, ry as i32, rz as i32)
}

/// Division rounded to the nearest integer, halves toward positive infinity.
fn round_div(num: i64, den: i64) -> i64 {
    debug_assert!(den > 0);
    (2 * num + den).div_euclid(2 * den)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn cube_conversion_round_trips() {
        for y in -4..=4 {
            for x in -4..=4 {
                let position = Position::new(x, y);
                assert_eq!(Position::from(Cube::from(position)), position);
            }
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Position::new(-3, 2);
        let b = Position::new(4, -1);
        assert_eq!(hex_distance(a, b), hex_distance(b, a));
        assert_eq!(hex_distance(a, a), 0);
    }

    #[test]
    fn neighbors_are_all_at_distance_one() {
        for y in -2..=2 {
            for x in -2..=2 {
                let origin = Position::new(x, y);
                for neighbor in neighbors(origin) {
                    assert_eq!(hex_distance(origin, neighbor), 1, "{origin} -> {neighbor}");
                }
            }
        }
    }

    #[test]
    fn neighbor_steps_are_reversible() {
        let origin = Position::new(3, 3);
        for direction in HexDirection::iter() {
            let stepped = direction.step(origin);
            let back: Vec<_> = neighbors(stepped).into_iter().collect();
            assert!(back.contains(&origin), "{direction} from {origin}");
        }
    }

    #[test]
    fn mirrored_directions_flip_horizontally() {
        assert_eq!(HexDirection::East.mirrored(), HexDirection::West);
        assert_eq!(HexDirection::NorthEast.mirrored(), HexDirection::NorthWest);
        assert_eq!(HexDirection::SouthEast.mirrored(), HexDirection::SouthWest);
        for direction in HexDirection::iter() {
            assert_eq!(direction.mirrored().mirrored(), direction);
        }
    }

    #[test]
    fn heuristic_matches_cube_delta_formula() {
        // Pure east: cube delta (3, -3, 0) -> 3 + 3/2 = 4.
        assert_eq!(path_heuristic(Position::ORIGIN, Position::new(3, 0)), 4);
        // Straight down a column: cube delta (-2, -2, 4) -> 2 + 1 = 3.
        assert_eq!(path_heuristic(Position::ORIGIN, Position::new(0, 4)), 3);
        // Zero distance.
        assert_eq!(path_heuristic(Position::ORIGIN, Position::ORIGIN), 0);
    }

    #[test]
    fn straight_line_covers_endpoints_and_distance() {
        let a = Position::new(0, 0);
        let b = Position::new(4, 3);
        let line = straight_line(a, b);

        assert_eq!(line.first(), Some(&a));
        assert_eq!(line.last(), Some(&b));
        assert_eq!(line.len() as u32, hex_distance(a, b) + 1);

        // Consecutive samples are adjacent hexes.
        for pair in line.windows(2) {
            assert_eq!(hex_distance(pair[0], pair[1]), 1);
        }
    }

    #[test]
    fn straight_line_degenerate() {
        let a = Position::new(2, 2);
        assert_eq!(straight_line(a, a), vec![a]);
    }

    #[test]
    fn ring_counts_match_hex_geometry() {
        // 6 hexes at distance 1, 12 at distance 2 on an unbounded grid.
        let origin = Position::ORIGIN;
        let mut ring1 = 0;
        let mut ring2 = 0;
        for y in -3..=3 {
            for x in -3..=3 {
                match hex_distance(origin, Position::new(x, y)) {
                    1 => ring1 += 1,
                    2 => ring2 += 1,
                    _ => {}
                }
            }
        }
        assert_eq!(ring1, 6);
        assert_eq!(ring2, 12);
    }
}
