//! Movement and targeting queries over the hex grid.
//!
//! [`GridView`] merges the static map oracle with the dynamic occupancy
//! layer so reachability, pathfinding, and attackability all answer from
//! one consistent picture of the board. Every query is deterministic:
//! neighbors expand in canonical direction order and the A* open set
//! breaks f-score ties by insertion order.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use crate::env::{MapOracle, SkillSpec};
use crate::state::{ActorId, ActorState, Position, TileMap};

use super::{hex_distance, neighbors, path_heuristic, straight_line};

/// A cell reachable for movement this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReachableNode {
    pub position: Position,
    /// Hops from the querying actor's cell.
    pub distance: u32,
}

/// An enemy reachable for a strike this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackableNode {
    pub target: ActorId,
    /// The target's cell.
    pub position: Position,
    /// Path hops to the target's cell.
    pub distance: u32,
}

/// Read-only view of the board for traversal queries.
pub struct GridView<'a, M: ?Sized> {
    map: &'a M,
    occupancy: &'a TileMap,
}

impl<'a, M> GridView<'a, M>
where
    M: MapOracle + ?Sized,
{
    pub fn new(map: &'a M, occupancy: &'a TileMap) -> Self {
        Self { map, occupancy }
    }

    /// Terrain allows standing here; occupancy is not considered.
    pub fn is_walkable(&self, position: Position) -> bool {
        self.map
            .tile(position)
            .is_some_and(|tile| tile.is_walkable())
    }

    /// Walkable and currently unoccupied.
    pub fn is_open(&self, position: Position) -> bool {
        self.is_walkable(position) && !self.occupancy.is_occupied(&position)
    }

    /// Cells reachable from `origin` within `move_range` hops.
    ///
    /// Ground movement runs a breadth-first expansion over open cells, so
    /// obstacles and occupied tiles block both entry and passage. With
    /// `ignore_obstacles` set the query instead enumerates every in-bounds
    /// cell at hex distance `1..=move_range`; whether the destination can
    /// actually be stopped on is the rule layer's concern.
    ///
    /// The origin cell itself is never part of the result.
    pub fn walkable_nodes(
        &self,
        origin: Position,
        move_range: u32,
        ignore_obstacles: bool,
    ) -> Vec<ReachableNode> {
        if ignore_obstacles {
            return self.cells_in_flight_range(origin, move_range);
        }

        let mut nodes = Vec::new();
        let mut visited = HashSet::new();
        let mut frontier = VecDeque::new();

        visited.insert(origin);
        frontier.push_back((origin, 0u32));

        while let Some((current, distance)) = frontier.pop_front() {
            if distance == move_range {
                continue;
            }
            for neighbor in neighbors(current) {
                if !visited.insert(neighbor) || !self.is_open(neighbor) {
                    continue;
                }
                nodes.push(ReachableNode {
                    position: neighbor,
                    distance: distance + 1,
                });
                frontier.push_back((neighbor, distance + 1));
            }
        }

        nodes
    }

    /// In-bounds cells at hex distance `1..=move_range`, scanned row-major.
    fn cells_in_flight_range(&self, origin: Position, move_range: u32) -> Vec<ReachableNode> {
        let dimensions = self.map.dimensions();
        let mut nodes = Vec::new();

        for y in 0..dimensions.height as i32 {
            for x in 0..dimensions.width as i32 {
                let cell = Position::new(x, y);
                let distance = hex_distance(origin, cell);
                if distance >= 1 && distance <= move_range {
                    nodes.push(ReachableNode {
                        position: cell,
                        distance,
                    });
                }
            }
        }

        nodes
    }

    /// Shortest path from `start` to `goal`, endpoints inclusive.
    ///
    /// Obstacle-bound movement runs A* over open cells; obstacle-ignoring
    /// movement takes the discretized straight line instead. A length-1
    /// result (just `start`) means the goal is unreachable, and callers
    /// are expected to treat it that way.
    pub fn find_path(
        &self,
        start: Position,
        goal: Position,
        ignore_obstacles: bool,
    ) -> Vec<Position> {
        if ignore_obstacles {
            return straight_line(start, goal);
        }
        self.shortest_path(start, goal, |position| self.is_open(position))
    }

    /// Enemies the attacker can strike this turn.
    ///
    /// Melee attackers (effective range 1) must be able to walk adjacent
    /// and spend one more hop on the strike itself, so the path into the
    /// target's cell may end on the occupied goal. Ranged attackers fire
    /// over obstacles: their path only respects map bounds, and its length
    /// is compared against the skill's range band, falling back to the
    /// attacker's own attack range when no skill is in play.
    pub fn attackable_nodes<'s, I>(
        &self,
        attacker: &ActorState,
        enemies: I,
        skill: Option<&SkillSpec>,
    ) -> Vec<AttackableNode>
    where
        I: IntoIterator<Item = &'s ActorState>,
    {
        let min_range = skill.map_or(attacker.attack_range.min, |spec| spec.range.min);
        let max_range = skill.map_or(attacker.attack_range.max, |spec| spec.range.max);

        let mut nodes = Vec::new();
        for enemy in enemies {
            let reach = if max_range <= 1 {
                self.melee_reach(attacker, enemy.position)
            } else {
                self.ranged_reach(attacker.position, enemy.position, min_range, max_range)
            };
            if let Some(distance) = reach {
                nodes.push(AttackableNode {
                    target: enemy.id,
                    position: enemy.position,
                    distance,
                });
            }
        }
        nodes
    }

    /// Path hops into the target cell when walking adjacent plus the strike
    /// hop fits the attacker's move range.
    fn melee_reach(&self, attacker: &ActorState, goal: Position) -> Option<u32> {
        let path = self.shortest_path(attacker.position, goal, |position| {
            self.is_open(position) || position == goal
        });
        if path.len() < 2 {
            return None;
        }
        let hops = path.len() as u32 - 1;
        (hops <= attacker.move_range + 1).then_some(hops)
    }

    /// Path hops to the target over a bounds-only graph, gated by the
    /// effective range band.
    fn ranged_reach(
        &self,
        start: Position,
        goal: Position,
        min_range: u32,
        max_range: u32,
    ) -> Option<u32> {
        let path = self.shortest_path(start, goal, |position| self.map.contains(position));
        if path.len() < 2 {
            return None;
        }
        let hops = path.len() as u32 - 1;
        (hops >= min_range && hops <= max_range).then_some(hops)
    }

    /// A* with unit step costs over the cells `passable` admits.
    ///
    /// Returns `[start]` when the goal cannot be reached.
    fn shortest_path<F>(&self, start: Position, goal: Position, passable: F) -> Vec<Position>
    where
        F: Fn(Position) -> bool,
    {
        if start == goal {
            return vec![start];
        }
        if !self.map.contains(goal) {
            return vec![start];
        }

        let mut open = BinaryHeap::new();
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut g_scores: HashMap<Position, u32> = HashMap::new();
        let mut seq = 0u64;

        g_scores.insert(start, 0);
        open.push(SearchNode {
            position: start,
            f_score: path_heuristic(start, goal),
            seq,
        });

        while let Some(current) = open.pop() {
            if current.position == goal {
                return reconstruct(&came_from, goal);
            }

            let current_g = g_scores[&current.position];

            for neighbor in neighbors(current.position) {
                if !passable(neighbor) {
                    continue;
                }

                let tentative = current_g + 1;
                let known = g_scores.get(&neighbor).copied().unwrap_or(u32::MAX);
                if tentative < known {
                    came_from.insert(neighbor, current.position);
                    g_scores.insert(neighbor, tentative);
                    seq += 1;
                    open.push(SearchNode {
                        position: neighbor,
                        f_score: tentative + path_heuristic(neighbor, goal),
                        seq,
                    });
                }
            }
        }

        vec![start]
    }
}

/// Node in the A* open set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SearchNode {
    position: Position,
    f_score: u32,
    seq: u64,
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for the min-heap; equal f-scores pop in insertion order.
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn reconstruct(came_from: &HashMap<Position, Position>, goal: Position) -> Vec<Position> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{MapDimensions, Tile, Terrain};
    use crate::state::{AttackRange, OwnerId};

    struct TestMap {
        dimensions: MapDimensions,
        obstacles: Vec<Position>,
    }

    impl TestMap {
        fn open(width: u32, height: u32) -> Self {
            Self {
                dimensions: MapDimensions::new(width, height),
                obstacles: Vec::new(),
            }
        }

        fn with_obstacles(width: u32, height: u32, obstacles: Vec<Position>) -> Self {
            Self {
                dimensions: MapDimensions::new(width, height),
                obstacles,
            }
        }
    }

    impl MapOracle for TestMap {
        fn dimensions(&self) -> MapDimensions {
            self.dimensions
        }

        fn tile(&self, position: Position) -> Option<Tile> {
            if !self.dimensions.contains(position) {
                return None;
            }
            if self.obstacles.contains(&position) {
                Some(Tile::new(Terrain::Obstacle))
            } else {
                Some(Tile::new(Terrain::Field))
            }
        }
    }

    fn melee_actor(id: u32, position: Position, move_range: u32) -> ActorState {
        ActorState::builder(ActorId(id), OwnerId(id))
            .position(position)
            .move_range(move_range)
            .attack_range(AttackRange::MELEE)
            .hp(100)
            .build()
    }

    #[test]
    fn walkable_nodes_match_brute_force_on_open_ground() {
        let map = TestMap::open(5, 5);
        let occupancy = TileMap::new();
        let grid = GridView::new(&map, &occupancy);
        let origin = Position::new(2, 2);

        let nodes = grid.walkable_nodes(origin, 2, false);

        for y in 0..5 {
            for x in 0..5 {
                let cell = Position::new(x, y);
                let distance = hex_distance(origin, cell);
                let expected = distance >= 1 && distance <= 2;
                let found = nodes.iter().any(|node| node.position == cell);
                assert_eq!(found, expected, "cell {cell}");
                if let Some(node) = nodes.iter().find(|node| node.position == cell) {
                    assert_eq!(node.distance, distance);
                }
            }
        }
    }

    #[test]
    fn walkable_nodes_stop_at_blockers() {
        let map = TestMap::with_obstacles(5, 3, vec![Position::new(1, 1)]);
        let mut occupancy = TileMap::new();
        occupancy.add_occupant(Position::new(3, 1), ActorId(9));
        let grid = GridView::new(&map, &occupancy);

        let nodes = grid.walkable_nodes(Position::new(2, 1), 1, false);

        let positions: Vec<_> = nodes.iter().map(|node| node.position).collect();
        assert!(!positions.contains(&Position::new(1, 1)), "obstacle included");
        assert!(!positions.contains(&Position::new(3, 1)), "occupied included");
        assert!(positions.contains(&Position::new(2, 0)));
    }

    #[test]
    fn flight_range_ignores_terrain_but_not_bounds() {
        let map = TestMap::with_obstacles(4, 4, vec![Position::new(1, 0)]);
        let occupancy = TileMap::new();
        let grid = GridView::new(&map, &occupancy);
        let origin = Position::new(0, 0);

        let nodes = grid.walkable_nodes(origin, 2, true);

        let positions: Vec<_> = nodes.iter().map(|node| node.position).collect();
        assert!(positions.contains(&Position::new(1, 0)), "obstacle skipped");
        assert!(!positions.contains(&origin), "origin included");
        assert!(positions.iter().all(|cell| map.dimensions.contains(*cell)));
        assert!(nodes.iter().all(|node| node.distance >= 1 && node.distance <= 2));
    }

    #[test]
    fn find_path_routes_around_a_wall() {
        // Vertical wall with no gap forces the detour through row 3.
        let wall = vec![
            Position::new(2, 0),
            Position::new(2, 1),
            Position::new(2, 2),
        ];
        let map = TestMap::with_obstacles(5, 4, wall.clone());
        let occupancy = TileMap::new();
        let grid = GridView::new(&map, &occupancy);

        let start = Position::new(0, 1);
        let goal = Position::new(4, 1);
        let path = grid.find_path(start, goal, false);

        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert!(path.len() > 2);
        for cell in &wall {
            assert!(!path.contains(cell), "path crosses the wall at {cell}");
        }
        for pair in path.windows(2) {
            assert_eq!(hex_distance(pair[0], pair[1]), 1);
        }
    }

    #[test]
    fn unreachable_goal_collapses_to_start() {
        // Goal cell fenced in on all six sides.
        let goal = Position::new(3, 2);
        let fence = neighbors(goal).to_vec();
        let map = TestMap::with_obstacles(7, 5, fence);
        let occupancy = TileMap::new();
        let grid = GridView::new(&map, &occupancy);

        let start = Position::new(0, 0);
        assert_eq!(grid.find_path(start, goal, false), vec![start]);
    }

    #[test]
    fn obstacle_ignoring_path_is_the_straight_line() {
        let map = TestMap::with_obstacles(6, 1, vec![Position::new(2, 0)]);
        let occupancy = TileMap::new();
        let grid = GridView::new(&map, &occupancy);

        let start = Position::new(0, 0);
        let goal = Position::new(4, 0);
        let path = grid.find_path(start, goal, true);

        assert_eq!(path.len() as u32, hex_distance(start, goal) + 1);
        assert!(path.contains(&Position::new(2, 0)));
    }

    #[test]
    fn adjacent_melee_target_is_attackable_with_zero_move() {
        let map = TestMap::open(4, 4);
        let mut occupancy = TileMap::new();
        let attacker = melee_actor(1, Position::new(1, 1), 0);
        let enemy = melee_actor(2, Position::new(2, 1), 0);
        occupancy.add_occupant(attacker.position, attacker.id);
        occupancy.add_occupant(enemy.position, enemy.id);
        let grid = GridView::new(&map, &occupancy);

        let nodes = grid.attackable_nodes(&attacker, [&enemy], None);

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].target, enemy.id);
        assert_eq!(nodes[0].distance, 1);
    }

    #[test]
    fn melee_reach_is_bounded_by_walk_plus_strike() {
        let map = TestMap::open(6, 1);
        let mut occupancy = TileMap::new();
        let near = melee_actor(1, Position::new(0, 0), 2);
        let far = melee_actor(2, Position::new(3, 0), 0);
        occupancy.add_occupant(near.position, near.id);
        occupancy.add_occupant(far.position, far.id);
        let grid = GridView::new(&map, &occupancy);

        // Three hops in: walk two, strike one.
        let nodes = grid.attackable_nodes(&near, [&far], None);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].distance, 3);

        // One hex of walking is not enough.
        let slow = melee_actor(3, Position::new(0, 0), 1);
        assert!(grid.attackable_nodes(&slow, [&far], None).is_empty());
    }

    #[test]
    fn walled_off_enemy_is_not_melee_attackable() {
        let goal = Position::new(3, 2);
        let fence = neighbors(goal).to_vec();
        let map = TestMap::with_obstacles(7, 5, fence);
        let mut occupancy = TileMap::new();
        let attacker = melee_actor(1, Position::new(0, 0), 10);
        let enemy = melee_actor(2, goal, 0);
        occupancy.add_occupant(attacker.position, attacker.id);
        occupancy.add_occupant(enemy.position, enemy.id);
        let grid = GridView::new(&map, &occupancy);

        assert!(grid.attackable_nodes(&attacker, [&enemy], None).is_empty());
    }

    #[test]
    fn ranged_fire_crosses_obstacles_within_the_band() {
        let map = TestMap::with_obstacles(7, 1, vec![Position::new(1, 0)]);
        let mut occupancy = TileMap::new();
        let mut archer = melee_actor(1, Position::new(0, 0), 1);
        archer.attack_range = AttackRange::new(2, 3);
        let close = melee_actor(2, Position::new(2, 0), 0);
        let far = melee_actor(3, Position::new(6, 0), 0);
        occupancy.add_occupant(archer.position, archer.id);
        occupancy.add_occupant(close.position, close.id);
        occupancy.add_occupant(far.position, far.id);
        let grid = GridView::new(&map, &occupancy);

        let nodes = grid.attackable_nodes(&archer, [&close, &far], None);

        // Distance 2 clears the obstacle; distance 6 is past the band.
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].target, close.id);
        assert_eq!(nodes[0].distance, 2);
    }

    #[test]
    fn minimum_range_blocks_point_blank_shots() {
        let map = TestMap::open(5, 1);
        let mut occupancy = TileMap::new();
        let mut archer = melee_actor(1, Position::new(0, 0), 1);
        archer.attack_range = AttackRange::new(2, 4);
        let adjacent = melee_actor(2, Position::new(1, 0), 0);
        occupancy.add_occupant(archer.position, archer.id);
        occupancy.add_occupant(adjacent.position, adjacent.id);
        let grid = GridView::new(&map, &occupancy);

        assert!(grid.attackable_nodes(&archer, [&adjacent], None).is_empty());
    }
}
