//! Static lookahead for picking a mobile-unit launch cell.

use crate::board::GameBoard;
use crate::location::*;
use crate::unit::Side;
use itertools::Itertools;

/// Damage a friendly unit launched from `lane` is expected to take: for
/// every cell on its path, the number of opposing structures that can hit
/// it times `hit_damage`.
pub fn lane_damage(board: &dyn GameBoard, lane: Location, hit_damage: f32) -> f32 {
    board
        .path_to_edge(lane)
        .into_iter()
        .map(|cell| board.attackers_of(cell, Side::Friendly).len() as f32 * hit_damage)
        .sum()
}

/// The candidate lane with the least expected damage. Ties go to the
/// earliest candidate; `None` only when there are no candidates.
pub fn least_damage_lane(
    board: &dyn GameBoard,
    lanes: &[Location],
    hit_damage: f32,
) -> Option<Location> {
    lanes
        .iter()
        .map(|&lane| lane_damage(board, lane, hit_damage))
        .position_min_by(|a, b| a.total_cmp(b))
        .map(|index| lanes[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::StructureSnapshot;
    use crate::budget::UnitCost;
    use crate::unit::*;
    use fnv::FnvHashMap;

    /// Board with scripted paths and attacker counts.
    #[derive(Default)]
    struct ScriptedBoard {
        paths: FnvHashMap<Location, Vec<Location>>,
        attackers: FnvHashMap<Location, usize>,
    }

    impl GameBoard for ScriptedBoard {
        fn turn_number(&self) -> u32 {
            0
        }
        fn attempt_spawn(&mut self, _: UnitKind, _: &[Location], _: u32) -> u32 {
            0
        }
        fn attempt_upgrade(&mut self, _: &[Location]) -> u32 {
            0
        }
        fn attempt_remove(&mut self, _: &[Location]) -> u32 {
            0
        }
        fn current_resource(&self, _: Currency) -> f32 {
            0.0
        }
        fn unit_cost(&self, _: UnitKind) -> UnitCost {
            UnitCost::default()
        }
        fn upgrade_cost(&self, _: UnitKind) -> UnitCost {
            UnitCost::default()
        }
        fn path_to_edge(&self, cell: Location) -> Vec<Location> {
            self.paths.get(&cell).cloned().unwrap_or_else(|| vec![cell])
        }
        fn attackers_of(&self, cell: Location, _: Side) -> Vec<(Location, StructureSnapshot)> {
            let turret = StructureSnapshot {
                kind: StructureKind::Turret,
                side: Side::Enemy,
                health: 60.0,
                max_health: 60.0,
                upgraded: false,
            };
            let count = self.attackers.get(&cell).copied().unwrap_or(0);
            (0..count).map(|_| (cell, turret)).collect()
        }
        fn structure_at(&self, _: Location) -> Option<StructureSnapshot> {
            None
        }
        fn friendly_edges(&self) -> Vec<Location> {
            Vec::new()
        }
        fn submit_turn(&mut self) {}
    }

    fn path(cells: &[(u8, u8)]) -> Vec<Location> {
        locations(cells)
    }

    #[test]
    fn picks_the_lane_nobody_covers() {
        let a = Location::from_xy(6, 7);
        let b = Location::from_xy(21, 7);
        let mut board = ScriptedBoard::default();
        board.paths.insert(a, path(&[(6, 7), (7, 8), (8, 9)]));
        board.paths.insert(b, path(&[(21, 7), (20, 8), (19, 9)]));
        board.attackers.insert(Location::from_xy(7, 8), 1);

        assert_eq!(lane_damage(&board, a, 6.0), 6.0);
        assert_eq!(lane_damage(&board, b, 6.0), 0.0);
        assert_eq!(least_damage_lane(&board, &[a, b], 6.0), Some(b));
    }

    #[test]
    fn sums_every_attacker_on_every_cell() {
        let lane = Location::from_xy(6, 7);
        let mut board = ScriptedBoard::default();
        board.paths.insert(lane, path(&[(6, 7), (7, 8), (8, 9)]));
        board.attackers.insert(Location::from_xy(7, 8), 2);
        board.attackers.insert(Location::from_xy(8, 9), 3);
        assert_eq!(lane_damage(&board, lane, 6.0), 30.0);
    }

    #[test]
    fn ties_keep_the_first_lane() {
        let board = ScriptedBoard::default();
        let lanes = [Location::from_xy(6, 7), Location::from_xy(21, 7)];
        assert_eq!(least_damage_lane(&board, &lanes, 6.0), Some(lanes[0]));
        assert_eq!(least_damage_lane(&board, &[], 6.0), None);
    }
}
