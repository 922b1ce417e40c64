//! Static structure tables: the opening placement and the fully fortified
//! end state the strategy builds toward.

use crate::location::*;
use crate::unit::StructureKind;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

const OPENING_TURRETS: &[(u8, u8)] = &[(3, 12), (24, 12), (7, 10), (11, 10), (16, 10), (20, 10)];

const OPENING_WALLS: &[(u8, u8)] = &[
    (0, 13), (1, 13), (2, 13), (3, 13), (24, 13), (25, 13), (26, 13), (27, 13), (11, 11), (16, 11),
];

const OPENING_SUPPORTS: &[(u8, u8)] = &[(11, 9), (16, 9)];

const TARGET_TURRETS: &[(u8, u8)] = &[
    (1, 12), (2, 12), (3, 12), (24, 12), (25, 12), (26, 12),
    (2, 11), (3, 11), (4, 11), (23, 11), (24, 11), (25, 11),
    (3, 10), (4, 10), (5, 10), (6, 10), (7, 10), (8, 10), (9, 10), (10, 10), (11, 10),
    (16, 10), (17, 10), (18, 10), (19, 10), (20, 10), (21, 10), (22, 10), (23, 10), (24, 10),
    (4, 9), (5, 9), (6, 9), (7, 9), (8, 9), (9, 9), (10, 9),
    (17, 9), (18, 9), (19, 9), (20, 9), (21, 9), (22, 9), (23, 9),
    (8, 5), (9, 5), (10, 5), (11, 5), (12, 5), (13, 5), (14, 5), (15, 5), (16, 5), (17, 5), (18, 5), (19, 5),
    (9, 4), (10, 4), (11, 4), (12, 4), (13, 4), (14, 4), (15, 4), (16, 4), (17, 4), (18, 4),
    (10, 3), (11, 3), (12, 3), (13, 3), (14, 3), (15, 3), (16, 3), (17, 3),
];

const TARGET_WALLS: &[(u8, u8)] = &[
    (0, 13), (1, 13), (2, 13), (3, 13), (4, 13), (5, 13), (6, 13), (7, 13), (8, 13), (9, 13), (10, 13), (11, 13), (12, 13),
    (15, 13), (16, 13), (17, 13), (18, 13), (19, 13), (20, 13), (21, 13), (22, 13), (23, 13), (24, 13), (25, 13), (26, 13), (27, 13),
    (4, 12), (5, 12), (6, 12), (7, 12), (8, 12), (9, 12), (10, 12), (11, 12), (12, 12),
    (15, 12), (16, 12), (17, 12), (18, 12), (19, 12), (20, 12), (21, 12), (22, 12), (23, 12),
    (5, 11), (6, 11), (7, 11), (8, 11), (9, 11), (10, 11), (11, 11), (12, 11),
    (15, 11), (16, 11), (17, 11), (18, 11), (19, 11), (20, 11), (21, 11), (22, 11),
    (12, 10), (12, 9), (15, 10), (15, 9),
    (5, 8), (6, 8), (7, 8), (8, 8), (9, 8), (10, 8), (11, 8), (12, 8),
    (15, 8), (16, 8), (17, 8), (18, 8), (19, 8), (20, 8), (21, 8), (22, 8),
    (7, 6), (8, 6), (9, 6), (10, 6), (11, 6), (12, 6), (13, 6), (14, 6), (15, 6), (16, 6), (17, 6), (18, 6), (19, 6), (20, 6),
];

/// Turn-invariant placement tables. Sequence order is build priority.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetLayout {
    pub opening_turrets: Vec<Location>,
    pub opening_walls: Vec<Location>,
    pub opening_supports: Vec<Location>,
    pub turrets: Vec<Location>,
    pub walls: Vec<Location>,
}

impl Default for TargetLayout {
    fn default() -> Self {
        TargetLayout {
            opening_turrets: locations(OPENING_TURRETS),
            opening_walls: locations(OPENING_WALLS),
            opening_supports: locations(OPENING_SUPPORTS),
            turrets: locations(TARGET_TURRETS),
            walls: locations(TARGET_WALLS),
        }
    }
}

/// Target cells near a point, split by kind, nearest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NearbyTargets {
    pub turrets: Vec<Location>,
    pub walls: Vec<Location>,
}

impl TargetLayout {
    /// End-state cells for `kind`. Supports are only part of the opening.
    pub fn cells(&self, kind: StructureKind) -> &[Location] {
        match kind {
            StructureKind::Turret => &self.turrets,
            StructureKind::Wall => &self.walls,
            StructureKind::Support => &[],
        }
    }

    pub fn opening(&self, kind: StructureKind) -> &[Location] {
        match kind {
            StructureKind::Turret => &self.opening_turrets,
            StructureKind::Wall => &self.opening_walls,
            StructureKind::Support => &self.opening_supports,
        }
    }

    /// Target cells of `kind` within Euclidean `radius` of `origin`, sorted by
    /// distance. The sort is stable, so equal distances keep layout order.
    pub fn within(&self, kind: StructureKind, origin: Location, radius: f32) -> Vec<Location> {
        self.cells(kind)
            .iter()
            .copied()
            .filter(|cell| cell.within_radius(origin, radius))
            .sorted_by_key(|cell| cell.distance_squared_to(origin))
            .collect()
    }

    pub fn nearby(&self, origin: Location, turret_radius: f32, wall_radius: f32) -> NearbyTargets {
        NearbyTargets {
            turrets: self.within(StructureKind::Turret, origin, turret_radius),
            walls: self.within(StructureKind::Wall, origin, wall_radius),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnv::FnvHashSet;

    #[test]
    fn kinds_never_share_a_cell() {
        let layout = TargetLayout::default();
        let turrets: FnvHashSet<Location> = layout.turrets.iter().copied().collect();
        assert!(layout.walls.iter().all(|w| !turrets.contains(w)));
        assert_eq!(turrets.len(), layout.turrets.len());
    }

    #[test]
    fn opening_is_part_of_the_end_state() {
        let layout = TargetLayout::default();
        assert!(layout
            .opening_turrets
            .iter()
            .all(|c| layout.turrets.contains(c)));
        assert!(layout.opening_walls.iter().all(|c| layout.walls.contains(c)));
    }

    #[test]
    fn nearby_sorts_by_distance_then_layout_order() {
        let layout = TargetLayout::default();
        let origin = Location::from_xy(7, 10);
        let near = layout.within(StructureKind::Turret, origin, 1.0);
        // (7,10) itself, then the distance-1 cells in table order.
        assert_eq!(
            near,
            vec![
                Location::from_xy(7, 10),
                Location::from_xy(6, 10),
                Location::from_xy(8, 10),
                Location::from_xy(7, 9),
            ]
        );

        let walls = layout.within(StructureKind::Wall, origin, 2.0);
        assert!(walls
            .windows(2)
            .all(|w| w[0].distance_squared_to(origin) <= w[1].distance_squared_to(origin)));
        assert!(walls.iter().all(|w| w.within_radius(origin, 2.0)));
        assert!(!walls.is_empty());
    }

    #[test]
    fn nothing_nearby_far_from_the_layout() {
        let layout = TargetLayout::default();
        let nearby = layout.nearby(Location::from_xy(13, 26), 3.0, 3.0);
        assert!(nearby.turrets.is_empty());
        assert!(nearby.walls.is_empty());
    }
}
