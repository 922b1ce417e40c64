//! Offline stand-in for the game engine.
//!
//! `Arena` implements [`GameBoard`] over the 28x28 diamond board so the
//! strategy can be driven without the live engine. It resolves placements,
//! upgrades and removals with the real cost tables and answers path and
//! attacker queries, but it does not simulate combat: damage is applied by
//! hand through [`Arena::strike`], which also produces the matching frame
//! telemetry.

use crate::board::*;
use crate::budget::*;
use crate::constants::*;
use crate::location::*;
use crate::telemetry::*;
use crate::unit::*;
use bitflags::*;
use fnv::FnvHashMap;
use log::*;
use pathfinding::prelude::bfs;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CellFlags: u8 {
        const NONE = 0;
        const IN_ARENA = 1;
        const FRIENDLY_HALF = 2;
        const ENEMY_HALF = 4;
        const BOTTOM_LEFT = 8;
        const BOTTOM_RIGHT = 16;
        const TOP_LEFT = 32;
        const TOP_RIGHT = 64;
    }
}

/// A 28x28 array for arena-sized data.
#[derive(Clone)]
pub struct ArenaDataArray<T: Copy> {
    data: Vec<T>,
}

impl<T: Copy> ArenaDataArray<T> {
    pub fn new(initial: T) -> Self {
        ArenaDataArray {
            data: vec![initial; (ARENA_SIZE as usize) * (ARENA_SIZE as usize)],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        let index = y * (ARENA_SIZE as usize) + x;
        &self.data[index]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let index = y * (ARENA_SIZE as usize) + x;
        &mut self.data[index]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        *self.get_mut(x, y) = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        self.data.iter().enumerate().map(|(i, v)| {
            let x = i % (ARENA_SIZE as usize);
            let y = i / (ARENA_SIZE as usize);
            ((x, y), v)
        })
    }
}

/// Precomputed zone flags for every cell of the diamond.
#[derive(Clone)]
pub struct ArenaTerrain {
    flags: ArenaDataArray<CellFlags>,
}

impl Default for ArenaTerrain {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaTerrain {
    pub fn new() -> Self {
        let mut flags = ArenaDataArray::new(CellFlags::NONE);
        let half = HALF_ARENA as i32;

        for y in 0..ARENA_SIZE as i32 {
            // Row extents of the diamond.
            let (min_x, max_x) = if y < half {
                (half - 1 - y, half + y)
            } else {
                (y - half, 3 * half - 1 - y)
            };
            for x in min_x..=max_x {
                let mut cell = CellFlags::IN_ARENA;
                if y < half {
                    cell |= CellFlags::FRIENDLY_HALF;
                    if x == min_x {
                        cell |= CellFlags::BOTTOM_LEFT;
                    }
                    if x == max_x {
                        cell |= CellFlags::BOTTOM_RIGHT;
                    }
                } else {
                    cell |= CellFlags::ENEMY_HALF;
                    if x == min_x {
                        cell |= CellFlags::TOP_LEFT;
                    }
                    if x == max_x {
                        cell |= CellFlags::TOP_RIGHT;
                    }
                }
                flags.set(x as usize, y as usize, cell);
            }
        }

        ArenaTerrain { flags }
    }

    pub fn get(&self, loc: Location) -> CellFlags {
        if loc.x() >= ARENA_SIZE || loc.y() >= ARENA_SIZE {
            return CellFlags::NONE;
        }
        *self.flags.get(loc.x() as usize, loc.y() as usize)
    }

    pub fn in_arena(&self, loc: Location) -> bool {
        self.get(loc).contains(CellFlags::IN_ARENA)
    }

    pub fn is_home(&self, loc: Location, side: Side) -> bool {
        let half = match side {
            Side::Friendly => CellFlags::FRIENDLY_HALF,
            Side::Enemy => CellFlags::ENEMY_HALF,
        };
        self.get(loc).contains(half)
    }

    pub fn edge(&self, edge: CellFlags) -> Vec<Location> {
        self.flags
            .iter()
            .filter(|(_, flags)| flags.intersects(edge))
            .map(|((x, y), _)| Location::from_coords(x as u32, y as u32))
            .collect()
    }

    /// The edge a mobile unit of `side` starting at `start` heads for.
    pub fn target_edge(&self, start: Location, side: Side) -> CellFlags {
        let left = start.x() < HALF_ARENA;
        match (side, left) {
            (Side::Friendly, true) => CellFlags::TOP_RIGHT,
            (Side::Friendly, false) => CellFlags::TOP_LEFT,
            (Side::Enemy, true) => CellFlags::BOTTOM_RIGHT,
            (Side::Enemy, false) => CellFlags::BOTTOM_LEFT,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct ArenaStructure {
    kind: StructureKind,
    side: Side,
    health: f32,
    upgraded: bool,
    pending_removal: bool,
}

impl ArenaStructure {
    fn snapshot(&self) -> StructureSnapshot {
        StructureSnapshot {
            kind: self.kind,
            side: self.side,
            health: self.health,
            max_health: self.kind.max_health(self.upgraded),
            upgraded: self.upgraded,
        }
    }

    fn range(&self) -> f32 {
        if self.upgraded {
            TURRET_UPGRADED_RANGE
        } else {
            TURRET_RANGE
        }
    }
}

/// Mobile units sent out during a turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Deployment {
    pub turn: u32,
    pub kind: MobileKind,
    pub cell: Location,
    pub count: u32,
}

pub fn structure_cost(kind: StructureKind) -> f32 {
    match kind {
        StructureKind::Wall => WALL_COST,
        StructureKind::Support => SUPPORT_COST,
        StructureKind::Turret => TURRET_COST,
    }
}

pub fn structure_upgrade_cost(kind: StructureKind) -> f32 {
    match kind {
        StructureKind::Wall => WALL_UPGRADE_COST,
        StructureKind::Support => SUPPORT_UPGRADE_COST,
        StructureKind::Turret => TURRET_UPGRADE_COST,
    }
}

pub fn mobile_cost(kind: MobileKind) -> f32 {
    match kind {
        MobileKind::Scout => SCOUT_COST,
        MobileKind::Demolisher => DEMOLISHER_COST,
        MobileKind::Interceptor => INTERCEPTOR_COST,
    }
}

/// Offline board, seen from the friendly side.
#[derive(Clone)]
pub struct Arena {
    terrain: ArenaTerrain,
    turn: u32,
    structures: FnvHashMap<Location, ArenaStructure>,
    friendly_budget: Budget,
    enemy_budget: Budget,
    income: UnitCost,
    deployments: Vec<Deployment>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    pub fn new() -> Self {
        Arena {
            terrain: ArenaTerrain::new(),
            turn: 0,
            structures: FnvHashMap::default(),
            friendly_budget: Budget::default(),
            enemy_budget: Budget::default(),
            income: UnitCost::default(),
            deployments: Vec::new(),
        }
    }

    pub fn terrain(&self) -> &ArenaTerrain {
        &self.terrain
    }

    pub fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }

    pub fn set_budget(&mut self, side: Side, structure: f32, unit: f32) {
        *self.budget_mut(side) = Budget::new(structure, unit);
    }

    /// Resources granted to the friendly side whenever a turn is submitted.
    pub fn set_income(&mut self, structure: f32, unit: f32) {
        self.income = UnitCost { structure, unit };
    }

    pub fn budget(&self, side: Side) -> Budget {
        match side {
            Side::Friendly => self.friendly_budget,
            Side::Enemy => self.enemy_budget,
        }
    }

    fn budget_mut(&mut self, side: Side) -> &mut Budget {
        match side {
            Side::Friendly => &mut self.friendly_budget,
            Side::Enemy => &mut self.enemy_budget,
        }
    }

    /// Place a structure for either side without paying for it.
    pub fn place(&mut self, side: Side, kind: StructureKind, cell: Location) -> bool {
        if !self.terrain.in_arena(cell) || self.structures.contains_key(&cell) {
            return false;
        }
        self.structures.insert(
            cell,
            ArenaStructure {
                kind,
                side,
                health: kind.max_health(false),
                upgraded: false,
                pending_removal: false,
            },
        );
        true
    }

    pub fn set_health(&mut self, cell: Location, health: f32) {
        if let Some(structure) = self.structures.get_mut(&cell) {
            structure.health = health;
        }
    }

    /// Apply damage to the structure at `cell`, destroying it at zero
    /// health. Returns true if it was destroyed.
    pub fn damage(&mut self, cell: Location, amount: f32) -> bool {
        let destroyed = match self.structures.get_mut(&cell) {
            Some(structure) => {
                structure.health -= amount;
                structure.health <= 0.0
            }
            None => return false,
        };
        if destroyed {
            self.structures.remove(&cell);
        }
        destroyed
    }

    /// An opponent `attacker` at `from` hits the structure at `target` once.
    /// Applies the damage and returns the frame the engine would emit.
    pub fn strike(
        &mut self,
        from: Location,
        target: Location,
        amount: f32,
        attacker: MobileKind,
    ) -> FrameEvents {
        let mut frame = FrameEvents::default();
        let owner = match self.structures.get(&target) {
            Some(structure) => (structure.side, structure.kind),
            None => return frame,
        };

        frame.attacks.push(AttackEvent {
            attacker_cell: from,
            target_cell: target,
            damage: amount,
            attacker_kind: attacker.into(),
            attacker_side: owner.0.opponent(),
        });

        if self.damage(target, amount) {
            frame.deaths.push(DeathEvent {
                cell: target,
                kind: owner.1.into(),
                side: owner.0,
                removed_by_owner: false,
            });
        }
        frame
    }

    pub fn deployments(&self) -> &[Deployment] {
        &self.deployments
    }

    pub fn structures(&self, side: Side) -> Vec<(Location, StructureSnapshot)> {
        let mut found: Vec<(Location, StructureSnapshot)> = self
            .structures
            .iter()
            .filter(|(_, s)| s.side == side)
            .map(|(loc, s)| (*loc, s.snapshot()))
            .collect();
        found.sort_by_key(|(loc, _)| *loc);
        found
    }

    fn spawn_structure(&mut self, kind: StructureKind, cell: Location) -> bool {
        if !self.terrain.is_home(cell, Side::Friendly) || self.structures.contains_key(&cell) {
            return false;
        }
        if !self
            .friendly_budget
            .try_spend(&UnitCost::structure(structure_cost(kind)))
        {
            return false;
        }
        self.place(Side::Friendly, kind, cell)
    }

    fn spawn_mobile(&mut self, kind: MobileKind, cell: Location, count: u32) -> u32 {
        let flags = self.terrain.get(cell);
        if !flags.intersects(CellFlags::BOTTOM_LEFT | CellFlags::BOTTOM_RIGHT)
            || self.structures.contains_key(&cell)
        {
            return 0;
        }
        let cost = UnitCost::unit(mobile_cost(kind));
        let placed = count.min(self.friendly_budget.affordable_count(&cost));
        if placed == 0 || !self.friendly_budget.try_spend(&cost.scaled(placed)) {
            return 0;
        }
        self.deployments.push(Deployment {
            turn: self.turn,
            kind,
            cell,
            count: placed,
        });
        placed
    }
}

impl GameBoard for Arena {
    fn turn_number(&self) -> u32 {
        self.turn
    }

    fn attempt_spawn(&mut self, kind: UnitKind, cells: &[Location], count: u32) -> u32 {
        let mut placed = 0;
        for &cell in cells {
            placed += match kind {
                UnitKind::Structure(kind) => self.spawn_structure(kind, cell) as u32,
                UnitKind::Mobile(kind) => self.spawn_mobile(kind, cell, count),
            };
        }
        placed
    }

    fn attempt_upgrade(&mut self, cells: &[Location]) -> u32 {
        let mut upgraded = 0;
        for cell in cells {
            let kind = match self.structures.get(cell) {
                Some(s) if s.side == Side::Friendly && !s.upgraded && !s.pending_removal => s.kind,
                _ => continue,
            };
            if !self
                .friendly_budget
                .try_spend(&UnitCost::structure(structure_upgrade_cost(kind)))
            {
                continue;
            }
            if let Some(structure) = self.structures.get_mut(cell) {
                structure.health += kind.max_health(true) - kind.max_health(false);
                structure.upgraded = true;
                upgraded += 1;
            }
        }
        upgraded
    }

    fn attempt_remove(&mut self, cells: &[Location]) -> u32 {
        let mut removed = 0;
        for cell in cells {
            if let Some(structure) = self.structures.get_mut(cell) {
                if structure.side == Side::Friendly && !structure.pending_removal {
                    structure.pending_removal = true;
                    removed += 1;
                }
            }
        }
        removed
    }

    fn current_resource(&self, currency: Currency) -> f32 {
        self.friendly_budget.get(currency)
    }

    fn unit_cost(&self, kind: UnitKind) -> UnitCost {
        match kind {
            UnitKind::Structure(kind) => UnitCost::structure(structure_cost(kind)),
            UnitKind::Mobile(kind) => UnitCost::unit(mobile_cost(kind)),
        }
    }

    fn upgrade_cost(&self, kind: UnitKind) -> UnitCost {
        match kind {
            UnitKind::Structure(kind) => UnitCost::structure(structure_upgrade_cost(kind)),
            UnitKind::Mobile(_) => UnitCost::default(),
        }
    }

    fn path_to_edge(&self, cell: Location) -> Vec<Location> {
        if !self.terrain.in_arena(cell) {
            return Vec::new();
        }
        let goal = self.terrain.target_edge(cell, Side::Friendly);
        let successors = |loc: &Location| {
            [(1, 0), (-1, 0), (0, 1), (0, -1)]
                .iter()
                .filter_map(|&(dx, dy)| loc.offset(dx, dy))
                .filter(|next| self.terrain.in_arena(*next) && !self.structures.contains_key(next))
                .collect::<Vec<_>>()
        };
        bfs(&cell, successors, |loc| self.terrain.get(*loc).intersects(goal))
            .unwrap_or_else(|| vec![cell])
    }

    fn attackers_of(&self, cell: Location, side: Side) -> Vec<(Location, StructureSnapshot)> {
        let mut attackers: Vec<(Location, StructureSnapshot)> = self
            .structures
            .iter()
            .filter(|(loc, s)| {
                s.side == side.opponent()
                    && s.kind == StructureKind::Turret
                    && loc.within_radius(cell, s.range())
            })
            .map(|(loc, s)| (*loc, s.snapshot()))
            .collect();
        attackers.sort_by_key(|(loc, _)| *loc);
        attackers
    }

    fn structure_at(&self, cell: Location) -> Option<StructureSnapshot> {
        self.structures.get(&cell).map(|s| s.snapshot())
    }

    fn friendly_edges(&self) -> Vec<Location> {
        self.terrain
            .edge(CellFlags::BOTTOM_LEFT | CellFlags::BOTTOM_RIGHT)
    }

    fn submit_turn(&mut self) {
        let removed: Vec<Location> = self
            .structures
            .iter()
            .filter(|(_, s)| s.pending_removal)
            .map(|(loc, _)| *loc)
            .collect();

        for cell in removed {
            if let Some(structure) = self.structures.remove(&cell) {
                let mut paid = structure_cost(structure.kind);
                if structure.upgraded {
                    paid += structure_upgrade_cost(structure.kind);
                }
                let refund = paid * ARENA_REMOVAL_REFUND * structure.snapshot().health_ratio();
                self.friendly_budget.credit(Currency::Structure, refund);
                debug!("Arena: removed {:?} at {} for {:.2}", structure.kind, cell, refund);
            }
        }

        self.friendly_budget
            .credit(Currency::Structure, self.income.structure);
        self.friendly_budget.credit(Currency::Unit, self.income.unit);
        self.turn += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diamond_shape_and_edges() {
        let terrain = ArenaTerrain::new();
        assert!(terrain.in_arena(Location::from_xy(13, 0)));
        assert!(terrain.in_arena(Location::from_xy(14, 0)));
        assert!(!terrain.in_arena(Location::from_xy(12, 0)));
        assert!(terrain.in_arena(Location::from_xy(0, 13)));
        assert!(terrain.in_arena(Location::from_xy(27, 14)));
        assert!(!terrain.in_arena(Location::from_xy(28, 14)));

        assert_eq!(terrain.edge(CellFlags::BOTTOM_LEFT).len(), 14);
        assert_eq!(terrain.edge(CellFlags::TOP_RIGHT).len(), 14);
        assert!(terrain
            .get(Location::from_xy(6, 7))
            .contains(CellFlags::BOTTOM_LEFT));
        assert!(terrain
            .get(Location::from_xy(21, 7))
            .contains(CellFlags::BOTTOM_RIGHT));
        assert!(terrain.is_home(Location::from_xy(13, 13), Side::Friendly));
        assert!(terrain.is_home(Location::from_xy(13, 14), Side::Enemy));
    }

    #[test]
    fn spawns_are_paid_and_confined_to_our_half() {
        let mut arena = Arena::new();
        arena.set_budget(Side::Friendly, 3.0, 2.0);

        assert_eq!(
            arena.attempt_spawn(UnitKind::TURRET, &[Location::from_xy(13, 14)], 1),
            0
        );
        assert_eq!(
            arena.attempt_spawn(
                UnitKind::TURRET,
                &[Location::from_xy(3, 12), Location::from_xy(4, 12)],
                1
            ),
            1
        );
        assert_eq!(arena.current_resource(Currency::Structure), 1.0);

        assert_eq!(
            arena.attempt_spawn(UnitKind::SCOUT, &[Location::from_xy(6, 7)], 5),
            2
        );
        assert_eq!(arena.current_resource(Currency::Unit), 0.0);
        assert_eq!(arena.deployments()[0].count, 2);
    }

    #[test]
    fn removal_refunds_when_the_turn_resolves() {
        let mut arena = Arena::new();
        arena.set_budget(Side::Friendly, 2.0, 0.0);
        let cell = Location::from_xy(5, 11);
        arena.attempt_spawn(UnitKind::TURRET, &[cell], 1);
        arena.set_health(cell, 30.0);

        assert_eq!(arena.attempt_remove(&[cell]), 1);
        assert_eq!(arena.attempt_remove(&[cell]), 0);
        assert!(arena.structure_at(cell).is_some());

        arena.submit_turn();
        assert!(arena.structure_at(cell).is_none());
        let expected = TURRET_COST * ARENA_REMOVAL_REFUND * 0.5;
        assert!((arena.current_resource(Currency::Structure) - expected).abs() < 1e-5);
        assert_eq!(arena.turn_number(), 1);
    }

    #[test]
    fn path_reaches_the_opposite_edge() {
        let arena = Arena::new();
        let start = Location::from_xy(6, 7);
        let path = arena.path_to_edge(start);
        assert_eq!(path.first(), Some(&start));
        let end = *path.last().unwrap();
        assert!(arena.terrain().get(end).contains(CellFlags::TOP_RIGHT));
        assert!(path.windows(2).all(|w| w[0].distance_squared_to(w[1]) == 1));
    }

    #[test]
    fn attackers_are_opposing_turrets_in_range() {
        let mut arena = Arena::new();
        let target = Location::from_xy(13, 15);
        arena.place(Side::Enemy, StructureKind::Turret, Location::from_xy(13, 17));
        arena.place(Side::Enemy, StructureKind::Turret, Location::from_xy(13, 18));
        arena.place(Side::Enemy, StructureKind::Wall, Location::from_xy(14, 15));
        arena.place(Side::Friendly, StructureKind::Turret, Location::from_xy(13, 13));

        let attackers = arena.attackers_of(target, Side::Friendly);
        assert_eq!(attackers.len(), 1);
        assert_eq!(attackers[0].0, Location::from_xy(13, 17));
    }

    #[test]
    fn strike_reports_attack_and_death() {
        let mut arena = Arena::new();
        let wall = Location::from_xy(10, 12);
        arena.place(Side::Friendly, StructureKind::Wall, wall);

        let frame = arena.strike(Location::from_xy(10, 14), wall, 40.0, MobileKind::Demolisher);
        assert_eq!(frame.attacks.len(), 1);
        assert_eq!(frame.attacks[0].attacker_side, Side::Enemy);
        assert!(frame.deaths.is_empty());

        let frame = arena.strike(Location::from_xy(10, 14), wall, 40.0, MobileKind::Demolisher);
        assert_eq!(frame.deaths.len(), 1);
        assert!(arena.structure_at(wall).is_none());
    }
}
