//! The strategy's own belief about which cells hold its structures.
//!
//! The registry only changes through its `record_*` methods. Spawns and
//! upgrades wrap the engine call and are recorded only when the engine
//! accepts them. A cell holds at most one structure kind at a time.

use crate::board::GameBoard;
use crate::location::*;
use crate::unit::*;
use fnv::{FnvHashMap, FnvHashSet};
use log::*;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureRecord {
    pub cell: Location,
    pub kind: StructureKind,
    pub upgraded: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StructureRegistry {
    records: FnvHashMap<Location, StructureRecord>,
    /// Placement order per kind.
    walls: Vec<Location>,
    supports: Vec<Location>,
    turrets: Vec<Location>,
    /// Cells flagged for salvage this turn. The engine only clears them when
    /// the turn resolves, so they stay unavailable until then.
    salvaging: FnvHashSet<Location>,
}

impl StructureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn order_mut(&mut self, kind: StructureKind) -> &mut Vec<Location> {
        match kind {
            StructureKind::Wall => &mut self.walls,
            StructureKind::Support => &mut self.supports,
            StructureKind::Turret => &mut self.turrets,
        }
    }

    fn insert(&mut self, cell: Location, kind: StructureKind, upgraded: bool) {
        self.records.insert(
            cell,
            StructureRecord {
                cell,
                kind,
                upgraded,
            },
        );
        self.order_mut(kind).push(cell);
    }

    fn remove(&mut self, cell: Location) -> Option<StructureRecord> {
        let record = self.records.remove(&cell)?;
        self.order_mut(record.kind).retain(|&c| c != cell);
        Some(record)
    }

    /// Attempt to spawn `kind` at `cell`; the record is created only if the
    /// engine accepted the spawn.
    pub fn record_spawn(
        &mut self,
        board: &mut dyn GameBoard,
        cell: Location,
        kind: StructureKind,
    ) -> bool {
        if self.is_claimed(cell) {
            return false;
        }
        if board.attempt_spawn(kind.into(), &[cell], 1) == 1 {
            self.insert(cell, kind, false);
            true
        } else {
            false
        }
    }

    /// Attempt to upgrade the structure recorded at `cell`.
    pub fn record_upgrade(&mut self, board: &mut dyn GameBoard, cell: Location) -> bool {
        match self.records.get(&cell) {
            Some(record) if !record.upgraded => {}
            _ => return false,
        }
        if board.attempt_upgrade(&[cell]) != 1 {
            return false;
        }
        if let Some(record) = self.records.get_mut(&cell) {
            record.upgraded = true;
        }
        true
    }

    /// Drop a structure the strategy chose to salvage. The cell stays
    /// claimed until [`StructureRegistry::release_claims`].
    pub fn record_removal(&mut self, cell: Location) -> Option<StructureRecord> {
        let record = self.remove(cell)?;
        self.salvaging.insert(cell);
        Some(record)
    }

    /// Drop a structure the engine reported destroyed, whatever the cause.
    pub fn record_destruction(&mut self, cell: Location) -> Option<StructureRecord> {
        self.remove(cell)
    }

    pub fn contains(&self, cell: Location) -> bool {
        self.records.contains_key(&cell)
    }

    pub fn contains_kind(&self, cell: Location, kind: StructureKind) -> bool {
        self.kind_at(cell) == Some(kind)
    }

    /// Occupied, or freed by a salvage that has not resolved yet.
    pub fn is_claimed(&self, cell: Location) -> bool {
        self.contains(cell) || self.salvaging.contains(&cell)
    }

    pub fn kind_at(&self, cell: Location) -> Option<StructureKind> {
        self.records.get(&cell).map(|r| r.kind)
    }

    pub fn get(&self, cell: Location) -> Option<&StructureRecord> {
        self.records.get(&cell)
    }

    pub fn is_upgraded(&self, cell: Location) -> bool {
        self.records.get(&cell).map(|r| r.upgraded).unwrap_or(false)
    }

    /// Cells holding `kind`, in the order they were placed.
    pub fn cells(&self, kind: StructureKind) -> &[Location] {
        match kind {
            StructureKind::Wall => &self.walls,
            StructureKind::Support => &self.supports,
            StructureKind::Turret => &self.turrets,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn release_claims(&mut self) {
        self.salvaging.clear();
    }

    /// Bring the registry in line with what the engine reports: records with
    /// no matching friendly structure are dropped and upgrade flags are
    /// refreshed. Returns the number of records dropped.
    pub fn reconcile(&mut self, board: &dyn GameBoard) -> usize {
        let stale: Vec<Location> = self
            .records
            .values()
            .filter(|record| match board.structure_at(record.cell) {
                Some(snapshot) => snapshot.side != Side::Friendly || snapshot.kind != record.kind,
                None => true,
            })
            .map(|record| record.cell)
            .collect();

        for &cell in &stale {
            debug!("Registry: dropping stale record at {}", cell);
            self.remove(cell);
        }

        for record in self.records.values_mut() {
            if let Some(snapshot) = board.structure_at(record.cell) {
                record.upgraded = snapshot.upgraded;
            }
        }

        stale.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn spawn_is_recorded_only_on_success() {
        let mut arena = Arena::new();
        arena.set_budget(Side::Friendly, 2.0, 0.0);
        let mut registry = StructureRegistry::new();

        let cell = Location::from_xy(3, 12);
        assert!(registry.record_spawn(&mut arena, cell, StructureKind::Turret));
        assert!(registry.contains_kind(cell, StructureKind::Turret));

        // Out of budget.
        let other = Location::from_xy(4, 12);
        assert!(!registry.record_spawn(&mut arena, other, StructureKind::Turret));
        assert!(!registry.contains(other));
    }

    #[test]
    fn one_kind_per_cell() {
        let mut arena = Arena::new();
        arena.set_budget(Side::Friendly, 10.0, 0.0);
        let mut registry = StructureRegistry::new();

        let cell = Location::from_xy(10, 10);
        assert!(registry.record_spawn(&mut arena, cell, StructureKind::Wall));
        assert!(!registry.record_spawn(&mut arena, cell, StructureKind::Turret));
        assert_eq!(registry.kind_at(cell), Some(StructureKind::Wall));
        assert_eq!(registry.cells(StructureKind::Turret), &[] as &[Location]);
    }

    #[test]
    fn upgrade_flips_flag_once() {
        let mut arena = Arena::new();
        arena.set_budget(Side::Friendly, 20.0, 0.0);
        let mut registry = StructureRegistry::new();

        let cell = Location::from_xy(7, 10);
        assert!(!registry.record_upgrade(&mut arena, cell));
        assert!(registry.record_spawn(&mut arena, cell, StructureKind::Turret));
        assert!(registry.record_upgrade(&mut arena, cell));
        assert!(registry.is_upgraded(cell));
        assert!(!registry.record_upgrade(&mut arena, cell));
    }

    #[test]
    fn removal_keeps_cell_claimed_until_release() {
        let mut arena = Arena::new();
        arena.set_budget(Side::Friendly, 10.0, 0.0);
        let mut registry = StructureRegistry::new();

        let cell = Location::from_xy(5, 11);
        registry.record_spawn(&mut arena, cell, StructureKind::Wall);
        let removed = registry.record_removal(cell).unwrap();
        assert_eq!(removed.kind, StructureKind::Wall);
        assert!(!registry.contains(cell));
        assert!(registry.is_claimed(cell));

        registry.release_claims();
        assert!(!registry.is_claimed(cell));
        assert!(registry.record_destruction(cell).is_none());
    }

    #[test]
    fn reconcile_drops_structures_the_engine_lost() {
        let mut arena = Arena::new();
        arena.set_budget(Side::Friendly, 10.0, 0.0);
        let mut registry = StructureRegistry::new();

        let kept = Location::from_xy(6, 11);
        let lost = Location::from_xy(7, 11);
        registry.record_spawn(&mut arena, kept, StructureKind::Wall);
        registry.record_spawn(&mut arena, lost, StructureKind::Wall);
        arena.damage(lost, 1000.0);

        assert_eq!(registry.reconcile(&arena), 1);
        assert!(registry.contains(kept));
        assert!(!registry.contains(lost));
        assert_eq!(registry.cells(StructureKind::Wall), &[kept]);
    }
}
