use crate::budget::UnitCost;
use crate::location::*;
use crate::unit::*;
use serde::{Deserialize, Serialize};

/// What the game engine reports about a stationary unit in a cell.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructureSnapshot {
    pub kind: StructureKind,
    pub side: Side,
    pub health: f32,
    pub max_health: f32,
    pub upgraded: bool,
}

impl StructureSnapshot {
    pub fn health_ratio(&self) -> f32 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Alive but below full health.
    pub fn is_damaged(&self) -> bool {
        self.health > 0.0 && self.health < self.max_health
    }
}

/// The game engine as seen by the strategy.
///
/// Every spending call fails softly: it reports how many of the requested
/// placements went through and never errors. Implementations exist for the
/// live engine (provided by the host) and for offline play
/// ([`crate::arena::Arena`]).
pub trait GameBoard {
    fn turn_number(&self) -> u32;

    /// Spawn `count` units of `kind` at each cell. Returns the number placed.
    fn attempt_spawn(&mut self, kind: UnitKind, cells: &[Location], count: u32) -> u32;

    fn attempt_upgrade(&mut self, cells: &[Location]) -> u32;

    /// Flag friendly structures for removal. The partial refund is credited
    /// by the engine when the turn resolves.
    fn attempt_remove(&mut self, cells: &[Location]) -> u32;

    fn current_resource(&self, currency: Currency) -> f32;

    fn unit_cost(&self, kind: UnitKind) -> UnitCost;

    fn upgrade_cost(&self, kind: UnitKind) -> UnitCost;

    /// Path a mobile unit spawned at `cell` would take to the opposing edge.
    fn path_to_edge(&self, cell: Location) -> Vec<Location>;

    /// Structures opposing `side` that could hit a unit of `side` at `cell`.
    fn attackers_of(&self, cell: Location, side: Side) -> Vec<(Location, StructureSnapshot)>;

    fn structure_at(&self, cell: Location) -> Option<StructureSnapshot>;

    /// Edge cells mobile units can be deployed from.
    fn friendly_edges(&self) -> Vec<Location>;

    /// Commit every action queued this turn.
    fn submit_turn(&mut self);

    fn contains_stationary_unit(&self, cell: Location) -> bool {
        self.structure_at(cell).is_some()
    }
}
