//! Core types for the per-turn step pipeline.
//!
//! `PlanContext` is everything a step may read or change during one turn.
//! `TurnStep` is the trait each stage of the turn implements. Steps run in
//! order against the same context, so a step sees the spending of every
//! step before it.

use crate::board::GameBoard;
use crate::budget::*;
use crate::config::StrategyConfig;
use crate::layout::TargetLayout;
use crate::location::*;
use crate::registry::StructureRegistry;
use crate::telemetry::{DeathRecord, TurnTelemetry};
use crate::unit::*;
use log::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

/// A turret salvaged this turn, to be rebuilt next turn with the refund.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRebuild {
    pub cell: Location,
    pub upgraded: bool,
}

/// Counts of engine actions requested and accepted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTally {
    pub attempted: u32,
    pub succeeded: u32,
}

impl ActionTally {
    fn record(&mut self, succeeded: bool) -> bool {
        self.attempted += 1;
        if succeeded {
            self.succeeded += 1;
        }
        succeeded
    }

    pub fn since(&self, earlier: ActionTally) -> ActionTally {
        ActionTally {
            attempted: self.attempted - earlier.attempted,
            succeeded: self.succeeded - earlier.succeeded,
        }
    }
}

/// Mutable state shared by every step for the duration of one turn.
pub struct PlanContext<'a> {
    pub board: &'a mut dyn GameBoard,
    pub registry: &'a mut StructureRegistry,
    pub telemetry: &'a TurnTelemetry,
    pub layout: &'a TargetLayout,
    pub config: &'a StrategyConfig,
    /// Lost structures still waiting for a successful respawn.
    pub pending_deaths: &'a mut Vec<DeathRecord>,
    pub refund_queue: &'a mut Vec<RefundRebuild>,
    pub rng: &'a mut SmallRng,
    /// Projected resources: engine balance at turn start, less our spending,
    /// plus salvage refunds.
    budget: Budget,
    salvage_refunds: f32,
    tally: ActionTally,
}

impl<'a> PlanContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        board: &'a mut dyn GameBoard,
        registry: &'a mut StructureRegistry,
        telemetry: &'a TurnTelemetry,
        layout: &'a TargetLayout,
        config: &'a StrategyConfig,
        pending_deaths: &'a mut Vec<DeathRecord>,
        refund_queue: &'a mut Vec<RefundRebuild>,
        rng: &'a mut SmallRng,
    ) -> Self {
        let budget = Budget::new(
            board.current_resource(Currency::Structure),
            board.current_resource(Currency::Unit),
        );
        PlanContext {
            board,
            registry,
            telemetry,
            layout,
            config,
            pending_deaths,
            refund_queue,
            rng,
            budget,
            salvage_refunds: 0.0,
            tally: ActionTally::default(),
        }
    }

    pub fn turn(&self) -> u32 {
        self.board.turn_number()
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    /// Structure refunds credited by salvage so far this turn.
    pub fn salvage_refunds(&self) -> f32 {
        self.salvage_refunds
    }

    pub fn tally(&self) -> ActionTally {
        self.tally
    }

    /// Spawn a structure if the projected budget covers it.
    pub fn spawn(&mut self, cell: Location, kind: StructureKind) -> bool {
        let cost = self.board.unit_cost(kind.into());
        let placed = self.budget.can_afford(&cost)
            && self.registry.record_spawn(&mut *self.board, cell, kind);
        if placed {
            self.budget.try_spend(&cost);
        }
        self.tally.record(placed)
    }

    /// Upgrade the registered structure at `cell` if the projected budget
    /// covers it.
    pub fn upgrade(&mut self, cell: Location) -> bool {
        let kind = match self.registry.get(cell) {
            Some(record) if !record.upgraded => record.kind,
            _ => return self.tally.record(false),
        };
        let cost = self.board.upgrade_cost(kind.into());
        let upgraded = self.budget.can_afford(&cost)
            && self.registry.record_upgrade(&mut *self.board, cell);
        if upgraded {
            self.budget.try_spend(&cost);
        }
        self.tally.record(upgraded)
    }

    /// Flag a registered structure for removal and credit `refund` to the
    /// projected structure budget.
    pub fn salvage(&mut self, cell: Location, refund: f32) -> bool {
        let removed = self.registry.contains(cell) && self.board.attempt_remove(&[cell]) == 1;
        if removed {
            self.registry.record_removal(cell);
            self.budget.credit(Currency::Structure, refund);
            self.salvage_refunds += refund.max(0.0);
            info!("Salvaged {} for {:.2}", cell, refund);
        }
        self.tally.record(removed)
    }

    /// Deploy up to `count` mobile units at `cell`, capped by what the
    /// projected budget covers. Returns the number deployed.
    pub fn deploy(&mut self, kind: MobileKind, cell: Location, count: u32) -> u32 {
        let cost = self.board.unit_cost(kind.into());
        let count = count.min(self.budget.affordable_count(&cost));
        if count == 0 {
            return 0;
        }
        let placed = self.board.attempt_spawn(kind.into(), &[cell], count);
        self.budget.try_spend(&cost.scaled(placed));
        self.tally.record(placed > 0);
        placed
    }

    pub fn can_afford(&self, cost: &UnitCost) -> bool {
        self.budget.can_afford(cost)
    }

    /// True once no structure action of any kind is affordable.
    pub fn structures_exhausted(&self) -> bool {
        let board = &*self.board;
        [StructureKind::Wall, StructureKind::Turret]
            .iter()
            .flat_map(|&kind| [board.unit_cost(kind.into()), board.upgrade_cost(kind.into())])
            .all(|cost| !self.budget.can_afford(&cost))
    }
}

/// One stage of the turn.
///
/// Steps are stateless; everything that persists between turns lives in the
/// strategy and reaches the step through `PlanContext`.
pub trait TurnStep {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    fn is_applicable(&self, _ctx: &PlanContext) -> bool {
        true
    }

    fn run(&self, ctx: &mut PlanContext);
}

/// What one step did during a turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub name: String,
    pub actions: ActionTally,
}

/// Summary of one completed turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub turn: u32,
    pub budget_before: Budget,
    pub budget_after: Budget,
    pub salvage_refunds: f32,
    pub steps: Vec<StepReport>,
}

impl TurnReport {
    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.name == name)
    }
}
