//! OffenseStep: spends the unit budget.
//!
//! Early turns stall with interceptors on random open edge cells. After
//! that, every `scout_period` turns a scout batch goes out from the lane
//! with the least expected damage.

use crate::lanes::least_damage_lane;
use crate::location::*;
use crate::step::*;
use crate::unit::*;
use log::*;
use rand::Rng;

pub struct OffenseStep;

fn stall(ctx: &mut PlanContext) {
    let cost = ctx.board.unit_cost(UnitKind::INTERCEPTOR);
    if cost.unit <= 0.0 {
        warn!("Offense: interceptors cost nothing, not stalling");
        return;
    }
    let edges: Vec<Location> = ctx
        .board
        .friendly_edges()
        .into_iter()
        .filter(|&cell| !ctx.board.contains_stationary_unit(cell))
        .collect();
    if edges.is_empty() {
        return;
    }

    let mut deployed = 0;
    while ctx.can_afford(&cost) {
        let cell = edges[ctx.rng.gen_range(0..edges.len())];
        if ctx.deploy(MobileKind::Interceptor, cell, 1) == 0 {
            break;
        }
        deployed += 1;
    }
    debug!("Offense: {} interceptors out", deployed);
}

fn send_scouts(ctx: &mut PlanContext) {
    let config = ctx.config;
    let offense = &config.offense;
    let lanes = offense.lanes();
    let lane = match least_damage_lane(&*ctx.board, &lanes, offense.lane_hit_damage) {
        Some(lane) => lane,
        None => return,
    };
    let sent = ctx.deploy(MobileKind::Scout, lane, offense.scout_count);
    debug!("Offense: {} scouts from {}", sent, lane);
}

impl TurnStep for OffenseStep {
    fn name(&self) -> &str {
        "offense"
    }

    fn run(&self, ctx: &mut PlanContext) {
        let turn = ctx.turn();
        let stall_turns = ctx.config.offense.stall_turns;
        let period = ctx.config.offense.scout_period;
        if turn < stall_turns {
            stall(ctx);
        } else if period > 0 && turn % period == 1 % period {
            send_scouts(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{GameBoard, StructureSnapshot};
    use crate::budget::UnitCost;
    use crate::config::StrategyConfig;
    use crate::layout::TargetLayout;
    use crate::registry::StructureRegistry;
    use crate::telemetry::TurnTelemetry;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// Board that takes every deployment for free.
    #[derive(Default)]
    struct FreeBoard {
        spawned: u32,
    }

    impl GameBoard for FreeBoard {
        fn turn_number(&self) -> u32 {
            0
        }
        fn attempt_spawn(&mut self, _: UnitKind, cells: &[Location], count: u32) -> u32 {
            let placed = cells.len() as u32 * count;
            self.spawned += placed;
            placed
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
            vec![cell]
        }
        fn attackers_of(&self, _: Location, _: Side) -> Vec<(Location, StructureSnapshot)> {
            Vec::new()
        }
        fn structure_at(&self, _: Location) -> Option<StructureSnapshot> {
            None
        }
        fn friendly_edges(&self) -> Vec<Location> {
            vec![Location::from_xy(13, 0)]
        }
        fn submit_turn(&mut self) {}
    }

    #[test]
    fn free_interceptors_do_not_stall_forever() {
        let mut board = FreeBoard::default();
        let mut registry = StructureRegistry::new();
        let telemetry = TurnTelemetry::new();
        let layout = TargetLayout::default();
        let config = StrategyConfig::default();
        let mut pending = Vec::new();
        let mut refunds = Vec::new();
        let mut rng = SmallRng::seed_from_u64(3);

        let mut ctx = PlanContext::new(
            &mut board,
            &mut registry,
            &telemetry,
            &layout,
            &config,
            &mut pending,
            &mut refunds,
            &mut rng,
        );
        OffenseStep.run(&mut ctx);
        drop(ctx);

        assert_eq!(board.spawned, 0);
    }
}
