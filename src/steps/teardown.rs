//! TeardownStep: salvages damaged structures that the worst threat seen last
//! turn would finish off.
//!
//! A wall or turret qualifies when its health is strictly between zero and
//! its maximum and strictly below `maxDamage`, the largest cumulative damage
//! any single cell took. Walls are always salvaged. Turrets are salvaged only
//! when the refund leaves enough budget to rebuild them, and are then queued
//! for the refund rebuild next turn.

use crate::board::StructureSnapshot;
use crate::location::*;
use crate::step::*;
use crate::unit::{Currency, StructureKind};
use log::*;

pub struct TeardownStep;

/// A structure selected for salvage.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SalvageCandidate {
    pub cell: Location,
    pub snapshot: StructureSnapshot,
}

/// Registered walls and turrets that qualify for salvage under `max_damage`,
/// walls first, each kind in placement order.
pub fn salvage_candidates(ctx: &PlanContext, max_damage: f32) -> Vec<SalvageCandidate> {
    if max_damage <= 0.0 {
        return Vec::new();
    }

    [StructureKind::Wall, StructureKind::Turret]
        .iter()
        .flat_map(|&kind| ctx.registry.cells(kind).iter().copied())
        .filter_map(|cell| {
            let snapshot = ctx.board.structure_at(cell)?;
            let qualifies = snapshot.health > 0.0
                && snapshot.health < snapshot.max_health
                && snapshot.health < max_damage;
            if qualifies {
                Some(SalvageCandidate { cell, snapshot })
            } else {
                None
            }
        })
        .collect()
}

impl TurnStep for TeardownStep {
    fn name(&self) -> &str {
        "teardown"
    }

    fn is_applicable(&self, ctx: &PlanContext) -> bool {
        ctx.turn() > 0 && !ctx.telemetry.is_empty()
    }

    fn run(&self, ctx: &mut PlanContext) {
        let max_damage = ctx.telemetry.max_damage();
        let candidates = salvage_candidates(ctx, max_damage);
        let config = ctx.config;
        let refunds = &config.teardown;

        for candidate in candidates {
            let SalvageCandidate { cell, snapshot } = candidate;
            let ratio = snapshot.health_ratio();

            match snapshot.kind {
                StructureKind::Wall => {
                    let base = if snapshot.upgraded {
                        refunds.wall_upgraded_refund
                    } else {
                        refunds.wall_refund
                    };
                    ctx.salvage(cell, base * ratio);
                }
                StructureKind::Turret => {
                    let base = if snapshot.upgraded {
                        refunds.turret_upgraded_refund
                    } else {
                        refunds.turret_refund
                    };
                    let refund = base * ratio;

                    let mut rebuild = ctx.board.unit_cost(StructureKind::Turret.into()).structure;
                    if snapshot.upgraded {
                        rebuild += ctx.board.upgrade_cost(StructureKind::Turret.into()).structure;
                    }

                    let projected = ctx.budget().get(Currency::Structure) + refund;
                    if projected < rebuild {
                        debug!(
                            "Teardown: keeping turret at {}, {:.2} would not cover a {:.2} rebuild",
                            cell, projected, rebuild
                        );
                        continue;
                    }

                    if ctx.salvage(cell, refund) {
                        ctx.refund_queue.push(RefundRebuild {
                            cell,
                            upgraded: snapshot.upgraded,
                        });
                    }
                }
                StructureKind::Support => {}
            }
        }
    }
}
