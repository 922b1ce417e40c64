//! RefundRebuildStep: rebuilds the turrets salvaged on the previous turn,
//! restoring the upgrade they had.

use crate::step::*;
use crate::unit::StructureKind;
use log::*;

pub struct RefundRebuildStep;

impl TurnStep for RefundRebuildStep {
    fn name(&self) -> &str {
        "refund_rebuild"
    }

    fn is_applicable(&self, ctx: &PlanContext) -> bool {
        !ctx.refund_queue.is_empty()
    }

    fn run(&self, ctx: &mut PlanContext) {
        let queue = std::mem::take(ctx.refund_queue);
        for entry in queue {
            let rebuilt = ctx.spawn(entry.cell, StructureKind::Turret);
            if rebuilt && entry.upgraded {
                ctx.upgrade(entry.cell);
            }
            if !rebuilt {
                debug!("Refund rebuild: could not rebuild turret at {}", entry.cell);
            }
        }
    }
}
