//! CompletionStep: fills in the target layout, turrets first, then walls.
//!
//! Cells already registered (or freed by a salvage this turn) are skipped.
//! The first failed spawn stops that kind for the turn.

use crate::step::*;
use crate::unit::StructureKind;
use log::*;

pub struct CompletionStep;

impl TurnStep for CompletionStep {
    fn name(&self) -> &str {
        "completion"
    }

    fn is_applicable(&self, ctx: &PlanContext) -> bool {
        ctx.turn() > 0
    }

    fn run(&self, ctx: &mut PlanContext) {
        let layout = ctx.layout;
        for kind in [StructureKind::Turret, StructureKind::Wall] {
            let mut placed = 0;
            for &cell in layout.cells(kind) {
                if ctx.registry.is_claimed(cell) {
                    continue;
                }
                if !ctx.spawn(cell, kind) {
                    debug!("Completion: stopped {:?} at {}", kind, cell);
                    break;
                }
                placed += 1;
            }
            if placed > 0 {
                debug!("Completion: placed {} {:?}", placed, kind);
            }
        }
    }
}
