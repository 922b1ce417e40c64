//! OpeningStep: places the fixed opening layout on the first turn.
//!
//! Walls go down first, then turrets, then supports. Every cell is tried;
//! a cell the budget no longer covers is simply skipped.

use crate::step::*;
use crate::unit::StructureKind;
use log::*;

pub struct OpeningStep;

impl TurnStep for OpeningStep {
    fn name(&self) -> &str {
        "opening"
    }

    fn is_applicable(&self, ctx: &PlanContext) -> bool {
        ctx.turn() == 0
    }

    fn run(&self, ctx: &mut PlanContext) {
        for kind in [StructureKind::Wall, StructureKind::Turret, StructureKind::Support] {
            let cells = ctx.layout.opening(kind).to_vec();
            let placed = cells.into_iter().filter(|&cell| ctx.spawn(cell, kind)).count();
            debug!("Opening: placed {} {:?}", placed, kind);
        }
    }
}
