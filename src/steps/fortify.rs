//! FortifyStep: shores up turrets that took damage last turn.
//!
//! Turrets are handled in order of damage taken, most first. For each, up to
//! `max_cover_walls` target-layout walls within `wall_radius` are made to
//! exist (walls already standing count toward the cap), the turret is
//! upgraded, then up to `max_cover_walls` of those walls are upgraded.

use crate::location::*;
use crate::step::*;
use crate::unit::StructureKind;
use log::*;

pub struct FortifyStep;

/// Registered turrets that took damage, most damaged first. Equal damage
/// keeps placement order. A turret with no record of its own takes the
/// damage recorded on the cell just below it.
pub fn damaged_turrets(ctx: &PlanContext) -> Vec<(Location, f32)> {
    let mut damaged: Vec<(Location, f32)> = ctx
        .registry
        .cells(StructureKind::Turret)
        .iter()
        .filter_map(|&cell| {
            ctx.telemetry
                .threat_at(cell)
                .or_else(|| {
                    cell.offset(0, -1)
                        .and_then(|below| ctx.telemetry.threat_at(below))
                })
                .map(|stat| (cell, stat.damage_dealt))
        })
        .filter(|(_, damage)| *damage > 0.0)
        .collect();
    damaged.sort_by(|a, b| b.1.total_cmp(&a.1));
    damaged
}

impl TurnStep for FortifyStep {
    fn name(&self) -> &str {
        "fortify"
    }

    fn is_applicable(&self, ctx: &PlanContext) -> bool {
        ctx.turn() > 0 && ctx.config.fortify.enabled && !ctx.telemetry.is_empty()
    }

    fn run(&self, ctx: &mut PlanContext) {
        let config = ctx.config;
        let cap = config.fortify.max_cover_walls;

        for (turret, damage) in damaged_turrets(ctx) {
            // Salvaged or lost since the threat was recorded.
            if !ctx.registry.contains_kind(turret, StructureKind::Turret) {
                continue;
            }

            let walls = ctx
                .layout
                .within(StructureKind::Wall, turret, config.fortify.wall_radius);

            let mut covered = 0;
            for &wall in &walls {
                if covered >= cap {
                    break;
                }
                if ctx.registry.contains_kind(wall, StructureKind::Wall)
                    || ctx.spawn(wall, StructureKind::Wall)
                {
                    covered += 1;
                }
            }

            ctx.upgrade(turret);

            let mut upgraded = 0;
            for &wall in &walls {
                if upgraded >= cap {
                    break;
                }
                if ctx.registry.contains_kind(wall, StructureKind::Wall)
                    && !ctx.registry.is_upgraded(wall)
                    && ctx.upgrade(wall)
                {
                    upgraded += 1;
                }
            }

            debug!(
                "Fortify: turret at {} took {:.1}, {} walls cover, {} upgraded",
                turret, damage, covered, upgraded
            );
        }
    }
}
