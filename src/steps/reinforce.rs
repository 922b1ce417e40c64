//! ReinforceStep: respawns lost structures and, under the threat-race policy,
//! escalates the defense around the attacker until the position is
//! projected to hold.
//!
//! Each pending death is respawned at base stats first. A failed respawn
//! keeps the record pending for the next turn. After a successful respawn
//! the running defense is seeded with the respawned structure (plus what
//! already stands near the attacker) and candidates near the attacker's
//! last known cell are tried in strict priority order:
//!
//! 1. upgrade existing turrets
//! 2. spawn missing turrets
//! 3. upgrade existing walls
//! 4. spawn missing walls
//!
//! Each phase walks its cells nearest first. The walk stops as soon as the
//! defense survives the projected threat or nothing is affordable.

use crate::constants::*;
use crate::layout::NearbyTargets;
use crate::location::*;
use crate::registry::StructureRegistry;
use crate::step::*;
use crate::telemetry::DeathRecord;
use crate::threat::*;
use crate::unit::StructureKind;
use log::*;

pub struct ReinforceStep;

/// Ordered reinforcement candidates around an attacker.
pub fn reinforcement_candidates(
    registry: &StructureRegistry,
    nearby: &NearbyTargets,
) -> Vec<Candidate> {
    let upgradable = move |kind: StructureKind| {
        move |&cell: &Location| registry.contains_kind(cell, kind) && !registry.is_upgraded(cell)
    };
    let open = |&cell: &Location| !registry.is_claimed(cell);
    let tag = |action: ReinforceAction| move |cell: Location| Candidate { cell, action };

    let turrets = nearby.turrets.iter().copied();
    let walls = nearby.walls.iter().copied();

    turrets
        .clone()
        .filter(upgradable(StructureKind::Turret))
        .map(tag(ReinforceAction::UpgradeTurret))
        .chain(turrets.filter(open).map(tag(ReinforceAction::SpawnTurret)))
        .chain(
            walls
                .clone()
                .filter(upgradable(StructureKind::Wall))
                .map(tag(ReinforceAction::UpgradeWall)),
        )
        .chain(walls.filter(open).map(tag(ReinforceAction::SpawnWall)))
        .collect()
}

/// Defense already standing around the attacker, excluding `exclude`.
pub fn standing_defense(
    ctx: &PlanContext,
    nearby: &NearbyTargets,
    exclude: Location,
) -> DefenseEstimate {
    let mut defense = DefenseEstimate::default();
    for &cell in nearby.turrets.iter().filter(|&&c| c != exclude) {
        if ctx.registry.contains_kind(cell, StructureKind::Turret) {
            defense.damage_per_frame +=
                StructureKind::Turret.damage_per_frame(ctx.registry.is_upgraded(cell));
        }
    }
    for &cell in nearby.walls.iter().filter(|&&c| c != exclude) {
        if ctx.registry.contains_kind(cell, StructureKind::Wall) {
            defense.health += ctx
                .board
                .structure_at(cell)
                .map(|s| s.health)
                .unwrap_or(WALL_HEALTH);
        }
    }
    defense
}

fn try_candidate(ctx: &mut PlanContext, candidate: &Candidate) -> Attempt {
    if ctx.structures_exhausted() {
        return Attempt::Exhausted;
    }
    let applied = match candidate.action {
        ReinforceAction::UpgradeTurret | ReinforceAction::UpgradeWall => {
            ctx.upgrade(candidate.cell)
        }
        ReinforceAction::SpawnTurret | ReinforceAction::SpawnWall => {
            ctx.spawn(candidate.cell, candidate.action.kind())
        }
    };
    if applied {
        Attempt::Applied
    } else {
        Attempt::Failed
    }
}

/// Escalate around the attacker recorded for a respawned structure.
fn escalate_around(ctx: &mut PlanContext, record: &DeathRecord) {
    let (attacker, stat) = match (record.attacker, record.threat) {
        (Some(attacker), Some(stat)) => (attacker, stat),
        _ => {
            debug!("Reinforce: no threat recorded for {}, respawn only", record.cell);
            return;
        }
    };

    let config = ctx.config;
    let threat = ThreatProjection::from_stat(&stat, &config.threat);
    let reinforce = &config.reinforce;
    let nearby = ctx
        .layout
        .nearby(attacker, reinforce.turret_radius, reinforce.wall_radius);

    let mut defense = DefenseEstimate::base(record.kind);
    if reinforce.count_standing_defenses {
        defense.add(standing_defense(ctx, &nearby, record.cell));
    }

    let candidates = reinforcement_candidates(ctx.registry, &nearby);
    if candidates.is_empty() {
        debug!("Reinforce: nothing to build around {}", attacker);
        return;
    }

    let result = escalate(defense, &threat, &candidates, |c| try_candidate(ctx, c));
    debug!(
        "Reinforce: {} around {}, {}/{} actions, holds: {}",
        record.cell, attacker, result.applied, result.attempts, result.satisfied
    );
}

impl TurnStep for ReinforceStep {
    fn name(&self) -> &str {
        "reinforce"
    }

    fn is_applicable(&self, ctx: &PlanContext) -> bool {
        ctx.turn() > 0 && !ctx.pending_deaths.is_empty()
    }

    fn run(&self, ctx: &mut PlanContext) {
        let pending = std::mem::take(ctx.pending_deaths);
        let mut still_pending = Vec::new();

        for record in pending {
            if ctx.registry.contains(record.cell) {
                debug!("Reinforce: {} already rebuilt", record.cell);
                continue;
            }

            if !ctx.spawn(record.cell, record.kind) {
                still_pending.push(record);
                continue;
            }
            info!("Reinforce: respawned {:?} at {}", record.kind, record.cell);

            if ctx.config.escalates() {
                escalate_around(ctx, &record);
            }
        }

        *ctx.pending_deaths = still_pending;
    }
}
