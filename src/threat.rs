//! Survivability projections used to decide how much to reinforce a
//! position.
//!
//! A defended position is projected to hold when the time it takes the
//! opponent to chew through its health is at least the time it takes the
//! defense to kill the opponent:
//!
//! `health / opponent_damage_per_frame >= opponent_health / damage_per_frame`
//!
//! The comparison is evaluated cross-multiplied so that zero threat (or a
//! position with no health) resolves without dividing by zero.

use crate::config::ThreatModel;
use crate::constants::*;
use crate::location::Location;
use crate::telemetry::ThreatStat;
use crate::unit::StructureKind;
use serde::{Deserialize, Serialize};

/// Projected opponent burst at one position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreatProjection {
    pub max_damage_per_frame: f32,
    pub max_effective_health: f32,
}

impl ThreatProjection {
    pub fn new(max_damage_per_frame: f32, max_effective_health: f32) -> Self {
        ThreatProjection {
            max_damage_per_frame,
            max_effective_health,
        }
    }

    pub fn from_stat(stat: &ThreatStat, model: &ThreatModel) -> Self {
        let demolishers = stat.demolishers_seen as f32;
        let scouts = stat.scouts_seen as f32;
        ThreatProjection {
            max_damage_per_frame: demolishers * model.demolisher_damage
                + scouts * model.scout_damage,
            max_effective_health: demolishers * model.demolisher_health
                + scouts * model.scout_health,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.max_damage_per_frame <= 0.0 || self.max_effective_health <= 0.0
    }
}

/// Running estimate of what stands at a defended position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DefenseEstimate {
    pub health: f32,
    pub damage_per_frame: f32,
}

impl DefenseEstimate {
    pub fn new(health: f32, damage_per_frame: f32) -> Self {
        DefenseEstimate {
            health,
            damage_per_frame,
        }
    }

    /// A freshly placed, unupgraded structure.
    pub fn base(kind: StructureKind) -> Self {
        DefenseEstimate {
            health: kind.max_health(false),
            damage_per_frame: kind.damage_per_frame(false),
        }
    }

    pub fn add(&mut self, contribution: DefenseEstimate) {
        self.health += contribution.health;
        self.damage_per_frame += contribution.damage_per_frame;
    }

    pub fn survives(&self, threat: &ThreatProjection) -> bool {
        if threat.is_zero() {
            return true;
        }
        self.health * self.damage_per_frame
            >= threat.max_effective_health * threat.max_damage_per_frame
    }
}

/// One reinforcement move, listed in priority order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReinforceAction {
    UpgradeTurret,
    SpawnTurret,
    UpgradeWall,
    SpawnWall,
}

impl ReinforceAction {
    pub fn contribution(self) -> DefenseEstimate {
        match self {
            ReinforceAction::UpgradeTurret => {
                DefenseEstimate::new(0.0, TURRET_UPGRADED_DAMAGE - TURRET_DAMAGE)
            }
            ReinforceAction::SpawnTurret => DefenseEstimate::new(0.0, TURRET_DAMAGE),
            ReinforceAction::UpgradeWall => {
                DefenseEstimate::new(WALL_UPGRADED_HEALTH - WALL_HEALTH, 0.0)
            }
            ReinforceAction::SpawnWall => DefenseEstimate::new(WALL_HEALTH, 0.0),
        }
    }

    pub fn kind(self) -> StructureKind {
        match self {
            ReinforceAction::UpgradeTurret | ReinforceAction::SpawnTurret => StructureKind::Turret,
            ReinforceAction::UpgradeWall | ReinforceAction::SpawnWall => StructureKind::Wall,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub cell: Location,
    pub action: ReinforceAction,
}

/// What happened when a candidate was tried.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Attempt {
    Applied,
    /// Rejected; move on to the next candidate.
    Failed,
    /// No budget left for anything.
    Exhausted,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Escalation {
    pub defense: DefenseEstimate,
    pub attempts: usize,
    pub applied: usize,
    pub satisfied: bool,
}

/// Greedy allocation: walk `candidates` in order, applying each through
/// `attempt`, until the position survives `threat` or the budget runs out.
/// Earlier actions are never undone and the stopping condition is checked
/// after every applied action.
pub fn escalate<F>(
    mut defense: DefenseEstimate,
    threat: &ThreatProjection,
    candidates: &[Candidate],
    mut attempt: F,
) -> Escalation
where
    F: FnMut(&Candidate) -> Attempt,
{
    let mut attempts = 0;
    let mut applied = 0;

    if defense.survives(threat) {
        return Escalation {
            defense,
            attempts,
            applied,
            satisfied: true,
        };
    }

    for candidate in candidates {
        attempts += 1;
        match attempt(candidate) {
            Attempt::Applied => {
                applied += 1;
                defense.add(candidate.action.contribution());
                if defense.survives(threat) {
                    return Escalation {
                        defense,
                        attempts,
                        applied,
                        satisfied: true,
                    };
                }
            }
            Attempt::Failed => {}
            Attempt::Exhausted => break,
        }
    }

    Escalation {
        defense,
        attempts,
        applied,
        satisfied: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    fn candidates(actions: &[ReinforceAction]) -> Vec<Candidate> {
        actions
            .iter()
            .enumerate()
            .map(|(i, &action)| Candidate {
                cell: Location::from_xy(i as u8, 10),
                action,
            })
            .collect()
    }

    #[test]
    fn stops_at_the_first_satisfying_action() {
        // 18 damage per frame against 60 effective health: the position
        // holds once health * damage >= 1080.
        let threat = ThreatProjection::new(18.0, 60.0);
        let list = candidates(&[
            ReinforceAction::SpawnTurret,
            ReinforceAction::SpawnWall,
            ReinforceAction::SpawnTurret,
            ReinforceAction::SpawnWall,
            ReinforceAction::SpawnTurret,
        ]);

        let mut tried = Vec::new();
        let result = escalate(DefenseEstimate::new(60.0, 6.0), &threat, &list, |c| {
            tried.push(c.cell);
            Attempt::Applied
        });

        // 60x6 -> 60x12 -> 120x12 = 1440 >= 1080.
        assert!(result.satisfied);
        assert_eq!(result.applied, 2);
        assert_eq!(tried.len(), 2);
        assert_eq!(result.defense, DefenseEstimate::new(120.0, 12.0));

        // One action fewer would not have held.
        assert!(!DefenseEstimate::new(60.0, 12.0).survives(&threat));
    }

    #[test]
    fn failed_candidates_are_skipped_not_retried() {
        let threat = ThreatProjection::new(18.0, 60.0);
        let list = candidates(&[
            ReinforceAction::SpawnTurret,
            ReinforceAction::SpawnTurret,
            ReinforceAction::SpawnTurret,
        ]);
        let mut calls = 0;
        let result = escalate(DefenseEstimate::new(60.0, 6.0), &threat, &list, |c| {
            calls += 1;
            if c.cell.x() == 0 {
                Attempt::Failed
            } else {
                Attempt::Applied
            }
        });
        // 60x6 -> (fail) -> 60x12 -> 60x18 = 1080.
        assert!(result.satisfied);
        assert_eq!(calls, 3);
        assert_eq!(result.applied, 2);
    }

    #[test]
    fn exhaustion_stops_the_walk() {
        let threat = ThreatProjection::new(40.0, 400.0);
        let list = candidates(&[
            ReinforceAction::UpgradeTurret,
            ReinforceAction::SpawnTurret,
            ReinforceAction::SpawnWall,
        ]);
        let mut calls = 0;
        let result = escalate(DefenseEstimate::base(StructureKind::Turret), &threat, &list, |_| {
            calls += 1;
            if calls == 1 {
                Attempt::Applied
            } else {
                Attempt::Exhausted
            }
        });
        assert!(!result.satisfied);
        assert_eq!(calls, 2);
        assert_eq!(result.applied, 1);
        assert_eq!(result.defense.damage_per_frame, TURRET_UPGRADED_DAMAGE);
    }

    #[test]
    fn zero_threat_needs_nothing() {
        let mut calls = 0;
        let list = candidates(&[ReinforceAction::SpawnWall]);
        let result = escalate(
            DefenseEstimate::base(StructureKind::Wall),
            &ThreatProjection::default(),
            &list,
            |_| {
                calls += 1;
                Attempt::Applied
            },
        );
        assert!(result.satisfied);
        assert_eq!(calls, 0);
    }

    #[test]
    fn projection_follows_the_threat_model() {
        let model = ThreatModel::default();
        let stat = ThreatStat {
            demolishers_seen: 2,
            scouts_seen: 4,
            damage_dealt: 24.0,
        };
        let projection = ThreatProjection::from_stat(&stat, &model);
        assert_eq!(
            projection.max_damage_per_frame,
            2.0 * model.demolisher_damage + 4.0 * model.scout_damage
        );
        assert_eq!(
            projection.max_effective_health,
            2.0 * model.demolisher_health + 4.0 * model.scout_health
        );
        assert!(ThreatProjection::from_stat(&ThreatStat::default(), &model).is_zero());
    }
}
