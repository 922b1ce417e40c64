//! Strategy configuration.
//!
//! Every section defaults independently, so a JSON override only needs the
//! fields it changes.

use crate::constants::*;
use crate::error::ConfigError;
use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Which of the two reinforcement policies drives the turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyKind {
    /// Respawn lost structures and cover damaged turrets with walls.
    Reactive,
    /// Additionally race the recorded threat: escalate around the attacker
    /// until the position is projected to hold.
    ThreatRace,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub policy: PolicyKind,
    pub teardown: TeardownConfig,
    pub reinforce: ReinforceConfig,
    pub fortify: FortifyConfig,
    pub threat: ThreatModel,
    pub offense: OffenseConfig,
    /// Seed for interceptor placement. Drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::threat_race()
    }
}

impl StrategyConfig {
    pub fn threat_race() -> Self {
        StrategyConfig {
            policy: PolicyKind::ThreatRace,
            teardown: TeardownConfig::default(),
            reinforce: ReinforceConfig::default(),
            fortify: FortifyConfig::default(),
            threat: ThreatModel::default(),
            offense: OffenseConfig::default(),
            seed: None,
        }
    }

    pub fn reactive() -> Self {
        StrategyConfig {
            policy: PolicyKind::Reactive,
            reinforce: ReinforceConfig {
                escalate: false,
                ..ReinforceConfig::default()
            },
            ..Self::threat_race()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn escalates(&self) -> bool {
        self.policy == PolicyKind::ThreatRace && self.reinforce.escalate
    }
}

/// Salvage refunds before health scaling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeardownConfig {
    pub wall_refund: f32,
    pub wall_upgraded_refund: f32,
    pub turret_refund: f32,
    pub turret_upgraded_refund: f32,
}

impl Default for TeardownConfig {
    fn default() -> Self {
        TeardownConfig {
            wall_refund: WALL_REFUND,
            wall_upgraded_refund: WALL_UPGRADED_REFUND,
            turret_refund: TURRET_REFUND,
            turret_upgraded_refund: TURRET_UPGRADED_REFUND,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReinforceConfig {
    /// Escalate around the attacker after respawning a lost structure.
    pub escalate: bool,
    pub turret_radius: f32,
    pub wall_radius: f32,
    /// Seed the running defense with structures already standing around
    /// the attacker.
    pub count_standing_defenses: bool,
}

impl Default for ReinforceConfig {
    fn default() -> Self {
        ReinforceConfig {
            escalate: true,
            turret_radius: REINFORCE_TURRET_RADIUS,
            wall_radius: REINFORCE_WALL_RADIUS,
            count_standing_defenses: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FortifyConfig {
    pub enabled: bool,
    pub wall_radius: f32,
    pub max_cover_walls: usize,
}

impl Default for FortifyConfig {
    fn default() -> Self {
        FortifyConfig {
            enabled: true,
            wall_radius: FORTIFY_WALL_RADIUS,
            max_cover_walls: FORTIFY_MAX_COVER_WALLS,
        }
    }
}

/// Per recorded hit: damage dealt and effective health brought by the
/// attacking unit kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatModel {
    pub demolisher_damage: f32,
    pub demolisher_health: f32,
    pub scout_damage: f32,
    pub scout_health: f32,
}

impl Default for ThreatModel {
    fn default() -> Self {
        ThreatModel {
            demolisher_damage: DEMOLISHER_HIT_DAMAGE,
            demolisher_health: DEMOLISHER_HIT_HEALTH,
            scout_damage: SCOUT_HIT_DAMAGE,
            scout_health: SCOUT_HIT_HEALTH,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffenseConfig {
    /// Turns spent deploying interceptors before switching to scouts.
    pub stall_turns: u32,
    pub scout_lanes: Vec<(u8, u8)>,
    /// Scouts go out on turns where `turn % scout_period == 1`.
    pub scout_period: u32,
    pub scout_count: u32,
    /// Damage one opposing structure deals per path cell.
    pub lane_hit_damage: f32,
}

impl Default for OffenseConfig {
    fn default() -> Self {
        OffenseConfig {
            stall_turns: STALL_TURNS,
            scout_lanes: SCOUT_LANES.to_vec(),
            scout_period: SCOUT_PERIOD,
            scout_count: SCOUT_BATCH,
            lane_hit_damage: TURRET_DAMAGE,
        }
    }
}

impl OffenseConfig {
    pub fn lanes(&self) -> Vec<Location> {
        self.scout_lanes.iter().map(|&c| Location::from(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = StrategyConfig::from_json_str(
            r#"{"policy": "Reactive", "fortify": {"max_cover_walls": 2}, "seed": 7}"#,
        )
        .unwrap();
        assert_eq!(config.policy, PolicyKind::Reactive);
        assert_eq!(config.fortify.max_cover_walls, 2);
        assert_eq!(config.fortify.wall_radius, FORTIFY_WALL_RADIUS);
        assert_eq!(config.teardown, TeardownConfig::default());
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn presets_differ_only_in_escalation() {
        let reactive = StrategyConfig::reactive();
        let race = StrategyConfig::threat_race();
        assert!(!reactive.escalates());
        assert!(race.escalates());
        assert_eq!(reactive.fortify, race.fortify);
        assert_eq!(StrategyConfig::default(), race);
    }

    #[test]
    fn reports_missing_files_and_bad_json() {
        assert!(matches!(
            StrategyConfig::from_file("/nonexistent/strategy.json"),
            Err(ConfigError::Read { .. })
        ));
        assert!(matches!(
            StrategyConfig::from_json_str("{\"policy\": 3}"),
            Err(ConfigError::Parse(_))
        ));
    }
}
