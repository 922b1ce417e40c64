use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Stationary unit types.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum StructureKind {
    Wall,
    Support,
    Turret,
}

/// Mobile unit types.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum MobileKind {
    Scout,
    Demolisher,
    Interceptor,
}

/// Any unit the engine can spawn, tagged the way the game engine numbers
/// them on the wire (0..=5).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum UnitKind {
    Structure(StructureKind),
    Mobile(MobileKind),
}

impl UnitKind {
    pub const WALL: UnitKind = UnitKind::Structure(StructureKind::Wall);
    pub const SUPPORT: UnitKind = UnitKind::Structure(StructureKind::Support);
    pub const TURRET: UnitKind = UnitKind::Structure(StructureKind::Turret);
    pub const SCOUT: UnitKind = UnitKind::Mobile(MobileKind::Scout);
    pub const DEMOLISHER: UnitKind = UnitKind::Mobile(MobileKind::Demolisher);
    pub const INTERCEPTOR: UnitKind = UnitKind::Mobile(MobileKind::Interceptor);

    pub fn from_tag(tag: u8) -> Option<UnitKind> {
        match tag {
            0 => Some(UnitKind::WALL),
            1 => Some(UnitKind::SUPPORT),
            2 => Some(UnitKind::TURRET),
            3 => Some(UnitKind::SCOUT),
            4 => Some(UnitKind::DEMOLISHER),
            5 => Some(UnitKind::INTERCEPTOR),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            UnitKind::Structure(StructureKind::Wall) => 0,
            UnitKind::Structure(StructureKind::Support) => 1,
            UnitKind::Structure(StructureKind::Turret) => 2,
            UnitKind::Mobile(MobileKind::Scout) => 3,
            UnitKind::Mobile(MobileKind::Demolisher) => 4,
            UnitKind::Mobile(MobileKind::Interceptor) => 5,
        }
    }

    pub fn structure(self) -> Option<StructureKind> {
        match self {
            UnitKind::Structure(kind) => Some(kind),
            UnitKind::Mobile(_) => None,
        }
    }

    pub fn is_stationary(self) -> bool {
        matches!(self, UnitKind::Structure(_))
    }
}

impl From<StructureKind> for UnitKind {
    fn from(kind: StructureKind) -> Self {
        UnitKind::Structure(kind)
    }
}

impl From<MobileKind> for UnitKind {
    fn from(kind: MobileKind) -> Self {
        UnitKind::Mobile(kind)
    }
}

impl StructureKind {
    pub fn max_health(self, upgraded: bool) -> f32 {
        match (self, upgraded) {
            (StructureKind::Wall, false) => WALL_HEALTH,
            (StructureKind::Wall, true) => WALL_UPGRADED_HEALTH,
            (StructureKind::Turret, false) => TURRET_HEALTH,
            (StructureKind::Turret, true) => TURRET_UPGRADED_HEALTH,
            (StructureKind::Support, _) => SUPPORT_HEALTH,
        }
    }

    /// Damage per frame the structure contributes to a defended position.
    pub fn damage_per_frame(self, upgraded: bool) -> f32 {
        match (self, upgraded) {
            (StructureKind::Turret, false) => TURRET_DAMAGE,
            (StructureKind::Turret, true) => TURRET_UPGRADED_DAMAGE,
            _ => 0.0,
        }
    }
}

/// Which player a unit or event belongs to, from the engine's point of view.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Side {
    Friendly,
    Enemy,
}

impl Side {
    /// Player tags as they appear in frame telemetry.
    pub fn from_player_tag(tag: u8) -> Option<Side> {
        match tag {
            1 => Some(Side::Friendly),
            2 => Some(Side::Enemy),
            _ => None,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Friendly => Side::Enemy,
            Side::Enemy => Side::Friendly,
        }
    }
}

/// The two independently tracked currencies.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Currency {
    /// Spent on stationary placements and upgrades, credited by salvage.
    Structure,
    /// Spent on mobile unit spawns.
    Unit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_engine_numbering() {
        for tag in 0..=5u8 {
            let kind = UnitKind::from_tag(tag).unwrap();
            assert_eq!(kind.tag(), tag);
        }
        assert_eq!(UnitKind::from_tag(6), None);
        assert_eq!(UnitKind::from_tag(2), Some(UnitKind::TURRET));
        assert_eq!(UnitKind::from_tag(4), Some(UnitKind::DEMOLISHER));
    }

    #[test]
    fn only_turrets_deal_damage() {
        assert_eq!(StructureKind::Wall.damage_per_frame(true), 0.0);
        assert_eq!(StructureKind::Turret.damage_per_frame(false), TURRET_DAMAGE);
        assert_eq!(
            StructureKind::Turret.damage_per_frame(true),
            TURRET_UPGRADED_DAMAGE
        );
    }
}
