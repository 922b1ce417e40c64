pub const ARENA_SIZE: u8 = 28;
pub const HALF_ARENA: u8 = 14;

// Structure stats as seen by the reinforcement projections.
pub const WALL_HEALTH: f32 = 60.0;
pub const WALL_UPGRADED_HEALTH: f32 = 200.0;
pub const TURRET_HEALTH: f32 = 60.0;
pub const TURRET_UPGRADED_HEALTH: f32 = 100.0;
pub const SUPPORT_HEALTH: f32 = 30.0;
pub const TURRET_DAMAGE: f32 = 6.0;
pub const TURRET_UPGRADED_DAMAGE: f32 = 20.0;

/// Base range of a turret (Euclidean).
pub const TURRET_RANGE: f32 = 2.5;
pub const TURRET_UPGRADED_RANGE: f32 = 3.5;

// Structure point costs: base placement, then the extra paid to upgrade.
pub const WALL_COST: f32 = 1.0;
pub const WALL_UPGRADE_COST: f32 = 2.0;
pub const SUPPORT_COST: f32 = 4.0;
pub const SUPPORT_UPGRADE_COST: f32 = 4.0;
pub const TURRET_COST: f32 = 2.0;
pub const TURRET_UPGRADE_COST: f32 = 4.0;

// Unit point costs.
pub const SCOUT_COST: f32 = 1.0;
pub const DEMOLISHER_COST: f32 = 3.0;
pub const INTERCEPTOR_COST: f32 = 1.0;

// Salvage refunds, before scaling by the remaining health ratio.
pub const WALL_REFUND: f32 = 0.97;
pub const WALL_UPGRADED_REFUND: f32 = 2.7;
pub const TURRET_REFUND: f32 = 1.94;
pub const TURRET_UPGRADED_REFUND: f32 = 5.4;

/// Fraction of the total paid cost the offline arena returns on removal.
pub const ARENA_REMOVAL_REFUND: f32 = 0.75;

// Opponent threat model: damage per recorded hit and effective health
// contributed per recorded hit.
pub const DEMOLISHER_HIT_DAMAGE: f32 = 8.0;
pub const DEMOLISHER_HIT_HEALTH: f32 = 15.0;
pub const SCOUT_HIT_DAMAGE: f32 = 2.0;
pub const SCOUT_HIT_HEALTH: f32 = 2.5;

// Search radii around the last known attacker.
pub const REINFORCE_TURRET_RADIUS: f32 = 3.0;
pub const REINFORCE_WALL_RADIUS: f32 = 3.0;
pub const FORTIFY_WALL_RADIUS: f32 = 2.0;
pub const FORTIFY_MAX_COVER_WALLS: usize = 3;

// Offense.
pub const STALL_TURNS: u32 = 5;
pub const SCOUT_PERIOD: u32 = 2;
pub const SCOUT_BATCH: u32 = 1000;
pub const SCOUT_LANES: [(u8, u8); 2] = [(6, 7), (21, 7)];
