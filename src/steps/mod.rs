pub mod completion;
pub mod fortify;
pub mod offense;
pub mod opening;
pub mod refund;
pub mod reinforce;
pub mod teardown;

pub use completion::CompletionStep;
pub use fortify::FortifyStep;
pub use offense::OffenseStep;
pub use opening::OpeningStep;
pub use refund::RefundRebuildStep;
pub use reinforce::ReinforceStep;
pub use teardown::TeardownStep;

use crate::step::TurnStep;

/// Build the default turn (7 steps).
///
/// 1. OpeningStep -- turn 0 only, fixed opening placement
/// 2. RefundRebuildStep -- rebuild turrets salvaged last turn
/// 3. TeardownStep -- salvage structures that will not survive another hit
/// 4. ReinforceStep -- respawn lost structures, escalate around the attacker
/// 5. FortifyStep -- wall off and upgrade turrets that took damage
/// 6. CompletionStep -- fill in the target layout, turrets first
/// 7. OffenseStep -- interceptor stall, then scouts down the safest lane
pub fn default_steps() -> Vec<Box<dyn TurnStep>> {
    vec![
        Box::new(OpeningStep),
        Box::new(RefundRebuildStep),
        Box::new(TeardownStep),
        Box::new(ReinforceStep),
        Box::new(FortifyStep),
        Box::new(CompletionStep),
        Box::new(OffenseStep),
    ]
}
