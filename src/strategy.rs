//! Public API for the turn strategy.
//!
//! The `StrategyBuilder` provides a fluent, append-only API for configuring
//! the turn. Steps are added in order and the builder produces a `Strategy`
//! that is fed telemetry frames as they arrive and asked to act once per
//! turn.

use crate::board::GameBoard;
use crate::config::StrategyConfig;
use crate::error::FrameError;
use crate::layout::TargetLayout;
use crate::registry::StructureRegistry;
use crate::step::*;
use crate::steps::default_steps;
use crate::telemetry::*;
use crate::unit::*;
use log::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Append-only builder for configuring the turn.
pub struct StrategyBuilder {
    steps: Vec<Box<dyn TurnStep>>,
    config: StrategyConfig,
    layout: TargetLayout,
}

impl StrategyBuilder {
    /// Start with an empty step stack.
    pub fn new() -> Self {
        StrategyBuilder {
            steps: Vec::new(),
            config: StrategyConfig::default(),
            layout: TargetLayout::default(),
        }
    }

    /// Append a step to the end of the stack.
    pub fn add_step(mut self, step: Box<dyn TurnStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn config(mut self, config: StrategyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn layout(mut self, layout: TargetLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn build(self) -> Strategy {
        let rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Strategy {
            steps: self.steps,
            config: self.config,
            layout: self.layout,
            registry: StructureRegistry::new(),
            telemetry: TurnTelemetry::new(),
            pending_deaths: Vec::new(),
            refund_queue: Vec::new(),
            rng,
        }
    }
}

impl Default for StrategyBuilder {
    /// Returns a builder pre-loaded with the default step stack.
    fn default() -> Self {
        let mut builder = StrategyBuilder::new();
        for step in default_steps() {
            builder.steps.push(step);
        }
        builder
    }
}

/// The decision engine. Owns everything that persists between turns.
pub struct Strategy {
    steps: Vec<Box<dyn TurnStep>>,
    config: StrategyConfig,
    layout: TargetLayout,
    registry: StructureRegistry,
    telemetry: TurnTelemetry,
    pending_deaths: Vec<DeathRecord>,
    refund_queue: Vec<RefundRebuild>,
    rng: SmallRng,
}

impl Strategy {
    /// The default step stack under `config`.
    pub fn new(config: StrategyConfig) -> Self {
        StrategyBuilder::default().config(config).build()
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn registry(&self) -> &StructureRegistry {
        &self.registry
    }

    pub fn telemetry(&self) -> &TurnTelemetry {
        &self.telemetry
    }

    pub fn pending_deaths(&self) -> &[DeathRecord] {
        &self.pending_deaths
    }

    pub fn refund_queue(&self) -> &[RefundRebuild] {
        &self.refund_queue
    }

    /// Fold one action frame into this turn's telemetry, then drop our
    /// structures the frame reports destroyed.
    pub fn on_action_frame(&mut self, frame: &FrameEvents) {
        self.telemetry.ingest(frame, &self.registry);

        for death in &frame.deaths {
            if death.side != Side::Friendly {
                continue;
            }
            if death.kind.structure().is_some() {
                self.registry.record_destruction(death.cell);
            }
        }
    }

    /// Decode and fold one action frame as sent by the engine.
    pub fn on_action_frame_json(&mut self, frame: &str) -> Result<(), FrameError> {
        let frame = FrameEvents::from_json(frame)?;
        self.on_action_frame(&frame);
        Ok(())
    }

    /// Decide and submit one turn.
    pub fn on_turn(&mut self, board: &mut dyn GameBoard) -> TurnReport {
        let turn = board.turn_number();

        let stale = self.registry.reconcile(&*board);
        if stale > 0 {
            warn!("Turn {}: {} registry records did not match the board", turn, stale);
        }

        for record in self.telemetry.take_deaths() {
            if self.pending_deaths.iter().any(|p| p.cell == record.cell) {
                continue;
            }
            self.pending_deaths.push(record);
        }

        let mut ctx = PlanContext::new(
            board,
            &mut self.registry,
            &self.telemetry,
            &self.layout,
            &self.config,
            &mut self.pending_deaths,
            &mut self.refund_queue,
            &mut self.rng,
        );
        let budget_before = ctx.budget();

        let mut steps = Vec::new();
        for step in &self.steps {
            if !step.is_applicable(&ctx) {
                continue;
            }
            let before = ctx.tally();
            step.run(&mut ctx);
            let actions = ctx.tally().since(before);
            debug!(
                "Turn {}: {} {}/{} actions",
                turn,
                step.name(),
                actions.succeeded,
                actions.attempted
            );
            steps.push(StepReport {
                name: step.name().to_string(),
                actions,
            });
        }

        let report = TurnReport {
            turn,
            budget_before,
            budget_after: ctx.budget(),
            salvage_refunds: ctx.salvage_refunds(),
            steps,
        };
        drop(ctx);

        board.submit_turn();
        self.telemetry.clear();
        self.registry.release_claims();

        report
    }
}
