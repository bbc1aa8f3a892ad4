mod game;
mod timeline;

use anyhow::{Context, Result};
use tracing::trace;

use crate::{
    assets::Assets,
    config::GameConfig,
    level::GridLayout,
    math::Vec2,
    systems::{AnimationSystem, CollisionSystem, LifespanSystem, MovementSystem},
    world::World,
};

pub use game::{GameContext, GameEngine, RunSummary};
pub use timeline::{ScriptedAction, Timeline};

/// Read-only frame context handed to every system.
pub struct SystemContext<'a> {
    pub frame: u64,
    pub assets: &'a Assets,
    pub config: &'a GameConfig,
}

impl<'a> SystemContext<'a> {
    pub fn new(frame: u64, assets: &'a Assets, config: &'a GameConfig) -> Self {
        Self {
            frame,
            assets,
            config,
        }
    }

    pub fn viewport(&self) -> Vec2 {
        self.config.viewport()
    }

    pub fn layout(&self) -> GridLayout {
        GridLayout::new(self.config.grid_size(), self.config.window.height)
    }
}

pub trait System {
    fn name(&self) -> &str;
    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()>;
}

pub struct PipelineBuilder {
    systems: Vec<Box<dyn System>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            systems: self.systems,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered systems run once per simulation frame.
pub struct Pipeline {
    systems: Vec<Box<dyn System>>,
}

impl Pipeline {
    /// movement -> lifespan -> collision -> animation
    pub fn standard() -> Self {
        PipelineBuilder::new()
            .with_system(MovementSystem::new())
            .with_system(LifespanSystem::new())
            .with_system(CollisionSystem::new())
            .with_system(AnimationSystem::new())
            .build()
    }

    /// Run one frame: flush/sweep the entity set, then every system in order.
    pub fn run_frame(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()> {
        world.entities_mut().update();
        for system in &mut self.systems {
            system
                .run(ctx, world)
                .with_context(|| format!("system '{}' failed", system.name()))?;
        }
        trace!(frame = ctx.frame, entities = world.entities().len(), "frame complete");
        Ok(())
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|system| system.name()).collect()
    }
}
