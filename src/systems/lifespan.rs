use anyhow::Result;
use tracing::trace;

use crate::{
    ecs::{EntityId, Lifespan},
    engine::{System, SystemContext},
    world::World,
};

/// Counts down entity lifespans and destroys the ones that run out.
pub struct LifespanSystem;

impl LifespanSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LifespanSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for LifespanSystem {
    fn name(&self) -> &str {
        "lifespan"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()> {
        let ids: Vec<EntityId> = world.entities().entities().to_vec();
        for id in ids {
            let entity = world.entities_mut().get_mut(id);
            if !entity.is_alive() {
                continue;
            }
            let expired = match entity.try_get_mut::<Lifespan>() {
                Some(lifespan) => {
                    lifespan.remaining = lifespan.remaining.saturating_sub(1);
                    lifespan.remaining == 0
                }
                None => continue,
            };
            if expired {
                entity.destroy();
                trace!(entity = %id, frame = ctx.frame, "lifespan expired");
            }
        }
        Ok(())
    }
}
