use anyhow::Result;
use tracing::trace;

use crate::{
    ecs::{Animation, EntityId, State, Transform},
    engine::{System, SystemContext},
    world::{World, AIR_ANIMATION, RUN_ANIMATION, STAND_ANIMATION},
};

/// Picks the player clip from its state, then advances every animation and
/// removes entities whose one-shot animation has finished.
pub struct AnimationSystem;

impl AnimationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnimationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for AnimationSystem {
    fn name(&self) -> &str {
        "animation"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()> {
        let player = world.player_entity_mut();
        let wanted = if !player.get::<State>().is_standing() {
            AIR_ANIMATION
        } else if player.get::<Transform>().velocity.x != 0.0 {
            RUN_ANIMATION
        } else {
            STAND_ANIMATION
        };
        if player.get::<Animation>().name() != wanted {
            player.add(Animation::new(ctx.assets.get_animation(wanted)?, true));
        }

        let ids: Vec<EntityId> = world.entities().entities().to_vec();
        for id in ids {
            let entity = world.entities_mut().get_mut(id);
            if !entity.is_alive() {
                continue;
            }
            let finished = match entity.try_get_mut::<Animation>() {
                Some(animation) => {
                    animation.tick();
                    !animation.repeat && animation.has_ended()
                }
                None => continue,
            };
            if finished {
                entity.destroy();
                trace!(entity = %id, "one-shot animation finished");
            }
        }
        Ok(())
    }
}
