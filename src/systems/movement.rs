use anyhow::Result;

use crate::{
    ecs::{EntityId, Gravity, Input, Locomotion, State, Transform},
    engine::{System, SystemContext},
    math::Vec2,
    world::World,
};

/// Turns player input into velocity, applies gravity and speed limits, then
/// integrates every transform by one step.
pub struct MovementSystem;

impl MovementSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn run(&mut self, _ctx: &SystemContext, world: &mut World) -> Result<()> {
        let config = world.player_config().clone();

        let player = world.player_entity_mut();
        let input = *player.get::<Input>();
        let mut velocity = player.get::<Transform>().velocity;
        if input.up {
            velocity.y = config.jump;
            player.get_mut::<State>().locomotion = Locomotion::Air;
            player.get_mut::<Input>().up = false;
        }
        velocity.x = if input.left {
            -config.speed
        } else if input.right {
            config.speed
        } else {
            0.0
        };
        let transform = player.get_mut::<Transform>();
        transform.velocity = velocity;
        if velocity.x != 0.0 {
            transform.scale.x = transform.scale.x.abs().copysign(velocity.x);
        }

        let ids: Vec<EntityId> = world.entities().entities().to_vec();
        for id in ids {
            let entity = world.entities_mut().get_mut(id);
            if !entity.is_alive() {
                continue;
            }
            if let Some(gravity) = entity.try_get::<Gravity>().copied() {
                let transform = entity.get_mut::<Transform>();
                transform.velocity.y += gravity.gravity;
                transform.velocity = clamp_velocity(transform.velocity, config.max_speed);
            }
            if let Some(transform) = entity.try_get_mut::<Transform>() {
                transform.prev_pos = transform.pos;
                transform.pos += transform.velocity;
            }
        }
        Ok(())
    }
}

/// Limit each axis to `max_speed` in magnitude, keeping its sign.
pub fn clamp_velocity(velocity: Vec2, max_speed: f32) -> Vec2 {
    Vec2::new(
        clamp_axis(velocity.x, max_speed),
        clamp_axis(velocity.y, max_speed),
    )
}

fn clamp_axis(value: f32, max_speed: f32) -> f32 {
    let limit = max_speed.abs();
    if value.abs() > limit {
        limit.copysign(value)
    } else {
        value
    }
}
