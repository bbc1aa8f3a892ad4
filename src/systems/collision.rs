use anyhow::Result;
use tracing::{debug, info};

use crate::{
    ecs::{Animation, BoundingBox, EntityId, Locomotion, State, Transform},
    engine::{System, SystemContext},
    physics::{get_overlap, get_previous_overlap, intersects},
    world::{
        World, BRICK_ANIMATION, BULLET_TAG, QUESTION_ANIMATION, QUESTION_HIT_ANIMATION, TILE_TAG,
    },
};

/// Resolves the player against tiles, bullets against tiles, and the level
/// bounds.
///
/// Tiles are visited in bucket order and every resolution moves the player
/// immediately, so later tiles see the adjusted position.
pub struct CollisionSystem;

impl CollisionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CollisionSystem {
    fn name(&self) -> &str {
        "collision"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()> {
        let tiles: Vec<EntityId> = world.entities().entities_with_tag(TILE_TAG).to_vec();
        let bullets: Vec<EntityId> = world.entities().entities_with_tag(BULLET_TAG).to_vec();

        let landed = resolve_vertical(ctx, world, &tiles)?;
        if !landed {
            world.player_entity_mut().get_mut::<State>().locomotion = Locomotion::Air;
        }

        for &tile in &tiles {
            if !world.entities().is_alive(tile) {
                continue;
            }
            hit_with_bullets(world, tile, &bullets);
            if !world.entities().is_alive(tile) {
                continue;
            }
            resolve_horizontal(world, tile);
        }

        let player = world.player_entity_mut();
        let half_width = player.get::<BoundingBox>().half_size.x;
        let transform = player.get_mut::<Transform>();
        if transform.pos.x < half_width {
            transform.pos.x = half_width;
        }

        if transform.pos.y > ctx.viewport().y {
            let fallen = world.player();
            world.entities_mut().destroy(fallen);
            let respawned = world.spawn_player(ctx)?;
            info!(%fallen, %respawned, frame = ctx.frame, "player fell out of the level, respawning");
        }
        Ok(())
    }
}

/// Landing on tile tops and bumping tile bottoms. Returns whether the player
/// landed.
fn resolve_vertical(ctx: &SystemContext, world: &mut World, tiles: &[EntityId]) -> Result<bool> {
    let player = world.player();
    let mut landed = false;

    for &tile in tiles {
        let (overlap, previous) = {
            let entities = world.entities();
            let tile = entities.get(tile);
            if !tile.is_alive() {
                continue;
            }
            let player = entities.get(player);
            (get_overlap(tile, player), get_previous_overlap(tile, player))
        };
        if !intersects(overlap) || previous.y > 0.0 {
            continue;
        }

        let player = world.entities_mut().get_mut(player);
        let transform = player.get_mut::<Transform>();
        if transform.velocity.y > 0.0 {
            transform.pos.y -= overlap.y;
            transform.velocity.y = 0.0;
            player.get_mut::<State>().locomotion = Locomotion::Standing;
            landed = true;
        } else if transform.velocity.y < 0.0 {
            transform.pos.y += overlap.y;
            transform.velocity.y = 0.0;
            bump_tile(ctx, world, tile)?;
        }
    }
    Ok(landed)
}

fn bump_tile(ctx: &SystemContext, world: &mut World, id: EntityId) -> Result<()> {
    let tile = world.entities_mut().get_mut(id);
    let name = tile.get::<Animation>().name().to_string();
    match name.as_str() {
        BRICK_ANIMATION => {
            tile.destroy();
            debug!(tile = %id, "brick broken from below");
        }
        QUESTION_ANIMATION => {
            let clip = ctx.assets.get_animation(QUESTION_HIT_ANIMATION)?;
            tile.add(Animation::new(clip, true));
            debug!(tile = %id, "question block used");
        }
        _ => {}
    }
    Ok(())
}

fn hit_with_bullets(world: &mut World, tile: EntityId, bullets: &[EntityId]) {
    for &bullet in bullets {
        let hit = {
            let entities = world.entities();
            let bullet = entities.get(bullet);
            bullet.is_alive() && intersects(get_overlap(bullet, entities.get(tile)))
        };
        if !hit {
            continue;
        }
        world.entities_mut().destroy(bullet);
        let tile_entity = world.entities_mut().get_mut(tile);
        if tile_entity.get::<Animation>().name() == BRICK_ANIMATION {
            tile_entity.destroy();
            debug!(%tile, %bullet, "brick shot");
        }
    }
}

fn resolve_horizontal(world: &mut World, tile: EntityId) {
    let player = world.player();
    let (overlap, previous) = {
        let entities = world.entities();
        let (tile, player) = (entities.get(tile), entities.get(player));
        (get_overlap(tile, player), get_previous_overlap(tile, player))
    };
    if !intersects(overlap) || previous.x > 0.0 {
        return;
    }
    let transform = world.player_entity_mut().get_mut::<Transform>();
    if transform.velocity.x > 0.0 {
        transform.pos.x -= overlap.x;
    } else if transform.velocity.x < 0.0 {
        transform.pos.x += overlap.x;
    }
}
