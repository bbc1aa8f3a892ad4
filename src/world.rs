//! Play world - the entity set of one loaded level

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::ecs::{
    Animation, BoundingBox, Entity, EntityId, EntityManager, Gravity, Input, Lifespan, Locomotion,
    State, Transform,
};
use crate::engine::SystemContext;
use crate::level::{Level, PlacementKind, PlayerConfig};
use crate::math::Vec2;

pub const PLAYER_TAG: &str = "player";
pub const TILE_TAG: &str = "tile";
pub const DECORATION_TAG: &str = "dec";
pub const BULLET_TAG: &str = "bullet";

pub const STAND_ANIMATION: &str = "Stand";
pub const RUN_ANIMATION: &str = "Run";
pub const AIR_ANIMATION: &str = "Air";
pub const BRICK_ANIMATION: &str = "Brick";
pub const QUESTION_ANIMATION: &str = "Question";
pub const QUESTION_HIT_ANIMATION: &str = "Question2";

pub struct World {
    entities: EntityManager,
    player: EntityId,
    player_config: PlayerConfig,
    frame: u64,
}

impl World {
    /// Populate a fresh entity set from parsed level records and spawn the player.
    pub fn from_level(level: &Level, ctx: &SystemContext) -> Result<Self> {
        let mut entities = EntityManager::new();
        let layout = ctx.layout();
        let scale = ctx.config.tile_scale;
        let mut tiles = 0;

        for placement in &level.placements {
            let clip = ctx.assets.get_animation(&placement.animation).with_context(|| {
                format!(
                    "{} at ({}, {}) uses an unknown animation",
                    placement.kind.tag(),
                    placement.grid.x,
                    placement.grid.y
                )
            })?;
            let pos = layout.mid_pixel(placement.grid, &clip, scale);
            let id = entities.add_entity(placement.kind.tag());
            let entity = entities.get_mut(id);
            entity.add(Transform::new(pos, scale));
            if placement.kind == PlacementKind::Tile {
                entity.add(BoundingBox::new(clip.size * scale));
                tiles += 1;
            }
            entity.add(Animation::new(clip, true));
        }

        let player = spawn_player_into(&mut entities, &level.player, ctx)?;
        info!(
            tiles,
            decorations = level.placements.len() - tiles,
            "level loaded"
        );

        Ok(Self {
            entities,
            player,
            player_config: level.player.clone(),
            frame: 0,
        })
    }

    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.entities
    }

    /// Current player handle; changes whenever the player respawns.
    pub fn player(&self) -> EntityId {
        self.player
    }

    pub fn player_entity(&self) -> &Entity {
        self.entities.get(self.player)
    }

    pub fn player_entity_mut(&mut self) -> &mut Entity {
        self.entities.get_mut(self.player)
    }

    pub fn player_config(&self) -> &PlayerConfig {
        &self.player_config
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn advance_frame(&mut self) {
        self.frame += 1;
    }

    pub fn spawn_player(&mut self, ctx: &SystemContext) -> Result<EntityId> {
        self.player = spawn_player_into(&mut self.entities, &self.player_config, ctx)?;
        Ok(self.player)
    }

    /// Fire the configured weapon from `shooter`, heading the way it last moved.
    pub fn spawn_bullet(&mut self, ctx: &SystemContext, shooter: EntityId) -> Result<EntityId> {
        let weapon = ctx.assets.get_animation(&self.player_config.weapon)?;
        let (pos, direction) = {
            let transform = self.entities.get(shooter).get::<Transform>();
            let direction = if transform.displacement().x >= 0.0 {
                1.0
            } else {
                -1.0
            };
            (transform.pos, direction)
        };

        let scale = ctx.config.tile_scale;
        let velocity = Vec2::new(ctx.config.bullet.speed * direction, 0.0);
        let id = self.entities.add_entity(BULLET_TAG);
        let bullet = self.entities.get_mut(id);
        bullet.add(BoundingBox::new(weapon.size * scale));
        bullet.add(Animation::new(weapon, true));
        bullet.add(Lifespan::new(ctx.config.bullet.lifespan_frames, ctx.frame));
        bullet.add(Transform::with_velocity(pos, velocity, 0.0, scale)).scale.x *= direction;

        debug!(bullet = %id, %shooter, direction, "bullet spawned");
        Ok(id)
    }

    /// Where the host should centre its view: follows the player, never
    /// scrolling left of the level start.
    pub fn camera_center(&self, viewport: Vec2) -> Vec2 {
        let half = viewport / 2.0;
        let player_x = self
            .entities
            .try_get(self.player)
            .and_then(|player| player.try_get::<Transform>())
            .map_or(half.x, |transform| transform.pos.x);
        Vec2::new(player_x.max(half.x), half.y)
    }
}

fn spawn_player_into(
    entities: &mut EntityManager,
    config: &PlayerConfig,
    ctx: &SystemContext,
) -> Result<EntityId> {
    let clip = ctx.assets.get_animation(STAND_ANIMATION)?;
    let scale = ctx.config.player_scale;
    let pos = ctx
        .layout()
        .mid_pixel(Vec2::new(config.x, config.y), &clip, scale);

    let id = entities.add_entity(PLAYER_TAG);
    let player = entities.get_mut(id);
    player.add(Animation::new(clip, true));
    player.add(Transform::new(pos, scale));
    player.add(BoundingBox::new(Vec2::new(config.cx, config.cy)));
    player.add(Gravity::new(config.gravity));
    player.add(State::new(Locomotion::Air));
    player.add(Input::default());

    debug!(player = %id, x = pos.x, y = pos.y, "player spawned");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Assets;
    use crate::config::GameConfig;

    const LEVEL: &str = "\
Tile Ground 0 0
Tile Ground 1 0
Dec Cloud 4 8
Player 1 3 48 48 5 -20 20 0.75 Buster
";

    fn build() -> (GameConfig, Assets, World) {
        let config = GameConfig::default();
        let assets = Assets::builtin();
        let world = {
            let ctx = SystemContext::new(0, &assets, &config);
            World::from_level(&Level::parse(LEVEL).unwrap(), &ctx).unwrap()
        };
        (config, assets, world)
    }

    #[test]
    fn level_entities_become_visible_after_first_update() {
        let (_, _, mut world) = build();
        assert!(world.entities().is_empty());
        world.entities_mut().update();
        assert_eq!(world.entities().entities_with_tag(TILE_TAG).len(), 2);
        assert_eq!(world.entities().entities_with_tag(DECORATION_TAG).len(), 1);
        assert_eq!(
            world.entities().entities_with_tag(PLAYER_TAG),
            &[world.player()]
        );
    }

    #[test]
    fn decorations_have_no_bounding_box() {
        let (_, _, mut world) = build();
        world.entities_mut().update();
        let dec = world.entities().entities_with_tag(DECORATION_TAG)[0];
        let dec = world.entities().get(dec);
        assert!(dec.has::<Transform>());
        assert!(dec.has::<Animation>());
        assert!(!dec.has::<BoundingBox>());
    }

    #[test]
    fn player_spawns_from_configuration() {
        let (_, _, world) = build();
        let player = world.player_entity();
        assert_eq!(player.tag(), PLAYER_TAG);
        assert_eq!(player.get::<BoundingBox>().size, Vec2::new(48.0, 48.0));
        assert_eq!(player.get::<Gravity>().gravity, 0.75);
        assert_eq!(player.get::<State>().locomotion, Locomotion::Air);
        assert_eq!(*player.get::<Input>(), Input::default());
        // Stand is 16x24 at scale 2.5 -> 40x60
        assert_eq!(player.get::<Transform>().pos, Vec2::new(64.0 + 20.0, 768.0 - 192.0 - 30.0));
    }

    #[test]
    fn bullet_direction_follows_last_displacement() {
        let (config, assets, mut world) = build();
        let ctx = SystemContext::new(42, &assets, &config);
        let shooter = world.player();

        {
            let transform = world.player_entity_mut().get_mut::<Transform>();
            transform.prev_pos = transform.pos;
            transform.pos.x -= 3.0;
        }
        let left = world.spawn_bullet(&ctx, shooter).unwrap();

        {
            let transform = world.player_entity_mut().get_mut::<Transform>();
            transform.prev_pos = transform.pos;
            transform.pos.x += 3.0;
        }
        let right = world.spawn_bullet(&ctx, shooter).unwrap();

        let left = world.entities().get(left);
        let right = world.entities().get(right);
        assert!(left.get::<Transform>().velocity.x < 0.0);
        assert!(right.get::<Transform>().velocity.x > 0.0);
        assert_eq!(left.tag(), BULLET_TAG);
        assert_eq!(*left.get::<Lifespan>(), Lifespan::new(100, 42));
    }

    #[test]
    fn respawn_replaces_player_handle() {
        let (config, assets, mut world) = build();
        let ctx = SystemContext::new(0, &assets, &config);
        let first = world.player();
        let second = world.spawn_player(&ctx).unwrap();
        assert_ne!(first, second);
        assert_eq!(world.player(), second);
    }

    #[test]
    fn unknown_tile_animation_fails_loudly() {
        let config = GameConfig::default();
        let assets = Assets::builtin();
        let ctx = SystemContext::new(0, &assets, &config);
        let level = Level::parse("Tile Goomba 0 0\nPlayer 1 3 48 48 5 -20 20 0.75 Buster\n")
            .unwrap();
        let err = World::from_level(&level, &ctx).err().unwrap();
        assert!(format!("{err:#}").contains("animation 'Goomba' is not registered"));
    }

    #[test]
    fn camera_never_scrolls_left_of_start() {
        let (config, _, mut world) = build();
        let viewport = config.viewport();
        assert_eq!(world.camera_center(viewport), Vec2::new(640.0, 384.0));
        world.player_entity_mut().get_mut::<Transform>().pos.x = 2000.0;
        assert_eq!(world.camera_center(viewport).x, 2000.0);
    }
}
