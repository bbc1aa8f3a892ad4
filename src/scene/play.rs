use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::{
    Action, ActionMap, ActionPhase, BoxView, PlayView, SceneChange, SpriteView, ViewFlags,
};
use crate::{
    ecs::{Animation, BoundingBox, EntityId, Input, State, Transform},
    engine::{GameContext, Pipeline},
    level::Level,
    world::World,
};

const KEY_BINDINGS: &[(&str, &str)] = &[
    ("P", "PAUSE"),
    ("Escape", "QUIT"),
    ("T", "TOGGLE_TEXTURE"),
    ("C", "TOGGLE_COLLISION"),
    ("G", "TOGGLE_GRID"),
    ("W", "JUMP"),
    ("A", "LEFT"),
    ("D", "RIGHT"),
    ("Space", "SHOOT"),
];

/// One running level.
pub struct PlayScene {
    world: World,
    pipeline: Pipeline,
    paused: bool,
    flags: ViewFlags,
    ended: bool,
    action_map: ActionMap,
}

impl PlayScene {
    pub fn load(ctx: &GameContext, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let level = Level::load(path)?;
        let scene = Self::from_level(ctx, &level)
            .with_context(|| format!("Failed to build level {}", path.display()))?;
        info!(level = %path.display(), "play scene started");
        Ok(scene)
    }

    pub fn from_level(ctx: &GameContext, level: &Level) -> Result<Self> {
        let world = World::from_level(level, &ctx.system_context(0))?;
        Ok(Self {
            world,
            pipeline: Pipeline::standard(),
            paused: false,
            flags: ViewFlags::default(),
            ended: false,
            action_map: KEY_BINDINGS.iter().copied().collect(),
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Advance one frame. A paused scene does not change at all.
    pub fn update(&mut self, ctx: &GameContext) -> Result<()> {
        if self.paused {
            return Ok(());
        }
        let system_ctx = ctx.system_context(self.world.frame());
        self.pipeline.run_frame(&system_ctx, &mut self.world)?;
        self.world.advance_frame();
        Ok(())
    }

    pub fn handle_action(
        &mut self,
        ctx: &GameContext,
        action: &Action,
    ) -> Result<Option<SceneChange>> {
        match action.phase {
            ActionPhase::Start => self.action_started(ctx, &action.name),
            ActionPhase::End => {
                self.action_ended(&action.name);
                Ok(None)
            }
        }
    }

    fn action_started(&mut self, ctx: &GameContext, name: &str) -> Result<Option<SceneChange>> {
        match name {
            "TOGGLE_TEXTURE" => self.flags.textures = !self.flags.textures,
            "TOGGLE_COLLISION" => self.flags.collision = !self.flags.collision,
            "TOGGLE_GRID" => self.flags.grid = !self.flags.grid,
            "PAUSE" => {
                self.paused = !self.paused;
                debug!(paused = self.paused, "pause toggled");
            }
            "QUIT" => {
                self.ended = true;
                return Ok(Some(SceneChange::Menu));
            }
            "JUMP" => {
                let player = self.world.player_entity_mut();
                if player.get::<State>().is_standing() {
                    player.get_mut::<Input>().up = true;
                }
            }
            "LEFT" => self.world.player_entity_mut().get_mut::<Input>().left = true,
            "RIGHT" => self.world.player_entity_mut().get_mut::<Input>().right = true,
            "SHOOT" => {
                if self.world.player_entity().get::<Input>().can_shoot {
                    let shooter = self.world.player();
                    let system_ctx = ctx.system_context(self.world.frame());
                    self.world.spawn_bullet(&system_ctx, shooter)?;
                    self.world.player_entity_mut().get_mut::<Input>().can_shoot = false;
                }
            }
            _ => {}
        }
        Ok(None)
    }

    /// `up` is left for the movement system to consume.
    fn action_ended(&mut self, name: &str) {
        let input = self.world.player_entity_mut().get_mut::<Input>();
        match name {
            "LEFT" => input.left = false,
            "RIGHT" => input.right = false,
            "SHOOT" => input.can_shoot = true,
            _ => {}
        }
    }

    pub fn render(&self, ctx: &GameContext) -> PlayView {
        let entities = self.world.entities();
        let mut sprites = Vec::new();
        let mut collision_boxes = Vec::new();

        for entity in entities.iter() {
            let Some(transform) = entity.try_get::<Transform>() else {
                continue;
            };
            if let Some(animation) = entity.try_get::<Animation>() {
                sprites.push(sprite_view(entity.id(), entity.tag(), transform, animation));
            }
            if self.flags.collision {
                if let Some(bounds) = entity.try_get::<BoundingBox>() {
                    collision_boxes.push(BoxView {
                        entity: entity.id(),
                        center: transform.pos,
                        size: bounds.size,
                    });
                }
            }
        }

        PlayView {
            frame: self.world.frame(),
            paused: self.paused,
            camera_center: self.world.camera_center(ctx.config.viewport()),
            flags: self.flags,
            grid_size: ctx.config.grid_size(),
            sprites,
            collision_boxes,
        }
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn action_map(&self) -> &ActionMap {
        &self.action_map
    }
}

fn sprite_view(
    id: EntityId,
    tag: &str,
    transform: &Transform,
    animation: &Animation,
) -> SpriteView {
    SpriteView {
        entity: id,
        tag: tag.to_string(),
        animation: animation.name().to_string(),
        frame: animation.frame_index(),
        pos: transform.pos,
        scale: transform.scale,
        angle: transform.angle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::ecs::Locomotion;
    use crate::world::BULLET_TAG;

    const LEVEL: &str = "\
Tile Ground 0 0
Tile Ground 1 0
Tile Ground 2 0
Dec Bush 3 1
Player 1 1 48 48 5 -20 20 0.75 Buster
";

    fn scene() -> (GameContext, PlayScene) {
        let ctx = GameContext::new(GameConfig::default(), ".");
        let level = Level::parse(LEVEL).unwrap();
        let scene = PlayScene::from_level(&ctx, &level).unwrap();
        (ctx, scene)
    }

    #[test]
    fn pause_freezes_everything() {
        let (ctx, mut scene) = scene();
        scene.update(&ctx).unwrap();
        let before = scene.render(&ctx);

        scene.handle_action(&ctx, &Action::start("PAUSE")).unwrap();
        for _ in 0..10 {
            scene.update(&ctx).unwrap();
        }
        let paused = scene.render(&ctx);
        assert!(paused.paused);
        assert_eq!(paused.frame, before.frame);
        assert_eq!(paused.sprites, before.sprites);

        scene.handle_action(&ctx, &Action::start("PAUSE")).unwrap();
        scene.update(&ctx).unwrap();
        assert_eq!(scene.world().frame(), 2);
    }

    #[test]
    fn jump_only_arms_when_standing() {
        let (ctx, mut scene) = scene();
        scene.handle_action(&ctx, &Action::start("JUMP")).unwrap();
        assert!(!scene.world().player_entity().get::<Input>().up);

        scene
            .world_mut()
            .player_entity_mut()
            .get_mut::<State>()
            .locomotion = Locomotion::Standing;
        scene.handle_action(&ctx, &Action::start("JUMP")).unwrap();
        assert!(scene.world().player_entity().get::<Input>().up);
    }

    #[test]
    fn tapping_jump_within_one_frame_still_jumps() {
        let (ctx, mut scene) = scene();
        for _ in 0..120 {
            scene.update(&ctx).unwrap();
        }
        assert!(scene.world().player_entity().get::<State>().is_standing());

        scene.handle_action(&ctx, &Action::start("JUMP")).unwrap();
        scene.handle_action(&ctx, &Action::end("JUMP")).unwrap();
        scene.update(&ctx).unwrap();

        let player = scene.world().player_entity();
        let transform = player.get::<Transform>();
        assert!(transform.velocity.y < 0.0);
        assert!(transform.pos.y < 680.0);
        assert!(!player.get::<Input>().up);
    }

    #[test]
    fn shoot_fires_once_until_released() {
        let (ctx, mut scene) = scene();
        scene.update(&ctx).unwrap();

        scene.handle_action(&ctx, &Action::start("SHOOT")).unwrap();
        scene.handle_action(&ctx, &Action::start("SHOOT")).unwrap();
        scene.world_mut().entities_mut().update();
        assert_eq!(scene.world().entities().entities_with_tag(BULLET_TAG).len(), 1);

        scene.handle_action(&ctx, &Action::end("SHOOT")).unwrap();
        scene.handle_action(&ctx, &Action::start("SHOOT")).unwrap();
        scene.world_mut().entities_mut().update();
        assert_eq!(scene.world().entities().entities_with_tag(BULLET_TAG).len(), 2);
    }

    #[test]
    fn toggles_and_quit() {
        let (ctx, mut scene) = scene();
        scene.update(&ctx).unwrap();
        assert!(scene.render(&ctx).collision_boxes.is_empty());

        scene.handle_action(&ctx, &Action::start("TOGGLE_COLLISION")).unwrap();
        scene.handle_action(&ctx, &Action::start("TOGGLE_GRID")).unwrap();
        scene.handle_action(&ctx, &Action::start("TOGGLE_TEXTURE")).unwrap();
        let view = scene.render(&ctx);
        assert_eq!(
            view.flags,
            ViewFlags {
                textures: false,
                collision: true,
                grid: true
            }
        );
        // three tiles and the player carry boxes; the bush does not
        assert_eq!(view.collision_boxes.len(), 4);
        assert_eq!(view.sprites.len(), 5);

        let change = scene.handle_action(&ctx, &Action::start("QUIT")).unwrap();
        assert_eq!(change, Some(SceneChange::Menu));
        assert!(scene.has_ended());
    }

    #[test]
    fn player_settles_on_ground() {
        let (ctx, mut scene) = scene();
        for _ in 0..120 {
            scene.update(&ctx).unwrap();
        }
        let player = scene.world().player_entity();
        assert!(player.get::<State>().is_standing());
        // ground top is at 704, hitbox half height 24
        assert_eq!(player.get::<Transform>().pos.y, 680.0);
        assert_eq!(player.get::<Animation>().name(), "Stand");
    }

    #[test]
    fn walking_right_runs_and_moves_camera_later() {
        let (ctx, mut scene) = scene();
        for _ in 0..60 {
            scene.update(&ctx).unwrap();
        }
        scene.handle_action(&ctx, &Action::start("RIGHT")).unwrap();
        scene.update(&ctx).unwrap();
        let player = scene.world().player_entity();
        assert_eq!(player.get::<Transform>().velocity.x, 5.0);
        assert_eq!(player.get::<Animation>().name(), "Run");
        assert_eq!(scene.render(&ctx).camera_center.x, 640.0);
    }
}
