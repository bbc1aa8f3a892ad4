use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use super::{SystemContext, Timeline};
use crate::{
    assets::Assets,
    config::GameConfig,
    scene::{Action, FrameView, MenuScene, PlayScene, Scene, SceneChange},
};

/// Shared, read-only game resources handed to scenes.
pub struct GameContext {
    pub config: GameConfig,
    pub assets: Assets,
    base_dir: PathBuf,
}

impl GameContext {
    /// `base_dir` anchors relative level paths named in the configuration.
    pub fn new(config: GameConfig, base_dir: impl AsRef<Path>) -> Self {
        let assets = Assets::with_definitions(&config.animations);
        Self {
            config,
            assets,
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.base_dir.join(path)
    }

    pub fn system_context(&self, frame: u64) -> SystemContext<'_> {
        SystemContext::new(frame, &self.assets, &self.config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub frames: u64,
    pub scene: &'static str,
    pub entities: usize,
    pub running: bool,
}

/// Owns the active scene and applies the transitions it requests.
pub struct GameEngine {
    context: GameContext,
    scene: Scene,
    running: bool,
    frames: u64,
}

impl GameEngine {
    /// Start at the level menu.
    pub fn new(context: GameContext) -> Self {
        let scene = Scene::Menu(MenuScene::new(&context));
        Self {
            context,
            scene,
            running: true,
            frames: 0,
        }
    }

    /// Skip the menu and start playing `level` directly.
    pub fn with_level(context: GameContext, level: impl AsRef<Path>) -> Result<Self> {
        let scene = Scene::Play(PlayScene::load(&context, level)?);
        Ok(Self {
            context,
            scene,
            running: true,
            frames: 0,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames the engine has advanced, across scene changes.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn update(&mut self) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        self.scene.update(&self.context)?;
        self.frames += 1;
        Ok(())
    }

    pub fn do_action(&mut self, action: &Action) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        debug!(%action, scene = self.scene.name(), "action");
        if let Some(change) = self.scene.handle_action(&self.context, action)? {
            self.change_scene(change)?;
        }
        Ok(())
    }

    pub fn change_scene(&mut self, change: SceneChange) -> Result<()> {
        match change {
            SceneChange::Menu => {
                self.scene = Scene::Menu(MenuScene::new(&self.context));
            }
            SceneChange::Play(path) => {
                self.scene = Scene::Play(PlayScene::load(&self.context, &path)?);
            }
            SceneChange::Quit => {
                self.running = false;
                info!(frames = self.frames, "engine stopped");
                return Ok(());
            }
        }
        debug!(scene = self.scene.name(), frame = self.frames, "scene changed");
        Ok(())
    }

    pub fn render(&self) -> FrameView {
        self.scene.render(&self.context)
    }

    /// Advance up to `frames` frames, delivering scripted actions at the
    /// start of the frame they name. Stops early once the engine quits.
    pub fn run(&mut self, frames: u64, timeline: &Timeline) -> Result<RunSummary> {
        let end = self.frames + frames;
        while self.running && self.frames < end {
            for action in timeline.actions_at(self.frames) {
                self.do_action(&action)?;
            }
            self.update()?;
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> RunSummary {
        let entities = match &self.scene {
            Scene::Play(play) => play.world().entities().len(),
            Scene::Menu(_) => 0,
        };
        RunSummary {
            frames: self.frames,
            scene: self.scene.name(),
            entities,
            running: self.running,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::LevelEntry;
    use crate::engine::ScriptedAction;
    use crate::scene::ActionPhase;

    const LEVEL: &str = "\
Tile Ground 0 0
Tile Ground 1 0
Player 1 1 48 48 5 -20 20 0.75 Buster
";

    fn context_with_level() -> (tempfile::TempDir, GameContext) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("first.txt"), LEVEL).unwrap();
        let mut config = GameConfig::default();
        config.levels = vec![LevelEntry {
            title: "First".into(),
            path: "first.txt".into(),
        }];
        let ctx = GameContext::new(config, dir.path());
        (dir, ctx)
    }

    fn scripted(frame: u64, name: &str, phase: ActionPhase) -> ScriptedAction {
        ScriptedAction {
            frame,
            name: name.into(),
            phase,
        }
    }

    #[test]
    fn menu_play_quit_round_trip() {
        let (_dir, ctx) = context_with_level();
        let mut engine = GameEngine::new(ctx);
        assert_eq!(engine.scene().name(), "menu");

        engine.do_action(&Action::start("PLAY")).unwrap();
        assert_eq!(engine.scene().name(), "play");

        engine.update().unwrap();
        engine.do_action(&Action::start("QUIT")).unwrap();
        assert_eq!(engine.scene().name(), "menu");
        assert!(engine.is_running());

        engine.do_action(&Action::start("QUIT")).unwrap();
        assert!(!engine.is_running());
        let frames = engine.frames();
        engine.update().unwrap();
        assert_eq!(engine.frames(), frames);
    }

    #[test]
    fn run_replays_timeline() {
        let (_dir, ctx) = context_with_level();
        let mut engine = GameEngine::new(ctx);
        let timeline = Timeline::new(vec![
            scripted(0, "PLAY", ActionPhase::Start),
            scripted(5, "SHOOT", ActionPhase::Start),
        ]);

        let summary = engine.run(10, &timeline).unwrap();
        assert_eq!(summary.frames, 10);
        assert_eq!(summary.scene, "play");
        // two tiles, the player and one bullet
        assert_eq!(summary.entities, 4);
    }

    #[test]
    fn run_stops_when_quitting() {
        let (_dir, ctx) = context_with_level();
        let mut engine = GameEngine::new(ctx);
        let timeline = Timeline::new(vec![scripted(3, "QUIT", ActionPhase::Start)]);
        let summary = engine.run(100, &timeline).unwrap();
        assert_eq!(summary.frames, 3);
        assert!(!summary.running);
    }

    #[test]
    fn missing_level_file_is_reported() {
        let ctx = GameContext::new(GameConfig::default(), "/nonexistent");
        let mut engine = GameEngine::new(ctx);
        let err = engine.do_action(&Action::start("PLAY")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read level"));
        assert_eq!(engine.scene().name(), "menu");
    }
}
