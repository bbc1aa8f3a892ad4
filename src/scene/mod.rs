//! Scenes: the menu and the play simulation
//!
//! Scenes receive named actions from the host, advance one frame per
//! `update`, and describe themselves through [`FrameView`]. Transitions are
//! returned as [`SceneChange`] values and applied by the engine.

mod menu;
mod play;
mod view;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::GameContext;

pub use menu::MenuScene;
pub use play::PlayScene;
pub use view::{BoxView, FrameView, MenuView, PlayView, SpriteView, ViewFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionPhase {
    #[default]
    Start,
    End,
}

impl ActionPhase {
    pub fn label(self) -> &'static str {
        match self {
            ActionPhase::Start => "START",
            ActionPhase::End => "END",
        }
    }
}

impl fmt::Display for ActionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ActionPhase {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_uppercase().as_str() {
            "START" => Ok(ActionPhase::Start),
            "END" => Ok(ActionPhase::End),
            other => anyhow::bail!("unknown action phase '{other}', expected START or END"),
        }
    }
}

/// A named, phased input event such as `JUMP`/`START`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub phase: ActionPhase,
}

impl Action {
    pub fn new(name: impl Into<String>, phase: ActionPhase) -> Self {
        Self {
            name: name.into(),
            phase,
        }
    }

    pub fn start(name: impl Into<String>) -> Self {
        Self::new(name, ActionPhase::Start)
    }

    pub fn end(name: impl Into<String>) -> Self {
        Self::new(name, ActionPhase::End)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.phase)
    }
}

/// Key name -> action name bindings a host uses to translate raw input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionMap {
    bindings: BTreeMap<String, String>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, key: impl Into<String>, action: impl Into<String>) {
        self.bindings.insert(key.into(), action.into());
    }

    pub fn action_for(&self, key: &str) -> Option<&str> {
        self.bindings.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|(key, action)| (key.as_str(), action.as_str()))
    }
}

impl<K: Into<String>, A: Into<String>> FromIterator<(K, A)> for ActionMap {
    fn from_iter<T: IntoIterator<Item = (K, A)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (key, action) in iter {
            map.bind(key, action);
        }
        map
    }
}

/// Transition requested by a scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneChange {
    Menu,
    /// Start playing the level file at this path.
    Play(PathBuf),
    Quit,
}

pub enum Scene {
    Menu(MenuScene),
    Play(PlayScene),
}

impl Scene {
    pub fn name(&self) -> &'static str {
        match self {
            Scene::Menu(_) => "menu",
            Scene::Play(_) => "play",
        }
    }

    pub fn update(&mut self, ctx: &GameContext) -> Result<()> {
        match self {
            Scene::Menu(menu) => {
                menu.update();
                Ok(())
            }
            Scene::Play(play) => play.update(ctx),
        }
    }

    pub fn handle_action(
        &mut self,
        ctx: &GameContext,
        action: &Action,
    ) -> Result<Option<SceneChange>> {
        match self {
            Scene::Menu(menu) => Ok(menu.handle_action(ctx, action)),
            Scene::Play(play) => play.handle_action(ctx, action),
        }
    }

    pub fn render(&self, ctx: &GameContext) -> FrameView {
        match self {
            Scene::Menu(menu) => FrameView::Menu(menu.render()),
            Scene::Play(play) => FrameView::Play(play.render(ctx)),
        }
    }

    pub fn has_ended(&self) -> bool {
        match self {
            Scene::Menu(menu) => menu.has_ended(),
            Scene::Play(play) => play.has_ended(),
        }
    }

    pub fn action_map(&self) -> &ActionMap {
        match self {
            Scene::Menu(menu) => menu.action_map(),
            Scene::Play(play) => play.action_map(),
        }
    }
}
