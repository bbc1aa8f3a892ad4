use tracing::debug;

use super::{Action, ActionMap, ActionPhase, MenuView, SceneChange};
use crate::engine::GameContext;

const KEY_BINDINGS: &[(&str, &str)] = &[
    ("W", "UP"),
    ("S", "DOWN"),
    ("D", "PLAY"),
    ("Escape", "QUIT"),
];

/// Level selection.
pub struct MenuScene {
    title: String,
    items: Vec<String>,
    selected: usize,
    ended: bool,
    action_map: ActionMap,
}

impl MenuScene {
    pub fn new(ctx: &GameContext) -> Self {
        Self {
            title: ctx.config.name.clone(),
            items: ctx
                .config
                .levels
                .iter()
                .map(|level| level.title.clone())
                .collect(),
            selected: 0,
            ended: false,
            action_map: KEY_BINDINGS.iter().copied().collect(),
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn update(&mut self) {}

    pub fn handle_action(&mut self, ctx: &GameContext, action: &Action) -> Option<SceneChange> {
        if action.phase != ActionPhase::Start {
            return None;
        }
        let count = self.items.len();
        match action.name.as_str() {
            "UP" if count > 0 => {
                self.selected = (self.selected + count - 1) % count;
            }
            "DOWN" if count > 0 => {
                self.selected = (self.selected + 1) % count;
            }
            "PLAY" => {
                let level = ctx.config.levels.get(self.selected)?;
                debug!(level = %level.title, "menu selection confirmed");
                return Some(SceneChange::Play(ctx.resolve(&level.path)));
            }
            "QUIT" => {
                self.ended = true;
                return Some(SceneChange::Quit);
            }
            _ => {}
        }
        None
    }

    pub fn render(&self) -> MenuView {
        MenuView {
            title: self.title.clone(),
            items: self.items.clone(),
            selected: self.selected,
        }
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn action_map(&self) -> &ActionMap {
        &self.action_map
    }
}
