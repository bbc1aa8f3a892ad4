use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::scene::{Action, ActionPhase};

/// An action delivered when the engine reaches `frame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedAction {
    pub frame: u64,
    pub name: String,
    #[serde(default)]
    pub phase: ActionPhase,
}

impl ScriptedAction {
    pub fn action(&self) -> Action {
        Action::new(self.name.clone(), self.phase)
    }
}

/// Scripted input for headless runs, ordered by frame.
///
/// Actions sharing a frame keep their file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    actions: Vec<ScriptedAction>,
}

impl Timeline {
    pub fn new(mut actions: Vec<ScriptedAction>) -> Self {
        actions.sort_by_key(|action| action.frame);
        Self { actions }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let actions: Vec<ScriptedAction> =
            serde_yaml::from_str(text).context("Failed to parse action timeline")?;
        Ok(Self::new(actions))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read action timeline {}", path.display()))?;
        Self::from_yaml_str(&data).with_context(|| format!("Invalid timeline {}", path.display()))
    }

    pub fn actions_at(&self, frame: u64) -> impl Iterator<Item = Action> + '_ {
        self.actions
            .iter()
            .filter(move |scripted| scripted.frame == frame)
            .map(ScriptedAction::action)
    }

    pub fn last_frame(&self) -> Option<u64> {
        self.actions.last().map(|action| action.frame)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_orders_by_frame() {
        let timeline = Timeline::from_yaml_str(
            r#"
- { frame: 30, name: RIGHT, phase: END }
- { frame: 2, name: PLAY }
- { frame: 10, name: RIGHT, phase: START }
- { frame: 10, name: JUMP }
"#,
        )
        .unwrap();

        assert_eq!(timeline.len(), 4);
        assert_eq!(timeline.last_frame(), Some(30));
        assert_eq!(
            timeline.actions_at(10).collect::<Vec<_>>(),
            vec![Action::start("RIGHT"), Action::start("JUMP")]
        );
        assert_eq!(timeline.actions_at(30).next(), Some(Action::end("RIGHT")));
        assert_eq!(timeline.actions_at(5).count(), 0);
    }

    #[test]
    fn rejects_unknown_phase() {
        let err = Timeline::from_yaml_str("- { frame: 1, name: JUMP, phase: HOLD }").unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse action timeline"));
    }

    #[test]
    fn load_names_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Timeline::load(dir.path().join("actions.yaml")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read action timeline"));
    }
}
