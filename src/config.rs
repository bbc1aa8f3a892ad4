use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::assets::AnimationDef;
use crate::math::Vec2;

fn default_name() -> String {
    "Mega Mario".to_string()
}

fn default_window_width() -> f32 {
    1280.0
}

fn default_window_height() -> f32 {
    768.0
}

fn default_grid_cell() -> f32 {
    64.0
}

fn default_tile_scale() -> f32 {
    4.0
}

fn default_player_scale() -> f32 {
    2.5
}

fn default_bullet_speed() -> f32 {
    10.0
}

fn default_bullet_lifespan() -> u32 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_levels() -> Vec<LevelEntry> {
    (1..=3)
        .map(|n| LevelEntry {
            title: format!("Level {n}"),
            path: PathBuf::from(format!("levels/level{n}.txt")),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default = "default_tile_scale")]
    pub tile_scale: f32,
    #[serde(default = "default_player_scale")]
    pub player_scale: f32,
    #[serde(default)]
    pub bullet: BulletConfig,
    #[serde(default = "default_levels")]
    pub levels: Vec<LevelEntry>,
    /// Extra clips merged over the built-in set
    #[serde(default)]
    pub animations: Vec<AnimationDef>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: f32,
    #[serde(default = "default_window_height")]
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_grid_cell")]
    pub width: f32,
    #[serde(default = "default_grid_cell")]
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulletConfig {
    #[serde(default = "default_bullet_speed")]
    pub speed: f32,
    #[serde(default = "default_bullet_lifespan")]
    pub lifespan_frames: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelEntry {
    pub title: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_grid_cell(),
            height: default_grid_cell(),
        }
    }
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: default_bullet_speed(),
            lifespan_frames: default_bullet_lifespan(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            window: WindowConfig::default(),
            grid: GridConfig::default(),
            tile_scale: default_tile_scale(),
            player_scale: default_player_scale(),
            bullet: BulletConfig::default(),
            levels: default_levels(),
            animations: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse game configuration")
    }

    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.window.width, self.window.height)
    }

    pub fn grid_size(&self) -> Vec2 {
        Vec2::new(self.grid.width, self.grid.height)
    }
}

/// Reads configuration files relative to a base directory.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<GameConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: GameConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Resolve a path named inside a config file (levels, timelines).
    pub fn resolve(&self, file: impl AsRef<Path>) -> PathBuf {
        self.base_dir.join(file)
    }
}
