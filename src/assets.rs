//! Animation clip registry
//!
//! Clips are immutable metadata (frame count, playback speed, pixel size)
//! shared by every entity that plays them. Texture decoding belongs to the
//! host; only what the simulation needs for layout and timing lives here.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Vec2;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("animation '{0}' is not registered")]
    UnknownAnimation(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub frame_count: usize,
    /// Game frames spent on each clip frame; zero means the clip never advances.
    pub speed: usize,
    /// Size of one frame in unscaled pixels
    pub size: Vec2,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, frame_count: usize, speed: usize, size: Vec2) -> Self {
        Self {
            name: name.into(),
            frame_count: frame_count.max(1),
            speed,
            size,
        }
    }

    /// Clip frame shown after `elapsed` game frames, wrapping around.
    pub fn frame_at(&self, elapsed: u64) -> usize {
        if self.speed == 0 {
            return 0;
        }
        ((elapsed / self.speed as u64) % self.frame_count as u64) as usize
    }

    /// Game frames needed to play every clip frame once.
    pub fn duration(&self) -> Option<u64> {
        if self.speed == 0 {
            None
        } else {
            Some((self.frame_count as u64).saturating_mul(self.speed as u64))
        }
    }
}

/// Clip definition as it appears in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDef {
    pub name: String,
    #[serde(default = "default_frame_count")]
    pub frames: usize,
    #[serde(default)]
    pub speed: usize,
    pub width: f32,
    pub height: f32,
}

fn default_frame_count() -> usize {
    1
}

impl AnimationDef {
    fn to_clip(&self) -> AnimationClip {
        AnimationClip::new(
            self.name.clone(),
            self.frames,
            self.speed,
            Vec2::new(self.width, self.height),
        )
    }
}

// name, frames, speed, width, height
const BUILTIN_ANIMATIONS: &[(&str, usize, usize, f32, f32)] = &[
    ("Stand", 1, 0, 16.0, 24.0),
    ("Run", 3, 6, 16.0, 24.0),
    ("Air", 1, 0, 16.0, 24.0),
    ("Ground", 1, 0, 16.0, 16.0),
    ("Brick", 1, 0, 16.0, 16.0),
    ("Block", 1, 0, 16.0, 16.0),
    ("Question", 3, 12, 16.0, 16.0),
    ("Question2", 1, 0, 16.0, 16.0),
    ("Pipe", 1, 0, 32.0, 32.0),
    ("PipeTall", 1, 0, 32.0, 48.0),
    ("Buster", 2, 4, 8.0, 8.0),
    ("Explosion", 4, 4, 16.0, 16.0),
    ("Cloud", 1, 0, 48.0, 24.0),
    ("Bush", 1, 0, 32.0, 16.0),
    ("Flag", 1, 0, 16.0, 16.0),
    ("Pole", 1, 0, 4.0, 16.0),
];

#[derive(Debug, Clone, Default)]
pub struct Assets {
    animations: HashMap<String, Arc<AnimationClip>>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the standard clip set.
    pub fn builtin() -> Self {
        let mut assets = Self::new();
        for &(name, frames, speed, width, height) in BUILTIN_ANIMATIONS {
            assets.add_animation(AnimationClip::new(
                name,
                frames,
                speed,
                Vec2::new(width, height),
            ));
        }
        assets
    }

    /// Built-in clips overridden or extended by configured definitions.
    pub fn with_definitions(defs: &[AnimationDef]) -> Self {
        let mut assets = Self::builtin();
        for def in defs {
            assets.add_animation(def.to_clip());
        }
        assets
    }

    pub fn add_animation(&mut self, clip: AnimationClip) {
        self.animations.insert(clip.name.clone(), Arc::new(clip));
    }

    pub fn get_animation(&self, name: &str) -> Result<Arc<AnimationClip>, AssetError> {
        self.animations
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::UnknownAnimation(name.to_string()))
    }

    pub fn has_animation(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }
}
