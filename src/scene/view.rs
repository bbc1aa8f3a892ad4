//! Serializable frame descriptions for a drawing host

use serde::Serialize;

use crate::ecs::EntityId;
use crate::math::Vec2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "scene", rename_all = "lowercase")]
pub enum FrameView {
    Menu(MenuView),
    Play(PlayView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuView {
    pub title: String,
    pub items: Vec<String>,
    pub selected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewFlags {
    pub textures: bool,
    pub collision: bool,
    pub grid: bool,
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self {
            textures: true,
            collision: false,
            grid: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayView {
    pub frame: u64,
    pub paused: bool,
    pub camera_center: Vec2,
    pub flags: ViewFlags,
    pub grid_size: Vec2,
    pub sprites: Vec<SpriteView>,
    /// Present only while collision drawing is on.
    pub collision_boxes: Vec<BoxView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpriteView {
    pub entity: EntityId,
    pub tag: String,
    pub animation: String,
    pub frame: usize,
    pub pos: Vec2,
    pub scale: Vec2,
    pub angle: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxView {
    pub entity: EntityId,
    pub center: Vec2,
    pub size: Vec2,
}
