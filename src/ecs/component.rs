//! Component kinds and the per-entity store
//!
//! The component set is closed: every entity carries one [`ComponentStore`]
//! with a slot per kind. [`Component`] maps a type to its slot so callers get
//! typed access without reflection.

use std::fmt;
use std::sync::Arc;

use crate::assets::AnimationClip;
use crate::math::Vec2;

/// A kind of data an entity may carry, at most one of each.
pub trait Component: Sized + 'static {
    const KIND: &'static str;

    fn slot(store: &ComponentStore) -> &Option<Self>;
    fn slot_mut(store: &mut ComponentStore) -> &mut Option<Self>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub pos: Vec2,
    pub prev_pos: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub scale: Vec2,
}

impl Transform {
    pub fn new(pos: Vec2, scale: f32) -> Self {
        Self::with_velocity(pos, Vec2::ZERO, 0.0, scale)
    }

    pub fn with_velocity(pos: Vec2, velocity: Vec2, angle: f32, scale: f32) -> Self {
        Self {
            pos,
            prev_pos: pos,
            velocity,
            angle,
            scale: Vec2::splat(scale),
        }
    }

    /// Movement over the last integration step
    pub fn displacement(&self) -> Vec2 {
        self.pos - self.prev_pos
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub size: Vec2,
    pub half_size: Vec2,
}

impl BoundingBox {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            half_size: size / 2.0,
        }
    }
}

/// Playback state of a shared clip.
#[derive(Debug, Clone)]
pub struct Animation {
    pub clip: Arc<AnimationClip>,
    pub repeat: bool,
    elapsed: u64,
}

impl Animation {
    pub fn new(clip: Arc<AnimationClip>, repeat: bool) -> Self {
        Self {
            clip,
            repeat,
            elapsed: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.clip.name
    }

    pub fn tick(&mut self) {
        self.elapsed += 1;
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn frame_index(&self) -> usize {
        self.clip.frame_at(self.elapsed)
    }

    /// True once every clip frame has been shown at least once.
    pub fn has_ended(&self) -> bool {
        self.clip
            .duration()
            .map_or(false, |duration| self.elapsed >= duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub gravity: f32,
}

impl Gravity {
    pub fn new(gravity: f32) -> Self {
        Self { gravity }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Input {
    pub up: bool,
    pub left: bool,
    pub right: bool,
    pub can_shoot: bool,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            up: false,
            left: false,
            right: false,
            can_shoot: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locomotion {
    Standing,
    Air,
}

impl Locomotion {
    pub fn label(self) -> &'static str {
        match self {
            Locomotion::Standing => "standing",
            Locomotion::Air => "air",
        }
    }
}

impl fmt::Display for Locomotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State {
    pub locomotion: Locomotion,
}

impl State {
    pub fn new(locomotion: Locomotion) -> Self {
        Self { locomotion }
    }

    pub fn is_standing(&self) -> bool {
        self.locomotion == Locomotion::Standing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifespan {
    pub remaining: u32,
    pub birth_frame: u64,
}

impl Lifespan {
    pub fn new(frames: u32, birth_frame: u64) -> Self {
        Self {
            remaining: frames,
            birth_frame,
        }
    }
}

/// One optional slot per component kind.
#[derive(Debug, Clone, Default)]
pub struct ComponentStore {
    transform: Option<Transform>,
    bounding_box: Option<BoundingBox>,
    animation: Option<Animation>,
    gravity: Option<Gravity>,
    input: Option<Input>,
    state: Option<State>,
    lifespan: Option<Lifespan>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a component, replacing any previous one of the same kind.
    pub fn insert<C: Component>(&mut self, component: C) -> &mut C {
        C::slot_mut(self).insert(component)
    }

    pub fn get<C: Component>(&self) -> Option<&C> {
        C::slot(self).as_ref()
    }

    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        C::slot_mut(self).as_mut()
    }

    pub fn remove<C: Component>(&mut self) -> Option<C> {
        C::slot_mut(self).take()
    }

    pub fn has<C: Component>(&self) -> bool {
        C::slot(self).is_some()
    }
}

macro_rules! component_slot {
    ($ty:ty, $field:ident, $kind:literal) => {
        impl Component for $ty {
            const KIND: &'static str = $kind;

            fn slot(store: &ComponentStore) -> &Option<Self> {
                &store.$field
            }

            fn slot_mut(store: &mut ComponentStore) -> &mut Option<Self> {
                &mut store.$field
            }
        }
    };
}

component_slot!(Transform, transform, "Transform");
component_slot!(BoundingBox, bounding_box, "BoundingBox");
component_slot!(Animation, animation, "Animation");
component_slot!(Gravity, gravity, "Gravity");
component_slot!(Input, input, "Input");
component_slot!(State, state, "State");
component_slot!(Lifespan, lifespan, "Lifespan");
