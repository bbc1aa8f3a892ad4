//! Entity Component System
//!
//! Entities live in an arena owned by the [`EntityManager`]; everything else
//! refers to them by [`EntityId`]. Components form a closed set stored inline
//! on each entity.

pub mod component;
pub mod entity;
pub mod manager;

pub use component::{
    Animation, BoundingBox, Component, ComponentStore, Gravity, Input, Lifespan, Locomotion,
    State, Transform,
};
pub use entity::{Entity, EntityId};
pub use manager::EntityManager;
