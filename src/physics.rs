//! Axis-aligned box overlap
//!
//! Overlap is the per-axis penetration depth of two boxes centred on their
//! transforms. Both axes positive means the boxes intersect.

use crate::ecs::{BoundingBox, Entity, Transform};
use crate::math::Vec2;

/// Overlap of `a` and `b` at their current positions.
///
/// # Panics
/// If either entity lacks a `Transform` or `BoundingBox`.
#[track_caller]
pub fn get_overlap(a: &Entity, b: &Entity) -> Vec2 {
    overlap(
        a.get::<Transform>().pos,
        a.get::<BoundingBox>().half_size,
        b.get::<Transform>().pos,
        b.get::<BoundingBox>().half_size,
    )
}

/// Overlap of `a` at its current position against `b` at its previous one.
///
/// The axis on which this is `<= 0` is the axis the collision is new on.
#[track_caller]
pub fn get_previous_overlap(a: &Entity, b: &Entity) -> Vec2 {
    overlap(
        a.get::<Transform>().pos,
        a.get::<BoundingBox>().half_size,
        b.get::<Transform>().prev_pos,
        b.get::<BoundingBox>().half_size,
    )
}

pub fn intersects(overlap: Vec2) -> bool {
    overlap.x > 0.0 && overlap.y > 0.0
}

fn overlap(pos_a: Vec2, half_a: Vec2, pos_b: Vec2, half_b: Vec2) -> Vec2 {
    let delta = (pos_a - pos_b).abs();
    half_a + half_b - delta
}
