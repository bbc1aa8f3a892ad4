mod animation;
mod collision;
mod lifespan;
mod movement;

pub use animation::AnimationSystem;
pub use collision::CollisionSystem;
pub use lifespan::LifespanSystem;
pub use movement::{clamp_velocity, MovementSystem};
