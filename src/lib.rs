pub mod assets;
pub mod config;
pub mod ecs;
pub mod engine;
pub mod level;
pub mod math;
pub mod physics;
pub mod scene;
pub mod systems;
pub mod world;

pub use config::{ConfigLoader, GameConfig};
pub use engine::{GameContext, GameEngine, RunSummary, Timeline};
pub use scene::{Action, ActionPhase, FrameView, Scene, SceneChange};
pub use world::World;
