//! Level-owned collision state and the queries gameplay runs against it

pub mod desc;
mod queries;
mod world;

pub use desc::{BodyDesc, LevelDesc, LevelError, StaticBoxDesc};
pub use queries::LineOfSight;
pub use world::CollisionWorld;
