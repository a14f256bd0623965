//! Server-authoritative anticheat core.
//!
//! The crate re-simulates player movement from raw inputs, validates combat
//! through lag-compensated hit checks and watches click statistics, feeding
//! everything into a shared buffer/violation state machine. It owns no
//! networking and no world data: the host server adapts its packet stream
//! and world model to the traits in [`interface`] and drives everything
//! through [`detection::manager::DetectionManager`].

pub mod config;
pub mod detection;
pub mod interface;
pub mod player;
pub mod simulation;

#[cfg(test)]
mod test_world;

pub use config::WardenConfig;
pub use detection::manager::{AttackVerdict, DetectionManager};
