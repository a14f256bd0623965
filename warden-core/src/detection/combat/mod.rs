//! Combat detections: swing discipline, reach, hitbox, aim and autoclicker.

mod aim;
mod autoclicker;
mod hitbox;
mod killaura;
mod reach;

pub use aim::AimA;
pub use autoclicker::{AutoclickerA, AutoclickerB, AutoclickerC, AutoclickerD};
pub use hitbox::HitboxA;
pub use killaura::KillauraA;
pub use reach::{ReachA, ReachB};
