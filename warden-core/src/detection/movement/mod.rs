//! Movement detections, all anchored on the divergence between the
//! client-reported position stream and the server-simulated twin.
//!
//! Every check in this family is gated: it stays quiet while the simulation
//! has declared itself unreliable, while a teleport is in flight and during
//! the post-correction cooldown, because in all three states divergence is
//! expected rather than suspicious.

mod flight;
mod phase;
mod speed;
mod timer;
mod velocity;

pub use flight::FlightA;
pub use phase::PhaseA;
pub use speed::SpeedA;
pub use timer::TimerA;
pub use velocity::VelocityA;

use crate::player::movement_state::MovementState;
use crate::simulation::correction::CorrectionHandler;

/// Whether divergence-based checks are meaningful this tick.
pub(crate) fn checks_active(movement: &MovementState, correction: &CorrectionHandler) -> bool {
    movement.simulation_reliable
        && movement.teleport.is_none()
        && !movement.flying
        && !movement.no_clip
        && !correction.is_in_cooldown()
}
