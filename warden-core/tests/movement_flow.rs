//! End-to-end movement scenarios: an honest client mirroring the simulation
//! stays silent, a speedhacking client draws corrections and violations.

mod common;

use std::sync::Arc;

use common::{FlatWorld, RecordingSink, windows_session};
use warden_core::config::WardenConfig;
use warden_core::detection::manager::DetectionManager;
use warden_core::interface::InputSnapshot;
use warden_utils::math::Vector3;

fn setup() -> (DetectionManager, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let mut manager = DetectionManager::new(WardenConfig::default(), Box::new(Arc::clone(&sink)));
    manager
        .add_player(
            1,
            "steve".to_owned(),
            windows_session(),
            Vector3::new(0.5, 64.0, 0.5),
        )
        .expect("default config is valid");
    (manager, sink)
}

fn input_at(position: Vector3<f64>, frame: u64) -> InputSnapshot {
    InputSnapshot {
        position,
        yaw: 0.0,
        pitch: 0.0,
        head_yaw: 0.0,
        move_vector: (0.0, 0.0),
        sprinting: false,
        sneaking: false,
        jumping: false,
        missed_swing: false,
        gliding: false,
        on_ground: true,
        simulation_frame: frame,
    }
}

#[test]
fn honest_client_mirroring_the_simulation_stays_silent() {
    let (mut manager, sink) = setup();
    let world = FlatWorld::new(63);

    for frame in 1..=100u64 {
        // The client reports exactly where the server simulated it.
        let position = manager.authoritative_position(1).expect("tracked");
        manager.handle_input(1, &input_at(position, frame), &world);
        let corrections = manager.tick(&world);
        assert!(corrections.is_empty(), "honest client needs no resync");
    }

    assert!(sink.events().is_empty(), "got {:?}", sink.events());
}

#[test]
fn speedhacking_client_draws_corrections_and_violations() {
    let (mut manager, sink) = setup();
    let world = FlatWorld::new(63);

    let mut corrections_sent = 0usize;
    for frame in 1..=120u64 {
        // One block per tick sideways with no input impulse at all.
        let claimed = Vector3::new(0.5 + frame as f64, 64.0, 0.5);
        manager.handle_input(1, &input_at(claimed, frame), &world);
        let corrections = manager.tick(&world);
        corrections_sent += corrections.len();
        // The client acknowledges but keeps going.
        if !corrections.is_empty() {
            manager.handle_correction_ack(1);
        }
    }

    assert!(corrections_sent >= 2, "got {corrections_sent} corrections");
    assert!(
        sink.count_for("SpeedA") >= 1,
        "events: {:?}",
        sink.events()
    );
}

#[test]
fn ignored_knockback_flags_the_velocity_check() {
    let (mut manager, sink) = setup();
    let world = FlatWorld::new(63);

    // Settle on the ground first.
    for frame in 1..=5u64 {
        let position = manager.authoritative_position(1).expect("tracked");
        manager.handle_input(1, &input_at(position, frame), &world);
        manager.tick(&world);
    }

    for round in 0..6u64 {
        manager.handle_knockback(1, Vector3::new(0.0, 0.5, 0.3));
        for step in 0..10u64 {
            // The client reports a flat, unmoved position the whole time.
            let frame = 6 + round * 10 + step;
            manager.handle_input(1, &input_at(Vector3::new(0.5, 64.0, 0.5), frame), &world);
            manager.tick(&world);
        }
    }

    assert!(
        sink.count_for("VelocityA") >= 1,
        "events: {:?}",
        sink.events()
    );
}
