//! The detection manager: owns all per-player state behind per-player locks
//! and exposes the packet/tick entry points the host server calls into.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use warden_utils::math::Vector3;

use crate::config::WardenConfig;
use crate::detection::auth::{EditionFakerA, EditionFakerB};
use crate::detection::combat::{
    AimA, AutoclickerA, AutoclickerB, AutoclickerC, AutoclickerD, HitboxA, KillauraA, ReachA,
    ReachB,
};
use crate::detection::movement::{FlightA, PhaseA, SpeedA, TimerA, VelocityA};
use crate::detection::packet::{
    BadPacketA, BadPacketB, BadPacketC, BadPacketD, BadPacketE, BadPacketF,
};
use crate::detection::world::{NukerA, ScaffoldA};
use crate::detection::{Detection, DetectionCtx, DetectionSnapshot, RegistryError};
use crate::interface::{
    CorrectionPayload, EffectQuery, EntityQuery, InputSnapshot, NotificationSink, PlayerAbilities,
    SessionInfo, TriggerType, WorldQuery,
};
use crate::player::Player;
use crate::player::click_state::ClickButton;
use crate::simulation::correction::CorrectionHandler;
use crate::simulation::simulate;

/// Tracked entities with no update for this many ticks get dropped.
const TRACKER_MAX_AGE: u64 = 200;
/// How often stale tracker entries are swept.
const TRACKER_SWEEP_INTERVAL: u64 = 100;

/// Every detector instance for one player.
pub struct DetectorSet {
    /// Swing-gap validation.
    pub killaura_a: KillauraA,
    /// Raycast reach.
    pub reach_a: ReachA,
    /// Closest-point reach.
    pub reach_b: ReachB,
    /// Click-position plausibility.
    pub hitbox_a: HitboxA,
    /// Rotation quantization.
    pub aim_a: AimA,
    /// CPS ceiling.
    pub autoclicker_a: AutoclickerA,
    /// Interval consistency.
    pub autoclicker_b: AutoclickerB,
    /// Distribution shape.
    pub autoclicker_c: AutoclickerC,
    /// Sequence structure.
    pub autoclicker_d: AutoclickerD,
    /// Horizontal divergence.
    pub speed_a: SpeedA,
    /// Vertical divergence.
    pub flight_a: FlightA,
    /// Knockback response.
    pub velocity_a: VelocityA,
    /// Inside-solid-geometry probe.
    pub phase_a: PhaseA,
    /// Packet cadence balance.
    pub timer_a: TimerA,
    /// Frame monotonicity.
    pub bad_packet_a: BadPacketA,
    /// Self attack.
    pub bad_packet_b: BadPacketB,
    /// Creative-action gating.
    pub bad_packet_c: BadPacketC,
    /// Hotbar slot bounds.
    pub bad_packet_d: BadPacketD,
    /// Move vector bounds.
    pub bad_packet_e: BadPacketE,
    /// Block face bounds.
    pub bad_packet_f: BadPacketF,
    /// Title-id cross-check.
    pub edition_faker_a: EditionFakerA,
    /// Input-mode plausibility.
    pub edition_faker_b: EditionFakerB,
    /// Scaffold click position.
    pub scaffold_a: ScaffoldA,
    /// Break-rate ceiling.
    pub nuker_a: NukerA,
}

impl DetectorSet {
    /// Builds every detector from config and validates each one's
    /// thresholds, so a broken config is rejected before the player exists.
    pub fn new(config: &WardenConfig) -> Result<Self, RegistryError> {
        let set = Self {
            killaura_a: KillauraA::new(&config.combat),
            reach_a: ReachA::new(&config.combat),
            reach_b: ReachB::new(&config.combat),
            hitbox_a: HitboxA::new(&config.combat),
            aim_a: AimA::new(&config.combat),
            autoclicker_a: AutoclickerA::new(&config.clicks),
            autoclicker_b: AutoclickerB::new(&config.clicks),
            autoclicker_c: AutoclickerC::new(&config.clicks),
            autoclicker_d: AutoclickerD::new(&config.clicks),
            speed_a: SpeedA::new(&config.movement),
            flight_a: FlightA::new(&config.movement),
            velocity_a: VelocityA::new(&config.movement),
            phase_a: PhaseA::new(),
            timer_a: TimerA::new(&config.movement),
            bad_packet_a: BadPacketA::new(),
            bad_packet_b: BadPacketB::new(),
            bad_packet_c: BadPacketC::new(),
            bad_packet_d: BadPacketD::new(),
            bad_packet_e: BadPacketE::new(),
            bad_packet_f: BadPacketF::new(),
            edition_faker_a: EditionFakerA::new(),
            edition_faker_b: EditionFakerB::new(),
            scaffold_a: ScaffoldA::new(&config.world),
            nuker_a: NukerA::new(&config.world),
        };
        set.try_for_each_ref(|d| d.state().validate(d.name()))?;
        Ok(set)
    }

    /// Visits every detector immutably.
    pub fn for_each_ref(&self, mut f: impl FnMut(&dyn Detection)) {
        let _ = self.try_for_each_ref(|d| {
            f(d);
            Ok::<(), std::convert::Infallible>(())
        });
    }

    fn try_for_each_ref<E>(
        &self,
        mut f: impl FnMut(&dyn Detection) -> Result<(), E>,
    ) -> Result<(), E> {
        f(&self.killaura_a)?;
        f(&self.reach_a)?;
        f(&self.reach_b)?;
        f(&self.hitbox_a)?;
        f(&self.aim_a)?;
        f(&self.autoclicker_a)?;
        f(&self.autoclicker_b)?;
        f(&self.autoclicker_c)?;
        f(&self.autoclicker_d)?;
        f(&self.speed_a)?;
        f(&self.flight_a)?;
        f(&self.velocity_a)?;
        f(&self.phase_a)?;
        f(&self.timer_a)?;
        f(&self.bad_packet_a)?;
        f(&self.bad_packet_b)?;
        f(&self.bad_packet_c)?;
        f(&self.bad_packet_d)?;
        f(&self.bad_packet_e)?;
        f(&self.bad_packet_f)?;
        f(&self.edition_faker_a)?;
        f(&self.edition_faker_b)?;
        f(&self.scaffold_a)?;
        f(&self.nuker_a)
    }

    /// Visits every detector mutably, for the per-tick fan-out.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut dyn Detection)) {
        f(&mut self.killaura_a);
        f(&mut self.reach_a);
        f(&mut self.reach_b);
        f(&mut self.hitbox_a);
        f(&mut self.aim_a);
        f(&mut self.autoclicker_a);
        f(&mut self.autoclicker_b);
        f(&mut self.autoclicker_c);
        f(&mut self.autoclicker_d);
        f(&mut self.speed_a);
        f(&mut self.flight_a);
        f(&mut self.velocity_a);
        f(&mut self.phase_a);
        f(&mut self.timer_a);
        f(&mut self.bad_packet_a);
        f(&mut self.bad_packet_b);
        f(&mut self.bad_packet_c);
        f(&mut self.bad_packet_d);
        f(&mut self.bad_packet_e);
        f(&mut self.bad_packet_f);
        f(&mut self.edition_faker_a);
        f(&mut self.edition_faker_b);
        f(&mut self.scaffold_a);
        f(&mut self.nuker_a);
    }

    /// Point-in-time view of every detector.
    #[must_use]
    pub fn snapshots(&self) -> Vec<DetectionSnapshot> {
        let mut out = Vec::new();
        self.for_each_ref(|d| {
            let state = d.state();
            out.push(DetectionSnapshot {
                name: d.name(),
                kind: d.kind(),
                violations: state.violations,
                max_violations: state.max_violations,
                buffer: state.buffer,
                max_buffer: state.max_buffer,
                cancellable: d.is_cancellable(),
            });
        });
        out
    }
}

/// Result of an attack-packet validation.
#[derive(Debug, Clone, Copy)]
pub struct AttackVerdict {
    /// Whether the host should drop the hit.
    pub cancelled: bool,
    /// The detector that asked for the cancellation, if any.
    pub reason: Option<&'static str>,
}

/// Owns all players and routes host events to their detectors.
pub struct DetectionManager {
    config: WardenConfig,
    sink: Box<dyn NotificationSink>,
    players: FxHashMap<u64, Mutex<Player>>,
    current_tick: u64,
}

impl DetectionManager {
    /// Creates a manager with the given config and violation sink.
    #[must_use]
    pub fn new(config: WardenConfig, sink: Box<dyn NotificationSink>) -> Self {
        Self {
            config,
            sink,
            players: FxHashMap::default(),
            current_tick: 0,
        }
    }

    /// Current server tick as the manager counts it.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Registers a joining player and runs the join-time session checks.
    pub fn add_player(
        &mut self,
        entity_id: u64,
        name: String,
        session: SessionInfo,
        spawn: Vector3<f64>,
    ) -> Result<(), RegistryError> {
        let detections = DetectorSet::new(&self.config)?;
        let correction = CorrectionHandler::new(
            self.config.movement.correction_threshold,
            self.config.movement.correction_cooldown,
        );
        let mut player = Player::new(entity_id, name, session, spawn, correction, detections);
        log::debug!("tracking player {} ({})", player.name, entity_id);

        let mut ctx = DetectionCtx {
            tick: self.current_tick,
            player_name: &player.name,
            sink: self.sink.as_ref(),
            cancellation: &mut player.cancellation,
        };
        player
            .detections
            .edition_faker_a
            .on_join(&mut ctx, &player.session);
        player
            .detections
            .edition_faker_b
            .on_input_mode(&mut ctx, &player.session);

        self.players.insert(entity_id, Mutex::new(player));
        Ok(())
    }

    /// Forgets a leaving player. Returns whether it was tracked.
    pub fn remove_player(&mut self, entity_id: u64) -> bool {
        self.players.remove(&entity_id).is_some()
    }

    /// Processes one decoded movement/input packet.
    pub fn handle_input(&self, entity_id: u64, input: &InputSnapshot, world: &dyn WorldQuery) {
        let Some(slot) = self.players.get(&entity_id) else {
            return;
        };
        let player = &mut *slot.lock();
        let mut ctx = DetectionCtx {
            tick: self.current_tick,
            player_name: &player.name,
            sink: self.sink.as_ref(),
            cancellation: &mut player.cancellation,
        };

        let frame_ok = player.detections.bad_packet_a.check_frame(
            &mut ctx,
            input.simulation_frame,
            player.movement.last_simulation_frame,
        );
        if frame_ok {
            player.movement.last_simulation_frame = input.simulation_frame;
        }
        player
            .detections
            .bad_packet_e
            .check_move_vector(&mut ctx, input.move_vector);

        player.movement.apply_input(input);

        // A swing that hit nothing still resets the swing clock.
        if input.missed_swing {
            player.combat.on_swing(self.current_tick);
        }

        player
            .detections
            .aim_a
            .on_input(&mut ctx, &player.movement, player.session.input_mode);
        player
            .detections
            .phase_a
            .on_input(&mut ctx, &player.movement, world);
    }

    /// Records an arm swing.
    pub fn handle_swing(&self, entity_id: u64) {
        if let Some(slot) = self.players.get(&entity_id) {
            slot.lock().combat.on_swing(self.current_tick);
        }
    }

    /// Validates one attack packet against the combat detectors. The click
    /// position is the precise point the client claims to have hit, when the
    /// protocol carries it.
    pub fn handle_attack(
        &self,
        entity_id: u64,
        target_id: u64,
        click_position: Option<Vector3<f64>>,
        entities: &dyn EntityQuery,
        effects: &dyn EffectQuery,
    ) -> AttackVerdict {
        let Some(slot) = self.players.get(&entity_id) else {
            return AttackVerdict {
                cancelled: false,
                reason: None,
            };
        };
        let player = &mut *slot.lock();
        let tick = self.current_tick;

        player.clicks.on_click(ClickButton::Left, tick);

        let mut ctx = DetectionCtx {
            tick,
            player_name: &player.name,
            sink: self.sink.as_ref(),
            cancellation: &mut player.cancellation,
        };

        let left = &player.clicks.left;
        player.detections.autoclicker_b.on_click(&mut ctx, left);
        player.detections.autoclicker_c.on_click(&mut ctx, left);
        player.detections.autoclicker_d.on_click(&mut ctx, left);

        player
            .detections
            .bad_packet_b
            .check_attack(&mut ctx, entity_id, target_id);

        // Paintings, item frames and other non-living entities carry no
        // combat semantics; the clicks above were still counted.
        if !entities.is_living(target_id) {
            return AttackVerdict {
                cancelled: player.cancellation.is_cancelled(),
                reason: player.cancellation.reason(),
            };
        }

        // Duplicate hit packets for the same target in one tick carry no
        // new evidence.
        if player.combat.register_attack(target_id) {
            // Broadcast-time extents can lag a scale change; the host's
            // entity model is current at attack time.
            if let Some(extents) = entities.half_extents(target_id) {
                if let Some(target) = player.combat.tracker.get_mut(target_id) {
                    target.half_extents = extents;
                }
            }
            player
                .detections
                .killaura_a
                .on_attack(&mut ctx, &player.combat, effects);

            let mut reach = None;
            if let Some(target) = player.combat.tracker.get(target_id) {
                reach = player.detections.reach_a.on_attack(
                    &mut ctx,
                    &player.movement,
                    target,
                    player.session.input_mode,
                );
                player
                    .detections
                    .reach_b
                    .on_attack(&mut ctx, &player.movement, target);
                if let Some(click) = click_position {
                    player
                        .detections
                        .hitbox_a
                        .on_attack(&mut ctx, &click, target);
                }
            }
            if reach.is_some() {
                player.combat.last_reach_distance = reach;
            }
        }

        AttackVerdict {
            cancelled: player.cancellation.is_cancelled(),
            reason: player.cancellation.reason(),
        }
    }

    /// Records a use/right click.
    pub fn handle_use_click(&self, entity_id: u64) {
        if let Some(slot) = self.players.get(&entity_id) {
            slot.lock()
                .clicks
                .on_click(ClickButton::Right, self.current_tick);
        }
    }

    /// Validates a block placement.
    pub fn handle_block_place(
        &self,
        entity_id: u64,
        click_position: &Vector3<f64>,
        trigger: TriggerType,
        face: i32,
    ) -> bool {
        let Some(slot) = self.players.get(&entity_id) else {
            return true;
        };
        let player = &mut *slot.lock();
        let mut ctx = DetectionCtx {
            tick: self.current_tick,
            player_name: &player.name,
            sink: self.sink.as_ref(),
            cancellation: &mut player.cancellation,
        };
        player.detections.bad_packet_f.check_face(&mut ctx, face);
        player.detections.scaffold_a.on_place(
            &mut ctx,
            click_position,
            trigger,
            player.session.protocol_version,
        );
        !player.cancellation.is_cancelled()
    }

    /// Validates a block break.
    pub fn handle_block_break(&self, entity_id: u64) -> bool {
        let Some(slot) = self.players.get(&entity_id) else {
            return true;
        };
        let player = &mut *slot.lock();
        let mut ctx = DetectionCtx {
            tick: self.current_tick,
            player_name: &player.name,
            sink: self.sink.as_ref(),
            cancellation: &mut player.cancellation,
        };
        player
            .detections
            .nuker_a
            .on_break(&mut ctx, self.current_tick);
        !player.cancellation.is_cancelled()
    }

    /// Validates a creative-only action (item spawn, instabreak).
    pub fn handle_creative_action(&self, entity_id: u64) -> bool {
        let Some(slot) = self.players.get(&entity_id) else {
            return true;
        };
        let player = &mut *slot.lock();
        let mode = player.session.game_mode;
        let mut ctx = DetectionCtx {
            tick: self.current_tick,
            player_name: &player.name,
            sink: self.sink.as_ref(),
            cancellation: &mut player.cancellation,
        };
        player
            .detections
            .bad_packet_c
            .check_creative_action(&mut ctx, mode)
    }

    /// Validates a hotbar slot selection.
    pub fn handle_hotbar(&self, entity_id: u64, slot_index: i32) -> bool {
        let Some(slot) = self.players.get(&entity_id) else {
            return true;
        };
        let player = &mut *slot.lock();
        let mut ctx = DetectionCtx {
            tick: self.current_tick,
            player_name: &player.name,
            sink: self.sink.as_ref(),
            cancellation: &mut player.cancellation,
        };
        player
            .detections
            .bad_packet_d
            .check_slot(&mut ctx, slot_index)
    }

    /// Queues a server-initiated teleport and starts correction grace.
    pub fn handle_teleport(&self, entity_id: u64, target: Vector3<f64>) {
        if let Some(slot) = self.players.get(&entity_id) {
            let player = &mut *slot.lock();
            player.movement.teleport_to(target);
            player.correction.on_teleport();
        }
    }

    /// Mirrors host-granted abilities into the movement component. The
    /// simulation and the movement detectors gate themselves on these.
    pub fn handle_abilities(&self, entity_id: u64, abilities: PlayerAbilities) {
        if let Some(slot) = self.players.get(&entity_id) {
            let player = &mut *slot.lock();
            player.movement.flying = abilities.flying;
            player.movement.no_clip = abilities.no_clip;
            player.movement.immobile = abilities.immobile;
            player.movement.swimming = abilities.swimming;
        }
    }

    /// Queues a server teleport smoothed over `ticks` and starts correction
    /// grace.
    pub fn handle_teleport_smooth(&self, entity_id: u64, target: Vector3<f64>, ticks: u32) {
        if let Some(slot) = self.players.get(&entity_id) {
            let player = &mut *slot.lock();
            player.movement.teleport_smooth(target, ticks);
            player.correction.on_teleport();
        }
    }

    /// Grants firework glide boost for `ticks`.
    pub fn handle_glide_boost(&self, entity_id: u64, ticks: u32) {
        if let Some(slot) = self.players.get(&entity_id) {
            slot.lock().movement.boost_glide(ticks);
        }
    }

    /// Queues knockback for the player's next simulated tick.
    pub fn handle_knockback(&self, entity_id: u64, velocity: Vector3<f64>) {
        if let Some(slot) = self.players.get(&entity_id) {
            slot.lock().movement.apply_knockback(velocity);
        }
    }

    /// Client acknowledged a correction.
    pub fn handle_correction_ack(&self, entity_id: u64) {
        if let Some(slot) = self.players.get(&entity_id) {
            slot.lock().correction.on_correction_ack();
        }
    }

    /// Mirrors an entity spawn broadcast into the observer's tracker.
    pub fn entity_spawned(
        &self,
        observer_id: u64,
        entity_id: u64,
        position: Vector3<f64>,
        half_extents: Vector3<f64>,
        is_player: bool,
    ) {
        if let Some(slot) = self.players.get(&observer_id) {
            slot.lock()
                .combat
                .tracker
                .add_entity(entity_id, position, half_extents, is_player);
        }
    }

    /// Mirrors an entity move broadcast into the observer's tracker.
    pub fn entity_moved(
        &self,
        observer_id: u64,
        entity_id: u64,
        position: Vector3<f64>,
        was_teleport: bool,
    ) {
        if let Some(slot) = self.players.get(&observer_id) {
            slot.lock().combat.tracker.update_entity(
                entity_id,
                position,
                self.current_tick,
                was_teleport,
            );
        }
    }

    /// Mirrors an entity velocity broadcast into the observer's tracker.
    pub fn entity_velocity(&self, observer_id: u64, entity_id: u64, velocity: Vector3<f64>) {
        if let Some(slot) = self.players.get(&observer_id) {
            slot.lock()
                .combat
                .tracker
                .update_velocity(entity_id, velocity);
        }
    }

    /// Mirrors an entity despawn broadcast into the observer's tracker.
    pub fn entity_removed(&self, observer_id: u64, entity_id: u64) {
        if let Some(slot) = self.players.get(&observer_id) {
            slot.lock().combat.tracker.remove_entity(entity_id);
        }
    }

    /// Advances every player one server tick: clears per-tick state, runs
    /// the movement simulation, evaluates the tick-driven detectors and
    /// collects the corrections the host has to deliver.
    pub fn tick(&mut self, world: &dyn WorldQuery) -> Vec<(u64, CorrectionPayload)> {
        self.current_tick += 1;
        let tick = self.current_tick;
        let mut corrections = Vec::new();

        for (&entity_id, slot) in &self.players {
            let player = &mut *slot.lock();
            player.begin_tick();
            player.clicks.on_tick(tick);

            simulate(&mut player.movement, world);
            player.correction.on_tick();

            let cadence = player.movement.take_packet_cadence();
            let teleporting = player.movement.teleport.is_some();

            let mut ctx = DetectionCtx {
                tick,
                player_name: &player.name,
                sink: self.sink.as_ref(),
                cancellation: &mut player.cancellation,
            };

            player
                .detections
                .speed_a
                .on_tick_check(&mut ctx, &player.movement, &player.correction);
            player
                .detections
                .flight_a
                .on_tick_check(&mut ctx, &player.movement, &player.correction);
            player
                .detections
                .velocity_a
                .on_tick_check(&mut ctx, &player.movement);
            player
                .detections
                .timer_a
                .on_tick_check(&mut ctx, cadence, teleporting);
            player.detections.autoclicker_a.on_tick_check(
                &mut ctx,
                &player.clicks.left,
                ClickButton::Left,
            );
            player.detections.autoclicker_a.on_tick_check(
                &mut ctx,
                &player.clicks.right,
                ClickButton::Right,
            );

            player.detections.for_each_mut(|d| d.on_tick(tick));

            if player
                .correction
                .should_correct(&player.movement.auth.position, &player.movement.client.position)
            {
                log::debug!(
                    "{} diverged {:.3} blocks from the simulation",
                    player.name,
                    player.movement.divergence()
                );
                corrections.push((entity_id, player.correction.send_correction(&player.movement.auth)));
            }

            if tick % TRACKER_SWEEP_INTERVAL == 0 {
                player.combat.tracker.cleanup_stale(tick, TRACKER_MAX_AGE);
            }
        }
        corrections
    }

    /// Whether the player's current action was cancelled, and by what.
    #[must_use]
    pub fn cancellation(&self, entity_id: u64) -> Option<&'static str> {
        self.players
            .get(&entity_id)
            .and_then(|slot| slot.lock().cancellation.reason())
    }

    /// Snapshot of every detector for one player.
    #[must_use]
    pub fn snapshot(&self, entity_id: u64) -> Option<Vec<DetectionSnapshot>> {
        self.players
            .get(&entity_id)
            .map(|slot| slot.lock().detections.snapshots())
    }

    /// Authoritative position of one player, for host-side queries.
    #[must_use]
    pub fn authoritative_position(&self, entity_id: u64) -> Option<Vector3<f64>> {
        self.players
            .get(&entity_id)
            .map(|slot| slot.lock().movement.auth.position)
    }

    /// Number of tracked players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}
