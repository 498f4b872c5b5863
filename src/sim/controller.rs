//! Drop cycle controller
//!
//! Tracks one fruit from the dropper to the pile:
//!
//! ```text
//! Holding --(valid drag release)--> Released --(touches floor/fruit)--> Settled
//!    ^                                                                     |
//!    +---------------------- spawn from queue front -----------------------+
//! ```
//!
//! The queue advances when a fruit is released: the released kind leaves the
//! front and one new pick joins the back, so the front is always the next fruit
//! to spawn and the length never changes.

use glam::Vec3;

use super::collision;
use super::queue::{FruitKind, FruitQueue, KindPicker, UniformPicker};
use super::state::{ActivePiece, DragSession, DropEvent, PieceState, Session};
use super::world::{BodyHandle, OverlapQuery, Spawner};
use crate::error::DropError;
use crate::settings::DropperConfig;
use crate::smooth_toward;

/// Owns the active fruit, the fruit queue and the drag gesture
#[derive(Debug)]
pub struct DropController<W, P = UniformPicker> {
    config: DropperConfig,
    world: W,
    picker: P,
    queue: FruitQueue,
    /// Dropper position
    x: f32,
    active: Option<ActivePiece>,
    drag: Option<DragSession>,
    last_release: Option<f64>,
    events: Vec<DropEvent>,
}

impl<W: Spawner + OverlapQuery, P: KindPicker> DropController<W, P> {
    /// Build a controller with a freshly picked queue of `config.queue_len` fruits
    pub fn new(config: DropperConfig, world: W, mut picker: P) -> Result<Self, DropError> {
        config.validate()?;
        let queue = FruitQueue::filled(config.queue_len, &mut picker);
        Ok(Self::assemble(config, world, picker, queue))
    }

    /// Build a controller around an existing queue
    pub fn with_queue(
        config: DropperConfig,
        world: W,
        picker: P,
        queue: FruitQueue,
    ) -> Result<Self, DropError> {
        config.validate()?;
        Ok(Self::assemble(config, world, picker, queue))
    }

    fn assemble(config: DropperConfig, world: W, picker: P, queue: FruitQueue) -> Self {
        let x = config.clamp_x(0.0);
        Self {
            config,
            world,
            picker,
            queue,
            x,
            active: None,
            drag: None,
            last_release: None,
            events: Vec::new(),
        }
    }

    /// Put the first fruit on the dropper
    pub fn start(&mut self, session: &mut Session) -> Result<BodyHandle, DropError> {
        let handle = self.spawn_next()?;
        self.refresh_preview(session);
        log::info!(
            "Drop cycle started: queue={:?}",
            self.queue.iter().collect::<Vec<_>>()
        );
        Ok(handle)
    }

    // === Accessors ===

    pub fn config(&self) -> &DropperConfig {
        &self.config
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn queue(&self) -> &FruitQueue {
        &self.queue
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    /// Dropper position
    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn last_release(&self) -> Option<f64> {
        self.last_release
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<DropEvent> {
        std::mem::take(&mut self.events)
    }

    /// Replace the queue, e.g. after an empty-queue spawn failure.
    /// Does not spawn; call `spawn_next` once a fruit should appear.
    pub fn reset_queue(&mut self, queue: FruitQueue) {
        self.queue = queue;
    }

    // === Operations ===

    /// Ease the dropper toward `target_x` and clamp it to the travel limits.
    ///
    /// Returns the new position. Frozen sessions leave everything untouched.
    pub fn update_position(&mut self, session: &Session, target_x: f32, dt: f32) -> f32 {
        if session.is_frozen() {
            return self.x;
        }

        let target = if target_x.is_finite() { target_x } else { self.x };
        let eased = smooth_toward(self.x, target, self.config.move_speed, dt);
        self.x = self.config.clamp_x(eased);

        if let Some(piece) = self.active.as_mut() {
            if piece.state == PieceState::Holding {
                piece.x = self.x;
                self.world.move_held(piece.handle, piece.position());
            }
        }
        self.x
    }

    /// Press/touch start. Ignored if a drag is already running.
    pub fn begin_drag(&mut self, timestamp: f64) {
        if self.drag.is_none() {
            self.drag = Some(DragSession {
                started_at: timestamp,
            });
        }
    }

    /// Pointer lost: forget the gesture without dropping
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Press/touch end. Drops the held fruit when the gesture was long enough,
    /// the session is ready and the release cooldown has passed.
    ///
    /// Returns whether a fruit was released. A `false` is not an error: short
    /// taps and rapid repeats are simply swallowed.
    pub fn end_drag(&mut self, session: &mut Session, timestamp: f64) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        if session.is_frozen() {
            return false;
        }

        // Durations are configured in f32; compare at that precision
        let held_for = drag.elapsed(timestamp) as f32;
        if held_for < self.config.min_drag_duration {
            log::debug!("Drop ignored: drag lasted {:.3}s", held_for);
            return false;
        }
        if !session.ready_to_drop {
            log::debug!("Drop ignored: previous fruit still falling");
            return false;
        }
        if !self.cooldown_elapsed(timestamp) {
            log::debug!("Drop ignored: within {:.2}s cooldown", self.config.drop_delay);
            return false;
        }

        self.release(session, timestamp)
    }

    fn cooldown_elapsed(&self, timestamp: f64) -> bool {
        self.last_release
            .is_none_or(|last| (timestamp - last) as f32 >= self.config.drop_delay)
    }

    /// Hand the held fruit to physics and advance the queue
    fn release(&mut self, session: &mut Session, timestamp: f64) -> bool {
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        if piece.state != PieceState::Holding {
            return false;
        }
        if self.queue.is_empty() {
            log::error!("{}", DropError::EmptyQueue);
            return false;
        }

        self.world.release(piece.handle);
        piece.state = PieceState::Released;
        let (kind, handle, x) = (piece.kind, piece.handle, piece.x);

        session.ready_to_drop = false;
        self.last_release = Some(timestamp);
        self.queue.advance(&mut self.picker);

        log::debug!("Released {:?} at x={:.2}", kind, x);
        self.events.push(DropEvent::Released { kind, handle, x });
        true
    }

    /// Check whether the released fruit has landed; if so, put the next one on
    /// the dropper. Returns whether the fruit settled this call.
    pub fn poll_settle(&mut self, session: &mut Session) -> bool {
        if session.is_frozen() {
            return false;
        }
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        if piece.state != PieceState::Released {
            return false;
        }
        let Some(bounds) = self.world.bounds(piece.handle) else {
            return false;
        };

        let contacts = self.world.overlapping(&bounds);
        if !collision::settles(piece.handle, &contacts) {
            return false;
        }

        piece.state = PieceState::Settled;
        let (kind, handle) = (piece.kind, piece.handle);
        self.active = None;
        log::debug!("{:?} settled", kind);
        self.events.push(DropEvent::Settled { kind, handle });

        session.ready_to_drop = true;
        if let Err(e) = self.spawn_next() {
            log::error!("Next fruit not spawned: {}", e);
        }
        self.refresh_preview(session);
        true
    }

    /// Spawn the queue front onto the dropper
    pub fn spawn_next(&mut self) -> Result<BodyHandle, DropError> {
        if self.active.is_some() {
            return Err(DropError::PieceAlreadyActive);
        }
        let Some(kind) = self.queue.front() else {
            log::error!("{}", DropError::EmptyQueue);
            self.events.push(DropEvent::SpawnFailed);
            return Err(DropError::EmptyQueue);
        };

        let pos = Vec3::new(self.x, self.config.dropper_y, self.config.fruit_z);
        let handle = self.world.spawn(kind, pos);
        self.active = Some(ActivePiece::held(kind, handle, pos));
        self.events.push(DropEvent::Spawned { kind, handle });
        Ok(handle)
    }

    /// Next-fruit display shows the kind after the one on the dropper
    fn refresh_preview(&self, session: &mut Session) {
        session.next_preview = self.upcoming();
    }

    /// Kind that will follow the held fruit
    pub fn upcoming(&self) -> Option<FruitKind> {
        match self.active {
            Some(piece) if piece.state == PieceState::Holding => self.queue.get(1),
            _ => self.queue.front(),
        }
    }
}

impl<W: Spawner + OverlapQuery> DropController<W, UniformPicker> {
    /// Build a controller whose queue picks uniformly from `config.spawn_kinds`
    pub fn seeded(config: DropperConfig, world: W, seed: u64) -> Result<Self, DropError> {
        config.validate()?;
        let picker = UniformPicker::new(&config.spawn_kinds, seed);
        Self::new(config, world, picker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::sandbox::SandboxWorld;
    use crate::sim::queue::FruitKind::*;
    use proptest::prelude::*;

    /// Always appends the same kind
    struct Fixed(FruitKind);

    impl KindPicker for Fixed {
        fn pick(&mut self) -> FruitKind {
            self.0
        }
    }

    fn floored_world() -> SandboxWorld {
        let mut world = SandboxWorld::default();
        world.add_floor(0.0, -4.0, 4.0);
        world
    }

    fn started(kinds: &[FruitKind]) -> (DropController<SandboxWorld, Fixed>, Session) {
        let mut controller = DropController::with_queue(
            DropperConfig::default(),
            floored_world(),
            Fixed(Melon),
            FruitQueue::from_kinds(kinds.iter().copied()),
        )
        .unwrap();
        let mut session = Session::new();
        controller.start(&mut session).unwrap();
        (controller, session)
    }

    fn queue_of<W: Spawner + OverlapQuery, P: KindPicker>(
        controller: &DropController<W, P>,
    ) -> Vec<FruitKind> {
        controller.queue().iter().collect()
    }

    /// Step the world until the released fruit settles
    fn settle(controller: &mut DropController<SandboxWorld, Fixed>, session: &mut Session) {
        for _ in 0..600 {
            controller.world_mut().step(SIM_DT);
            if controller.poll_settle(session) {
                return;
            }
        }
        panic!("fruit never settled");
    }

    fn drag(
        controller: &mut DropController<SandboxWorld, Fixed>,
        session: &mut Session,
        from: f64,
        to: f64,
    ) -> bool {
        controller.begin_drag(from);
        controller.end_drag(session, to)
    }

    #[test]
    fn test_start_holds_queue_front() {
        let (controller, session) = started(&[Cherry, Grape, Apple]);
        let piece = controller.active().unwrap();
        assert_eq!(piece.kind, Cherry);
        assert_eq!(piece.state, PieceState::Holding);
        assert_eq!(queue_of(&controller), vec![Cherry, Grape, Apple]);
        assert_eq!(session.next_preview, Some(Grape));
        assert!(session.ready_to_drop);
    }

    #[test]
    fn test_end_to_end_drop_cycle() {
        let (mut controller, mut session) = started(&[Cherry, Grape, Apple]);
        controller.drain_events();

        assert!(drag(&mut controller, &mut session, 0.0, 0.2));
        assert_eq!(queue_of(&controller), vec![Grape, Apple, Melon]);
        assert!(!session.ready_to_drop);
        assert_eq!(controller.active().unwrap().state, PieceState::Released);

        settle(&mut controller, &mut session);
        let piece = controller.active().unwrap();
        assert_eq!(piece.kind, Grape);
        assert_eq!(piece.state, PieceState::Holding);
        assert!(session.ready_to_drop);
        assert_eq!(queue_of(&controller), vec![Grape, Apple, Melon]);
        assert_eq!(session.next_preview, Some(Apple));

        let events = controller.drain_events();
        assert!(matches!(events[0], DropEvent::Released { kind: Cherry, .. }));
        assert!(matches!(events[1], DropEvent::Settled { kind: Cherry, .. }));
        assert!(matches!(events[2], DropEvent::Spawned { kind: Grape, .. }));
    }

    #[test]
    fn test_short_drag_does_not_drop() {
        let (mut controller, mut session) = started(&[Cherry, Grape, Apple]);
        assert!(!drag(&mut controller, &mut session, 1.0, 1.05));
        assert!(session.ready_to_drop);
        assert_eq!(controller.active().unwrap().state, PieceState::Holding);
        assert_eq!(controller.last_release(), None);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_zero_length_drag_does_not_drop() {
        let (mut controller, mut session) = started(&[Cherry, Grape, Apple]);
        assert!(!drag(&mut controller, &mut session, 2.0, 2.0));
        assert_eq!(controller.active().unwrap().state, PieceState::Holding);
    }

    #[test]
    fn test_not_ready_blocks_drop() {
        let (mut controller, mut session) = started(&[Cherry, Grape, Apple]);
        session.ready_to_drop = false;
        assert!(!drag(&mut controller, &mut session, 0.0, 0.5));
        assert_eq!(controller.active().unwrap().state, PieceState::Holding);
    }

    #[test]
    fn test_second_release_while_falling_is_ignored() {
        let (mut controller, mut session) = started(&[Cherry, Grape, Apple]);
        assert!(drag(&mut controller, &mut session, 0.0, 0.2));
        assert!(!drag(&mut controller, &mut session, 0.3, 0.6));
        assert_eq!(queue_of(&controller), vec![Grape, Apple, Melon]);
    }

    #[test]
    fn test_cooldown_blocks_quick_second_drop() {
        let (mut controller, mut session) = started(&[Cherry, Grape, Apple]);
        assert!(drag(&mut controller, &mut session, 0.0, 0.1));
        settle(&mut controller, &mut session);
        assert!(session.ready_to_drop);

        // 0.15s after the first release
        assert!(!drag(&mut controller, &mut session, 0.12, 0.25));
        assert_eq!(controller.active().unwrap().state, PieceState::Holding);
        assert_eq!(controller.last_release(), Some(0.1));

        assert!(drag(&mut controller, &mut session, 0.3, 0.45));
        assert_eq!(controller.last_release(), Some(0.45));
    }

    #[test]
    fn test_begin_drag_twice_keeps_first_start() {
        let (mut controller, mut session) = started(&[Cherry, Grape, Apple]);
        controller.begin_drag(0.0);
        controller.begin_drag(0.09);
        assert!(controller.end_drag(&mut session, 0.1));
    }

    #[test]
    fn test_cancelled_drag_has_no_effect() {
        let (mut controller, mut session) = started(&[Cherry, Grape, Apple]);
        controller.begin_drag(0.0);
        controller.cancel_drag();
        assert!(!controller.end_drag(&mut session, 1.0));
        assert_eq!(controller.active().unwrap().state, PieceState::Holding);
        assert_eq!(queue_of(&controller), vec![Cherry, Grape, Apple]);
    }

    #[test]
    fn test_end_drag_while_paused_does_nothing() {
        let (mut controller, mut session) = started(&[Cherry, Grape, Apple]);
        controller.begin_drag(0.0);
        session.pause();
        assert!(!controller.end_drag(&mut session, 1.0));
        assert!(!controller.is_dragging());
        assert!(session.ready_to_drop);
    }

    #[test]
    fn test_self_overlap_never_settles() {
        // No floor: the only thing the fruit ever overlaps is itself
        let mut controller = DropController::with_queue(
            DropperConfig::default(),
            SandboxWorld::default(),
            Fixed(Melon),
            FruitQueue::from_kinds([Cherry, Grape]),
        )
        .unwrap();
        let mut session = Session::new();
        controller.start(&mut session).unwrap();
        controller.begin_drag(0.0);
        assert!(controller.end_drag(&mut session, 0.5));

        for _ in 0..120 {
            controller.world_mut().step(SIM_DT);
            assert!(!controller.poll_settle(&mut session));
        }
        assert_eq!(controller.active().unwrap().state, PieceState::Released);
        assert!(!session.ready_to_drop);
    }

    #[test]
    fn test_settle_waits_while_frozen() {
        let (mut controller, mut session) = started(&[Cherry, Grape, Apple]);
        assert!(drag(&mut controller, &mut session, 0.0, 0.2));
        for _ in 0..600 {
            controller.world_mut().step(SIM_DT);
        }

        session.pause();
        assert!(!controller.poll_settle(&mut session));
        assert_eq!(controller.active().unwrap().kind, Cherry);

        session.resume();
        assert!(controller.poll_settle(&mut session));
        assert_eq!(controller.active().unwrap().kind, Grape);
    }

    #[test]
    fn test_poll_settle_while_holding_is_noop() {
        let (mut controller, mut session) = started(&[Cherry, Grape, Apple]);
        assert!(!controller.poll_settle(&mut session));
        assert_eq!(controller.active().unwrap().state, PieceState::Holding);
    }

    #[test]
    fn test_update_position_follows_and_clamps() {
        let (mut controller, session) = started(&[Cherry, Grape, Apple]);
        let x = controller.update_position(&session, 2.0, SIM_DT);
        assert!(x > 0.0 && x < 2.0);

        // Held fruit rides along
        let handle = controller.active().unwrap().handle;
        let center = controller.world().bounds(handle).unwrap().center();
        assert!((center.x - x).abs() < 1e-5);

        for _ in 0..600 {
            controller.update_position(&session, 100.0, SIM_DT);
        }
        assert_eq!(controller.x(), controller.config().max_x);
    }

    #[test]
    fn test_update_position_frozen_is_noop() {
        let (mut controller, mut session) = started(&[Cherry, Grape, Apple]);
        session.mark_lost();
        assert_eq!(controller.update_position(&session, 2.0, 1.0), 0.0);
        assert_eq!(controller.active().unwrap().x, 0.0);
    }

    #[test]
    fn test_update_position_ignores_nan_target() {
        let (mut controller, session) = started(&[Cherry, Grape, Apple]);
        assert_eq!(controller.update_position(&session, f32::NAN, 1.0), 0.0);
    }

    #[test]
    fn test_released_fruit_does_not_follow_dropper() {
        let (mut controller, mut session) = started(&[Cherry, Grape, Apple]);
        assert!(drag(&mut controller, &mut session, 0.0, 0.2));
        controller.update_position(&session, 3.0, 1.0);
        let piece = controller.active().unwrap();
        assert_eq!(piece.x, 0.0);
        let center = controller.world().bounds(piece.handle).unwrap().center();
        assert_eq!(center.x, 0.0);
    }

    #[test]
    fn test_spawn_with_empty_queue_fails() {
        let mut controller = DropController::with_queue(
            DropperConfig::default(),
            floored_world(),
            Fixed(Melon),
            FruitQueue::default(),
        )
        .unwrap();
        let mut session = Session::new();

        let err = controller.start(&mut session).unwrap_err();
        assert!(matches!(err, DropError::EmptyQueue));
        assert!(controller.active().is_none());
        assert_eq!(controller.drain_events(), vec![DropEvent::SpawnFailed]);

        // Nothing staged: a valid-looking drag is silently ignored
        assert!(!drag(&mut controller, &mut session, 0.0, 0.5));
        assert!(session.ready_to_drop);

        // Fixed externally
        controller.reset_queue(FruitQueue::from_kinds([Peach]));
        controller.spawn_next().unwrap();
        assert_eq!(controller.active().unwrap().kind, Peach);
    }

    #[test]
    fn test_spawn_while_active_is_rejected() {
        let (mut controller, _session) = started(&[Cherry, Grape, Apple]);
        assert!(matches!(
            controller.spawn_next(),
            Err(DropError::PieceAlreadyActive)
        ));
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = DropperConfig {
            queue_len: 0,
            ..Default::default()
        };
        let result = DropController::new(config, SandboxWorld::default(), Fixed(Cherry));
        assert!(matches!(result, Err(DropError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_fills_queue_to_length() {
        let config = DropperConfig {
            queue_len: 5,
            ..Default::default()
        };
        let controller =
            DropController::new(config, SandboxWorld::default(), UniformPicker::new(&[Grape], 3))
                .unwrap();
        assert_eq!(queue_of(&controller), vec![Grape; 5]);
    }

    #[test]
    fn test_seeded_picks_from_spawn_kinds() {
        let config = DropperConfig {
            spawn_kinds: vec![Peach],
            ..Default::default()
        };
        let mut controller = DropController::seeded(config, floored_world(), 7).unwrap();
        let mut session = Session::new();
        controller.start(&mut session).unwrap();
        assert_eq!(queue_of(&controller), vec![Peach; 3]);

        controller.begin_drag(0.0);
        assert!(controller.end_drag(&mut session, 0.5));
        for _ in 0..600 {
            controller.world_mut().step(SIM_DT);
            if controller.poll_settle(&mut session) {
                break;
            }
        }
        assert!(session.ready_to_drop);
        assert_eq!(queue_of(&controller), vec![Peach; 3]);
        assert_eq!(controller.active().unwrap().kind, Peach);
    }

    #[test]
    fn test_seeded_rejects_empty_spawn_kinds() {
        let config = DropperConfig {
            spawn_kinds: Vec::new(),
            ..Default::default()
        };
        let result = DropController::seeded(config, SandboxWorld::default(), 7);
        assert!(matches!(result, Err(DropError::InvalidConfig(_))));
    }

    proptest! {
        #[test]
        fn prop_position_stays_in_bounds(
            steps in prop::collection::vec((-1.0e6f32..1.0e6, 0.0f32..10.0), 1..50)
        ) {
            let (mut controller, session) = started(&[Cherry, Grape, Apple]);
            let (min_x, max_x) = (controller.config().min_x, controller.config().max_x);
            for (target, dt) in steps {
                let x = controller.update_position(&session, target, dt);
                prop_assert!(x >= min_x && x <= max_x);
            }
        }

        #[test]
        fn prop_queue_length_is_invariant(seed in any::<u64>(), drops in 1usize..8) {
            let mut controller = DropController::new(
                DropperConfig::default(),
                floored_world(),
                UniformPicker::new(&FruitKind::DROPPABLE, seed),
            )
            .unwrap();
            let len = controller.queue().len();
            let mut session = Session::new();
            controller.start(&mut session).unwrap();

            let mut now = 0.0;
            for _ in 0..drops {
                controller.begin_drag(now);
                now += 0.5;
                prop_assert!(controller.end_drag(&mut session, now));
                prop_assert_eq!(controller.queue().len(), len);

                let mut settled = false;
                for _ in 0..600 {
                    controller.world_mut().step(SIM_DT);
                    if controller.poll_settle(&mut session) {
                        settled = true;
                        break;
                    }
                }
                prop_assert!(settled);
                prop_assert_eq!(controller.queue().len(), len);
            }
        }
    }
}
