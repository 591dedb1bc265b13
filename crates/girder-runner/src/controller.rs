use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use girder_engine::{GameEvent, InputError, KeyCode, Movement, World, WorldBuilder, WorldSnapshot};
use log::{error, info, warn};

use crate::config::LoopConfig;
use crate::debounce::JumpDebounce;
use crate::slots::{SaveError, SaveSlots};
use crate::timer::RepeatingTimer;

/// Everything a tick touches, behind one lock.
struct TickState {
    world: World,
    inputs: Receiver<Movement>,
    debounce: JumpDebounce,
}

impl TickState {
    /// Drain queued input in arrival order, then advance the world.
    fn tick(&mut self) {
        while let Ok(movement) = self.inputs.try_recv() {
            let world = &mut self.world;
            if movement == Movement::Jump {
                self.debounce.attempt(|| world.move_player(Movement::Jump));
            } else {
                world.move_player(movement);
            }
        }
        self.debounce.end_tick();
        self.world.update();
    }
}

fn lock(shared: &Mutex<TickState>) -> MutexGuard<'_, TickState> {
    // A panicking tick poisons the lock; the world is still consistent
    // between ticks, so keep going.
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Run `body` under the lock. A panic inside it is logged and the tick is
/// lost; the next call recovers the lock.
fn guarded(shared: &Mutex<TickState>, body: impl FnOnce(&mut TickState)) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&mut *lock(shared))));
    if outcome.is_err() {
        error!("tick panicked; skipping it");
    }
}

fn run_tick(shared: &Mutex<TickState>) {
    guarded(shared, TickState::tick);
}

/// Producer side of the input queue. Cheap to clone, never blocks.
#[derive(Clone)]
pub struct InputSender {
    tx: Sender<Movement>,
}

impl InputSender {
    /// Queue a movement for the next tick. Returns `false` once the
    /// controller is gone.
    pub fn send(&self, movement: Movement) -> bool {
        self.tx.send(movement).is_ok()
    }

    /// Map a raw key and queue it. Unmapped keys are an error.
    pub fn send_key(&self, key: KeyCode) -> Result<bool, InputError> {
        let movement = Movement::try_from(key)?;
        Ok(self.send(movement))
    }
}

/// Drives a [`World`] at a fixed delay on a background thread.
///
/// The controller starts paused. Ticks and queries share one lock, so a
/// query never sees a world halfway through a tick.
pub struct GameLoopController {
    shared: Arc<Mutex<TickState>>,
    input: InputSender,
    config: LoopConfig,
    timer: Option<RepeatingTimer>,
    stopped: bool,
}

impl GameLoopController {
    pub fn new(world: World, config: LoopConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let state = TickState {
            world,
            inputs: rx,
            debounce: JumpDebounce::new(config.jump_debounce_ticks),
        };
        Self {
            shared: Arc::new(Mutex::new(state)),
            input: InputSender { tx },
            config,
            timer: None,
            stopped: false,
        }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Start (or restart) ticking. No-op while running or after `stop`.
    pub fn resume(&mut self) -> io::Result<()> {
        if self.stopped || self.timer.is_some() {
            return Ok(());
        }
        let shared = Arc::clone(&self.shared);
        let timer = RepeatingTimer::start("girder-tick", self.config.period(), move || run_tick(&shared))?;
        self.timer = Some(timer);
        info!("game loop running every {} ms", self.config.period_ms);
        Ok(())
    }

    /// Stop scheduling ticks. Returns once any tick in progress has finished.
    pub fn pause(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
            info!("game loop paused");
        }
    }

    /// Pause for good. Idempotent.
    pub fn stop(&mut self) {
        self.pause();
        if !self.stopped {
            self.stopped = true;
            info!("game loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Run one tick on the calling thread. Only while paused.
    pub fn step(&self) -> bool {
        if self.is_running() || self.stopped {
            return false;
        }
        run_tick(&self.shared);
        true
    }

    pub fn input(&self) -> InputSender {
        self.input.clone()
    }

    pub fn send(&self, movement: Movement) -> bool {
        self.input.send(movement)
    }

    /// Read the world between ticks.
    pub fn with_world<R>(&self, f: impl FnOnce(&World) -> R) -> R {
        f(&lock(&self.shared).world)
    }

    /// Take the events of the latest tick.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        lock(&self.shared).world.current_events()
    }

    /// Write the current world to a save slot. Only while paused.
    pub fn save(&self, slots: &SaveSlots, index: usize) -> Result<(), SaveError> {
        if self.is_running() {
            return Err(SaveError::NotPaused);
        }
        let bytes = self.with_world(World::snapshot).encode()?;
        slots.write(index, &bytes)
    }

    /// Replace the world with the one stored in a save slot. Only while
    /// paused. On any failure the current world is left untouched.
    pub fn load(&self, slots: &SaveSlots, index: usize) -> Result<(), SaveError> {
        if self.is_running() {
            return Err(SaveError::NotPaused);
        }
        let bytes = slots.read(index)?;
        let snapshot = WorldSnapshot::decode(&bytes).map_err(|err| {
            warn!("slot {} is not a usable save: {}", index, err);
            SaveError::from(err)
        })?;

        let mut state = lock(&self.shared);
        let builder = WorldBuilder::new(state.world.config().clone());
        let world = builder.restore(&snapshot)?;
        state.world = world;
        while state.inputs.try_recv().is_ok() {}
        state.debounce.reset();
        info!("loaded slot {}", index);
        Ok(())
    }
}

impl Drop for GameLoopController {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread;
    use std::time::{Duration, Instant};

    use girder_engine::{EntityType, LevelRecord, ShapeKind};

    use super::*;

    fn shared_state() -> Arc<Mutex<TickState>> {
        let rect = |t, x, y, w, h| LevelRecord::new(t, ShapeKind::Rectangle, x, y, w, h);
        let (world, _) = WorldBuilder::default()
            .init_level(&[
                rect(EntityType::Platform, 4.0, 0.5, 8.0, 0.1),
                rect(EntityType::Player, 1.0, 0.7, 0.2, 0.3),
            ])
            .unwrap();
        let (_tx, rx) = mpsc::channel();
        Arc::new(Mutex::new(TickState {
            world,
            inputs: rx,
            debounce: JumpDebounce::new(2),
        }))
    }

    #[test]
    fn panicking_tick_is_dropped_and_lock_recovered() {
        let shared = shared_state();
        guarded(&shared, |state| {
            state.world.update();
            panic!("tick blew up");
        });
        assert!(shared.is_poisoned());

        run_tick(&shared);
        run_tick(&shared);
        // The tick that panicked had already advanced once before failing.
        assert_eq!(lock(&shared).world.tick(), 3);
    }

    #[test]
    fn timer_keeps_ticking_after_a_panic() {
        let shared = shared_state();
        let calls = Arc::new(AtomicU32::new(0));
        let task_shared = Arc::clone(&shared);
        let task_calls = Arc::clone(&calls);
        let mut timer = RepeatingTimer::start("girder-test-tick", Duration::from_millis(2), move || {
            if task_calls.fetch_add(1, Ordering::SeqCst) == 0 {
                guarded(&task_shared, |_| panic!("first tick fails"));
            } else {
                run_tick(&task_shared);
            }
        })
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while lock(&shared).world.tick() < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        timer.cancel();
        assert!(lock(&shared).world.tick() >= 3);
        assert!(calls.load(Ordering::SeqCst) >= 4);
    }
}
