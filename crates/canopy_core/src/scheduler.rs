//! Activity scheduler
//!
//! Runs time-bounded [`Activity`] tasks from a single repeating frame timer.
//! Each tick captures the time once, then visits the active activities in
//! registration order:
//!
//! - start time still in the future: kept, untouched
//! - first eligible tick: `started` is called
//! - `step(elapsed)` returning [`ActivityStep::Continue`] keeps the activity,
//!   [`ActivityStep::Done`] calls `finished` and drops it
//!
//! Activities scheduled from inside a hook are buffered and join the active set
//! once the tick's iteration is over. The frame timer runs exactly while the
//! active set is non-empty.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use canopy_core::{ActivityScheduler, ActivityStep, FnActivity, ManualClock, Scene};
//!
//! let clock = ManualClock::new();
//! let mut scene = Scene::with_scheduler(ActivityScheduler::new().with_clock(clock.clone()));
//!
//! scene.schedule(FnActivity::new(|_, elapsed| {
//!     Ok(if elapsed >= Duration::from_millis(100) {
//!         ActivityStep::Done
//!     } else {
//!         ActivityStep::Continue
//!     })
//! }));
//! assert!(scene.scheduler().is_timer_running());
//!
//! clock.advance(Duration::from_millis(100));
//! assert!(!scene.tick().unwrap());
//! assert!(!scene.scheduler().is_timer_running());
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::error::{Result, SceneError};
use crate::scene::Scene;

/// Default interval between scheduler ticks
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// Activity
// ============================================================================

/// Outcome of one activity step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityStep {
    /// More work remains; step again next tick
    Continue,
    /// Finished; `finished` runs and the activity is dropped
    Done,
}

/// A time-bounded task driven by the scheduler
///
/// Hooks receive the scene mutably. An error from any hook aborts the current
/// tick and is returned to the caller of [`Scene::tick`].
pub trait Activity {
    /// Called once, on the first tick at or after the start time
    fn started(&mut self, _scene: &mut Scene) -> Result<()> {
        Ok(())
    }

    /// Advance with the time elapsed since the start time
    fn step(&mut self, scene: &mut Scene, elapsed: Duration) -> Result<ActivityStep>;

    /// Called once after `step` reports [`ActivityStep::Done`]
    fn finished(&mut self, _scene: &mut Scene) -> Result<()> {
        Ok(())
    }
}

type StartedHook = Box<dyn FnMut(&mut Scene) -> Result<()>>;
type StepHook = Box<dyn FnMut(&mut Scene, Duration) -> Result<ActivityStep>>;
type FinishedHook = Box<dyn FnMut(&mut Scene) -> Result<()>>;

/// An activity assembled from closures
pub struct FnActivity {
    started: Option<StartedHook>,
    step: StepHook,
    finished: Option<FinishedHook>,
}

impl FnActivity {
    pub fn new<F>(step: F) -> Self
    where
        F: FnMut(&mut Scene, Duration) -> Result<ActivityStep> + 'static,
    {
        Self {
            started: None,
            step: Box::new(step),
            finished: None,
        }
    }

    pub fn on_started<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut Scene) -> Result<()> + 'static,
    {
        self.started = Some(Box::new(hook));
        self
    }

    pub fn on_finished<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut Scene) -> Result<()> + 'static,
    {
        self.finished = Some(Box::new(hook));
        self
    }
}

impl Activity for FnActivity {
    fn started(&mut self, scene: &mut Scene) -> Result<()> {
        match self.started.as_mut() {
            Some(hook) => hook(scene),
            None => Ok(()),
        }
    }

    fn step(&mut self, scene: &mut Scene, elapsed: Duration) -> Result<ActivityStep> {
        (self.step)(scene, elapsed)
    }

    fn finished(&mut self, scene: &mut Scene) -> Result<()> {
        match self.finished.as_mut() {
            Some(hook) => hook(scene),
            None => Ok(()),
        }
    }
}

/// Unique identifier for a scheduled activity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActivityId(u64);

impl ActivityId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

// ============================================================================
// Clock and frame timer
// ============================================================================

/// Source of the current time
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to; clones share the same time
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, now: Instant) {
        self.now.set(now);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// The host's repeating timer that calls [`Scene::tick`]
pub trait FrameTimer {
    fn start(&mut self, interval: Duration);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// A timer that only records whether it should be running
///
/// Hosts with their own frame loop poll [`ActivityScheduler::is_timer_running`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ManualTimer {
    running: bool,
    starts: usize,
}

impl ManualTimer {
    /// How many times the timer has been started
    pub fn starts(&self) -> usize {
        self.starts
    }
}

impl FrameTimer for ManualTimer {
    fn start(&mut self, _interval: Duration) {
        self.running = true;
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

// ============================================================================
// Scheduler
// ============================================================================

struct ScheduledActivity {
    id: ActivityId,
    start: Instant,
    stepping: bool,
    activity: Box<dyn Activity>,
}

/// Registry of active activities, owned by a [`Scene`]
pub struct ActivityScheduler {
    active: Vec<ScheduledActivity>,
    pending: Vec<ScheduledActivity>,
    in_flight: FxHashSet<ActivityId>,
    cancelled: FxHashSet<ActivityId>,
    ticking: bool,
    next_id: u64,
    frame_interval: Duration,
    clock: Rc<dyn Clock>,
    timer: Box<dyn FrameTimer>,
}

impl Default for ActivityScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityScheduler {
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            pending: Vec::new(),
            in_flight: FxHashSet::default(),
            cancelled: FxHashSet::default(),
            ticking: false,
            next_id: 1,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            clock: Rc::new(SystemClock),
            timer: Box::new(ManualTimer::default()),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Rc::new(clock);
        self
    }

    pub fn with_timer(mut self, timer: impl FrameTimer + 'static) -> Self {
        self.timer = Box::new(timer);
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Number of live activities, including ones scheduled mid-tick
    pub fn len(&self) -> usize {
        self.active.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: ActivityId) -> bool {
        if self.cancelled.contains(&id) {
            return false;
        }
        self.in_flight.contains(&id)
            || self
                .active
                .iter()
                .chain(self.pending.iter())
                .any(|entry| entry.id == id)
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Whether a tick is in progress
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    fn schedule_at(&mut self, activity: Box<dyn Activity>, start: Instant) -> ActivityId {
        let id = ActivityId(self.next_id);
        self.next_id += 1;
        let entry = ScheduledActivity {
            id,
            start,
            stepping: false,
            activity,
        };
        if self.ticking {
            self.pending.push(entry);
        } else {
            self.active.push(entry);
            self.sync_timer();
        }
        debug!("scheduled activity {:?}", id);
        id
    }

    /// Remove an activity without calling `finished`
    fn cancel(&mut self, id: ActivityId) -> bool {
        if let Some(index) = self.active.iter().position(|entry| entry.id == id) {
            self.active.remove(index);
        } else if let Some(index) = self.pending.iter().position(|entry| entry.id == id) {
            self.pending.remove(index);
        } else if self.in_flight.remove(&id) {
            // Out for the current tick; dropped when the tick hands it back.
            self.cancelled.insert(id);
            return true;
        } else {
            return false;
        }
        if !self.ticking {
            self.sync_timer();
        }
        true
    }

    fn begin_tick(&mut self) -> Vec<ScheduledActivity> {
        self.ticking = true;
        self.in_flight = self.active.iter().map(|entry| entry.id).collect();
        std::mem::take(&mut self.active)
    }

    fn end_tick(&mut self, kept: Vec<ScheduledActivity>) {
        self.ticking = false;
        self.in_flight.clear();
        let cancelled = std::mem::take(&mut self.cancelled);
        self.active = kept;
        self.active.append(&mut self.pending);
        if !cancelled.is_empty() {
            self.active.retain(|entry| !cancelled.contains(&entry.id));
        }
        self.sync_timer();
    }

    fn sync_timer(&mut self) {
        let running = self.timer.is_running();
        if self.active.is_empty() && running {
            self.timer.stop();
            debug!("activity timer stopped");
        } else if !self.active.is_empty() && !running {
            self.timer.start(self.frame_interval);
            debug!("activity timer started ({:?})", self.frame_interval);
        }
    }
}

impl fmt::Debug for ActivityScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityScheduler")
            .field("active", &self.active.len())
            .field("pending", &self.pending.len())
            .field("ticking", &self.ticking)
            .field("frame_interval", &self.frame_interval)
            .field("timer_running", &self.timer.is_running())
            .finish()
    }
}

// ============================================================================
// Scene integration
// ============================================================================

impl Scene {
    /// Schedule an activity starting now
    pub fn schedule(&mut self, activity: impl Activity + 'static) -> ActivityId {
        let now = self.scheduler.now();
        self.scheduler.schedule_at(Box::new(activity), now)
    }

    /// Schedule an activity with an explicit start time
    pub fn schedule_at(&mut self, activity: impl Activity + 'static, start: Instant) -> ActivityId {
        self.scheduler.schedule_at(Box::new(activity), start)
    }

    /// Remove an activity without calling `finished`
    ///
    /// Returns whether the activity was still live.
    pub fn cancel(&mut self, id: ActivityId) -> bool {
        self.scheduler.cancel(id)
    }

    /// Run one tick at the scheduler clock's current time
    ///
    /// Returns whether any activity is still live afterwards.
    pub fn tick(&mut self) -> Result<bool> {
        let now = self.scheduler.now();
        self.tick_at(now)
    }

    /// Run one tick as if the time were `now`
    ///
    /// On a hook error the failing activity is dropped without `finished`,
    /// activities not yet visited keep their place, and the error is returned.
    /// Ticking again from inside an activity hook is rejected.
    pub fn tick_at(&mut self, now: Instant) -> Result<bool> {
        if self.scheduler.ticking {
            warn!("nested tick rejected");
            return Err(SceneError::invalid(
                "cannot tick the scheduler from inside an activity hook",
            ));
        }
        let entries = self.scheduler.begin_tick();
        let mut kept = Vec::with_capacity(entries.len());
        let mut outcome = Ok(());

        let mut remaining = entries.into_iter();
        for mut entry in remaining.by_ref() {
            if self.scheduler.cancelled.contains(&entry.id) {
                continue;
            }
            match self.run_entry(&mut entry, now) {
                Ok(ActivityStep::Continue) => kept.push(entry),
                Ok(ActivityStep::Done) => {
                    self.scheduler.in_flight.remove(&entry.id);
                    debug!("activity {:?} finished", entry.id);
                }
                Err(err) => {
                    self.scheduler.in_flight.remove(&entry.id);
                    warn!("activity {:?} failed: {}", entry.id, err);
                    outcome = Err(err);
                    break;
                }
            }
        }
        kept.extend(remaining);

        self.scheduler.end_tick(kept);
        outcome.map(|()| !self.scheduler.is_empty())
    }

    fn run_entry(&mut self, entry: &mut ScheduledActivity, now: Instant) -> Result<ActivityStep> {
        if entry.start > now {
            return Ok(ActivityStep::Continue);
        }
        if !entry.stepping {
            entry.stepping = true;
            entry.activity.started(self)?;
        }
        let step = entry
            .activity
            .step(self, now.saturating_duration_since(entry.start))?;
        if step == ActivityStep::Done {
            entry.activity.finished(self)?;
        }
        Ok(step)
    }
}
