//! Simulated progress indicator.
//!
//! A timer-driven state machine (`Idle -> Ticking -> Completing -> Idle`)
//! publishing a 0-100 progress value and invoking a completion callback once
//! per run. The timer task is owned by the simulator instance; dropping the
//! simulator or calling [`ProgressSimulator::cancel`] stops it.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use sketchify_core::constants::{
    COMPLETION_DELAY_MS, PROGRESS_COMPLETE, PROGRESS_INTERVAL_MS, PROGRESS_STEP,
};
use sketchify_core::Config;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSettings {
    pub interval: Duration,
    pub step: u8,
    pub completion_delay: Duration,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(PROGRESS_INTERVAL_MS),
            step: PROGRESS_STEP,
            completion_delay: Duration::from_millis(COMPLETION_DELAY_MS),
        }
    }
}

impl ProgressSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.progress_interval(),
            step: config.progress_step,
            completion_delay: config.completion_delay(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Idle,
    Ticking,
    Completing,
}

#[derive(Debug)]
struct RunState {
    phase: ProgressPhase,
    /// Bumped on every start and cancel; a timer task only acts while its
    /// generation is still current.
    generation: u64,
}

pub struct ProgressSimulator {
    settings: ProgressSettings,
    run: Arc<Mutex<RunState>>,
    progress: Arc<watch::Sender<u8>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ProgressSimulator {
    pub fn new(settings: ProgressSettings) -> Self {
        let (progress, _) = watch::channel(0u8);
        Self {
            settings,
            run: Arc::new(Mutex::new(RunState {
                phase: ProgressPhase::Idle,
                generation: 0,
            })),
            progress: Arc::new(progress),
            task: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> ProgressSettings {
        self.settings
    }

    /// Current progress value in `0..=100`.
    pub fn progress(&self) -> u8 {
        *self.progress.borrow()
    }

    pub fn phase(&self) -> ProgressPhase {
        lock(&self.run).phase
    }

    /// Receiver that observes every published progress value.
    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    /// Start a new run from 0. Any run already in flight is cancelled first,
    /// so its `on_done` is never invoked.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<F>(&self, on_done: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.progress.send_replace(0);

        let generation = {
            let mut run = lock(&self.run);
            run.generation += 1;
            run.phase = ProgressPhase::Ticking;
            run.generation
        };

        let settings = self.settings;
        let run = Arc::clone(&self.run);
        let progress = Arc::clone(&self.progress);

        let handle = tokio::spawn(async move {
            let step = settings.step.max(1);
            let period = settings.interval.max(Duration::from_millis(1));
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut current = 0u8;
            while current < PROGRESS_COMPLETE {
                ticker.tick().await;
                current = current.saturating_add(step).min(PROGRESS_COMPLETE);

                if !is_current(&run, generation) {
                    return;
                }
                progress.send_replace(current);
            }

            {
                let mut state = lock(&run);
                if state.generation != generation {
                    return;
                }
                state.phase = ProgressPhase::Completing;
            }

            sleep(settings.completion_delay).await;

            {
                let mut state = lock(&run);
                if state.generation != generation {
                    return;
                }
                state.phase = ProgressPhase::Idle;
            }

            tracing::debug!(generation, "Progress run completed");
            on_done();
        });

        *lock(&self.task) = Some(handle);
    }

    /// Stop the current run; its `on_done` will not be invoked. Idempotent.
    pub fn cancel(&self) {
        {
            let mut run = lock(&self.run);
            if run.phase != ProgressPhase::Idle {
                tracing::debug!(generation = run.generation, phase = ?run.phase, "Progress run cancelled");
            }
            run.generation += 1;
            run.phase = ProgressPhase::Idle;
        }

        if let Some(handle) = lock(&self.task).take() {
            handle.abort();
        }
    }

    /// Cancel and publish 0, ready for a new attempt.
    pub fn reset(&self) {
        self.cancel();
        self.progress.send_replace(0);
    }
}

impl Default for ProgressSimulator {
    fn default() -> Self {
        Self::new(ProgressSettings::default())
    }
}

impl Drop for ProgressSimulator {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn is_current(run: &Mutex<RunState>, generation: u64) -> bool {
    lock(run).generation == generation
}

// A poisoned lock only means another holder panicked; the state itself is
// plain data and stays usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_to_exactly_one_hundred_then_completes() {
        let simulator = ProgressSimulator::default();
        let (done, on_done) = counter();

        simulator.start(on_done);
        assert_eq!(simulator.phase(), ProgressPhase::Ticking);
        assert_eq!(simulator.progress(), 0);

        // Sample halfway between ticks.
        sleep(ms(50)).await;
        let mut seen = Vec::new();
        for _ in 0..7 {
            sleep(ms(100)).await;
            seen.push(simulator.progress());
        }
        assert_eq!(seen, vec![15, 30, 45, 60, 75, 90, 100]);
        assert_eq!(simulator.phase(), ProgressPhase::Completing);
        assert_eq!(done.load(Ordering::SeqCst), 0);

        // t = 1250ms: still inside the completion delay.
        sleep(ms(500)).await;
        assert_eq!(done.load(Ordering::SeqCst), 0);

        sleep(ms(100)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert_eq!(simulator.phase(), ProgressPhase::Idle);
        assert_eq!(simulator.progress(), 100);

        sleep(ms(5_000)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn last_step_is_clamped() {
        let simulator = ProgressSimulator::new(ProgressSettings {
            step: 40,
            ..ProgressSettings::default()
        });
        let (done, on_done) = counter();
        simulator.start(on_done);
        let mut rx = simulator.subscribe();

        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let value = *rx.borrow_and_update();
            seen.push(value);
            if value == 100 {
                break;
            }
        }
        assert_eq!(seen, vec![40, 80, 100]);

        sleep(ms(700)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_while_ticking_suppresses_completion() {
        let simulator = ProgressSimulator::default();
        let (done, on_done) = counter();
        simulator.start(on_done);

        sleep(ms(350)).await;
        assert_eq!(simulator.progress(), 45);
        simulator.cancel();
        assert_eq!(simulator.phase(), ProgressPhase::Idle);

        sleep(ms(5_000)).await;
        assert_eq!(simulator.progress(), 45);
        assert_eq!(done.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_while_completing_suppresses_completion() {
        let simulator = ProgressSimulator::default();
        let (done, on_done) = counter();
        simulator.start(on_done);

        sleep(ms(900)).await;
        assert_eq!(simulator.phase(), ProgressPhase::Completing);
        simulator.cancel();

        sleep(ms(5_000)).await;
        assert_eq!(done.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent_when_idle() {
        let simulator = ProgressSimulator::default();
        simulator.cancel();
        simulator.cancel();
        assert_eq!(simulator.phase(), ProgressPhase::Idle);
        assert_eq!(simulator.progress(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_supersedes_previous_run() {
        let simulator = ProgressSimulator::default();
        let (first, first_done) = counter();
        let (second, second_done) = counter();

        simulator.start(first_done);
        sleep(ms(450)).await;
        assert_eq!(simulator.progress(), 60);

        simulator.start(second_done);
        assert_eq!(simulator.progress(), 0);

        sleep(ms(5_000)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_timer() {
        let (done, on_done) = counter();
        {
            let simulator = ProgressSimulator::default();
            simulator.start(on_done);
            sleep(ms(150)).await;
        }
        sleep(ms(5_000)).await;
        assert_eq!(done.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_publishes_zero() {
        let simulator = ProgressSimulator::default();
        let (_, on_done) = counter();
        simulator.start(on_done);
        sleep(ms(250)).await;
        assert_eq!(simulator.progress(), 30);
        simulator.reset();
        assert_eq!(simulator.progress(), 0);
    }
}
