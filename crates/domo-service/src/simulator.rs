//! Background measurement simulator.

use std::sync::Arc;

use rand::Rng;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

use domo_types::{Action, ThresholdConfig, Thresholds};

use crate::config::SimulationConfig;
use crate::state::AppState;

/// Background task that fabricates one measurement per tick and derives
/// the actuator decision from the configured threshold.
pub struct Simulator {
    state: Arc<AppState>,
}

impl Simulator {
    /// Create a new simulator.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Start the simulation loop.
    ///
    /// Returns immediately; simulation happens in the background. The loop
    /// runs until [`SimulatorState::request_stop`](crate::state::SimulatorState::request_stop)
    /// is called, at which point an in-flight tick completes and the
    /// returned handle resolves.
    pub fn start(&self) -> JoinHandle<()> {
        let config = &self.state.config.simulation;
        info!(
            "Starting simulator (sensor {}, every {}s, threshold {})",
            config.sensor_id, config.interval_secs, config.threshold
        );

        let state = Arc::clone(&self.state);
        tokio::spawn(run(state))
    }
}

/// The simulation loop.
async fn run(state: Arc<AppState>) {
    let config = state.config.simulation.clone();
    let thresholds = Thresholds::new(ThresholdConfig {
        threshold: config.threshold,
    });
    let mut stop_rx = state.simulator.subscribe_stop();
    state.simulator.set_running(true);

    let mut ticker = interval(config.interval());
    // A tick that outlasts the interval delays the next one; ticks never
    // overlap and timers never pile up.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut consecutive_failures = 0u32;

    loop {
        tokio::select! {
            _ = stop_rx.changed() => {
                if *stop_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {}
        }

        match tick(&state, &config, &thresholds).await {
            Ok(_) => {
                consecutive_failures = 0;
            }
            Err(e) => {
                consecutive_failures += 1;
                if consecutive_failures <= 3 {
                    warn!(
                        "Simulation tick failed: {} (attempt {})",
                        e, consecutive_failures
                    );
                } else if consecutive_failures == 4 {
                    error!(
                        "Simulation tick failed {} times in a row, will continue trying silently",
                        consecutive_failures
                    );
                }
                // Keep rescheduling - reduced freshness, never termination
            }
        }
        state.simulator.record_tick();
    }

    state.simulator.set_running(false);
    info!("Simulator stopped");
}

/// Execute one simulation tick: synthesize, persist, evaluate, log.
async fn tick(
    state: &AppState,
    config: &SimulationConfig,
    thresholds: &Thresholds,
) -> Result<Action, domo_store::Error> {
    let value = rand::rng().random_range(config.value_min..config.value_max);
    let now = OffsetDateTime::now_utc();

    {
        let store = state.store.lock().await;
        store.insert_measurement(config.sensor_id, value, now)?;
    }

    let action = thresholds.evaluate(value);
    info!(
        sensor_id = config.sensor_id,
        value,
        action = %action,
        "Simulated measurement"
    );
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use domo_store::Store;
    use std::time::Duration;
    use tokio::time::advance;

    fn test_state(interval_secs: u64) -> Arc<AppState> {
        let store = Store::open_in_memory().unwrap();
        let mut config = Config::default();
        config.simulation.interval_secs = interval_secs;
        AppState::new(store, config)
    }

    /// Let spawned tasks run until the next timer wait.
    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_interval() {
        let state = test_state(10);
        let handle = Simulator::new(Arc::clone(&state)).start();

        // First tick fires immediately, then one per interval
        settle().await;
        for _ in 0..3 {
            advance(Duration::from_secs(10)).await;
            settle().await;
        }

        let ticks = state.simulator.ticks();
        assert!((3..=5).contains(&ticks), "unexpected tick count {ticks}");
        assert_eq!(
            state.store.lock().await.count_measurements(None).unwrap(),
            ticks
        );

        state.simulator.request_stop();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_values_stay_in_range() {
        let state = test_state(10);
        let handle = Simulator::new(Arc::clone(&state)).start();

        settle().await;
        advance(Duration::from_secs(10)).await;
        settle().await;

        state.simulator.request_stop();
        handle.await.unwrap();

        let store = state.store.lock().await;
        let measurements = store.recent(10).unwrap();
        assert!(!measurements.is_empty());
        for m in &measurements {
            assert_eq!(m.sensor_id, 1);
            assert!((20.0..35.0).contains(&m.value), "value {} out of range", m.value);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_graceful() {
        let state = test_state(10);
        let handle = Simulator::new(Arc::clone(&state)).start();

        settle().await;
        assert!(state.simulator.is_running());

        state.simulator.request_stop();
        handle.await.unwrap();
        assert!(!state.simulator.is_running());

        // No further ticks after stop
        let before = state.simulator.ticks();
        advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(state.simulator.ticks(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_tick_does_not_stop_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");
        let store = Store::open(&path).unwrap();
        let mut config = Config::default();
        config.simulation.interval_secs = 10;
        let state = AppState::new(store, config);

        // Another writer holds the write lock across the first tick, so the
        // insert exhausts its retries and the tick is skipped.
        let blocker = rusqlite::Connection::open(&path).unwrap();
        blocker.execute_batch("BEGIN IMMEDIATE").unwrap();

        let handle = Simulator::new(Arc::clone(&state)).start();
        settle().await;

        assert!(state.simulator.ticks() >= 1);
        assert_eq!(state.store.lock().await.count_measurements(None).unwrap(), 0);

        blocker.execute_batch("ROLLBACK").unwrap();
        advance(Duration::from_secs(10)).await;
        settle().await;

        assert!(state.store.lock().await.count_measurements(None).unwrap() >= 1);
        assert!(state.simulator.ticks() >= 2);

        state.simulator.request_stop();
        handle.await.unwrap();
    }
}
