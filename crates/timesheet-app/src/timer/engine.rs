use std::sync::{Arc, Mutex};

use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, interval_at};

use timesheet_core::{models::EntryDraft, timer::ElapsedCounter};

use super::events::TimerEvent;

#[derive(Debug, thiserror::Error)]
pub enum TimerEngineError {
    #[error("Timer is not running")]
    NotRunning,
}

pub type Result<T> = std::result::Result<T, TimerEngineError>;

/// Entry form timer. At most one tick task exists at any time.
pub struct TimerEngine {
    counter: Arc<RwLock<ElapsedCounter>>,
    event_tx: broadcast::Sender<TimerEvent>,
    tick_task: Mutex<Option<JoinHandle<()>>>,
    tick_interval: Duration,
}

impl TimerEngine {
    pub fn new() -> Self {
        Self::with_interval(Duration::from_secs(1))
    }

    pub fn with_interval(tick_interval: Duration) -> Self {
        let (event_tx, _) = broadcast::channel(1000);
        Self {
            counter: Arc::new(RwLock::new(ElapsedCounter::new())),
            event_tx,
            tick_task: Mutex::new(None),
            tick_interval,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    /// Start from zero, replacing any running tick task.
    pub async fn start(&self) {
        self.cancel_tick_task().await;

        self.counter.write().await.start();
        let _ = self.event_tx.send(TimerEvent::started());
        tracing::info!("Timer started");

        let counter = self.counter.clone();
        let event_tx = self.event_tx.clone();
        let period = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;

                let (elapsed, hours) = {
                    let mut counter = counter.write().await;
                    if !counter.tick() {
                        break;
                    }
                    (counter.elapsed_seconds(), counter.hours())
                };

                tracing::debug!("Timer tick: {} s", elapsed);
                let _ = event_tx.send(TimerEvent::tick(elapsed, hours));
            }
        });

        if let Some(previous) = self.tick_slot().replace(handle) {
            previous.abort();
        }
    }

    /// Stop counting and return the final reading in seconds.
    pub async fn stop(&self) -> Result<u64> {
        if !self.is_running().await {
            return Err(TimerEngineError::NotRunning);
        }

        self.cancel_tick_task().await;

        let (elapsed, hours) = {
            let mut counter = self.counter.write().await;
            counter.stop();
            (counter.elapsed_seconds(), counter.hours())
        };

        let _ = self.event_tx.send(TimerEvent::stopped(elapsed, hours));
        tracing::info!("Timer stopped at {} s ({} h)", elapsed, hours);
        Ok(elapsed)
    }

    pub async fn is_running(&self) -> bool {
        self.counter.read().await.is_running()
    }

    pub async fn elapsed_seconds(&self) -> u64 {
        self.counter.read().await.elapsed_seconds()
    }

    pub async fn hours(&self) -> f64 {
        self.counter.read().await.hours()
    }

    pub async fn display(&self) -> String {
        self.counter.read().await.display()
    }

    /// Copy the current hours reading into an entry form.
    pub async fn to_draft_hours(&self, draft: EntryDraft) -> EntryDraft {
        draft.with_hours(self.hours().await)
    }

    fn tick_slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.tick_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Abort the tick task and wait until it is gone.
    async fn cancel_tick_task(&self) {
        let handle = self.tick_slot().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        if let Some(handle) = self.tick_slot().take() {
            handle.abort();
        }
    }
}
