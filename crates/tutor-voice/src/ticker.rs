//! Periodic progress polling.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default polling period, roughly one display frame.
pub const DEFAULT_TICK: Duration = Duration::from_millis(16);

/// A repeating task on the current tokio runtime.
///
/// The callback runs once per period until it returns
/// [`ControlFlow::Break`], the ticker is cancelled, or the ticker is dropped.
#[derive(Debug)]
pub struct Ticker {
    task: JoinHandle<()>,
}

impl Ticker {
    /// Spawn a ticker. Returns `None` outside a tokio runtime.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Option<Self>
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No tokio runtime available; progress polling disabled");
            return None;
        };

        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if on_tick().is_break() {
                    break;
                }
            }
        });
        Some(Self { task })
    }

    pub fn cancel(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
