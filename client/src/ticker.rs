//! Periodic re-evaluation of a stream's progress.
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::progress::{progress, Phase, Progress, Schedule};

/// Default re-evaluation period.
pub const TICK: Duration = Duration::from_secs(1);

/// Source of the current time, in Unix seconds.
pub trait Clock: Send + Sync + 'static {
    /// Current time.
    fn now(&self) -> u64;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    }
}

/// Recurring task publishing the progress of one stream.
///
/// The task is owned by the ticker: it is aborted when the ticker is stopped
/// or dropped. It also ends on its own once the stream reaches a terminal
/// phase, since progress cannot change after that.
#[derive(Debug)]
pub struct ProgressTicker {
    receiver: watch::Receiver<Progress>,
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// Spawns a ticker re-evaluating `schedule` every `period`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<C: Clock>(
        schedule: Schedule,
        clock: C,
        period: Duration,
    ) -> Self {
        let initial = progress(&schedule, clock.now());
        let (sender, receiver) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let current = progress(&schedule, clock.now());
                let terminal = matches!(
                    current.phase(),
                    Phase::Completed | Phase::Cancelled
                );
                if sender.send(current).is_err() || terminal {
                    break;
                }
            }
        });

        Self { receiver, handle }
    }

    /// Most recently published progress.
    pub fn current(&self) -> Progress {
        *self.receiver.borrow()
    }

    /// A receiver notified on every published progress.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.receiver.clone()
    }

    /// Whether the task has ended.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stops the task.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
