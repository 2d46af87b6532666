use std::time::{Duration, SystemTime};

use tokio::sync::watch;

/// Tick of the pause loop; bounds how late a resume or stop is noticed.
pub const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Process-wide "post-processing paused" flag.
///
/// Toggled by the operator; engine callbacks block on it while it is set.
/// Other parts of the daemon follow changes through [`PostPauseSignal::subscribe`].
#[derive(Debug)]
pub struct PostPauseSignal {
    paused_tx: watch::Sender<bool>,
}

impl PostPauseSignal {
    pub fn new(paused: bool) -> Self {
        let (paused_tx, _) = watch::channel(paused);
        Self { paused_tx }
    }

    pub fn set_paused(&self, paused: bool) {
        let changed = self.paused_tx.send_if_modified(|current| {
            let changed = *current != paused;
            *current = paused;
            changed
        });
        if changed {
            tracing::info!(paused, "post-processing pause changed");
        }
    }

    pub fn is_paused(&self) -> bool {
        *self.paused_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.paused_tx.subscribe()
    }
}

impl Default for PostPauseSignal {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Job timestamps frozen at the moment a pause began.
///
/// Re-applying them shifted by the pause length keeps elapsed-time figures
/// free of paused time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrozenTimes {
    pub stage_time: Option<SystemTime>,
    pub start_time: Option<SystemTime>,
    pub par_time: Option<SystemTime>,
    pub repair_time: Option<SystemTime>,
}

impl FrozenTimes {
    pub fn shifted(&self, delta: Duration) -> Self {
        Self {
            stage_time: self.stage_time.map(|t| t + delta),
            start_time: self.start_time.map(|t| t + delta),
            par_time: self.par_time.map(|t| t + delta),
            repair_time: self.repair_time.map(|t| t + delta),
        }
    }
}
