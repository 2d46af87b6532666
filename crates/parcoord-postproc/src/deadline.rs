use std::time::{Duration, SystemTime};

/// Snapshot of a repair job used to judge the repair time limit.
#[derive(Debug, Clone, Copy)]
pub struct RepairClock {
    pub now: SystemTime,
    /// When the current stage began.
    pub stage_time: SystemTime,
    /// When post-processing of the collection began.
    pub start_time: SystemTime,
    /// Stage progress in permille.
    pub stage_progress: u32,
}

/// Grace period before the first estimate is trusted.
pub fn estimation_grace(limit_minutes: u32) -> Duration {
    if limit_minutes > 5 {
        Duration::from_secs(5 * 60)
    } else {
        Duration::from_secs(60)
    }
}

/// Returns the projected total repair time when it exceeds `limit_minutes`.
///
/// A limit of zero disables the check. The projection extrapolates linearly
/// from the time elapsed since `start_time` and only kicks in once the stage
/// has run for longer than [`estimation_grace`].
pub fn repair_overrun(limit_minutes: u32, clock: &RepairClock) -> Option<Duration> {
    if limit_minutes == 0 {
        return None;
    }
    let in_stage = clock.now.duration_since(clock.stage_time).unwrap_or_default();
    if in_stage <= estimation_grace(limit_minutes) {
        return None;
    }
    let elapsed = clock.now.duration_since(clock.start_time).unwrap_or_default();
    let estimated = elapsed.as_secs() * 1000 / u64::from(clock.stage_progress.max(1));
    (estimated > u64::from(limit_minutes) * 60).then(|| Duration::from_secs(estimated))
}
