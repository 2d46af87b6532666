//! Drives the single active par-check or par-rename job.
//!
//! Lock order: the download queue first, then the current-job slot. Engine
//! callbacks arrive on the engine's thread and take both locks briefly; the
//! pause loop holds neither while it sleeps.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use parcoord_config::Config;
use parcoord_core::models::{
    CompletedFileStatus, FileInfo, NzbInfo, ParStatus, PostStage, RenameStatus, UnpackStatus,
};
use parcoord_logging::LogLevel;
use parcoord_queue::{QueueGuard, SharedQueue};
use tokio_util::sync::CancellationToken;

use crate::blocks::{self, BlockRequest};
use crate::deadline::{RepairClock, repair_overrun};
use crate::error::CoordinatorError;
use crate::message::post_message;
use crate::pause::{FrozenTimes, PAUSE_POLL_INTERVAL, PostPauseSignal};
use crate::worker::{
    CompletedFileLookup, FileStatus, JobWorker, ParCheckHost, ParCheckJob, ParCheckStage,
    ParCheckStatus, ParChecker, ParRenameHost, ParRenameJob, ParRenameStatus, ParRenamer,
};

const STOP_TIMEOUT: Duration = Duration::from_secs(5);
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Which job, if any, currently owns the engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Idle,
    Repair { nzb_id: u32 },
    Rename { nzb_id: u32 },
}

#[derive(Debug)]
enum CurrentJob {
    Idle,
    Repairing(RepairJob),
    Renaming(RenameJob),
}

impl CurrentJob {
    fn kind(&self) -> JobKind {
        match self {
            Self::Idle => JobKind::Idle,
            Self::Repairing(job) => JobKind::Repair { nzb_id: job.nzb_id },
            Self::Renaming(job) => JobKind::Rename { nzb_id: job.nzb_id },
        }
    }
}

#[derive(Debug)]
struct RepairJob {
    nzb_id: u32,
    name: String,
    par_time: SystemTime,
    repair_time: Option<SystemTime>,
    /// Download seconds of the collection when the job started.
    download_sec: u64,
}

#[derive(Debug)]
struct RenameJob {
    nzb_id: u32,
    name: String,
}

/// Owner of the repair and rename engines.
///
/// At most one job runs at a time. Results are folded back into the queue by
/// the engines' completion callbacks.
pub struct ParCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    queue: Arc<SharedQueue>,
    par_quick: bool,
    par_time_limit: u32,
    pause: Arc<PostPauseSignal>,
    checker: Arc<dyn ParChecker>,
    renamer: Arc<dyn ParRenamer>,
    current: Mutex<CurrentJob>,
    shutdown: CancellationToken,
}

impl ParCoordinator {
    pub fn new(
        queue: Arc<SharedQueue>,
        config: &Config,
        pause: Arc<PostPauseSignal>,
        checker: Arc<dyn ParChecker>,
        renamer: Arc<dyn ParRenamer>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue,
                par_quick: config.par_quick,
                par_time_limit: config.par_time_limit,
                pause,
                checker,
                renamer,
                current: Mutex::new(CurrentJob::Idle),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn current_job(&self) -> JobKind {
        self.inner.lock_current().kind()
    }

    pub fn pause_signal(&self) -> &Arc<PostPauseSignal> {
        &self.inner.pause
    }

    /// Token cancelled by [`ParCoordinator::stop`]; callers may also cancel
    /// it to release a paused callback ahead of a full stop.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown.clone()
    }

    /// Launches par verification and repair for `nzb_id`.
    pub fn start_repair_job(
        &self,
        queue: &mut QueueGuard<'_>,
        nzb_id: u32,
    ) -> Result<(), CoordinatorError> {
        let mut current = self.inner.lock_current();
        if !matches!(*current, CurrentJob::Idle) {
            return Err(CoordinatorError::Busy {
                current: current.kind(),
            });
        }
        let nzb = queue
            .find_nzb_mut(nzb_id)
            .ok_or(CoordinatorError::UnknownNzb(nzb_id))?;
        let post = nzb
            .post_info
            .as_mut()
            .ok_or(CoordinatorError::NoPostInfo(nzb_id))?;

        let now = SystemTime::now();
        let job = ParCheckJob {
            nzb_id,
            nzb_name: nzb.name.clone(),
            dest_dir: nzb.dest_dir.clone(),
            par_quick: self.inner.par_quick && !post.force_par_full,
            force_repair: post.force_repair,
            par_time: now,
            download_sec: nzb.download_sec,
        };
        post.working = true;
        post.start_time.get_or_insert(now);

        let text = format!("Checking pars for {}", nzb.name);
        post_message(nzb, LogLevel::Info, text);
        *current = CurrentJob::Repairing(RepairJob {
            nzb_id,
            name: job.nzb_name.clone(),
            par_time: now,
            repair_time: None,
            download_sec: job.download_sec,
        });
        drop(current);

        let host = Arc::new(CheckHost {
            coordinator: Arc::downgrade(&self.inner),
            nzb_id,
        });
        self.inner.checker.configure(job, host);
        self.inner.checker.start();
        Ok(())
    }

    /// Launches detection of obfuscated or misnamed files for `nzb_id`.
    pub fn start_rename_job(
        &self,
        queue: &mut QueueGuard<'_>,
        nzb_id: u32,
    ) -> Result<(), CoordinatorError> {
        let mut current = self.inner.lock_current();
        if !matches!(*current, CurrentJob::Idle) {
            return Err(CoordinatorError::Busy {
                current: current.kind(),
            });
        }
        let nzb = queue
            .find_nzb_mut(nzb_id)
            .ok_or(CoordinatorError::UnknownNzb(nzb_id))?;
        let dest_dir = if nzb.unpack_status == UnpackStatus::Success {
            nzb.build_final_dir()
        } else {
            nzb.dest_dir.clone()
        };
        let job = ParRenameJob {
            nzb_id,
            nzb_name: nzb.name.clone(),
            dest_dir,
            detect_missing: nzb.unpack_status == UnpackStatus::None,
        };
        let post = nzb
            .post_info
            .as_mut()
            .ok_or(CoordinatorError::NoPostInfo(nzb_id))?;
        post.working = true;
        post.start_time.get_or_insert_with(SystemTime::now);

        let text = format!("Checking renamed files for {}", nzb.name);
        post_message(nzb, LogLevel::Info, text);
        *current = CurrentJob::Renaming(RenameJob {
            nzb_id,
            name: job.nzb_name.clone(),
        });
        drop(current);

        let host = Arc::new(RenameHost {
            coordinator: Arc::downgrade(&self.inner),
            nzb_id,
        });
        self.inner.renamer.configure(job, host);
        self.inner.renamer.start();
        Ok(())
    }

    /// Requests cancellation of the active job.
    ///
    /// Returns true only when this call issued the request; a second call, or
    /// a call while idle, returns false.
    pub fn cancel(&self) -> bool {
        let current = self.inner.lock_current();
        match &*current {
            CurrentJob::Repairing(job) if !self.inner.checker.is_cancelled() => {
                tracing::debug!(nzb_id = job.nzb_id, nzb = %job.name, "cancelling par-repair");
                self.inner.checker.cancel();
                true
            }
            CurrentJob::Renaming(job) if !self.inner.renamer.is_cancelled() => {
                tracing::debug!(nzb_id = job.nzb_id, nzb = %job.name, "cancelling par-rename");
                self.inner.renamer.cancel();
                true
            }
            _ => false,
        }
    }

    /// Shuts down: cancels the active job, releases a paused callback and waits
    /// for the engines to exit, killing any that outlive the timeout.
    ///
    /// Must not be called while holding the queue lock.
    pub fn stop(&self) {
        self.inner.shutdown.cancel();
        self.cancel();
        shutdown_worker(&*self.inner.checker, "par-check");
        shutdown_worker(&*self.inner.renamer, "par-rename");
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.is_stopped()
    }

    /// Routes a newly downloaded (or deleted) par file.
    ///
    /// A file of the collection under repair goes straight to the running
    /// engine and the call returns true. Anything else only tells the engine
    /// that the queue changed.
    pub fn add_par(&self, queue: &QueueGuard<'_>, file: &FileInfo, deleted: bool) -> bool {
        let same_collection = self.inner.checker.is_running()
            && self.current_job() == JobKind::Repair { nzb_id: file.nzb_id };
        match queue.find_nzb(file.nzb_id) {
            Some(nzb) if same_collection && !deleted => {
                self.inner
                    .checker
                    .add_par_file(nzb.dest_dir.join(&file.filename));
                true
            }
            _ => {
                self.inner.checker.queue_changed();
                false
            }
        }
    }

    /// Pauses par volumes of `nzb_id` not needed for the first verification.
    pub fn pause_pars(
        &self,
        queue: &mut QueueGuard<'_>,
        nzb_id: u32,
    ) -> Result<usize, CoordinatorError> {
        let nzb = queue
            .find_nzb_mut(nzb_id)
            .ok_or(CoordinatorError::UnknownNzb(nzb_id))?;
        Ok(blocks::pause_extra_pars(nzb))
    }
}

impl std::fmt::Debug for ParCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParCoordinator")
            .field("current", &self.current_job())
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

fn shutdown_worker<W: JobWorker + ?Sized>(worker: &W, what: &str) {
    if !worker.is_running() {
        return;
    }
    worker.stop();
    let deadline = Instant::now() + STOP_TIMEOUT;
    while worker.is_running() && Instant::now() < deadline {
        thread::sleep(STOP_POLL_INTERVAL);
    }
    if worker.is_running() {
        tracing::warn!(worker = what, "terminating {what} worker");
        worker.kill();
    }
}

impl Inner {
    fn lock_current(&self) -> MutexGuard<'_, CurrentJob> {
        self.current.lock().expect("current job lock")
    }

    fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn request_more_pars(&self, nzb_id: u32, par_filename: &str, blocks_needed: u32) -> BlockRequest {
        let mut queue = self.queue.lock();
        match queue.find_nzb_mut(nzb_id) {
            Some(nzb) => blocks::request_more_pars(nzb, par_filename, blocks_needed),
            None => BlockRequest::default(),
        }
    }

    fn print_message(&self, nzb_id: u32, kind: LogLevel, text: &str) {
        let mut queue = self.queue.lock();
        match queue.find_nzb_mut(nzb_id) {
            Some(nzb) => post_message(nzb, kind, text),
            None => tracing::warn!(nzb_id, "message for unknown collection: {text}"),
        }
    }

    fn register_parred_file(&self, nzb_id: u32, filename: &str) {
        let mut queue = self.queue.lock();
        if let Some(post) = queue
            .find_nzb_mut(nzb_id)
            .and_then(|nzb| nzb.post_info.as_mut())
            && !post
                .parred_files
                .iter()
                .any(|f| f.eq_ignore_ascii_case(filename))
        {
            post.parred_files.push(filename.to_string());
        }
    }

    fn is_parred_file(&self, nzb_id: u32, filename: &str) -> bool {
        let queue = self.queue.lock();
        queue
            .find_nzb(nzb_id)
            .and_then(|nzb| nzb.post_info.as_ref())
            .is_some_and(|post| {
                post.parred_files
                    .iter()
                    .any(|f| f.eq_ignore_ascii_case(filename))
            })
    }

    fn find_file_crc(&self, nzb_id: u32, filename: &str) -> Option<CompletedFileLookup> {
        let queue = self.queue.lock();
        queue
            .find_nzb(nzb_id)
            .and_then(|nzb| lookup_completed_file(nzb, filename))
    }

    fn register_renamed_file(&self, nzb_id: u32, old_name: &str, new_name: &str) {
        let mut queue = self.queue.lock();
        let Some(nzb) = queue.find_nzb_mut(nzb_id) else {
            return;
        };
        if let Some(completed) = nzb
            .completed_files
            .iter_mut()
            .find(|f| f.filename.eq_ignore_ascii_case(old_name))
        {
            tracing::debug!(nzb_id, old = old_name, new = new_name, "recorded renamed file");
            completed.filename = new_name.to_string();
        }
    }

    fn update_check_progress(&self, nzb_id: u32) {
        {
            let mut queue = self.queue.lock();
            let mut current = self.lock_current();
            let CurrentJob::Repairing(job) = &mut *current else {
                return;
            };
            if job.nzb_id != nzb_id {
                return;
            }
            let Some(nzb) = queue.find_nzb_mut(nzb_id) else {
                return;
            };
            let Some(post) = nzb.post_info.as_mut() else {
                return;
            };

            let progress = self.checker.progress();
            let stage = self.checker.stage();
            let now = SystemTime::now();

            if progress.file_progress == 0 {
                post.progress_label = progress.label;
            }
            post.file_progress = permille_to_fraction(progress.file_progress);
            let entered = post.enter_stage(stage.post_stage(), now);
            post.stage_progress = post
                .stage_progress
                .max(permille_to_fraction(progress.stage_progress));
            let clock = RepairClock {
                now,
                stage_time: post.stage_time.unwrap_or(now),
                start_time: post.start_time.unwrap_or(now),
                stage_progress: fraction_to_permille(post.stage_progress),
            };

            if entered {
                match stage {
                    ParCheckStage::Repairing => job.repair_time = Some(now),
                    ParCheckStage::VerifyingRepaired => {
                        if let Some(started) = job.repair_time {
                            nzb.repair_sec += now.duration_since(started).unwrap_or_default().as_secs();
                        }
                    }
                    _ => {}
                }
            }

            if stage == ParCheckStage::Repairing
                && !self.checker.is_cancelled()
                && let Some(estimated) = repair_overrun(self.par_time_limit, &clock)
            {
                let text = format!(
                    "Cancelling par-repair for {}, estimated repair time ({} minutes) exceeds allowed repair time",
                    job.name,
                    estimated.as_secs() / 60
                );
                post_message(nzb, LogLevel::Warning, text);
                self.checker.cancel();
            }
        }
        self.wait_while_paused(nzb_id);
    }

    fn update_rename_progress(&self, nzb_id: u32) {
        {
            let mut queue = self.queue.lock();
            if self.lock_current().kind() != (JobKind::Rename { nzb_id }) {
                return;
            }
            let Some(post) = queue
                .find_nzb_mut(nzb_id)
                .and_then(|nzb| nzb.post_info.as_mut())
            else {
                return;
            };
            let progress = self.renamer.progress();
            post.progress_label = progress.label;
            post.enter_stage(PostStage::Renaming, SystemTime::now());
            post.stage_progress = post
                .stage_progress
                .max(permille_to_fraction(progress.stage_progress));
        }
        self.wait_while_paused(nzb_id);
    }

    /// Blocks the calling engine thread while post-processing is paused,
    /// shifting the job's clocks so the pause does not count as work.
    fn wait_while_paused(&self, nzb_id: u32) {
        if !self.pause.is_paused() || self.is_stopped() {
            return;
        }
        let Some(frozen) = self.frozen_times(nzb_id) else {
            return;
        };
        tracing::debug!(nzb_id, "post-processing paused, holding job");
        let paused_at = Instant::now();
        loop {
            thread::sleep(PAUSE_POLL_INTERVAL);
            let forced = self.apply_frozen_times(nzb_id, frozen.shifted(paused_at.elapsed()));
            if !self.pause.is_paused() || forced || self.is_stopped() {
                break;
            }
        }
        tracing::debug!(nzb_id, paused_ms = paused_at.elapsed().as_millis() as u64, "job resumed");
    }

    /// `None` when the collection is gone or runs with forced priority.
    fn frozen_times(&self, nzb_id: u32) -> Option<FrozenTimes> {
        let queue = self.queue.lock();
        let current = self.lock_current();
        let nzb = queue.find_nzb(nzb_id)?;
        if nzb.force_priority {
            return None;
        }
        let post = nzb.post_info.as_ref()?;
        let mut frozen = FrozenTimes {
            stage_time: post.stage_time,
            start_time: post.start_time,
            ..FrozenTimes::default()
        };
        if let CurrentJob::Repairing(job) = &*current
            && job.nzb_id == nzb_id
        {
            frozen.par_time = Some(job.par_time);
            frozen.repair_time = job.repair_time;
        }
        Some(frozen)
    }

    /// Writes shifted clocks back; returns true when waiting should end
    /// because the collection gained forced priority or disappeared.
    fn apply_frozen_times(&self, nzb_id: u32, times: FrozenTimes) -> bool {
        let mut queue = self.queue.lock();
        let mut current = self.lock_current();
        let Some(nzb) = queue.find_nzb_mut(nzb_id) else {
            return true;
        };
        if let Some(post) = nzb.post_info.as_mut() {
            if times.stage_time.is_some() {
                post.stage_time = times.stage_time;
            }
            if times.start_time.is_some() {
                post.start_time = times.start_time;
            }
        }
        if let CurrentJob::Repairing(job) = &mut *current
            && job.nzb_id == nzb_id
        {
            if let Some(par_time) = times.par_time {
                job.par_time = par_time;
            }
            if times.repair_time.is_some() {
                job.repair_time = times.repair_time;
            }
        }
        nzb.force_priority
    }

    fn complete_repair(&self, nzb_id: u32) {
        let mut queue = self.queue.lock();
        let job = {
            let mut current = self.lock_current();
            match std::mem::replace(&mut *current, CurrentJob::Idle) {
                CurrentJob::Repairing(job) if job.nzb_id == nzb_id => job,
                other => {
                    *current = other;
                    tracing::warn!(nzb_id, "ignoring completion of a par-check that is not current");
                    return;
                }
            }
        };
        let status = self.checker.status();
        let par_full = self.checker.par_full();
        match queue.find_nzb_mut(nzb_id) {
            Some(nzb) => {
                record_repair_result(nzb, &job, status, par_full, SystemTime::now());
                tracing::info!(nzb_id, nzb = %job.name, ?status, par_status = ?nzb.par_status, "par-check finished");
            }
            None => tracing::warn!(nzb_id, nzb = %job.name, "collection left the queue during par-check"),
        }
        if let Err(err) = queue.save() {
            tracing::error!(nzb_id, error = %err, "failed to save queue after par-check");
        }
    }

    fn complete_rename(&self, nzb_id: u32) {
        let mut queue = self.queue.lock();
        let job = {
            let mut current = self.lock_current();
            match std::mem::replace(&mut *current, CurrentJob::Idle) {
                CurrentJob::Renaming(job) if job.nzb_id == nzb_id => job,
                other => {
                    *current = other;
                    tracing::warn!(nzb_id, "ignoring completion of a par-rename that is not current");
                    return;
                }
            }
        };
        let status = self.renamer.status();
        let missed_files = self.renamer.has_missed_files();
        match queue.find_nzb_mut(nzb_id) {
            Some(nzb) => record_rename_result(nzb, &job.name, status, missed_files),
            None => tracing::warn!(nzb_id, nzb = %job.name, "collection left the queue during par-rename"),
        }
        if let Err(err) = queue.save() {
            tracing::error!(nzb_id, error = %err, "failed to save queue after par-rename");
        }
    }
}

/// Folds one repair outcome into the collection's accumulated par status.
///
/// Success replaces an undecided or repair-possible status and keeps an
/// earlier success. Repair-possible never replaces failure or success.
/// Failure always wins, including over an earlier success.
pub fn merge_par_status(current: ParStatus, outcome: ParCheckStatus) -> ParStatus {
    match outcome {
        ParCheckStatus::Repaired | ParCheckStatus::RepairNotNeeded
            if current <= ParStatus::Skipped
                || current == ParStatus::RepairPossible
                || current == ParStatus::Success =>
        {
            ParStatus::Success
        }
        ParCheckStatus::RepairPossible if current == ParStatus::Success => ParStatus::Success,
        ParCheckStatus::RepairPossible if current != ParStatus::Failure => ParStatus::RepairPossible,
        _ => ParStatus::Failure,
    }
}

fn record_repair_result(
    nzb: &mut NzbInfo,
    job: &RepairJob,
    status: ParCheckStatus,
    par_full: bool,
    now: SystemTime,
) {
    nzb.par_status = merge_par_status(nzb.par_status, status);
    // Time spent waiting for further par downloads is not par time.
    let wait_sec = nzb.download_sec.saturating_sub(job.download_sec);
    let par_sec = now
        .duration_since(job.par_time)
        .unwrap_or_default()
        .as_secs()
        .saturating_sub(wait_sec);
    nzb.par_sec += par_sec;
    nzb.par_full = par_full;

    let success = nzb.par_status == ParStatus::Success;
    if let Some(post) = nzb.post_info.as_mut() {
        if success && matches!(status, ParCheckStatus::Repaired | ParCheckStatus::RepairNotNeeded) {
            post.par_repaired = status == ParCheckStatus::Repaired;
        }
        post.start_time = post.start_time.map(|t| t + Duration::from_secs(wait_sec));
        post.working = false;
        post.stage = PostStage::Queued;
    }
}

fn record_rename_result(nzb: &mut NzbInfo, name: &str, status: ParRenameStatus, missed_files: bool) {
    nzb.rename_status = match status {
        ParRenameStatus::Success => RenameStatus::Success,
        ParRenameStatus::Failed => RenameStatus::Failure,
    };
    let request_check = missed_files && nzb.par_status <= ParStatus::Skipped;
    if request_check {
        post_message(
            nzb,
            LogLevel::Info,
            format!("Requesting par-check/repair for {name} to restore missing files"),
        );
    }
    if let Some(post) = nzb.post_info.as_mut() {
        post.request_par_check |= request_check;
        post.working = false;
        post.stage = PostStage::Queued;
    }
}

fn lookup_completed_file(nzb: &NzbInfo, filename: &str) -> Option<CompletedFileLookup> {
    let completed = nzb
        .completed_files
        .iter()
        .find(|f| f.filename.eq_ignore_ascii_case(filename))?;
    let partial_segments = completed.status == CompletedFileStatus::Partial
        && !nzb.reprocess
        && !completed.segments.is_empty();
    let status = match completed.status {
        CompletedFileStatus::Success => FileStatus::Success,
        CompletedFileStatus::Failure if !nzb.reprocess => FileStatus::Failure,
        CompletedFileStatus::Partial if partial_segments => FileStatus::Partial,
        _ => FileStatus::Unknown,
    };
    Some(CompletedFileLookup {
        status,
        crc: completed.crc,
        segments: if partial_segments {
            completed.segments.clone()
        } else {
            Vec::new()
        },
    })
}

fn permille_to_fraction(permille: u32) -> f32 {
    permille.min(1000) as f32 / 1000.0
}

fn fraction_to_permille(fraction: f32) -> u32 {
    (fraction * 1000.0).round() as u32
}

struct CheckHost {
    coordinator: Weak<Inner>,
    nzb_id: u32,
}

impl CheckHost {
    fn with<R: Default>(&self, f: impl FnOnce(&Inner) -> R) -> R {
        self.coordinator.upgrade().map(|inner| f(&inner)).unwrap_or_default()
    }
}

impl ParCheckHost for CheckHost {
    fn request_more_pars(&self, par_filename: &str, blocks_needed: u32) -> BlockRequest {
        self.with(|inner| inner.request_more_pars(self.nzb_id, par_filename, blocks_needed))
    }

    fn update_progress(&self) {
        self.with(|inner| inner.update_check_progress(self.nzb_id))
    }

    fn print_message(&self, kind: LogLevel, text: &str) {
        self.with(|inner| inner.print_message(self.nzb_id, kind, text))
    }

    fn register_parred_file(&self, filename: &str) {
        self.with(|inner| inner.register_parred_file(self.nzb_id, filename))
    }

    fn is_parred_file(&self, filename: &str) -> bool {
        self.with(|inner| inner.is_parred_file(self.nzb_id, filename))
    }

    fn find_file_crc(&self, filename: &str) -> Option<CompletedFileLookup> {
        self.with(|inner| inner.find_file_crc(self.nzb_id, filename))
    }

    fn completed(&self) {
        self.with(|inner| inner.complete_repair(self.nzb_id))
    }
}

struct RenameHost {
    coordinator: Weak<Inner>,
    nzb_id: u32,
}

impl RenameHost {
    fn with<R: Default>(&self, f: impl FnOnce(&Inner) -> R) -> R {
        self.coordinator.upgrade().map(|inner| f(&inner)).unwrap_or_default()
    }
}

impl ParRenameHost for RenameHost {
    fn update_progress(&self) {
        self.with(|inner| inner.update_rename_progress(self.nzb_id))
    }

    fn print_message(&self, kind: LogLevel, text: &str) {
        self.with(|inner| inner.print_message(self.nzb_id, kind, text))
    }

    fn register_parred_file(&self, filename: &str) {
        self.with(|inner| inner.register_parred_file(self.nzb_id, filename))
    }

    fn register_renamed_file(&self, old_name: &str, new_name: &str) {
        self.with(|inner| inner.register_renamed_file(self.nzb_id, old_name, new_name))
    }

    fn completed(&self) {
        self.with(|inner| inner.complete_rename(self.nzb_id))
    }
}
