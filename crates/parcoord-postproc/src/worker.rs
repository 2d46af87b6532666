//! Capability interfaces between the coordinator and the repair/rename
//! engines.
//!
//! An engine runs one job at a time on its own thread. The coordinator hands
//! it a job description plus a host object at configuration time; the engine
//! calls back into the host from its thread and invokes
//! [`ParCheckHost::completed`] / [`ParRenameHost::completed`] as its final
//! action.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use parcoord_core::models::{PostStage, SegmentInfo};
use parcoord_logging::LogLevel;

use crate::blocks::BlockRequest;

/// Lifecycle shared by both engine kinds.
pub trait JobWorker: Send + Sync {
    /// Launches the configured job on the engine's own thread.
    fn start(&self);
    /// Asks the engine thread to terminate.
    fn stop(&self);
    /// Forcibly terminates the engine thread.
    fn kill(&self);
    /// Cooperative cancellation; the engine observes it at its checkpoints.
    fn cancel(&self);
    fn is_running(&self) -> bool;
    fn is_cancelled(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParCheckStage {
    LoadingPars,
    VerifyingSources,
    Repairing,
    VerifyingRepaired,
}

impl ParCheckStage {
    pub fn post_stage(self) -> PostStage {
        match self {
            Self::LoadingPars => PostStage::LoadingPars,
            Self::VerifyingSources => PostStage::VerifyingSources,
            Self::Repairing => PostStage::Repairing,
            Self::VerifyingRepaired => PostStage::VerifyingRepaired,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParCheckStatus {
    Failed,
    RepairPossible,
    Repaired,
    RepairNotNeeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParRenameStatus {
    Failed,
    Success,
}

/// Progress as reported by an engine; both counters are in permille.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerProgress {
    pub stage_progress: u32,
    pub file_progress: u32,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct ParCheckJob {
    pub nzb_id: u32,
    pub nzb_name: String,
    pub dest_dir: PathBuf,
    pub par_quick: bool,
    pub force_repair: bool,
    pub par_time: SystemTime,
    pub download_sec: u64,
}

#[derive(Debug, Clone)]
pub struct ParRenameJob {
    pub nzb_id: u32,
    pub nzb_name: String,
    pub dest_dir: PathBuf,
    pub detect_missing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Unknown,
    Success,
    Failure,
    Partial,
}

/// Verification state remembered for a file downloaded earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedFileLookup {
    pub status: FileStatus,
    pub crc: u32,
    /// Only populated for [`FileStatus::Partial`].
    pub segments: Vec<SegmentInfo>,
}

/// Callbacks a repair engine may invoke while its job runs.
pub trait ParCheckHost: Send + Sync {
    fn request_more_pars(&self, par_filename: &str, blocks_needed: u32) -> BlockRequest;
    fn update_progress(&self);
    fn print_message(&self, kind: LogLevel, text: &str);
    fn register_parred_file(&self, filename: &str);
    fn is_parred_file(&self, filename: &str) -> bool;
    fn find_file_crc(&self, filename: &str) -> Option<CompletedFileLookup>;
    fn completed(&self);
}

/// Callbacks a rename engine may invoke while its job runs.
pub trait ParRenameHost: Send + Sync {
    fn update_progress(&self);
    fn print_message(&self, kind: LogLevel, text: &str);
    fn register_parred_file(&self, filename: &str);
    fn register_renamed_file(&self, old_name: &str, new_name: &str);
    fn completed(&self);
}

pub trait ParChecker: JobWorker {
    fn configure(&self, job: ParCheckJob, host: Arc<dyn ParCheckHost>);
    fn stage(&self) -> ParCheckStage;
    fn progress(&self) -> WorkerProgress;
    fn status(&self) -> ParCheckStatus;
    /// Whether the job ended up doing a full (not quick) verification.
    fn par_full(&self) -> bool;
    /// Offers a newly downloaded redundancy file to the running job.
    fn add_par_file(&self, path: PathBuf);
    /// Hints that the download queue changed in a way the job may care about.
    fn queue_changed(&self);
}

pub trait ParRenamer: JobWorker {
    fn configure(&self, job: ParRenameJob, host: Arc<dyn ParRenameHost>);
    fn progress(&self) -> WorkerProgress;
    fn status(&self) -> ParRenameStatus;
    /// Whether files listed in the par set were found neither under their
    /// own name nor under a detectable wrong name.
    fn has_missed_files(&self) -> bool;
}
