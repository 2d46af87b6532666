pub mod blocks;
pub mod coordinator;
pub mod deadline;
pub mod error;
mod message;
pub mod parname;
pub mod pause;
pub mod worker;

pub use blocks::{BlockRequest, pause_extra_pars, request_more_pars};
pub use coordinator::{JobKind, ParCoordinator, merge_par_status};
pub use error::CoordinatorError;
pub use parname::{ParFilename, parse_par_filename, same_par_collection};
pub use pause::{PAUSE_POLL_INTERVAL, PostPauseSignal};
pub use worker::{
    CompletedFileLookup, FileStatus, JobWorker, ParCheckHost, ParCheckJob, ParCheckStage,
    ParCheckStatus, ParChecker, ParRenameHost, ParRenameJob, ParRenameStatus, ParRenamer,
    WorkerProgress,
};
