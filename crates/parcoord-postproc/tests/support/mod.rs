#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use parcoord_config::Config;
use parcoord_core::models::{DownloadQueue, NzbInfo};
use parcoord_diskstate::{DiskState, JsonFormat};
use parcoord_logging::LogLevel;
use parcoord_postproc::{
    BlockRequest, CompletedFileLookup, JobKind, JobWorker, ParCheckHost, ParCheckJob,
    ParCheckStage, ParCheckStatus, ParChecker, ParCoordinator, ParRenameHost, ParRenameJob,
    ParRenameStatus, ParRenamer, PostPauseSignal, WorkerProgress,
};
use parcoord_queue::SharedQueue;
use tempfile::TempDir;

/// One scripted action of a fake engine thread.
pub enum Step {
    Progress {
        stage: ParCheckStage,
        stage_permille: u32,
        file_permille: u32,
        label: &'static str,
    },
    RequestPars {
        filename: &'static str,
        blocks: u32,
    },
    Message(LogLevel, &'static str),
    RegisterParred(&'static str),
    RegisterRenamed(&'static str, &'static str),
    LookupCrc(&'static str),
    Notify(Sender<()>),
    Wait(Receiver<()>),
    /// Idles until cancelled or killed.
    WaitForCancel,
    /// Ignores everything but kill.
    Hang,
}

#[derive(Default)]
struct EngineFlags {
    running: AtomicBool,
    cancelled: AtomicBool,
    killed: AtomicBool,
    stop_requested: AtomicBool,
}

impl EngineFlags {
    fn interrupted(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst) || self.killed.load(Ordering::SeqCst)
    }
}

struct CheckerState {
    flags: EngineFlags,
    script: Mutex<Vec<Step>>,
    outcome: Mutex<ParCheckStatus>,
    par_full: AtomicBool,
    host: Mutex<Option<Arc<dyn ParCheckHost>>>,
    job: Mutex<Option<ParCheckJob>>,
    stage: Mutex<ParCheckStage>,
    progress: Mutex<WorkerProgress>,
    added_pars: Mutex<Vec<PathBuf>>,
    queue_changes: AtomicUsize,
    block_requests: Mutex<Vec<BlockRequest>>,
    crc_lookups: Mutex<Vec<Option<CompletedFileLookup>>>,
    parred_checks: Mutex<Vec<bool>>,
}

/// Par-check engine driven by a script instead of real par2 math.
pub struct FakeChecker {
    state: Arc<CheckerState>,
}

impl FakeChecker {
    pub fn new(outcome: ParCheckStatus, script: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(CheckerState {
                flags: EngineFlags::default(),
                script: Mutex::new(script),
                outcome: Mutex::new(outcome),
                par_full: AtomicBool::new(false),
                host: Mutex::new(None),
                job: Mutex::new(None),
                stage: Mutex::new(ParCheckStage::LoadingPars),
                progress: Mutex::new(WorkerProgress::default()),
                added_pars: Mutex::new(Vec::new()),
                queue_changes: AtomicUsize::new(0),
                block_requests: Mutex::new(Vec::new()),
                crc_lookups: Mutex::new(Vec::new()),
                parred_checks: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn load_script(&self, outcome: ParCheckStatus, script: Vec<Step>) {
        *self.state.outcome.lock().unwrap() = outcome;
        *self.state.script.lock().unwrap() = script;
        self.state.flags.cancelled.store(false, Ordering::SeqCst);
    }

    pub fn set_par_full(&self, par_full: bool) {
        self.state.par_full.store(par_full, Ordering::SeqCst);
    }

    pub fn job(&self) -> Option<ParCheckJob> {
        self.state.job.lock().unwrap().clone()
    }

    pub fn added_pars(&self) -> Vec<PathBuf> {
        self.state.added_pars.lock().unwrap().clone()
    }

    pub fn queue_changes(&self) -> usize {
        self.state.queue_changes.load(Ordering::SeqCst)
    }

    pub fn block_requests(&self) -> Vec<BlockRequest> {
        self.state.block_requests.lock().unwrap().clone()
    }

    pub fn crc_lookups(&self) -> Vec<Option<CompletedFileLookup>> {
        self.state.crc_lookups.lock().unwrap().clone()
    }

    pub fn parred_checks(&self) -> Vec<bool> {
        self.state.parred_checks.lock().unwrap().clone()
    }

    pub fn was_killed(&self) -> bool {
        self.state.flags.killed.load(Ordering::SeqCst)
    }

    pub fn stop_requested(&self) -> bool {
        self.state.flags.stop_requested.load(Ordering::SeqCst)
    }
}

fn run_checker(state: Arc<CheckerState>) {
    let Some(host) = state.host.lock().unwrap().clone() else {
        state.flags.running.store(false, Ordering::SeqCst);
        return;
    };
    let script = std::mem::take(&mut *state.script.lock().unwrap());
    for step in script {
        if state.flags.killed.load(Ordering::SeqCst) {
            return;
        }
        match step {
            Step::Progress {
                stage,
                stage_permille,
                file_permille,
                label,
            } => {
                *state.stage.lock().unwrap() = stage;
                *state.progress.lock().unwrap() = WorkerProgress {
                    stage_progress: stage_permille,
                    file_progress: file_permille,
                    label: label.to_string(),
                };
                host.update_progress();
            }
            Step::RequestPars { filename, blocks } => {
                let result = host.request_more_pars(filename, blocks);
                state.block_requests.lock().unwrap().push(result);
            }
            Step::Message(kind, text) => host.print_message(kind, text),
            Step::RegisterParred(filename) => {
                host.register_parred_file(filename);
                let known = host.is_parred_file(&filename.to_uppercase());
                state.parred_checks.lock().unwrap().push(known);
            }
            Step::RegisterRenamed(..) => {}
            Step::LookupCrc(filename) => {
                let found = host.find_file_crc(filename);
                state.crc_lookups.lock().unwrap().push(found);
            }
            Step::Notify(tx) => {
                let _ = tx.send(());
            }
            Step::Wait(rx) => {
                let _ = rx.recv_timeout(Duration::from_secs(10));
            }
            Step::WaitForCancel => {
                while !state.flags.interrupted() {
                    thread::sleep(Duration::from_millis(5));
                }
            }
            Step::Hang => {
                while !state.flags.killed.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(5));
                }
            }
        }
    }
    if state.flags.killed.load(Ordering::SeqCst) {
        return;
    }
    host.completed();
    state.flags.running.store(false, Ordering::SeqCst);
}

impl JobWorker for FakeChecker {
    fn start(&self) {
        self.state.flags.running.store(true, Ordering::SeqCst);
        let state = Arc::clone(&self.state);
        thread::spawn(move || run_checker(state));
    }

    fn stop(&self) {
        self.state.flags.stop_requested.store(true, Ordering::SeqCst);
    }

    fn kill(&self) {
        self.state.flags.killed.store(true, Ordering::SeqCst);
        self.state.flags.running.store(false, Ordering::SeqCst);
    }

    fn cancel(&self) {
        self.state.flags.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.state.flags.running.load(Ordering::SeqCst)
    }

    fn is_cancelled(&self) -> bool {
        self.state.flags.cancelled.load(Ordering::SeqCst)
    }
}

impl ParChecker for FakeChecker {
    fn configure(&self, job: ParCheckJob, host: Arc<dyn ParCheckHost>) {
        *self.state.job.lock().unwrap() = Some(job);
        *self.state.host.lock().unwrap() = Some(host);
    }

    fn stage(&self) -> ParCheckStage {
        *self.state.stage.lock().unwrap()
    }

    fn progress(&self) -> WorkerProgress {
        self.state.progress.lock().unwrap().clone()
    }

    fn status(&self) -> ParCheckStatus {
        if self.is_cancelled() {
            ParCheckStatus::Failed
        } else {
            *self.state.outcome.lock().unwrap()
        }
    }

    fn par_full(&self) -> bool {
        self.state.par_full.load(Ordering::SeqCst)
    }

    fn add_par_file(&self, path: PathBuf) {
        self.state.added_pars.lock().unwrap().push(path);
    }

    fn queue_changed(&self) {
        self.state.queue_changes.fetch_add(1, Ordering::SeqCst);
    }
}

struct RenamerState {
    flags: EngineFlags,
    script: Mutex<Vec<Step>>,
    outcome: Mutex<ParRenameStatus>,
    missed_files: AtomicBool,
    host: Mutex<Option<Arc<dyn ParRenameHost>>>,
    job: Mutex<Option<ParRenameJob>>,
    progress: Mutex<WorkerProgress>,
}

/// Par-rename engine driven by a script.
pub struct FakeRenamer {
    state: Arc<RenamerState>,
}

impl FakeRenamer {
    pub fn new(outcome: ParRenameStatus, missed_files: bool, script: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(RenamerState {
                flags: EngineFlags::default(),
                script: Mutex::new(script),
                outcome: Mutex::new(outcome),
                missed_files: AtomicBool::new(missed_files),
                host: Mutex::new(None),
                job: Mutex::new(None),
                progress: Mutex::new(WorkerProgress::default()),
            }),
        })
    }

    pub fn job(&self) -> Option<ParRenameJob> {
        self.state.job.lock().unwrap().clone()
    }
}

fn run_renamer(state: Arc<RenamerState>) {
    let Some(host) = state.host.lock().unwrap().clone() else {
        state.flags.running.store(false, Ordering::SeqCst);
        return;
    };
    let script = std::mem::take(&mut *state.script.lock().unwrap());
    for step in script {
        if state.flags.killed.load(Ordering::SeqCst) {
            return;
        }
        match step {
            Step::Progress {
                stage_permille,
                label,
                ..
            } => {
                *state.progress.lock().unwrap() = WorkerProgress {
                    stage_progress: stage_permille,
                    file_progress: 0,
                    label: label.to_string(),
                };
                host.update_progress();
            }
            Step::Message(kind, text) => host.print_message(kind, text),
            Step::RegisterParred(filename) => host.register_parred_file(filename),
            Step::RegisterRenamed(old_name, new_name) => {
                host.register_renamed_file(old_name, new_name)
            }
            Step::Notify(tx) => {
                let _ = tx.send(());
            }
            Step::Wait(rx) => {
                let _ = rx.recv_timeout(Duration::from_secs(10));
            }
            Step::WaitForCancel => {
                while !state.flags.interrupted() {
                    thread::sleep(Duration::from_millis(5));
                }
            }
            Step::Hang => {
                while !state.flags.killed.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(5));
                }
            }
            Step::RequestPars { .. } | Step::LookupCrc(_) => {}
        }
    }
    if state.flags.killed.load(Ordering::SeqCst) {
        return;
    }
    host.completed();
    state.flags.running.store(false, Ordering::SeqCst);
}

impl JobWorker for FakeRenamer {
    fn start(&self) {
        self.state.flags.running.store(true, Ordering::SeqCst);
        let state = Arc::clone(&self.state);
        thread::spawn(move || run_renamer(state));
    }

    fn stop(&self) {
        self.state.flags.stop_requested.store(true, Ordering::SeqCst);
    }

    fn kill(&self) {
        self.state.flags.killed.store(true, Ordering::SeqCst);
        self.state.flags.running.store(false, Ordering::SeqCst);
    }

    fn cancel(&self) {
        self.state.flags.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.state.flags.running.load(Ordering::SeqCst)
    }

    fn is_cancelled(&self) -> bool {
        self.state.flags.cancelled.load(Ordering::SeqCst)
    }
}

impl ParRenamer for FakeRenamer {
    fn configure(&self, job: ParRenameJob, host: Arc<dyn ParRenameHost>) {
        *self.state.job.lock().unwrap() = Some(job);
        *self.state.host.lock().unwrap() = Some(host);
    }

    fn progress(&self) -> WorkerProgress {
        self.state.progress.lock().unwrap().clone()
    }

    fn status(&self) -> ParRenameStatus {
        if self.is_cancelled() {
            ParRenameStatus::Failed
        } else {
            *self.state.outcome.lock().unwrap()
        }
    }

    fn has_missed_files(&self) -> bool {
        self.state.missed_files.load(Ordering::SeqCst)
    }
}

pub struct Harness {
    pub queue: Arc<SharedQueue>,
    pub pause: Arc<PostPauseSignal>,
    pub coordinator: ParCoordinator,
    pub checker: Arc<FakeChecker>,
    pub renamer: Arc<FakeRenamer>,
    pub disk: Arc<DiskState<JsonFormat>>,
    _state_dir: TempDir,
}

pub fn config(options: &[(&str, &str)]) -> Config {
    let raw: HashMap<String, String> = options
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_raw(raw).expect("config")
}

pub fn harness(
    config: Config,
    nzbs: Vec<NzbInfo>,
    checker: Arc<FakeChecker>,
    renamer: Arc<FakeRenamer>,
) -> Harness {
    let state_dir = TempDir::new().expect("temp dir");
    let disk = Arc::new(DiskState::new(state_dir.path().to_path_buf(), JsonFormat).expect("disk state"));
    let queue = DownloadQueue {
        next_nzb_id: nzbs.iter().map(|n| n.id).max().unwrap_or(0) + 1,
        queue: nzbs,
        next_file_id: 100,
    };
    let queue = Arc::new(SharedQueue::new(queue).with_store(disk.clone()));
    let pause = Arc::new(PostPauseSignal::new(config.pause_post_process));
    let coordinator = ParCoordinator::new(
        Arc::clone(&queue),
        &config,
        Arc::clone(&pause),
        checker.clone(),
        renamer.clone(),
    );
    Harness {
        queue,
        pause,
        coordinator,
        checker,
        renamer,
        disk,
        _state_dir: state_dir,
    }
}

pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

pub fn wait_idle(coordinator: &ParCoordinator) {
    assert!(
        wait_until(Duration::from_secs(5), || coordinator.current_job() == JobKind::Idle),
        "job did not finish"
    );
}
