use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use parcoord_core::models::{DownloadQueue, NzbInfo, PostStage};

pub const QUEUE_STATE_VERSION: u32 = 2;

pub trait StateFormat: Send + Sync {
    fn serialize<T: Serialize>(&self, value: &T) -> anyhow::Result<Vec<u8>>;
    fn deserialize<T: for<'de> Deserialize<'de>>(&self, data: &[u8]) -> anyhow::Result<T>;
    fn file_extension(&self) -> &str;
}

#[derive(Debug)]
pub struct JsonFormat;

impl StateFormat for JsonFormat {
    fn serialize<T: Serialize>(&self, value: &T) -> anyhow::Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn deserialize<T: for<'de> Deserialize<'de>>(&self, data: &[u8]) -> anyhow::Result<T> {
        Ok(serde_json::from_slice(data)?)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

#[derive(Debug)]
pub struct DiskState<F: StateFormat> {
    state_dir: PathBuf,
    format: F,
}

impl<F: StateFormat> DiskState<F> {
    pub fn new(state_dir: PathBuf, format: F) -> anyhow::Result<Self> {
        fs::create_dir_all(&state_dir)?;
        Ok(Self { state_dir, format })
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    fn queue_path(&self) -> PathBuf {
        self.state_dir
            .join(format!("queue.{}", self.format.file_extension()))
    }

    pub fn save_queue(&self, queue: &DownloadQueue) -> anyhow::Result<()> {
        let state = QueueState::from_queue(queue);
        let data = self.format.serialize(&state)?;
        atomic_write(&self.queue_path(), &data)
    }

    pub fn load_queue(&self) -> anyhow::Result<DownloadQueue> {
        let data = fs::read(self.queue_path())?;
        let state: QueueState = self.format.deserialize(&data)?;
        Ok(state.migrate()?.into_queue())
    }

    pub fn recover(&self) -> anyhow::Result<RecoveryReport> {
        let mut report = RecoveryReport::default();
        if let Ok(entries) = fs::read_dir(&self.state_dir) {
            for entry in entries.flatten() {
                if entry.path().extension() == Some("tmp".as_ref()) {
                    fs::remove_file(entry.path())?;
                    report.tmp_files_cleaned += 1;
                }
            }
        }
        if report.tmp_files_cleaned > 0 {
            tracing::info!(
                dir = %self.state_dir.display(),
                count = report.tmp_files_cleaned,
                "removed interrupted state writes"
            );
        }
        Ok(report)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryReport {
    pub tmp_files_cleaned: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueState {
    pub version: u32,
    pub nzbs: Vec<NzbInfo>,
    pub next_nzb_id: u32,
    pub next_file_id: u32,
}

impl QueueState {
    pub fn from_queue(queue: &DownloadQueue) -> Self {
        Self {
            version: QUEUE_STATE_VERSION,
            nzbs: queue.queue.clone(),
            next_nzb_id: queue.next_nzb_id,
            next_file_id: queue.next_file_id,
        }
    }

    pub fn into_queue(self) -> DownloadQueue {
        DownloadQueue {
            queue: self.nzbs,
            next_nzb_id: self.next_nzb_id,
            next_file_id: self.next_file_id,
        }
    }

    pub fn migrate(mut self) -> anyhow::Result<Self> {
        loop {
            match self.version {
                1 => {
                    // Version 1 saved mid-job snapshots; no worker survives a restart.
                    for post in self.nzbs.iter_mut().filter_map(|nzb| nzb.post_info.as_mut()) {
                        post.working = false;
                        post.stage = PostStage::Queued;
                    }
                    self.version = 2;
                }
                QUEUE_STATE_VERSION => return Ok(self),
                version => anyhow::bail!("unsupported state version: {version}"),
            }
        }
    }
}

pub fn atomic_write(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let tmp_path = path.with_extension("tmp");

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&tmp_path, path)?;

    if let Some(parent) = path.parent() {
        let dir = fs::File::open(parent)?;
        dir.sync_all()?;
    }

    Ok(())
}
