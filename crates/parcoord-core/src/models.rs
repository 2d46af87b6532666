use std::path::PathBuf;
use std::time::SystemTime;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use parcoord_logging::{LogLevel, LogMessage};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadQueue {
    pub queue: Vec<NzbInfo>,
    pub next_nzb_id: u32,
    pub next_file_id: u32,
}

impl DownloadQueue {
    pub fn find_nzb(&self, id: u32) -> Option<&NzbInfo> {
        self.queue.iter().find(|nzb| nzb.id == id)
    }

    pub fn find_nzb_mut(&mut self, id: u32) -> Option<&mut NzbInfo> {
        self.queue.iter_mut().find(|nzb| nzb.id == id)
    }

    /// Locates the collection owning `file_id`.
    pub fn find_file(&self, file_id: u32) -> Option<(&NzbInfo, &FileInfo)> {
        self.queue.iter().find_map(|nzb| {
            nzb.files
                .iter()
                .find(|file| file.id == file_id)
                .map(|file| (nzb, file))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NzbInfo {
    pub id: u32,
    pub name: String,
    pub dest_dir: PathBuf,
    pub final_dir: Option<PathBuf>,
    pub download_sec: u64,
    pub par_sec: u64,
    pub repair_sec: u64,
    pub force_priority: bool,
    pub reprocess: bool,
    pub par_full: bool,
    pub par_status: ParStatus,
    pub rename_status: RenameStatus,
    pub unpack_status: UnpackStatus,
    pub files: Vec<FileInfo>,
    pub completed_files: Vec<CompletedFile>,
    pub post_info: Option<PostInfo>,
    pub messages: Vec<LogMessage>,
    pub message_count: u32,
}

impl NzbInfo {
    pub fn new(id: u32, name: impl Into<String>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            id,
            name: name.into(),
            dest_dir: dest_dir.into(),
            final_dir: None,
            download_sec: 0,
            par_sec: 0,
            repair_sec: 0,
            force_priority: false,
            reprocess: false,
            par_full: false,
            par_status: ParStatus::None,
            rename_status: RenameStatus::None,
            unpack_status: UnpackStatus::None,
            files: Vec::new(),
            completed_files: Vec::new(),
            post_info: None,
            messages: Vec::new(),
            message_count: 0,
        }
    }

    /// Directory the collection ends up in once unpacking has moved it.
    pub fn build_final_dir(&self) -> PathBuf {
        self.final_dir
            .clone()
            .unwrap_or_else(|| self.dest_dir.clone())
    }

    pub fn add_message(&mut self, kind: LogLevel, text: impl Into<String>) {
        self.message_count += 1;
        self.messages.push(LogMessage {
            id: self.message_count,
            kind,
            time: Utc::now(),
            text: text.into(),
            nzb_id: Some(self.id),
        });
    }

    pub fn find_file_mut(&mut self, file_id: u32) -> Option<&mut FileInfo> {
        self.files.iter_mut().find(|file| file.id == file_id)
    }
}

/// Ordered so that `status <= ParStatus::Skipped` means "no verdict yet".
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize_repr, Deserialize_repr)]
pub enum ParStatus {
    None = 0,
    Skipped = 1,
    Failure = 2,
    Success = 3,
    RepairPossible = 4,
    Manual = 5,
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum RenameStatus {
    None = 0,
    Failure = 1,
    Success = 2,
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum UnpackStatus {
    None = 0,
    Failure = 1,
    Success = 2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub id: u32,
    pub nzb_id: u32,
    pub filename: String,
    pub paused: bool,
    pub extra_priority: bool,
}

impl FileInfo {
    pub fn new(id: u32, nzb_id: u32, filename: impl Into<String>) -> Self {
        Self {
            id,
            nzb_id,
            filename: filename.into(),
            paused: false,
            extra_priority: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedFile {
    pub id: u32,
    pub filename: String,
    pub status: CompletedFileStatus,
    pub crc: u32,
    pub segments: Vec<SegmentInfo>,
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum CompletedFileStatus {
    Unknown = 0,
    Success = 1,
    Partial = 2,
    Failure = 3,
}

/// Byte range of one downloaded article within its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub success: bool,
    pub offset: u64,
    pub size: u64,
    pub crc: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostInfo {
    pub nzb_id: u32,
    pub stage: PostStage,
    pub progress_label: String,
    pub file_progress: f32,
    pub stage_progress: f32,
    pub start_time: Option<SystemTime>,
    pub stage_time: Option<SystemTime>,
    pub working: bool,
    pub force_par_full: bool,
    pub force_repair: bool,
    pub par_repaired: bool,
    pub request_par_check: bool,
    pub parred_files: Vec<String>,
}

impl PostInfo {
    pub fn new(nzb_id: u32) -> Self {
        Self {
            nzb_id,
            stage: PostStage::Queued,
            progress_label: String::new(),
            file_progress: 0.0,
            stage_progress: 0.0,
            start_time: None,
            stage_time: None,
            working: false,
            force_par_full: false,
            force_repair: false,
            par_repaired: false,
            request_par_check: false,
            parred_files: Vec::new(),
        }
    }

    /// Switches stage and restarts the stage clock; no-op when unchanged.
    pub fn enter_stage(&mut self, stage: PostStage, now: SystemTime) -> bool {
        if self.stage == stage {
            return false;
        }
        self.stage = stage;
        self.stage_time = Some(now);
        self.stage_progress = 0.0;
        true
    }
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum PostStage {
    Queued = 0,
    LoadingPars = 1,
    VerifyingSources = 2,
    Repairing = 3,
    VerifyingRepaired = 4,
    Renaming = 5,
}
