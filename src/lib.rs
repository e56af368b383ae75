//! Reusable core of the re:connection Maya pipeline.
//!
//! Two pieces are shared by every production tool:
//!
//! 1. **Naming**: parse shot identifiers out of filenames, build versioned
//!    filenames (`rec_abc010_robot_cache_v004.abc`) and compute the next free
//!    version from whatever already sits on disk.
//! 2. **Work queue**: a plain-text list of scene paths drained one item at a
//!    time. The file is backed up before a session and rewritten after every
//!    pop, so a crash loses at most the item that was in flight. The journal
//!    names that item and the next session logs it as interrupted.
//!
//! The `recpipe` binary exposes both pieces to shell loops and batch scripts.
//!
//! Constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single owner**: one process owns a queue file for a session; there is no locking.
//! - **Atomic rewrites**: queue and journal files are replaced via temp-file rename.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;
mod naming;
mod queue;
mod render;

pub use foundation::config::{
    BackupSuffix, MAYA_LOCATION_ENV, PipelineConfig, QueueConfig, RenderConfig,
};
pub use foundation::error::{PipelineError, PipelineResult};
pub use naming::ids::{
    AssetName, AssetType, FileExt, SHOW, ShotId, has_any_extension, in_filename,
};
pub use naming::layout::{
    ASSETS_DIR, CACHES_DIR, MAIN_DRIVE, POST_PRODUCTION_DRIVE, assets_dir, caches_dir,
    find_assets_dir, find_model_path, find_shared_drive, find_shot_dir, find_shot_files,
};
pub use naming::version::{
    AssetValidator, DEFAULT_ALEMBIC_ASSETS, ExtensionRule, VERSION_INDICATOR, filename_base,
    latest_version, next_version_suffix, next_version_suffix_with,
    next_versioned_filename, parse_version, versioned_filename,
};
pub use queue::failures::{FailureLog, FailureRecord};
pub use queue::journal::{JobJournal, JobOutcome, JobRecord};
pub use queue::session::{INTERRUPTED, NOT_FOUND, Processor, QueueSession, SessionSummary};
pub use queue::store::{WorkQueue, backup, enqueue};
pub use render::args::{RenderRequest, Renderer, project_dir};
pub use render::runner::{CommandProcessor, DryRunProcessor};
