//! Shared-drive directory conventions.
//!
//! Shots live under `<drive>/<..SEQ>/<..NUM>/`, caches under `LIGHT/cache`
//! inside a shot directory, and master models under
//! `<assets>/<NAME>/MODEL/<release>/MAYA/scenes/`.

use std::path::{Path, PathBuf};

use crate::{
    foundation::error::{PipelineError, PipelineResult},
    naming::ids::{AssetName, FileExt, ShotId, has_any_extension, in_filename},
};

/// Main production shared drive.
pub const MAIN_DRIVE: &str = "REC";
/// Post-production shared drive, holding shots.
pub const POST_PRODUCTION_DRIVE: &str = "REC_POST";
/// Asset library, relative to the main drive.
pub const ASSETS_DIR: &str = "02_ASSETS";
/// Cache directory, relative to a shot directory.
pub const CACHES_DIR: [&str; 2] = ["LIGHT", "cache"];

const WINDOWS_DRIVE_LETTER: &str = "G:";
const SHARED_DRIVES: &str = "Shared drives";
const CLOUD_STORAGE: [&str; 2] = ["Library", "CloudStorage"];
const GOOGLE_DRIVE_PREFIX: &str = "GoogleDrive";

/// Cache directory of a shot directory.
pub fn caches_dir(shot_dir: &Path) -> PathBuf {
    CACHES_DIR.iter().fold(shot_dir.to_path_buf(), |p, c| p.join(c))
}

/// Asset library of a main drive.
pub fn assets_dir(main_drive: &Path) -> PathBuf {
    main_drive.join(ASSETS_DIR)
}

/// Locate the asset library on the main shared drive.
pub fn find_assets_dir() -> PipelineResult<PathBuf> {
    let dir = assets_dir(&find_shared_drive(MAIN_DRIVE)?);
    if dir.is_dir() {
        Ok(dir)
    } else {
        Err(PipelineError::DirectoryNotFound(dir))
    }
}

/// Locate a synced Google shared drive by name (`REC_POST`, `REC_RENDER`, ...).
pub fn find_shared_drive(name: &str) -> PipelineResult<PathBuf> {
    if cfg!(windows) {
        let path = Path::new(WINDOWS_DRIVE_LETTER).join(SHARED_DRIVES).join(name);
        if path.is_dir() {
            return Ok(path);
        }
        return Err(PipelineError::DirectoryNotFound(path));
    }

    let home = dirs::home_dir()
        .ok_or_else(|| PipelineError::validation("could not determine home directory"))?;
    let storage = CLOUD_STORAGE.iter().fold(home, |p, c| p.join(c));
    let pattern = storage
        .join(format!("{GOOGLE_DRIVE_PREFIX}*"))
        .join(SHARED_DRIVES)
        .join(name);

    let accounts = match list_sorted(&storage, EntryKind::Dir) {
        Ok(accounts) => accounts,
        Err(PipelineError::DirectoryNotFound(_)) => return Err(PipelineError::DirectoryNotFound(pattern)),
        Err(e) => return Err(e),
    };
    accounts
        .into_iter()
        .filter(|d| file_name(d).starts_with(GOOGLE_DRIVE_PREFIX))
        .map(|d| d.join(SHARED_DRIVES).join(name))
        .find(|p| p.is_dir())
        .ok_or(PipelineError::DirectoryNotFound(pattern))
}

/// Regular files in `dir` whose stem mentions `shot`, sorted so the latest
/// version of each asset comes last.
pub fn find_shot_files(shot: &ShotId, dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let token = shot.name();
    Ok(list_sorted(dir, EntryKind::File)?
        .into_iter()
        .filter(|f| in_filename(&token, f))
        .collect())
}

/// Shot directory under `root`: a directory ending with the upper-cased
/// sequence code, then within it one ending with the shot number.
pub fn find_shot_dir(shot: &ShotId, root: &Path) -> PipelineResult<PathBuf> {
    let sequence_dir = find_dir_ending_with(root, &shot.sequence().to_uppercase())?;
    find_dir_ending_with(&sequence_dir, shot.number())
}

/// Master model scene of `asset_name` in the asset library.
pub fn find_model_path(
    asset_name: AssetName,
    show: &str,
    assets_root: &Path,
) -> PipelineResult<PathBuf> {
    let model_root = assets_root
        .join(asset_name.as_str().to_uppercase())
        .join("MODEL");
    let prefix = format!("{show}_asset_{asset_name}_model_");
    let pattern = model_root
        .join("*.*")
        .join("MAYA")
        .join("scenes")
        .join(format!("{prefix}*.*_MASTER.m?"));

    let releases = match list_sorted(&model_root, EntryKind::Dir) {
        Ok(releases) => releases,
        Err(PipelineError::DirectoryNotFound(_)) => return Err(PipelineError::NotFound(pattern)),
        Err(e) => return Err(e),
    };

    for release in releases.iter().filter(|d| file_name(d).contains('.')) {
        let scenes = release.join("MAYA").join("scenes");
        if !scenes.is_dir() {
            continue;
        }
        for file in list_sorted(&scenes, EntryKind::File)? {
            if is_master_model(&file, &prefix) {
                tracing::debug!(path = %file.display(), "found master model");
                return Ok(file);
            }
        }
    }
    Err(PipelineError::NotFound(pattern))
}

fn is_master_model(file: &Path, prefix: &str) -> bool {
    if !has_any_extension(file, &FileExt::MAYA_SCENES) {
        return false;
    }
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix("_MASTER"))
        .is_some_and(|release| release.contains('.'))
}

fn find_dir_ending_with(parent: &Path, identifier: &str) -> PipelineResult<PathBuf> {
    list_sorted(parent, EntryKind::Dir)?
        .into_iter()
        .find(|d| {
            d.file_stem()
                .is_some_and(|s| s.to_string_lossy().ends_with(identifier))
        })
        .ok_or_else(|| PipelineError::DirectoryNotFound(parent.join(format!("*{identifier}"))))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
}

fn list_sorted(dir: &Path, kind: EntryKind) -> PipelineResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PipelineError::DirectoryNotFound(dir.to_path_buf())
        } else {
            PipelineError::filesystem("list directory", dir, e)
        }
    })?;

    let mut out = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| PipelineError::filesystem("list directory", dir, e))?
            .path();
        let keep = match kind {
            EntryKind::File => path.is_file(),
            EntryKind::Dir => path.is_dir(),
        };
        if keep {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/naming/layout.rs"]
mod tests;
