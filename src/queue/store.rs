use std::{
    collections::VecDeque,
    io::Write as _,
    path::{Path, PathBuf},
};

use crate::{
    foundation::{
        config::BackupSuffix,
        error::{PipelineError, PipelineResult},
    },
    naming::ids::{FileExt, has_any_extension, in_filename},
};

/// Ordered list of pending items backed by a line-delimited text file.
///
/// Lines are kept verbatim, terminators included, so rewriting the file does
/// not disturb items that were never popped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkQueue {
    lines: VecDeque<String>,
}

impl WorkQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue holding `items` in order.
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Read `path` as one item per line. An empty file is an empty queue.
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::filesystem("read queue", path, e))?;
        Ok(Self::parse(&text))
    }

    /// Split `text` into lines, keeping each line's terminator.
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    /// Number of remaining items.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when nothing is left.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Remaining items, trimmed, in order.
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.trim())
    }

    /// Next item without removing it.
    pub fn peek(&self) -> Option<&str> {
        self.lines.front().map(|l| l.trim())
    }

    /// Remove the first item and return it with surrounding whitespace trimmed.
    pub fn pop_front(&mut self) -> PipelineResult<String> {
        self.lines
            .pop_front()
            .map(|l| l.trim().to_string())
            .ok_or(PipelineError::QueueEmpty)
    }

    /// Append an item at the back.
    pub fn push_back(&mut self, item: impl Into<String>) {
        self.lines.push_back(item.into());
    }

    /// File contents for the remaining items, one per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            if !line.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }

    /// Replace `path` with the remaining items.
    ///
    /// Writes a temp file in the same directory and renames it over `path`, so
    /// a crash leaves either the old or the new queue, never a truncated one.
    #[tracing::instrument(skip(self), fields(remaining = self.len()))]
    pub fn persist(&self, path: &Path) -> PipelineResult<()> {
        write_atomic(path, self.to_text().as_bytes(), "persist queue")
    }
}

/// Copy the queue file to its backup sibling and return the backup path.
#[tracing::instrument]
pub fn backup(queue_path: &Path, suffix: BackupSuffix) -> PipelineResult<PathBuf> {
    let target = suffix.sibling(queue_path);
    std::fs::copy(queue_path, &target)
        .map_err(|e| PipelineError::filesystem("back up queue", queue_path, e))?;
    tracing::debug!(backup = %target.display(), "queue backed up");
    Ok(target)
}

/// Append a Maya scene to the queue file, creating it if needed.
///
/// Unsaved (`untitled`) scenes and non-scene files are rejected.
pub fn enqueue(queue_path: &Path, scene: &Path) -> PipelineResult<()> {
    let name = scene
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if in_filename("untitled", scene) {
        return Err(PipelineError::validation(format!(
            "filename '{name}' must match pattern: 'rec_seq###_description'"
        )));
    }
    if !has_any_extension(scene, &FileExt::MAYA_SCENES) {
        return Err(PipelineError::validation(format!(
            "file '{name}' is not a Maya scene"
        )));
    }

    let line = scene.to_string_lossy();
    if line.contains('\n') {
        return Err(PipelineError::validation("scene path must not contain newlines"));
    }

    let mut f = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(queue_path)
        .map_err(|e| PipelineError::filesystem("open queue", queue_path, e))?;
    writeln!(f, "{line}").map_err(|e| PipelineError::filesystem("append to queue", queue_path, e))?;
    tracing::info!(scene = %line, "queued");
    Ok(())
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8], action: &'static str) -> PipelineResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| PipelineError::filesystem(action, path, e))?;
    tmp.write_all(bytes)
        .map_err(|e| PipelineError::filesystem(action, path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| PipelineError::filesystem(action, path, e))?;
    tmp.persist(path)
        .map_err(|e| PipelineError::filesystem(action, path, e.error))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/queue/store.rs"]
mod tests;
