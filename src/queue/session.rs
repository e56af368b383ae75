use std::path::{Path, PathBuf};

use crate::{
    foundation::{
        config::QueueConfig,
        error::{PipelineError, PipelineResult},
    },
    queue::{
        failures::FailureLog,
        journal::{JobJournal, JobOutcome},
        store::{WorkQueue, backup},
    },
};

/// Reason recorded for items whose scene file does not exist.
pub const NOT_FOUND: &str = "not found";
/// Reason recorded for jobs found in flight when a session opens.
pub const INTERRUPTED: &str = "interrupted";

/// External collaborator that handles one queue item (e.g. runs a render).
pub trait Processor {
    /// Process the scene at `scene`. An error is logged and the queue moves on.
    fn process(&mut self, scene: &Path) -> anyhow::Result<()>;
}

impl<F> Processor for F
where
    F: FnMut(&Path) -> anyhow::Result<()>,
{
    fn process(&mut self, scene: &Path) -> anyhow::Result<()> {
        self(scene)
    }
}

/// Counters for one drained session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Items the processor handled successfully.
    pub completed: usize,
    /// Items the processor failed on.
    pub failed: usize,
    /// Items skipped because their scene was missing.
    pub missing: usize,
    /// Blank lines dropped from the queue.
    pub blank: usize,
}

impl SessionSummary {
    /// Items popped from the queue.
    pub fn total(&self) -> usize {
        self.completed + self.failed + self.missing + self.blank
    }
}

/// One processing session over a queue file.
///
/// Opening a session backs the queue up once. Every pop is followed by a
/// rewrite of the queue file, so an abrupt stop loses at most the item in hand,
/// and the journal names that item for the next session.
#[derive(Debug)]
pub struct QueueSession {
    queue_path: PathBuf,
    backup_path: PathBuf,
    queue: WorkQueue,
    failures: FailureLog,
    journal: JobJournal,
    tag: String,
    seq: u64,
}

impl QueueSession {
    /// Back up and load the queue described by `cfg`.
    ///
    /// Jobs left in flight by an earlier session are recorded as interrupted
    /// failures. They are never retried.
    #[tracing::instrument(skip(cfg), fields(queue = %cfg.queue_file.display()))]
    pub fn open(cfg: &QueueConfig) -> PipelineResult<Self> {
        let backup_path = backup(&cfg.queue_file, cfg.backup_suffix)?;
        let queue = WorkQueue::load(&cfg.queue_file)?;
        let session = Self {
            queue_path: cfg.queue_file.clone(),
            backup_path,
            queue,
            failures: FailureLog::new(&cfg.failure_log),
            journal: JobJournal::new(&cfg.journal, &cfg.session_log),
            tag: chrono::Local::now().format("%Y%m%dT%H%M%S").to_string(),
            seq: 0,
        };
        session.recover_interrupted()?;
        tracing::info!(pending = session.queue.len(), "queue session opened");
        Ok(session)
    }

    /// Path of the backup taken when the session opened.
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Queue file this session owns.
    pub fn queue_path(&self) -> &Path {
        &self.queue_path
    }

    /// Items still pending.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Failure log of this session.
    pub fn failures(&self) -> &FailureLog {
        &self.failures
    }

    /// Job journal of this session.
    pub fn journal(&self) -> &JobJournal {
        &self.journal
    }

    /// Pop the next item and immediately persist the shortened queue.
    pub fn pop(&mut self) -> PipelineResult<String> {
        let item = self.queue.pop_front()?;
        self.queue.persist(&self.queue_path)?;
        Ok(item)
    }

    /// Next existing scene, for shell-driven loops that render one item per call.
    ///
    /// Missing scenes are recorded and dropped along the way. Returns
    /// [`PipelineError::QueueEmpty`] once nothing valid is left.
    pub fn next_valid(&mut self) -> PipelineResult<PathBuf> {
        loop {
            let item = self.pop()?;
            if item.is_empty() {
                continue;
            }
            let scene = PathBuf::from(&item);
            if scene.is_file() {
                tracing::info!(scene = %item, remaining = self.remaining(), "next scene");
                return Ok(scene);
            }
            self.failures.record(&item, NOT_FOUND)?;
        }
    }

    /// Process every remaining item with `processor`.
    ///
    /// Each item is persisted away before the processor sees it. Missing scenes
    /// and processor errors are recorded in the failure log and never stop the
    /// session; IO errors on the queue's own files do.
    #[tracing::instrument(skip_all, fields(queue = %self.queue_path.display()))]
    pub fn drain<P: Processor + ?Sized>(&mut self, processor: &mut P) -> PipelineResult<SessionSummary> {
        let mut summary = SessionSummary::default();
        loop {
            let item = match self.pop() {
                Ok(item) => item,
                Err(PipelineError::QueueEmpty) => break,
                Err(e) => return Err(e),
            };

            if item.is_empty() {
                summary.blank += 1;
                continue;
            }

            let scene = PathBuf::from(&item);
            if !scene.is_file() {
                summary.missing += 1;
                self.failures.record(&item, NOT_FOUND)?;
                continue;
            }

            self.seq += 1;
            let job = self.journal.start(format!("{}-{}", self.tag, self.seq), &item)?;
            let _span = tracing::info_span!("job", id = %job.id).entered();
            tracing::info!(scene = %item, remaining = self.queue.len(), "processing");

            let outcome = match processor.process(&scene) {
                Ok(()) => {
                    summary.completed += 1;
                    JobOutcome::Completed
                }
                Err(e) => {
                    summary.failed += 1;
                    self.failures.record(&item, &format!("{e:#}"))?;
                    JobOutcome::Failed
                }
            };
            self.journal.finish(job, outcome)?;
        }

        tracing::info!(
            completed = summary.completed,
            failed = summary.failed,
            missing = summary.missing,
            "queue drained"
        );
        Ok(summary)
    }

    fn recover_interrupted(&self) -> PipelineResult<()> {
        for job in self.journal.clear()? {
            tracing::warn!(id = %job.id, file = %job.file, "job was interrupted");
            self.failures.record(&job.file, INTERRUPTED)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/queue/session.rs"]
mod tests;
