//! In-flight job journal and finished-job session log.
//!
//! The journal is rewritten at the start and end of every job, so after a
//! crash it names exactly the item that was being processed.

use std::{
    collections::BTreeMap,
    io::Write as _,
    path::{Path, PathBuf},
};

use crate::{
    foundation::error::{PipelineError, PipelineResult},
    queue::store::write_atomic,
};

/// How a job ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    /// The processor reported success.
    Completed,
    /// The processor reported an error.
    Failed,
}

impl JobOutcome {
    /// Column value in the session log.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// A job handed to the processor.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct JobRecord {
    /// Session-unique id, `<session>-<seq>`.
    pub id: String,
    /// Queue item being processed.
    pub file: String,
    /// RFC 3339 local start time.
    pub started_at: String,
    /// RFC 3339 local end time, set once the job finishes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    /// Set once the job finishes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<JobOutcome>,
}

/// JSON map of in-flight jobs plus an append-only TSV of finished ones.
#[derive(Clone, Debug)]
pub struct JobJournal {
    journal: PathBuf,
    session_log: PathBuf,
}

impl JobJournal {
    /// Journal at `journal`, finished jobs appended to `session_log`.
    pub fn new(journal: impl Into<PathBuf>, session_log: impl Into<PathBuf>) -> Self {
        Self {
            journal: journal.into(),
            session_log: session_log.into(),
        }
    }

    /// Path of the JSON journal.
    pub fn path(&self) -> &Path {
        &self.journal
    }

    /// Path of the TSV session log.
    pub fn session_log(&self) -> &Path {
        &self.session_log
    }

    /// Jobs that were started but never finished, keyed by id.
    pub fn in_flight(&self) -> PipelineResult<BTreeMap<String, JobRecord>> {
        let text = match std::fs::read_to_string(&self.journal) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(PipelineError::filesystem("read job journal", &self.journal, e)),
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text)
            .map_err(|e| PipelineError::serde(format!("{}: {e}", self.journal.display())))
    }

    /// Record `file` as in flight under `id`.
    pub fn start(&self, id: impl Into<String>, file: &str) -> PipelineResult<JobRecord> {
        let record = JobRecord {
            id: id.into(),
            file: file.to_string(),
            started_at: now(),
            finished_at: None,
            outcome: None,
        };
        let mut jobs = self.in_flight()?;
        jobs.insert(record.id.clone(), record.clone());
        self.write(&jobs)?;
        tracing::debug!(id = %record.id, file, "job started");
        Ok(record)
    }

    /// Close `record`: drop it from the journal and append it to the session log.
    pub fn finish(&self, mut record: JobRecord, outcome: JobOutcome) -> PipelineResult<JobRecord> {
        record.finished_at = Some(now());
        record.outcome = Some(outcome);

        let mut jobs = self.in_flight()?;
        jobs.remove(&record.id);
        self.write(&jobs)?;
        self.append_log(&record)?;
        tracing::debug!(id = %record.id, outcome = outcome.as_str(), "job finished");
        Ok(record)
    }

    /// Forget every in-flight job, returning what was cleared.
    pub fn clear(&self) -> PipelineResult<Vec<JobRecord>> {
        let jobs = self.in_flight()?;
        if !jobs.is_empty() {
            self.write(&BTreeMap::new())?;
        }
        Ok(jobs.into_values().collect())
    }

    fn write(&self, jobs: &BTreeMap<String, JobRecord>) -> PipelineResult<()> {
        let body = serde_json::to_vec_pretty(jobs).map_err(|e| PipelineError::serde(e.to_string()))?;
        write_atomic(&self.journal, &body, "write job journal")
    }

    fn append_log(&self, record: &JobRecord) -> PipelineResult<()> {
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.session_log)
            .map_err(|e| PipelineError::filesystem("open session log", &self.session_log, e))?;
        let row = [
            record.id.as_str(),
            record.file.as_str(),
            record.started_at.as_str(),
            record.finished_at.as_deref().unwrap_or(""),
            record.outcome.map(JobOutcome::as_str).unwrap_or(""),
        ]
        .map(tsv_field)
        .join("\t");
        writeln!(f, "{row}")
            .map_err(|e| PipelineError::filesystem("append to session log", &self.session_log, e))
    }
}

fn tsv_field(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

fn now() -> String {
    chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
}

#[cfg(test)]
#[path = "../../tests/unit/queue/journal.rs"]
mod tests;
