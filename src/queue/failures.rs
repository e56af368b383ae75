use std::{
    borrow::Cow,
    io::Write as _,
    path::{Path, PathBuf},
};

use crate::foundation::error::{PipelineError, PipelineResult};

/// One item that could not be processed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureRecord {
    /// Queue item as it was popped.
    pub item: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Append-only CSV (`item,reason`) next to the queue file.
#[derive(Clone, Debug)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    /// Log stored at `path`. Nothing is created until the first record.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. Earlier records are never rewritten.
    pub fn record(&self, item: &str, reason: &str) -> PipelineResult<()> {
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PipelineError::filesystem("open failure log", &self.path, e))?;
        let row = format!("{},{}\r\n", csv_field(item), csv_field(reason));
        f.write_all(row.as_bytes())
            .map_err(|e| PipelineError::filesystem("append to failure log", &self.path, e))?;
        tracing::warn!(item, reason, "recorded failure");
        Ok(())
    }

    /// All records in file order. A missing log has no records.
    pub fn read_all(&self) -> PipelineResult<Vec<FailureRecord>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PipelineError::filesystem("read failure log", &self.path, e)),
        };
        let records = parse_csv(&text)?
            .into_iter()
            .map(|fields| {
                let mut fields = fields.into_iter();
                FailureRecord {
                    item: fields.next().unwrap_or_default(),
                    reason: fields.next().unwrap_or_default(),
                }
            })
            .collect();
        Ok(records)
    }
}

fn csv_field(s: &str) -> Cow<'_, str> {
    if s.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", s.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(s)
    }
}

fn parse_csv(text: &str) -> PipelineResult<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(PipelineError::serde("failure log ends inside a quoted field"));
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
#[path = "../../tests/unit/queue/failures.rs"]
mod tests;
