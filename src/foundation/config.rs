use std::path::{Path, PathBuf};

use crate::{
    foundation::error::{PipelineError, PipelineResult},
    naming::{
        ids::{AssetName, SHOW},
        version::{DEFAULT_ALEMBIC_ASSETS, VERSION_INDICATOR},
    },
};

/// Environment variable pointing at the Maya install root.
pub const MAYA_LOCATION_ENV: &str = "MAYA_LOCATION";

/// Pipeline settings, loaded from an optional JSON file.
///
/// Every field has a default, so an empty object (or no file) is valid.
/// Relative queue paths are resolved against the directory of the config file,
/// or the working directory when no file is used.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Filename prefix of every production file.
    pub show: String,
    /// Character introducing the version number (`v` in `v003`).
    pub version_indicator: char,
    /// Asset names whose caches are Alembic files.
    pub alembic_assets: Vec<String>,
    /// Root of the post-production shared drive. Discovered when unset.
    pub shared_drive: Option<PathBuf>,
    /// Queue file locations.
    pub queue: QueueConfig,
    /// External renderer settings.
    pub render: RenderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            show: SHOW.to_string(),
            version_indicator: VERSION_INDICATOR,
            alembic_assets: DEFAULT_ALEMBIC_ASSETS.iter().map(|s| s.to_string()).collect(),
            shared_drive: None,
            queue: QueueConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Files owned by a queue session.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    /// Pending scenes, one path per line.
    pub queue_file: PathBuf,
    /// Append-only CSV of items that could not be processed.
    pub failure_log: PathBuf,
    /// JSON record of the in-flight job.
    pub journal: PathBuf,
    /// Append-only TSV of finished jobs.
    pub session_log: PathBuf,
    /// Script file the shell loop executes for the next render.
    pub args_file: PathBuf,
    /// Suffix of the backup copy taken before a session.
    pub backup_suffix: BackupSuffix,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_file: PathBuf::from("__render_queue.txt"),
            failure_log: PathBuf::from("__render_queue_failed.csv"),
            journal: PathBuf::from(".rec_renderJobs.json"),
            session_log: PathBuf::from(".rec_renderLog.tsv"),
            args_file: PathBuf::from("__render_args.cmd"),
            backup_suffix: BackupSuffix::Tilde,
        }
    }
}

impl QueueConfig {
    /// Join every relative path onto `base`.
    pub fn resolved(&self, base: &Path) -> Self {
        let join = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                base.join(p)
            }
        };
        Self {
            queue_file: join(&self.queue_file),
            failure_log: join(&self.failure_log),
            journal: join(&self.journal),
            session_log: join(&self.session_log),
            args_file: join(&self.args_file),
            backup_suffix: self.backup_suffix,
        }
    }
}

/// Naming convention of the queue backup.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
pub enum BackupSuffix {
    /// `<queue>~`
    #[default]
    #[serde(rename = "~")]
    Tilde,
    /// `<queue>.bak`
    #[serde(rename = ".bak")]
    Bak,
}

impl BackupSuffix {
    /// Suffix appended to the full file name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tilde => "~",
            Self::Bak => ".bak",
        }
    }

    /// Backup path for `path`.
    pub fn sibling(self, path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(self.as_str());
        PathBuf::from(name)
    }
}

/// External batch renderer settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Directory holding `Render` and `mayabatch`. Falls back to `$MAYA_LOCATION/bin`.
    pub maya_bin: Option<PathBuf>,
    /// Project passed with `-proj`. Falls back to the shared drive.
    pub project_dir: Option<PathBuf>,
    /// Stem token selecting the Arnold renderer.
    pub arnold_token: String,
    /// Python statement `mayabatch` runs for non-Arnold scenes.
    pub batch_command: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            maya_bin: None,
            project_dir: None,
            arnold_token: "arnold".to_string(),
            batch_command: "import rec.renderFlair".to_string(),
        }
    }
}

impl RenderConfig {
    /// Directory of the Maya executables.
    pub fn maya_bin_dir(&self) -> PipelineResult<PathBuf> {
        if let Some(dir) = &self.maya_bin {
            return Ok(dir.clone());
        }
        std::env::var_os(MAYA_LOCATION_ENV)
            .map(|root| PathBuf::from(root).join("bin"))
            .ok_or_else(|| {
                PipelineError::validation(format!(
                    "render.maya_bin is unset and ${MAYA_LOCATION_ENV} is not defined"
                ))
            })
    }
}

impl PipelineConfig {
    /// Parse a JSON config file and resolve its queue paths next to it.
    pub fn from_path(path: &Path) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::filesystem("read config", path, e))?;
        let mut cfg: Self = serde_json::from_str(&text)
            .map_err(|e| PipelineError::serde(format!("{}: {e}", path.display())))?;
        cfg.validate()?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        cfg.queue = cfg.queue.resolved(base);
        Ok(cfg)
    }

    /// Config from `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> PipelineResult<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => {
                let cfg = Self::default();
                cfg.validate()?;
                Ok(cfg)
            }
        }
    }

    /// Reject settings that would produce unparseable filenames.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.show.is_empty() {
            return Err(PipelineError::validation("show must be non-empty"));
        }
        if self.show.contains(['/', '\\']) {
            return Err(PipelineError::validation(
                "show must not contain path separators",
            ));
        }
        if !self.version_indicator.is_ascii_alphabetic() {
            return Err(PipelineError::validation(
                "version_indicator must be an ASCII letter",
            ));
        }
        if let Some(unknown) = self
            .alembic_assets
            .iter()
            .find(|a| a.parse::<AssetName>().is_err())
        {
            return Err(PipelineError::validation(format!(
                "alembic_assets: unknown asset name '{unknown}'"
            )));
        }
        if self.render.arnold_token.is_empty() {
            return Err(PipelineError::validation(
                "render.arnold_token must be non-empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
