use std::{fmt, path::Path, str::FromStr};

use crate::foundation::error::{PipelineError, PipelineResult};

/// Short show token used as the filename prefix (`rec_abc010_...`).
pub const SHOW: &str = "rec";

const SEQUENCE_LEN: usize = 3;
const SHOT_CODE_LEN: usize = 6;

/// A production shot, e.g. `abc010` in `rec_abc010_lights_v003.mb`.
///
/// Shot codes are always exactly three sequence characters followed by three
/// digits. The number keeps its zero padding because directory names on the
/// shared drive use the padded form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShotId {
    show: String,
    sequence: String,
    number: String,
}

impl ShotId {
    /// Build a shot from its 6-character code (`abc010`).
    pub fn new(show: &str, code: &str) -> PipelineResult<Self> {
        if show.is_empty() {
            return Err(PipelineError::validation("show prefix must be non-empty"));
        }
        if code.chars().count() != SHOT_CODE_LEN {
            return Err(PipelineError::invalid_identifier(format!(
                "shot code '{code}' must be {SHOT_CODE_LEN} characters"
            )));
        }
        let split = code
            .char_indices()
            .nth(SEQUENCE_LEN)
            .map(|(i, _)| i)
            .unwrap_or(code.len());
        let (sequence, number) = code.split_at(split);
        if !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PipelineError::invalid_identifier(format!(
                "shot number '{number}' in '{code}' is not numeric"
            )));
        }
        Ok(Self {
            show: show.to_string(),
            sequence: sequence.to_string(),
            number: number.to_string(),
        })
    }

    /// Locate `<show>_` in `filename` and read the shot code right after it.
    ///
    /// The first occurrence of the prefix wins and matching is case-sensitive.
    pub fn from_filename(filename: &str, show: &str) -> PipelineResult<Self> {
        if show.is_empty() {
            return Err(PipelineError::validation("show prefix must be non-empty"));
        }
        let affix = format!("{show}_");
        let protocol_error = || {
            PipelineError::invalid_identifier(format!(
                "filename '{filename}' must contain '{affix}seq###'"
            ))
        };

        let (_, rest) = filename.split_once(&affix).ok_or_else(protocol_error)?;
        let code: String = rest.chars().take(SHOT_CODE_LEN).collect();
        Self::new(show, &code).map_err(|_| protocol_error())
    }

    /// Same as [`ShotId::from_filename`], reading the file stem of `path`.
    pub fn from_path(path: &Path, show: &str) -> PipelineResult<Self> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_filename(&stem, show)
    }

    /// Show token this shot belongs to.
    pub fn show(&self) -> &str {
        &self.show
    }

    /// Three-character sequence code.
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Zero-padded shot number.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Numeric value of the shot number.
    pub fn number_value(&self) -> u32 {
        // Validated as three ASCII digits in `new`.
        self.number.parse().unwrap_or_default()
    }

    /// Bare shot name, `<sequence><number>`.
    pub fn name(&self) -> String {
        format!("{}{}", self.sequence, self.number)
    }

    /// Show-qualified name, `<show>_<sequence><number>`.
    pub fn full_name(&self) -> String {
        format!("{}_{}{}", self.show, self.sequence, self.number)
    }
}

impl fmt::Display for ShotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.sequence, self.number)
    }
}

/// Characters and sets that get their own exported assets.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
pub enum AssetName {
    /// The mechanic character.
    #[serde(rename = "mechanic")]
    #[value(name = "mechanic")]
    Mechanic,
    /// The robot body.
    #[serde(rename = "robot")]
    #[value(name = "robot")]
    Robot,
    /// The robot's face rig, cached through Alembic.
    #[serde(rename = "robotFace")]
    #[value(name = "robotFace")]
    RobotFace,
    /// Arnold render layer scenes.
    #[serde(rename = "arnold")]
    #[value(name = "arnold")]
    Arnold,
}

impl AssetName {
    /// All known asset names.
    pub const ALL: [AssetName; 4] = [Self::Mechanic, Self::Robot, Self::RobotFace, Self::Arnold];

    /// On-disk spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mechanic => "mechanic",
            Self::Robot => "robot",
            Self::RobotFace => "robotFace",
            Self::Arnold => "arnold",
        }
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetName {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| PipelineError::invalid_identifier(format!("unknown asset name '{s}'")))
    }
}

/// Kind of exported asset.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
pub enum AssetType {
    /// Modelling master scene.
    #[serde(rename = "model")]
    #[value(name = "model")]
    Model,
    /// Rigged scene.
    #[serde(rename = "rig")]
    #[value(name = "rig")]
    Rig,
    /// Geometry cache.
    #[serde(rename = "cache")]
    #[value(name = "cache")]
    Cache,
    /// Lighting scene.
    #[serde(rename = "lights")]
    #[value(name = "lights")]
    Lights,
    /// Shot camera.
    #[serde(rename = "cam")]
    #[value(name = "cam")]
    Camera,
}

impl AssetType {
    /// All known asset types.
    pub const ALL: [AssetType; 5] = [
        Self::Model,
        Self::Rig,
        Self::Cache,
        Self::Lights,
        Self::Camera,
    ];

    /// On-disk spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Rig => "rig",
            Self::Cache => "cache",
            Self::Lights => "lights",
            Self::Camera => "cam",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| PipelineError::invalid_identifier(format!("unknown asset type '{s}'")))
    }
}

/// File extensions the pipeline reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileExt {
    /// `.ma`
    MayaAscii,
    /// `.mb`
    MayaBinary,
    /// `.mcx`
    MayaCache,
    /// `.abc`
    Alembic,
    /// `.xml`, the cache description written next to `.mcx` data.
    Xml,
}

impl FileExt {
    /// Extensions of Maya scene files.
    pub const MAYA_SCENES: [FileExt; 2] = [Self::MayaBinary, Self::MayaAscii];

    /// Extension including the leading dot.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MayaAscii => ".ma",
            Self::MayaBinary => ".mb",
            Self::MayaCache => ".mcx",
            Self::Alembic => ".abc",
            Self::Xml => ".xml",
        }
    }

    /// Case-sensitive match against the final extension of `path`.
    pub fn matches(self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == &self.as_str()[1..])
    }
}

impl fmt::Display for FileExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when `token` occurs in the stem of `path`.
pub fn in_filename(token: &str, path: &Path) -> bool {
    path.file_stem()
        .is_some_and(|stem| stem.to_string_lossy().contains(token))
}

/// True when `path` has any of `exts`.
pub fn has_any_extension(path: &Path, exts: &[FileExt]) -> bool {
    exts.iter().any(|ext| ext.matches(path))
}

#[cfg(test)]
#[path = "../../tests/unit/naming/ids.rs"]
mod tests;
