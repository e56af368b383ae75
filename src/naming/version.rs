use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use crate::{
    foundation::error::{PipelineError, PipelineResult},
    naming::ids::{AssetName, AssetType, FileExt, ShotId, in_filename},
};

/// Character that introduces the version number at the end of a stem.
pub const VERSION_INDICATOR: char = 'v';
/// Asset names whose caches are exported through Alembic instead of `.mcx`.
pub const DEFAULT_ALEMBIC_ASSETS: [&str; 1] = ["robotFace"];

const VERSION_WIDTH: usize = 3;

/// `<shot.full_name>_[<asset_name>_]<asset_type>`.
pub fn filename_base(shot: &ShotId, asset_name: Option<AssetName>, asset_type: AssetType) -> String {
    match asset_name {
        Some(name) => format!("{}_{}_{}", shot.full_name(), name, asset_type),
        None => format!("{}_{}", shot.full_name(), asset_type),
    }
}

/// `<base>_<suffix>`, without extension.
pub fn versioned_filename(base: &str, suffix: &str) -> String {
    format!("{base}_{suffix}")
}

/// Extensions that belong to one kind of asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionRule {
    exts: Vec<FileExt>,
}

impl ExtensionRule {
    /// Scenes for everything except caches; caches are `.mcx`/`.xml`, unless
    /// the asset name is listed in `alembic_assets`, in which case only `.abc`.
    pub fn for_asset<S: AsRef<str>>(
        asset_type: AssetType,
        asset_name: Option<AssetName>,
        alembic_assets: &[S],
    ) -> Self {
        let exts = if asset_type != AssetType::Cache {
            FileExt::MAYA_SCENES.to_vec()
        } else if asset_name
            .is_some_and(|n| alembic_assets.iter().any(|a| a.as_ref() == n.as_str()))
        {
            vec![FileExt::Alembic]
        } else {
            vec![FileExt::MayaCache, FileExt::Xml]
        };
        Self { exts }
    }

    /// Accepted extensions.
    pub fn exts(&self) -> &[FileExt] {
        &self.exts
    }

    /// True when `path` has one of the accepted extensions.
    pub fn matches(&self, path: &Path) -> bool {
        self.exts.iter().any(|ext| ext.matches(path))
    }
}

/// Selects the files of one asset: stem contains the filename base and the
/// extension satisfies the asset's [`ExtensionRule`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetValidator {
    base: String,
    rule: ExtensionRule,
}

impl AssetValidator {
    /// Validator from an explicit base and rule.
    pub fn new(base: impl Into<String>, rule: ExtensionRule) -> Self {
        Self {
            base: base.into(),
            rule,
        }
    }

    /// Validator for `shot`'s asset, deriving the base and the extension rule.
    pub fn for_asset<S: AsRef<str>>(
        shot: &ShotId,
        asset_name: Option<AssetName>,
        asset_type: AssetType,
        alembic_assets: &[S],
    ) -> Self {
        Self::new(
            filename_base(shot, asset_name, asset_type),
            ExtensionRule::for_asset(asset_type, asset_name, alembic_assets),
        )
    }

    /// Filename base this validator matches on.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Extension rule this validator matches on.
    pub fn rule(&self) -> &ExtensionRule {
        &self.rule
    }

    /// True when `path` belongs to the asset.
    pub fn matches(&self, path: &Path) -> bool {
        in_filename(&self.base, path) && self.rule.matches(path)
    }
}

/// Next `v###` suffix for the asset described by `validator`.
///
/// Versions on disk are assumed to be zero-padded to three digits, so the
/// lexicographically greatest matching stem is the latest one. Returns `v001`
/// when nothing matches.
pub fn next_version_suffix<P: AsRef<Path>>(
    validator: &AssetValidator,
    files: impl IntoIterator<Item = P>,
) -> PipelineResult<String> {
    next_version_suffix_with(validator, files, VERSION_INDICATOR)
}

/// [`next_version_suffix`] with a custom version indicator.
pub fn next_version_suffix_with<P: AsRef<Path>>(
    validator: &AssetValidator,
    files: impl IntoIterator<Item = P>,
    indicator: char,
) -> PipelineResult<String> {
    let stems: BTreeSet<String> = files
        .into_iter()
        .filter(|f| validator.matches(f.as_ref()))
        .filter_map(|f| {
            f.as_ref()
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .collect();

    let current = match stems.last() {
        Some(stem) => parse_version(stem, indicator)?,
        None => 0,
    };
    let next = current.saturating_add(1);
    if next > 999 {
        tracing::warn!(
            base = validator.base(),
            next,
            "version exceeds three digits; lexicographic ordering no longer holds"
        );
    }

    Ok(format!("{indicator}{next:0width$}", width = VERSION_WIDTH))
}

/// Version number after the last `indicator` in `stem`.
pub fn parse_version(stem: &str, indicator: char) -> PipelineResult<u32> {
    let (_, tail) = stem.rsplit_once(indicator).ok_or_else(|| {
        PipelineError::invalid_identifier(format!(
            "'{stem}' has no '{indicator}###' version suffix"
        ))
    })?;
    tail.parse::<u32>().map_err(|_| {
        PipelineError::invalid_identifier(format!(
            "'{stem}' has a non-numeric version '{tail}'"
        ))
    })
}

/// Latest existing file of the asset, i.e. the last match in sorted order.
pub fn latest_version<P: AsRef<Path>>(
    validator: &AssetValidator,
    files: impl IntoIterator<Item = P>,
) -> Option<PathBuf> {
    files
        .into_iter()
        .map(|f| f.as_ref().to_path_buf())
        .filter(|f| validator.matches(f))
        .max()
}

/// `<base>_<next suffix>` for the asset described by `validator`.
pub fn next_versioned_filename<P: AsRef<Path>>(
    validator: &AssetValidator,
    files: impl IntoIterator<Item = P>,
    indicator: char,
) -> PipelineResult<String> {
    let suffix = next_version_suffix_with(validator, files, indicator)?;
    Ok(versioned_filename(validator.base(), &suffix))
}

#[cfg(test)]
#[path = "../../tests/unit/naming/version.rs"]
mod tests;
