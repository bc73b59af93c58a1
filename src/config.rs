//! 可选的 YAML 配置
//!
//! ```yaml
//! skip: [unused-resources]
//! ignore:
//!   dangling-files: ["Scripts/"]
//! ```
//!
//! 未指定 `--config` 时读取工程根目录下的 `.xcproj-doctor.yml`，不存在则使用默认配置。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::rules::Defect;

/// 默认配置文件名
pub const FILE_NAME: &str = ".xcproj-doctor.yml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DoctorConfig {
    /// 永不检查的缺陷
    pub skip: Vec<Defect>,
    /// 缺陷 -> 需要忽略的证据子串
    pub ignore: BTreeMap<Defect, Vec<String>>,
}

impl DoctorConfig {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// 显式路径优先；否则查找工程根目录下的默认文件
    pub fn discover(explicit: Option<&Path>, root: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default = root.join(FILE_NAME);
        if default.is_file() {
            debug!(path = %default.display(), "loading configuration");
            Self::load(&default)
        } else {
            Ok(Self::default())
        }
    }

    pub fn is_enabled(&self, defect: Defect) -> bool {
        !self.skip.contains(&defect)
    }

    pub fn ignored(&self, defect: Defect) -> &[String] {
        self.ignore.get(&defect).map(Vec::as_slice).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config = DoctorConfig::from_yaml(
            "skip: [unused-resources]\nignore:\n  dangling-files: [\"Scripts/\"]\n",
        )
        .unwrap();

        assert!(!config.is_enabled(Defect::UnusedResources));
        assert!(config.is_enabled(Defect::DanglingFiles));
        assert_eq!(config.ignored(Defect::DanglingFiles), ["Scripts/"]);
        assert!(config.ignored(Defect::EmptyGroups).is_empty());
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(DoctorConfig::from_yaml("").unwrap(), DoctorConfig::default());
    }

    #[test]
    fn test_unknown_defect_is_rejected() {
        let error = DoctorConfig::from_yaml("skip: [missing-semicolons]").unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
        assert!(DoctorConfig::from_yaml("colour: red").is_err());
    }

    #[test]
    fn test_discover() {
        let dir = TempDir::new().unwrap();
        assert_eq!(DoctorConfig::discover(None, dir.path()).unwrap(), DoctorConfig::default());

        fs::write(dir.path().join(FILE_NAME), "skip: [empty-groups]").unwrap();
        let config = DoctorConfig::discover(None, dir.path()).unwrap();
        assert!(!config.is_enabled(Defect::EmptyGroups));

        let missing = dir.path().join("nope.yml");
        assert!(matches!(
            DoctorConfig::discover(Some(&missing), dir.path()),
            Err(ConfigError::Io { .. })
        ));
    }
}
