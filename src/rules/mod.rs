//! 缺陷检查注册中心
//!
//! 七种缺陷各自独立，每个检查都是工程模型 (加文件系统读取) 的纯函数，
//! 结果为零或一个 [`Diagnosis`]。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod checks;
pub mod definitions;
pub mod suppression;

use crate::progress::Observer;
use crate::project::XcodeProject;
use crate::scanner::resources;
pub use definitions::DefectDefinition;

/// 可检查的缺陷
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Defect {
    /// 引用的文件在磁盘上不存在
    NonExistentFiles,
    /// 分组指向的目录不存在
    NonExistentPaths,
    /// plist 无法解析
    CorruptPlists,
    /// 源文件不属于任何 target
    DanglingFiles,
    /// 分组没有子节点
    EmptyGroups,
    /// target 不编译任何源文件
    EmptyTargets,
    /// 资源名称从未在源文件中出现
    UnusedResources,
}

impl Defect {
    pub const ALL: [Defect; 7] = [
        Defect::NonExistentFiles,
        Defect::NonExistentPaths,
        Defect::CorruptPlists,
        Defect::DanglingFiles,
        Defect::EmptyGroups,
        Defect::EmptyTargets,
        Defect::UnusedResources,
    ];

    pub fn definition(self) -> &'static DefectDefinition {
        definitions::definition(self)
    }

    pub fn id(self) -> &'static str {
        self.definition().id
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Defect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Defect::ALL
            .into_iter()
            .find(|defect| defect.id() == s)
            .ok_or_else(|| format!("unknown defect '{s}'"))
    }
}

/// 诊断结果
///
/// `cases` 为人类可读的证据 (路径、target 名等)，永远非空。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub conclusion: String,
    pub help: String,
    pub cases: Vec<String>,
}

impl Diagnosis {
    /// 排序去重后构建；没有证据时返回 None
    pub fn from_cases(defect: Defect, cases: impl IntoIterator<Item = String>) -> Option<Self> {
        let mut cases: Vec<String> = cases.into_iter().collect();
        if cases.is_empty() {
            return None;
        }
        cases.sort();
        cases.dedup();

        let definition = defect.definition();
        Some(Diagnosis {
            conclusion: definition.conclusion.to_string(),
            help: definition.help.to_string(),
            cases,
        })
    }
}

/// 检查单个缺陷
pub fn examine(project: &XcodeProject, defect: Defect) -> Option<Diagnosis> {
    examine_with_progress(project, defect, None)
}

/// 检查单个缺陷，耗时检查通过 `observer` 上报进度
pub fn examine_with_progress(
    project: &XcodeProject,
    defect: Defect,
    observer: Option<Observer<'_>>,
) -> Option<Diagnosis> {
    let model = project.model();
    let cases = match defect {
        Defect::NonExistentFiles => checks::non_existent_files(model),
        Defect::NonExistentPaths => checks::non_existent_paths(model),
        Defect::CorruptPlists => checks::corrupt_plists(model, observer),
        Defect::DanglingFiles => checks::dangling_files(model),
        Defect::EmptyGroups => checks::empty_groups(model),
        Defect::EmptyTargets => checks::empty_targets(model),
        Defect::UnusedResources => resources::unused_resources(model, observer),
    };
    Diagnosis::from_cases(defect, cases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defect_ids_round_trip() {
        for defect in Defect::ALL {
            assert_eq!(defect.id().parse::<Defect>(), Ok(defect));
        }
        assert!("bogus".parse::<Defect>().is_err());
    }

    #[test]
    fn test_defect_ids_match_serde_names() {
        for defect in Defect::ALL {
            let json = serde_json::to_string(&defect).unwrap();
            assert_eq!(json, format!("\"{}\"", defect.id()));
        }
    }

    #[test]
    fn test_diagnosis_requires_cases() {
        assert_eq!(Diagnosis::from_cases(Defect::EmptyGroups, Vec::new()), None);
    }

    #[test]
    fn test_diagnosis_cases_sorted_and_deduplicated() {
        let diagnosis = Diagnosis::from_cases(
            Defect::EmptyTargets,
            vec!["b".to_string(), "a".to_string(), "b".to_string()],
        )
        .unwrap();

        assert_eq!(diagnosis.cases, vec!["a", "b"]);
        assert_eq!(diagnosis.conclusion, Defect::EmptyTargets.definition().conclusion);
    }
}
