//! 证据抑制
//!
//! 配置文件的 `ignore` 段为每个缺陷列出子串，包含任一子串的证据被丢弃。
//! 全部证据都被抑制时整条诊断一并丢弃。

use tracing::debug;

use super::{Defect, Diagnosis};
use crate::config::DoctorConfig;

/// 按配置过滤诊断
pub fn apply(config: &DoctorConfig, defect: Defect, diagnosis: Diagnosis) -> Option<Diagnosis> {
    filter_cases(diagnosis, config.ignored(defect))
}

fn filter_cases(mut diagnosis: Diagnosis, patterns: &[String]) -> Option<Diagnosis> {
    if patterns.is_empty() {
        return Some(diagnosis);
    }
    let before = diagnosis.cases.len();
    diagnosis
        .cases
        .retain(|case| !patterns.iter().any(|pattern| case.contains(pattern.as_str())));

    let suppressed = before - diagnosis.cases.len();
    if suppressed > 0 {
        debug!(conclusion = %diagnosis.conclusion, suppressed, "suppressed cases");
    }
    if diagnosis.cases.is_empty() {
        None
    } else {
        Some(diagnosis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnosis(cases: &[&str]) -> Diagnosis {
        Diagnosis::from_cases(Defect::DanglingFiles, cases.iter().map(|c| c.to_string())).unwrap()
    }

    #[test]
    fn test_substring_suppression() {
        let config = DoctorConfig::from_yaml("ignore:\n  dangling-files: [\"Scripts/\"]").unwrap();
        let result = apply(
            &config,
            Defect::DanglingFiles,
            diagnosis(&["/p/Scripts/gen.swift", "/p/App/Orphan.swift"]),
        )
        .unwrap();

        assert_eq!(result.cases, vec!["/p/App/Orphan.swift"]);
    }

    #[test]
    fn test_fully_suppressed_diagnosis_is_dropped() {
        let config = DoctorConfig::from_yaml("ignore:\n  dangling-files: [\".swift\"]").unwrap();
        assert_eq!(apply(&config, Defect::DanglingFiles, diagnosis(&["/p/a.swift"])), None);
    }

    #[test]
    fn test_patterns_are_per_defect() {
        let config = DoctorConfig::from_yaml("ignore:\n  empty-groups: [\"a\"]").unwrap();
        let original = diagnosis(&["/p/a.swift"]);
        assert_eq!(
            apply(&config, Defect::DanglingFiles, original.clone()),
            Some(original)
        );
    }
}
