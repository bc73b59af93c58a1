//! 缺陷定义
//!
//! 所有缺陷的标识、结论与建议在此集中定义

use super::Defect;

/// 缺陷定义
#[derive(Debug, Clone)]
pub struct DefectDefinition {
    pub defect: Defect,
    /// 命令行与配置文件中使用的标识
    pub id: &'static str,
    /// 简短结论
    pub conclusion: &'static str,
    /// 修复建议
    pub help: &'static str,
    /// 需要读取文件内容 (耗时)
    pub reads_contents: bool,
}

static DEFINITIONS: [DefectDefinition; 7] = [
    DefectDefinition {
        defect: Defect::NonExistentFiles,
        id: "non-existent-files",
        conclusion: "non-existent file reference",
        help: "These files are referenced by the project but could not be found on disk. \
If a file was moved or renamed outside of Xcode, locate it again from the file inspector. \
If it was deleted on purpose, remove the reference from the project.",
        reads_contents: false,
    },
    DefectDefinition {
        defect: Defect::NonExistentPaths,
        id: "non-existent-paths",
        conclusion: "non-existent group path",
        help: "These groups point to folders that could not be found on disk. \
Files added to such a group resolve relative to the missing folder and easily become broken references. \
Update the location of each group, or turn it into a group without a folder.",
        reads_contents: false,
    },
    DefectDefinition {
        defect: Defect::CorruptPlists,
        id: "corrupt-plists",
        conclusion: "corrupt property list",
        help: "These property lists could not be parsed. \
A corrupt Info.plist or entitlements file usually breaks the build, or fails silently at runtime. \
Open each file in a text editor and repair the reported syntax error.",
        reads_contents: true,
    },
    DefectDefinition {
        defect: Defect::DanglingFiles,
        id: "dangling-files",
        conclusion: "dangling file",
        help: "These source files are not included in any target, so they are never compiled. \
Add each file to the target that needs it, or remove it from the project if it is no longer used.",
        reads_contents: false,
    },
    DefectDefinition {
        defect: Defect::EmptyGroups,
        id: "empty-groups",
        conclusion: "empty group",
        help: "These groups contain no files or subgroups. \
Empty groups only clutter the project navigator and can usually be removed.",
        reads_contents: false,
    },
    DefectDefinition {
        defect: Defect::EmptyTargets,
        id: "empty-targets",
        conclusion: "empty target",
        help: "These targets do not compile any source files. \
A target without sources can be legitimate, for example one that only runs scripts, \
but it is often a leftover that can be removed.",
        reads_contents: false,
    },
    DefectDefinition {
        defect: Defect::UnusedResources,
        id: "unused-resources",
        conclusion: "unused resource",
        help: "These resources are included in a target, but their names never appear in any source file. \
This check is a heuristic: a resource loaded through a name built at runtime is reported even though it is used. \
Verify each case before removing anything.",
        reads_contents: true,
    },
];

pub fn definition(defect: Defect) -> &'static DefectDefinition {
    &DEFINITIONS[defect as usize]
}

pub fn all_definitions() -> &'static [DefectDefinition] {
    &DEFINITIONS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definitions_line_up_with_defects() {
        for defect in Defect::ALL {
            assert_eq!(definition(defect).defect, defect);
        }
        assert_eq!(all_definitions().len(), Defect::ALL.len());
    }

    #[test]
    fn test_only_content_rules_are_slow() {
        let slow: Vec<Defect> = all_definitions()
            .iter()
            .filter(|d| d.reads_contents)
            .map(|d| d.defect)
            .collect();
        assert_eq!(slow, vec![Defect::CorruptPlists, Defect::UnusedResources]);
    }
}
