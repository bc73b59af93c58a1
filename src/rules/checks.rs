// ============================================================================
// 简单规则 - 每个函数返回该缺陷的证据列表
// ============================================================================

use std::fs;

use rayon::prelude::*;
use tracing::debug;

use crate::plist::{self, PlistError};
use crate::progress::{batch_size, Observer, ProgressReporter};
use crate::project::{FileReference, ProjectModel};

/// 磁盘上不存在的文件引用
pub fn non_existent_files(model: &ProjectModel) -> Vec<String> {
    model
        .files()
        .iter()
        .filter(|file| !file.path.exists())
        .map(|file| file.path.display().to_string())
        .collect()
}

/// 指向不存在目录的分组
pub fn non_existent_paths(model: &ProjectModel) -> Vec<String> {
    model
        .groups()
        .iter()
        .filter_map(|group| group.path.as_ref())
        .filter(|path| !path.exists())
        .map(|path| path.display().to_string())
        .collect()
}

/// 不属于任何 target 的源文件 (头文件与 Info.plist 除外)
pub fn dangling_files(model: &ProjectModel) -> Vec<String> {
    model
        .files()
        .iter()
        .filter(|file| file.is_source_file() && !file.is_header_file())
        .filter(|file| !file.has_target_membership)
        .filter(|file| !(file.is_property_list() && model.is_info_plist(file)))
        .map(|file| file.path.display().to_string())
        .collect()
}

/// 没有子节点的分组
pub fn empty_groups(model: &ProjectModel) -> Vec<String> {
    model
        .groups()
        .iter()
        .filter(|group| !group.has_children)
        .map(|group| group.visual_path.clone())
        .collect()
}

/// 不编译源文件的 target
pub fn empty_targets(model: &ProjectModel) -> Vec<String> {
    model
        .products()
        .iter()
        .filter(|product| !product.builds_source_files)
        .map(|product| product.name.clone())
        .collect()
}

/// 无法解析的 plist，证据为 `路径: 错误描述`
///
/// 文件分批并行解析，结果按输入顺序合并，进度在调用线程上报。
pub fn corrupt_plists(model: &ProjectModel, observer: Option<Observer<'_>>) -> Vec<String> {
    let candidates: Vec<&FileReference> = model
        .files()
        .iter()
        .filter(|file| file.is_property_list())
        .collect();

    let mut reporter = ProgressReporter::new(observer, candidates.len());
    let mut cases = Vec::new();
    let mut index = 0;

    for batch in candidates.chunks(batch_size()) {
        let results: Vec<Option<String>> = batch.par_iter().map(|file| check_plist(file)).collect();
        for (file, result) in batch.iter().zip(results) {
            let label = file.path.display().to_string();
            reporter.report(index, Some(&label));
            index += 1;
            cases.extend(result);
        }
    }
    cases
}

fn check_plist(file: &FileReference) -> Option<String> {
    let bytes = match fs::read(&file.path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %file.path.display(), error = %e, "skipping unreadable property list");
            return None;
        }
    };
    match plist::validate(&bytes) {
        Ok(()) => None,
        Err(PlistError::Empty) if file.may_be_empty() => None,
        Err(error) => Some(format!("{}: {}", file.path.display(), error)),
    }
}
