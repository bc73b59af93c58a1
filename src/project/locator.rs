// ============================================================================
// 工程定位 - 找到 .xcodeproj 与其中的 project.pbxproj
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use serde::Serialize;

use super::ProjectError;

/// 工程包扩展名
pub const BUNDLE_EXTENSION: &str = "xcodeproj";

/// 工程包内的描述文件
pub const DESCRIPTION_FILE: &str = "project.pbxproj";

/// 定位结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectLocation {
    /// 工程包所在目录
    pub root: PathBuf,
    /// `.xcodeproj` 路径
    pub bundle: PathBuf,
    /// `project.pbxproj` 路径
    pub description_file: PathBuf,
}

/// 定位工程
///
/// `path` 可以是工程包本身，也可以是直接包含工程包的目录 (不递归)。
pub fn locate(path: &Path) -> Result<ProjectLocation, ProjectError> {
    if !path.exists() {
        return Err(ProjectError::NotFound {
            searched_directory: looks_like_directory(path),
        });
    }

    let bundle = if has_bundle_extension(path) {
        path.to_path_buf()
    } else if path.is_dir() {
        find_bundle(path)?.ok_or(ProjectError::NotFound {
            searched_directory: true,
        })?
    } else {
        return Err(ProjectError::incompatible("not a project"));
    };

    let description_file = bundle.join(DESCRIPTION_FILE);
    if !description_file.is_file() {
        return Err(ProjectError::incompatible("unsupported format"));
    }

    let bundle = fs::canonicalize(&bundle).unwrap_or(bundle);
    let root = bundle
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let description_file = bundle.join(DESCRIPTION_FILE);

    Ok(ProjectLocation {
        root,
        bundle,
        description_file,
    })
}

fn has_bundle_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(BUNDLE_EXTENSION)
}

/// 路径在字面上是否表示目录 (以分隔符结尾)
fn looks_like_directory(path: &Path) -> bool {
    let text = path.to_string_lossy();
    text.ends_with('/') || text.ends_with(MAIN_SEPARATOR)
}

/// 目录中第一个工程包 (按名称排序，结果与目录遍历顺序无关)
fn find_bundle(directory: &Path) -> Result<Option<PathBuf>, ProjectError> {
    let entries = fs::read_dir(directory)
        .map_err(|e| ProjectError::incompatible(format!("cannot read directory: {e}")))?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| has_bundle_extension(path))
        .collect();
    candidates.sort();

    Ok(candidates.into_iter().next())
}
