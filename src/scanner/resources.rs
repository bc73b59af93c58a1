// ============================================================================
// 未使用资源扫描 - 候选集构建 + 源文件全文搜索
// ============================================================================

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::patterns::{mentions, strip_comments};
use crate::progress::{batch_size, Observer, ProgressReporter};
use crate::project::file_kind::{self, TextKind};
use crate::project::{FileReference, ProjectModel};

/// 资源目录条目的标记文件
const CATALOG_MARKER: &str = "Contents.json";

static SCALE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\d+(?:\.\d+)?x").unwrap());

/// 未使用资源的检查对象
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    /// 资源目录条目没有可用作字面量的文件名
    pub file_name: Option<String>,
    variants: Vec<String>,
}

impl Resource {
    pub fn new(name: impl Into<String>, file_name: Option<String>) -> Self {
        let name = name.into();
        let mut variants: Vec<String> = Vec::new();
        let raw = [Some(name.as_str()), file_name.as_deref()];
        for candidate in raw.into_iter().flatten() {
            for variant in [Cow::Borrowed(candidate), SCALE_SUFFIX.replace_all(candidate, "")] {
                if !variant.is_empty() && !variants.iter().any(|v| v == &*variant) {
                    variants.push(variant.into_owned());
                }
            }
        }
        Self {
            name,
            file_name,
            variants,
        }
    }

    /// 原名、文件名及去掉 `@2x` 类后缀后的形式，去重且保持顺序
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or(&self.name)
    }
}

/// 构建候选集: 属于 target 的非源文件，以及资源目录中的条目
pub fn collect_candidates(model: &ProjectModel) -> Vec<Resource> {
    let mut candidates: Vec<Resource> = model
        .files()
        .iter()
        .filter(|file| is_resource_file(file))
        .filter_map(|file| {
            let file_name = file.file_name()?;
            let stem = file.path.file_stem()?.to_str()?;
            Some(Resource::new(stem, Some(file_name.to_string())))
        })
        .collect();

    for catalog in model.files().iter().filter(|file| file.is_asset_catalog()) {
        candidates.extend(catalog_items(&catalog.path));
    }

    candidates.retain(|resource| {
        let is_icon = resource.variants().iter().any(|variant| model.is_app_icon(variant));
        if is_icon {
            debug!(resource = resource.display_name(), "app icon is always used");
        }
        !is_icon
    });
    candidates
}

fn is_resource_file(file: &FileReference) -> bool {
    file.has_target_membership
        && !file.is_source_file()
        && !file.is_hidden()
        && !file.kind.as_deref().is_some_and(file_kind::is_non_resource_kind)
}

/// 资源目录下带扩展名且包含标记文件的子目录
fn catalog_items(catalog: &Path) -> Vec<Resource> {
    WalkDir::new(catalog)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| entry.path().join(CATALOG_MARKER).is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|extension| !extension.is_empty())
        })
        .filter_map(|entry| {
            let stem = entry.path().file_stem()?.to_str()?.to_string();
            Some(Resource::new(stem, None))
        })
        .collect()
}

/// 在所有存在的源文件中搜索候选资源，返回未被提及者的显示名
///
/// 文件分批并行读取与匹配；每批结束后在调用线程上移除已命中的候选并上报进度，
/// 结果与调度顺序无关。
pub fn unused_resources(model: &ProjectModel, observer: Option<Observer<'_>>) -> Vec<String> {
    let mut candidates = collect_candidates(model);
    let sources: Vec<(&FileReference, bool)> = model
        .files()
        .iter()
        .filter(|file| file.is_source_file() && file.path.exists())
        .map(|file| (file, model.is_info_plist(file)))
        .collect();

    info!(candidates = candidates.len(), sources = sources.len(), "scanning resource usage");

    let mut reporter = ProgressReporter::new(observer, sources.len());
    let mut index = 0;

    for batch in sources.chunks(batch_size()) {
        if candidates.is_empty() {
            break;
        }
        let matches: Vec<Vec<usize>> = batch
            .par_iter()
            .map(|(file, is_info_plist)| matched_candidates(file, *is_info_plist, &candidates))
            .collect();

        let mut used = vec![false; candidates.len()];
        for ((file, _), matched) in batch.iter().zip(matches) {
            let label = file.path.display().to_string();
            reporter.report(index, Some(&label));
            index += 1;
            for i in matched {
                used[i] = true;
            }
        }
        let mut flags = used.into_iter();
        candidates.retain(|_| !flags.next().unwrap_or(false));
    }

    candidates
        .iter()
        .map(|resource| resource.display_name().to_string())
        .collect()
}

/// 单个源文件中命中的候选下标
fn matched_candidates(file: &FileReference, is_info_plist: bool, candidates: &[Resource]) -> Vec<usize> {
    let bytes = match fs::read(&file.path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %file.path.display(), error = %e, "skipping unreadable source file");
            return Vec::new();
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    let kind: TextKind = file.text_kind();
    let text = strip_comments(&text, kind, is_info_plist);

    candidates
        .iter()
        .enumerate()
        .filter(|(_, resource)| {
            resource
                .variants()
                .iter()
                .any(|variant| mentions(&text, variant, kind))
        })
        .map(|(i, _)| i)
        .collect()
}
