// ============================================================================
// 工程模型解析 - 路径解析与 target 归属推断
// ============================================================================
//
// 在 ObjectGraph 上单遍解析出三类实体:
// - FileReference:    绝对路径、文件类型、是否属于某个 target
// - GroupReference:   可选的磁盘路径、视觉路径、是否有子节点
// - ProductReference: target 名称、是否编译源文件
// 以及保留 build configuration 供 Info.plist / App Icon 查询。
// 单个对象缺少必要属性时跳过，不会中断解析。

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::file_kind::{self, TextKind};
use super::graph::{FileObject, GraphObject, GroupKind, GroupObject, ObjectGraph, SourceTree};
use crate::plist::{Dictionary, Value};

/// 代表工程根目录的 build setting 变量
const SOURCE_ROOT_TOKENS: &[&str] = &["$(SRCROOT)", "${SRCROOT}", "$(PROJECT_DIR)", "${PROJECT_DIR}"];

const INFO_PLIST_SETTING: &str = "INFOPLIST_FILE";
const APP_ICON_SETTING: &str = "ASSETCATALOG_COMPILER_APPICON_NAME";

/// 解析后的文件引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReference {
    pub path: PathBuf,
    pub kind: Option<String>,
    pub has_target_membership: bool,
}

impl FileReference {
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }

    pub fn is_source_file(&self) -> bool {
        self.kind.as_deref().is_some_and(file_kind::is_source_kind)
    }

    pub fn is_header_file(&self) -> bool {
        self.kind.as_deref().is_some_and(file_kind::is_header_kind)
    }

    pub fn is_property_list(&self) -> bool {
        file_kind::is_property_list(self.kind.as_deref(), self.extension())
    }

    /// `.strings` / `.stringsdict` 允许为空文件
    pub fn may_be_empty(&self) -> bool {
        file_kind::may_be_empty(self.kind.as_deref(), self.extension())
    }

    pub fn is_asset_catalog(&self) -> bool {
        self.kind.as_deref() == Some(file_kind::ASSET_CATALOG_KIND)
    }

    pub fn is_hidden(&self) -> bool {
        self.file_name().is_some_and(|name| name.starts_with('.'))
    }

    pub fn text_kind(&self) -> TextKind {
        file_kind::text_kind(self.kind.as_deref())
    }
}

/// 解析后的分组
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReference {
    /// 虚拟分组 (无 path) 为 None
    pub path: Option<PathBuf>,
    /// 在工程导航中的位置，如 `App/Views/Cells`
    pub visual_path: String,
    pub name: String,
    pub has_children: bool,
}

/// 解析后的 target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductReference {
    pub name: String,
    pub builds_source_files: bool,
}

/// XCBuildConfiguration
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfiguration {
    pub name: Option<String>,
    pub build_settings: Dictionary,
}

impl BuildConfiguration {
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.build_settings.get(key).and_then(Value::as_str)
    }
}

/// 不可变的工程模型快照
#[derive(Debug, Clone)]
pub struct ProjectModel {
    root: PathBuf,
    files: Vec<FileReference>,
    groups: Vec<GroupReference>,
    products: Vec<ProductReference>,
    configurations: Vec<BuildConfiguration>,
}

impl ProjectModel {
    pub fn new(
        root: PathBuf,
        files: Vec<FileReference>,
        groups: Vec<GroupReference>,
        products: Vec<ProductReference>,
        configurations: Vec<BuildConfiguration>,
    ) -> Self {
        Self {
            root,
            files,
            groups,
            products,
            configurations,
        }
    }

    /// 单遍解析对象图
    pub fn resolve(graph: &ObjectGraph, root: &Path) -> Self {
        let resolver = Resolver {
            graph,
            root,
            build_file_refs: graph.build_file_refs(),
        };

        let files = graph
            .file_references()
            .filter_map(|(id, file)| resolver.file_reference(id, file))
            .collect();
        let groups = graph
            .groups()
            .filter(|(_, group)| group.kind != GroupKind::Version)
            .filter_map(|(id, group)| resolver.group_reference(id, group))
            .collect();
        let products = graph
            .objects()
            .filter_map(|(id, object)| resolver.product_reference(id, object))
            .collect();
        let configurations = graph
            .build_configurations()
            .map(|(name, settings)| BuildConfiguration {
                name: name.map(str::to_string),
                build_settings: settings.clone(),
            })
            .collect();

        Self::new(root.to_path_buf(), files, groups, products, configurations)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[FileReference] {
        &self.files
    }

    pub fn groups(&self) -> &[GroupReference] {
        &self.groups
    }

    pub fn products(&self) -> &[ProductReference] {
        &self.products
    }

    pub fn configurations(&self) -> &[BuildConfiguration] {
        &self.configurations
    }

    /// 是否有 build configuration 把该文件声明为 Info.plist
    pub fn is_info_plist(&self, file: &FileReference) -> bool {
        let path = file.path.to_string_lossy();
        self.configurations
            .iter()
            .filter_map(|config| config.setting(INFO_PLIST_SETTING))
            .map(|value| self.expand_source_root(value))
            .any(|value| !value.is_empty() && path.contains(value.as_str()))
    }

    /// 是否有 build configuration 把该名称声明为 App Icon
    pub fn is_app_icon(&self, name: &str) -> bool {
        self.configurations
            .iter()
            .filter_map(|config| config.setting(APP_ICON_SETTING))
            .any(|value| value == name)
    }

    fn expand_source_root(&self, value: &str) -> String {
        let root = self.root.to_string_lossy();
        SOURCE_ROOT_TOKENS
            .iter()
            .fold(value.to_string(), |acc, token| acc.replace(token, &root))
    }
}

struct Resolver<'g> {
    graph: &'g ObjectGraph,
    root: &'g Path,
    build_file_refs: HashSet<&'g str>,
}

impl<'g> Resolver<'g> {
    fn file_reference(&self, id: &str, file: &FileObject) -> Option<FileReference> {
        let kind = file
            .explicit_file_type
            .clone()
            .or_else(|| file.last_known_file_type.clone())
            .or_else(|| {
                let path = file.path.as_deref().or(file.name.as_deref())?;
                let extension = Path::new(path).extension()?.to_str()?;
                file_kind::kind_for_extension(extension).map(str::to_string)
            });
        if kind.as_deref().is_some_and(file_kind::is_excluded_kind) {
            return None;
        }

        let Some(ancestors) = self.graph.ancestors(id) else {
            debug!(id = %id, "skipping file reference inside a group cycle");
            return None;
        };
        let Some(declared) = file.path.as_deref() else {
            debug!(id = %id, "skipping file reference without a path");
            return None;
        };
        let path = self.resolve_path(declared, &file.source_tree, &ancestors)?;

        let has_target_membership = self.build_file_refs.contains(id)
            || ancestors
                .iter()
                .any(|(ancestor_id, _)| self.build_file_refs.contains(*ancestor_id));

        Some(FileReference {
            path,
            kind,
            has_target_membership,
        })
    }

    fn group_reference(&self, id: &str, group: &GroupObject) -> Option<GroupReference> {
        let Some(children) = group.children.as_ref() else {
            debug!(id = %id, "skipping group without children");
            return None;
        };
        let Some(name) = group.display_name() else {
            debug!(id = %id, "skipping group without name or path");
            return None;
        };
        let Some(ancestors) = self.graph.ancestors(id) else {
            debug!(id = %id, "skipping group inside a group cycle");
            return None;
        };

        let mut segments: Vec<&str> = vec![name];
        segments.extend(
            ancestors
                .iter()
                .filter_map(|(_, ancestor)| ancestor.display_name())
                .filter(|name| !name.is_empty()),
        );
        segments.reverse();
        let visual_path = segments.join("/");

        let path = group
            .path
            .as_deref()
            .and_then(|declared| self.resolve_path(declared, &group.source_tree, &ancestors));

        Some(GroupReference {
            path,
            visual_path,
            name: name.to_string(),
            has_children: !children.is_empty(),
        })
    }

    fn product_reference(&self, id: &str, object: &GraphObject) -> Option<ProductReference> {
        let GraphObject::NativeTarget { name, build_phases } = object else {
            return None;
        };
        let Some(name) = name else {
            debug!(id = %id, "skipping target without a name");
            return None;
        };

        let builds_source_files = build_phases.iter().any(|phase_id| {
            matches!(
                self.graph.get(phase_id),
                Some(GraphObject::SourcesBuildPhase { files }) if !files.is_empty()
            )
        });

        Some(ProductReference {
            name: name.clone(),
            builds_source_files,
        })
    }

    /// 按 sourceTree 解析声明路径
    fn resolve_path(
        &self,
        declared: &str,
        source_tree: &SourceTree,
        ancestors: &[(&str, &GraphObject)],
    ) -> Option<PathBuf> {
        let resolved = match source_tree {
            SourceTree::Unresolvable(_) => return None,
            SourceTree::Absolute | SourceTree::SourceRoot => PathBuf::from(declared),
            SourceTree::Group => group_relative_path(declared, ancestors)?,
        };

        let anchored = if resolved.is_absolute() {
            resolved
        } else {
            self.root.join(resolved)
        };
        Some(normalize(&anchored))
    }
}

/// 从近到远拼接祖先的 path，直到 SOURCE_ROOT / 绝对路径锚点 (含) 或根
fn group_relative_path(declared: &str, ancestors: &[(&str, &GraphObject)]) -> Option<PathBuf> {
    let mut segments = vec![declared];
    for (_, ancestor) in ancestors {
        let Some((path, source_tree)) = ancestor.location() else {
            continue;
        };
        if let Some(path) = path.filter(|p| !p.is_empty()) {
            if matches!(source_tree, SourceTree::Unresolvable(_)) {
                return None;
            }
            segments.push(path);
        }
        if source_tree.is_anchor() {
            break;
        }
    }
    segments.reverse();
    Some(segments.iter().collect())
}

/// 词法上消除 `.` 与 `..`
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
