// ============================================================================
// 对象图索引 - 把 objects 字典归类为强类型对象
// ============================================================================
//
// `objects` 中每个值是一个带 `isa` 标签的属性字典。这里在加载时一次性完成:
// 1. 按 isa 归类为 GraphObject (未知 isa 原样保留，解析时跳过)
// 2. 构建 child -> parent 索引，祖先遍历为 O(depth)

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use super::ProjectError;
use crate::plist::{Dictionary, Value};

/// 路径锚点 (sourceTree)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceTree {
    /// `<absolute>`
    Absolute,
    /// `<group>`，缺省值
    Group,
    /// `SOURCE_ROOT`
    SourceRoot,
    /// 空值、SDKROOT、DEVELOPER_DIR、BUILT_PRODUCTS_DIR 等无法落到真实路径的锚点
    Unresolvable(String),
}

impl SourceTree {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None | Some("<group>") => SourceTree::Group,
            Some("<absolute>") => SourceTree::Absolute,
            Some("SOURCE_ROOT") => SourceTree::SourceRoot,
            Some(other) => SourceTree::Unresolvable(other.to_string()),
        }
    }

    /// 祖先遍历在此类锚点处停止 (含该锚点)
    pub fn is_anchor(&self) -> bool {
        matches!(self, SourceTree::Absolute | SourceTree::SourceRoot)
    }
}

/// PBXFileReference
#[derive(Debug, Clone, PartialEq)]
pub struct FileObject {
    pub name: Option<String>,
    pub path: Option<String>,
    pub source_tree: SourceTree,
    pub explicit_file_type: Option<String>,
    pub last_known_file_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// PBXGroup
    Plain,
    /// PBXVariantGroup (本地化)
    Variant,
    /// XCVersionGroup (xcdatamodeld)
    Version,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupObject {
    pub kind: GroupKind,
    pub name: Option<String>,
    pub path: Option<String>,
    pub source_tree: SourceTree,
    /// None 表示缺少 children 属性
    pub children: Option<Vec<String>>,
}

impl GroupObject {
    /// 显示名: name，缺省时取 path
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.path.as_deref())
    }
}

/// 按 isa 归类后的对象
#[derive(Debug, Clone, PartialEq)]
pub enum GraphObject {
    Project {
        project_dir_path: Option<String>,
    },
    FileReference(FileObject),
    Group(GroupObject),
    NativeTarget {
        name: Option<String>,
        build_phases: Vec<String>,
    },
    SourcesBuildPhase {
        files: Vec<String>,
    },
    BuildFile {
        file_ref: Option<String>,
    },
    BuildConfiguration {
        name: Option<String>,
        build_settings: Dictionary,
    },
    /// 未识别的 isa，保留原始属性
    Unknown {
        isa: String,
        properties: Dictionary,
    },
}

impl GraphObject {
    pub fn from_properties(properties: &Dictionary) -> Self {
        let string = |key: &str| properties.get(key).and_then(Value::as_str).map(str::to_string);
        let ids = |key: &str| -> Option<Vec<String>> {
            properties.get(key).and_then(Value::as_array).map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
        };
        let group = |kind: GroupKind| {
            GraphObject::Group(GroupObject {
                kind,
                name: string("name"),
                path: string("path"),
                source_tree: SourceTree::from_raw(properties.get("sourceTree").and_then(Value::as_str)),
                children: ids("children"),
            })
        };

        let isa = properties.get("isa").and_then(Value::as_str).unwrap_or_default();
        match isa {
            "PBXProject" => GraphObject::Project {
                project_dir_path: string("projectDirPath"),
            },
            "PBXFileReference" => GraphObject::FileReference(FileObject {
                name: string("name"),
                path: string("path"),
                source_tree: SourceTree::from_raw(properties.get("sourceTree").and_then(Value::as_str)),
                explicit_file_type: string("explicitFileType"),
                last_known_file_type: string("lastKnownFileType"),
            }),
            "PBXGroup" => group(GroupKind::Plain),
            "PBXVariantGroup" => group(GroupKind::Variant),
            "XCVersionGroup" => group(GroupKind::Version),
            "PBXNativeTarget" => GraphObject::NativeTarget {
                name: string("name"),
                build_phases: ids("buildPhases").unwrap_or_default(),
            },
            "PBXSourcesBuildPhase" => GraphObject::SourcesBuildPhase {
                files: ids("files").unwrap_or_default(),
            },
            "PBXBuildFile" => GraphObject::BuildFile {
                file_ref: string("fileRef"),
            },
            "XCBuildConfiguration" => GraphObject::BuildConfiguration {
                name: string("name"),
                build_settings: properties
                    .get("buildSettings")
                    .and_then(Value::as_dictionary)
                    .cloned()
                    .unwrap_or_default(),
            },
            other => GraphObject::Unknown {
                isa: other.to_string(),
                properties: properties.clone(),
            },
        }
    }

    /// 子对象 id 列表 (只有容器对象有)
    pub fn children(&self) -> Option<&[String]> {
        match self {
            GraphObject::Group(group) => group.children.as_deref(),
            _ => None,
        }
    }

    /// 参与路径解析的 (path, sourceTree)
    pub fn location(&self) -> Option<(Option<&str>, &SourceTree)> {
        match self {
            GraphObject::Group(group) => Some((group.path.as_deref(), &group.source_tree)),
            GraphObject::FileReference(file) => Some((file.path.as_deref(), &file.source_tree)),
            _ => None,
        }
    }

    /// 视觉路径中的显示名
    pub fn display_name(&self) -> Option<&str> {
        match self {
            GraphObject::Group(group) => group.display_name(),
            GraphObject::FileReference(file) => file.name.as_deref().or(file.path.as_deref()),
            _ => None,
        }
    }
}

/// 对象图索引
#[derive(Debug, Clone)]
pub struct ObjectGraph {
    objects: BTreeMap<String, GraphObject>,
    parents: HashMap<String, String>,
}

impl ObjectGraph {
    /// 从 project.pbxproj 的值树构建；顶层不是 `{ objects = { ... } }` 时失败
    pub fn from_document(document: &Value) -> Result<Self, ProjectError> {
        let objects = document
            .get("objects")
            .and_then(Value::as_dictionary)
            .ok_or_else(|| ProjectError::incompatible("unsupported format"))?;

        let mut typed = BTreeMap::new();
        for (id, value) in objects {
            match value.as_dictionary() {
                Some(properties) => {
                    typed.insert(id.clone(), GraphObject::from_properties(properties));
                }
                None => debug!(id = %id, "skipping object that is not a dictionary"),
            }
        }

        Ok(Self::from_objects(typed))
    }

    /// 直接由对象集合构建，并一次性建立 parent 索引
    pub fn from_objects(objects: BTreeMap<String, GraphObject>) -> Self {
        let mut parents = HashMap::new();
        for (id, object) in &objects {
            let children = match object {
                GraphObject::Unknown { properties, .. } => properties
                    .get("children")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
                    .unwrap_or_default(),
                other => other.children().map(<[String]>::to_vec).unwrap_or_default(),
            };
            for child in children {
                // 多个父节点时按 id 顺序取第一个
                parents.entry(child).or_insert_with(|| id.clone());
            }
        }
        Self { objects, parents }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&GraphObject> {
        self.objects.get(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = (&str, &GraphObject)> {
        self.objects.iter().map(|(id, object)| (id.as_str(), object))
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    /// 祖先链 (由近及远，不含自身)
    ///
    /// 出现环时返回 None；指向不存在对象的 parent 终止遍历。
    pub fn ancestors(&self, id: &str) -> Option<Vec<(&str, &GraphObject)>> {
        let mut chain = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(id);

        let mut current = self.parent_of(id);
        while let Some(parent_id) = current {
            if !visited.insert(parent_id) {
                debug!(id = %id, "cyclic group membership");
                return None;
            }
            let Some(parent) = self.objects.get(parent_id) else {
                break;
            };
            chain.push((parent_id, parent));
            current = self.parent_of(parent_id);
        }
        Some(chain)
    }

    pub fn file_references(&self) -> impl Iterator<Item = (&str, &FileObject)> {
        self.objects().filter_map(|(id, object)| match object {
            GraphObject::FileReference(file) => Some((id, file)),
            _ => None,
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &GroupObject)> {
        self.objects().filter_map(|(id, object)| match object {
            GraphObject::Group(group) => Some((id, group)),
            _ => None,
        })
    }

    /// build file 直接引用的对象 id
    pub fn build_file_refs(&self) -> HashSet<&str> {
        self.objects()
            .filter_map(|(_, object)| match object {
                GraphObject::BuildFile { file_ref } => file_ref.as_deref(),
                _ => None,
            })
            .collect()
    }

    pub fn build_configurations(&self) -> impl Iterator<Item = (Option<&str>, &Dictionary)> {
        self.objects().filter_map(|(_, object)| match object {
            GraphObject::BuildConfiguration { name, build_settings } => {
                Some((name.as_deref(), build_settings))
            }
            _ => None,
        })
    }

    /// PBXProject 的 projectDirPath (非空时)
    pub fn project_dir_path(&self) -> Option<&str> {
        self.objects().find_map(|(_, object)| match object {
            GraphObject::Project { project_dir_path } => {
                project_dir_path.as_deref().filter(|p| !p.is_empty())
            }
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plist;

    fn graph(text: &str) -> ObjectGraph {
        let document = plist::parse(text.as_bytes()).unwrap();
        ObjectGraph::from_document(&document).unwrap()
    }

    #[test]
    fn test_classifies_objects_by_isa() {
        let graph = graph(
            r#"{ objects = {
                F1 = { isa = PBXFileReference; path = a.swift; sourceTree = "<group>"; };
                G1 = { isa = PBXGroup; children = (F1); name = Sources; sourceTree = "<group>"; };
                V1 = { isa = PBXVariantGroup; children = (); name = Main.storyboard; };
                X1 = { isa = PBXShellScriptBuildPhase; shellScript = "echo"; };
            }; }"#,
        );

        assert_eq!(graph.len(), 4);
        assert!(matches!(graph.get("F1"), Some(GraphObject::FileReference(_))));
        assert!(matches!(
            graph.get("V1"),
            Some(GraphObject::Group(GroupObject { kind: GroupKind::Variant, .. }))
        ));
        assert!(matches!(graph.get("X1"), Some(GraphObject::Unknown { isa, .. }) if isa == "PBXShellScriptBuildPhase"));
        assert_eq!(graph.parent_of("F1"), Some("G1"));
    }

    #[test]
    fn test_rejects_unexpected_shape() {
        let document = plist::parse(b"{ archiveVersion = 1; }").unwrap();
        assert_eq!(
            ObjectGraph::from_document(&document).unwrap_err(),
            ProjectError::incompatible("unsupported format")
        );
    }

    #[test]
    fn test_ancestors_walk_to_root() {
        let graph = graph(
            r#"{ objects = {
                R = { isa = PBXGroup; children = (A); };
                A = { isa = PBXGroup; children = (B); path = a; };
                B = { isa = PBXGroup; children = (F); path = b; };
                F = { isa = PBXFileReference; path = f.txt; };
            }; }"#,
        );

        let ids: Vec<&str> = graph.ancestors("F").unwrap().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["B", "A", "R"]);
    }

    #[test]
    fn test_ancestors_detect_cycles() {
        let graph = graph(
            r#"{ objects = {
                A = { isa = PBXGroup; children = (B); };
                B = { isa = PBXGroup; children = (A, F); };
                F = { isa = PBXFileReference; path = f.txt; };
            }; }"#,
        );

        assert_eq!(graph.ancestors("F"), None);
    }

    #[test]
    fn test_dangling_parent_ends_walk() {
        let mut objects = BTreeMap::new();
        objects.insert(
            "F".to_string(),
            GraphObject::FileReference(FileObject {
                name: None,
                path: Some("f".to_string()),
                source_tree: SourceTree::Group,
                explicit_file_type: None,
                last_known_file_type: None,
            }),
        );
        let mut graph = ObjectGraph::from_objects(objects);
        graph.parents.insert("F".to_string(), "MISSING".to_string());

        assert_eq!(graph.ancestors("F").map(|chain| chain.len()), Some(0));
    }

    #[test]
    fn test_source_tree_from_raw() {
        assert_eq!(SourceTree::from_raw(None), SourceTree::Group);
        assert_eq!(SourceTree::from_raw(Some("SOURCE_ROOT")), SourceTree::SourceRoot);
        assert_eq!(
            SourceTree::from_raw(Some("SDKROOT")),
            SourceTree::Unresolvable("SDKROOT".to_string())
        );
        assert!(SourceTree::Absolute.is_anchor());
        assert!(!SourceTree::Group.is_anchor());
    }
}
