//! Xcode 工程加载
//!
//! 打开流程: 定位工程包 -> 读取 project.pbxproj -> 构建对象图索引 -> 解析为不可变模型。
//! 模型只构建一次，之后所有检查共享只读访问。

pub mod file_kind;
pub mod graph;
pub mod locator;
pub mod model;

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::plist;
pub use graph::ObjectGraph;
pub use locator::ProjectLocation;
pub use model::{BuildConfiguration, FileReference, GroupReference, ProductReference, ProjectModel};

/// 打开工程时的错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectError {
    /// 路径不存在，或目录中没有工程包
    #[error("project not found (searched directory: {searched_directory})")]
    NotFound { searched_directory: bool },

    /// 路径存在但不是可识别的工程
    #[error("incompatible project: {reason}")]
    Incompatible { reason: String },
}

impl ProjectError {
    pub fn incompatible(reason: impl Into<String>) -> Self {
        ProjectError::Incompatible {
            reason: reason.into(),
        }
    }
}

/// 已打开的工程
#[derive(Debug, Clone)]
pub struct XcodeProject {
    location: ProjectLocation,
    model: ProjectModel,
}

impl XcodeProject {
    /// 打开工程 (工程包路径或包含工程包的目录)
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let location = locator::locate(path.as_ref())?;

        let bytes = fs::read(&location.description_file).map_err(|e| {
            debug!(path = %location.description_file.display(), error = %e, "cannot read project description");
            ProjectError::incompatible("unsupported format")
        })?;
        let document = plist::parse(&bytes).map_err(|e| {
            debug!(path = %location.description_file.display(), error = %e, "cannot parse project description");
            ProjectError::incompatible("unsupported format")
        })?;
        let graph = ObjectGraph::from_document(&document)?;

        let root = match graph.project_dir_path() {
            Some(dir) => location.root.join(dir),
            None => location.root.clone(),
        };
        let model = ProjectModel::resolve(&graph, &root);

        info!(
            project = %location.bundle.display(),
            objects = graph.len(),
            files = model.files().len(),
            groups = model.groups().len(),
            targets = model.products().len(),
            "project resolved"
        );

        Ok(Self { location, model })
    }

    pub fn location(&self) -> &ProjectLocation {
        &self.location
    }

    pub fn model(&self) -> &ProjectModel {
        &self.model
    }

    /// 工程名 (不含扩展名)
    pub fn name(&self) -> String {
        self.location
            .bundle
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
