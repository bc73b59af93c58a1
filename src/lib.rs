// ============================================================================
// Xcode Project Doctor - Library Interface
// ============================================================================
//
// 打开 .xcodeproj 工程包，解析对象图，检查结构性缺陷。
// 可执行文件 (main.rs) 与集成测试都通过这些模块调用。

pub mod cli;
pub mod config;
pub mod plist;
pub mod progress;
pub mod project;
pub mod rules;
pub mod scanner;

pub use project::{ProjectError, XcodeProject};
pub use rules::{examine, examine_with_progress, Defect, Diagnosis};
