//! 资源使用扫描器
//!
//! 启发式全文搜索: 在剥离注释后的源文件中查找资源名称。
//! 误报 (运行时拼接的资源名) 与漏报 (偶然的子串碰撞) 都可能发生。

pub mod patterns;
pub mod resources;

pub use resources::{collect_candidates, unused_resources, Resource};
