//! CLI 模式处理器
//!
//! 默认输出人类可读的 Markdown，使用 --json 参数输出 JSON 格式

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::DoctorConfig;
use crate::progress::Progress;
use crate::project::XcodeProject;
use crate::rules::{self, definitions, suppression, Defect, Diagnosis};

/// CLI Commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// 🩺 检查工程缺陷
    Examine {
        /// 工程包或包含工程包的目录
        #[arg(default_value = ".")]
        path: PathBuf,

        /// 只检查指定缺陷 (可重复，默认全部)
        #[arg(short, long = "defect", value_enum)]
        defects: Vec<Defect>,

        /// 配置文件 (默认工程目录下的 .xcproj-doctor.yml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// 在 stderr 上显示耗时检查的进度
        #[arg(long)]
        progress: bool,
    },

    /// 📋 列出所有缺陷
    Defects,

    /// 📋 工程摘要
    Summary {
        /// 工程包或包含工程包的目录
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

/// 一次检查的完整报告
#[derive(Debug, Clone, Serialize)]
pub struct ExaminationReport {
    pub project: String,
    pub examined_at: String,
    pub diagnoses: Vec<DefectReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DefectReport {
    pub defect: Defect,
    #[serde(flatten)]
    pub diagnosis: Diagnosis,
}

/// 处理 CLI 命令
///
/// json_output: 是否输出 JSON 格式（默认 false，输出人类可读格式）
pub fn handle_command(cmd: Command, json_output: bool) -> Result<()> {
    let result = match cmd {
        Command::Examine {
            path,
            defects,
            config,
            progress,
        } => examine(&path, &defects, config.as_deref(), progress).and_then(|report| {
            if json_output {
                Ok(serde_json::to_value(&report)?)
            } else {
                Ok(Value::String(render_report(&report)))
            }
        }),

        Command::Defects => Ok(if json_output {
            defects_json()
        } else {
            Value::String(render_defects())
        }),

        Command::Summary { path } => summary(&path, json_output),
    };

    // 输出结果
    match result {
        Ok(value) => {
            if json_output {
                let output = json!({
                    "success": true,
                    "data": value
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_value(&value);
            }
        }
        Err(e) => {
            if json_output {
                let output = json!({
                    "success": false,
                    "error": format!("{e:#}")
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                eprintln!("Error: {e:#}");
            }
            std::process::exit(1);
        }
    }

    Ok(())
}

/// 打印 Value，字符串直接输出
fn print_value(value: &Value) {
    match value {
        Value::String(s) => println!("{}", s),
        _ => println!("{}", serde_json::to_string_pretty(value).unwrap_or_default()),
    }
}

/// 打开工程并依次检查缺陷 (默认全部，按声明顺序)
pub fn examine(
    path: &Path,
    defects: &[Defect],
    config: Option<&Path>,
    show_progress: bool,
) -> Result<ExaminationReport> {
    let project = XcodeProject::open(path)?;
    let config = DoctorConfig::discover(config, &project.location().root)
        .context("failed to load configuration")?;

    let requested: Vec<Defect> = if defects.is_empty() {
        Defect::ALL.to_vec()
    } else {
        Defect::ALL
            .into_iter()
            .filter(|defect| defects.contains(defect))
            .collect()
    };

    let mut diagnoses = Vec::new();
    for defect in requested {
        if !config.is_enabled(defect) {
            debug!(defect = %defect, "skipped by configuration");
            continue;
        }
        let diagnosis = if show_progress && defect.definition().reads_contents {
            let mut render = |progress: Progress<'_>| render_progress(defect, progress);
            rules::examine_with_progress(&project, defect, Some(&mut render))
        } else {
            rules::examine(&project, defect)
        };
        if let Some(diagnosis) = diagnosis.and_then(|d| suppression::apply(&config, defect, d)) {
            diagnoses.push(DefectReport { defect, diagnosis });
        }
    }

    Ok(ExaminationReport {
        project: project.name(),
        examined_at: Utc::now().to_rfc3339(),
        diagnoses,
    })
}

fn render_progress(defect: Defect, progress: Progress<'_>) {
    eprintln!(
        "[{defect}] {}/{} {}",
        progress.index + 1,
        progress.total,
        progress.label.unwrap_or_default()
    );
}

/// 人类可读报告
pub fn render_report(report: &ExaminationReport) -> String {
    let mut out = format!("## 🩺 {}\n", report.project);
    if report.diagnoses.is_empty() {
        out.push_str("\n✅ No defects found\n");
        return out;
    }
    for DefectReport { defect, diagnosis } in &report.diagnoses {
        out.push_str(&format!(
            "\n### {} ({})\n`{}`: {}\n\n",
            diagnosis.conclusion,
            diagnosis.cases.len(),
            defect,
            diagnosis.help
        ));
        for case in &diagnosis.cases {
            out.push_str(&format!("- {case}\n"));
        }
    }
    out
}

fn defects_json() -> Value {
    let defects: Vec<Value> = definitions::all_definitions()
        .iter()
        .map(|def| {
            json!({
                "defect": def.id,
                "conclusion": def.conclusion,
                "help": def.help,
                "reads_contents": def.reads_contents,
            })
        })
        .collect();
    json!(defects)
}

fn render_defects() -> String {
    let mut out = String::from("## 📋 Defects\n");
    for def in definitions::all_definitions() {
        out.push_str(&format!("\n- `{}`: {}\n  {}\n", def.id, def.conclusion, def.help));
    }
    out
}

/// 工程摘要
fn summary(path: &Path, json_output: bool) -> Result<Value> {
    let project = XcodeProject::open(path)?;
    let location = project.location();
    let model = project.model();

    let files = model.files().len();
    let members = model
        .files()
        .iter()
        .filter(|file| file.has_target_membership)
        .count();
    let groups = model.groups().len();
    let targets = model.products().len();
    let configurations = model.configurations().len();

    if json_output {
        return Ok(json!({
            "project": project.name(),
            "location": location,
            "files": files,
            "files_with_membership": members,
            "groups": groups,
            "targets": targets,
            "configurations": configurations,
        }));
    }

    Ok(Value::String(format!(
        "## 📋 {}\n\n\
        - Bundle: {}\n\
        - Root: {}\n\
        - Files: {} ({} in targets)\n\
        - Groups: {}\n\
        - Targets: {}\n\
        - Build configurations: {}",
        project.name(),
        location.bundle.display(),
        model.root().display(),
        files,
        members,
        groups,
        targets,
        configurations
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(diagnoses: Vec<DefectReport>) -> ExaminationReport {
        ExaminationReport {
            project: "Sample".to_string(),
            examined_at: "2024-01-01T00:00:00+00:00".to_string(),
            diagnoses,
        }
    }

    #[test]
    fn test_render_clean_report() {
        insta::assert_snapshot!(render_report(&report(Vec::new())).trim_end(), @r"
        ## 🩺 Sample

        ✅ No defects found
        ");
    }

    #[test]
    fn test_render_report_with_cases() {
        let diagnosis = Diagnosis {
            conclusion: "empty group".to_string(),
            help: "Remove it.".to_string(),
            cases: vec!["App/Empty".to_string(), "App/Old".to_string()],
        };
        let text = render_report(&report(vec![DefectReport {
            defect: Defect::EmptyGroups,
            diagnosis,
        }]));

        insta::assert_snapshot!(text.trim_end(), @r"
        ## 🩺 Sample

        ### empty group (2)
        `empty-groups`: Remove it.

        - App/Empty
        - App/Old
        ");
    }

    #[test]
    fn test_report_json_shape() {
        let diagnosis = Diagnosis {
            conclusion: "empty target".to_string(),
            help: "Add sources.".to_string(),
            cases: vec!["Widget".to_string()],
        };
        let value = serde_json::to_value(report(vec![DefectReport {
            defect: Defect::EmptyTargets,
            diagnosis,
        }]))
        .unwrap();

        assert_eq!(
            value["diagnoses"][0],
            json!({
                "defect": "empty-targets",
                "conclusion": "empty target",
                "help": "Add sources.",
                "cases": ["Widget"],
            })
        );
    }

    #[test]
    fn test_defects_listing_covers_all() {
        let listing = render_defects();
        for defect in Defect::ALL {
            assert!(listing.contains(&format!("`{}`", defect.id())));
        }
        assert_eq!(defects_json().as_array().map(Vec::len), Some(Defect::ALL.len()));
    }
}
