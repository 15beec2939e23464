//! 日志导出服务 - 业务能力层
//!
//! 把课程文件原文、GPA、总学分和每门课程的影响写入带时间戳的日志文件

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::error::AcquireResult;
use crate::models::Course;
use crate::services::gpa_service::GpaReport;

/// 日志文件名，例如 `20241019_153000.log`
pub fn log_file_name(now: DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S.log").to_string()
}

/// 单门课程的摘要行
pub fn course_summary_line(course: &Course, influence: f64) -> String {
    format!(
        "{}, credits: {}, score: {}, point: {}, influence: {:.2}",
        course.name, course.credit_hours, course.score, course.point, influence
    )
}

/// 生成日志内容
pub fn render_log(records: Option<&str>, courses: &[Course], report: &GpaReport) -> String {
    let mut out = String::new();
    if let Some(records) = records {
        out.push_str(records);
        out.push('\n');
    }
    out.push_str(&format!("{}\n", report.summary_line()));
    out.push_str(&format!("Total credits: {}\n", report.total_credits));
    out.push_str("Courses:\n");
    for (index, course) in courses.iter().enumerate() {
        out.push_str(&course_summary_line(course, report.influence_of(index)));
        out.push('\n');
    }
    out
}

/// 导出日志，返回写入的文件路径
///
/// 课程文件不存在时只记警告，其余内容照常导出
pub fn write_log(
    log_dir: &Path,
    courses_file: &Path,
    courses: &[Course],
    report: &GpaReport,
) -> AcquireResult<PathBuf> {
    let records = match fs::read_to_string(courses_file) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!("⚠️ 无法读取课程文件 {}: {}", courses_file.display(), e);
            None
        }
    };

    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(log_file_name(Local::now()));
    fs::write(&path, render_log(records.as_deref(), courses, report))?;

    info!("✓ GPA日志已保存为 {}", path.display());
    Ok(path)
}
