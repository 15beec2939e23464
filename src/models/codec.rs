//! 课程记录行编解码
//!
//! 行格式：`<课程名> <属性> <学分> <成绩> <绩点>`，以空白分隔。
//! 空行、含忽略词的行、字段不足 5 个的行（包括失败提示行）直接跳过；
//! 数值字段非法的行返回 `RecordError`，由调用方记录日志后跳过。

use tracing::{debug, warn};

use super::course::{escape_name, Course, PointMode};
use crate::error::RecordError;

/// 一行记录的解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Course(Course),
    /// 空行 / 忽略词 / 字段不足
    Skipped,
}

/// 解析单行
pub fn parse_line(
    raw: &str,
    ignore_words: &[String],
    mode: PointMode,
) -> Result<ParsedLine, RecordError> {
    let line = raw.trim();
    if line.is_empty() || ignore_words.iter().any(|w| !w.is_empty() && line.contains(w.as_str())) {
        return Ok(ParsedLine::Skipped);
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return Ok(ParsedLine::Skipped);
    }

    let malformed = |reason: String| RecordError::Malformed {
        line: line.to_string(),
        reason,
    };

    let credit_hours = fields[2]
        .parse::<u32>()
        .map_err(|e| malformed(format!("学分 '{}': {}", fields[2], e)))?;
    let score = fields[3]
        .parse::<f64>()
        .map_err(|e| malformed(format!("成绩 '{}': {}", fields[3], e)))?;
    let point = fields[4]
        .parse::<f64>()
        .map_err(|e| malformed(format!("绩点 '{}': {}", fields[4], e)))?;

    Ok(ParsedLine::Course(Course::new(
        fields[0],
        fields[1],
        credit_hours,
        score,
        point,
        mode,
    )))
}

/// 批量解析，坏行只记警告不中断
pub fn parse<S: AsRef<str>>(lines: &[S], ignore_words: &[String], mode: PointMode) -> Vec<Course> {
    let mut courses = Vec::new();
    for raw in lines {
        match parse_line(raw.as_ref(), ignore_words, mode) {
            Ok(ParsedLine::Course(course)) => courses.push(course),
            Ok(ParsedLine::Skipped) => debug!("跳过记录行: {}", raw.as_ref().trim()),
            Err(e) => warn!("⚠️ {}", e),
        }
    }
    courses
}

/// 序列化单门课程
pub fn serialize_course(course: &Course) -> String {
    let attribute = if course.attribute.trim().is_empty() {
        crate::models::course::UNKNOWN_ATTRIBUTE.to_string()
    } else {
        escape_name(&course.attribute)
    };
    format!(
        "{} {} {} {} {}",
        escape_name(&course.name),
        attribute,
        course.credit_hours,
        course.score,
        course.point
    )
}

/// 序列化课程列表
pub fn serialize(courses: &[Course]) -> Vec<String> {
    courses.iter().map(serialize_course).collect()
}
