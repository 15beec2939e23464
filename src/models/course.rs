//! 课程记录模型

use serde::{Deserialize, Serialize};

use super::point_scale::{point_from_score, score_from_point};

/// 课程属性缺省值（手动添加的课程没有属性）
pub const UNKNOWN_ATTRIBUTE: &str = "-";

/// 绩点来源模式
///
/// 决定读入课程时以成绩还是以文件中的绩点为准
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointMode {
    /// 由成绩换算绩点
    #[default]
    FromScore,
    /// 直接使用记录中的绩点
    DirectPoint,
}

impl PointMode {
    pub fn from_flag(direct_point: bool) -> Self {
        if direct_point {
            PointMode::DirectPoint
        } else {
            PointMode::FromScore
        }
    }
}

/// 单门课程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// 课程名（不含空格）
    pub name: String,
    /// 课程属性（必修 / 选修 ...），计算中不使用
    pub attribute: String,
    /// 学分
    pub credit_hours: u32,
    /// 成绩
    pub score: f64,
    /// 绩点
    pub point: f64,
}

/// 外部对课程的单字段修改
#[derive(Debug, Clone, PartialEq)]
pub enum CourseEdit {
    Name(String),
    Credits(u32),
    /// 修改成绩，重新换算绩点
    Score(f64),
    /// 修改绩点，按区间下界反推成绩
    Point(f64),
}

impl Course {
    /// 按模式构造课程
    ///
    /// `FromScore` 下忽略传入的 `point`，`DirectPoint` 下原样采用。
    pub fn new(
        name: impl Into<String>,
        attribute: impl Into<String>,
        credit_hours: u32,
        score: f64,
        point: f64,
        mode: PointMode,
    ) -> Self {
        let point = match mode {
            PointMode::FromScore => point_from_score(score),
            PointMode::DirectPoint => point,
        };
        Self {
            name: escape_name(&name.into()),
            attribute: attribute.into(),
            credit_hours,
            score,
            point,
        }
    }

    /// 新增课程的默认行
    pub fn placeholder() -> Self {
        Self {
            name: "新课程".to_string(),
            attribute: UNKNOWN_ATTRIBUTE.to_string(),
            credit_hours: 0,
            score: 0.0,
            point: 0.0,
        }
    }

    /// 应用一次修改，返回字段一致的新课程
    pub fn apply_edit(&self, edit: CourseEdit) -> Course {
        let mut course = self.clone();
        match edit {
            CourseEdit::Name(name) => course.name = escape_name(&name),
            CourseEdit::Credits(credits) => course.credit_hours = credits,
            CourseEdit::Score(score) => {
                course.score = score;
                course.point = point_from_score(score);
            }
            CourseEdit::Point(point) => {
                course.point = point;
                course.score = score_from_point(point);
            }
        }
        course
    }
}

/// 课程名中的空白替换为连字符，保证记录行字段数不变
pub fn escape_name(name: &str) -> String {
    name.trim().replace(char::is_whitespace, "-")
}
