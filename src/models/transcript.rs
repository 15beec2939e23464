//! 成绩页抓取结果

use serde::{Deserialize, Serialize};

use super::course::escape_name;

/// 成绩表每行的有效单元格数
pub const TRANSCRIPT_CELLS: usize = 9;

/// 页面上的一个成绩标签页（原始单元格文本）
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ScrapedTab {
    /// `h4` 标题
    pub heading: String,
    /// 每行 `td` 的文本
    pub rows: Vec<Vec<String>>,
}

/// 一行成绩
///
/// 单元格顺序固定：序号、课程号、课序号、课程名、属性、学分、成绩、绩点、英文名
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptRow {
    pub seq: String,
    pub course_number: String,
    pub section_number: String,
    pub course_name: String,
    pub attribute: String,
    pub credit_hours: String,
    pub score: String,
    pub grade_point: String,
    pub english_name: String,
}

/// 行形状校验结果
#[derive(Debug, Clone, PartialEq)]
pub enum RowShape {
    Valid(TranscriptRow),
    /// 非空单元格数不为 9（表头、汇总行等）
    Malformed { non_empty: usize },
}

impl TranscriptRow {
    /// 校验单元格并构造成绩行
    pub fn from_cells(cells: &[String]) -> RowShape {
        let cells: Vec<&str> = cells
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();

        let [seq, course_number, section_number, course_name, attribute, credit_hours, score, grade_point, english_name] =
            match <[&str; TRANSCRIPT_CELLS]>::try_from(cells) {
                Ok(cells) => cells,
                Err(cells) => {
                    return RowShape::Malformed {
                        non_empty: cells.len(),
                    }
                }
            };

        RowShape::Valid(TranscriptRow {
            seq: seq.to_string(),
            course_number: course_number.to_string(),
            section_number: section_number.to_string(),
            course_name: escape_name(course_name),
            attribute: escape_name(attribute),
            credit_hours: credit_hours.to_string(),
            score: score.to_string(),
            grade_point: grade_point.to_string(),
            english_name: english_name.to_string(),
        })
    }

    /// 转为课程记录行
    ///
    /// 数值保持页面原文，由读取端负责校验。
    pub fn to_record_line(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.course_name, self.attribute, self.credit_hours, self.score, self.grade_point
        )
    }
}

/// 一个标签页的有效内容
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSection {
    pub label: String,
    pub rows: Vec<TranscriptRow>,
}

impl TranscriptSection {
    pub fn from_tab(tab: &ScrapedTab) -> Self {
        let rows = tab
            .rows
            .iter()
            .filter_map(|cells| match TranscriptRow::from_cells(cells) {
                RowShape::Valid(row) => Some(row),
                RowShape::Malformed { .. } => None,
            })
            .collect();
        Self {
            label: tab.heading.trim().to_string(),
            rows,
        }
    }
}

/// 渲染成绩文件内容：每个标签页先写标题行，再写课程行
pub fn render_sections(sections: &[TranscriptSection]) -> Vec<String> {
    let mut lines = Vec::new();
    for section in sections {
        if !section.label.is_empty() {
            lines.push(section.label.clone());
        }
        lines.extend(section.rows.iter().map(TranscriptRow::to_record_line));
    }
    lines
}
