//! GPA 计算 - 业务能力层
//!
//! 只读课程，不修改课程。总学分为 0 时 GPA 为 0，不报错。

use crate::models::Course;

/// 单门课程对 GPA 的影响
#[derive(Debug, Clone, PartialEq)]
pub struct CourseInfluence {
    /// 在输入列表中的位置
    pub index: usize,
    pub name: String,
    /// 含该课程的 GPA 减去不含该课程的 GPA
    pub influence: f64,
}

/// 计算结果
#[derive(Debug, Clone, PartialEq)]
pub struct GpaReport {
    pub gpa: f64,
    pub total_credits: u64,
    /// 与输入顺序一致
    pub influence: Vec<CourseInfluence>,
}

impl GpaReport {
    /// `GPA: 3.44 (3.44286)`
    pub fn summary_line(&self) -> String {
        format!("GPA: {:.2} ({:.5})", self.gpa, self.gpa)
    }

    pub fn influence_of(&self, index: usize) -> f64 {
        self.influence
            .get(index)
            .map(|i| i.influence)
            .unwrap_or(0.0)
    }
}

/// 计算 GPA 及每门课程的边际影响
///
/// 先求总学分与学分绩点和，再对每门课程 O(1) 求出去掉它之后的 GPA
pub fn compute(courses: &[Course]) -> GpaReport {
    let total_credits: u64 = courses.iter().map(|c| u64::from(c.credit_hours)).sum();
    let weighted_sum: f64 = courses
        .iter()
        .map(|c| f64::from(c.credit_hours) * c.point)
        .sum();

    let gpa = if total_credits > 0 {
        weighted_sum / total_credits as f64
    } else {
        0.0
    };

    let influence = courses
        .iter()
        .enumerate()
        .map(|(index, course)| {
            let remaining = total_credits - u64::from(course.credit_hours);
            let influence = if remaining > 0 {
                let without = (weighted_sum - f64::from(course.credit_hours) * course.point)
                    / remaining as f64;
                gpa - without
            } else {
                0.0
            };
            CourseInfluence {
                index,
                name: course.name.clone(),
                influence,
            }
        })
        .collect();

    GpaReport {
        gpa,
        total_credits,
        influence,
    }
}
