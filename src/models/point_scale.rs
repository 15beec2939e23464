//! 成绩 ↔ 绩点换算表
//!
//! 纯函数，无状态。区间为闭区间，未落入任何区间的成绩（含 60 以下、100 以上、
//! 以及两个整数区间之间的小数分）一律换算为 0.0。

/// (下界, 上界, 绩点)，按绩点从高到低排列
const SCALE: [(f64, f64, f64); 10] = [
    (90.0, 100.0, 4.0),
    (85.0, 89.0, 3.7),
    (82.0, 84.0, 3.3),
    (78.0, 81.0, 3.0),
    (75.0, 77.0, 2.7),
    (72.0, 74.0, 2.3),
    (68.0, 71.0, 2.0),
    (65.0, 67.0, 1.7),
    (62.0, 64.0, 1.3),
    (60.0, 61.0, 1.0),
];

/// 由成绩计算绩点
pub fn point_from_score(score: f64) -> f64 {
    SCALE
        .iter()
        .find(|(low, high, _)| (*low..=*high).contains(&score))
        .map(|(_, _, point)| *point)
        .unwrap_or(0.0)
}

/// 由绩点反查成绩（返回所在区间的下界）
///
/// 只识别表中的 10 个绩点常量，精确匹配，不做容差。
pub fn score_from_point(point: f64) -> f64 {
    SCALE
        .iter()
        .find(|(_, _, p)| *p == point)
        .map(|(low, _, _)| *low)
        .unwrap_or(0.0)
}
