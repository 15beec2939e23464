//! 应用入口 - 编排层
//!
//! 三个命令：抓取成绩、计算 GPA、导出日志。界面渲染只做最简单的文本表格。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::browser::ChromiumLauncher;
use crate::config::Config;
use crate::models::{load_courses, load_credentials, Course, PointMode};
use crate::orchestrator::acquisition::Acquisition;
use crate::services::captcha_service::VisionCaptchaClassifier;
use crate::services::{export_service, gpa_service, GpaReport};
use crate::workflow::ScrapeOutcome;

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 登录教务系统并抓取成绩到课程文件
    pub async fn scrape(&self) -> Result<ScrapeOutcome> {
        let credentials = load_credentials(&self.config.credentials_file).await;
        let classifier =
            VisionCaptchaClassifier::new(&self.config).context("初始化验证码识别失败")?;
        let launcher = ChromiumLauncher::new(&self.config);

        let mut acquisition = Acquisition::new(&self.config, launcher, classifier);
        let outcome = acquisition.run(credentials.as_ref()).await.context("爬取失败")?;

        match &outcome {
            ScrapeOutcome::Saved { sections, courses } => {
                info!("✅ 共 {} 个标签页，{} 门课程", sections, courses)
            }
            ScrapeOutcome::Rejected => warn!("❌ 账号或密码错误，未抓取成绩"),
            ScrapeOutcome::NoTranscript { attempts } => {
                warn!("❌ 尝试 {} 次未找到成绩，请进入教务系统确认", attempts)
            }
        }
        Ok(outcome)
    }

    /// 读入课程并计算 GPA
    pub async fn gpa(&self, file: Option<&Path>, mode: PointMode) -> Result<(Vec<Course>, GpaReport)> {
        let courses_file = file.unwrap_or(self.config.courses_file.as_path());
        let courses = load_courses(courses_file, &self.config.ignore_file, mode).await?;
        let report = gpa_service::compute(&courses);
        info!("{}  总学分: {}", report.summary_line(), report.total_credits);
        Ok((courses, report))
    }

    /// 计算 GPA 并导出日志
    pub async fn export(&self, file: Option<&Path>, mode: PointMode) -> Result<PathBuf> {
        let courses_file = file.unwrap_or(self.config.courses_file.as_path());
        let (courses, report) = self.gpa(Some(courses_file), mode).await?;
        let path = export_service::write_log(&self.config.log_dir, courses_file, &courses, &report)
            .context("保存日志失败")?;
        Ok(path)
    }
}

/// 渲染课程表格：课程名、学分、成绩、绩点、影响
pub fn render_table(courses: &[Course], report: &GpaReport) -> String {
    let mut out = format!(
        "{:<24} {:>4} {:>6} {:>5} {:>7}\n",
        "课程名", "学分", "成绩", "绩点", "影响"
    );
    for (index, course) in courses.iter().enumerate() {
        out.push_str(&format!(
            "{:<24} {:>4} {:>6} {:>5} {:>7.2}\n",
            course.name,
            course.credit_hours,
            course.score,
            course.point,
            report.influence_of(index)
        ));
    }
    out.push_str(&format!(
        "{}  总学分: {}\n",
        report.summary_line(),
        report.total_credits
    ));
    out
}
