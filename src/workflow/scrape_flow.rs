//! 成绩抓取流程 - 流程层
//!
//! 登录成功后反复打开成绩页，直到成绩标签页出现或刷新次数用尽。
//! 没有标签页时以当前地址区分两种情况：仍在成绩页则刷新；否则视为会话失效，重新登录。
//! 这个判断只看地址，地址不可靠时可能导致多余的重新登录。

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::{selectors, sentinels, Config};
use crate::error::{AcquireError, AcquireResult};
use crate::infrastructure::BrowserDriver;
use crate::models::transcript::{render_sections, TranscriptSection};
use crate::models::Credentials;
use crate::services::captcha_service::CaptchaClassifier;
use crate::services::ArtifactWriter;
use crate::workflow::login_flow::{LoginFlow, LoginOutcome};

/// 抓取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// 已覆盖写入课程文件
    Saved { sections: usize, courses: usize },
    /// 重新登录时账号被拒绝，已写入提示行
    Rejected,
    /// 刷新次数用尽，已写入提示行
    NoTranscript { attempts: usize },
}

impl ScrapeOutcome {
    /// 失败结果转为对应错误
    pub fn into_result(self) -> AcquireResult<(usize, usize)> {
        match self {
            ScrapeOutcome::Saved { sections, courses } => Ok((sections, courses)),
            ScrapeOutcome::Rejected => Err(AcquireError::LoginRejected),
            ScrapeOutcome::NoTranscript { attempts } => {
                Err(AcquireError::NoTranscriptFound { attempts })
            }
        }
    }
}

/// 成绩页设置
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub grades_url: String,
    pub max_refresh_times: usize,
    pub page_settle: Duration,
}

impl ScrapeSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            grades_url: config.grades_url.clone(),
            max_refresh_times: config.max_refresh_times,
            page_settle: config.page_settle(),
        }
    }
}

/// 成绩抓取流程
///
/// - 有界循环，尝试次数为 `max_refresh_times + 1`
/// - 会话失效时借用 `LoginFlow` 重新登录
/// - 不持有浏览器，关闭浏览器由编排层负责
pub struct ScrapeFlow<'a, C> {
    login: &'a LoginFlow<C>,
    writer: &'a ArtifactWriter,
    settings: ScrapeSettings,
}

impl<'a, C: CaptchaClassifier> ScrapeFlow<'a, C> {
    pub fn new(login: &'a LoginFlow<C>, writer: &'a ArtifactWriter, settings: ScrapeSettings) -> Self {
        Self {
            login,
            writer,
            settings,
        }
    }

    pub async fn run<D>(&self, driver: &D, credentials: &Credentials) -> AcquireResult<ScrapeOutcome>
    where
        D: BrowserDriver + ?Sized,
    {
        let max = self.settings.max_refresh_times;

        for attempt in 0..=max {
            info!("📄 打开成绩页 (第 {}/{} 次)", attempt + 1, max + 1);
            driver.navigate(&self.settings.grades_url).await?;
            sleep(self.settings.page_settle).await;

            let tabs = driver.read_tabs(selectors::TRANSCRIPT_TABS).await?;
            if !tabs.is_empty() {
                return self.save(&tabs);
            }

            if attempt == max {
                break;
            }

            let current = driver.current_url().await?;
            if current == self.settings.grades_url {
                warn!("⚠️ 成绩尚未加载，刷新页面");
                driver.refresh().await?;
                continue;
            }

            warn!("⚠️ 会话已失效 (当前地址: {})，重新登录", current);
            match self.login.run(driver, Some(credentials)).await {
                Ok(LoginOutcome::Authenticated) => {}
                Ok(LoginOutcome::Rejected) => {
                    self.writer.append_sentinel(sentinels::LOGIN_REJECTED)?;
                    return Ok(ScrapeOutcome::Rejected);
                }
                Err(e) if e.is_recoverable() => {
                    warn!("⚠️ 重新登录失败，稍后重试: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        warn!("❌ 刷新 {} 次后仍未找到成绩", max);
        self.writer.append_sentinel(sentinels::NO_TRANSCRIPT)?;
        Ok(ScrapeOutcome::NoTranscript { attempts: max + 1 })
    }

    fn save(&self, tabs: &[crate::models::ScrapedTab]) -> AcquireResult<ScrapeOutcome> {
        let sections: Vec<TranscriptSection> = tabs.iter().map(TranscriptSection::from_tab).collect();
        let courses = sections.iter().map(|s| s.rows.len()).sum();

        for section in &sections {
            info!("✓ {}: {} 门课程", section.label, section.rows.len());
        }

        self.writer.write_records(&render_sections(&sections))?;
        Ok(ScrapeOutcome::Saved {
            sections: sections.len(),
            courses,
        })
    }
}
