//! 成绩抓取入口 - 编排层
//!
//! ## 职责
//!
//! 1. **资源所有者**：唯一持有浏览器会话，按需启动
//! 2. **流程调度**：登录 → 抓取，任何失败都在课程文件中留下提示行
//! 3. **资源释放**：无论成功、被拒绝还是出错，结束时都关闭浏览器
//!
//! 调用方放弃（drop）进行中的 `run` 时，浏览器随 `Acquisition` 一起释放。

use tracing::{error, info, warn};

use crate::config::{sentinels, Config};
use crate::error::{AcquireError, AcquireResult};
use crate::infrastructure::{BrowserDriver, DriverLauncher};
use crate::models::Credentials;
use crate::services::captcha_service::{CaptchaClassifier, CaptchaResolver};
use crate::services::ArtifactWriter;
use crate::utils::logging;
use crate::workflow::{LoginFlow, LoginOutcome, LoginSettings, ScrapeFlow, ScrapeOutcome, ScrapeSettings};

/// 一次成绩抓取
pub struct Acquisition<L: DriverLauncher, C> {
    launcher: L,
    login: LoginFlow<C>,
    writer: ArtifactWriter,
    scrape_settings: ScrapeSettings,
    driver: Option<L::Driver>,
}

impl<L, C> Acquisition<L, C>
where
    L: DriverLauncher,
    C: CaptchaClassifier,
{
    pub fn new(config: &Config, launcher: L, classifier: C) -> Self {
        let resolver = CaptchaResolver::new(classifier, config.max_captcha_attempts);
        Self {
            launcher,
            login: LoginFlow::new(resolver, LoginSettings::from_config(config)),
            writer: ArtifactWriter::new(config.courses_file.clone()),
            scrape_settings: ScrapeSettings::from_config(config),
            driver: None,
        }
    }

    /// 浏览器会话是否存在
    pub fn has_session(&self) -> bool {
        self.driver.is_some()
    }

    /// 执行一次完整抓取
    pub async fn run(&mut self, credentials: Option<&Credentials>) -> AcquireResult<ScrapeOutcome> {
        logging::log_acquisition_start(
            &self.login.settings().login_url,
            self.scrape_settings.max_refresh_times,
        );

        let result = self.run_inner(credentials).await;
        self.teardown().await;

        match &result {
            Ok(outcome) => logging::log_acquisition_complete(&format!("{:?}", outcome)),
            Err(e) => {
                error!("❌ 抓取失败: {}", e);
                let line = format!("{}：{}", sentinels::ACQUISITION_FAILED, e);
                if let Err(write_err) = self.writer.append_sentinel(&line) {
                    warn!("⚠️ 写入失败提示行时出错: {}", write_err);
                }
            }
        }
        result
    }

    async fn run_inner(&mut self, credentials: Option<&Credentials>) -> AcquireResult<ScrapeOutcome> {
        // 账号缺失时不启动浏览器
        let credentials = credentials.ok_or(AcquireError::CredentialsMissing)?;

        let driver = match self.driver.take() {
            Some(driver) => driver,
            None => self.launcher.launch().await?,
        };
        let driver = &*self.driver.insert(driver);

        match self.login.run(driver, Some(credentials)).await? {
            LoginOutcome::Authenticated => {}
            LoginOutcome::Rejected => {
                self.writer.append_sentinel(sentinels::LOGIN_REJECTED)?;
                return Ok(ScrapeOutcome::Rejected);
            }
        }

        ScrapeFlow::new(&self.login, &self.writer, self.scrape_settings.clone())
            .run(driver, credentials)
            .await
    }

    async fn teardown(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            match driver.quit().await {
                Ok(()) => info!("✓ 浏览器已关闭"),
                Err(e) => warn!("⚠️ 关闭浏览器时出错: {}", e),
            }
        }
    }
}
