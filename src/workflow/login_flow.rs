//! 登录流程 - 流程层
//!
//! 状态机：Init → CredentialsLoaded → NavigatedToLogin → FieldsFilled
//! → CaptchaSolving → Submitted → { Authenticated | Rejected }
//!
//! 不持有浏览器，只借用 `BrowserDriver`。

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{selectors, Config};
use crate::error::{AcquireError, AcquireResult};
use crate::infrastructure::BrowserDriver;
use crate::models::Credentials;
use crate::services::captcha_service::{CaptchaClassifier, CaptchaResolver, CaptchaSource};

/// 登录状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Init,
    CredentialsLoaded,
    NavigatedToLogin,
    FieldsFilled,
    CaptchaSolving,
    Submitted,
    Authenticated,
    Rejected,
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoginState::Init => "初始化",
            LoginState::CredentialsLoaded => "已读取账号",
            LoginState::NavigatedToLogin => "已打开登录页",
            LoginState::FieldsFilled => "已填写账号密码",
            LoginState::CaptchaSolving => "识别验证码",
            LoginState::Submitted => "已提交",
            LoginState::Authenticated => "登录成功",
            LoginState::Rejected => "账号或密码错误",
        };
        f.write_str(name)
    }
}

/// 登录结果（终止状态）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated,
    Rejected,
}

/// 登录页相关设置
#[derive(Debug, Clone)]
pub struct LoginSettings {
    pub login_url: String,
    pub bad_credentials_marker: String,
    pub element_timeout: Duration,
    pub page_settle: Duration,
    pub login_settle: Duration,
}

impl LoginSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            login_url: config.login_url.clone(),
            bad_credentials_marker: config.bad_credentials_marker.clone(),
            element_timeout: config.element_timeout(),
            page_settle: config.page_settle(),
            login_settle: config.login_settle(),
        }
    }
}

/// 从登录页验证码图片获取新验证码
///
/// 每次先点击图片刷新，再等待可见并截图
pub struct DriverCaptchaSource<'a, D: ?Sized> {
    driver: &'a D,
    timeout: Duration,
    settle: Duration,
}

impl<'a, D: BrowserDriver + ?Sized> DriverCaptchaSource<'a, D> {
    pub fn new(driver: &'a D, timeout: Duration, settle: Duration) -> Self {
        Self {
            driver,
            timeout,
            settle,
        }
    }
}

#[async_trait]
impl<'a, D: BrowserDriver + ?Sized> CaptchaSource for DriverCaptchaSource<'a, D> {
    async fn fetch(&mut self) -> AcquireResult<Vec<u8>> {
        self.driver.click(selectors::CAPTCHA_IMAGE).await?;
        self.driver
            .wait_visible(selectors::CAPTCHA_IMAGE, self.timeout)
            .await?;
        sleep(self.settle).await;
        self.driver.screenshot_element(selectors::CAPTCHA_IMAGE).await
    }
}

/// 登录流程
///
/// - 编排登录页的填写、验证码、提交
/// - 不重试错误密码：被拒绝即终止
pub struct LoginFlow<C> {
    resolver: CaptchaResolver<C>,
    settings: LoginSettings,
}

impl<C: CaptchaClassifier> LoginFlow<C> {
    pub fn new(resolver: CaptchaResolver<C>, settings: LoginSettings) -> Self {
        Self { resolver, settings }
    }

    pub fn settings(&self) -> &LoginSettings {
        &self.settings
    }

    pub async fn run<D>(
        &self,
        driver: &D,
        credentials: Option<&Credentials>,
    ) -> AcquireResult<LoginOutcome>
    where
        D: BrowserDriver + ?Sized,
    {
        let mut state = LoginState::Init;

        // Init → CredentialsLoaded
        let credentials = credentials.ok_or(AcquireError::CredentialsMissing)?;
        advance(&mut state, LoginState::CredentialsLoaded);

        // CredentialsLoaded → NavigatedToLogin
        info!("🔐 打开登录页: {}", self.settings.login_url);
        driver.navigate(&self.settings.login_url).await?;
        driver
            .wait_visible(selectors::USERNAME_INPUT, self.settings.element_timeout)
            .await?;
        advance(&mut state, LoginState::NavigatedToLogin);

        // NavigatedToLogin → FieldsFilled
        driver
            .type_text(selectors::USERNAME_INPUT, &credentials.username)
            .await?;
        driver
            .wait_visible(selectors::PASSWORD_INPUT, self.settings.element_timeout)
            .await?;
        driver
            .type_text(selectors::PASSWORD_INPUT, &credentials.password)
            .await?;
        advance(&mut state, LoginState::FieldsFilled);

        // FieldsFilled → CaptchaSolving → Submitted
        advance(&mut state, LoginState::CaptchaSolving);
        debug!("验证码最多识别 {} 次", self.resolver.max_attempts());
        let mut source = DriverCaptchaSource::new(
            driver,
            self.settings.element_timeout,
            self.settings.page_settle,
        );
        let code = self.resolver.resolve_with_retry(&mut source).await?;
        driver
            .wait_visible(selectors::CAPTCHA_INPUT, self.settings.element_timeout)
            .await?;
        driver.type_text(selectors::CAPTCHA_INPUT, &code).await?;

        sleep(self.settings.login_settle).await;
        driver
            .wait_clickable(selectors::LOGIN_BUTTON, self.settings.element_timeout)
            .await?;
        driver.click(selectors::LOGIN_BUTTON).await?;
        advance(&mut state, LoginState::Submitted);

        // Submitted → Authenticated | Rejected
        sleep(self.settings.page_settle).await;
        let url = driver.current_url().await?;
        debug!("登录后地址: {}", url);
        if url.contains(&self.settings.bad_credentials_marker) {
            advance(&mut state, LoginState::Rejected);
            warn!("❌ 账号或密码错误");
            Ok(LoginOutcome::Rejected)
        } else {
            advance(&mut state, LoginState::Authenticated);
            info!("✓ 登录成功");
            Ok(LoginOutcome::Authenticated)
        }
    }
}

fn advance(state: &mut LoginState, next: LoginState) {
    debug!("登录状态: {} → {}", state, next);
    *state = next;
}
