use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::PointMode;

/// 默认配置文件
pub const DEFAULT_CONFIG_FILE: &str = "gpa_scrape.toml";

/// 登录页与成绩页的元素选择器
pub mod selectors {
    pub const USERNAME_INPUT: &str = "#input_username";
    pub const PASSWORD_INPUT: &str = "#input_password";
    pub const CAPTCHA_INPUT: &str = "#input_checkcode";
    pub const CAPTCHA_IMAGE: &str = "#captchaImg";
    pub const LOGIN_BUTTON: &str = "#loginButton";
    pub const TRANSCRIPT_TABS: &str = r#"[id^="tab"]"#;
}

/// 失败提示行（写入课程文件，读取时会被跳过）
pub mod sentinels {
    pub const LOGIN_REJECTED: &str = "账号或密码错误";
    pub const NO_TRANSCRIPT: &str = "您可能没有成绩，或者教务系统崩溃，请进入教务系统确认";
    /// 其它错误的前缀，后接错误信息
    pub const ACQUISITION_FAILED: &str = "抓取失败";
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 登录页地址
    pub login_url: String,
    /// 成绩页地址
    pub grades_url: String,
    /// 登录失败时地址中出现的标记
    pub bad_credentials_marker: String,
    /// 课程记录文件
    pub courses_file: PathBuf,
    /// 忽略词文件
    pub ignore_file: PathBuf,
    /// 账号密码文件
    pub credentials_file: PathBuf,
    /// 导出日志目录
    pub log_dir: PathBuf,
    /// 成绩页最大刷新次数
    pub max_refresh_times: usize,
    /// 验证码最大识别次数
    pub max_captcha_attempts: usize,
    /// 等待元素超时（秒）
    pub element_timeout_secs: u64,
    /// 页面加载后的等待（毫秒）
    pub page_settle_ms: u64,
    /// 点击登录前的等待（毫秒）
    pub login_settle_ms: u64,
    /// 程序自带的浏览器
    pub driver_path: PathBuf,
    /// 是否无头模式
    pub headless: bool,
    /// 直接使用绩点，不由成绩换算
    pub direct_point: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 验证码识别（OpenAI 兼容视觉模型） ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            login_url: "https://jwxt.imu.edu.cn/login".to_string(),
            grades_url: "https://jwxt.imu.edu.cn/student/integratedQuery/scoreQuery/allPassingScores/index?mobile=false".to_string(),
            bad_credentials_marker: "errorCode=badCredentials".to_string(),
            courses_file: PathBuf::from("courses.txt"),
            ignore_file: PathBuf::from("ignore_words.txt"),
            credentials_file: PathBuf::from("credentials.txt"),
            log_dir: PathBuf::from("."),
            max_refresh_times: 4,
            max_captcha_attempts: 4,
            element_timeout_secs: 10,
            page_settle_ms: 1000,
            login_settle_ms: 500,
            driver_path: PathBuf::from("msedge.exe"),
            headless: false,
            direct_point: false,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// 读取 TOML 配置文件（不存在则用默认值），再应用环境变量
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::from_env());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let base = toml::from_str::<Config>(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))?;
        Ok(base.with_overrides(|name| std::env::var(name).ok()))
    }

    /// 按变量名查找覆盖值；无法解析的数值保持原值
    fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = |name: &str| lookup(name);
        let path = |name: &str| lookup(name).map(PathBuf::from);
        Self {
            login_url: env("LOGIN_URL").unwrap_or(self.login_url),
            grades_url: env("GRADES_URL").unwrap_or(self.grades_url),
            bad_credentials_marker: env("BAD_CREDENTIALS_MARKER").unwrap_or(self.bad_credentials_marker),
            courses_file: path("COURSES_FILE").unwrap_or(self.courses_file),
            ignore_file: path("IGNORE_FILE").unwrap_or(self.ignore_file),
            credentials_file: path("CREDENTIALS_FILE").unwrap_or(self.credentials_file),
            log_dir: path("LOG_DIR").unwrap_or(self.log_dir),
            max_refresh_times: parsed(&lookup, "MAX_REFRESH_TIMES").unwrap_or(self.max_refresh_times),
            max_captcha_attempts: parsed(&lookup, "MAX_CAPTCHA_ATTEMPTS").unwrap_or(self.max_captcha_attempts),
            element_timeout_secs: parsed(&lookup, "ELEMENT_TIMEOUT_SECS").unwrap_or(self.element_timeout_secs),
            page_settle_ms: parsed(&lookup, "PAGE_SETTLE_MS").unwrap_or(self.page_settle_ms),
            login_settle_ms: parsed(&lookup, "LOGIN_SETTLE_MS").unwrap_or(self.login_settle_ms),
            driver_path: path("DRIVER_PATH").unwrap_or(self.driver_path),
            headless: parsed(&lookup, "HEADLESS").unwrap_or(self.headless),
            direct_point: parsed(&lookup, "USE_DIRECT_POINT").unwrap_or(self.direct_point),
            verbose_logging: parsed(&lookup, "VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
            llm_api_key: env("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: env("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: env("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
        }
    }

    pub fn point_mode(&self) -> PointMode {
        PointMode::from_flag(self.direct_point)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    pub fn login_settle(&self) -> Duration {
        Duration::from_millis(self.login_settle_ms)
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name)?.trim().parse().ok()
}
