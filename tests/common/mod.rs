//! 集成测试共用的假浏览器与假识别器
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gpa_scrape::config::selectors;
use gpa_scrape::error::{AcquireError, AcquireResult};
use gpa_scrape::infrastructure::{BrowserDriver, DriverLauncher};
use gpa_scrape::models::ScrapedTab;
use gpa_scrape::services::CaptchaClassifier;
use gpa_scrape::Config;

/// 测试用配置：去掉所有等待
pub fn test_config(dir: &Path) -> Config {
    Config {
        courses_file: dir.join("courses.txt"),
        ignore_file: dir.join("ignore_words.txt"),
        credentials_file: dir.join("credentials.txt"),
        log_dir: dir.join("logs"),
        page_settle_ms: 0,
        login_settle_ms: 0,
        ..Config::default()
    }
}

pub fn grades_url() -> String {
    Config::default().grades_url
}

pub fn login_url() -> String {
    Config::default().login_url
}

pub fn rejected_url() -> String {
    "https://jwxt.imu.edu.cn/login?errorCode=badCredentials".to_string()
}

pub fn cells(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// 一个含两门课程的标签页
pub fn sample_tab() -> ScrapedTab {
    ScrapedTab {
        heading: "必修课程".to_string(),
        rows: vec![
            Vec::new(),
            cells(&["1", "0301001", "01", "Calculus I", "elective", "4", "92", "4.0", "Calculus"]),
            cells(&["2", "0302001", "01", "Physics-II", "elective", "3", "76", "2.7", "Physics"]),
            cells(&["合计", "7"]),
        ],
    }
}

/// 假浏览器的剧本
#[derive(Debug, Default, Clone)]
pub struct Script {
    /// 点击登录按钮后的地址
    pub after_login_url: String,
    /// 第 n 次点击登录按钮后的地址，超出部分为 `after_login_url`
    pub after_login_urls: Vec<String>,
    /// 第 n 次打开登录页时用户名输入框不出现（从 0 计）
    pub stalled_logins: Vec<usize>,
    /// 第 n 次读取标签页的结果，超出部分为空
    pub tabs_per_load: Vec<Vec<ScrapedTab>>,
    /// 第 n 次打开成绩页后的实际地址，超出部分为成绩页本身
    pub urls_after_grades: Vec<String>,
    /// 永远等不到的元素
    pub missing_selectors: Vec<String>,
}

impl Script {
    pub fn authenticated() -> Self {
        Self {
            after_login_url: "https://jwxt.imu.edu.cn/index".to_string(),
            ..Self::default()
        }
    }

    pub fn rejected() -> Self {
        Self {
            after_login_url: rejected_url(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub log: Vec<String>,
    pub current_url: String,
    pub grades_loads: usize,
    pub login_loads: usize,
    pub login_clicks: usize,
    pub tab_reads: usize,
    pub quit: bool,
}

impl FakeState {
    pub fn count(&self, prefix: &str) -> usize {
        self.log.iter().filter(|l| l.starts_with(prefix)).count()
    }
}

#[derive(Clone)]
pub struct FakeDriver {
    script: Arc<Script>,
    state: Arc<Mutex<FakeState>>,
}

impl FakeDriver {
    pub fn new(script: Script) -> Self {
        Self {
            script: Arc::new(script),
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    pub fn state(&self) -> Arc<Mutex<FakeState>> {
        self.state.clone()
    }

    fn record(&self, entry: String) {
        self.state.lock().unwrap().log.push(entry);
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    async fn navigate(&self, url: &str) -> AcquireResult<()> {
        let mut state = self.state.lock().unwrap();
        state.log.push(format!("navigate {}", url));
        state.current_url = if url == grades_url() {
            let landed = self
                .script
                .urls_after_grades
                .get(state.grades_loads)
                .cloned()
                .unwrap_or_else(|| url.to_string());
            state.grades_loads += 1;
            landed
        } else {
            if url == login_url() {
                state.login_loads += 1;
            }
            url.to_string()
        };
        Ok(())
    }

    async fn wait_visible(&self, selector: &str, timeout: Duration) -> AcquireResult<()> {
        let stalled = selector == selectors::USERNAME_INPUT && {
            let state = self.state.lock().unwrap();
            state.login_loads > 0 && self.script.stalled_logins.contains(&(state.login_loads - 1))
        };
        if stalled || self.script.missing_selectors.iter().any(|s| s == selector) {
            return Err(AcquireError::ElementTimeout {
                selector: selector.to_string(),
                secs: timeout.as_secs(),
            });
        }
        Ok(())
    }

    async fn wait_clickable(&self, selector: &str, timeout: Duration) -> AcquireResult<()> {
        self.wait_visible(selector, timeout).await
    }

    async fn type_text(&self, selector: &str, text: &str) -> AcquireResult<()> {
        self.record(format!("type {} {}", selector, text));
        Ok(())
    }

    async fn click(&self, selector: &str) -> AcquireResult<()> {
        let mut state = self.state.lock().unwrap();
        state.log.push(format!("click {}", selector));
        if selector == selectors::LOGIN_BUTTON {
            state.current_url = self
                .script
                .after_login_urls
                .get(state.login_clicks)
                .cloned()
                .unwrap_or_else(|| self.script.after_login_url.clone());
            state.login_clicks += 1;
        }
        Ok(())
    }

    async fn screenshot_element(&self, selector: &str) -> AcquireResult<Vec<u8>> {
        self.record(format!("screenshot {}", selector));
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn current_url(&self) -> AcquireResult<String> {
        Ok(self.state.lock().unwrap().current_url.clone())
    }

    async fn refresh(&self) -> AcquireResult<()> {
        self.record("refresh".to_string());
        Ok(())
    }

    async fn read_tabs(&self, _selector: &str) -> AcquireResult<Vec<ScrapedTab>> {
        let mut state = self.state.lock().unwrap();
        let tabs = self
            .script
            .tabs_per_load
            .get(state.tab_reads)
            .cloned()
            .unwrap_or_default();
        state.tab_reads += 1;
        Ok(tabs)
    }

    async fn quit(&mut self) -> AcquireResult<()> {
        let mut state = self.state.lock().unwrap();
        state.log.push("quit".to_string());
        state.quit = true;
        Ok(())
    }
}

/// 返回同一个假浏览器的启动器
pub struct FakeLauncher {
    driver: FakeDriver,
    fail: bool,
    pub launches: Arc<AtomicUsize>,
}

impl FakeLauncher {
    pub fn new(driver: FakeDriver) -> Self {
        Self {
            driver,
            fail: false,
            launches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(FakeDriver::new(Script::default()))
        }
    }

    pub fn launch_count(&self) -> Arc<AtomicUsize> {
        self.launches.clone()
    }
}

#[async_trait]
impl DriverLauncher for FakeLauncher {
    type Driver = FakeDriver;

    async fn launch(&self) -> AcquireResult<FakeDriver> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AcquireError::DriverLaunchFailure {
                embedded: "msedge.exe not found".to_string(),
                system: "no browser installed".to_string(),
            });
        }
        Ok(self.driver.clone())
    }
}

/// 依次返回预设答案的识别器，最后一个答案重复使用
pub struct StubClassifier {
    answers: Vec<String>,
    calls: AtomicUsize,
}

impl StubClassifier {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CaptchaClassifier for StubClassifier {
    async fn classify(&self, _image: &[u8]) -> AcquireResult<String> {
        let i = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answers[i.min(self.answers.len() - 1)].clone())
    }
}
