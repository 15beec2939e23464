use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AcquireError, AcquireResult};
use crate::infrastructure::{ChromiumDriver, DriverLauncher};

/// 浏览器启动器：优先程序自带浏览器，失败后回退到系统浏览器
pub struct ChromiumLauncher {
    driver_path: PathBuf,
    headless: bool,
}

impl ChromiumLauncher {
    pub fn new(config: &Config) -> Self {
        Self {
            driver_path: config.driver_path.clone(),
            headless: config.headless,
        }
    }
}

#[async_trait]
impl DriverLauncher for ChromiumLauncher {
    type Driver = ChromiumDriver;

    async fn launch(&self) -> AcquireResult<ChromiumDriver> {
        let embedded = match launch_browser(Some(self.driver_path.as_path()), self.headless).await {
            Ok((browser, page, task)) => return Ok(ChromiumDriver::new(browser, page, task)),
            Err(e) => e,
        };
        warn!(
            "⚠️ 无法启动程序自带浏览器 ({}): {}，正在尝试系统浏览器",
            self.driver_path.display(),
            embedded
        );

        match launch_browser(None, self.headless).await {
            Ok((browser, page, task)) => Ok(ChromiumDriver::new(browser, page, task)),
            Err(system) => {
                error!("无法启动系统浏览器: {}，请安装最新版 Edge / Chrome", system);
                Err(AcquireError::DriverLaunchFailure {
                    embedded: embedded.to_string(),
                    system: system.to_string(),
                })
            }
        }
    }
}

/// 启动浏览器并打开空白页
///
/// `executable` 为 `None` 时由 chromiumoxide 自动查找系统安装的浏览器
async fn launch_browser(
    executable: Option<&Path>,
    headless: bool,
) -> Result<(Browser, Page, JoinHandle<()>)> {
    info!("🚀 启动浏览器...");
    debug!("可执行文件: {:?}, 无头模式: {}", executable, headless);

    let mut builder = BrowserConfig::builder();
    builder = if headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = executable {
        builder = builder.chrome_executable(path);
    }

    let config = builder
        .args(vec![
            "--disable-gpu",             // Windows 无头模式必须禁用 GPU
            "--no-sandbox",              // 禁用沙盒，防止权限问题导致的崩溃
            "--disable-dev-shm-usage",   // 防止共享内存不足
        ])
        .build()
        .map_err(|e| anyhow::anyhow!("配置浏览器失败: {}", e))?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| anyhow::anyhow!("启动浏览器失败: {}", e))?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    let task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| anyhow::anyhow!("创建页面失败: {}", e))?;

    info!("✅ 浏览器已就绪");
    Ok((browser, page, task))
}
