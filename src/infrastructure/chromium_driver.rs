//! chromiumoxide 实现 - 基础设施层
//!
//! 持有唯一的 Browser / Page 资源。DOM 读取统一走 JS 执行 + serde 反序列化。

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::{Browser, Page};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::error::{AcquireError, AcquireResult};
use crate::infrastructure::driver::BrowserDriver;
use crate::models::ScrapedTab;

/// 轮询元素状态的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// chromiumoxide 浏览器会话
///
/// 职责：
/// - 持有 Browser、Page 以及事件处理任务
/// - 只暴露页面操作能力，不认识登录 / 成绩流程
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromiumDriver {
    pub fn new(browser: Browser, page: Page, handler_task: JoinHandle<()>) -> Self {
        Self {
            browser,
            page,
            handler_task,
        }
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> AcquireResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AcquireResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    async fn wait_for(&self, selector: &str, limit: Duration, clickable: bool) -> AcquireResult<()> {
        let script = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector});
                if (!el) return false;
                const rect = el.getBoundingClientRect();
                const style = window.getComputedStyle(el);
                const visible = rect.width > 0 && rect.height > 0
                    && style.visibility !== 'hidden' && style.display !== 'none';
                return {check};
            }})()
            "#,
            selector = serde_json::to_string(selector)?,
            check = if clickable { "visible && !el.disabled" } else { "visible" },
        );

        let poll = async {
            loop {
                // 页面跳转期间执行失败视为尚未就绪
                match self.eval_as::<bool>(script.as_str()).await {
                    Ok(true) => return,
                    Ok(false) => {}
                    Err(e) => debug!("检查元素 {} 时出错: {}", selector, e),
                }
                sleep(POLL_INTERVAL).await;
            }
        };

        timeout(limit, poll)
            .await
            .map_err(|_| AcquireError::ElementTimeout {
                selector: selector.to_string(),
                secs: limit.as_secs(),
            })
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> AcquireResult<()> {
        debug!("导航到: {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_visible(&self, selector: &str, timeout: Duration) -> AcquireResult<()> {
        self.wait_for(selector, timeout, false).await
    }

    async fn wait_clickable(&self, selector: &str, timeout: Duration) -> AcquireResult<()> {
        self.wait_for(selector, timeout, true).await
    }

    async fn type_text(&self, selector: &str, text: &str) -> AcquireResult<()> {
        let element = self.page.find_element(selector).await?;
        element.click().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> AcquireResult<()> {
        self.page.find_element(selector).await?.click().await?;
        Ok(())
    }

    async fn screenshot_element(&self, selector: &str) -> AcquireResult<Vec<u8>> {
        let element = self.page.find_element(selector).await?;
        let png = element.screenshot(CaptureScreenshotFormat::Png).await?;
        debug!("截图 {}: {} 字节", selector, png.len());
        Ok(png)
    }

    async fn current_url(&self) -> AcquireResult<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn refresh(&self) -> AcquireResult<()> {
        self.page.reload().await?;
        Ok(())
    }

    async fn read_tabs(&self, selector: &str) -> AcquireResult<Vec<ScrapedTab>> {
        let script = format!(
            r#"
            (() => Array.from(document.querySelectorAll({selector})).map(tab => {{
                const heading = tab.querySelector('h4');
                const table = tab.querySelector('table');
                const rows = table
                    ? Array.from(table.querySelectorAll('tr')).map(tr =>
                        Array.from(tr.querySelectorAll('td')).map(td => (td.innerText || '').trim()))
                    : [];
                return {{ heading: heading ? heading.innerText.trim() : '', rows }};
            }}))()
            "#,
            selector = serde_json::to_string(selector)?,
        );
        self.eval_as(script).await
    }

    async fn quit(&mut self) -> AcquireResult<()> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            debug!("等待浏览器进程退出时出错: {}", e);
        }
        self.handler_task.abort();
        closed?;
        debug!("浏览器已关闭");
        Ok(())
    }
}
