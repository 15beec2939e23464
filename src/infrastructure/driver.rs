//! 浏览器能力抽象 - 基础设施层
//!
//! 流程层只依赖这里的 trait，不直接接触 chromiumoxide

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AcquireResult;
use crate::models::ScrapedTab;

/// 远程浏览器会话
///
/// 所有等待都有超时，超时返回 `AcquireError::ElementTimeout`
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// 打开地址并等待加载
    async fn navigate(&self, url: &str) -> AcquireResult<()>;

    /// 等待元素可见
    async fn wait_visible(&self, selector: &str, timeout: Duration) -> AcquireResult<()>;

    /// 等待元素可见且可点击
    async fn wait_clickable(&self, selector: &str, timeout: Duration) -> AcquireResult<()>;

    /// 聚焦元素并输入文本
    async fn type_text(&self, selector: &str, text: &str) -> AcquireResult<()>;

    async fn click(&self, selector: &str) -> AcquireResult<()>;

    /// 元素截图（PNG）
    async fn screenshot_element(&self, selector: &str) -> AcquireResult<Vec<u8>>;

    /// 当前页面地址
    async fn current_url(&self) -> AcquireResult<String>;

    async fn refresh(&self) -> AcquireResult<()>;

    /// 读取所有匹配 `selector` 的标签页：`h4` 标题 + 表格各行 `td` 文本
    async fn read_tabs(&self, selector: &str) -> AcquireResult<Vec<ScrapedTab>>;

    /// 关闭浏览器
    async fn quit(&mut self) -> AcquireResult<()>;
}

/// 浏览器启动器
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    type Driver: BrowserDriver;

    async fn launch(&self) -> AcquireResult<Self::Driver>;
}
