//! # GPA Scrape
//!
//! 登录教务系统抓取成绩，并计算 GPA 及每门课程对 GPA 的影响
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有浏览器资源，只暴露页面操作能力
//! - `BrowserDriver` - 页面操作抽象；`ChromiumDriver` 为 chromiumoxide 实现
//! - `browser/` - 启动浏览器（自带 → 系统回退）
//!
//! ### ② 业务能力层（Services）
//! - `CaptchaResolver` - 验证码识别与重试
//! - `ArtifactWriter` - 写课程文件 / 失败提示行
//! - `gpa_service` - GPA 与边际影响
//! - `export_service` - 导出日志
//!
//! ### ③ 流程层（Workflow）
//! - `LoginFlow` - 登录状态机
//! - `ScrapeFlow` - 成绩页轮询与保存
//!
//! ### ④ 编排层（Orchestration）
//! - `Acquisition` - 一次抓取的资源所有者
//! - `App` - 命令入口
//!
//! ### 数据（Models）
//! - `Course` / `PointMode` / 换算表 / 记录行编解码

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AcquireError, AcquireResult, RecordError};
pub use infrastructure::{BrowserDriver, DriverLauncher};
pub use models::{Course, CourseEdit, PointMode};
pub use orchestrator::{Acquisition, App};
pub use services::GpaReport;
pub use workflow::ScrapeOutcome;
