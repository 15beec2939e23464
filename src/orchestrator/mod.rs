//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `acquisition` - 成绩抓取入口
//! - 按需启动浏览器，结束时一定关闭
//! - 调度登录流程与抓取流程
//! - 登录被拒绝时写入提示行
//!
//! ### `app` - 应用入口
//! - 抓取 / 计算 GPA / 导出日志三个命令
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! acquisition (持有浏览器)
//!     ↓
//! workflow::LoginFlow / ScrapeFlow
//!     ↓
//! services (能力层：验证码 / 写文件 / GPA / 导出)
//!     ↓
//! infrastructure (基础设施：BrowserDriver)
//! ```

pub mod acquisition;
pub mod app;

pub use acquisition::Acquisition;
pub use app::{render_table, App};
