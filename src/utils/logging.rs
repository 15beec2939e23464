/// 日志工具模块
///
/// 初始化 tracing 输出，并提供抓取流程的日志格式化函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则按 `verbose` 选择 debug / info。重复初始化会被忽略。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录抓取开始信息
///
/// # 参数
/// - `login_url`: 登录页
/// - `max_refresh_times`: 最大刷新次数
pub fn log_acquisition_start(login_url: &str, max_refresh_times: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始抓取成绩");
    info!("🔗 登录页: {}", login_url);
    info!("🔁 最大刷新次数: {}", max_refresh_times);
    info!("{}", "=".repeat(60));
}

/// 记录抓取结束信息
pub fn log_acquisition_complete(summary: &str) {
    info!("\n{}", "─".repeat(60));
    info!("📊 抓取结束: {}", summary);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
