use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gpa_scrape::config::{Config, DEFAULT_CONFIG_FILE};
use gpa_scrape::models::PointMode;
use gpa_scrape::orchestrator::{render_table, App};
use gpa_scrape::utils::logging;

#[derive(Parser)]
#[command(name = "gpa_scrape", about = "抓取教务系统成绩并计算 GPA")]
struct Cli {
    /// 配置文件
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 登录教务系统，抓取成绩到课程文件
    Scrape,
    /// 读入课程文件并计算 GPA
    Gpa {
        /// 课程文件（默认使用配置中的 courses_file）
        #[arg(long)]
        file: Option<PathBuf>,
        /// 直接使用文件中的绩点
        #[arg(long)]
        direct_point: bool,
    },
    /// 计算 GPA 并导出日志
    Export {
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        direct_point: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(&cli.config)?;

    // 初始化日志
    logging::init(cli.verbose || config.verbose_logging);

    let direct_default = config.direct_point;
    let app = App::new(config);

    match cli.command {
        Command::Scrape => {
            app.scrape().await?;
        }
        Command::Gpa { file, direct_point } => {
            let mode = PointMode::from_flag(direct_point || direct_default);
            let (courses, report) = app.gpa(file.as_deref(), mode).await?;
            print!("{}", render_table(&courses, &report));
        }
        Command::Export { file, direct_point } => {
            let mode = PointMode::from_flag(direct_point || direct_default);
            let path = app.export(file.as_deref(), mode).await?;
            println!("GPA日志已保存为 {}", path.display());
        }
    }

    Ok(())
}
