//! 课程文件写入服务 - 业务能力层
//!
//! 只负责"写 courses.txt"能力：覆盖写入成绩行，或追加失败提示行

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::AcquireResult;

/// 课程文件写入服务
///
/// 职责：
/// - 抓取成功时覆盖写入所有记录行
/// - 抓取失败时追加一行提示，不破坏已有内容
pub struct ArtifactWriter {
    path: PathBuf,
}

impl ArtifactWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 覆盖写入记录行
    pub fn write_records(&self, lines: &[String]) -> AcquireResult<()> {
        self.ensure_parent()?;
        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(&self.path, content)?;
        info!("✓ 已写入 {} 行到 {}", lines.len(), self.path.display());
        Ok(())
    }

    /// 追加失败提示行
    ///
    /// 空白替换为 `_`，整行只有一个字段，读取时必然被跳过
    pub fn append_sentinel(&self, message: &str) -> AcquireResult<()> {
        self.ensure_parent()?;
        let message = message.trim().replace(char::is_whitespace, "_");
        debug!("追加提示行: {}", message);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format!("{}\n", message).as_bytes())?;

        warn!("⚠️ 已写入 {}: {}", self.path.display(), message);
        Ok(())
    }

    fn ensure_parent(&self) -> AcquireResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
