//! 本地文件加载：课程记录、忽略词、登录凭据
//!
//! 文件不存在时只记警告并返回空输入，不让进程失败。

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};

use crate::models::codec;
use crate::models::course::{Course, PointMode};
use crate::models::credentials::Credentials;

/// 读取文本文件的所有行；文件不存在返回 `None`
pub async fn read_lines(path: &Path) -> Result<Option<Vec<String>>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content.lines().map(str::to_string).collect())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("无法读取文件: {}", path.display())),
    }
}

/// 读取忽略词，每行一个，空行丢弃
pub async fn load_ignore_words(path: &Path) -> Result<Vec<String>> {
    let Some(lines) = read_lines(path).await? else {
        return Ok(Vec::new());
    };
    Ok(lines
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect())
}

/// 读取并解析课程记录文件
pub async fn load_courses(
    courses_path: &Path,
    ignore_path: &Path,
    mode: PointMode,
) -> Result<Vec<Course>> {
    let ignore_words = load_ignore_words(ignore_path).await?;

    let Some(lines) = read_lines(courses_path).await? else {
        warn!("⚠️ 无法打开课程文件: {}", courses_path.display());
        return Ok(Vec::new());
    };

    let courses = codec::parse(&lines, &ignore_words, mode);
    info!(
        "✓ 从 {} 读入 {} 门课程（忽略词 {} 个）",
        courses_path.display(),
        courses.len(),
        ignore_words.len()
    );
    Ok(courses)
}

/// 读取登录凭据；文件缺失或格式不正确返回 `None`
pub async fn load_credentials(path: &Path) -> Option<Credentials> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("⚠️ 找不到账号密码文件 {}", path.display());
            return None;
        }
        Err(e) => {
            warn!("⚠️ 读取账号密码文件时出错: {}", e);
            return None;
        }
    };

    let credentials = Credentials::parse(&content);
    if credentials.is_none() {
        warn!("⚠️ 账号或密码格式不正确: {}", path.display());
    }
    credentials
}
