//! 登录凭据

use std::fmt;

/// 用户名 + 密码
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// 从凭据文件内容解析：第一行用户名，第二行密码
    ///
    /// 行数不足或任一行为空视为缺失。
    pub fn parse(content: &str) -> Option<Self> {
        let mut lines = content.lines().map(str::trim);
        let username = lines.next().filter(|l| !l.is_empty())?;
        let password = lines.next().filter(|l| !l.is_empty())?;
        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"******")
            .finish()
    }
}
