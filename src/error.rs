use thiserror::Error;

/// 成绩抓取过程中的错误
#[derive(Debug, Error)]
pub enum AcquireError {
    /// 凭据文件缺失或格式不正确，不重试
    #[error("账号密码文件缺失或格式不正确")]
    CredentialsMissing,

    /// 等待页面元素超时，可重启整个会话重试
    #[error("等待元素 {selector} 超时 ({secs} 秒)")]
    ElementTimeout { selector: String, secs: u64 },

    /// 验证码识别次数用尽
    #[error("验证码识别失败，已尝试 {attempts} 次: {last_reason}")]
    CaptchaExhausted { attempts: usize, last_reason: String },

    /// 账号或密码被拒绝，不重试
    #[error("账号或密码错误")]
    LoginRejected,

    /// 刷新次数用尽仍未出现成绩表
    #[error("刷新 {attempts} 次后仍未找到成绩")]
    NoTranscriptFound { attempts: usize },

    /// 自带浏览器与系统浏览器均无法启动
    #[error("无法启动浏览器 (自带: {embedded}; 系统: {system})")]
    DriverLaunchFailure { embedded: String, system: String },

    /// 浏览器协议层错误
    #[error("浏览器错误: {0}")]
    Browser(String),

    /// 验证码识别服务错误
    #[error("识别服务错误: {0}")]
    Classifier(String),

    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),
}

impl AcquireError {
    /// 是否可以通过重新登录 / 刷新恢复
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AcquireError::ElementTimeout { .. } | AcquireError::NoTranscriptFound { .. }
        )
    }
}

impl From<chromiumoxide::error::CdpError> for AcquireError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AcquireError::Browser(err.to_string())
    }
}

impl From<serde_json::Error> for AcquireError {
    fn from(err: serde_json::Error) -> Self {
        AcquireError::Browser(format!("页面数据解析失败: {}", err))
    }
}

/// 课程记录行错误（只影响当前行）
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("记录行格式错误 '{line}': {reason}")]
    Malformed { line: String, reason: String },
}

/// 抓取结果类型
pub type AcquireResult<T> = Result<T, AcquireError>;
