//! 验证码识别服务 - 业务能力层
//!
//! 只负责"看图识字"能力与重试策略，不关心登录流程
//!
//! ## 技术栈
//! - 使用 `async-openai` 调用 OpenAI 兼容的视觉模型
//! - 图片以 base64 data URL 形式随用户消息发送

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AcquireError, AcquireResult};
use crate::utils::logging::truncate_text;

/// 验证码长度
pub const CAPTCHA_LEN: usize = 4;

/// 图片分类能力
#[async_trait]
pub trait CaptchaClassifier: Send + Sync {
    async fn classify(&self, image: &[u8]) -> AcquireResult<String>;
}

/// 验证码图片来源
///
/// 每次调用都应获取一张新的验证码（旧验证码只能用一次）
#[async_trait]
pub trait CaptchaSource: Send {
    async fn fetch(&mut self) -> AcquireResult<Vec<u8>>;
}

/// 视觉模型验证码识别
///
/// 职责：
/// - 把验证码截图交给视觉模型
/// - 从回复中提取验证码文本
/// - 不做长度校验，由 `CaptchaResolver` 决定是否接受
pub struct VisionCaptchaClassifier {
    client: Client<OpenAIConfig>,
    model_name: String,
    code_pattern: Regex,
}

impl VisionCaptchaClassifier {
    pub fn new(config: &Config) -> Result<Self> {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            code_pattern: Regex::new(r"(?:^|[^0-9A-Za-z])([0-9A-Za-z]{4})(?:[^0-9A-Za-z]|$)")?,
        })
    }

    async fn ask_model(&self, image: &[u8]) -> Result<String> {
        debug!("调用视觉模型识别验证码，模型: {}", self.model_name);

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content("你是验证码识别助手。只输出图片中的字符，不要输出任何其他内容。")
            .build()?;

        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(image));
        let content_parts = vec![
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: format!("识别这张验证码图片中的 {} 个字符。", CAPTCHA_LEN),
                },
            ),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: data_url,
                        detail: Some(ImageDetail::High),
                    },
                },
            ),
        ];
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(0.0)
            .max_tokens(16u32)
            .build()?;

        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("视觉模型返回内容为空"))?;

        Ok(content)
    }

    /// 从模型回复中提取验证码
    ///
    /// 优先取前后不紧邻 ASCII 字母数字的 4 位串，否则只保留 ASCII 字母数字
    fn extract_code(&self, response: &str) -> String {
        if let Some(code) = self.code_pattern.captures(response).and_then(|c| c.get(1)) {
            return code.as_str().to_string();
        }
        response.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
    }
}

#[async_trait]
impl CaptchaClassifier for VisionCaptchaClassifier {
    async fn classify(&self, image: &[u8]) -> AcquireResult<String> {
        let response = self.ask_model(image).await.map_err(|e| {
            warn!("视觉模型调用失败: {}", e);
            AcquireError::Classifier(e.to_string())
        })?;
        debug!("视觉模型回复: {}", truncate_text(response.trim(), 40));
        Ok(self.extract_code(&response))
    }
}

/// 验证码识别与重试策略
pub struct CaptchaResolver<C> {
    classifier: C,
    max_attempts: usize,
}

impl<C: CaptchaClassifier> CaptchaResolver<C> {
    pub fn new(classifier: C, max_attempts: usize) -> Self {
        Self {
            classifier,
            max_attempts,
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// 识别单张图片，长度不为 4 或识别出错返回 `None`
    pub async fn solve(&self, image: &[u8]) -> Option<String> {
        self.try_solve(image).await.ok()
    }

    async fn try_solve(&self, image: &[u8]) -> Result<String, String> {
        let text = self.classifier.classify(image).await.map_err(|e| e.to_string())?;
        let code = text.trim().to_string();
        if code.chars().count() == CAPTCHA_LEN {
            Ok(code)
        } else {
            Err(format!("识别结果 '{}' 长度不为 {}", code, CAPTCHA_LEN))
        }
    }

    /// 反复获取新验证码并识别，最多 `max_attempts` 次
    pub async fn resolve_with_retry<S>(&self, source: &mut S) -> AcquireResult<String>
    where
        S: CaptchaSource + ?Sized,
    {
        let mut last_reason = String::from("未进行识别");

        for attempt in 1..=self.max_attempts {
            let image = source.fetch().await?;
            match self.try_solve(&image).await {
                Ok(code) => {
                    info!("✓ 验证码识别成功 (第 {}/{} 次)", attempt, self.max_attempts);
                    return Ok(code);
                }
                Err(reason) => {
                    warn!(
                        "⚠️ 验证码识别失败 (第 {}/{} 次): {}",
                        attempt, self.max_attempts, reason
                    );
                    last_reason = reason;
                }
            }
        }

        Err(AcquireError::CaptchaExhausted {
            attempts: self.max_attempts,
            last_reason,
        })
    }
}
