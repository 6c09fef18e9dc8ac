//! # 传输层
//!
//! ## 设计思路
//!
//! 编排器只依赖 `AnalysisTransport` 这一接缝，不关心请求如何到达服务：
//! - 生产环境使用 `HttpTransport`（reqwest + multipart）
//! - 测试注入假实现，可控制响应顺序与延迟
//!
//! ## 实现思路
//!
//! - 请求体为 multipart 表单，唯一字段 `image`，携带文件名与 MIME。
//! - 不设置请求超时、不重试：请求挂起时调用方保持“分析中”。
//! - reqwest 错误统一映射到 `AnalysisError`，URL 中的查询参数不写入日志。

use std::future::Future;
use std::time::Instant;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use super::response::interpret_response;
use super::{AnalysisError, AnalysisResult, ImagePayload};
use crate::config::{ClientConfig, ConfigError};
use crate::error::AppError;

/// multipart 表单中图片字段名。
pub const IMAGE_FIELD: &str = "image";

/// 分析请求的传输接缝。
pub trait AnalysisTransport: Send + Sync {
    /// 提交一张图片并等待服务结论。负载在此被消费。
    fn analyze(
        &self,
        payload: ImagePayload,
    ) -> impl Future<Output = Result<AnalysisResult, AnalysisError>> + Send;
}

/// 服务根路径的健康检查响应。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// 基于 reqwest 的 HTTP 传输实现。
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    service_root: reqwest::Url,
}

impl HttpTransport {
    /// 按配置创建传输层，配置非法时尽早失败。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use pixproof::{ClientConfig, HttpTransport};
    ///
    /// let transport = HttpTransport::new(&ClientConfig::from_env())?;
    /// # Ok::<(), pixproof::AppError>(())
    /// ```
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        config.validate()?;

        let endpoint = reqwest::Url::parse(&config.endpoint)
            .map_err(|e| ConfigError::InvalidEndpoint(e.to_string()))?;
        let service_root = config.service_root()?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AnalysisError::InvalidRequest(format!("HTTP 客户端初始化失败：{}", e)))?;

        log::info!("🔧 分析服务端点：{}", Self::redact_url_for_log(&endpoint));

        Ok(Self {
            client,
            endpoint,
            service_root,
        })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }

    /// 请求服务根路径，确认服务在线。
    pub async fn health(&self) -> Result<ServiceHealth, AnalysisError> {
        let response = self
            .client
            .get(self.service_root.clone())
            .send()
            .await
            .map_err(Self::map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(Self::map_reqwest_error)?;
        serde_json::from_slice(&body).map_err(|e| AnalysisError::MalformedBody(e.to_string()))
    }

    fn build_form(payload: ImagePayload) -> Result<Form, AnalysisError> {
        let (bytes, mime_type, file_name) = payload.into_parts();
        let part = Part::bytes(Vec::from(bytes))
            .file_name(file_name)
            .mime_str(&mime_type)
            .map_err(|e| AnalysisError::InvalidRequest(format!("MIME 类型无效（{}）：{}", mime_type, e)))?;
        Ok(Form::new().part(IMAGE_FIELD, part))
    }

    /// 统一映射 reqwest 错误到业务错误。
    fn map_reqwest_error(e: reqwest::Error) -> AnalysisError {
        let e = e.without_url();
        if e.is_connect() {
            AnalysisError::Network(format!("无法连接分析服务：{}", e))
        } else if e.is_timeout() {
            AnalysisError::Network(format!("请求超时：{}", e))
        } else if e.is_decode() || e.is_body() {
            AnalysisError::Network(format!("读取响应失败：{}", e))
        } else {
            AnalysisError::Network(e.to_string())
        }
    }

    fn redact_url_for_log(url: &reqwest::Url) -> String {
        let mut redacted = url.clone();
        redacted.set_query(None);
        redacted.set_fragment(None);
        let _ = redacted.set_password(None);
        redacted.to_string()
    }
}

impl AnalysisTransport for HttpTransport {
    async fn analyze(&self, payload: ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        let size = payload.len();
        let form = Self::build_form(payload)?;
        let started = Instant::now();

        log::debug!(
            "📡 POST {}（{} 字节）",
            Self::redact_url_for_log(&self.endpoint),
            size
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(Self::map_reqwest_error)?;

        log::debug!(
            "📨 分析服务响应 - HTTP {} body={}B elapsed={}ms",
            status,
            body.len(),
            started.elapsed().as_millis()
        );

        interpret_response(status, &body)
    }
}
