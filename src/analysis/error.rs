//! # 错误模型模块
//!
//! 网络交换阶段的所有失败（传输失败、非 2xx、响应体无法解析、服务自报错误）
//! 统一为 `AnalysisError`，在编排器边界转换为 `ErrorState`，不会向外逃逸。

/// 分析请求错误。
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("网络错误：{0}")]
    Network(String),

    #[error("分析服务返回异常状态：HTTP {0}")]
    Status(u16),

    /// 服务返回的 `{"error": ...}`，消息原样展示。
    #[error("{0}")]
    Service(String),

    #[error("响应格式错误：{0}")]
    MalformedBody(String),

    #[error("请求构建失败：{0}")]
    InvalidRequest(String),
}

impl AnalysisError {
    /// 稳定的错误码，供日志与前端区分分支。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::Status(_) => "E_STATUS",
            Self::Service(_) => "E_SERVICE",
            Self::MalformedBody(_) => "E_MALFORMED",
            Self::InvalidRequest(_) => "E_REQUEST",
        }
    }
}
