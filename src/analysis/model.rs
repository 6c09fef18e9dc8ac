//! # 数据模型
//!
//! ## 设计思路
//!
//! - `ImagePayload`：一次提交的图片负载，只能被消费一次（不实现 `Clone`）。
//! - `AnalysisResult`：服务返回的结构化结论，字段名与线上 JSON 一致。
//! - `ErrorState`：面向用户的错误消息，与结果互斥。
//! - `AnalysisOutcome`：二者的统一载体，渲染层只依赖它。

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::AnalysisError;

/// 待提交的图片负载。
///
/// 构造后不可变；`into_parts` 会消费自身，保证一次提交只用一次。
#[derive(Debug)]
pub struct ImagePayload {
    bytes: Bytes,
    mime_type: String,
    file_name: String,
}

impl ImagePayload {
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// 拆出字节、MIME 与文件名，供传输层构建请求。
    pub fn into_parts(self) -> (Bytes, String, String) {
        (self.bytes, self.mime_type, self.file_name)
    }
}

/// 单个分析维度的得分。
///
/// 服务可能直接返回数字，也可能返回已格式化的字符串，两者都接受。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Number(f64),
    Text(String),
}

/// 分析维度（sector）条目，顺序即服务返回顺序。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorScore {
    pub sector: String,
    #[serde(default)]
    pub score: Option<ScoreValue>,
    #[serde(default)]
    pub reason: String,
}

/// 服务返回的鉴定结论。
///
/// `overall_label` 以服务为准，客户端不根据 `ensemble_score` 重新推导。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_label: String,
    /// 综合得分，出现时位于 `[0, 1]`。
    #[serde(default)]
    pub ensemble_score: Option<f64>,
    #[serde(default, rename = "scores")]
    pub sector_scores: Vec<SectorScore>,
}

/// 面向用户展示的错误状态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorState {
    pub message: String,
}

impl From<&AnalysisError> for ErrorState {
    fn from(error: &AnalysisError) -> Self {
        Self {
            message: error.to_string(),
        }
    }
}

/// 一次提交的最终产出：结论或错误，二者互斥。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Result(AnalysisResult),
    Error(ErrorState),
}

impl AnalysisOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorState {
            message: message.into(),
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn as_result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Result(result) => Some(result),
            Self::Error(_) => None,
        }
    }
}

impl From<Result<AnalysisResult, AnalysisError>> for AnalysisOutcome {
    fn from(result: Result<AnalysisResult, AnalysisError>) -> Self {
        match result {
            Ok(result) => Self::Result(result),
            Err(error) => Self::Error(ErrorState::from(&error)),
        }
    }
}
