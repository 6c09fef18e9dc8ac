//! # 响应解释
//!
//! 将 `(HTTP 状态码, 响应体)` 解释为 `AnalysisResult` 或 `AnalysisError`。
//! 纯函数，不做任何 I/O，HTTP 传输层与测试共用。
//!
//! 判定顺序：
//! 1. 响应体是 `{"error": "..."}` → 服务错误（无论状态码），消息原样透传
//! 2. 非 2xx → 状态码错误
//! 3. 2xx 但无法解析，或综合得分越界 → 响应格式错误

use serde::Deserialize;

use super::{AnalysisError, AnalysisResult};

#[derive(Deserialize)]
#[serde(untagged)]
enum ServiceBody {
    Failure { error: String },
    Report(AnalysisResult),
}

pub(crate) fn interpret_response(status: u16, body: &[u8]) -> Result<AnalysisResult, AnalysisError> {
    let success = (200..300).contains(&status);

    match serde_json::from_slice::<ServiceBody>(body) {
        Ok(ServiceBody::Failure { error }) => Err(AnalysisError::Service(error)),
        Ok(ServiceBody::Report(_)) if !success => Err(AnalysisError::Status(status)),
        Ok(ServiceBody::Report(result)) => validate_result(result),
        Err(_) if !success => Err(AnalysisError::Status(status)),
        Err(e) => Err(AnalysisError::MalformedBody(e.to_string())),
    }
}

fn validate_result(result: AnalysisResult) -> Result<AnalysisResult, AnalysisError> {
    if let Some(score) = result.ensemble_score {
        if !(0.0..=1.0).contains(&score) {
            return Err(AnalysisError::MalformedBody(format!(
                "综合得分越界：{}（应在 0~1 之间）",
                score
            )));
        }
    }
    Ok(result)
}
