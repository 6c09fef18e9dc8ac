//! # 分析模块（analysis）
//!
//! ## 设计思路
//!
//! 将“负载 → 网络交换 → 结论/错误”按职责拆分：
//!
//! - `model`：负载、结论、错误状态等数据模型
//! - `response`：状态码 + 响应体的解释（纯函数）
//! - `transport`：传输接缝与 reqwest 实现
//! - `orchestrator`：单在途提交、代次过滤与状态发布
//! - `error`：网络交换阶段的错误类型
//!
//! ```text
//! ImagePayload
//!    ↓
//! Analyzer::submit（清空旧结论 → 代次+1 → 在途）
//!    ↓
//! AnalysisTransport::analyze（multipart POST）
//!    ↓
//! interpret_response（结论 / 错误）
//!    ↓
//! InFlightGuard（代次匹配才发布，始终复位在途）
//! ```

mod error;
mod model;
mod orchestrator;
mod response;
mod transport;

pub use error::AnalysisError;
pub use model::{
    AnalysisOutcome,
    AnalysisResult,
    ErrorState,
    ImagePayload,
    ScoreValue,
    SectorScore,
};
pub use orchestrator::{Analyzer, Completion, SessionSnapshot};
pub use transport::{AnalysisTransport, HttpTransport, IMAGE_FIELD, ServiceHealth};
