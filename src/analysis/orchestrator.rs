//! # 请求编排器
//!
//! ## 设计思路
//!
//! `Analyzer` 持有唯一的会话状态记录（在途标志、代次、最近结论/错误），
//! 只通过两个命名转换修改它：
//! 1. `begin`：清空旧结论 → 代次 +1 → 标记在途
//! 2. `InFlightGuard::release`：代次匹配时发布结论并清除在途标志，否则丢弃为过期响应
//!
//! ## 实现思路
//!
//! - 状态存放在 `tokio::sync::watch::Sender` 中，`send_modify` 原子修改并通知订阅者。
//! - `InFlightGuard` 采用 RAII：即使 future 被丢弃或中途 panic，`Drop` 也会复位在途标志。
//! - 单在途只是建议性前置条件：重叠提交不会被拒绝，但只有最新代次的响应会生效。

use std::time::Instant;

use serde::Serialize;
use tokio::sync::watch;

use super::{AnalysisOutcome, AnalysisTransport, ImagePayload};

/// 会话状态快照，供 UI 渲染与订阅。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// 当前代次的请求是否仍在等待响应。
    pub in_flight: bool,
    /// 最近一次提交的代次，首次提交前为 0。
    pub generation: u64,
    /// 尚未返回的请求数（含将被丢弃的过期请求）。
    pub pending_requests: usize,
    /// 最近一次生效的结论或错误。
    pub outcome: Option<AnalysisOutcome>,
}

/// 单次提交的完成报告。
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub generation: u64,
    pub outcome: AnalysisOutcome,
    /// 是否已发布到可见状态；被更新的提交取代时为 `false`。
    pub applied: bool,
}

/// 请求编排器。
pub struct Analyzer<T> {
    transport: T,
    state: watch::Sender<SessionSnapshot>,
}

impl<T: AnalysisTransport> Analyzer<T> {
    pub fn new(transport: T) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self { transport, state }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.borrow().in_flight
    }

    /// 订阅状态变化。
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// 提交图片并等待结论。
    ///
    /// 不会返回错误：网络/状态码/解析失败都会被转换为 `ErrorState` 发布。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use pixproof::{Analyzer, ClientConfig, HttpTransport, ImagePayload};
    ///
    /// # async fn demo() -> Result<(), pixproof::AppError> {
    /// let analyzer = Analyzer::new(HttpTransport::new(&ClientConfig::from_env())?);
    /// let payload = ImagePayload::new(std::fs::read("photo.jpg").unwrap_or_default(), "image/jpeg", "photo.jpg");
    /// let completion = analyzer.submit(payload).await;
    /// assert!(!analyzer.is_in_flight());
    /// # let _ = completion;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit(&self, payload: ImagePayload) -> Completion {
        let generation = self.begin();
        let guard = InFlightGuard {
            state: &self.state,
            generation,
            released: false,
        };

        log::info!(
            "🚀 提交分析请求 - 代次: {} 文件: {} 类型: {} 大小: {}B",
            generation,
            payload.file_name(),
            payload.mime_type(),
            payload.len()
        );

        let started = Instant::now();
        let result = self.transport.analyze(payload).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(report) => log::info!(
                "✅ 分析完成 - 代次: {} 结论: {} 耗时: {}ms",
                generation,
                report.overall_label,
                elapsed.as_millis()
            ),
            Err(err) => log::warn!(
                "⚠️ 分析失败 - 代次: {} 错误码: {} 耗时: {}ms：{}",
                generation,
                err.code(),
                elapsed.as_millis(),
                err
            ),
        }

        let outcome = AnalysisOutcome::from(result);
        let applied = guard.finish(outcome.clone());
        if !applied {
            log::debug!("⏭️ 丢弃过期响应 - 代次: {}", generation);
        }

        Completion {
            generation,
            outcome,
            applied,
        }
    }

    /// 提交入口步骤：清空旧结论、代次递增、标记在途。
    fn begin(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            if state.in_flight {
                log::warn!(
                    "⚠️ 代次 {} 仍在途，发起新提交；旧响应到达后将被丢弃",
                    state.generation
                );
            }
            state.outcome = None;
            state.generation += 1;
            state.in_flight = true;
            state.pending_requests += 1;
            generation = state.generation;
        });
        generation
    }
}

/// 在途标志的 RAII 守卫。
///
/// 每个提交恰好释放一次：正常完成走 `finish`，其余退出路径由 `Drop` 兜底。
struct InFlightGuard<'a> {
    state: &'a watch::Sender<SessionSnapshot>,
    generation: u64,
    released: bool,
}

impl InFlightGuard<'_> {
    fn finish(mut self, outcome: AnalysisOutcome) -> bool {
        self.release(Some(outcome))
    }

    fn release(&mut self, outcome: Option<AnalysisOutcome>) -> bool {
        if self.released {
            return false;
        }
        self.released = true;

        let generation = self.generation;
        let mut applied = false;
        self.state.send_modify(|state| {
            state.pending_requests = state.pending_requests.saturating_sub(1);
            if state.generation != generation {
                return;
            }
            state.in_flight = false;
            if let Some(outcome) = outcome {
                state.outcome = Some(outcome);
                applied = true;
            }
        });
        applied
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.release(None);
    }
}
