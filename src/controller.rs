//! # 根控制器
//!
//! ## 设计思路
//!
//! `RootController` 组合采集、文件选择与分析三部分，只负责路由：
//!
//! ```text
//! CaptureController ──┐
//!                     ├─ ImagePayload ─▶ Analyzer ─▶ SessionSnapshot ─▶ render
//! FileSelector ───────┘
//! ```
//!
//! 在途标志与最近结论/错误只由 `Analyzer` 修改；本层的失败（摄像头、文件）
//! 通过 `Notifier` 提示，不写入结论槽位。

use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;

use crate::analysis::{AnalysisTransport, Analyzer, Completion, ImagePayload, SessionSnapshot};
use crate::capture::{CameraDevice, CaptureController, CaptureError, CaptureState};
use crate::config::ClientConfig;
use crate::notify::Notifier;
use crate::render::{self, ResultView};
use crate::selector::{FileSelector, SelectionError};

pub struct RootController<T> {
    capture: CaptureController,
    selector: FileSelector,
    analyzer: Arc<Analyzer<T>>,
    notifier: Arc<dyn Notifier>,
}

impl<T: AnalysisTransport> RootController<T> {
    pub fn new(
        config: &ClientConfig,
        camera: Box<dyn CameraDevice>,
        transport: T,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            capture: CaptureController::new(config, camera, Arc::clone(&notifier)),
            selector: FileSelector::new(config),
            analyzer: Arc::new(Analyzer::new(transport)),
            notifier,
        }
    }

    pub fn analyzer(&self) -> Arc<Analyzer<T>> {
        Arc::clone(&self.analyzer)
    }

    pub fn camera_state(&self) -> CaptureState {
        self.capture.state()
    }

    pub fn active_camera_tracks(&self) -> usize {
        self.capture.active_tracks()
    }

    /// 打开摄像头；失败时用户已收到提示。
    pub fn open_camera(&mut self) -> Result<(), CaptureError> {
        self.capture.open()
    }

    pub fn close_camera(&mut self) {
        self.capture.close();
    }

    /// 拍照并释放摄像头，返回待提交的负载。
    pub fn capture_payload(&mut self) -> Result<ImagePayload, CaptureError> {
        self.capture.capture_frame()
    }

    /// 拍照 → 释放摄像头 → 提交分析。
    ///
    /// 摄像头在分析开始前已释放，与分析结果无关。
    pub async fn capture_and_analyze(&mut self) -> Result<Completion, CaptureError> {
        let payload = self.capture_payload()?;
        Ok(self.analyzer.submit(payload).await)
    }

    /// 分析用户选中的文件。
    ///
    /// 取消选择返回 `Ok(None)` 且不调用编排器；读取失败会提示用户并返回错误。
    pub async fn select_file(&self, handle: Option<&Path>) -> Result<Option<Completion>, SelectionError> {
        match self.prepare_file(handle)? {
            Some(payload) => Ok(Some(self.analyzer.submit(payload).await)),
            None => Ok(None),
        }
    }

    /// 读取选中的文件但不提交；失败时提示用户。
    pub fn prepare_file(&self, handle: Option<&Path>) -> Result<Option<ImagePayload>, SelectionError> {
        self.selector.select_file(handle).inspect_err(|err| {
            log::warn!("⚠️ 文件选择失败：{}", err);
            self.notifier.alert(&err.to_string());
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.analyzer.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.analyzer.subscribe()
    }

    /// 渲染当前可见的结论或错误；尚无结果时为 `None`。
    pub fn render_current(&self) -> Option<ResultView> {
        self.analyzer.snapshot().outcome.as_ref().map(render::render)
    }
}
