//! # 摄像头采集模块（capture）
//!
//! ## 设计思路
//!
//! 控制器只有两个状态：`Idle` 与 `Streaming`。
//!
//! ```text
//!          open
//!   Idle ────────▶ Streaming
//!    ▲                 │
//!    └── capture/close ┘
//! ```
//!
//! - `CameraDevice`：申请摄像头授权，产出一路 `MediaStream`
//! - `MediaStream`：提供尺寸、当前帧与轨道控制
//! - `CaptureSession`：RAII 会话，`Drop` 时停止全部轨道
//! - `encode`：离屏画布编码为 JPEG
//!
//! ## 实现思路
//!
//! - `open` 失败时立即通过 `Notifier` 提示用户，不重试，状态保持 `Idle`。
//! - `capture_frame` 先把会话从控制器中取出，无论编码成功与否，离开作用域即释放摄像头。
//! - `close` 幂等：`Idle` 下调用是安全的空操作。

mod encode;
#[cfg(feature = "camera")]
mod native;
mod session;

use std::sync::Arc;

use image::RgbImage;

use crate::analysis::ImagePayload;
use crate::config::ClientConfig;
use crate::notify::{DEVICE_UNAVAILABLE_MESSAGE, Notifier};

#[cfg(feature = "camera")]
pub use native::NokhwaCamera;
pub use session::CaptureSession;

/// 采集错误。
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("摄像头不可用：{0}")]
    DeviceUnavailable(String),

    #[error("摄像头未开启")]
    NotStreaming,

    #[error("读取画面失败：{0}")]
    Frame(String),

    #[error("编码失败：{0}")]
    Encode(String),
}

/// 摄像头设备：申请授权并打开一路视频流。
pub trait CameraDevice: Send {
    fn request_stream(&mut self) -> Result<Box<dyn MediaStream>, CaptureError>;
}

/// 一路已授权的视频流。
pub trait MediaStream: Send {
    /// 视频流的宽高（像素）。
    fn dimensions(&self) -> (u32, u32);

    fn grab_frame(&mut self) -> Result<RgbImage, CaptureError>;

    fn active_tracks(&self) -> usize;

    /// 停止所有轨道并释放硬件。
    fn stop_tracks(&mut self);
}

/// 没有可用摄像头时的设备实现：每次申请都失败。
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableCamera;

impl CameraDevice for UnavailableCamera {
    fn request_stream(&mut self) -> Result<Box<dyn MediaStream>, CaptureError> {
        Err(CaptureError::DeviceUnavailable("未检测到摄像头设备".to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    Idle,
    Streaming,
}

/// 摄像头采集控制器。
pub struct CaptureController {
    device: Box<dyn CameraDevice>,
    session: Option<CaptureSession>,
    notifier: Arc<dyn Notifier>,
    jpeg_quality: u8,
    file_name: String,
}

impl CaptureController {
    pub fn new(config: &ClientConfig, device: Box<dyn CameraDevice>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            device,
            session: None,
            notifier,
            jpeg_quality: config.jpeg_quality,
            file_name: config.capture_file_name.clone(),
        }
    }

    pub fn state(&self) -> CaptureState {
        if self.session.is_some() {
            CaptureState::Streaming
        } else {
            CaptureState::Idle
        }
    }

    /// 当前会话的活动轨道数，`Idle` 时为 0。
    pub fn active_tracks(&self) -> usize {
        self.session.as_ref().map_or(0, CaptureSession::active_tracks)
    }

    /// 申请摄像头并进入 `Streaming`。
    ///
    /// 已在 `Streaming` 时直接返回，保证同一时刻只有一个会话持有摄像头。
    pub fn open(&mut self) -> Result<(), CaptureError> {
        if self.session.is_some() {
            log::debug!("📷 摄像头已开启，忽略重复 open");
            return Ok(());
        }

        match self.device.request_stream() {
            Ok(stream) => {
                let (width, height) = stream.dimensions();
                log::info!(
                    "📷 摄像头已开启 - 尺寸: {}x{} 轨道数: {}",
                    width,
                    height,
                    stream.active_tracks()
                );
                self.session = Some(CaptureSession::new(stream));
                Ok(())
            }
            Err(err) => {
                log::warn!("⚠️ 摄像头开启失败：{}", err);
                self.notifier.alert(DEVICE_UNAVAILABLE_MESSAGE);
                Err(match err {
                    CaptureError::DeviceUnavailable(_) => err,
                    other => CaptureError::DeviceUnavailable(other.to_string()),
                })
            }
        }
    }

    /// 抓取当前帧并编码为 JPEG 负载，随后无条件释放摄像头。
    pub fn capture_frame(&mut self) -> Result<ImagePayload, CaptureError> {
        let mut session = self.session.take().ok_or(CaptureError::NotStreaming)?;

        let canvas = session.snapshot();
        session.release();
        let canvas = canvas?;

        let bytes = encode::encode_jpeg(&canvas, self.jpeg_quality)?;
        log::info!(
            "📸 拍照完成 - 尺寸: {}x{} JPEG: {}KB 质量: {}",
            canvas.width(),
            canvas.height(),
            bytes.len() / 1024,
            self.jpeg_quality
        );

        Ok(ImagePayload::new(bytes, "image/jpeg", self.file_name.clone()))
    }

    /// 关闭摄像头；`Idle` 下为空操作。
    pub fn close(&mut self) {
        match self.session.take() {
            Some(session) => session.release(),
            None => log::debug!("📷 摄像头未开启，close 为空操作"),
        }
    }
}
