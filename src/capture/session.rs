//! # 采集会话（RAII）
//!
//! `CaptureSession` 独占一路摄像头流。释放动作只在一处注册：`Drop`。
//! 拍照、主动关闭、控制器销毁三条路径都只是丢弃会话，
//! 不在各调用点重复“停止所有轨道”的逻辑。

use image::RgbImage;

use super::{CaptureError, MediaStream};

/// 一次摄像头授权的生命周期。
pub struct CaptureSession {
    stream: Option<Box<dyn MediaStream>>,
}

impl CaptureSession {
    pub(crate) fn new(stream: Box<dyn MediaStream>) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// 当前活动轨道数。
    pub fn active_tracks(&self) -> usize {
        self.stream.as_ref().map_or(0, |stream| stream.active_tracks())
    }

    /// 将当前帧绘制到与流尺寸一致的离屏画布上。
    pub(crate) fn snapshot(&mut self) -> Result<RgbImage, CaptureError> {
        let stream = self.stream.as_mut().ok_or(CaptureError::NotStreaming)?;
        let (width, height) = stream.dimensions();
        let frame = stream.grab_frame()?;

        let mut canvas = RgbImage::new(width, height);
        image::imageops::replace(&mut canvas, &frame, 0, 0);
        Ok(canvas)
    }

    /// 显式结束会话，等价于丢弃。
    pub fn release(self) {}
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let tracks = stream.active_tracks();
            stream.stop_tracks();
            log::info!("📷 摄像头已释放 - 停止轨道数: {}", tracks);
        }
    }
}
