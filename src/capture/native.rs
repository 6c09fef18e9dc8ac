//! # 本机摄像头（nokhwa）
//!
//! `nokhwa::Camera` 不能跨线程移动，因此由专属线程持有：
//! 线程启动时打开视频流并回报尺寸，之后按请求逐帧解码为 RGB；
//! 请求通道关闭即停止视频流并退出线程。

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use image::RgbImage;
use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};

use super::{CameraDevice, CaptureError, MediaStream};

type FrameReply = Sender<Result<RgbImage, CaptureError>>;

/// 按索引打开的本机摄像头。
#[derive(Debug, Clone, Copy, Default)]
pub struct NokhwaCamera {
    index: u32,
}

impl NokhwaCamera {
    pub fn new(index: u32) -> Self {
        Self { index }
    }
}

impl CameraDevice for NokhwaCamera {
    fn request_stream(&mut self) -> Result<Box<dyn MediaStream>, CaptureError> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (request_tx, request_rx) = mpsc::channel::<FrameReply>();
        let index = self.index;

        let worker = thread::Builder::new()
            .name("pixproof-camera".to_string())
            .spawn(move || camera_worker(index, ready_tx, request_rx))
            .map_err(|e| CaptureError::DeviceUnavailable(format!("无法启动摄像头线程：{}", e)))?;

        let dimensions = match ready_rx.recv() {
            Ok(Ok(dimensions)) => dimensions,
            Ok(Err(err)) => {
                let _ = worker.join();
                return Err(err);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(CaptureError::DeviceUnavailable("摄像头线程意外退出".to_string()));
            }
        };

        Ok(Box::new(NokhwaStream {
            requests: Some(request_tx),
            worker: Some(worker),
            dimensions,
        }))
    }
}

struct NokhwaStream {
    requests: Option<Sender<FrameReply>>,
    worker: Option<JoinHandle<()>>,
    dimensions: (u32, u32),
}

impl MediaStream for NokhwaStream {
    fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    fn grab_frame(&mut self) -> Result<RgbImage, CaptureError> {
        let requests = self.requests.as_ref().ok_or(CaptureError::NotStreaming)?;
        let (reply_tx, reply_rx) = mpsc::channel();
        requests
            .send(reply_tx)
            .map_err(|_| CaptureError::Frame("摄像头线程已退出".to_string()))?;
        reply_rx
            .recv()
            .map_err(|_| CaptureError::Frame("摄像头线程未返回画面".to_string()))?
    }

    fn active_tracks(&self) -> usize {
        usize::from(self.requests.is_some())
    }

    fn stop_tracks(&mut self) {
        // 关闭请求通道，线程随即停止视频流
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("⚠️ 摄像头线程异常退出");
            }
        }
    }
}

fn camera_worker(index: u32, ready: Sender<Result<(u32, u32), CaptureError>>, requests: Receiver<FrameReply>) {
    let mut camera = match open_camera(index) {
        Ok(camera) => camera,
        Err(err) => {
            let _ = ready.send(Err(err));
            return;
        }
    };

    let resolution = camera.resolution();
    if ready.send(Ok((resolution.width(), resolution.height()))).is_err() {
        let _ = camera.stop_stream();
        return;
    }

    while let Ok(reply) = requests.recv() {
        let _ = reply.send(grab_rgb(&mut camera));
    }

    if let Err(err) = camera.stop_stream() {
        log::warn!("⚠️ 停止摄像头视频流失败：{}", err);
    }
}

fn open_camera(index: u32) -> Result<Camera, CaptureError> {
    let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
    let mut camera = Camera::new(CameraIndex::Index(index), format)
        .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
    camera
        .open_stream()
        .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
    Ok(camera)
}

fn grab_rgb(camera: &mut Camera) -> Result<RgbImage, CaptureError> {
    let buffer = camera
        .frame()
        .map_err(|e| CaptureError::Frame(e.to_string()))?;
    let decoded = buffer
        .decode_image::<RgbFormat>()
        .map_err(|e| CaptureError::Frame(e.to_string()))?;

    let (width, height) = (decoded.width(), decoded.height());
    RgbImage::from_raw(width, height, decoded.into_raw())
        .ok_or_else(|| CaptureError::Frame("帧数据长度与尺寸不符".to_string()))
}
