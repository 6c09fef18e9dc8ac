//! 用户提示接缝
//!
//! 摄像头不可用、本地文件读取失败等问题不进入结论/错误槽位，
//! 而是立即通过 `Notifier` 以非致命提示的方式告知用户。
//! 宿主可接入对话框、托盘气泡等；默认实现只写日志。

/// 摄像头无法打开时展示的文案。
pub const DEVICE_UNAVAILABLE_MESSAGE: &str = "无法访问摄像头：权限被拒绝或设备不可用。";

pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// 仅记录日志的提示实现。
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        log::warn!("🔔 {}", message);
    }
}
