//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 各子模块保留自己的错误枚举（采集 / 文件选择 / 分析 / 配置），
//! 对外入口统一上转为 `AppError`，调用方只需处理一种类型。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息，并为各子错误提供 `From` 转换。
//! - 实现 `Serialize` 将错误序列化为字符串，满足 IPC 返回要求。
//! - 分析阶段的错误通常不会走到这里：编排器会把它们转换为 `ErrorState` 发布。

use serde::Serialize;

use crate::analysis::AnalysisError;
use crate::capture::CaptureError;
use crate::config::ConfigError;
use crate::selector::SelectionError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 摄像头申请 / 拍照 / 编码失败
    #[error("{0}")]
    Capture(#[from] CaptureError),

    /// 本地文件读取或识别失败
    #[error("{0}")]
    Selection(#[from] SelectionError),

    /// 网络交换失败（健康检查等直接调用场景）
    #[error("{0}")]
    Analysis(#[from] AnalysisError),

    /// 配置非法
    #[error("配置错误：{0}")]
    Config(#[from] ConfigError),
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
