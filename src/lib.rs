//! # 图片真伪鉴定客户端 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                前端 / 宿主应用（Tauri 插件可选）           │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ RootController（路由 + 状态订阅）
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            客户端核心 (Rust)                      │
//! │                                                          │
//! │  ┌─ capture ───── 摄像头状态机 + CaptureSession (RAII)    │
//! │  ├─ selector ──── 本地文件 → ImagePayload                 │
//! │  ├─ analysis ──── 单在途提交 + 代次过滤 + multipart POST   │
//! │  ├─ render ────── 结论 / 错误 → ResultView（纯函数）      │
//! │  ├─ config ────── 端点与采集参数                          │
//! │  ├─ notify ────── 非致命用户提示                          │
//! │  └─ error ─────── AppError (统一错误类型)                 │
//! └──────────────────────────────────────────────────────────┘
//!         ↕ HTTP  POST /analyze  (multipart: image)
//!   远端鉴定服务
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`capture`] | 摄像头开启/拍照/关闭，JPEG 编码，释放保证 |
//! | [`selector`] | 用户选中文件的读取、体积限制与 MIME 识别 |
//! | [`analysis`] | 数据模型、响应解释、HTTP 传输、请求编排 |
//! | [`render`] | 结论渲染与分数格式化 |
//! | [`controller`] | 根控制器，组合以上模块 |
//! | [`config`] | `ClientConfig` 与环境变量覆盖 |
//! | [`notify`] | `Notifier` 用户提示接缝 |
//! | [`error`] | 统一错误类型 `AppError` |

pub mod analysis;
pub mod capture;
pub mod config;
pub mod controller;
pub mod error;
pub mod notify;
#[cfg(feature = "tauri")]
pub mod plugin;
pub mod render;
pub mod selector;

pub use analysis::{
    AnalysisError,
    AnalysisOutcome,
    AnalysisResult,
    AnalysisTransport,
    Analyzer,
    Completion,
    ErrorState,
    HttpTransport,
    ImagePayload,
    SessionSnapshot,
};
pub use capture::{CameraDevice, CaptureController, CaptureError, CaptureState, MediaStream, UnavailableCamera};
pub use config::ClientConfig;
pub use controller::RootController;
pub use error::AppError;
pub use notify::{LogNotifier, Notifier};
pub use render::{ResultView, render};
pub use selector::{FileSelector, SelectionError};

/// 初始化日志（默认 `info`，可用 `RUST_LOG` 覆盖）。重复调用是安全的。
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}
