//! # Tauri 插件层
//!
//! ## 设计思路
//!
//! 命令层仅做 IPC 参数接收与结果返回，不承载业务逻辑，全部委托给
//! `RootController`。网络请求期间不持有控制器锁：先在锁内拍照/读取文件并
//! 取出编排器句柄，释放锁后再提交，保证请求进行中摄像头与文件选择仍可操作。
//!
//! 会话快照的每次变化都以 `pixproof://session` 事件推送给前端。
//! 宿主应用需同时注册 `tauri_plugin_dialog::init()`，用于弹出摄像头不可用提示。

use std::path::PathBuf;

use tauri::plugin::{Builder, TauriPlugin};
use tauri::{AppHandle, Emitter, Manager, Runtime, State};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use tokio::sync::Mutex;

use crate::analysis::{HttpTransport, ServiceHealth, SessionSnapshot};
use crate::capture::{CameraDevice, CaptureState};
use crate::config::ClientConfig;
use crate::controller::RootController;
use crate::error::AppError;
use crate::notify::Notifier;
use crate::render::ResultView;

pub const SESSION_EVENT: &str = "pixproof://session";

pub struct PluginState {
    controller: Mutex<RootController<HttpTransport>>,
}

/// 以警告对话框提示用户。
struct DialogNotifier<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> Notifier for DialogNotifier<R> {
    /// 阻塞到用户关闭提示框；不得在主线程调用。
    fn alert(&self, message: &str) {
        log::warn!("⚠️ {}", message);
        self.app
            .dialog()
            .message(message)
            .kind(MessageDialogKind::Warning)
            .title("PixProof")
            .blocking_show();
    }
}

#[cfg(feature = "camera")]
fn default_camera() -> Box<dyn CameraDevice> {
    Box::new(crate::capture::NokhwaCamera::new(0))
}

#[cfg(not(feature = "camera"))]
fn default_camera() -> Box<dyn CameraDevice> {
    Box::new(crate::capture::UnavailableCamera)
}

pub fn init<R: Runtime>() -> TauriPlugin<R> {
    Builder::new("pixproof")
        .invoke_handler(tauri::generate_handler![
            open_camera,
            close_camera,
            camera_state,
            capture_and_analyze,
            analyze_file,
            session_snapshot,
            render_session,
            service_health
        ])
        .setup(|app, _api| {
            let config = ClientConfig::from_env();
            let transport = HttpTransport::new(&config)?;
            let notifier = std::sync::Arc::new(DialogNotifier { app: app.clone() });
            let controller = RootController::new(&config, default_camera(), transport, notifier);

            let mut updates = controller.subscribe();
            app.manage(PluginState {
                controller: Mutex::new(controller),
            });

            let handle = app.clone();
            tauri::async_runtime::spawn(async move {
                while updates.changed().await.is_ok() {
                    let snapshot = updates.borrow_and_update().clone();
                    if let Err(err) = handle.emit(SESSION_EVENT, snapshot) {
                        log::warn!("⚠️ 推送会话状态失败：{}", err);
                    }
                }
            });

            log::info!("✅ 鉴定插件已初始化");
            Ok(())
        })
        .build()
}

#[tauri::command]
async fn open_camera(state: State<'_, PluginState>) -> Result<CaptureState, AppError> {
    let mut controller = state.controller.lock().await;
    controller.open_camera()?;
    Ok(controller.camera_state())
}

#[tauri::command]
async fn close_camera(state: State<'_, PluginState>) -> Result<CaptureState, AppError> {
    let mut controller = state.controller.lock().await;
    controller.close_camera();
    Ok(controller.camera_state())
}

#[tauri::command]
async fn camera_state(state: State<'_, PluginState>) -> Result<CaptureState, AppError> {
    Ok(state.controller.lock().await.camera_state())
}

/// 拍照、释放摄像头并提交分析，返回提交后的会话快照。
#[tauri::command]
async fn capture_and_analyze(state: State<'_, PluginState>) -> Result<SessionSnapshot, AppError> {
    let (payload, analyzer) = {
        let mut controller = state.controller.lock().await;
        (controller.capture_payload()?, controller.analyzer())
    };
    analyzer.submit(payload).await;
    Ok(analyzer.snapshot())
}

/// 分析本地文件；`path` 为空表示用户取消了选择。
#[tauri::command]
async fn analyze_file(state: State<'_, PluginState>, path: Option<String>) -> Result<SessionSnapshot, AppError> {
    let path = path.map(PathBuf::from);
    let (payload, analyzer) = {
        let controller = state.controller.lock().await;
        (controller.prepare_file(path.as_deref())?, controller.analyzer())
    };
    if let Some(payload) = payload {
        analyzer.submit(payload).await;
    }
    Ok(analyzer.snapshot())
}

#[tauri::command]
async fn session_snapshot(state: State<'_, PluginState>) -> Result<SessionSnapshot, AppError> {
    Ok(state.controller.lock().await.snapshot())
}

#[tauri::command]
async fn render_session(state: State<'_, PluginState>) -> Result<Option<ResultView>, AppError> {
    Ok(state.controller.lock().await.render_current())
}

#[tauri::command]
async fn service_health(state: State<'_, PluginState>) -> Result<ServiceHealth, AppError> {
    let analyzer = state.controller.lock().await.analyzer();
    Ok(analyzer.transport().health().await?)
}
