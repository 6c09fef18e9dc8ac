//! # 本地文件选择
//!
//! ## 设计思路
//!
//! 用户取消选择（`None`）不是错误：返回 `Ok(None)`，不触碰任何状态。
//! 选中文件只在无法读取（或超出可选的体积上限）时失败；内容是否为有效图片
//! 由分析服务判定。MIME 类型优先由文件内容识别（`infer`），识别不出时按扩展名
//! 推断，仍无结果则为 `application/octet-stream`。

use std::path::Path;

use crate::analysis::ImagePayload;
use crate::config::ClientConfig;

/// 文件选择错误，经 `Notifier` 提示用户，不进入结论/错误槽位。
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("文件过大：{size_mb:.2} MB（限制：{limit_mb:.2} MB）")]
    TooLarge { size_mb: f64, limit_mb: f64 },
}

#[derive(Debug, Clone)]
pub struct FileSelector {
    max_file_size: Option<u64>,
}

impl FileSelector {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
        }
    }

    /// 将用户选中的文件转换为负载；取消选择时返回 `Ok(None)`。
    pub fn select_file(&self, handle: Option<&Path>) -> Result<Option<ImagePayload>, SelectionError> {
        let Some(path) = handle else {
            log::debug!("📁 未选择文件，忽略");
            return Ok(None);
        };

        log::info!("📁 读取本地图片 - 路径: {}", path.display());

        let metadata = std::fs::metadata(path)
            .map_err(|e| SelectionError::FileSystem(format!("无法读取文件信息（{}）：{}", path.display(), e)))?;
        if !metadata.is_file() {
            return Err(SelectionError::FileSystem(format!("不是文件：{}", path.display())));
        }
        self.check_size(metadata.len())?;

        let bytes = std::fs::read(path)
            .map_err(|e| SelectionError::FileSystem(format!("无法读取图片文件：{}", e)))?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        self.payload_from_bytes(file_name, bytes).map(Some)
    }

    /// 由内存中的文件内容构建负载（例如前端直接传入的字节）。
    pub fn payload_from_bytes(&self, file_name: impl Into<String>, bytes: Vec<u8>) -> Result<ImagePayload, SelectionError> {
        let file_name = file_name.into();
        self.check_size(bytes.len() as u64)?;

        let sniffed = infer::get(&bytes);
        let mime_type = match &sniffed {
            Some(kind) if kind.matcher_type() == infer::MatcherType::Image => kind.mime_type(),
            _ => mime_from_extension(&file_name)
                .or_else(|| sniffed.map(|kind| kind.mime_type()))
                .unwrap_or(FALLBACK_MIME),
        };

        log::debug!("📁 已载入图片 - 文件: {} 类型: {} 大小: {}B", file_name, mime_type, bytes.len());
        Ok(ImagePayload::new(bytes, mime_type, file_name))
    }

    fn check_size(&self, size: u64) -> Result<(), SelectionError> {
        match self.max_file_size {
            Some(limit) if size > limit => Err(SelectionError::TooLarge {
                size_mb: size as f64 / 1024.0 / 1024.0,
                limit_mb: limit as f64 / 1024.0 / 1024.0,
            }),
            _ => Ok(()),
        }
    }
}

const FALLBACK_MIME: &str = "application/octet-stream";

/// 内容签名无法识别时（如 SVG 这类文本格式）按扩展名推断。
fn mime_from_extension(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    let mime = match extension.to_ascii_lowercase().as_str() {
        "svg" | "svgz" => "image/svg+xml",
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/vnd.microsoft.icon",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;
    use std::path::PathBuf;

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30]));
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("pixproof-{}-{}", std::process::id(), name));
        std::fs::write(&path, bytes).expect("write temp file");
        path
    }

    #[test]
    fn cancelled_selection_is_skipped() {
        let selector = FileSelector::new(&ClientConfig::default());
        assert!(matches!(selector.select_file(None), Ok(None)));
    }

    #[test]
    fn selected_png_keeps_name_and_sniffed_mime() {
        let path = temp_file("photo.png", &png_bytes());
        let selector = FileSelector::new(&ClientConfig::default());

        let payload = selector
            .select_file(Some(&path))
            .expect("selection should succeed")
            .expect("payload present");
        assert_eq!(payload.mime_type(), "image/png");
        assert!(payload.file_name().ends_with("photo.png"));
        assert_eq!(payload.bytes(), png_bytes().as_slice());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn svg_is_forwarded_with_extension_mime() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><rect width="4" height="4"/></svg>"#;
        let path = temp_file("vector.svg", svg);
        let selector = FileSelector::new(&ClientConfig::default());

        let payload = selector
            .select_file(Some(&path))
            .expect("svg selection should succeed")
            .expect("payload present");
        assert_eq!(payload.mime_type(), "image/svg+xml");
        assert_eq!(payload.bytes(), svg.as_slice());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn unknown_content_is_forwarded_as_octet_stream() {
        let path = temp_file("notes.txt", b"just some text");
        let selector = FileSelector::new(&ClientConfig::default());

        let payload = selector
            .select_file(Some(&path))
            .expect("selection should succeed")
            .expect("payload present");
        assert_eq!(payload.mime_type(), "application/octet-stream");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn large_file_is_accepted_without_configured_limit() {
        let selector = FileSelector::new(&ClientConfig::default());
        let bytes = vec![0u8; 64 * 1024 * 1024 + 1];
        assert!(selector.payload_from_bytes("big.raw", bytes).is_ok());
    }

    #[test]
    fn oversized_file_is_rejected_when_limit_configured() {
        let mut config = ClientConfig::default();
        config.max_file_size = Some(16);
        let selector = FileSelector::new(&config);

        assert!(matches!(
            selector.payload_from_bytes("big.png", png_bytes()),
            Err(SelectionError::TooLarge { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_filesystem_error() {
        let selector = FileSelector::new(&ClientConfig::default());
        let path = std::env::temp_dir().join("pixproof-definitely-missing.png");
        assert!(matches!(
            selector.select_file(Some(&path)),
            Err(SelectionError::FileSystem(_))
        ));
    }
}
