//! # 帧编码
//!
//! 离屏画布 → JPEG 字节。质量由配置给出（默认 95）。

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, RgbImage};

use super::CaptureError;

pub(crate) fn encode_jpeg(canvas: &RgbImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return Err(CaptureError::Encode(format!(
            "画面尺寸无效：{}x{}（视频流尚未就绪）",
            width, height
        )));
    }

    let mut buffer = Vec::with_capacity((width as usize * height as usize) / 4);
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode(canvas.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| CaptureError::Encode(format!("JPEG 编码失败：{}", e)))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};

    #[test]
    fn encodes_decodable_jpeg_with_same_dimensions() {
        let canvas = RgbImage::from_fn(64, 48, |x, y| Rgb([(x * 4) as u8, (y * 5) as u8, 128]));
        let bytes = encode_jpeg(&canvas, 95).expect("encode should succeed");

        assert_eq!(image::guess_format(&bytes).expect("format"), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&bytes).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn rejects_empty_canvas() {
        let canvas = RgbImage::new(0, 0);
        assert!(matches!(encode_jpeg(&canvas, 95), Err(CaptureError::Encode(_))));
    }
}
