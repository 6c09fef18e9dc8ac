//! # 配置模块
//!
//! ## 设计思路
//!
//! 将客户端所有“可调参数”集中到 `ClientConfig`：分析服务地址、拍照 JPEG 质量、
//! 本地文件体积上限与拍照文件名。
//!
//! ## 实现思路
//!
//! - `Default` 提供本地开发可用的配置（`http://localhost:5000/analyze`）。
//! - `from_env` 读取 `PIXPROOF_API_URL` 覆盖服务地址，覆盖值即完整的分析端点。
//! - `validate` 在构建 HTTP 传输层前尽早失败。
//! - 不配置请求超时：服务无响应时保持“分析中”，由上层决定是否取消。

/// 覆盖分析端点的环境变量名。
pub const API_URL_ENV: &str = "PIXPROOF_API_URL";

/// 未覆盖时使用的分析端点。
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/analyze";

/// 配置校验错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("分析服务地址无效：{0}")]
    InvalidEndpoint(String),

    #[error("JPEG 质量必须在 1~100 之间：{0}")]
    InvalidQuality(u8),
}

/// 客户端配置。
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 分析端点（完整 URL，直接作为 POST 目标）。
    pub endpoint: String,
    /// 拍照编码 JPEG 的质量（0.95 对应 95）。
    pub jpeg_quality: u8,
    /// 本地选择文件的体积上限（字节），`None` 表示不限制。
    pub max_file_size: Option<u64>,
    /// 拍照产生的负载文件名。
    pub capture_file_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            jpeg_quality: 95,
            max_file_size: None,
            capture_file_name: "capture.jpg".to_string(),
        }
    }
}

impl ClientConfig {
    /// 从进程环境读取配置。
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 以任意键值来源构建配置，空白值视为未设置。
    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(endpoint) = lookup(API_URL_ENV) {
            let endpoint = endpoint.trim();
            if !endpoint.is_empty() {
                config.endpoint = endpoint.to_string();
            }
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| ConfigError::InvalidEndpoint(format!("{}（{}）", self.endpoint, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint(format!(
                "仅支持 http/https 协议：{}",
                self.endpoint
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidQuality(self.jpeg_quality));
        }
        Ok(())
    }

    /// 服务根地址：去掉端点路径，用于健康检查。
    pub fn service_root(&self) -> Result<reqwest::Url, ConfigError> {
        let mut url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| ConfigError::InvalidEndpoint(format!("{}（{}）", self.endpoint, e)))?;
        url.set_path("/");
        url.set_query(None);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_override_uses_local_default() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config.endpoint, "http://localhost:5000/analyze");
        assert_eq!(config.jpeg_quality, 95);
    }

    #[test]
    fn override_is_used_verbatim() {
        let config = ClientConfig::from_lookup(|key| {
            (key == API_URL_ENV).then(|| " https://forensics.example.com/v2/analyze ".to_string())
        });
        assert_eq!(config.endpoint, "https://forensics.example.com/v2/analyze");
    }

    #[test]
    fn blank_override_is_ignored() {
        let config = ClientConfig::from_lookup(|_| Some("   ".to_string()));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = ClientConfig::default();
        config.endpoint = "ftp://host/analyze".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidEndpoint(_))));

        let mut config = ClientConfig::default();
        config.endpoint = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidEndpoint(_))));

        let mut config = ClientConfig::default();
        config.jpeg_quality = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidQuality(0))));

        assert!(ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn service_root_strips_analyze_path() {
        let config = ClientConfig::default();
        let root = config.service_root().expect("default endpoint parses");
        assert_eq!(root.as_str(), "http://localhost:5000/");
    }
}
