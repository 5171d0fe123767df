//! CloudStack 客户端配置

use std::time::Duration;

use crate::error::{CloudStackError, Result};

/// 默认异步任务等待时间（秒）
pub const DEFAULT_ASYNC_TIMEOUT: u64 = 300;

/// 默认轮询间隔（秒）
pub const DEFAULT_POLL_INTERVAL: u64 = 3;

/// CloudStack 客户端配置
///
/// 在创建客户端时一次性设置，之后每次调用只读不改。
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API 地址，例如 `http://mgmt:8080/client/api`
    pub api_url: String,

    /// API Key
    pub api_key: String,

    /// Secret Key（用于请求签名）
    pub secret_key: String,

    /// 是否自动等待异步任务完成
    pub async_mode: bool,

    /// 异步任务等待上限（秒），`None` 表示一直等待
    ///
    /// `Some(0)` 只查询一次，任务未完成即返回
    pub async_timeout: Option<u64>,

    /// 轮询间隔（秒）
    pub poll_interval: u64,

    /// 连接超时（秒）
    pub connect_timeout: u64,

    /// 请求超时（秒）
    pub request_timeout: u64,

    /// 是否验证 SSL 证书
    pub verify_ssl: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            secret_key: String::new(),
            async_mode: true,
            async_timeout: Some(DEFAULT_ASYNC_TIMEOUT),
            poll_interval: DEFAULT_POLL_INTERVAL,
            connect_timeout: 10,
            request_timeout: 60,
            verify_ssl: true,
        }
    }
}

impl ClientConfig {
    /// 使用 API 地址和密钥创建配置，其余取默认值
    pub fn new(api_url: &str, api_key: &str, secret_key: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            secret_key: secret_key.to_string(),
            ..Default::default()
        }
    }

    /// 设置是否自动等待异步任务
    pub fn with_async_mode(mut self, enabled: bool) -> Self {
        self.async_mode = enabled;
        self
    }

    /// 设置异步任务等待上限
    pub fn with_async_timeout(mut self, secs: Option<u64>) -> Self {
        self.async_timeout = secs;
        self
    }

    pub fn with_poll_interval(mut self, secs: u64) -> Self {
        self.poll_interval = secs;
        self
    }

    pub fn with_verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// 异步任务等待上限
    pub fn async_timeout(&self) -> Option<Duration> {
        self.async_timeout.map(Duration::from_secs)
    }

    /// 轮询间隔
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api_url)
            .map_err(|e| CloudStackError::ConfigError(format!("无效的 API 地址 {}: {}", self.api_url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(CloudStackError::ConfigError(format!(
                "不支持的协议: {}",
                url.scheme()
            )));
        }
        if self.api_key.is_empty() {
            return Err(CloudStackError::ConfigError("API Key 不能为空".to_string()));
        }
        if self.secret_key.is_empty() {
            return Err(CloudStackError::ConfigError("Secret Key 不能为空".to_string()));
        }
        if self.poll_interval == 0 {
            return Err(CloudStackError::ConfigError("轮询间隔必须大于 0 秒".to_string()));
        }

        Ok(())
    }
}
