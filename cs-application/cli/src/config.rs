//! CLI 配置管理
//!
//! **数据存储方式**: TOML 文件 (~/.config/cloudstack/config.toml)
//!
//! 每个 profile 对应一个管理服务器的 API 地址和密钥，第一个添加的
//! profile 自动成为默认 profile。

use anyhow::{Context, Result};
use cs_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// CLI 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// profile 列表
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,

    /// 默认 profile 名称
    pub default_profile: Option<String>,

    /// 配置版本
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_true() -> bool {
    true
}

fn default_async_timeout() -> u64 {
    cs_client::config::DEFAULT_ASYNC_TIMEOUT
}

fn default_poll_interval() -> u64 {
    cs_client::config::DEFAULT_POLL_INTERVAL
}

/// 管理服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// API 地址
    pub api_url: String,

    pub api_key: String,

    pub secret_key: String,

    /// 是否等待异步任务完成
    #[serde(default = "default_true")]
    pub async_mode: bool,

    /// 异步任务等待上限（秒）
    #[serde(default = "default_async_timeout")]
    pub async_timeout: u64,

    /// 忽略等待上限，一直等待
    #[serde(default)]
    pub wait_forever: bool,

    /// 轮询间隔（秒）
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    #[serde(default = "default_true")]
    pub verify_ssl: bool,
}

impl ProfileConfig {
    pub fn new(api_url: &str, api_key: &str, secret_key: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            secret_key: secret_key.to_string(),
            async_mode: true,
            async_timeout: default_async_timeout(),
            wait_forever: false,
            poll_interval: default_poll_interval(),
            verify_ssl: true,
        }
    }

    /// 转换为客户端配置
    pub fn to_client_config(&self) -> ClientConfig {
        let timeout = (!self.wait_forever).then_some(self.async_timeout);

        ClientConfig::new(&self.api_url, &self.api_key, &self.secret_key)
            .with_async_mode(self.async_mode)
            .with_async_timeout(timeout)
            .with_poll_interval(self.poll_interval)
            .with_verify_ssl(self.verify_ssl)
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            profiles: HashMap::new(),
            default_profile: None,
            version: default_version(),
        }
    }
}

impl CliConfig {
    /// 获取配置文件路径
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("无法获取用户主目录")?;
        Ok(home.join(".config").join("cloudstack").join("config.toml"))
    }

    /// 加载配置
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("解析配置文件失败: {:?}", path))
    }

    /// 保存配置
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("创建配置目录失败: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("序列化配置失败")?;

        fs::write(&path, content).with_context(|| format!("写入配置文件失败: {:?}", path))?;

        Ok(())
    }

    /// 添加 profile
    pub fn add_profile(&mut self, name: &str, profile: ProfileConfig) -> Result<()> {
        if self.profiles.contains_key(name) {
            anyhow::bail!("profile {} 已存在", name);
        }

        profile
            .to_client_config()
            .validate()
            .with_context(|| format!("profile {} 配置无效", name))?;

        self.profiles.insert(name.to_string(), profile);

        // 第一个 profile 作为默认值
        if self.default_profile.is_none() {
            self.default_profile = Some(name.to_string());
        }

        Ok(())
    }

    /// 移除 profile
    pub fn remove_profile(&mut self, name: &str) -> Result<()> {
        if self.profiles.remove(name).is_none() {
            anyhow::bail!("profile {} 不存在", name);
        }

        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }

        Ok(())
    }

    /// 获取 profile，未指定名称时使用默认 profile
    pub fn get_profile(&self, name: Option<&str>) -> Result<&ProfileConfig> {
        let name = match name.or(self.default_profile.as_deref()) {
            Some(name) => name,
            None => anyhow::bail!("未指定 profile，且没有默认 profile (使用 `cs profile add` 添加)"),
        };

        self.profiles
            .get(name)
            .with_context(|| format!("profile {} 不存在", name))
    }

    /// 按名称排序列出所有 profile
    pub fn list_profiles(&self) -> Vec<(&str, &ProfileConfig)> {
        let mut profiles: Vec<_> = self
            .profiles
            .iter()
            .map(|(name, config)| (name.as_str(), config))
            .collect();
        profiles.sort_by(|a, b| a.0.cmp(b.0));
        profiles
    }

    /// 设置默认 profile
    pub fn set_default_profile(&mut self, name: &str) -> Result<()> {
        if !self.profiles.contains_key(name) {
            anyhow::bail!("profile {} 不存在", name);
        }

        self.default_profile = Some(name.to_string());
        Ok(())
    }
}
