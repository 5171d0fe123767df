//! 公共工具函数模块
//!
//! 提供各命令模块共享的功能，包括：
//! - 按 profile 创建 CloudStack 客户端
//! - 异步调用结果的统一输出

use anyhow::{Context, Result};
use colored::Colorize;
use cs_client::{AsyncResult, ClientConfig, CloudStackClient};
use tracing::info;

use crate::config::CliConfig;
use crate::GlobalArgs;

/// 把命令行参数叠加到 profile 配置上
pub fn apply_overrides(mut config: ClientConfig, global: &GlobalArgs) -> ClientConfig {
    if let Some(timeout) = global.timeout {
        config = config.with_async_timeout(Some(timeout));
    }
    if global.no_wait {
        config = config.with_async_mode(false);
    }
    config
}

/// 按 profile 创建客户端
pub fn create_client(global: &GlobalArgs) -> Result<CloudStackClient> {
    let cli_config = CliConfig::load()?;
    let profile = cli_config.get_profile(global.profile.as_deref())?;

    let config = apply_overrides(profile.to_client_config(), global);
    info!("使用管理服务器: {}", config.api_url);

    CloudStackClient::new(config).context("创建 CloudStack 客户端失败")
}

/// 输出异步调用结果
///
/// 任务完成时调用 `describe` 输出结果；超时或未等待时提示 jobid，
/// 之后可以用 `cs job wait <jobid>` 继续等待。
pub fn report_async<T>(action: &str, result: &AsyncResult<T>, describe: impl Fn(&T)) {
    match result {
        AsyncResult::Completed(response) => {
            println!("{} {} 完成", "✓".green().bold(), action);
            describe(response);
        }
        AsyncResult::TimedOut { job_id, .. } => {
            println!(
                "{} {} 等待超时，任务仍在执行: {}",
                "⏳".yellow(),
                action,
                job_id.cyan().bold()
            );
            println!("  继续等待: {} cs job wait {}", "$".bright_black(), job_id);
        }
        AsyncResult::Submitted { job_id, .. } => {
            println!(
                "{} {} 已提交: {}",
                "→".blue().bold(),
                action,
                job_id.cyan().bold()
            );
            println!("  查询进度: {} cs job query {}", "$".bright_black(), job_id);
        }
    }
}

/// 是否为 CloudStack UUID 形式的资源 ID
pub fn is_uuid(value: &str) -> bool {
    value.len() == 36
        && value.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}

/// 空字段显示为 "-"
pub fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base() -> ClientConfig {
        ClientConfig::new("http://mgmt:8080/client/api", "key", "secret")
    }

    #[test]
    fn test_apply_overrides() {
        let config = apply_overrides(base(), &GlobalArgs::default());
        assert!(config.async_mode);
        assert_eq!(config.async_timeout(), Some(Duration::from_secs(300)));

        let global = GlobalArgs {
            profile: None,
            timeout: Some(0),
            no_wait: true,
        };
        let config = apply_overrides(base(), &global);
        assert!(!config.async_mode);
        assert_eq!(config.async_timeout(), Some(Duration::ZERO));
    }

    #[test]
    fn test_is_uuid() {
        assert!(is_uuid("3b2a7c1e-0f4d-4e8a-9c6b-1d2e3f4a5b6c"));
        assert!(!is_uuid("kvm-host-01"));
        assert!(!is_uuid("3b2a7c1e00f4d04e8a09c6b01d2e3f4a5b6c"));
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(""), "-");
        assert_eq!(or_dash("Up"), "Up");
    }
}
