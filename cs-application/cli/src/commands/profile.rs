//! profile 管理命令

use anyhow::Result;
use colored::Colorize;

use crate::config::{CliConfig, ProfileConfig};
use crate::ProfileAction;

pub fn handle(action: ProfileAction) -> Result<()> {
    match action {
        ProfileAction::Add {
            name,
            url,
            api_key,
            secret_key,
            async_timeout,
            wait_forever,
            no_async,
            poll_interval,
            insecure,
        } => {
            let profile = ProfileConfig {
                async_mode: !no_async,
                async_timeout,
                wait_forever,
                poll_interval,
                verify_ssl: !insecure,
                ..ProfileConfig::new(&url, &api_key, &secret_key)
            };
            add_profile(&name, profile)
        }
        ProfileAction::List => list_profiles(),
        ProfileAction::Remove { name } => remove_profile(&name),
        ProfileAction::Use { name } => use_profile(&name),
    }
}

fn add_profile(name: &str, profile: ProfileConfig) -> Result<()> {
    let mut config = CliConfig::load()?;
    let url = profile.api_url.clone();
    config.add_profile(name, profile)?;
    config.save()?;

    println!("{} profile {} 添加成功", "✓".green().bold(), name.cyan().bold());
    println!("  地址: {}", url.yellow());
    if config.default_profile.as_deref() == Some(name) {
        println!("  {}", "已设为默认 profile".bright_black());
    }

    Ok(())
}

fn list_profiles() -> Result<()> {
    let config = CliConfig::load()?;
    let profiles = config.list_profiles();

    if profiles.is_empty() {
        println!("{}", "没有配置任何 profile".yellow());
        println!("\n使用以下命令添加:");
        println!(
            "  {} cs profile add <NAME> --url <URL> --api-key <KEY> --secret-key <SECRET>",
            "$".bright_black()
        );
        return Ok(());
    }

    println!("{}\n", "配置的 profile 列表:".bold());

    for (name, profile) in profiles {
        let marker = if config.default_profile.as_deref() == Some(name) {
            "*".green().bold()
        } else {
            " ".normal()
        };
        println!("{} {}", marker, name.cyan().bold());
        println!("    地址: {}", profile.api_url.yellow());

        let wait = if !profile.async_mode {
            "不等待".to_string()
        } else if profile.wait_forever {
            "一直等待".to_string()
        } else {
            format!("最多 {} 秒", profile.async_timeout)
        };
        println!(
            "    异步任务: {} (每 {} 秒查询)",
            wait.bright_black(),
            profile.poll_interval
        );
        if !profile.verify_ssl {
            println!("    {}", "跳过 SSL 证书验证".red());
        }
        println!();
    }

    Ok(())
}

fn remove_profile(name: &str) -> Result<()> {
    let mut config = CliConfig::load()?;
    config.remove_profile(name)?;
    config.save()?;

    println!("{} profile {} 已移除", "✓".green().bold(), name.cyan().bold());
    Ok(())
}

fn use_profile(name: &str) -> Result<()> {
    let mut config = CliConfig::load()?;
    config.set_default_profile(name)?;
    config.save()?;

    println!("{} 默认 profile: {}", "✓".green().bold(), name.cyan().bold());
    Ok(())
}
