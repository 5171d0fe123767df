//! CloudStack CLI 应用

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "cs")]
#[command(about = "CloudStack 命令行工具 - 主机与系统虚拟机管理", long_about = None)]
#[command(version)]
struct Cli {
    /// 日志级别
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// 各命令共享的参数
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// 使用的 profile (默认使用配置中的默认 profile)
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// 覆盖异步任务等待上限（秒），0 表示只查询一次
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// 不等待异步任务，提交后立即返回 jobid
    #[arg(long, global = true)]
    pub no_wait: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 管理服务器 profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// 主机管理
    Host {
        #[command(subcommand)]
        action: HostAction,
    },

    /// 系统虚拟机管理
    #[command(name = "systemvm", alias = "svm")]
    SystemVm {
        #[command(subcommand)]
        action: SystemVmAction,
    },

    /// 异步任务
    Job {
        #[command(subcommand)]
        action: JobAction,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// 添加 profile
    Add {
        /// profile 名称
        name: String,
        /// API 地址，例如 http://mgmt:8080/client/api
        #[arg(long)]
        url: String,
        #[arg(long)]
        api_key: String,
        #[arg(long)]
        secret_key: String,
        /// 异步任务等待上限（秒）
        #[arg(long, default_value = "300")]
        async_timeout: u64,
        /// 一直等待异步任务完成
        #[arg(long, conflicts_with = "no_async")]
        wait_forever: bool,
        /// 不等待异步任务
        #[arg(long)]
        no_async: bool,
        /// 轮询间隔（秒）
        #[arg(long, default_value = "3")]
        poll_interval: u64,
        /// 跳过 SSL 证书验证
        #[arg(long)]
        insecure: bool,
    },
    /// 列出 profile
    List,
    /// 移除 profile
    Remove { name: String },
    /// 设置默认 profile
    Use { name: String },
}

#[derive(Subcommand)]
pub enum HostAction {
    /// 列出主机
    List {
        /// 区域 ID
        #[arg(short, long)]
        zone: Option<String>,
        /// 主机状态 (Up/Down/Disconnected...)
        #[arg(short, long)]
        state: Option<String>,
        /// 主机类型 (Routing/SecondaryStorage...)
        #[arg(short = 't', long = "type")]
        host_type: Option<String>,
        /// 输出格式 (table/json)
        #[arg(short = 'f', long, default_value = "table")]
        format: String,
    },
    /// 查看主机详情 (ID 或名称)
    Get { host: String },
    /// 进入维护模式
    Maintenance { host: String },
    /// 退出维护模式
    CancelMaintenance { host: String },
    /// 重新连接主机
    Reconnect { host: String },
}

#[derive(Subcommand)]
pub enum SystemVmAction {
    /// 列出系统虚拟机
    List {
        /// 类型 (consoleproxy/secondarystoragevm)
        #[arg(short = 't', long = "type")]
        vm_type: Option<String>,
        /// 状态
        #[arg(short, long)]
        state: Option<String>,
        /// 区域 ID
        #[arg(short, long)]
        zone: Option<String>,
        /// 输出格式 (table/json)
        #[arg(short = 'f', long, default_value = "table")]
        format: String,
    },
    /// 启动
    Start { vm: String },
    /// 停止
    Stop {
        vm: String,
        /// 强制停止
        #[arg(long)]
        forced: bool,
    },
    /// 重启
    Reboot { vm: String },
    /// 销毁
    Destroy { vm: String },
    /// 迁移到指定主机
    Migrate {
        vm: String,
        /// 目标主机 (ID 或名称)
        host: String,
    },
}

#[derive(Subcommand)]
pub enum JobAction {
    /// 查询任务状态 (单次)
    Query { job_id: String },
    /// 等待任务完成
    Wait { job_id: String },
    /// 列出任务
    List {
        /// 列出所有账户的任务
        #[arg(short, long)]
        all: bool,
        /// 起始时间 (yyyy-MM-dd'T'HH:mm:ssZ)
        #[arg(long)]
        since: Option<String>,
        /// 输出格式 (table/json)
        #[arg(short = 'f', long, default_value = "table")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("CloudStack CLI 启动");

    let global = cli.global;
    match cli.command {
        Commands::Profile { action } => commands::profile::handle(action)?,
        Commands::Host { action } => commands::host::handle(action, &global).await?,
        Commands::SystemVm { action } => commands::system_vm::handle(action, &global).await?,
        Commands::Job { action } => commands::job::handle(action, &global).await?,
    }

    Ok(())
}
