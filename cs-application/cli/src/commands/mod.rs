//! CLI 命令处理模块

pub mod common; // 公共工具函数
pub mod host;
pub mod job;
pub mod output;
pub mod profile;
pub mod system_vm;
