//! CloudStack API 客户端
//!
//! 提供与 CloudStack 管理服务器 API 交互的客户端实现。
//!
//! # 功能
//!
//! - **请求签名**: HMAC-SHA1 签名的 GET 请求，自动解开 `<command>response` 信封
//! - **主机管理** (`HostApi`): 添加、更新、删除、维护模式、专用主机
//! - **系统虚拟机** (`SystemVmApi`): 启动、停止、重启、销毁、迁移、扩容
//! - **异步任务** (`AsyncJobApi`): 查询任务、等待任务完成
//!
//! 变更类调用返回 [`AsyncResult`]：启用异步等待时客户端会轮询任务直到完成，
//! 超出等待上限时返回 `TimedOut`，可以之后用同一个 jobid 继续等待。
//!
//! # 示例
//!
//! ```ignore
//! use cs_client::{AsyncResult, ClientConfig, CloudStackClient, HostIdParams};
//!
//! let config = ClientConfig::new("http://mgmt:8080/client/api", "api-key", "secret-key")
//!     .with_async_timeout(Some(600));
//! let client = CloudStackClient::new(config)?;
//!
//! match client.host().prepare_host_for_maintenance(&HostIdParams::new("host-id")).await? {
//!     AsyncResult::Completed(host) => println!("{} -> {}", host.name, host.resourcestate),
//!     AsyncResult::TimedOut { job_id, .. } => {
//!         // 稍后继续等待
//!         let host = client.async_job().wait_for::<cs_client::Host>(&job_id).await?;
//!     }
//!     AsyncResult::Submitted { job_id, .. } => println!("已提交: {}", job_id),
//! }
//! ```

pub mod api;
pub mod async_job;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod params;

pub use client::CloudStackClient;
pub use config::ClientConfig;
pub use error::{CloudStackError, Result};

pub use async_job::{
    resolve_envelope, settle_envelope, unwrap_result, AsyncResult, JobFailure, JobOutcome,
    JobResolver, JobResponse, JobStatusQuery, MIN_POLL_INTERVAL,
};

// 导出 API 模块
pub use api::{
    async_job::{AsyncJobApi, ListAsyncJobsParams},
    host::{
        AddBaremetalHostParams, AddHostParams, AddSecondaryStorageParams, DedicateHostParams,
        DeleteHostParams, FindHostsForMigrationParams, HostApi, HostIdParams,
        ListDedicatedHostsParams, ListHostsParams, ReleaseDedicatedHostParams,
        UpdateHostParams, UpdateHostPasswordParams,
    },
    system_vm::{
        ListSystemVmsParams, MigrateSystemVmParams, ServiceOfferingParams, StopSystemVmParams,
        SystemVmApi, SystemVmIdParams,
    },
};

// 导出数据模型
pub use models::{
    AddHostResponse, AsyncJobResult, DedicatedHost, FindHostsForMigrationResponse, Host,
    ImageStore, JobStatus, ListAsyncJobsResponse, ListDedicatedHostsResponse,
    ListHostsResponse, ListSystemVmsResponse, SuccessResponse, SystemVm,
};
pub use params::{QueryParams, ToQueryParams};
