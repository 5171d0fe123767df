//! 主机相关模型

use serde::{Deserialize, Serialize};

/// 主机信息
///
/// `listHosts` 列表项，也是 reconnectHost / prepareHostForMaintenance 等
/// 调用的响应主体。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Host {
    /// 异步任务 ID (仅异步调用的响应中出现)
    pub jobid: Option<String>,

    pub id: String,
    pub name: String,
    pub state: String,
    pub resourcestate: String,

    #[serde(rename = "type")]
    pub host_type: String,

    pub ipaddress: String,
    pub hypervisor: String,
    pub hypervisorversion: String,
    pub version: String,
    pub capabilities: String,
    pub events: String,
    pub hosttags: String,

    // 位置
    pub zoneid: String,
    pub zonename: String,
    pub podid: String,
    pub podname: String,
    pub clusterid: String,
    pub clustername: String,
    pub clustertype: String,
    pub oscategoryid: String,
    pub oscategoryname: String,

    // CPU
    pub cpunumber: i64,
    pub cpusockets: i64,
    pub cpuspeed: i64,
    pub cpuallocated: String,
    pub cpuused: String,
    pub cpuwithoverprovisioning: String,
    pub averageload: i64,

    // 内存 / 磁盘 (字节)
    pub memorytotal: i64,
    pub memoryallocated: i64,
    pub memoryused: i64,
    pub disksizetotal: i64,
    pub disksizeallocated: i64,

    // 网络 (KB)
    pub networkkbsread: i64,
    pub networkkbswrite: i64,

    pub hahost: bool,
    pub hasenoughcapacity: bool,
    pub islocalstorageactive: bool,
    pub suitableformigration: bool,

    /// 仅 findHostsForMigration 返回
    #[serde(rename = "requiresStorageMotion")]
    pub requires_storage_motion: bool,

    pub managementserverid: i64,
    pub created: String,
    pub lastpinged: String,
    pub disconnected: String,
    pub removed: String,
}

/// `listHosts` 响应
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListHostsResponse {
    pub count: i64,
    pub host: Vec<Host>,
}

/// `addHost` / `addBaremetalHost` 响应
pub type AddHostResponse = ListHostsResponse;

/// `findHostsForMigration` 响应
pub type FindHostsForMigrationResponse = ListHostsResponse;

/// 二级存储信息 (`addSecondaryStorage`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageStore {
    pub id: String,
    pub name: String,
    pub url: String,
    pub protocol: String,
    pub providername: String,
    pub scope: String,
    pub zoneid: String,
    pub zonename: String,
    pub details: Vec<serde_json::Value>,
}

/// 专用主机信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DedicatedHost {
    pub jobid: Option<String>,
    pub id: String,
    pub hostid: String,
    pub hostname: String,
    pub domainid: String,
    pub accountid: String,
    pub affinitygroupid: String,
}

/// `listDedicatedHosts` 响应
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListDedicatedHostsResponse {
    pub count: i64,
    pub dedicatedhost: Vec<DedicatedHost>,
}
