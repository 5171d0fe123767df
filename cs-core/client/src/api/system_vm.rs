//! 系统虚拟机管理 API
//!
//! 提供系统虚拟机 (二级存储 VM、控制台代理 VM) 管理功能，包括：
//! - 启动、停止、重启、销毁
//! - 迁移、更换服务方案、扩容
//! - 查询系统虚拟机

use std::collections::BTreeMap;

use tracing::info;

use crate::api::{match_id_by_name, single_by_id};
use crate::async_job::AsyncResult;
use crate::client::CloudStackClient;
use crate::error::Result;
use crate::models::{ListSystemVmsResponse, SystemVm};
use crate::params::{QueryParams, ToQueryParams};

/// 只需要系统虚拟机 ID 的参数
///
/// 用于 startSystemVm / rebootSystemVm / destroySystemVm。
#[derive(Debug, Clone, Default)]
pub struct SystemVmIdParams {
    pub id: String,
}

impl SystemVmIdParams {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

impl ToQueryParams for SystemVmIdParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set("id", self.id.as_str());
        p
    }
}

/// stopSystemVm 参数
#[derive(Debug, Clone, Default)]
pub struct StopSystemVmParams {
    pub id: String,
    pub forced: Option<bool>,
}

impl StopSystemVmParams {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            forced: None,
        }
    }

    pub fn with_forced(mut self, forced: bool) -> Self {
        self.forced = Some(forced);
        self
    }
}

impl ToQueryParams for StopSystemVmParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set_bool("forced", self.forced);
        p.set("id", self.id.as_str());
        p
    }
}

/// listSystemVms 参数
#[derive(Debug, Clone, Default)]
pub struct ListSystemVmsParams {
    pub hostid: Option<String>,
    pub id: Option<String>,
    pub keyword: Option<String>,
    pub name: Option<String>,
    pub page: Option<i64>,
    pub pagesize: Option<i64>,
    pub podid: Option<String>,
    pub state: Option<String>,
    pub storageid: Option<String>,
    pub systemvmtype: Option<String>,
    pub zoneid: Option<String>,
}

impl ListSystemVmsParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_host_id(mut self, host_id: &str) -> Self {
        self.hostid = Some(host_id.to_string());
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_string());
        self
    }

    /// `secondarystoragevm` 或 `consoleproxy`
    pub fn with_system_vm_type(mut self, vm_type: &str) -> Self {
        self.systemvmtype = Some(vm_type.to_string());
        self
    }

    pub fn with_zone_id(mut self, zone_id: &str) -> Self {
        self.zoneid = Some(zone_id.to_string());
        self
    }
}

impl ToQueryParams for ListSystemVmsParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set_opt("hostid", self.hostid.as_ref());
        p.set_opt("id", self.id.as_ref());
        p.set_opt("keyword", self.keyword.as_ref());
        p.set_opt("name", self.name.as_ref());
        p.set_int("page", self.page);
        p.set_int("pagesize", self.pagesize);
        p.set_opt("podid", self.podid.as_ref());
        p.set_opt("state", self.state.as_ref());
        p.set_opt("storageid", self.storageid.as_ref());
        p.set_opt("systemvmtype", self.systemvmtype.as_ref());
        p.set_opt("zoneid", self.zoneid.as_ref());
        p
    }
}

/// migrateSystemVm 参数
#[derive(Debug, Clone, Default)]
pub struct MigrateSystemVmParams {
    pub hostid: String,
    pub virtualmachineid: String,
}

impl MigrateSystemVmParams {
    pub fn new(host_id: &str, virtual_machine_id: &str) -> Self {
        Self {
            hostid: host_id.to_string(),
            virtualmachineid: virtual_machine_id.to_string(),
        }
    }
}

impl ToQueryParams for MigrateSystemVmParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set("hostid", self.hostid.as_str());
        p.set("virtualmachineid", self.virtualmachineid.as_str());
        p
    }
}

/// changeServiceForSystemVm / scaleSystemVm 参数
#[derive(Debug, Clone, Default)]
pub struct ServiceOfferingParams {
    pub id: String,
    pub serviceofferingid: String,
    /// 自定义方案的额外参数，如 `cpuNumber` / `memory`
    pub details: Option<BTreeMap<String, String>>,
}

impl ServiceOfferingParams {
    pub fn new(id: &str, service_offering_id: &str) -> Self {
        Self {
            id: id.to_string(),
            serviceofferingid: service_offering_id.to_string(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.details
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }
}

impl ToQueryParams for ServiceOfferingParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set_map("details", self.details.as_ref());
        p.set("id", self.id.as_str());
        p.set("serviceofferingid", self.serviceofferingid.as_str());
        p
    }
}

/// 系统虚拟机管理 API
pub struct SystemVmApi<'a> {
    client: &'a CloudStackClient,
}

impl<'a> SystemVmApi<'a> {
    /// 创建新的系统虚拟机 API 实例
    pub(crate) fn new(client: &'a CloudStackClient) -> Self {
        Self { client }
    }

    /// 启动系统虚拟机 (异步)
    pub async fn start_system_vm(&self, params: &SystemVmIdParams) -> Result<AsyncResult<SystemVm>> {
        info!("启动系统虚拟机: {}", params.id);
        self.client.dispatch_async("startSystemVm", params.to_params()).await
    }

    /// 重启系统虚拟机 (异步)
    pub async fn reboot_system_vm(&self, params: &SystemVmIdParams) -> Result<AsyncResult<SystemVm>> {
        info!("重启系统虚拟机: {}", params.id);
        self.client.dispatch_async("rebootSystemVm", params.to_params()).await
    }

    /// 停止系统虚拟机 (异步)
    pub async fn stop_system_vm(&self, params: &StopSystemVmParams) -> Result<AsyncResult<SystemVm>> {
        info!("停止系统虚拟机: {} (forced: {:?})", params.id, params.forced);
        self.client.dispatch_async("stopSystemVm", params.to_params()).await
    }

    /// 销毁系统虚拟机 (异步)
    pub async fn destroy_system_vm(&self, params: &SystemVmIdParams) -> Result<AsyncResult<SystemVm>> {
        info!("销毁系统虚拟机: {}", params.id);
        self.client.dispatch_async("destroySystemVm", params.to_params()).await
    }

    /// 查询系统虚拟机列表
    pub async fn list_system_vms(&self, params: &ListSystemVmsParams) -> Result<ListSystemVmsResponse> {
        info!("查询系统虚拟机列表");
        self.client.request("listSystemVms", params.to_params()).await
    }

    /// 按名称获取系统虚拟机 ID
    pub async fn get_system_vm_id(&self, name: &str) -> Result<String> {
        let list = self
            .list_system_vms(&ListSystemVmsParams::new().with_name(name))
            .await?;
        match_id_by_name("系统虚拟机", name, &list.systemvm, |v| v.name.as_str(), |v| v.id.as_str())
    }

    /// 按名称获取系统虚拟机
    pub async fn get_system_vm_by_name(&self, name: &str) -> Result<SystemVm> {
        let id = self.get_system_vm_id(name).await?;
        self.get_system_vm_by_id(&id).await
    }

    /// 按 ID 获取系统虚拟机
    pub async fn get_system_vm_by_id(&self, id: &str) -> Result<SystemVm> {
        let list = self
            .list_system_vms(&ListSystemVmsParams::new().with_id(id))
            .await?;
        single_by_id("系统虚拟机", id, list.systemvm)
    }

    /// 迁移系统虚拟机 (异步)
    pub async fn migrate_system_vm(&self, params: &MigrateSystemVmParams) -> Result<AsyncResult<SystemVm>> {
        info!("迁移系统虚拟机: {} -> 主机 {}", params.virtualmachineid, params.hostid);
        self.client.dispatch_async("migrateSystemVm", params.to_params()).await
    }

    /// 更换系统虚拟机服务方案 (需先停止)
    pub async fn change_service_for_system_vm(&self, params: &ServiceOfferingParams) -> Result<SystemVm> {
        info!("更换系统虚拟机服务方案: {} -> {}", params.id, params.serviceofferingid);
        self.client
            .request_entity("changeServiceForSystemVm", params.to_params())
            .await
    }

    /// 在线扩容系统虚拟机 (异步)
    pub async fn scale_system_vm(&self, params: &ServiceOfferingParams) -> Result<AsyncResult<SystemVm>> {
        info!("扩容系统虚拟机: {} -> {}", params.id, params.serviceofferingid);
        self.client.dispatch_async("scaleSystemVm", params.to_params()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_params() {
        let p = StopSystemVmParams::new("s-1").to_params();
        assert_eq!(p.len(), 1);

        let p = StopSystemVmParams::new("s-1").with_forced(true).to_params();
        assert_eq!(p.get("forced"), Some("true"));
    }

    #[test]
    fn test_list_params() {
        let p = ListSystemVmsParams::new()
            .with_system_vm_type("consoleproxy")
            .with_state("Running")
            .to_params();
        assert_eq!(p.get("systemvmtype"), Some("consoleproxy"));
        assert_eq!(p.get("state"), Some("Running"));
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn test_service_offering_details() {
        let p = ServiceOfferingParams::new("s-1", "so-1")
            .with_detail("memory", "2048")
            .with_detail("cpuNumber", "2")
            .to_params();

        assert_eq!(p.get("serviceofferingid"), Some("so-1"));
        assert_eq!(p.get("details[0].key"), Some("cpuNumber"));
        assert_eq!(p.get("details[1].value"), Some("2048"));
    }

    #[test]
    fn test_migrate_params() {
        let p = MigrateSystemVmParams::new("h-2", "s-1").to_params();
        assert_eq!(p.get("hostid"), Some("h-2"));
        assert_eq!(p.get("virtualmachineid"), Some("s-1"));
    }
}
