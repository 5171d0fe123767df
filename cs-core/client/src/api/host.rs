//! 主机管理 API
//!
//! 提供主机管理功能，包括：
//! - 添加/更新/删除主机，添加裸金属主机
//! - 维护模式：进入维护、取消维护、重新连接
//! - 查询主机、查找可迁移主机
//! - 专用主机：分配、释放、查询
//! - 二级存储与主机密码

use tracing::info;

use crate::api::{match_id_by_name, single_by_id};
use crate::async_job::AsyncResult;
use crate::client::CloudStackClient;
use crate::error::Result;
use crate::models::{
    AddHostResponse, DedicatedHost, FindHostsForMigrationResponse, Host, ImageStore,
    ListDedicatedHostsResponse, ListHostsResponse, SuccessResponse,
};
use crate::params::{QueryParams, ToQueryParams};

// ============================================
// 参数
// ============================================

/// addHost 参数
#[derive(Debug, Clone, Default)]
pub struct AddHostParams {
    pub hypervisor: String,
    pub password: String,
    pub podid: String,
    pub url: String,
    pub username: String,
    pub zoneid: String,
    pub allocationstate: Option<String>,
    pub clusterid: Option<String>,
    pub clustername: Option<String>,
    pub hosttags: Option<Vec<String>>,
}

impl AddHostParams {
    pub fn new(
        hypervisor: &str,
        password: &str,
        podid: &str,
        url: &str,
        username: &str,
        zoneid: &str,
    ) -> Self {
        Self {
            hypervisor: hypervisor.to_string(),
            password: password.to_string(),
            podid: podid.to_string(),
            url: url.to_string(),
            username: username.to_string(),
            zoneid: zoneid.to_string(),
            ..Default::default()
        }
    }

    pub fn with_allocation_state(mut self, state: &str) -> Self {
        self.allocationstate = Some(state.to_string());
        self
    }

    pub fn with_cluster_id(mut self, cluster_id: &str) -> Self {
        self.clusterid = Some(cluster_id.to_string());
        self
    }

    pub fn with_cluster_name(mut self, cluster_name: &str) -> Self {
        self.clustername = Some(cluster_name.to_string());
        self
    }

    pub fn with_host_tags(mut self, tags: Vec<String>) -> Self {
        self.hosttags = Some(tags);
        self
    }
}

impl ToQueryParams for AddHostParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set_opt("allocationstate", self.allocationstate.as_ref());
        p.set_opt("clusterid", self.clusterid.as_ref());
        p.set_opt("clustername", self.clustername.as_ref());
        p.set_list("hosttags", self.hosttags.as_ref());
        p.set("hypervisor", self.hypervisor.as_str());
        p.set("password", self.password.as_str());
        p.set("podid", self.podid.as_str());
        p.set("url", self.url.as_str());
        p.set("username", self.username.as_str());
        p.set("zoneid", self.zoneid.as_str());
        p
    }
}

/// addBaremetalHost 参数
#[derive(Debug, Clone, Default)]
pub struct AddBaremetalHostParams {
    pub host: AddHostParams,
    pub ipaddress: Option<String>,
}

impl AddBaremetalHostParams {
    pub fn new(host: AddHostParams) -> Self {
        Self {
            host,
            ipaddress: None,
        }
    }

    pub fn with_ip_address(mut self, ip: &str) -> Self {
        self.ipaddress = Some(ip.to_string());
        self
    }
}

impl ToQueryParams for AddBaremetalHostParams {
    fn to_params(&self) -> QueryParams {
        let mut p = self.host.to_params();
        p.set_opt("ipaddress", self.ipaddress.as_ref());
        p
    }
}

/// updateHost 参数
#[derive(Debug, Clone, Default)]
pub struct UpdateHostParams {
    pub id: String,
    pub allocationstate: Option<String>,
    pub hosttags: Option<Vec<String>>,
    pub oscategoryid: Option<String>,
    pub url: Option<String>,
}

impl UpdateHostParams {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_allocation_state(mut self, state: &str) -> Self {
        self.allocationstate = Some(state.to_string());
        self
    }

    pub fn with_host_tags(mut self, tags: Vec<String>) -> Self {
        self.hosttags = Some(tags);
        self
    }

    pub fn with_os_category_id(mut self, id: &str) -> Self {
        self.oscategoryid = Some(id.to_string());
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }
}

impl ToQueryParams for UpdateHostParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set_opt("allocationstate", self.allocationstate.as_ref());
        p.set_list("hosttags", self.hosttags.as_ref());
        p.set("id", self.id.as_str());
        p.set_opt("oscategoryid", self.oscategoryid.as_ref());
        p.set_opt("url", self.url.as_ref());
        p
    }
}

/// deleteHost 参数
#[derive(Debug, Clone, Default)]
pub struct DeleteHostParams {
    pub id: String,
    pub forced: Option<bool>,
    pub forcedestroylocalstorage: Option<bool>,
}

impl DeleteHostParams {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_forced(mut self, forced: bool) -> Self {
        self.forced = Some(forced);
        self
    }

    pub fn with_force_destroy_local_storage(mut self, destroy: bool) -> Self {
        self.forcedestroylocalstorage = Some(destroy);
        self
    }
}

impl ToQueryParams for DeleteHostParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set_bool("forced", self.forced);
        p.set_bool("forcedestroylocalstorage", self.forcedestroylocalstorage);
        p.set("id", self.id.as_str());
        p
    }
}

/// 只需要主机 ID 的参数
///
/// 用于 reconnectHost / prepareHostForMaintenance / cancelHostMaintenance /
/// releaseHostReservation。
#[derive(Debug, Clone, Default)]
pub struct HostIdParams {
    pub id: String,
}

impl HostIdParams {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

impl ToQueryParams for HostIdParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set("id", self.id.as_str());
        p
    }
}

/// listHosts 参数
#[derive(Debug, Clone, Default)]
pub struct ListHostsParams {
    pub clusterid: Option<String>,
    pub details: Option<Vec<String>>,
    pub hahost: Option<bool>,
    pub hypervisor: Option<String>,
    pub id: Option<String>,
    pub keyword: Option<String>,
    pub name: Option<String>,
    pub page: Option<i64>,
    pub pagesize: Option<i64>,
    pub podid: Option<String>,
    pub resourcestate: Option<String>,
    pub state: Option<String>,
    pub host_type: Option<String>,
    pub virtualmachineid: Option<String>,
    pub zoneid: Option<String>,
}

impl ListHostsParams {
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

    pub fn with_zone_id(mut self, zone_id: &str) -> Self {
        self.zoneid = Some(zone_id.to_string());
        self
    }

    pub fn with_cluster_id(mut self, cluster_id: &str) -> Self {
        self.clusterid = Some(cluster_id.to_string());
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_string());
        self
    }

    pub fn with_type(mut self, host_type: &str) -> Self {
        self.host_type = Some(host_type.to_string());
        self
    }

    pub fn with_pod_id(mut self, pod_id: &str) -> Self {
        self.podid = Some(pod_id.to_string());
        self
    }

    pub fn with_hypervisor(mut self, hypervisor: &str) -> Self {
        self.hypervisor = Some(hypervisor.to_string());
        self
    }

    /// 资源状态，例如 `Enabled` / `Maintenance`
    pub fn with_resource_state(mut self, state: &str) -> Self {
        self.resourcestate = Some(state.to_string());
        self
    }

    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keyword = Some(keyword.to_string());
        self
    }

    /// 只列出 HA 主机 (`true`) 或非 HA 主机 (`false`)
    pub fn with_ha_host(mut self, ha_host: bool) -> Self {
        self.hahost = Some(ha_host);
        self
    }

    pub fn with_virtual_machine_id(mut self, vm_id: &str) -> Self {
        self.virtualmachineid = Some(vm_id.to_string());
        self
    }

    /// 需要返回的详情分组，例如 `["capacity", "stats"]`
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_page(mut self, page: i64, page_size: i64) -> Self {
        self.page = Some(page);
        self.pagesize = Some(page_size);
        self
    }
}

impl ToQueryParams for ListHostsParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set_opt("clusterid", self.clusterid.as_ref());
        p.set_list("details", self.details.as_ref());
        p.set_bool("hahost", self.hahost);
        p.set_opt("hypervisor", self.hypervisor.as_ref());
        p.set_opt("id", self.id.as_ref());
        p.set_opt("keyword", self.keyword.as_ref());
        p.set_opt("name", self.name.as_ref());
        p.set_int("page", self.page);
        p.set_int("pagesize", self.pagesize);
        p.set_opt("podid", self.podid.as_ref());
        p.set_opt("resourcestate", self.resourcestate.as_ref());
        p.set_opt("state", self.state.as_ref());
        p.set_opt("type", self.host_type.as_ref());
        p.set_opt("virtualmachineid", self.virtualmachineid.as_ref());
        p.set_opt("zoneid", self.zoneid.as_ref());
        p
    }
}

/// findHostsForMigration 参数
#[derive(Debug, Clone, Default)]
pub struct FindHostsForMigrationParams {
    pub virtualmachineid: String,
    pub keyword: Option<String>,
    pub page: Option<i64>,
    pub pagesize: Option<i64>,
}

impl FindHostsForMigrationParams {
    pub fn new(virtual_machine_id: &str) -> Self {
        Self {
            virtualmachineid: virtual_machine_id.to_string(),
            ..Default::default()
        }
    }
}

impl ToQueryParams for FindHostsForMigrationParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set_opt("keyword", self.keyword.as_ref());
        p.set_int("page", self.page);
        p.set_int("pagesize", self.pagesize);
        p.set("virtualmachineid", self.virtualmachineid.as_str());
        p
    }
}

/// addSecondaryStorage 参数
#[derive(Debug, Clone, Default)]
pub struct AddSecondaryStorageParams {
    pub url: String,
    pub zoneid: Option<String>,
}

impl AddSecondaryStorageParams {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            zoneid: None,
        }
    }

    pub fn with_zone_id(mut self, zone_id: &str) -> Self {
        self.zoneid = Some(zone_id.to_string());
        self
    }
}

impl ToQueryParams for AddSecondaryStorageParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set("url", self.url.as_str());
        p.set_opt("zoneid", self.zoneid.as_ref());
        p
    }
}

/// updateHostPassword 参数
#[derive(Debug, Clone, Default)]
pub struct UpdateHostPasswordParams {
    pub password: String,
    pub username: String,
    pub clusterid: Option<String>,
    pub hostid: Option<String>,
}

impl UpdateHostPasswordParams {
    pub fn new(password: &str, username: &str) -> Self {
        Self {
            password: password.to_string(),
            username: username.to_string(),
            ..Default::default()
        }
    }

    pub fn with_cluster_id(mut self, cluster_id: &str) -> Self {
        self.clusterid = Some(cluster_id.to_string());
        self
    }

    pub fn with_host_id(mut self, host_id: &str) -> Self {
        self.hostid = Some(host_id.to_string());
        self
    }
}

impl ToQueryParams for UpdateHostPasswordParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set_opt("clusterid", self.clusterid.as_ref());
        p.set_opt("hostid", self.hostid.as_ref());
        p.set("password", self.password.as_str());
        p.set("username", self.username.as_str());
        p
    }
}

/// dedicateHost 参数
#[derive(Debug, Clone, Default)]
pub struct DedicateHostParams {
    pub domainid: String,
    pub hostid: String,
    pub account: Option<String>,
}

impl DedicateHostParams {
    pub fn new(domain_id: &str, host_id: &str) -> Self {
        Self {
            domainid: domain_id.to_string(),
            hostid: host_id.to_string(),
            account: None,
        }
    }

    pub fn with_account(mut self, account: &str) -> Self {
        self.account = Some(account.to_string());
        self
    }
}

impl ToQueryParams for DedicateHostParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set_opt("account", self.account.as_ref());
        p.set("domainid", self.domainid.as_str());
        p.set("hostid", self.hostid.as_str());
        p
    }
}

/// releaseDedicatedHost 参数
#[derive(Debug, Clone, Default)]
pub struct ReleaseDedicatedHostParams {
    pub hostid: String,
}

impl ReleaseDedicatedHostParams {
    pub fn new(host_id: &str) -> Self {
        Self {
            hostid: host_id.to_string(),
        }
    }
}

impl ToQueryParams for ReleaseDedicatedHostParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set("hostid", self.hostid.as_str());
        p
    }
}

/// listDedicatedHosts 参数
#[derive(Debug, Clone, Default)]
pub struct ListDedicatedHostsParams {
    pub account: Option<String>,
    pub affinitygroupid: Option<String>,
    pub domainid: Option<String>,
    pub hostid: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<i64>,
    pub pagesize: Option<i64>,
}

impl ListDedicatedHostsParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain_id(mut self, domain_id: &str) -> Self {
        self.domainid = Some(domain_id.to_string());
        self
    }

    pub fn with_host_id(mut self, host_id: &str) -> Self {
        self.hostid = Some(host_id.to_string());
        self
    }
}

impl ToQueryParams for ListDedicatedHostsParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set_opt("account", self.account.as_ref());
        p.set_opt("affinitygroupid", self.affinitygroupid.as_ref());
        p.set_opt("domainid", self.domainid.as_ref());
        p.set_opt("hostid", self.hostid.as_ref());
        p.set_opt("keyword", self.keyword.as_ref());
        p.set_int("page", self.page);
        p.set_int("pagesize", self.pagesize);
        p
    }
}

// ============================================
// API
// ============================================

/// 主机管理 API
pub struct HostApi<'a> {
    client: &'a CloudStackClient,
}

impl<'a> HostApi<'a> {
    /// 创建新的主机 API 实例
    pub(crate) fn new(client: &'a CloudStackClient) -> Self {
        Self { client }
    }

    /// 添加主机
    pub async fn add_host(&self, params: &AddHostParams) -> Result<AddHostResponse> {
        info!("添加主机: {} (zone {})", params.url, params.zoneid);
        self.client.request("addHost", params.to_params()).await
    }

    /// 添加裸金属主机
    pub async fn add_baremetal_host(&self, params: &AddBaremetalHostParams) -> Result<AddHostResponse> {
        info!("添加裸金属主机: {}", params.host.url);
        self.client.request("addBaremetalHost", params.to_params()).await
    }

    /// 重新连接主机 (异步)
    pub async fn reconnect_host(&self, params: &HostIdParams) -> Result<AsyncResult<Host>> {
        info!("重新连接主机: {}", params.id);
        self.client.dispatch_async("reconnectHost", params.to_params()).await
    }

    /// 更新主机
    pub async fn update_host(&self, params: &UpdateHostParams) -> Result<Host> {
        info!("更新主机: {}", params.id);
        self.client.request_entity("updateHost", params.to_params()).await
    }

    /// 删除主机
    pub async fn delete_host(&self, params: &DeleteHostParams) -> Result<SuccessResponse> {
        info!("删除主机: {}", params.id);
        self.client.request("deleteHost", params.to_params()).await
    }

    /// 主机进入维护模式 (异步)
    pub async fn prepare_host_for_maintenance(&self, params: &HostIdParams) -> Result<AsyncResult<Host>> {
        info!("主机进入维护模式: {}", params.id);
        self.client
            .dispatch_async("prepareHostForMaintenance", params.to_params())
            .await
    }

    /// 取消主机维护模式 (异步)
    pub async fn cancel_host_maintenance(&self, params: &HostIdParams) -> Result<AsyncResult<Host>> {
        info!("取消主机维护模式: {}", params.id);
        self.client
            .dispatch_async("cancelHostMaintenance", params.to_params())
            .await
    }

    /// 查询主机列表
    pub async fn list_hosts(&self, params: &ListHostsParams) -> Result<ListHostsResponse> {
        info!("查询主机列表");
        self.client.request("listHosts", params.to_params()).await
    }

    /// 按名称获取主机 ID
    pub async fn get_host_id(&self, name: &str) -> Result<String> {
        let list = self.list_hosts(&ListHostsParams::new().with_name(name)).await?;
        match_id_by_name("主机", name, &list.host, |h| h.name.as_str(), |h| h.id.as_str())
    }

    /// 按名称获取主机
    pub async fn get_host_by_name(&self, name: &str) -> Result<Host> {
        let id = self.get_host_id(name).await?;
        self.get_host_by_id(&id).await
    }

    /// 按 ID 获取主机
    pub async fn get_host_by_id(&self, id: &str) -> Result<Host> {
        let list = self.list_hosts(&ListHostsParams::new().with_id(id)).await?;
        single_by_id("主机", id, list.host)
    }

    /// 查找可迁移的目标主机
    pub async fn find_hosts_for_migration(
        &self,
        params: &FindHostsForMigrationParams,
    ) -> Result<FindHostsForMigrationResponse> {
        info!("查找可迁移主机: VM {}", params.virtualmachineid);
        self.client.request("findHostsForMigration", params.to_params()).await
    }

    /// 添加二级存储
    pub async fn add_secondary_storage(&self, params: &AddSecondaryStorageParams) -> Result<ImageStore> {
        info!("添加二级存储: {}", params.url);
        self.client
            .request_entity("addSecondaryStorage", params.to_params())
            .await
    }

    /// 更新主机密码
    pub async fn update_host_password(&self, params: &UpdateHostPasswordParams) -> Result<SuccessResponse> {
        info!("更新主机密码: 用户 {}", params.username);
        self.client.request("updateHostPassword", params.to_params()).await
    }

    /// 释放主机预留 (异步)
    pub async fn release_host_reservation(
        &self,
        params: &HostIdParams,
    ) -> Result<AsyncResult<SuccessResponse>> {
        info!("释放主机预留: {}", params.id);
        self.client
            .dispatch_async("releaseHostReservation", params.to_params())
            .await
    }

    /// 分配专用主机 (异步)
    pub async fn dedicate_host(&self, params: &DedicateHostParams) -> Result<AsyncResult<DedicatedHost>> {
        info!("分配专用主机: {} -> domain {}", params.hostid, params.domainid);
        self.client.dispatch_async("dedicateHost", params.to_params()).await
    }

    /// 释放专用主机 (异步)
    pub async fn release_dedicated_host(
        &self,
        params: &ReleaseDedicatedHostParams,
    ) -> Result<AsyncResult<SuccessResponse>> {
        info!("释放专用主机: {}", params.hostid);
        self.client
            .dispatch_async("releaseDedicatedHost", params.to_params())
            .await
    }

    /// 查询专用主机列表
    pub async fn list_dedicated_hosts(
        &self,
        params: &ListDedicatedHostsParams,
    ) -> Result<ListDedicatedHostsResponse> {
        info!("查询专用主机列表");
        self.client.request("listDedicatedHosts", params.to_params()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_host_params() {
        let params = AddHostParams::new("KVM", "pw", "pod-1", "http://10.0.0.2", "root", "zone-1")
            .with_cluster_id("cluster-1")
            .with_host_tags(vec!["ssd".to_string(), "gpu".to_string()]);
        let p = params.to_params();

        assert_eq!(p.get("hypervisor"), Some("KVM"));
        assert_eq!(p.get("clusterid"), Some("cluster-1"));
        assert_eq!(p.get("hosttags"), Some("ssd, gpu"));
        assert_eq!(p.get("clustername"), None);
        assert_eq!(p.len(), 8);
    }

    #[test]
    fn test_baremetal_params_extend_add_host() {
        let host = AddHostParams::new("BareMetal", "pw", "pod-1", "http://10.0.0.3", "root", "zone-1");
        let p = AddBaremetalHostParams::new(host).with_ip_address("10.0.0.3").to_params();

        assert_eq!(p.get("ipaddress"), Some("10.0.0.3"));
        assert_eq!(p.get("zoneid"), Some("zone-1"));
    }

    #[test]
    fn test_delete_host_params() {
        let p = DeleteHostParams::new("h-1").with_forced(true).to_params();
        assert_eq!(p.get("id"), Some("h-1"));
        assert_eq!(p.get("forced"), Some("true"));
        assert_eq!(p.get("forcedestroylocalstorage"), None);
    }

    #[test]
    fn test_list_hosts_params() {
        let p = ListHostsParams::new()
            .with_zone_id("zone-1")
            .with_type("Routing")
            .with_page(2, 50)
            .to_params();

        assert_eq!(p.get("type"), Some("Routing"));
        assert_eq!(p.get("page"), Some("2"));
        assert_eq!(p.get("pagesize"), Some("50"));
        assert_eq!(p.get("name"), None);
        assert!(ListHostsParams::new().to_params().is_empty());
    }

    #[test]
    fn test_list_hosts_filters() {
        let p = ListHostsParams::new()
            .with_pod_id("pod-1")
            .with_hypervisor("KVM")
            .with_resource_state("Maintenance")
            .with_keyword("kvm")
            .with_ha_host(false)
            .with_virtual_machine_id("vm-1")
            .with_details(vec!["capacity".to_string(), "stats".to_string()])
            .to_params();

        assert_eq!(p.get("podid"), Some("pod-1"));
        assert_eq!(p.get("hypervisor"), Some("KVM"));
        assert_eq!(p.get("resourcestate"), Some("Maintenance"));
        assert_eq!(p.get("keyword"), Some("kvm"));
        assert_eq!(p.get("hahost"), Some("false"));
        assert_eq!(p.get("virtualmachineid"), Some("vm-1"));
        assert_eq!(p.get("details"), Some("capacity, stats"));
        assert_eq!(p.len(), 7);
    }

    #[test]
    fn test_dedicate_host_params() {
        let p = DedicateHostParams::new("domain-1", "h-1").with_account("ops").to_params();
        assert_eq!(p.get("domainid"), Some("domain-1"));
        assert_eq!(p.get("hostid"), Some("h-1"));
        assert_eq!(p.get("account"), Some("ops"));
    }

    #[test]
    fn test_update_host_password_params() {
        let p = UpdateHostPasswordParams::new("secret", "root")
            .with_host_id("h-1")
            .to_params();
        assert_eq!(p.get("password"), Some("secret"));
        assert_eq!(p.get("hostid"), Some("h-1"));
        assert_eq!(p.get("clusterid"), None);
    }
}
