//! 异步任务 API
//!
//! 查询任务状态、列出任务，以及对超时的任务继续等待。

use serde::de::DeserializeOwned;
use tracing::info;

use crate::async_job::{AsyncResult, JobOutcome, JobResolver, JobResponse, JobStatusQuery};
use crate::client::CloudStackClient;
use crate::error::Result;
use crate::models::{AsyncJobResult, ListAsyncJobsResponse};
use crate::params::{QueryParams, ToQueryParams};

/// listAsyncJobs 参数
#[derive(Debug, Clone, Default)]
pub struct ListAsyncJobsParams {
    pub account: Option<String>,
    pub domainid: Option<String>,
    pub isrecursive: Option<bool>,
    pub keyword: Option<String>,
    pub listall: Option<bool>,
    pub page: Option<i64>,
    pub pagesize: Option<i64>,
    /// 起始时间，格式 `yyyy-MM-dd'T'HH:mm:ssZ`
    pub startdate: Option<String>,
}

impl ListAsyncJobsParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list_all(mut self, list_all: bool) -> Self {
        self.listall = Some(list_all);
        self
    }

    pub fn with_start_date(mut self, start_date: &str) -> Self {
        self.startdate = Some(start_date.to_string());
        self
    }
}

impl ToQueryParams for ListAsyncJobsParams {
    fn to_params(&self) -> QueryParams {
        let mut p = QueryParams::new();
        p.set_opt("account", self.account.as_ref());
        p.set_opt("domainid", self.domainid.as_ref());
        p.set_bool("isrecursive", self.isrecursive);
        p.set_opt("keyword", self.keyword.as_ref());
        p.set_bool("listall", self.listall);
        p.set_int("page", self.page);
        p.set_int("pagesize", self.pagesize);
        p.set_opt("startdate", self.startdate.as_ref());
        p
    }
}

/// 异步任务 API
pub struct AsyncJobApi<'a> {
    client: &'a CloudStackClient,
}

impl<'a> AsyncJobApi<'a> {
    /// 创建新的异步任务 API 实例
    pub(crate) fn new(client: &'a CloudStackClient) -> Self {
        Self { client }
    }

    /// 查询任务当前状态 (单次)
    pub async fn query_async_job_result(&self, job_id: &str) -> Result<AsyncJobResult> {
        info!("查询异步任务: {}", job_id);
        self.client.query_job(job_id).await
    }

    /// 查询任务列表
    pub async fn list_async_jobs(&self, params: &ListAsyncJobsParams) -> Result<ListAsyncJobsResponse> {
        info!("查询异步任务列表");
        self.client.request("listAsyncJobs", params.to_params()).await
    }

    /// 按客户端配置的等待上限继续等待任务
    pub async fn wait(&self, job_id: &str) -> Result<JobOutcome> {
        info!("等待异步任务: {}", job_id);
        JobResolver::from_config(self.client.config())
            .resolve(self.client, job_id)
            .await
    }

    /// 继续等待任务，并把结果解码为指定类型
    ///
    /// 用于 `TimedOut` 之后用同一个 jobid 再次等待。
    pub async fn wait_for<T>(&self, job_id: &str) -> Result<AsyncResult<T>>
    where
        T: DeserializeOwned + JobResponse + Default,
    {
        info!("等待异步任务: {}", job_id);
        let mut envelope = T::default();
        envelope.set_job_id(job_id.to_string());
        self.client.resolve_into(job_id.to_string(), envelope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_async_jobs_params() {
        let p = ListAsyncJobsParams::new()
            .with_list_all(true)
            .with_start_date("2024-01-01T00:00:00+0000")
            .to_params();

        assert_eq!(p.get("listall"), Some("true"));
        assert_eq!(p.get("startdate"), Some("2024-01-01T00:00:00+0000"));
        assert_eq!(p.len(), 2);
    }
}
