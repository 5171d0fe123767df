//! CloudStack 客户端核心实现

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha1::Sha1;
use tracing::{debug, info, warn};

use crate::api::{AsyncJobApi, HostApi, SystemVmApi};
use crate::async_job::{
    resolve_envelope, settle_envelope, unwrap_result, AsyncResult, JobResolver, JobResponse,
    JobStatusQuery,
};
use crate::config::ClientConfig;
use crate::error::{CloudStackError, Result};
use crate::models::AsyncJobResult;
use crate::params::QueryParams;

type HmacSha1 = Hmac<Sha1>;

/// CloudStack 客户端
pub struct CloudStackClient {
    /// API 地址
    api_url: String,

    /// HTTP 客户端
    http_client: Client,

    /// 配置
    config: ClientConfig,
}

impl CloudStackClient {
    /// 创建新的 CloudStack 客户端
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| CloudStackError::HttpError(e.to_string()))?;

        info!(
            "CloudStack 客户端已创建: {} (异步等待: {})",
            config.api_url, config.async_mode
        );

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            http_client,
            config,
        })
    }

    /// 获取客户端配置
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 获取主机管理 API
    pub fn host(&self) -> HostApi<'_> {
        HostApi::new(self)
    }

    /// 获取系统虚拟机管理 API
    pub fn system_vm(&self) -> SystemVmApi<'_> {
        SystemVmApi::new(self)
    }

    /// 获取异步任务 API
    pub fn async_job(&self) -> AsyncJobApi<'_> {
        AsyncJobApi::new(self)
    }

    /// 生成带签名的查询字符串
    pub(crate) fn signed_query(&self, command: &str, mut params: QueryParams) -> Result<String> {
        params.set("apiKey", self.config.api_key.as_str());
        params.set("command", command);
        params.set("response", "json");

        let query = params.encode();
        let signature = sign(&self.config.secret_key, &query)?;

        Ok(format!("{}&signature={}", query, urlencoding::encode(&signature)))
    }

    /// 发送请求，返回 `<command>response` 内的载荷
    pub(crate) async fn request_raw(&self, command: &str, params: QueryParams) -> Result<Value> {
        let url = format!("{}?{}", self.api_url, self.signed_query(command, params)?);
        debug!("CloudStack API 请求: {}", command);

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("API 请求失败: {} - {}", command, status);
            return Err(error_from_body(command, status.as_u16(), &body));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| CloudStackError::ParseError(format!("{} 响应不是合法 JSON: {}", command, e)))?;

        extract_payload(command, status.as_u16(), value)
    }

    /// 发送请求并解码载荷
    pub(crate) async fn request<R: DeserializeOwned>(
        &self,
        command: &str,
        params: QueryParams,
    ) -> Result<R> {
        let payload = self.request_raw(command, params).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// 发送请求，去掉单实体外层包装后解码
    pub(crate) async fn request_entity<R: DeserializeOwned>(
        &self,
        command: &str,
        params: QueryParams,
    ) -> Result<R> {
        let payload = self.request_raw(command, params).await?;
        Ok(serde_json::from_value(unwrap_result(payload))?)
    }

    /// 发送异步调用
    ///
    /// 未启用异步等待时直接返回包含 jobid 的信封；否则轮询任务，
    /// 完成后用任务结果重新解码响应。
    pub(crate) async fn dispatch_async<R>(
        &self,
        command: &str,
        params: QueryParams,
    ) -> Result<AsyncResult<R>>
    where
        R: DeserializeOwned + JobResponse,
    {
        let payload = self.request_raw(command, params).await?;
        let resolver = self.resolver();
        settle_envelope(self, resolver.as_ref(), command, payload).await
    }

    /// 等待任务并把结果合并到响应
    pub(crate) async fn resolve_into<R>(&self, job_id: String, envelope: R) -> Result<AsyncResult<R>>
    where
        R: DeserializeOwned + JobResponse,
    {
        let resolver = JobResolver::from_config(&self.config);
        resolve_envelope(self, &resolver, job_id, envelope).await
    }

    /// 异步模式下使用的轮询器，未启用时为 `None`
    fn resolver(&self) -> Option<JobResolver> {
        self.config
            .async_mode
            .then(|| JobResolver::from_config(&self.config))
    }
}

#[async_trait]
impl JobStatusQuery for CloudStackClient {
    async fn query_job(&self, job_id: &str) -> Result<AsyncJobResult> {
        let mut params = QueryParams::new();
        params.set("jobid", job_id);
        self.request("queryAsyncJobResult", params).await
    }
}

/// 计算请求签名: base64(HMAC-SHA1(secret, lowercase(query)))
pub(crate) fn sign(secret: &str, query: &str) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| CloudStackError::ConfigError(format!("无效的 Secret Key: {}", e)))?;
    mac.update(query.to_lowercase().as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// 取出响应信封中的载荷，并检查服务端错误
pub(crate) fn extract_payload(command: &str, status: u16, body: Value) -> Result<Value> {
    let Value::Object(mut map) = body else {
        return Err(CloudStackError::ParseError(format!("{} 响应不是 JSON 对象", command)));
    };

    let key = format!("{}response", command.to_lowercase());
    let payload = match map.remove(&key) {
        Some(payload) => payload,
        None => {
            let fallback = map
                .keys()
                .find(|k| k.ends_with("response"))
                .cloned()
                .ok_or_else(|| CloudStackError::ParseError(format!("{} 响应中缺少 {}", command, key)))?;
            warn!("{} 响应中缺少 {}，改用 {}", command, key, fallback);
            map.remove(&fallback).unwrap_or_default()
        }
    };

    if let Some(code) = payload.get("errorcode").and_then(Value::as_i64) {
        let text = payload
            .get("errortext")
            .and_then(Value::as_str)
            .unwrap_or("未知错误")
            .to_string();
        return Err(CloudStackError::ApiError { status, code, text });
    }

    Ok(payload)
}

/// 将非 2xx 响应转换为错误
pub(crate) fn error_from_body(command: &str, status: u16, body: &str) -> CloudStackError {
    let parsed = serde_json::from_str::<Value>(body)
        .ok()
        .map(|v| extract_payload(command, status, v));

    match parsed {
        Some(Err(err @ CloudStackError::ApiError { .. })) => err,
        _ => CloudStackError::ApiError {
            status,
            code: i64::from(status),
            text: body.to_string(),
        },
    }
}
