//! 异步任务等待
//!
//! CloudStack 的变更类调用只返回一个 jobid，真正的结果需要通过
//! `queryAsyncJobResult` 轮询获得。[`JobResolver`] 负责轮询直到任务进入
//! 终态或超出等待上限，并把结果归类为 [`JobOutcome`]：
//!
//! - `Resolved`: 任务成功，携带结果载荷
//! - `Failed`: 任务失败，携带服务端错误信息
//! - `TimedOut`: 等待超时，任务仍在执行，可用同一个 jobid 继续等待
//!
//! 轮询过程中的网络/解析错误直接返回，不会重试。

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{CloudStackError, Result};
use crate::models::{AsyncJobResult, DedicatedHost, Host, JobStatus, SuccessResponse, SystemVm};

/// 任务状态查询
///
/// 由 [`CloudStackClient`](crate::CloudStackClient) 实现，查询是只读操作，
/// 可以安全地重复调用。
#[async_trait]
pub trait JobStatusQuery: Send + Sync {
    async fn query_job(&self, job_id: &str) -> Result<AsyncJobResult>;
}

/// 携带 jobid 的响应类型
pub trait JobResponse {
    fn job_id(&self) -> Option<&str>;

    fn set_job_id(&mut self, job_id: String);
}

macro_rules! impl_job_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl JobResponse for $ty {
                fn job_id(&self) -> Option<&str> {
                    self.jobid.as_deref()
                }

                fn set_job_id(&mut self, job_id: String) {
                    self.jobid = Some(job_id);
                }
            }
        )*
    };
}

impl_job_response!(Host, SystemVm, DedicatedHost, SuccessResponse);

/// 任务失败信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    /// 服务端错误码
    pub code: Option<i64>,

    /// 服务端错误描述
    pub text: String,
}

impl JobFailure {
    /// 从失败任务的查询结果中提取错误信息
    pub fn from_result(result: &AsyncJobResult) -> Self {
        match &result.jobresult {
            Value::String(text) => Self {
                code: Some(result.jobresultcode).filter(|c| *c != 0),
                text: text.clone(),
            },
            Value::Object(map) => Self {
                code: map.get("errorcode").and_then(Value::as_i64),
                text: map
                    .get("errortext")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("未定义的错误: {}", result.jobresult)),
            },
            other => Self {
                code: Some(result.jobresultcode).filter(|c| *c != 0),
                text: format!("未定义的错误: {}", other),
            },
        }
    }

    /// 转换为错误
    pub fn into_error(self, job_id: &str) -> CloudStackError {
        CloudStackError::JobFailed {
            job_id: job_id.to_string(),
            code: self.code,
            text: self.text,
        }
    }
}

/// 一次等待的结果
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// 任务成功，携带原始结果载荷
    Resolved(Value),

    /// 任务失败
    Failed(JobFailure),

    /// 等待超时，携带仍在执行的 jobid
    TimedOut(String),
}

/// 异步调用的返回值
#[derive(Debug, Clone)]
pub enum AsyncResult<T> {
    /// 任务已完成，响应为最终结果
    Completed(T),

    /// 等待超时，任务仍在执行；响应为初始信封
    TimedOut { job_id: String, response: T },

    /// 未启用异步等待，任务已提交；响应为初始信封
    Submitted { job_id: String, response: T },
}

impl<T> AsyncResult<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, AsyncResult::Completed(_))
    }

    /// 仍在执行的任务 ID
    pub fn pending_job_id(&self) -> Option<&str> {
        match self {
            AsyncResult::Completed(_) => None,
            AsyncResult::TimedOut { job_id, .. } | AsyncResult::Submitted { job_id, .. } => {
                Some(job_id)
            }
        }
    }

    pub fn response(&self) -> &T {
        match self {
            AsyncResult::Completed(r) => r,
            AsyncResult::TimedOut { response, .. } | AsyncResult::Submitted { response, .. } => {
                response
            }
        }
    }

    pub fn into_response(self) -> T {
        match self {
            AsyncResult::Completed(r) => r,
            AsyncResult::TimedOut { response, .. } | AsyncResult::Submitted { response, .. } => {
                response
            }
        }
    }
}

impl<T: JobResponse> AsyncResult<T> {
    /// 任务 ID，完成后的响应仍保留 jobid
    pub fn job_id(&self) -> Option<&str> {
        match self {
            AsyncResult::Completed(r) => r.job_id(),
            AsyncResult::TimedOut { job_id, .. } | AsyncResult::Submitted { job_id, .. } => {
                Some(job_id)
            }
        }
    }
}

/// 去掉结果载荷外层的单键包装
///
/// 服务端常把实体包在 `{"host": {...}}` 这样的对象里；只有一个键且值为
/// 对象时取出内层，否则原样返回。
pub fn unwrap_result(value: Value) -> Value {
    match value {
        Value::Object(map) if map.len() == 1 && map.values().all(Value::is_object) => {
            map.into_iter().map(|(_, inner)| inner).next().unwrap_or_default()
        }
        other => other,
    }
}

/// 两次查询之间的最短间隔
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// 异步任务轮询器
#[derive(Debug, Clone)]
pub struct JobResolver {
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl JobResolver {
    /// `timeout` 为 `None` 时一直等待
    ///
    /// 轮询间隔不小于 [`MIN_POLL_INTERVAL`]。
    pub fn new(poll_interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            timeout,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.poll_interval(), config.async_timeout())
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// 轮询任务直到终态或超时
    pub async fn resolve<Q>(&self, query: &Q, job_id: &str) -> Result<JobOutcome>
    where
        Q: JobStatusQuery + ?Sized,
    {
        if job_id.is_empty() {
            return Err(CloudStackError::ConfigError("jobid 不能为空".to_string()));
        }

        let started = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let result = query.query_job(job_id).await?;

            match result.status()? {
                JobStatus::Succeeded => {
                    debug!("异步任务 {} 完成 (第 {} 次查询)", job_id, attempt);
                    return Ok(JobOutcome::Resolved(result.jobresult));
                }
                JobStatus::Failed => {
                    let failure = JobFailure::from_result(&result);
                    debug!("异步任务 {} 失败: {}", job_id, failure.text);
                    return Ok(JobOutcome::Failed(failure));
                }
                JobStatus::Pending => {}
            }

            let elapsed = started.elapsed();
            let wait = match self.timeout {
                Some(budget) if elapsed >= budget => {
                    warn!(
                        "等待异步任务 {} 超时 ({:?})，任务仍在执行",
                        job_id, budget
                    );
                    return Ok(JobOutcome::TimedOut(job_id.to_string()));
                }
                Some(budget) => self.poll_interval.min(budget - elapsed),
                None => self.poll_interval,
            };

            debug!(
                "异步任务 {} 执行中 (第 {} 次查询)，{:?} 后重试",
                job_id, attempt, wait
            );
            tokio::time::sleep(wait).await;
        }
    }
}

/// 处理异步调用返回的信封
///
/// `resolver` 为 `None` 表示未启用异步等待，直接返回 `Submitted`。
pub async fn settle_envelope<R, Q>(
    query: &Q,
    resolver: Option<&JobResolver>,
    command: &str,
    payload: Value,
) -> Result<AsyncResult<R>>
where
    R: DeserializeOwned + JobResponse,
    Q: JobStatusQuery + ?Sized,
{
    let envelope: R = serde_json::from_value(payload)?;

    let job_id = envelope
        .job_id()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CloudStackError::ParseError(format!("{} 响应中缺少 jobid", command)))?;

    match resolver {
        Some(resolver) => resolve_envelope(query, resolver, job_id, envelope).await,
        None => {
            debug!("异步任务已提交: {} -> {}", command, job_id);
            Ok(AsyncResult::Submitted {
                job_id,
                response: envelope,
            })
        }
    }
}

/// 等待任务，并用任务结果重新解码响应
///
/// 成功时响应来自任务结果，jobid 写回以便追踪；超时时原样返回信封。
pub async fn resolve_envelope<R, Q>(
    query: &Q,
    resolver: &JobResolver,
    job_id: String,
    envelope: R,
) -> Result<AsyncResult<R>>
where
    R: DeserializeOwned + JobResponse,
    Q: JobStatusQuery + ?Sized,
{
    match resolver.resolve(query, &job_id).await? {
        JobOutcome::Resolved(result) => {
            let mut merged: R = serde_json::from_value(unwrap_result(result))?;
            merged.set_job_id(job_id);
            Ok(AsyncResult::Completed(merged))
        }
        JobOutcome::Failed(failure) => Err(failure.into_error(&job_id)),
        JobOutcome::TimedOut(job_id) => Ok(AsyncResult::TimedOut {
            job_id,
            response: envelope,
        }),
    }
}
