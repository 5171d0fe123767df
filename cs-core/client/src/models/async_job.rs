//! 异步任务模型

use serde::{Deserialize, Serialize};

use crate::error::{CloudStackError, Result};

/// 异步任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// 执行中
    Pending,
    /// 执行成功
    Succeeded,
    /// 执行失败
    Failed,
}

impl JobStatus {
    /// 从服务端状态码转换
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(JobStatus::Pending),
            1 => Ok(JobStatus::Succeeded),
            2 => Ok(JobStatus::Failed),
            other => Err(CloudStackError::ParseError(format!("未知的任务状态码: {}", other))),
        }
    }

    /// 获取状态码
    pub fn code(&self) -> i64 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Succeeded => 1,
            JobStatus::Failed => 2,
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            JobStatus::Pending => "执行中",
            JobStatus::Succeeded => "成功",
            JobStatus::Failed => "失败",
        }
    }
}

/// `queryAsyncJobResult` / `listAsyncJobs` 返回的任务信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AsyncJobResult {
    pub accountid: String,
    pub cmd: String,
    pub created: String,
    pub jobid: String,
    pub jobinstanceid: String,
    pub jobinstancetype: String,
    pub jobprocstatus: i64,
    pub jobresult: serde_json::Value,
    pub jobresultcode: i64,
    pub jobresulttype: String,
    pub jobstatus: i64,
    pub userid: String,
}

impl AsyncJobResult {
    /// 当前任务状态
    pub fn status(&self) -> Result<JobStatus> {
        JobStatus::from_code(self.jobstatus)
    }
}

/// `listAsyncJobs` 响应
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListAsyncJobsResponse {
    pub count: i64,
    pub asyncjobs: Vec<AsyncJobResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(JobStatus::from_code(0).unwrap(), JobStatus::Pending);
        assert_eq!(JobStatus::from_code(1).unwrap(), JobStatus::Succeeded);
        assert_eq!(JobStatus::from_code(2).unwrap(), JobStatus::Failed);
        assert!(JobStatus::from_code(7).is_err());

        assert!(!JobStatus::Pending.is_terminal());
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert_eq!(JobStatus::Failed.code(), 2);
    }

    #[test]
    fn test_decode_query_result() {
        let raw = r#"{
            "jobid": "job-1",
            "cmd": "org.apache.cloudstack.api.command.admin.host.ReconnectHostCmd",
            "jobstatus": 1,
            "jobprocstatus": 0,
            "jobresultcode": 0,
            "jobresulttype": "object",
            "jobresult": {"host": {"id": "h-42", "state": "Up"}}
        }"#;

        let job: AsyncJobResult = serde_json::from_str(raw).unwrap();
        assert_eq!(job.jobid, "job-1");
        assert_eq!(job.status().unwrap(), JobStatus::Succeeded);
        assert_eq!(job.jobresult["host"]["id"], "h-42");
    }
}
