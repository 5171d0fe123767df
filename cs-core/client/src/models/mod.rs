//! CloudStack 数据模型
//!
//! 响应结构体与服务端 JSON 字段同名，缺省字段解码为空值。

pub mod async_job;
pub mod host;
pub mod system_vm;

use serde::{Deserialize, Deserializer, Serialize};

pub use async_job::{AsyncJobResult, JobStatus, ListAsyncJobsResponse};
pub use host::{
    AddHostResponse, DedicatedHost, FindHostsForMigrationResponse, Host, ImageStore,
    ListDedicatedHostsResponse, ListHostsResponse,
};
pub use system_vm::{ListSystemVmsResponse, SystemVm};

/// 通用成功响应 (`success` / `displaytext`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuccessResponse {
    pub jobid: Option<String>,

    #[serde(deserialize_with = "lenient_bool")]
    pub success: bool,

    pub displaytext: String,
}

/// 兼容 `true` 与 `"true"` 两种写法
pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    Ok(match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => b,
        BoolOrString::String(s) => s.eq_ignore_ascii_case("true"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response_accepts_string_and_bool() {
        let a: SuccessResponse = serde_json::from_str(r#"{"success":"true"}"#).unwrap();
        let b: SuccessResponse = serde_json::from_str(r#"{"success":true,"displaytext":"ok"}"#).unwrap();
        let c: SuccessResponse = serde_json::from_str(r#"{"success":"false"}"#).unwrap();

        assert!(a.success);
        assert!(b.success);
        assert_eq!(b.displaytext, "ok");
        assert!(!c.success);
    }

    #[test]
    fn test_success_response_envelope() {
        let r: SuccessResponse = serde_json::from_str(r#"{"jobid":"job-9"}"#).unwrap();
        assert_eq!(r.jobid.as_deref(), Some("job-9"));
        assert!(!r.success);
    }
}
