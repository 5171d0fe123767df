//! CloudStack 客户端错误定义

use thiserror::Error;

/// CloudStack 客户端错误类型
#[derive(Error, Debug)]
pub enum CloudStackError {
    #[error("HTTP 错误: {0}")]
    HttpError(String),

    /// 服务端返回的错误信封 (errorcode/errortext) 或非 2xx 状态
    #[error("API 错误 [HTTP {status}, code {code}]: {text}")]
    ApiError { status: u16, code: i64, text: String },

    #[error("解析错误: {0}")]
    ParseError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 异步任务在服务端执行失败
    #[error("异步任务 {job_id} 执行失败 (code {code:?}): {text}")]
    JobFailed {
        job_id: String,
        code: Option<i64>,
        text: String,
    },

    #[error("资源不存在: {0}")]
    NotFound(String),

    #[error("匹配结果不唯一: {0}")]
    Ambiguous(String),
}

impl From<reqwest::Error> for CloudStackError {
    fn from(e: reqwest::Error) -> Self {
        CloudStackError::HttpError(e.to_string())
    }
}

impl From<serde_json::Error> for CloudStackError {
    fn from(e: serde_json::Error) -> Self {
        CloudStackError::ParseError(e.to_string())
    }
}

/// CloudStack 客户端结果类型
pub type Result<T> = std::result::Result<T, CloudStackError>;
