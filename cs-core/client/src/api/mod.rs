//! CloudStack API 模块
//!
//! 按服务分组的 API 封装：
//! - 主机管理 (HostApi)
//! - 系统虚拟机管理 (SystemVmApi)
//! - 异步任务 (AsyncJobApi)

pub mod async_job;
pub mod host;
pub mod system_vm;

pub use async_job::AsyncJobApi;
pub use host::HostApi;
pub use system_vm::SystemVmApi;

use crate::error::{CloudStackError, Result};

/// 按名称查找唯一 ID
///
/// 只有一条结果时直接采用；多条时取名称完全一致的一条。
pub(crate) fn match_id_by_name<'a, T>(
    kind: &str,
    name: &str,
    items: &'a [T],
    item_name: impl Fn(&'a T) -> &'a str,
    item_id: impl Fn(&'a T) -> &'a str,
) -> Result<String> {
    match items {
        [] => Err(CloudStackError::NotFound(format!("未找到{}: {}", kind, name))),
        [only] => Ok(item_id(only).to_string()),
        many => many
            .iter()
            .find(|item| item_name(*item) == name)
            .map(|item| item_id(item).to_string())
            .ok_or_else(|| {
                CloudStackError::Ambiguous(format!(
                    "{} {} 有 {} 条结果，且没有名称完全一致的记录",
                    kind,
                    name,
                    many.len()
                ))
            }),
    }
}

/// 取唯一一条按 ID 查询的结果
pub(crate) fn single_by_id<T>(kind: &str, id: &str, mut items: Vec<T>) -> Result<T> {
    match items.len() {
        0 => Err(CloudStackError::NotFound(format!("未找到{}: {}", kind, id))),
        1 => Ok(items.remove(0)),
        n => Err(CloudStackError::Ambiguous(format!(
            "{} UUID {} 有 {} 条结果",
            kind, id, n
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<(String, String)> {
        vec![
            ("kvm-01".to_string(), "h-1".to_string()),
            ("kvm-010".to_string(), "h-10".to_string()),
        ]
    }

    #[test]
    fn test_match_id_by_name() {
        let items = items();
        let id = match_id_by_name("主机", "kvm-01", &items, |i| i.0.as_str(), |i| i.1.as_str()).unwrap();
        assert_eq!(id, "h-1");

        let single = &items[1..];
        let id = match_id_by_name("主机", "kvm", single, |i| i.0.as_str(), |i| i.1.as_str()).unwrap();
        assert_eq!(id, "h-10");
    }

    #[test]
    fn test_match_id_by_name_errors() {
        let items = items();
        let err = match_id_by_name("主机", "kvm", &items, |i| i.0.as_str(), |i| i.1.as_str()).unwrap_err();
        assert!(matches!(err, CloudStackError::Ambiguous(_)));

        let empty: Vec<(String, String)> = Vec::new();
        let err = match_id_by_name("主机", "kvm", &empty, |i| i.0.as_str(), |i| i.1.as_str()).unwrap_err();
        assert!(matches!(err, CloudStackError::NotFound(_)));
    }

    #[test]
    fn test_single_by_id() {
        assert_eq!(single_by_id("主机", "h-1", vec![1]).unwrap(), 1);
        assert!(matches!(single_by_id::<i32>("主机", "h-1", vec![]), Err(CloudStackError::NotFound(_))));
        assert!(matches!(single_by_id("主机", "h-1", vec![1, 2]), Err(CloudStackError::Ambiguous(_))));
    }
}
