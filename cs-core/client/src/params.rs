//! 请求参数编码
//!
//! 每个 API 调用都有独立的参数结构体，通过 [`ToQueryParams`] 转换为
//! [`QueryParams`]。未设置的可选字段不会出现在请求中。

use std::collections::BTreeMap;

/// 按键排序的请求参数集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: BTreeMap<String, String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置字符串参数
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// 设置可选字符串参数
    pub fn set_opt(&mut self, key: &str, value: Option<&String>) {
        if let Some(v) = value {
            self.set(key, v.as_str());
        }
    }

    /// 设置布尔参数 (`true` / `false`)
    pub fn set_bool(&mut self, key: &str, value: Option<bool>) {
        if let Some(v) = value {
            self.set(key, v.to_string());
        }
    }

    /// 设置整数参数
    pub fn set_int(&mut self, key: &str, value: Option<i64>) {
        if let Some(v) = value {
            self.set(key, v.to_string());
        }
    }

    /// 设置列表参数，以 `", "` 连接
    pub fn set_list(&mut self, key: &str, value: Option<&Vec<String>>) {
        if let Some(v) = value {
            self.set(key, v.join(", "));
        }
    }

    /// 设置键值对参数，展开为 `name[i].key` / `name[i].value`
    pub fn set_map(&mut self, key: &str, value: Option<&BTreeMap<String, String>>) {
        if let Some(map) = value {
            for (i, (k, v)) in map.iter().enumerate() {
                self.set(&format!("{}[{}].key", key, i), k.as_str());
                self.set(&format!("{}[{}].value", key, i), v.as_str());
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 编码为查询字符串，键按字典序排列，空格编码为 `%20`
    pub fn encode(&self) -> String {
        self.values
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// 参数结构体到请求参数的转换
pub trait ToQueryParams {
    fn to_params(&self) -> QueryParams;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_values_are_not_sent() {
        let mut params = QueryParams::new();
        params.set_opt("name", None);
        params.set_bool("forced", None);
        params.set_int("page", None);
        params.set_list("hosttags", None);
        params.set_map("details", None);
        assert!(params.is_empty());
    }

    #[test]
    fn test_typed_values() {
        let mut params = QueryParams::new();
        params.set_bool("forced", Some(true));
        params.set_int("pagesize", Some(500));
        params.set_list("hosttags", Some(&vec!["ssd".to_string(), "gpu".to_string()]));

        assert_eq!(params.get("forced"), Some("true"));
        assert_eq!(params.get("pagesize"), Some("500"));
        assert_eq!(params.get("hosttags"), Some("ssd, gpu"));
    }

    #[test]
    fn test_map_expansion() {
        let mut details = BTreeMap::new();
        details.insert("memory".to_string(), "2048".to_string());
        details.insert("cpuNumber".to_string(), "2".to_string());

        let mut params = QueryParams::new();
        params.set_map("details", Some(&details));

        assert_eq!(params.len(), 4);
        assert_eq!(params.get("details[0].key"), Some("cpuNumber"));
        assert_eq!(params.get("details[0].value"), Some("2"));
        assert_eq!(params.get("details[1].key"), Some("memory"));
        assert_eq!(params.get("details[1].value"), Some("2048"));
    }

    #[test]
    fn test_encode_sorted_and_escaped() {
        let mut params = QueryParams::new();
        params.set("zoneid", "z-1");
        params.set("name", "my host");
        params.set("command", "listHosts");

        assert_eq!(params.encode(), "command=listHosts&name=my%20host&zoneid=z-1");
    }
}
