//! 系统虚拟机模型

use serde::{Deserialize, Serialize};

/// 系统虚拟机 (二级存储 VM / 控制台代理 VM)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemVm {
    /// 异步任务 ID
    pub jobid: Option<String>,

    /// 当前作用于该 VM 的任务状态
    pub jobstatus: i64,

    pub id: String,
    pub name: String,
    pub state: String,
    pub systemvmtype: String,
    pub templateid: String,
    pub created: String,
    pub activeviewersessions: i64,

    // 位置
    pub zoneid: String,
    pub zonename: String,
    pub podid: String,
    pub hostid: String,
    pub hostname: String,

    // 网络
    pub networkdomain: String,
    pub gateway: String,
    pub dns1: String,
    pub dns2: String,
    pub publicip: String,
    pub publicmacaddress: String,
    pub publicnetmask: String,
    pub privateip: String,
    pub privatemacaddress: String,
    pub privatenetmask: String,
    pub linklocalip: String,
    pub linklocalmacaddress: String,
    pub linklocalnetmask: String,
}

/// `listSystemVms` 响应
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListSystemVmsResponse {
    pub count: i64,
    pub systemvm: Vec<SystemVm>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_system_vm() {
        let raw = r#"{
            "count": 1,
            "systemvm": [{
                "id": "s-1", "name": "s-1-VM", "state": "Running",
                "systemvmtype": "secondarystoragevm", "publicip": "10.0.0.5",
                "activeviewersessions": 0
            }]
        }"#;

        let list: ListSystemVmsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(list.count, 1);
        assert_eq!(list.systemvm[0].systemvmtype, "secondarystoragevm");
        assert_eq!(list.systemvm[0].publicip, "10.0.0.5");
    }
}
