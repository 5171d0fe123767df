//! 主机管理命令

use anyhow::{Context, Result};
use colored::Colorize;
use cs_client::{CloudStackClient, Host, HostIdParams, ListHostsParams};

use super::common::{create_client, is_uuid, or_dash, report_async};
use super::output::{output_formatted, TableRow};
use crate::{GlobalArgs, HostAction};

impl TableRow for Host {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "名称", "类型", "状态", "资源状态", "区域", "IP"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            or_dash(&self.host_type),
            or_dash(&self.state),
            or_dash(&self.resourcestate),
            or_dash(&self.zonename),
            or_dash(&self.ipaddress),
        ]
    }
}

pub async fn handle(action: HostAction, global: &GlobalArgs) -> Result<()> {
    let client = create_client(global)?;

    match action {
        HostAction::List {
            zone,
            state,
            host_type,
            format,
        } => list_hosts(&client, zone, state, host_type, &format).await,
        HostAction::Get { host } => show_host(&client, &host).await,
        HostAction::Maintenance { host } => prepare_maintenance(&client, &host).await,
        HostAction::CancelMaintenance { host } => cancel_maintenance(&client, &host).await,
        HostAction::Reconnect { host } => reconnect(&client, &host).await,
    }
}

/// 主机参数可以是 ID 或名称
pub async fn resolve_host_id(client: &CloudStackClient, host: &str) -> Result<String> {
    if is_uuid(host) {
        return Ok(host.to_string());
    }

    client
        .host()
        .get_host_id(host)
        .await
        .with_context(|| format!("查找主机 {} 失败", host))
}

async fn list_hosts(
    client: &CloudStackClient,
    zone: Option<String>,
    state: Option<String>,
    host_type: Option<String>,
    format: &str,
) -> Result<()> {
    let mut params = ListHostsParams::new();
    if let Some(zone) = zone.as_deref() {
        params = params.with_zone_id(zone);
    }
    if let Some(state) = state.as_deref() {
        params = params.with_state(state);
    }
    if let Some(host_type) = host_type.as_deref() {
        params = params.with_type(host_type);
    }

    let response = client.host().list_hosts(&params).await.context("查询主机列表失败")?;

    if response.host.is_empty() && format != "json" {
        println!("{}", "没有找到主机".yellow());
        return Ok(());
    }

    output_formatted(&response.host, format)?;
    if format != "json" {
        println!("\n共 {} 台主机", response.count.to_string().cyan());
    }

    Ok(())
}

async fn show_host(client: &CloudStackClient, host: &str) -> Result<()> {
    let id = resolve_host_id(client, host).await?;
    let host = client.host().get_host_by_id(&id).await?;

    print_host(&host);
    Ok(())
}

fn print_host(host: &Host) {
    println!("{} {}", host.name.cyan().bold(), format!("({})", host.id).bright_black());
    println!("  状态:     {} / {}", or_dash(&host.state).yellow(), or_dash(&host.resourcestate));
    println!("  类型:     {}", or_dash(&host.host_type));
    println!("  地址:     {}", or_dash(&host.ipaddress));
    println!(
        "  虚拟化:   {} {}",
        or_dash(&host.hypervisor),
        host.hypervisorversion
    );
    println!(
        "  位置:     {} / {} / {}",
        or_dash(&host.zonename),
        or_dash(&host.podname),
        or_dash(&host.clustername)
    );
    if host.cpunumber > 0 {
        println!(
            "  CPU:      {} 核 x {} MHz (已分配 {})",
            host.cpunumber,
            host.cpuspeed,
            or_dash(&host.cpuallocated)
        );
    }
    if host.memorytotal > 0 {
        println!(
            "  内存:     {} / {} MB",
            host.memoryused / 1024 / 1024,
            host.memorytotal / 1024 / 1024
        );
    }
    if !host.hosttags.is_empty() {
        println!("  标签:     {}", host.hosttags.bright_black());
    }
}

async fn prepare_maintenance(client: &CloudStackClient, host: &str) -> Result<()> {
    let id = resolve_host_id(client, host).await?;
    let result = client
        .host()
        .prepare_host_for_maintenance(&HostIdParams::new(&id))
        .await
        .context("进入维护模式失败")?;

    report_async("进入维护模式", &result, print_host);
    Ok(())
}

async fn cancel_maintenance(client: &CloudStackClient, host: &str) -> Result<()> {
    let id = resolve_host_id(client, host).await?;
    let result = client
        .host()
        .cancel_host_maintenance(&HostIdParams::new(&id))
        .await
        .context("退出维护模式失败")?;

    report_async("退出维护模式", &result, print_host);
    Ok(())
}

async fn reconnect(client: &CloudStackClient, host: &str) -> Result<()> {
    let id = resolve_host_id(client, host).await?;
    let result = client
        .host()
        .reconnect_host(&HostIdParams::new(&id))
        .await
        .context("重新连接主机失败")?;

    report_async("重新连接主机", &result, print_host);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_row() {
        let host = Host {
            id: "h-1".to_string(),
            name: "kvm-01".to_string(),
            state: "Up".to_string(),
            ..Default::default()
        };

        let row = host.row();
        assert_eq!(row.len(), Host::headers().len());
        assert_eq!(row[0], "h-1");
        assert_eq!(row[3], "Up");
        assert_eq!(row[6], "-");
    }
}
