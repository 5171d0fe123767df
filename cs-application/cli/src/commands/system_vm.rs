//! 系统虚拟机管理命令

use anyhow::{Context, Result};
use colored::Colorize;
use cs_client::{
    CloudStackClient, ListSystemVmsParams, MigrateSystemVmParams, StopSystemVmParams, SystemVm,
    SystemVmIdParams,
};

use super::common::{create_client, is_uuid, or_dash, report_async};
use super::host::resolve_host_id;
use super::output::{output_formatted, TableRow};
use crate::{GlobalArgs, SystemVmAction};

impl TableRow for SystemVm {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "名称", "类型", "状态", "主机", "公网 IP"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            or_dash(&self.systemvmtype),
            or_dash(&self.state),
            or_dash(&self.hostname),
            or_dash(&self.publicip),
        ]
    }
}

pub async fn handle(action: SystemVmAction, global: &GlobalArgs) -> Result<()> {
    let client = create_client(global)?;

    match action {
        SystemVmAction::List {
            vm_type,
            state,
            zone,
            format,
        } => list_system_vms(&client, vm_type, state, zone, &format).await,
        SystemVmAction::Start { vm } => {
            let id = resolve_vm_id(&client, &vm).await?;
            let result = client
                .system_vm()
                .start_system_vm(&SystemVmIdParams::new(&id))
                .await
                .context("启动系统虚拟机失败")?;
            report_async("启动系统虚拟机", &result, print_system_vm);
            Ok(())
        }
        SystemVmAction::Stop { vm, forced } => {
            let id = resolve_vm_id(&client, &vm).await?;
            let result = client
                .system_vm()
                .stop_system_vm(&StopSystemVmParams::new(&id).with_forced(forced))
                .await
                .context("停止系统虚拟机失败")?;
            report_async("停止系统虚拟机", &result, print_system_vm);
            Ok(())
        }
        SystemVmAction::Reboot { vm } => {
            let id = resolve_vm_id(&client, &vm).await?;
            let result = client
                .system_vm()
                .reboot_system_vm(&SystemVmIdParams::new(&id))
                .await
                .context("重启系统虚拟机失败")?;
            report_async("重启系统虚拟机", &result, print_system_vm);
            Ok(())
        }
        SystemVmAction::Destroy { vm } => {
            let id = resolve_vm_id(&client, &vm).await?;
            let result = client
                .system_vm()
                .destroy_system_vm(&SystemVmIdParams::new(&id))
                .await
                .context("销毁系统虚拟机失败")?;
            report_async("销毁系统虚拟机", &result, print_system_vm);
            Ok(())
        }
        SystemVmAction::Migrate { vm, host } => {
            let id = resolve_vm_id(&client, &vm).await?;
            let host_id = resolve_host_id(&client, &host).await?;
            let result = client
                .system_vm()
                .migrate_system_vm(&MigrateSystemVmParams::new(&host_id, &id))
                .await
                .context("迁移系统虚拟机失败")?;
            report_async("迁移系统虚拟机", &result, print_system_vm);
            Ok(())
        }
    }
}

async fn resolve_vm_id(client: &CloudStackClient, vm: &str) -> Result<String> {
    if is_uuid(vm) {
        return Ok(vm.to_string());
    }

    client
        .system_vm()
        .get_system_vm_id(vm)
        .await
        .with_context(|| format!("查找系统虚拟机 {} 失败", vm))
}

async fn list_system_vms(
    client: &CloudStackClient,
    vm_type: Option<String>,
    state: Option<String>,
    zone: Option<String>,
    format: &str,
) -> Result<()> {
    let mut params = ListSystemVmsParams::new();
    if let Some(vm_type) = vm_type.as_deref() {
        params = params.with_system_vm_type(vm_type);
    }
    if let Some(state) = state.as_deref() {
        params = params.with_state(state);
    }
    if let Some(zone) = zone.as_deref() {
        params = params.with_zone_id(zone);
    }

    let response = client
        .system_vm()
        .list_system_vms(&params)
        .await
        .context("查询系统虚拟机列表失败")?;

    if response.systemvm.is_empty() && format != "json" {
        println!("{}", "没有找到系统虚拟机".yellow());
        return Ok(());
    }

    output_formatted(&response.systemvm, format)
}

fn print_system_vm(vm: &SystemVm) {
    println!("{} {}", vm.name.cyan().bold(), format!("({})", vm.id).bright_black());
    println!("  类型: {}", or_dash(&vm.systemvmtype));
    println!("  状态: {}", or_dash(&vm.state).yellow());
    println!("  主机: {}", or_dash(&vm.hostname));
    println!(
        "  地址: 公网 {} / 私网 {} / 链路本地 {}",
        or_dash(&vm.publicip),
        or_dash(&vm.privateip),
        or_dash(&vm.linklocalip)
    );
}
