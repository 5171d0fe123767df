//! 异步任务命令

use anyhow::{Context, Result};
use colored::Colorize;
use cs_client::{AsyncJobResult, CloudStackClient, JobFailure, JobOutcome, ListAsyncJobsParams};

use super::common::{create_client, or_dash};
use super::output::{output_formatted, print_json, TableRow};
use crate::{GlobalArgs, JobAction};

/// 命令名只保留最后一段，例如 `org.apache...StartSystemVMCmd` -> `StartSystemVMCmd`
fn short_cmd(cmd: &str) -> &str {
    cmd.rsplit('.').next().unwrap_or(cmd)
}

fn status_name(job: &AsyncJobResult) -> String {
    job.status()
        .map(|s| s.display_name().to_string())
        .unwrap_or_else(|_| format!("未知({})", job.jobstatus))
}

impl TableRow for AsyncJobResult {
    fn headers() -> Vec<&'static str> {
        vec!["任务 ID", "命令", "状态", "对象", "创建时间"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.jobid.clone(),
            short_cmd(&self.cmd).to_string(),
            status_name(self),
            or_dash(&self.jobinstancetype),
            or_dash(&self.created),
        ]
    }
}

pub async fn handle(action: JobAction, global: &GlobalArgs) -> Result<()> {
    let client = create_client(global)?;

    match action {
        JobAction::Query { job_id } => query_job(&client, &job_id).await,
        JobAction::Wait { job_id } => wait_job(&client, &job_id).await,
        JobAction::List { all, since, format } => list_jobs(&client, all, since, &format).await,
    }
}

async fn query_job(client: &CloudStackClient, job_id: &str) -> Result<()> {
    let job = client
        .async_job()
        .query_async_job_result(job_id)
        .await
        .with_context(|| format!("查询任务 {} 失败", job_id))?;

    println!("{} {}", "任务".bold(), job.jobid.cyan().bold());
    println!("  命令: {}", or_dash(short_cmd(&job.cmd)));
    println!("  状态: {}", status_name(&job).yellow());
    if !job.jobinstancetype.is_empty() {
        println!("  对象: {} {}", job.jobinstancetype, job.jobinstanceid.bright_black());
    }
    if !job.jobresult.is_null() {
        println!("  结果:");
        print_json(&job.jobresult)?;
    }

    Ok(())
}

async fn wait_job(client: &CloudStackClient, job_id: &str) -> Result<()> {
    let outcome = client
        .async_job()
        .wait(job_id)
        .await
        .with_context(|| format!("等待任务 {} 失败", job_id))?;

    print_outcome(job_id, &outcome)?;
    check_outcome(job_id, outcome)
}

fn print_outcome(job_id: &str, outcome: &JobOutcome) -> Result<()> {
    match outcome {
        JobOutcome::Resolved(result) => {
            println!("{} 任务 {} 完成", "✓".green().bold(), job_id.cyan().bold());
            if !result.is_null() {
                print_json(result)?;
            }
        }
        JobOutcome::Failed(JobFailure { code, text }) => {
            let code = code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
            println!(
                "{} 任务 {} 失败 [{}]: {}",
                "✗".red().bold(),
                job_id.cyan().bold(),
                code,
                text.red()
            );
        }
        JobOutcome::TimedOut(job_id) => {
            println!(
                "{} 等待超时，任务 {} 仍在执行",
                "⏳".yellow(),
                job_id.cyan().bold()
            );
        }
    }
    Ok(())
}

/// 任务失败时返回错误，使命令以非零状态退出
fn check_outcome(job_id: &str, outcome: JobOutcome) -> Result<()> {
    match outcome {
        JobOutcome::Failed(failure) => Err(failure.into_error(job_id).into()),
        JobOutcome::Resolved(_) | JobOutcome::TimedOut(_) => Ok(()),
    }
}

async fn list_jobs(
    client: &CloudStackClient,
    all: bool,
    since: Option<String>,
    format: &str,
) -> Result<()> {
    let mut params = ListAsyncJobsParams::new().with_list_all(all);
    if let Some(since) = since.as_deref() {
        params = params.with_start_date(since);
    }

    let response = client
        .async_job()
        .list_async_jobs(&params)
        .await
        .context("查询任务列表失败")?;

    if response.asyncjobs.is_empty() && format != "json" {
        println!("{}", "没有找到任务".yellow());
        return Ok(());
    }

    output_formatted(&response.asyncjobs, format)
}
