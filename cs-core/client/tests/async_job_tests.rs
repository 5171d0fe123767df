//! 异步任务等待测试
//!
//! 使用脚本化的任务状态查询代替真实的管理服务器。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cs_client::*;
use serde_json::{json, Value};

/// 一次查询的返回
enum Step {
    Pending,
    Succeeded(Value),
    Failed(Value),
    BadStatus(i64),
    TransportError,
}

/// 按脚本返回任务状态，脚本用完后重复最后一个状态
struct ScriptedQuery {
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<AsyncJobResult>>,
    polls: AtomicUsize,
}

impl ScriptedQuery {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            last: Mutex::new(None),
            polls: AtomicUsize::new(0),
        }
    }

    fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

fn job(job_id: &str, status: i64, result: Value) -> AsyncJobResult {
    AsyncJobResult {
        jobid: job_id.to_string(),
        jobstatus: status,
        jobresulttype: "object".to_string(),
        jobresult: result,
        ..Default::default()
    }
}

#[async_trait]
impl JobStatusQuery for ScriptedQuery {
    async fn query_job(&self, job_id: &str) -> Result<AsyncJobResult> {
        self.polls.fetch_add(1, Ordering::SeqCst);

        let step = self.steps.lock().unwrap().pop_front();
        let result = match step {
            Some(Step::Pending) => job(job_id, 0, Value::Null),
            Some(Step::Succeeded(result)) => job(job_id, 1, result),
            Some(Step::Failed(result)) => job(job_id, 2, result),
            Some(Step::BadStatus(code)) => job(job_id, code, Value::Null),
            Some(Step::TransportError) => {
                return Err(CloudStackError::HttpError("connection reset".to_string()))
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| job(job_id, 0, Value::Null)),
        };

        *self.last.lock().unwrap() = Some(result.clone());
        Ok(result)
    }
}

fn envelope(job_id: &str) -> Host {
    Host {
        jobid: Some(job_id.to_string()),
        ..Default::default()
    }
}

fn resolver(timeout: Option<u64>) -> JobResolver {
    JobResolver::new(Duration::from_secs(3), timeout.map(Duration::from_secs))
}

#[tokio::test(start_paused = true)]
async fn test_pending_then_succeeded_merges_result() {
    let query = ScriptedQuery::new(vec![
        Step::Pending,
        Step::Pending,
        Step::Succeeded(json!({"host": {"id": "h-42", "state": "Up", "name": "kvm-01"}})),
    ]);

    let started = tokio::time::Instant::now();
    let result = resolve_envelope(&query, &resolver(None), "job-1".to_string(), envelope("job-1"))
        .await
        .unwrap();

    assert_eq!(query.polls(), 3);
    assert!(started.elapsed() >= Duration::from_secs(6));

    match result {
        AsyncResult::Completed(host) => {
            assert_eq!(host.id, "h-42");
            assert_eq!(host.state, "Up");
            assert_eq!(host.name, "kvm-01");
            assert_eq!(host.jobid.as_deref(), Some("job-1"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_flat_result_is_used_as_is() {
    let query = ScriptedQuery::new(vec![
        Step::Pending,
        Step::Pending,
        Step::Succeeded(json!({"id": "h-42", "state": "Up"})),
    ]);

    let result = resolve_envelope(&query, &resolver(Some(300)), "job-1".to_string(), envelope("job-1"))
        .await
        .unwrap();

    let host = result.into_response();
    assert_eq!(host.id, "h-42");
    assert_eq!(host.state, "Up");
    assert_eq!(host.jobid.as_deref(), Some("job-1"));
}

#[tokio::test(start_paused = true)]
async fn test_failed_job_returns_error() {
    let query = ScriptedQuery::new(vec![Step::Failed(
        json!({"errorcode": 530, "errortext": "insufficient capacity"}),
    )]);

    let err = resolve_envelope(&query, &resolver(Some(300)), "job-2".to_string(), envelope("job-2"))
        .await
        .unwrap_err();

    assert_eq!(query.polls(), 1);
    assert!(err.to_string().contains("insufficient capacity"));
    match err {
        CloudStackError::JobFailed { job_id, code, text } => {
            assert_eq!(job_id, "job-2");
            assert_eq!(code, Some(530));
            assert_eq!(text, "insufficient capacity");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_failure_after_many_pending_polls_is_never_success() {
    let mut steps: Vec<Step> = (0..20).map(|_| Step::Pending).collect();
    steps.push(Step::Failed(json!({"errorcode": 530, "errortext": "host is busy"})));
    let query = ScriptedQuery::new(steps);

    let outcome = resolver(None).resolve(&query, "job-2").await.unwrap();

    assert_eq!(query.polls(), 21);
    assert_eq!(
        outcome,
        JobOutcome::Failed(JobFailure {
            code: Some(530),
            text: "host is busy".to_string(),
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_zero_budget_polls_once() {
    let query = ScriptedQuery::new(vec![Step::Pending, Step::Succeeded(json!({"id": "h-1"}))]);

    let result = resolve_envelope(&query, &resolver(Some(0)), "job-3".to_string(), envelope("job-3"))
        .await
        .unwrap();

    assert_eq!(query.polls(), 1);
    match result {
        AsyncResult::TimedOut { job_id, response } => {
            assert_eq!(job_id, "job-3");
            assert_eq!(response.jobid.as_deref(), Some("job-3"));
            assert_eq!(response.id, "");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_budget_exhausted_keeps_envelope() {
    let query = ScriptedQuery::new(vec![]);

    let mut submitted = envelope("job-4");
    submitted.name = "from-envelope".to_string();

    let started = tokio::time::Instant::now();
    let result = resolve_envelope(&query, &resolver(Some(10)), "job-4".to_string(), submitted)
        .await
        .unwrap();

    // t = 0, 3, 6, 9, 10
    assert_eq!(query.polls(), 5);
    assert!(started.elapsed() >= Duration::from_secs(10));
    assert!(started.elapsed() < Duration::from_secs(13));

    assert_eq!(result.pending_job_id(), Some("job-4"));
    let response = result.into_response();
    assert_eq!(response.name, "from-envelope");
    assert_eq!(response.state, "");
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_does_not_spin() {
    let query = ScriptedQuery::new(vec![]);

    let outcome = JobResolver::new(Duration::ZERO, Some(Duration::from_secs(10)))
        .resolve(&query, "job-11")
        .await
        .unwrap();

    assert_eq!(outcome, JobOutcome::TimedOut("job-11".to_string()));
    // 每秒最多一次: t = 0, 1, ..., 10
    assert_eq!(query.polls(), 11);
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_stops_polling() {
    let query = ScriptedQuery::new(vec![
        Step::Pending,
        Step::TransportError,
        Step::Succeeded(json!({"id": "h-1"})),
    ]);

    let err = resolver(None).resolve(&query, "job-5").await.unwrap_err();

    assert!(matches!(err, CloudStackError::HttpError(_)));
    assert_eq!(query.polls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_status_is_a_parse_error() {
    let query = ScriptedQuery::new(vec![Step::Pending, Step::BadStatus(9)]);

    let err = resolver(None).resolve(&query, "job-6").await.unwrap_err();

    assert!(matches!(err, CloudStackError::ParseError(_)));
    assert_eq!(query.polls(), 2);
}

#[tokio::test]
async fn test_empty_job_id_is_rejected() {
    let query = ScriptedQuery::new(vec![]);

    let err = resolver(None).resolve(&query, "").await.unwrap_err();

    assert!(matches!(err, CloudStackError::ConfigError(_)));
    assert_eq!(query.polls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_terminal_job_is_stable_across_queries() {
    let query = ScriptedQuery::new(vec![Step::Succeeded(json!({"host": {"id": "h-7"}}))]);

    let first = query.query_job("job-7").await.unwrap();
    let second = query.query_job("job-7").await.unwrap();
    assert_eq!(first.jobresult, second.jobresult);
    assert_eq!(first.jobstatus, second.jobstatus);

    let a = resolver(Some(0)).resolve(&query, "job-7").await.unwrap();
    let b = resolver(Some(0)).resolve(&query, "job-7").await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a, JobOutcome::Resolved(json!({"host": {"id": "h-7"}})));
}

#[tokio::test(start_paused = true)]
async fn test_resume_after_timeout_with_same_handle() {
    let query = ScriptedQuery::new(vec![
        Step::Pending,
        Step::Pending,
        Step::Succeeded(json!({"systemvm": {"id": "s-1", "state": "Running"}})),
    ]);

    let first: AsyncResult<SystemVm> = resolve_envelope(
        &query,
        &resolver(Some(0)),
        "job-8".to_string(),
        SystemVm {
            jobid: Some("job-8".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let job_id = first.pending_job_id().unwrap().to_string();
    assert_eq!(job_id, "job-8");

    let resumed: AsyncResult<SystemVm> =
        resolve_envelope(&query, &resolver(Some(60)), job_id, SystemVm::default())
            .await
            .unwrap();

    assert_eq!(query.polls(), 3);
    let vm = resumed.into_response();
    assert_eq!(vm.id, "s-1");
    assert_eq!(vm.state, "Running");
    assert_eq!(vm.jobid.as_deref(), Some("job-8"));
}

#[tokio::test]
async fn test_async_mode_disabled_returns_envelope() {
    let query = ScriptedQuery::new(vec![Step::Succeeded(json!({"id": "h-1"}))]);

    let result: AsyncResult<Host> =
        settle_envelope(&query, None, "reconnectHost", json!({"jobid": "job-9"}))
            .await
            .unwrap();

    assert_eq!(query.polls(), 0);
    match result {
        AsyncResult::Submitted { job_id, response } => {
            assert_eq!(job_id, "job-9");
            assert_eq!(response.jobid.as_deref(), Some("job-9"));
            assert_eq!(response.id, "");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_settle_envelope_resolves_in_async_mode() {
    let query = ScriptedQuery::new(vec![
        Step::Pending,
        Step::Succeeded(json!({"success": true, "displaytext": "released"})),
    ]);

    let result: AsyncResult<SuccessResponse> = settle_envelope(
        &query,
        Some(&resolver(Some(300))),
        "releaseDedicatedHost",
        json!({"jobid": "job-10"}),
    )
    .await
    .unwrap();

    assert!(result.is_completed());
    assert_eq!(result.job_id(), Some("job-10"));
    let response = result.into_response();
    assert!(response.success);
    assert_eq!(response.displaytext, "released");
}

#[tokio::test]
async fn test_settle_envelope_without_job_id() {
    let query = ScriptedQuery::new(vec![]);

    let err = settle_envelope::<Host, _>(&query, None, "reconnectHost", json!({"id": "h-1"}))
        .await
        .unwrap_err();

    assert!(matches!(err, CloudStackError::ParseError(_)));
    assert_eq!(query.polls(), 0);
}
