// ==========================================
// 采购建议引擎 - 命令行入口
// ==========================================
// 用法:
//   purchase-advisor <config.json|-> <request.json> <snapshot.json|snapshot.csv>
//
// config 传 "-" 表示使用默认配置；RunResult 以 JSON 输出到 stdout，日志写 stderr
// 环境变量: RUST_LOG（日志级别）、PURCHASE_ADVISOR_LOG_FORMAT=json（JSON 日志）
// ==========================================

use anyhow::{bail, Context};
use chrono::Utc;
use purchase_advisor::engine::{RunContext, RunOrchestrator, RunRequest};
use purchase_advisor::importer::provider_for_path;
use purchase_advisor::{logging, EngineConfig};
use std::path::Path;
use uuid::Uuid;

const USAGE: &str = "usage: purchase-advisor <config.json|-> <request.json> <snapshot.json|snapshot.csv>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match std::env::var("PURCHASE_ADVISOR_LOG_FORMAT").as_deref() {
        Ok("json") => logging::init_json(),
        _ => logging::init(),
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [config_arg, request_arg, snapshot_arg] = args.as_slice() else {
        bail!(USAGE);
    };

    tracing::info!(version = purchase_advisor::VERSION, "采购建议引擎启动");

    let config = if config_arg == "-" {
        EngineConfig::default()
    } else {
        EngineConfig::from_json_file(Path::new(config_arg))
            .with_context(|| format!("无法加载配置: {}", config_arg))?
    };

    let raw_request = tokio::fs::read_to_string(request_arg)
        .await
        .with_context(|| format!("无法读取请求文件: {}", request_arg))?;
    let request = RunRequest::from_json_str(&raw_request).context("请求不合法")?;

    let provider = provider_for_path(snapshot_arg)?;
    let candidates = provider
        .load(&request.supplier_id)
        .await
        .with_context(|| format!("无法加载候选快照: {}", snapshot_arg))?;

    let ctx = RunContext::new(request.reference_time.unwrap_or_else(Utc::now))
        .with_run_id(request.run_id.unwrap_or_else(Uuid::new_v4));

    // 纯计算（含 rayon 并行），放到阻塞线程池执行
    let orchestrator = RunOrchestrator::new(config);
    let result = tokio::task::spawn_blocking(move || {
        orchestrator.run_in(&candidates, &request.goal, &request.constraints, &ctx)
    })
    .await
    .context("运行任务异常退出")??;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
