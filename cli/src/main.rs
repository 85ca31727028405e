pub mod cli;
pub mod commands;
pub mod config;
pub mod presenter;

use std::sync::Arc;

use adapters::{
    HttpRefetcher, HttpVersionClient, PushChannel, SseClient, WsPushClient, run_remote_signals,
};
use anyhow::Context;
use clap::Parser;
use common::init_tracing;
use freshness::{Engine, EngineConfig, EngineHandle, Partition, SystemClock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use cli::{Cli, PushKind};
use commands::{HostCommand, parse_command};
use config::AppConfig;
use presenter::LogPresenter;

fn build_push(cfg: &AppConfig) -> anyhow::Result<Option<Box<dyn PushChannel>>> {
    let channel: Option<Box<dyn PushChannel>> = match cfg.push {
        PushKind::Sse => Some(Box::new(
            SseClient::new(&cfg.base_url).context("build sse client")?,
        )),
        PushKind::Ws => Some(Box::new(WsPushClient::from_base_url(&cfg.base_url))),
        PushKind::None => None,
    };
    Ok(channel)
}

async fn print_status(engine: &EngineHandle) -> anyhow::Result<()> {
    let snap = engine.snapshot().await.context("engine snapshot")?;

    let describe = |p: Partition| match snap.stamp(p) {
        Some(s) => s.fetched_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "never".to_string(),
    };

    println!(
        "date={} current={} next={} in_flight={} debounce_pending={} visibility={:?} version={}",
        snap.last_known_date,
        describe(Partition::Current),
        describe(Partition::Next),
        snap.in_flight,
        snap.debounce_pending,
        snap.visibility,
        snap.baseline_version,
    );
    Ok(())
}

async fn dispatch(engine: &EngineHandle, cmd: HostCommand) -> anyhow::Result<()> {
    match cmd {
        HostCommand::Resume(source) => engine.resume(source).await?,
        HostCommand::Visibility(v) => engine.visibility_changed(v).await?,
        HostCommand::Refresh => engine.manual_refresh().await?,
        HostCommand::Status => print_status(engine).await?,
        HostCommand::Quit => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::from_env().with_cli(&cli);

    init_tracing("freshness", cfg.json_logs);
    info!(base_url = %cfg.base_url, push = ?cfg.push, "starting freshness host");

    let engine_cfg = EngineConfig {
        baseline_version: cfg.app_version.clone(),
        ..EngineConfig::default()
    };

    let refetcher = HttpRefetcher::new(&cfg.base_url).context("build http refetcher")?;
    let (engine, handle) = Engine::new(
        engine_cfg,
        Arc::new(refetcher),
        Arc::new(LogPresenter),
        Arc::new(SystemClock),
    );
    let engine_task = tokio::spawn(engine.run());

    let push = build_push(&cfg)?;
    let version = HttpVersionClient::new(&cfg.base_url).context("build version client")?;
    let remote = tokio::spawn(run_remote_signals(
        push,
        version,
        handle.clone(),
        cfg.poll_every,
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("commands: focus | visible | hidden | refresh | status | quit");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read stdin")? else {
                    info!("stdin closed");
                    break;
                };
                match parse_command(&line) {
                    Some(HostCommand::Quit) => break,
                    Some(cmd) => dispatch(&handle, cmd).await?,
                    None if line.trim().is_empty() => {}
                    None => warn!(input = %line.trim(), "unknown command"),
                }
            }
            res = tokio::signal::ctrl_c() => {
                res.context("listen for ctrl-c")?;
                info!("shutdown signal received");
                break;
            }
        }
    }

    remote.abort();
    let _ = remote.await;
    drop(handle);
    engine_task.await.context("engine task")?;

    Ok(())
}
