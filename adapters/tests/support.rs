#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{FixedOffset, TimeZone};
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use freshness::{
    Engine, EngineConfig, EngineHandle, ManualClock, Partition, Presenter, RefetchError,
    Refetcher,
};

#[derive(Default)]
pub struct CountingRefetcher {
    pub calls: Mutex<Vec<Partition>>,
}

#[async_trait]
impl Refetcher for CountingRefetcher {
    async fn refetch(&self, partition: Partition) -> Result<(), RefetchError> {
        self.calls.lock().push(partition);
        Ok(())
    }
}

#[derive(Default)]
pub struct VersionPrompts {
    pub versions: Mutex<Vec<String>>,
}

impl Presenter for VersionPrompts {
    fn version_changed(&self, version: &str) {
        self.versions.lock().push(version.to_string());
    }
}

pub struct TestEngine {
    pub handle: EngineHandle,
    pub refetcher: Arc<CountingRefetcher>,
    pub prompts: Arc<VersionPrompts>,
}

/// An engine at 09:00 local with baseline version `1.0` and no initial fetch.
pub fn spawn_engine() -> TestEngine {
    let refetcher = Arc::new(CountingRefetcher::default());
    let prompts = Arc::new(VersionPrompts::default());
    let clock = ManualClock::new(
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 2, 9, 0, 0)
            .unwrap(),
    );

    let cfg = EngineConfig {
        baseline_version: "1.0".into(),
        initial_fetch: false,
        ..EngineConfig::default()
    };
    let (engine, handle) = Engine::new(cfg, refetcher.clone(), prompts.clone(), Arc::new(clock));
    tokio::spawn(engine.run());

    TestEngine {
        handle,
        refetcher,
        prompts,
    }
}

/// Minimal HTTP/1.1 server: answers every request with whatever `respond`
/// returns for its request target, then closes the connection.
pub struct CannedServer {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<String>>>,
}

pub async fn canned_server<F>(respond: F) -> CannedServer
where
    F: Fn(&str) -> (u16, &'static str, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);

    let seen = requests.clone();
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            let seen = seen.clone();
            let respond = respond.clone();
            tokio::spawn(async move {
                serve_one(socket, seen, respond.as_ref()).await;
            });
        }
    });

    CannedServer {
        base_url: format!("http://{addr}"),
        requests,
    }
}

async fn serve_one<F>(mut socket: TcpStream, seen: Arc<Mutex<Vec<String>>>, respond: &F)
where
    F: Fn(&str) -> (u16, &'static str, String),
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&buf).to_string();
    let target = head
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    seen.lock().push(head);

    let (status, content_type, body) = respond(&target);
    let reply = format!(
        "HTTP/1.1 {status} X\r\nContent-Type: {content_type}\r\nConnection: close\r\n\r\n{body}"
    );
    let _ = socket.write_all(reply.as_bytes()).await;
    let _ = socket.shutdown().await;
}
