use std::time::Duration;

use adapters::{HttpRefetcher, HttpVersionClient, PollError, PushChannel, SseClient, VersionSource};
use freshness::metrics::Counters;
use freshness::{Partition, RefetchError, Refetcher};

mod support;
use support::{canned_server, spawn_engine};

async fn wait_for<F: Fn() -> bool>(cond: F) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

#[tokio::test]
async fn refetcher_requests_the_partition_fragment() {
    let server = canned_server(|_| (200, "text/html", "<table></table>".into())).await;
    let refetcher = HttpRefetcher::new(&server.base_url).unwrap();

    refetcher.refetch(Partition::Next).await.unwrap();

    let requests = server.requests.lock().clone();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("GET /partials/prices?date=tomorrow HTTP/1.1"));
}

#[tokio::test]
async fn refetcher_maps_http_failures() {
    let server = canned_server(|target| {
        if target.ends_with("today") {
            (404, "text/plain", "no data".into())
        } else {
            (503, "text/plain", "busy".into())
        }
    })
    .await;
    let refetcher = HttpRefetcher::new(&server.base_url).unwrap();

    assert_eq!(
        refetcher.refetch(Partition::Current).await,
        Err(RefetchError::TargetMissing(Partition::Current))
    );
    assert!(matches!(
        refetcher.refetch(Partition::Next).await,
        Err(RefetchError::Failed {
            partition: Partition::Next,
            ..
        })
    ));
}

#[tokio::test]
async fn version_client_reads_the_version_field() {
    let server = canned_server(|target| match target {
        "/version" => (200, "application/json", r#"{"version":"3.1.4"}"#.into()),
        _ => (404, "text/plain", String::new()),
    })
    .await;

    let client = HttpVersionClient::new(&server.base_url).unwrap();
    assert_eq!(client.fetch_version().await.unwrap(), "3.1.4");
}

#[tokio::test]
async fn version_client_rejects_empty_version() {
    let server = canned_server(|_| (200, "application/json", r#"{"version":""}"#.into())).await;

    let client = HttpVersionClient::new(&server.base_url).unwrap();
    assert!(matches!(
        client.fetch_version().await,
        Err(PollError::InvalidResponse)
    ));
}

#[tokio::test]
async fn sse_stream_forwards_events_until_server_closes() {
    let body = concat!(
        ": hello\n\n",
        "data: {\"type\":\"version\",\"version\":\"1.0\"}\n\n",
        "data: {\"type\":\"tomorrow_updated\",\"reason\":\"published\"}\n\n",
        "data: garbage\n\n",
    );
    let server = canned_server(move |_| (200, "text/event-stream", body.to_string())).await;
    let engine = spawn_engine();

    let client = SseClient::new(&server.base_url).unwrap();
    client.stream(&engine.handle).await.unwrap();

    let head = server.requests.lock()[0].to_ascii_lowercase();
    assert!(head.starts_with("get /events/version"));
    assert!(head.contains("accept: text/event-stream"));

    wait_for(|| engine.refetcher.calls.lock().len() == 1).await;
    assert_eq!(engine.refetcher.calls.lock()[0], Partition::Next);
    assert_eq!(Counters::read(&engine.handle.counters().push_ignored), 1);
    assert!(engine.prompts.versions.lock().is_empty());
}

#[tokio::test]
async fn sse_stream_reports_http_errors() {
    let server = canned_server(|_| (500, "text/plain", "down".into())).await;
    let engine = spawn_engine();

    let client = SseClient::new(&server.base_url).unwrap();
    let err = client.stream(&engine.handle).await.unwrap_err();
    assert!(matches!(err, adapters::PushError::Http(_)));
}
