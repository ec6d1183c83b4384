use std::{
    collections::HashMap,
    process::{Command, Output},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};

const INVOKE: &str = env!("CARGO_BIN_EXE_invoke");

async fn ask_handler(
    State(hits): State<Arc<AtomicUsize>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    hits.fetch_add(1, Ordering::SeqCst);
    match params.get("q").map(String::as_str) {
        Some("quota") => (
            StatusCode::TOO_MANY_REQUESTS,
            "Error: API quota exceeded or rate limit".to_string(),
        ),
        Some(q) => (StatusCode::OK, format!("answer:{q}")),
        None => (StatusCode::BAD_REQUEST, "missing".to_string()),
    }
}

async fn spawn_relay() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/ask", get(ask_handler))
        .with_state(Arc::clone(&hits));
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), hits)
}

/// Runs the binary off the runtime so the mock relay keeps serving.
async fn invoke<I, S>(relay_url: &str, args: I) -> Output
where
    I: IntoIterator<Item = S> + Send + 'static,
    S: AsRef<std::ffi::OsStr> + Send + 'static,
{
    let relay_url = relay_url.to_string();
    tokio::task::spawn_blocking(move || {
        Command::new(INVOKE)
            .args(args)
            .env("RELAY_URL", relay_url)
            .env("NO_COLOR", "1")
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[tokio::test(flavor = "multi_thread")]
async fn no_arguments_prints_usage_and_exits_1() {
    let (url, hits) = spawn_relay().await;

    let out = invoke(&url, Vec::<String>::new()).await;

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(text(&out.stdout).trim_end(), "Usage: invoke \"your question\"");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn answer_goes_to_stdout() {
    let (url, hits) = spawn_relay().await;

    let out = invoke(&url, ["fizzbuzz in java"]).await;

    assert_eq!(out.status.code(), Some(0));
    assert_eq!(text(&out.stdout), "answer:fizzbuzz in java\n");
    assert!(out.stderr.is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn server_error_is_reported_but_exit_code_stays_0() {
    let (url, hits) = spawn_relay().await;

    let out = invoke(&url, ["quota"]).await;

    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());
    let stderr = text(&out.stderr);
    assert!(
        stderr.contains("Server responded with status code 429"),
        "{stderr}"
    );
    assert!(stderr.contains("Error: API quota exceeded or rate limit"), "{stderr}");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_relay_exits_0_with_error_line() {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let out = invoke(&url, ["hi"]).await;

    assert_eq!(out.status.code(), Some(0));
    assert!(text(&out.stderr).starts_with("Error: "));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn non_utf8_argument_is_sent_lossily() {
    use std::{ffi::OsString, os::unix::ffi::OsStringExt};

    let (url, hits) = spawn_relay().await;

    let out = invoke(&url, [OsString::from_vec(b"caf\xe9".to_vec())]).await;

    assert_eq!(out.status.code(), Some(0));
    assert_eq!(text(&out.stdout), "answer:caf\u{fffd}\n");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
