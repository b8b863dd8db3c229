use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use uuid::Uuid;

use clipdeck::kernel::request::TrimRequest;
use clipdeck::outputs::download::{self, DownloadError, DOWNLOAD_FILE_NAME};
use clipdeck::services::trim::{ServiceFailure, TrimService};
use clipdeck::{ClipdeckConfig, HttpTrimService, OperationState, TrimController, TrimError};

const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// Accepts one connection, captures the raw request and answers with the given
/// status line and body.
async fn serve_once(status_line: &'static str, body: &'static [u8]) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let head = format!(
            "HTTP/1.1 {}\r\nContent-Type: audio/mpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status_line,
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(body).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{}/download-and-trim", addr), server)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).into_owned();
        if let Some(split) = text.find("\r\n\r\n") {
            let content_length = text[..split]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            if buf.len() >= split + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn config_for(endpoint: String) -> ClipdeckConfig {
    ClipdeckConfig { endpoint, timeout: Duration::from_secs(5), ..ClipdeckConfig::default() }
}

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("clipdeck-test-{}", Uuid::new_v4()))
}

fn request() -> TrimRequest {
    TrimRequest { source_url: URL.to_string(), start_seconds: 5, end_seconds: 10 }
}

#[tokio::test]
async fn test_posts_json_payload_with_content_type() {
    let (endpoint, server) = serve_once("200 OK", b"ID3audio").await;
    let service = HttpTrimService::new(&config_for(endpoint));

    let body = service.trim(&request()).await.expect("2xx is success");
    assert_eq!(body, b"ID3audio");

    let raw = server.await.unwrap();
    let (head, payload) = raw.split_once("\r\n\r\n").expect("complete request");
    assert!(head.starts_with("POST /download-and-trim HTTP/1.1"), "unexpected request line: {head}");
    assert!(
        head.lines().any(|l| l.eq_ignore_ascii_case("content-type: application/json")),
        "missing JSON content type: {head}"
    );

    let json: serde_json::Value = serde_json::from_str(payload).unwrap();
    assert_eq!(json, serde_json::json!({ "videoUrl": URL, "startTime": 5, "endTime": 10 }));
}

#[tokio::test]
async fn test_non_success_status_is_a_service_failure() {
    let (endpoint, server) = serve_once("500 Internal Server Error", b"yt-dlp exploded").await;
    let service = HttpTrimService::new(&config_for(endpoint));

    assert_eq!(service.trim(&request()).await, Err(ServiceFailure::Status(500)));
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_endpoint_is_a_transport_failure() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let service = HttpTrimService::new(&config_for(format!("http://{}/download-and-trim", addr)));
    assert!(matches!(service.trim(&request()).await, Err(ServiceFailure::Transport(_))));
}

#[tokio::test]
async fn test_slow_service_times_out_as_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let _ = read_request(&mut socket).await;
        tokio::time::sleep(Duration::from_secs(2)).await;
    });

    let config = ClipdeckConfig {
        endpoint: format!("http://{}/download-and-trim", addr),
        timeout: Duration::from_millis(200),
        ..ClipdeckConfig::default()
    };
    let service = HttpTrimService::new(&config);

    assert!(matches!(service.trim(&request()).await, Err(ServiceFailure::Transport(_))));
    server.abort();
}

#[tokio::test]
async fn test_end_to_end_trim_and_save() {
    let (endpoint, server) = serve_once("200 OK", b"\xFF\xFBmp3-frames").await;
    let controller = TrimController::new(HttpTrimService::new(&config_for(endpoint)));
    let dir = scratch_dir();

    let handle = controller.submit(URL, "0:05", "0:10").await.expect("trim succeeds");
    assert_eq!(controller.state(), OperationState::Succeeded(handle.clone()));

    let path = download::retrieve(&controller, &dir).await.expect("save succeeds");
    assert_eq!(path, dir.join(DOWNLOAD_FILE_NAME));
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"\xFF\xFBmp3-frames");

    server.await.unwrap();
    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn test_retrieve_without_link_is_refused() {
    let (endpoint, server) = serve_once("503 Service Unavailable", b"").await;
    let controller = TrimController::new(HttpTrimService::new(&config_for(endpoint)));
    let dir = scratch_dir();

    assert_eq!(
        controller.submit(URL, "0:05", "0:10").await,
        Err(TrimError::ServiceError { status: 503 })
    );
    assert!(matches!(
        download::retrieve(&controller, &dir).await,
        Err(DownloadError::NotAvailable)
    ));
    assert!(!dir.exists(), "nothing is written without a link");

    server.await.unwrap();
}
