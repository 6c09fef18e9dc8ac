//! 端到端流程：假摄像头 → 真实 HTTP 传输 → 本地桩服务 → 渲染。

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::RgbImage;
use pixproof::{
    AnalysisError,
    AnalysisResult,
    AnalysisTransport,
    Analyzer,
    CameraDevice,
    CaptureError,
    ClientConfig,
    HttpTransport,
    ImagePayload,
    MediaStream,
    Notifier,
    ResultView,
    RootController,
    render,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct TestCamera {
    live: Arc<AtomicUsize>,
}

struct TestStream {
    live: Arc<AtomicUsize>,
    running: bool,
}

impl CameraDevice for TestCamera {
    fn request_stream(&mut self) -> Result<Box<dyn MediaStream>, CaptureError> {
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TestStream {
            live: Arc::clone(&self.live),
            running: true,
        }))
    }
}

impl MediaStream for TestStream {
    fn dimensions(&self) -> (u32, u32) {
        (40, 30)
    }

    fn grab_frame(&mut self) -> Result<RgbImage, CaptureError> {
        Ok(RgbImage::from_pixel(40, 30, image::Rgb([90, 120, 150])))
    }

    fn active_tracks(&self) -> usize {
        usize::from(self.running)
    }

    fn stop_tracks(&mut self) {
        if self.running {
            self.running = false;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[derive(Default)]
struct CollectingNotifier {
    messages: Mutex<Vec<String>>,
}

impl Notifier for CollectingNotifier {
    fn alert(&self, message: &str) {
        self.messages.lock().expect("lock").push(message.to_string());
    }
}

async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            let read = socket.read(&mut chunk).await.expect("read");
            if read == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..read]);
            if request_complete(&request) {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.expect("write");
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{}/analyze", addr), handle)
}

fn request_complete(request: &[u8]) -> bool {
    let Some(header_end) = request.windows(4).position(|window| window == b"\r\n\r\n") else {
        return false;
    };
    let headers = String::from_utf8_lossy(&request[..header_end]);
    let content_length = headers.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.eq_ignore_ascii_case("content-length")
            .then(|| value.trim().parse::<usize>().ok())
            .flatten()
    });
    match content_length {
        Some(length) => request.len() >= header_end + 4 + length,
        None => request.ends_with(b"0\r\n\r\n"),
    }
}

fn controller_for(endpoint: String) -> (RootController<HttpTransport>, Arc<AtomicUsize>, Arc<CollectingNotifier>) {
    let mut config = ClientConfig::default();
    config.endpoint = endpoint;
    let transport = HttpTransport::new(&config).expect("transport");
    let live = Arc::new(AtomicUsize::new(0));
    let notifier = Arc::new(CollectingNotifier::default());
    let controller = RootController::new(
        &config,
        Box::new(TestCamera { live: Arc::clone(&live) }),
        transport,
        notifier.clone(),
    );
    (controller, live, notifier)
}

#[tokio::test]
async fn captured_frame_is_analyzed_and_rendered() {
    let (endpoint, server) = serve_once(
        "200 OK",
        r#"{"overall_label":"Likely Fake","ensemble_score":0.87654,"scores":[{"sector":"ELA","score":0.9,"reason":"ELA diff analyzed"}]}"#,
    )
    .await;
    let (mut controller, live, _) = controller_for(endpoint);

    controller.open_camera().expect("open");
    assert_eq!(live.load(Ordering::SeqCst), 1);

    let completion = controller.capture_and_analyze().await.expect("capture");
    assert!(completion.applied);
    assert_eq!(live.load(Ordering::SeqCst), 0);

    let view = controller.render_current().expect("verdict rendered");
    assert_eq!(
        view.to_string(),
        "鉴定结论：Likely Fake\n综合得分：0.877\n- ELA  得分：0.900\n  ELA diff analyzed"
    );

    let request = server.await.expect("server");
    assert!(request.starts_with("POST /analyze"));
    assert!(request.contains(r#"name="image""#));
    assert!(request.contains(r#"filename="capture.jpg""#));
    assert!(request.contains("image/jpeg"));
}

#[tokio::test]
async fn service_error_message_replaces_verdict() {
    let (endpoint, server) = serve_once("400 Bad Request", r#"{"error":"No image provided"}"#).await;
    let (mut controller, live, notifier) = controller_for(endpoint);

    controller.open_camera().expect("open");
    controller.capture_and_analyze().await.expect("capture");

    assert_eq!(live.load(Ordering::SeqCst), 0);
    assert_eq!(
        controller.render_current(),
        Some(ResultView::Error {
            message: "No image provided".to_string()
        })
    );
    assert!(!controller.snapshot().in_flight);
    assert!(notifier.messages.lock().expect("lock").is_empty());
    server.await.expect("server");
}

#[tokio::test]
async fn unreachable_service_becomes_visible_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let (mut controller, live, _) = controller_for(format!("http://{}/analyze", addr));
    controller.open_camera().expect("open");
    let completion = controller.capture_and_analyze().await.expect("capture");

    assert!(completion.outcome.is_error());
    assert_eq!(live.load(Ordering::SeqCst), 0);
    assert!(!controller.snapshot().in_flight);
}

/// 由测试控制放行顺序的传输。
struct GatedTransport {
    gates: Mutex<Vec<oneshot::Receiver<Result<AnalysisResult, AnalysisError>>>>,
}

impl AnalysisTransport for GatedTransport {
    fn analyze(&self, _payload: ImagePayload) -> impl Future<Output = Result<AnalysisResult, AnalysisError>> + Send {
        let gate = self.gates.lock().expect("lock").pop();
        async move {
            match gate {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(AnalysisError::Network("gate dropped".to_string()))),
                None => Err(AnalysisError::Network("no gate".to_string())),
            }
        }
    }
}

fn verdict(label: &str) -> AnalysisResult {
    AnalysisResult {
        overall_label: label.to_string(),
        ensemble_score: Some(0.5),
        sector_scores: Vec::new(),
    }
}

#[tokio::test]
async fn newest_submission_wins_regardless_of_arrival_order() {
    let (first_tx, first_rx) = oneshot::channel();
    let (second_tx, second_rx) = oneshot::channel();
    let analyzer = Arc::new(Analyzer::new(GatedTransport {
        gates: Mutex::new(vec![second_rx, first_rx]),
    }));

    let first = tokio::spawn({
        let analyzer = Arc::clone(&analyzer);
        async move { analyzer.submit(ImagePayload::new(vec![1], "image/png", "a.png")).await }
    });
    let mut updates = analyzer.subscribe();
    updates.wait_for(|snapshot| snapshot.generation == 1).await.expect("first begun");

    let second = tokio::spawn({
        let analyzer = Arc::clone(&analyzer);
        async move { analyzer.submit(ImagePayload::new(vec![2], "image/png", "b.png")).await }
    });
    updates.wait_for(|snapshot| snapshot.generation == 2).await.expect("second begun");

    second_tx.send(Ok(verdict("second"))).expect("release second");
    let second = second.await.expect("second task");
    assert!(second.applied);

    first_tx.send(Ok(verdict("first"))).expect("release first");
    let first = first.await.expect("first task");
    assert!(!first.applied);

    let snapshot = analyzer.snapshot();
    assert!(!snapshot.in_flight);
    assert_eq!(snapshot.pending_requests, 0);
    let outcome = snapshot.outcome.expect("outcome");
    match render(&outcome) {
        ResultView::Verdict { label, .. } => assert_eq!(label, "second"),
        other => panic!("unexpected view: {:?}", other),
    }
}
