//! Viewer pieces against an in-process host served over localhost.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tether_core::desktop::{
    FrameCodec, PixelFormat, RawScreenFrame, RenderArea, StreamClient, StreamConfig, ZstdFrameCodec,
};
use tether_core::protocol::{
    FileTransferPayload, InputEvent, MouseButton, PointerKind, ScreenGeometry,
};
use tether_core::{Connection, HostService, RpcServer, TetherError};
use tether_viewer::config::{InputConfig, ViewerConfig};
use tether_viewer::connection::connect_to_host;
use tether_viewer::input::{InputForwarder, LocalEvent};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Host double with a settable screen size that records input.
struct ScreenHost {
    width: AtomicU32,
    height: AtomicU32,
    registered: Mutex<Vec<String>>,
    inputs: Mutex<Vec<InputEvent>>,
}

impl ScreenHost {
    fn new(width: u32, height: u32) -> Arc<Self> {
        Arc::new(Self {
            width: AtomicU32::new(width),
            height: AtomicU32::new(height),
            registered: Mutex::new(Vec::new()),
            inputs: Mutex::new(Vec::new()),
        })
    }

    fn resize(&self, width: u32, height: u32) {
        self.width.store(width, Ordering::SeqCst);
        self.height.store(height, Ordering::SeqCst);
    }

    fn inputs(&self) -> Vec<InputEvent> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostService for ScreenHost {
    async fn register(&self, id: &str) -> Result<(), TetherError> {
        self.registered.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn capture_frame(&self) -> Result<Vec<u8>, TetherError> {
        let (w, h) = (self.width.load(Ordering::SeqCst), self.height.load(Ordering::SeqCst));
        let data = vec![0x40; (w * h * 4) as usize];
        let frame = RawScreenFrame::packed(w, h, PixelFormat::Bgra8, data)?;
        ZstdFrameCodec::default().encode(&frame)
    }

    async fn screen_width(&self) -> Result<u32, TetherError> {
        Ok(self.width.load(Ordering::SeqCst))
    }

    async fn screen_height(&self) -> Result<u32, TetherError> {
        Ok(self.height.load(Ordering::SeqCst))
    }

    async fn send_input(&self, event: InputEvent) -> Result<(), TetherError> {
        self.inputs.lock().unwrap().push(event);
        Ok(())
    }

    async fn push_file(&self, _payload: FileTransferPayload) -> Result<(), TetherError> {
        Ok(())
    }

    async fn pull_file(&self) -> Result<Option<FileTransferPayload>, TetherError> {
        Ok(None)
    }
}

/// Serve `host` as "Server" and return a viewer config pointing at it.
async fn serve(host: Arc<ScreenHost>) -> ViewerConfig {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = RpcServer::new(host, "Server");

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let conn = Connection::new(stream).unwrap();
            let server = server.clone();
            tokio::spawn(async move { server.serve_connection(conn).await });
        }
    });

    let mut config = ViewerConfig::default();
    config.network.host_address = "127.0.0.1".into();
    config.network.port = port;
    config
}

/// Serve `host` to a single viewer. Aborting the returned task drops the
/// link from the host side.
async fn serve_one(host: Arc<ScreenHost>) -> (ViewerConfig, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = RpcServer::new(host, "Server");

    let task = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        server.serve_connection(Connection::new(stream).unwrap()).await;
    });

    let mut config = ViewerConfig::default();
    config.network.port = port;
    (config, task)
}

async fn wait_for_inputs(host: &ScreenHost, count: usize) -> Vec<InputEvent> {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let inputs = host.inputs();
            if inputs.len() >= count {
                return inputs;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("inputs delivered")
}

#[tokio::test]
async fn connect_registers_the_session() {
    let host = ScreenHost::new(64, 36);
    let config = serve(Arc::clone(&host)).await;

    let remote = connect_to_host(&config, "office-pc").await.unwrap();
    assert!(!remote.is_closed());
    assert_eq!(*host.registered.lock().unwrap(), vec!["office-pc".to_string()]);
}

#[tokio::test]
async fn wrong_service_name_is_not_bound() {
    let host = ScreenHost::new(64, 36);
    let mut config = serve(Arc::clone(&host)).await;
    config.network.service_name = "Elsewhere".into();

    let err = connect_to_host(&config, "office-pc").await.unwrap_err();
    assert!(matches!(err, TetherError::NotBound(name) if name == "Elsewhere"));
    assert!(host.registered.lock().unwrap().is_empty());
}

#[tokio::test]
async fn nothing_listening_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut config = ViewerConfig::default();
    config.network.port = port;
    assert!(connect_to_host(&config, "office-pc").await.is_err());
}

#[tokio::test]
async fn forwarded_events_keep_order_and_follow_host_resizes() {
    let host = ScreenHost::new(1920, 1080);
    let config = serve(Arc::clone(&host)).await;
    let remote: Arc<dyn HostService> = connect_to_host(&config, "office-pc").await.unwrap();

    let area = RenderArea::new(ScreenGeometry::new(800, 450));
    let (forwarder, _task) = InputForwarder::spawn(remote, area, InputConfig::default());

    forwarder
        .submit(LocalEvent::Click {
            x: 400,
            y: 225,
            button: MouseButton::Left,
        })
        .await
        .unwrap();
    forwarder.submit(LocalEvent::KeyDown(65)).await.unwrap();
    forwarder.submit(LocalEvent::KeyUp(65)).await.unwrap();

    assert_eq!(
        wait_for_inputs(&host, 3).await,
        vec![
            InputEvent::pointer(PointerKind::Click, 960, 540, MouseButton::Left),
            InputEvent::key_press(65),
            InputEvent::key_release(65),
        ]
    );

    host.resize(800, 450);
    forwarder.submit(LocalEvent::Move { x: 100, y: 100 }).await.unwrap();
    assert_eq!(
        wait_for_inputs(&host, 4).await[3],
        InputEvent::pointer(PointerKind::Move, 100, 100, MouseButton::None)
    );
}

#[tokio::test]
async fn disabled_mouse_capture_drops_pointer_events() {
    let host = ScreenHost::new(1920, 1080);
    let config = serve(Arc::clone(&host)).await;
    let remote: Arc<dyn HostService> = connect_to_host(&config, "office-pc").await.unwrap();

    let input = InputConfig {
        capture_mouse: false,
        capture_keyboard: true,
    };
    let area = RenderArea::new(ScreenGeometry::new(800, 450));
    let (forwarder, _task) = InputForwarder::spawn(remote, area, input);

    forwarder.submit(LocalEvent::Move { x: 1, y: 1 }).await.unwrap();
    forwarder.submit(LocalEvent::KeyDown(13)).await.unwrap();

    assert_eq!(wait_for_inputs(&host, 1).await, vec![InputEvent::key_press(13)]);
}

#[tokio::test]
async fn stream_shows_the_host_screen_fitted_to_the_area() {
    let host = ScreenHost::new(320, 180);
    let config = serve(Arc::clone(&host)).await;
    let remote: Arc<dyn HostService> = connect_to_host(&config, "office-pc").await.unwrap();

    let stream = Arc::new(StreamClient::new(
        remote,
        Arc::new(ZstdFrameCodec::default()),
        RenderArea::new(ScreenGeometry::new(160, 160)),
        StreamConfig { max_fps: 50 },
    ));
    let mut frames = stream.frame_receiver();
    let cancel = CancellationToken::new();
    let task = {
        let stream = Arc::clone(&stream);
        let cancel = cancel.clone();
        tokio::spawn(async move { stream.run(cancel).await })
    };

    tokio::time::timeout(Duration::from_secs(5), frames.changed())
        .await
        .unwrap()
        .unwrap();
    let frame = frames.borrow().clone().unwrap();
    assert_eq!(frame.source, ScreenGeometry::new(320, 180));
    assert_eq!(frame.frame.geometry(), ScreenGeometry::new(160, 90));

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn handshake_with_a_silent_host_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    // Accepts the socket and never answers, like a host busy with another viewer.
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let mut config = ViewerConfig::default();
    config.network.port = port;
    config.network.timeout_ms = 300;

    let result = tokio::time::timeout(Duration::from_secs(5), connect_to_host(&config, "office-pc"))
        .await
        .expect("handshake bounded by the connect timeout");
    match result {
        Err(TetherError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::TimedOut),
        other => panic!("expected a timeout, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn stream_keeps_running_after_the_host_drops() {
    let host = ScreenHost::new(64, 36);
    let (config, serving) = serve_one(Arc::clone(&host)).await;
    let remote = connect_to_host(&config, "office-pc").await.unwrap();
    let service: Arc<dyn HostService> = remote.clone();

    let stream = Arc::new(StreamClient::new(
        service,
        Arc::new(ZstdFrameCodec::default()),
        RenderArea::new(ScreenGeometry::new(64, 36)),
        StreamConfig { max_fps: 100 },
    ));
    let mut frames = stream.frame_receiver();
    let stats = stream.stats_receiver();
    let cancel = CancellationToken::new();
    let task = {
        let stream = Arc::clone(&stream);
        let cancel = cancel.clone();
        tokio::spawn(async move { stream.run(cancel).await })
    };

    tokio::time::timeout(Duration::from_secs(5), frames.changed())
        .await
        .unwrap()
        .unwrap();
    serving.abort();

    let wait_for_failures = |at_least: u64| {
        let stats = stats.clone();
        async move {
            tokio::time::timeout(Duration::from_secs(5), async {
                loop {
                    let failures = stats.borrow().failures;
                    if failures >= at_least {
                        return failures;
                    }
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            })
            .await
            .expect("stream still running")
        }
    };

    let first = wait_for_failures(1).await;
    assert!(remote.is_closed());
    let later = wait_for_failures(first + 5).await;
    assert!(later > first);
    assert!(!task.is_finished());

    let shown = frames.borrow().clone().expect("last frame stays published");
    assert_eq!(shown.source, ScreenGeometry::new(64, 36));

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("stream stops on cancel")
        .unwrap();
}
