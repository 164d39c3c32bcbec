//! Integration tests: connection lifecycle, calls through `RemoteHost`
//! and `RpcServer`, and failure scenarios over a real TCP connection on
//! localhost.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tether_core::network::HEARTBEAT_INTERVAL;
use tether_core::protocol::{FileTransferPayload, InputEvent, MouseButton, PointerKind};
use tether_core::{
    Command, Connection, ConnectionInfo, HostService, Packet, ProtocolFlags, RemoteHost,
    RpcServer, TetherError,
};
use tokio::net::TcpListener;

// ── Helpers ──────────────────────────────────────────────────────

/// Spin up a listener on an OS-assigned port and return the connection
/// info. The listener is returned so the caller can accept on it.
async fn ephemeral_listener() -> (TcpListener, ConnectionInfo) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let info = ConnectionInfo::new(addr.ip().to_string(), addr.port());
    (listener, info)
}

/// Receive the next non-heartbeat packet.
async fn recv_skip_heartbeat(conn: &mut Connection) -> Option<Packet> {
    loop {
        let pkt = conn.recv().await?;
        if !pkt.is_heartbeat() {
            return Some(pkt);
        }
    }
}

/// Host double that records what it was asked to do.
#[derive(Default)]
struct FakeHost {
    registered: Mutex<Vec<String>>,
    inputs: Mutex<Vec<InputEvent>>,
    pushed: Mutex<Vec<FileTransferPayload>>,
    pull: Mutex<Option<FileTransferPayload>>,
    fail_capture: bool,
}

#[async_trait]
impl HostService for FakeHost {
    async fn register(&self, id: &str) -> Result<(), TetherError> {
        self.registered.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn capture_frame(&self) -> Result<Vec<u8>, TetherError> {
        if self.fail_capture {
            return Err(TetherError::Capture("display unavailable".into()));
        }
        Ok(vec![1, 2, 3, 4])
    }

    async fn screen_width(&self) -> Result<u32, TetherError> {
        Ok(1920)
    }

    async fn screen_height(&self) -> Result<u32, TetherError> {
        Ok(1080)
    }

    async fn send_input(&self, event: InputEvent) -> Result<(), TetherError> {
        self.inputs.lock().unwrap().push(event);
        Ok(())
    }

    async fn push_file(&self, payload: FileTransferPayload) -> Result<(), TetherError> {
        self.pushed.lock().unwrap().push(payload);
        Ok(())
    }

    async fn pull_file(&self) -> Result<Option<FileTransferPayload>, TetherError> {
        Ok(self.pull.lock().unwrap().take())
    }
}

/// Serve `host` on an ephemeral port and connect a `RemoteHost` to it.
async fn serve(host: Arc<FakeHost>) -> RemoteHost {
    let (listener, info) = ephemeral_listener().await;
    let server = RpcServer::new(host, "Server");

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        server.serve_connection(Connection::new(stream).unwrap()).await;
    });

    RemoteHost::connect(&info).await.unwrap()
}

// ── Connection lifecycle ─────────────────────────────────────────

#[tokio::test]
async fn test_connection_lifecycle() {
    let (listener, info) = ephemeral_listener().await;

    let viewer_handle = tokio::spawn({
        let info = info.clone();
        async move { Connection::connect(&info).await.unwrap() }
    });

    let (stream, _) = listener.accept().await.unwrap();
    let mut host_conn = Connection::new(stream).unwrap();
    let mut viewer_conn = viewer_handle.await.unwrap();

    let ping = Packet::new_command(1, Command::Ping, Vec::new()).unwrap();
    viewer_conn.send(ping).await.unwrap();

    let pkt = tokio::time::timeout(Duration::from_secs(5), recv_skip_heartbeat(&mut host_conn))
        .await
        .expect("timeout")
        .expect("recv returned None");
    assert_eq!(pkt.request_id(), 1);
    assert_eq!(pkt.command().unwrap(), Command::Ping);

    let pong = Packet::new_response(1, Command::Ping, b"Pong".to_vec()).unwrap();
    host_conn.send(pong).await.unwrap();

    let resp = tokio::time::timeout(Duration::from_secs(5), recv_skip_heartbeat(&mut viewer_conn))
        .await
        .expect("timeout")
        .expect("recv returned None");
    assert_eq!(resp.request_id(), 1);
    assert_eq!(resp.payload(), b"Pong");
}

#[tokio::test]
async fn test_idle_link_carries_heartbeats() {
    let (listener, info) = ephemeral_listener().await;
    let _viewer = tokio::spawn(async move {
        let conn = Connection::connect(&info).await.unwrap();
        tokio::time::sleep(HEARTBEAT_INTERVAL * 3).await;
        drop(conn);
    });

    let (stream, _) = listener.accept().await.unwrap();
    let mut host_conn = Connection::new(stream).unwrap();

    let pkt = tokio::time::timeout(HEARTBEAT_INTERVAL * 2, host_conn.recv())
        .await
        .expect("no heartbeat")
        .expect("recv returned None");
    assert!(pkt.is_heartbeat());
    assert_eq!(pkt.request_id(), 0);
}

#[tokio::test]
async fn test_packets_keep_order() {
    let (listener, info) = ephemeral_listener().await;

    let viewer_handle = tokio::spawn({
        let info = info.clone();
        async move { Connection::connect(&info).await.unwrap() }
    });

    let (stream, _) = listener.accept().await.unwrap();
    let mut host_conn = Connection::new(stream).unwrap();
    let viewer_conn = viewer_handle.await.unwrap();

    for i in 1u64..=5 {
        let cmd = Packet::new_command(i, Command::Ping, Vec::new()).unwrap();
        viewer_conn.send(cmd).await.unwrap();
    }

    for i in 1u64..=5 {
        let pkt = tokio::time::timeout(Duration::from_secs(5), recv_skip_heartbeat(&mut host_conn))
            .await
            .expect("timeout")
            .expect("recv returned None");
        assert_eq!(pkt.request_id(), i);
    }
}

// ── Calls ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_lookup_and_register() {
    let host = Arc::new(FakeHost::default());
    let remote = serve(Arc::clone(&host)).await;

    remote.lookup("Server").await.unwrap();
    remote.register("office-pc").await.unwrap();
    assert_eq!(*host.registered.lock().unwrap(), vec!["office-pc".to_string()]);
}

#[tokio::test]
async fn test_lookup_unknown_name_is_not_bound() {
    let remote = serve(Arc::new(FakeHost::default())).await;

    let err = remote.lookup("Elsewhere").await.unwrap_err();
    assert!(matches!(err, TetherError::NotBound(name) if name == "Elsewhere"));
}

#[tokio::test]
async fn test_geometry_and_capture() {
    let remote = serve(Arc::new(FakeHost::default())).await;

    let geometry = remote.screen_geometry().await.unwrap();
    assert_eq!((geometry.width, geometry.height), (1920, 1080));
    assert_eq!(remote.capture_frame().await.unwrap(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_host_fault_reaches_caller() {
    let host = Arc::new(FakeHost {
        fail_capture: true,
        ..FakeHost::default()
    });
    let remote = serve(host).await;

    let err = remote.capture_frame().await.unwrap_err();
    assert!(matches!(err, TetherError::Remote(ref msg) if msg.contains("display unavailable")));

    // The link survives a fault.
    remote.ping().await.unwrap();
}

#[tokio::test]
async fn test_input_events_arrive_in_order() {
    let host = Arc::new(FakeHost::default());
    let remote = serve(Arc::clone(&host)).await;

    let events = [
        InputEvent::pointer(PointerKind::Move, 10, 10, MouseButton::None),
        InputEvent::pointer(PointerKind::Press, 10, 10, MouseButton::Left),
        InputEvent::pointer(PointerKind::Release, 12, 11, MouseButton::Left),
        InputEvent::key_press(65),
        InputEvent::key_release(65),
    ];
    for event in events {
        remote.send_input(event).await.unwrap();
    }

    assert_eq!(*host.inputs.lock().unwrap(), events.to_vec());
}

#[tokio::test]
async fn test_file_push_and_pull() {
    let host = Arc::new(FakeHost::default());
    let remote = serve(Arc::clone(&host)).await;

    let payload = FileTransferPayload::new(vec![0xDE, 0xAD, 0xBE, 0xEF], "blob.bin");
    remote.push_file(payload.clone()).await.unwrap();
    assert_eq!(*host.pushed.lock().unwrap(), vec![payload.clone()]);

    // Nothing staged: the operator cancelled.
    assert!(remote.pull_file().await.unwrap().is_none());

    *host.pull.lock().unwrap() = Some(payload.clone());
    assert_eq!(remote.pull_file().await.unwrap(), Some(payload));
}

#[tokio::test]
async fn test_concurrent_calls_are_matched() {
    let remote = Arc::new(serve(Arc::new(FakeHost::default())).await);

    let calls: Vec<_> = (0..16)
        .map(|i| {
            let remote = Arc::clone(&remote);
            tokio::spawn(async move {
                if i % 2 == 0 {
                    remote.screen_width().await.unwrap()
                } else {
                    remote.screen_height().await.unwrap()
                }
            })
        })
        .collect();

    for (i, call) in calls.into_iter().enumerate() {
        let expected = if i % 2 == 0 { 1920 } else { 1080 };
        assert_eq!(call.await.unwrap(), expected);
    }
}

// ── Failure scenarios ────────────────────────────────────────────

#[tokio::test]
async fn test_malformed_input_is_dropped_not_fatal() {
    let (listener, info) = ephemeral_listener().await;
    let host = Arc::new(FakeHost::default());
    let server = RpcServer::new(Arc::clone(&host) as Arc<dyn HostService>, "Server");
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        server.serve_connection(Connection::new(stream).unwrap()).await;
    });

    let mut conn = Connection::connect(&info).await.unwrap();
    let junk = Packet::new_command(7, Command::InputEvent, vec![0xFF; 3]).unwrap();
    conn.send(junk).await.unwrap();

    let resp = tokio::time::timeout(Duration::from_secs(5), recv_skip_heartbeat(&mut conn))
        .await
        .expect("timeout")
        .expect("recv returned None");
    assert_eq!(resp.request_id(), 7);
    assert!(!resp.flags().contains(ProtocolFlags::ERROR));
    assert!(host.inputs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_calls_fail_after_host_disconnects() {
    let (listener, info) = ephemeral_listener().await;
    let accept = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        drop(stream);
    });

    let remote = RemoteHost::connect(&info).await.unwrap();
    accept.await.unwrap();

    let err = tokio::time::timeout(Duration::from_secs(5), remote.capture_frame())
        .await
        .expect("call must not hang")
        .unwrap_err();
    assert!(matches!(err, TetherError::Disconnected));
}

#[tokio::test]
async fn test_connect_to_closed_port_fails() {
    let (listener, info) = ephemeral_listener().await;
    drop(listener);
    assert!(RemoteHost::connect(&info).await.is_err());
}
