//! Tether viewer: entry point.
//!
//! ```text
//! tether-viewer                     Connect with defaults, prompt for the session id
//! tether-viewer --host <addr>       Host address (overrides config)
//! tether-viewer --id <name>         Session id to register with
//! tether-viewer --config <path>     Use custom config TOML
//! tether-viewer --gen-config        Dump default config and exit
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tether_core::desktop::{RenderArea, StreamClient, ZstdFrameCodec};
use tether_core::protocol::ScreenGeometry;
use tether_core::HostService;

use tether_viewer::config::ViewerConfig;
use tether_viewer::connection::connect_to_host;
use tether_viewer::console::{self, ConsoleCommand};
use tether_viewer::display::{HeadlessRenderer, run_renderer};
use tether_viewer::input::{InputForwarder, LocalEvent};
use tether_viewer::transfer::{receive_file, send_file};

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "tether-viewer", about = "Tether remote desktop viewer")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "tether-viewer.toml")]
    config: PathBuf,

    /// Host address (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Host port (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Session identifier to register with.
    #[arg(short, long)]
    id: Option<String>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&ViewerConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let mut config = ViewerConfig::load(&cli.config);
    if let Some(host) = cli.host {
        config.network.host_address = host;
    }
    if let Some(port) = cli.port {
        config.network.port = port;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("tether-viewer v{}", env!("CARGO_PKG_VERSION"));

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let id = match cli.id {
        Some(id) => id,
        None => prompt(&mut stdin, "Session identifier: ").await?,
    };

    // ── 1. Connect and register ─────────────────────────────────

    let host = match connect_to_host(&config, &id).await {
        Ok(host) => host,
        Err(e) => {
            eprintln!("Could not connect to {}: {e}", config.connection_info());
            std::process::exit(1);
        }
    };
    let service: Arc<dyn HostService> = host.clone();
    println!("Connected to {} as \"{id}\". Type `help` for commands.", host.peer_addr());

    // ── 2. Frame stream, renderer, input ────────────────────────

    let cancel = CancellationToken::new();
    let area = RenderArea::new(config.initial_area());

    let stream = Arc::new(StreamClient::new(
        Arc::clone(&service),
        Arc::new(ZstdFrameCodec::default()),
        area.clone(),
        config.stream_config(),
    ));
    let stats_rx = stream.stats_receiver();
    let renderer_task = tokio::spawn(run_renderer(
        stream.frame_receiver(),
        HeadlessRenderer::default(),
        cancel.clone(),
    ));
    let stream_task = {
        let stream = Arc::clone(&stream);
        let cancel = cancel.clone();
        tokio::spawn(async move { stream.run(cancel).await })
    };

    let (forwarder, forwarder_task) =
        InputForwarder::spawn(Arc::clone(&service), area.clone(), config.input.clone());

    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        on_ctrl_c.cancel();
    });

    // ── 3. Console loop ─────────────────────────────────────────

    // No reconnection: once the link drops, calls fail and the stream
    // keeps counting failures until the operator quits.
    let mut link_check = tokio::time::interval(Duration::from_secs(1));
    let mut link_lost_reported = false;
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            _ = link_check.tick(), if !link_lost_reported => {
                if host.is_closed() {
                    error!("host connection lost");
                    println!("Host connection lost; further calls will fail. Type `quit` to exit.");
                    link_lost_reported = true;
                }
                continue;
            }
            line = stdin.next_line() => line?,
        };
        let Some(line) = line else { break };

        let command = match console::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match command {
            ConsoleCommand::Send(path) => {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    match send_file(service.as_ref(), &path).await {
                        Ok(name) => println!("Sent {name}"),
                        Err(e) => println!("Sending {} failed: {e}", path.display()),
                    }
                });
            }
            ConsoleCommand::Receive => {
                let service = Arc::clone(&service);
                let dir = config.files.directory.clone();
                tokio::spawn(async move {
                    match receive_file(service.as_ref(), &dir).await {
                        Ok(Some(path)) => println!("Saved {}", path.display()),
                        Ok(None) => println!("Host cancelled the file selection"),
                        Err(e) => println!("Receiving a file failed: {e}"),
                    }
                });
            }
            ConsoleCommand::Resize { width, height } => {
                area.set(ScreenGeometry::new(width, height));
                println!("Drawable area is now {width}x{height}");
            }
            ConsoleCommand::Input(event) => forwarder.submit(event).await?,
            ConsoleCommand::KeyTap(code) => {
                forwarder.submit(LocalEvent::KeyDown(code)).await?;
                forwarder.submit(LocalEvent::KeyUp(code)).await?;
            }
            ConsoleCommand::Stats => {
                let stats = stats_rx.borrow().clone();
                println!(
                    "{:.1} fps, {} frames, {} bytes, {} empty, {} failed, host {}",
                    stats.fps,
                    stats.total_frames,
                    stats.total_bytes,
                    stats.empty_frames,
                    stats.failures,
                    stats.source
                );
            }
            ConsoleCommand::Help => println!("{}", console::HELP),
            ConsoleCommand::Quit => break,
        }
    }

    // ── 4. Shutdown ─────────────────────────────────────────────

    info!("shutting down");
    cancel.cancel();
    drop(forwarder);
    let _ = stream_task.await;
    let _ = forwarder_task.await;
    if let Ok(renderer) = renderer_task.await {
        info!(frames = renderer.frames(), "Renderer stopped");
    }

    // A pending stdin read would otherwise hold the runtime open.
    std::process::exit(0)
}

/// Print `label` and read one non-empty line from the terminal.
async fn prompt<R>(
    lines: &mut tokio::io::Lines<R>,
    label: &str,
) -> Result<String, std::io::Error>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(label.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "no session identifier given",
            ));
        };
        let id = line.trim();
        if !id.is_empty() {
            return Ok(id.to_string());
        }
    }
}
