//! Tether host: entry point.
//!
//! ```text
//! tether-host                     Run in the foreground, prompt for the session id
//! tether-host --id <name>         Use <name> as the session id
//! tether-host --config <path>     Load a custom config TOML
//! tether-host --gen-config        Write default config to stdout
//! tether-host --init-config       Write default config to the --config path
//! ```

use std::io::{BufRead, Write};
use std::net::{IpAddr, UdpSocket};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tether_core::desktop::{CaptureService, InputRelay, LogInjector, SyntheticCapture, ZstdFrameCodec};
use tether_core::{RpcServer, Session};
use tether_host::config::HostConfig;
use tether_host::picker::TerminalPicker;
use tether_host::service::{HostServer, SharingService};

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "tether-host", about = "Tether desktop sharing host")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "tether-host.toml")]
    config: PathBuf,

    /// Session identifier viewers must register with.
    #[arg(short, long)]
    id: Option<String>,

    /// Override the listening port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,

    /// Write the default configuration to the config path and exit.
    #[arg(long)]
    init_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&HostConfig::default())?;
        println!("{text}");
        return Ok(());
    }
    if cli.init_config {
        HostConfig::write_default(&cli.config)?;
        println!("Default configuration written to {}", cli.config.display());
        return Ok(());
    }

    let mut config = HostConfig::load(&cli.config);
    if let Some(port) = cli.port {
        config.network.port = port;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let id = match cli.id {
        Some(id) => id,
        None => prompt_identity()?,
    };

    info!("tether-host v{}", env!("CARGO_PKG_VERSION"));
    info!("session: {id}");
    info!("screen: {}", config.screen_geometry());
    info!("files: {}", config.files.directory.display());

    let session = Arc::new(Session::new(id));
    let capture = CaptureService::new(
        session,
        SyntheticCapture::new(config.screen_geometry()),
        Arc::new(ZstdFrameCodec::new(config.compression_level())),
    );
    let service = SharingService::new(
        capture,
        InputRelay::new(LogInjector),
        config.files.directory.clone(),
        Arc::new(TerminalPicker),
    );
    let rpc = RpcServer::new(Arc::new(service), config.network.service_name.as_str());

    let server = HostServer::bind(&config.listen_address(), rpc).await?;
    let port = server.local_addr()?.port();
    println!(
        "Host ready at {}:{port} (service \"{}\")",
        reachable_address(),
        config.network.service_name
    );

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Ctrl-C received; shutting down");
        on_ctrl_c.cancel();
    });

    server.run(cancel).await;
    Ok(())
}

/// Ask the operator for the session identifier.
fn prompt_identity() -> std::io::Result<String> {
    let stdin = std::io::stdin();
    loop {
        print!("Session identifier: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "no session identifier given",
            ));
        }
        let id = line.trim();
        if !id.is_empty() {
            return Ok(id.to_string());
        }
    }
}

/// The address other machines can most likely reach this host on.
///
/// Connecting a UDP socket sends nothing; it only resolves the outbound
/// interface.
fn reachable_address() -> IpAddr {
    UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::from([127, 0, 0, 1]))
}
