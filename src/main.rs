use callrelay::calls::SignalRouter;
use callrelay::config::ServerConfig;
use callrelay::directory::ChannelDirectory;
use callrelay::server::RelayServer;
use callrelay::store::{CallLogStore, ConversationStore, FileStore, MemoryStore};
use chrono::Local;
use clap::Parser;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

// Call signaling relay.
//
// Usage:
//   cargo run                                        # file-backed, 127.0.0.1:8088
//   cargo run -- --in-memory                         # nothing written to disk
//   cargo run -- --listen 0.0.0.0:9000 --data-dir /var/lib/callrelay
//   cargo run -- --stale-call-ttl-secs 300           # log abandoned calls as missed
//
// Clients connect to ws://<listen>/?tenant=<tenant>&user=<handle>.

fn main() {
    let config = ServerConfig::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{:<5}] [{}] - {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to build tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(config)) {
        error!("Relay stopped: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let (conversations, call_log): (Arc<dyn ConversationStore>, Arc<dyn CallLogStore>) =
        if config.in_memory {
            info!("Using in-memory store; call logs will not survive a restart.");
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        } else {
            let store = Arc::new(FileStore::new(&config.data_dir).await?);
            info!("File store initialized at {}", config.data_dir.display());
            (store.clone(), store)
        };

    let directory = Arc::new(ChannelDirectory::new());
    let router = SignalRouter::new(directory.clone(), conversations, call_log);

    if let Some(ttl) = config.stale_call_ttl() {
        router.clone().run_stale_sweeper(
            Duration::from_secs(config.sweep_interval_secs),
            ttl,
        );
    }

    let listener = TcpListener::bind(config.listen).await?;
    let server = RelayServer::new(router, directory);

    tokio::select! {
        result = server.serve(listener) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down.");
            Ok(())
        }
    }
}
