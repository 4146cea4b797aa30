use chrono::TimeDelta;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Upper bound for `--stale-call-ttl-secs`: one year.
pub const MAX_STALE_CALL_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Call signaling relay server.
#[derive(Clone, Debug, Parser)]
#[command(name = "callrelay", version, about)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    #[arg(long, default_value = "127.0.0.1:8088")]
    pub listen: SocketAddr,

    /// Directory holding conversations and call logs.
    #[arg(long, default_value = "./callrelay-data")]
    pub data_dir: PathBuf,

    /// Keep conversations and call logs in memory only.
    #[arg(long)]
    pub in_memory: bool,

    /// Log calls still live after this many seconds as missed and forget
    /// them. Calls are kept until a terminal signal arrives when unset.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=MAX_STALE_CALL_TTL_SECS))]
    pub stale_call_ttl_secs: Option<u64>,

    /// How often the stale-call sweep runs.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub sweep_interval_secs: u64,
}

impl ServerConfig {
    /// Age after which a live call is swept, if sweeping is enabled and the
    /// configured value is representable.
    pub fn stale_call_ttl(&self) -> Option<TimeDelta> {
        let secs = i64::try_from(self.stale_call_ttl_secs?).ok()?;
        TimeDelta::try_seconds(secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8088)),
            data_dir: PathBuf::from("./callrelay-data"),
            in_memory: false,
            stale_call_ttl_secs: None,
            sweep_interval_secs: 30,
        }
    }
}
