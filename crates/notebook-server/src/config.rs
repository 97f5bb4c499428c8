use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Log filter used when neither `--log` nor `RUST_LOG` is set. Request spans
/// and responses from the trace layer are emitted at debug.
pub const DEFAULT_LOG_FILTER: &str = "notebook_server=info,notebook_sqlite=info,tower_http=debug";

/// Server settings, from flags or the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "notebook-server", about = "HTTP API for notes and tags", version)]
pub struct ServerConfig {
    /// Path to the SQLite database file
    #[arg(long, env = "NOTEBOOK_DB", default_value = "notes.db")]
    pub db: PathBuf,

    /// Address to listen on
    #[arg(long, env = "NOTEBOOK_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "NOTEBOOK_PORT", default_value_t = 4000)]
    pub port: u16,

    /// Log filter (overrides RUST_LOG), e.g. "notebook_server=debug"
    #[arg(long, env = "NOTEBOOK_LOG")]
    pub log: Option<String>,
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
