use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "wl", about = concat!("worklog v", env!("CARGO_PKG_VERSION"), " - record, browse and edit units of work"), version)]
pub struct Cli {
    /// SQLite database file (overrides [store] path)
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Config file (default: <config dir>/worklog/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Post an LLM summary of recent activities through the webhook at startup
    #[arg(long)]
    pub summarize: bool,

    /// Log file (overrides [log] file)
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
