use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "plotd", about = "Chart rendering HTTP service", version)]
pub struct Cli {
    /// Port to listen on (overrides the PORT config key).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind (overrides the HOST config key).
    #[arg(long)]
    pub host: Option<String>,

    /// Request log file (overrides the LOG_FILE config key).
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}
