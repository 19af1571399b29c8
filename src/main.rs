use anyhow::Result;
use clap::Parser;

use plotd::cli::Cli;
use plotd::config::Config;
use plotd::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut cfg = Config::load();
    if let Some(port) = args.port {
        cfg.set("PORT", port.to_string());
    }
    if let Some(host) = args.host {
        cfg.set("HOST", host);
    }
    if let Some(path) = args.log_file {
        cfg.set("LOG_FILE", path.display().to_string());
    }

    // Guard flushes the file log on drop; keep it for the whole run.
    let _guard = logging::init(&cfg.log_file())?;

    plotd::start_server(cfg).await
}
