use clap::Parser;
use lazydotnet::app::{self, Outcome};
use lazydotnet::core::config;
use lazydotnet::tui::backend;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "lazydotnet", about = "Terminal event viewer gated on a working .NET SDK")]
struct Args {
    /// Tool to probe before opening the terminal (default: dotnet)
    #[arg(short, long)]
    tool: Option<String>,

    /// Give up on the probe after this many seconds
    #[arg(long)]
    probe_timeout: Option<u64>,

    /// Use the whole terminal instead of reserving a footer row
    #[arg(long)]
    no_footer: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to lazydotnet.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("lazydotnet.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Falling back to default config: {}", e);
        config::LazyConfig::default()
    });
    let mut resolved = config::resolve(
        &file_config,
        args.tool.as_deref(),
        args.probe_timeout,
        |key| std::env::var(key).ok(),
    );
    if args.no_footer {
        resolved.terminal.allocate_footer = false;
    }

    log::info!("lazydotnet starting up, probing {:?}", resolved.probe.program);

    let mut stdout = std::io::stdout();
    match app::launch(&resolved, backend::load, &mut stdout).await? {
        Outcome::Finished(reason) => log::info!("Exited: {:?}", reason),
        other => log::info!("Stopped before the event loop: {:?}", other),
    }
    Ok(())
}
