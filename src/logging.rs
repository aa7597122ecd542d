// File-based logging via tracing. Writes to ~/.local/share/rateplay/rateplay.log
// since the terminal belongs to the TUI.

use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init() -> anyhow::Result<()> {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("rateplay");
    std::fs::create_dir_all(&data_dir)?;

    let file_appender = rolling::never(&data_dir, "rateplay.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(EnvFilter::from_default_env().add_directive("rateplay=debug".parse()?))
        .init();

    // The guard must outlive the program; leak it so the file writer stays open.
    std::mem::forget(guard);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging started");
    Ok(())
}
