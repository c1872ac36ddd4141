use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_FILE: &str = "paubra-chat.log";

/// Log to a file in `dir`; the terminal belongs to the UI.
///
/// `PAUBRA_LOG` takes an `EnvFilter` directive, default `info` for our crates.
pub fn configure_logging(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))?;

    let filter = EnvFilter::try_from_env("PAUBRA_LOG")
        .unwrap_or_else(|_| EnvFilter::new("paubra_core=info,paubra_tui=info"));

    let file_log = fmt::layer()
        .compact()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_log)
        .try_init()
        .ok();

    Ok(())
}
