//! Shared plumbing of the demos: CLI flags, logging and the web-form runtime in [web].

pub mod web;

use std::path::PathBuf;
use anyhow::Result;
use chainprompt::config::Settings;
use tracing_subscriber::EnvFilter;

/// Flags every demo accepts.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CommonArgs {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address the web form listens on, e.g. 127.0.0.1:8501
    #[arg(long)]
    pub addr: Option<String>,
}

impl CommonArgs {
    /// Settings from `.env`, the config file and the environment, with `--addr` applied last.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(addr) = &self.addr {
            settings.bind_addr = addr.clone();
        }
        Ok(settings)
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`). Records of the `log` facade are captured too.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}
