#![forbid(unsafe_code)]

mod actions;
mod config;
mod entry;
mod handlers;
mod server;
mod site;
mod support;

pub(crate) use server::AdminServer;
pub(crate) use support::*;

use clap::Parser;
use config::Cli;
use inv_storage::SqliteStore;
use site::AdminSite;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr; stdout carries protocol responses only.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let store = SqliteStore::open(&cli.storage_dir)?;
    let site = AdminSite::inventory(&cli);
    tracing::info!(
        db = %store.db_path().display(),
        actor = %cli.actor,
        models = site.models().count(),
        "inv_admin ready"
    );

    let mut server = AdminServer::new(store, site, cli.actor);
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    entry::run_stdio(&mut server, stdin.lock(), stdout.lock())?;
    Ok(())
}
