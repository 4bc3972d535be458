use aircraft_incidents::{
    cache,
    config::DashboardConfig,
    view::{render_dashboard, Dashboard},
};
use anyhow::{Context, Result};
use std::io::{self, Write};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) config + logging ─────────────────────────────────────────
    let config = DashboardConfig::resolve()?;
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();
    info!(data_path = %config.data_path.display(), "startup");

    // ─── 2) load once, cached for the process ────────────────────────
    let table = cache::global().get_or_load(&config.data_path);

    // ─── 3) filter + assemble the requested pages ────────────────────
    let dashboard = render_dashboard(&table, &config.filters, &config.pages);
    match &dashboard {
        Dashboard::LoadFailed { message } => error!("{}", message),
        Dashboard::NoMatches { notice, .. } => warn!("{}", notice.message),
        Dashboard::Ready { pages, header, .. } => info!(
            pages = pages.len(),
            filtered = %header.filtered_records,
            "rendered dashboard"
        ),
    }

    // ─── 4) hand off to the renderer on stdout ───────────────────────
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &dashboard).context("writing dashboard JSON")?;
    writeln!(out)?;
    out.flush()?;

    if let Dashboard::LoadFailed { .. } = dashboard {
        std::process::exit(1);
    }
    Ok(())
}
