// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fleet-Watch: headless dashboard console
//!
//! Polls the fleet API and keeps a headless map in sync, logging every
//! marker change. Reads commands from stdin:
//!
//! ```text
//! select <vehicle-id>
//! deselect
//! locate <lat> <lng>
//! ```

use fleet_tracker::config::DashboardConfig;
use fleet_tracker::dashboard::{
    CameraMove, Dashboard, DashboardCommand, HeadlessSurface, HttpSnapshotSource, SnapshotPoller,
};
use fleet_tracker::models::Location;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let config = DashboardConfig::from_env()?;
    tracing::info!(
        api_url = %config.api_url,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Starting Fleet-Watch"
    );

    let source = HttpSnapshotSource::new(&config)?;
    let dashboard = Dashboard::new(
        HeadlessSurface::new(),
        CameraMove {
            zoom: config.fly_to_zoom,
            duration: config.fly_to_duration,
        },
    );
    let poller = SnapshotPoller::new(source, config.poll_interval, config.fetch_timeout)
        .spawn(dashboard);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => match line? {
                Some(line) => match parse_command(&line) {
                    Some(command) => {
                        if !poller.send(command).await {
                            break;
                        }
                    }
                    None => tracing::warn!(input = %line, "Unrecognized command"),
                },
                None => {
                    // stdin closed; keep watching until Ctrl-C
                    tokio::signal::ctrl_c().await?;
                    break;
                }
            },
        }
    }

    let (mut dashboard, summary) = poller.shutdown().await?;
    dashboard.clear();
    tracing::info!(
        applied = summary.applied,
        failed = summary.failed,
        counters = ?dashboard.surface().counters(),
        "Fleet-Watch stopped"
    );
    Ok(())
}

fn parse_command(line: &str) -> Option<DashboardCommand> {
    let mut parts = line.split_whitespace();
    match (parts.next()?, parts.next(), parts.next()) {
        ("select", Some(id), None) => Some(DashboardCommand::Select(id.to_string())),
        ("deselect", None, None) => Some(DashboardCommand::Deselect),
        ("locate", Some(lat), Some(lng)) => Some(DashboardCommand::LocateMe(Location {
            lat: lat.parse().ok()?,
            lng: lng.parse().ok()?,
        })),
        _ => None,
    }
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fleet_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
