// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vehicle snapshot polling.
//!
//! One task owns the [`Dashboard`]: it waits for either a user command or
//! the next tick, fetches the whole fleet, and reconciles it before
//! looking at anything else. Fetches run one at a time under a timeout
//! shorter than the interval; ticks that fall due while a fetch is in
//! flight are skipped, never queued.

use crate::config::DashboardConfig;
use crate::dashboard::map::MapSurface;
use crate::dashboard::session::{Dashboard, DashboardCommand};
use crate::models::Vehicle;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Snapshot fetch failures. Logged and skipped by the poller.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Fleet API returned status {0}")]
    Status(u16),

    #[error("Failed to decode snapshot: {0}")]
    Decode(String),

    #[error("Snapshot fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Where snapshots come from.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Vehicle>, PollError>;
}

/// Fetches `GET {api_url}/api/vehicles`.
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpSnapshotSource {
    pub fn new(config: &DashboardConfig) -> Result<Self, PollError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| PollError::Http(e.to_string()))?;

        Ok(Self {
            client,
            url: format!("{}/api/vehicles", config.api_url.trim_end_matches('/')),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self) -> Result<Vec<Vehicle>, PollError> {
        let mut request = self.client.get(&self.url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| PollError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PollError::Status(response.status().as_u16()));
        }

        response
            .json::<Vec<Vehicle>>()
            .await
            .map_err(|e| PollError::Decode(e.to_string()))
    }
}

/// Counters for a finished polling session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Snapshots fetched and reconciled
    pub applied: u64,
    /// Fetches that failed or timed out
    pub failed: u64,
}

/// Drives a [`Dashboard`] from a [`SnapshotSource`] on a fixed interval.
pub struct SnapshotPoller<Src> {
    source: Src,
    interval: Duration,
    fetch_timeout: Duration,
}

impl<Src: SnapshotSource> SnapshotPoller<Src> {
    pub fn new(source: Src, interval: Duration, fetch_timeout: Duration) -> Self {
        Self {
            source,
            interval,
            fetch_timeout,
        }
    }

    /// Poll until `cancel` fires. The first fetch happens immediately.
    pub async fn run<S: MapSurface>(
        &self,
        dashboard: &mut Dashboard<S>,
        mut commands: mpsc::Receiver<DashboardCommand>,
        cancel: CancellationToken,
    ) -> PollSummary {
        let mut summary = PollSummary::default();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Cleared once every sender is gone; polling carries on.
        let mut commands_open = true;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                command = commands.recv(), if commands_open => match command {
                    Some(command) => {
                        dashboard.handle(command);
                    }
                    None => commands_open = false,
                },
                _ = ticker.tick() => {
                    let fetched = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        fetched = tokio::time::timeout(self.fetch_timeout, self.source.fetch()) => fetched,
                    };

                    match fetched {
                        Ok(Ok(snapshot)) => {
                            dashboard.apply_snapshot(snapshot);
                            summary.applied += 1;
                        }
                        Ok(Err(e)) => {
                            summary.failed += 1;
                            tracing::warn!(error = %e, "Snapshot poll failed");
                        }
                        Err(_) => {
                            summary.failed += 1;
                            tracing::warn!(
                                error = %PollError::Timeout(self.fetch_timeout),
                                "Snapshot poll failed"
                            );
                        }
                    }
                }
            }
        }

        tracing::info!(
            applied = summary.applied,
            failed = summary.failed,
            "Snapshot polling stopped"
        );
        summary
    }
}

impl<Src: SnapshotSource + 'static> SnapshotPoller<Src> {
    /// Run the poller on its own task.
    pub fn spawn<S>(self, mut dashboard: Dashboard<S>) -> PollerHandle<S>
    where
        S: MapSurface + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let (commands_tx, commands_rx) = mpsc::channel(32);

        let task_cancel = cancel.clone();
        let join = tokio::spawn(async move {
            let summary = self.run(&mut dashboard, commands_rx, task_cancel).await;
            (dashboard, summary)
        });

        PollerHandle {
            cancel: cancel.drop_guard(),
            commands: commands_tx,
            join,
        }
    }
}

/// Handle to a spawned poller.
///
/// Dropping the handle stops the poller as well; [`PollerHandle::shutdown`]
/// additionally waits for it and returns the dashboard.
pub struct PollerHandle<S: MapSurface> {
    cancel: DropGuard,
    commands: mpsc::Sender<DashboardCommand>,
    join: JoinHandle<(Dashboard<S>, PollSummary)>,
}

impl<S: MapSurface> PollerHandle<S> {
    /// Queue a user action for the dashboard.
    ///
    /// Returns `false` if the poller has already stopped.
    pub async fn send(&self, command: DashboardCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// Stop polling and wait for the task to finish.
    ///
    /// Once this returns no further fetch or tick will happen. The
    /// dashboard is handed back so the caller can tear down its markers.
    pub async fn shutdown(self) -> anyhow::Result<(Dashboard<S>, PollSummary)> {
        let PollerHandle { cancel, join, .. } = self;
        drop(cancel);
        Ok(join.await?)
    }
}
