//! Reminder sweep
//!
//! The one background job in the system: every tick it collects
//! sessions starting inside the lookahead window that are neither
//! completed nor already reminded, dispatches a notification for each,
//! and flips their reminder flag. Each session is an independent unit
//! of work; a failed dispatch is logged and retried on later ticks for
//! as long as the session stays inside the window.
//!
//! Ticks never overlap: a tick that finds the previous one still
//! running is skipped. The flag flip itself is a conditional update in
//! the repository, so even a misbehaving schedule cannot double-claim a
//! session.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::ReminderConfig;
use crate::db::repositories::StudySessionRepository;

/// Notification payload for a session that is about to start
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReminder {
    /// Title of the session
    pub session_title: String,
    /// Title of the linked resource, when one is set
    pub resource_title: Option<String>,
    /// When the session starts
    pub start_time: DateTime<Utc>,
}

/// Outbound notification capability the sweep dispatches through.
///
/// Implemented by the SMTP-backed email service and by a logging
/// stand-in when email is not configured.
#[async_trait]
pub trait ReminderNotifier: Send + Sync {
    /// Deliver one reminder. An error leaves the session unmarked so it
    /// is retried on the next tick.
    async fn notify(&self, reminder: &SessionReminder) -> Result<()>;
}

/// Counters for a single sweep run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Reminders dispatched and marked
    pub sent: usize,
    /// Dispatches that failed or timed out
    pub failed: usize,
}

/// Periodic reminder sweep over the session store
pub struct ReminderSweep {
    repo: Arc<dyn StudySessionRepository>,
    notifier: Arc<dyn ReminderNotifier>,
    config: ReminderConfig,
    // Serializes ticks; an overlapping tick is skipped, never queued
    tick_guard: tokio::sync::Mutex<()>,
}

impl ReminderSweep {
    /// Create a new sweep over the given store and notifier
    pub fn new(
        repo: Arc<dyn StudySessionRepository>,
        notifier: Arc<dyn ReminderNotifier>,
        config: ReminderConfig,
    ) -> Self {
        Self {
            repo,
            notifier,
            config,
            tick_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Spawn the periodic sweep task
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        let interval_secs = self.config.interval_secs;
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(interval_secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                self.tick().await;
            }
        })
    }

    /// Run one tick, skipping if the previous tick is still in flight.
    /// Failures are logged; a bad tick never stops future ones.
    pub async fn tick(&self) {
        let Ok(_guard) = self.tick_guard.try_lock() else {
            tracing::warn!("Previous reminder sweep still running, skipping tick");
            return;
        };

        match self.run_once(Utc::now()).await {
            Ok(stats) if stats.sent > 0 || stats.failed > 0 => {
                tracing::info!(
                    "Reminder sweep: {} sent, {} failed",
                    stats.sent,
                    stats.failed
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Reminder sweep failed: {:#}", e);
            }
        }
    }

    /// Run a single sweep at the given instant.
    ///
    /// Sessions starting in `[now, now + lookahead]` with neither flag
    /// set each get one dispatch attempt bounded by the configured
    /// timeout. Only a successful dispatch marks the session; failures
    /// leave it due for the next tick.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<SweepStats> {
        let horizon = now + Duration::minutes(self.config.lookahead_minutes);

        let due = self
            .repo
            .due_for_reminder(now, horizon)
            .await
            .context("Failed to collect due sessions")?;

        let mut stats = SweepStats::default();
        let dispatch_timeout = std::time::Duration::from_secs(self.config.dispatch_timeout_secs);

        for entry in due {
            let reminder = SessionReminder {
                session_title: entry.session.title.clone(),
                resource_title: entry.resource.as_ref().map(|r| r.title.clone()),
                start_time: entry.session.start_time,
            };

            match tokio::time::timeout(dispatch_timeout, self.notifier.notify(&reminder)).await {
                Ok(Ok(())) => match self.repo.mark_reminder_sent(entry.session.id).await {
                    Ok(true) => {
                        stats.sent += 1;
                        tracing::info!(
                            "Reminder sent for session '{}' (starts {})",
                            entry.session.title,
                            entry.session.start_time
                        );
                    }
                    Ok(false) => {
                        // Lost the claim to a concurrent sweep; nothing to do
                        tracing::debug!(
                            "Session '{}' already marked as reminded",
                            entry.session.title
                        );
                    }
                    Err(e) => {
                        stats.failed += 1;
                        tracing::warn!(
                            "Failed to mark reminder for session '{}': {:#}",
                            entry.session.title,
                            e
                        );
                    }
                },
                Ok(Err(e)) => {
                    stats.failed += 1;
                    tracing::warn!(
                        "Failed to send reminder for session '{}': {:#}",
                        entry.session.title,
                        e
                    );
                }
                Err(_) => {
                    stats.failed += 1;
                    tracing::warn!(
                        "Reminder dispatch for session '{}' timed out after {:?}",
                        entry.session.title,
                        dispatch_timeout
                    );
                }
            }
        }

        Ok(stats)
    }
}
