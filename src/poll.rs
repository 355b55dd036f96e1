//! The poll–deduplicate–notify loop.
//!
//! Runs on the main thread: every cycle fetches all configured sources in
//! order, alerts on each animal the [`SeenStore`] has not recorded, marks it
//! seen, then sleeps.
//!
//! ## For contributors
//!
//! The poller is intentionally sequential.  If sources are ever fetched
//! concurrently, `has_seen`/`mark_seen` for a key must be serialised or an
//! animal listed by two racing cycles could be paged twice.

use std::thread;
use std::time::Duration;

use chrono::Local;

use crate::notify::Notifier;
use crate::source::DataSource;
use crate::store::{SeenStore, StoreError};

/// Default pause between cycles.
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// What happened during one cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Animals returned across all sources that answered.
    pub fetched: usize,
    /// Animals a notification was attempted for.
    pub new: usize,
    /// Of those, deliveries that failed (still marked seen).
    pub notify_failures: usize,
    /// Animals skipped because they were already seen.
    pub already_seen: usize,
    /// Sources whose fetch failed this cycle, in configuration order.
    pub failed_sources: Vec<String>,
}

pub struct Poller {
    sources: Vec<Box<dyn DataSource>>,
    store: SeenStore,
    notifier: Box<dyn Notifier>,
    interval: Duration,
}

impl Poller {
    pub fn new(
        sources: Vec<Box<dyn DataSource>>,
        store: SeenStore,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            sources,
            store,
            notifier,
            interval: POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one full pass over every source.
    ///
    /// Source and notification failures are logged and counted.  A seen-store
    /// failure aborts the cycle: without it, at-most-once delivery can't be
    /// upheld.
    pub fn run_cycle(&self) -> Result<CycleReport, StoreError> {
        tracing::info!(at = %Local::now().to_rfc3339(), "polling");
        let mut report = CycleReport::default();

        let mut animals = Vec::new();
        for src in &self.sources {
            match src.fetch() {
                Ok(found) => {
                    tracing::info!(source = src.name(), count = found.len(), "fetched");
                    animals.extend(found);
                }
                Err(e) => {
                    tracing::warn!(
                        source = src.name(),
                        error = ?e,
                        "source failed; retrying next cycle"
                    );
                    report.failed_sources.push(src.name().to_string());
                }
            }
        }
        report.fetched = animals.len();

        for animal in &animals {
            let key = animal.dedup_key();
            if self.store.has_seen(&key)? {
                tracing::debug!(%key, name = %animal.display_name, "already seen");
                report.already_seen += 1;
            } else {
                report.new += 1;
                if let Err(e) = self.notifier.notify(animal) {
                    tracing::warn!(%key, error = ?e, "notification failed; not retrying");
                    report.notify_failures += 1;
                }
            }
            self.store.mark_seen(&key)?;
        }

        tracing::info!(
            fetched = report.fetched,
            new = report.new,
            failed_sources = report.failed_sources.len(),
            "cycle complete"
        );
        Ok(report)
    }

    /// Poll forever.  Only returns on a seen-store error.
    pub fn run(&self) -> Result<(), StoreError> {
        loop {
            self.run_cycle()?;
            thread::sleep(self.interval);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
