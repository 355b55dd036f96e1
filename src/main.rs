//! adoption-watch — pages the operator whenever a new adoptable animal is
//! listed on any of the watched rescue sites.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐  Vec<Animal>  ┌──────────┐  unseen  ┌───────────┐
//! │ source/*  │ ────────────► │ poll.rs  │ ───────► │ notify.rs │
//! │ (adapters)│               │ (loop)   │          │ (PagerDuty)│
//! └───────────┘               └──────────┘          └───────────┘
//!                                  │ has_seen / mark_seen
//!                             ┌──────────┐
//!                             │ store.rs │
//!                             └──────────┘
//! ```
//!
//! * **`source/`** — the `DataSource` trait, the canonical `Animal`, and one
//!   adapter per site.
//! * **`store`** — marker-file record of animals already alerted.
//! * **`notify`** — the `Notifier` trait and the PagerDuty incident sink.
//! * **`poll`** — the sequential fetch → dedup → notify → sleep loop.
//! * **`config`** / **`http`** — CLI parsing and the shared HTTP client.
//! * **`main`** — wires everything together.

mod config;
mod http;
mod notify;
mod poll;
mod source;
mod store;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Cli;
use notify::PagerDutyNotifier;
use poll::Poller;
use source::{DataSource, FamilyDogSource, RescueGroupsSource, ShelterluvSource};
use store::SeenStore;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let client = http::build_client(cli.timeout())?;
    let store = SeenStore::open(cli.store_dir()?).context("opening seen-store")?;
    tracing::info!(dir = %store.root().display(), "seen-store ready");

    // Order matters: alerts go out in source order, then listing order.
    let sources: Vec<Box<dyn DataSource>> = vec![
        Box::new(RescueGroupsSource::new(client.clone())),
        Box::new(FamilyDogSource::new(client.clone())),
        Box::new(ShelterluvSource::new(client.clone())),
    ];

    if cli.from.is_none() {
        tracing::warn!(
            "no --from / PAGERDUTY_FROM set; PagerDuty rejects incidents \
             from account-level tokens without it"
        );
    }
    let notifier = PagerDutyNotifier::new(client, cli.token.clone(), cli.service_id.clone())
        .with_from(cli.from.clone());
    let poller = Poller::new(sources, store, Box::new(notifier)).with_interval(cli.interval());

    if cli.once {
        let report = poller.run_cycle().context("poll cycle")?;
        tracing::info!(?report, "single cycle finished");
        return Ok(());
    }

    poller.run().context("seen-store failed; stopping")
}
