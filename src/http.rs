//! Shared blocking HTTP client.
//!
//! Every adapter and the notifier clone one client, so connection pooling and
//! the per-request timeout apply across the whole cycle.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .context("building HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_names_the_crate() {
        assert!(USER_AGENT.starts_with("adoption-watch/"));
    }

    #[test]
    fn builds_with_timeout() {
        assert!(build_client(Duration::from_secs(5)).is_ok());
    }
}
