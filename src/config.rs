//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use crate::notify::DEFAULT_SERVICE_ID;

#[derive(Debug, Parser)]
#[command(name = "adoption-watch", version, about = "Page on newly listed adoptable animals")]
pub struct Cli {
    /// PagerDuty API token used to open incidents.
    #[arg(env = "PAGERDUTY_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Directory holding one marker file per animal already alerted.
    /// Defaults to `$HOME/Desktop/adoptions`.
    #[arg(long, env = "ADOPTION_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Seconds to sleep between poll cycles.
    #[arg(long, default_value_t = 60)]
    pub interval_secs: u64,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// PagerDuty service the incidents are opened against.
    #[arg(long, default_value = DEFAULT_SERVICE_ID)]
    pub service_id: String,

    /// Email of a valid PagerDuty user, sent as the `From` header.  Incident
    /// creation with an account-level API token is rejected without it.
    #[arg(long, env = "PAGERDUTY_FROM")]
    pub from: Option<String>,

    /// Run one cycle and exit instead of polling forever.
    #[arg(long)]
    pub once: bool,
}

impl Cli {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn store_dir(&self) -> Result<PathBuf> {
        match &self.store_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let home = std::env::var_os("HOME").context("HOME is not set; pass --store-dir")?;
                Ok(PathBuf::from(home).join("Desktop").join("adoptions"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn token_is_the_only_required_argument() {
        let cli = Cli::try_parse_from(["adoption-watch", "tok123"]).unwrap();
        assert_eq!(cli.token, "tok123");
        assert_eq!(cli.interval(), Duration::from_secs(60));
        assert_eq!(cli.timeout(), Duration::from_secs(30));
        assert_eq!(cli.service_id, DEFAULT_SERVICE_ID);
        assert!(!cli.once);
    }

    #[test]
    fn explicit_store_dir_wins() {
        let cli =
            Cli::try_parse_from(["adoption-watch", "tok", "--store-dir", "/tmp/seen", "--once"])
                .unwrap();
        assert_eq!(cli.store_dir().unwrap(), PathBuf::from("/tmp/seen"));
        assert!(cli.once);
    }

    #[test]
    fn overrides_parse() {
        let cli = Cli::try_parse_from([
            "adoption-watch",
            "tok",
            "--interval-secs",
            "300",
            "--timeout-secs",
            "5",
            "--service-id",
            "PABC123",
            "--from",
            "me@example.com",
        ])
        .unwrap();
        assert_eq!(cli.interval(), Duration::from_secs(300));
        assert_eq!(cli.timeout(), Duration::from_secs(5));
        assert_eq!(cli.service_id, "PABC123");
        assert_eq!(cli.from.as_deref(), Some("me@example.com"));
    }

    #[test]
    fn from_help_says_account_tokens_need_it() {
        let cmd = Cli::command();
        let from = cmd.get_arguments().find(|a| a.get_id() == "from").unwrap();
        let help = from.get_long_help().or(from.get_help()).unwrap().to_string();
        assert!(help.contains("rejected without it"), "{help}");
    }

    #[test]
    fn non_numeric_interval_is_rejected() {
        assert!(Cli::try_parse_from(["adoption-watch", "tok", "--interval-secs", "soon"]).is_err());
    }
}
