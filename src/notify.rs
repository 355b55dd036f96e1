//! Alert delivery.
//!
//! The poller hands each newly discovered [`Animal`] to a [`Notifier`].  The
//! only real sink is PagerDuty's incident API; tests substitute a recorder.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, FROM};
use serde::Serialize;

use crate::source::Animal;

pub const INCIDENTS_URL: &str = "https://api.pagerduty.com/incidents";

/// Service reference incidents are opened against unless configured.
pub const DEFAULT_SERVICE_ID: &str = "P1DEO09";

pub trait Notifier {
    /// Deliver one alert.  Errors are reported to the caller but the poller
    /// does not retry them.
    fn notify(&self, animal: &Animal) -> Result<()>;
}

/// Alert title for an animal.
pub fn alert_title(animal: &Animal) -> String {
    format!(
        "New animal alert: {} is now available from {}",
        animal.display_name, animal.source_name
    )
}

/// Alert body: the animal's detail text, or `<name>: <link>` when the text
/// is blank or the lazy fetch fails.
pub fn alert_body(animal: &Animal) -> String {
    let content = match animal.detail.content() {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!(
                source = %animal.source_name,
                id = %animal.identity,
                error = ?e,
                "detail fetch failed; falling back to link"
            );
            None
        }
    };

    match (content.filter(|text| !text.trim().is_empty()), animal.detail.link()) {
        (Some(text), _) => text,
        (None, Some(link)) => format!("{}: {}", animal.display_name, link),
        (None, None) => animal.display_name.clone(),
    }
}

#[derive(Debug, Serialize)]
pub struct IncidentRequest {
    incident: Incident,
}

#[derive(Debug, Serialize)]
struct Incident {
    #[serde(rename = "type")]
    kind: &'static str,
    title: String,
    service: ServiceReference,
    body: IncidentBody,
}

#[derive(Debug, Serialize)]
struct ServiceReference {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct IncidentBody {
    #[serde(rename = "type")]
    kind: &'static str,
    details: String,
}

impl IncidentRequest {
    pub fn new(title: String, details: String, service_id: &str) -> Self {
        Self {
            incident: Incident {
                kind: "incident",
                title,
                service: ServiceReference {
                    id: service_id.to_string(),
                    kind: "service_reference",
                },
                body: IncidentBody {
                    kind: "incident_body",
                    details,
                },
            },
        }
    }
}

pub struct PagerDutyNotifier {
    client: Client,
    token: String,
    service_id: String,
    from: Option<String>,
}

impl PagerDutyNotifier {
    pub fn new(client: Client, token: impl Into<String>, service_id: impl Into<String>) -> Self {
        Self {
            client,
            token: token.into(),
            service_id: service_id.into(),
            from: None,
        }
    }

    /// Email of the PagerDuty user the incident is opened as.
    pub fn with_from(mut self, from: Option<String>) -> Self {
        self.from = from;
        self
    }

    pub fn build_request(&self, animal: &Animal) -> IncidentRequest {
        IncidentRequest::new(alert_title(animal), alert_body(animal), &self.service_id)
    }
}

impl Notifier for PagerDutyNotifier {
    fn notify(&self, animal: &Animal) -> Result<()> {
        tracing::info!(
            source = %animal.source_name,
            id = %animal.identity,
            name = %animal.display_name,
            image = animal.image_url.as_deref().unwrap_or("-"),
            "paging"
        );
        let payload = self.build_request(animal);

        let mut request = self
            .client
            .post(INCIDENTS_URL)
            .header(AUTHORIZATION, format!("Token token={}", self.token))
            .header(ACCEPT, "application/vnd.pagerduty+json;version=2")
            .json(&payload);
        if let Some(from) = &self.from {
            request = request.header(FROM, from);
        }

        request
            .send()
            .context("pagerduty post")?
            .error_for_status()
            .context("pagerduty non-2xx")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Detail;

    fn make_animal(detail: Detail) -> Animal {
        Animal {
            identity: "42".into(),
            source_name: "shelterluv".into(),
            display_name: "Rex".into(),
            image_url: None,
            detail,
        }
    }

    #[test]
    fn title_names_animal_and_source() {
        let animal = make_animal(Detail::Text(String::new()));
        assert_eq!(
            alert_title(&animal),
            "New animal alert: Rex is now available from shelterluv"
        );
    }

    #[test]
    fn body_uses_detail_text() {
        let animal = make_animal(Detail::Text("Good with cats.".into()));
        assert_eq!(alert_body(&animal), "Good with cats.");
    }

    #[test]
    fn blank_text_without_link_uses_name() {
        let animal = make_animal(Detail::Text(" ".into()));
        assert_eq!(alert_body(&animal), "Rex");
    }

    #[test]
    fn body_falls_back_to_link_when_lazy_fetch_fails() {
        let animal =
            make_animal(Detail::lazy("https://example.com/rex", || anyhow::bail!("timeout")));
        assert_eq!(alert_body(&animal), "Rex: https://example.com/rex");
    }

    #[test]
    fn body_falls_back_to_link_when_lazy_fetch_is_blank() {
        let animal = make_animal(Detail::lazy("https://example.com/rex", || Ok("   ".into())));
        assert_eq!(alert_body(&animal), "Rex: https://example.com/rex");
    }

    #[test]
    fn incident_payload_shape() {
        let notifier = PagerDutyNotifier::new(Client::new(), "secret", "PSERVICE");
        let animal =
            make_animal(Detail::lazy("https://example.com/rex", || Ok("Loves fetch".into())));

        let json = serde_json::to_value(notifier.build_request(&animal)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "incident": {
                    "type": "incident",
                    "title": "New animal alert: Rex is now available from shelterluv",
                    "service": { "id": "PSERVICE", "type": "service_reference" },
                    "body": { "type": "incident_body", "details": "Loves fetch" }
                }
            })
        );
    }
}
