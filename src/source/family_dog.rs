//! I Love Family Dog rescue.
//!
//! The site's listing is a WordPress `admin-ajax.php` action that answers a
//! form POST with `{"data": [...]}`, one page at a time.  Pages are walked
//! until one comes back empty.  When a listing embeds a plain-text
//! description it is used directly; otherwise the detail page is read only
//! if an alert is sent.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;

use super::html::{fetch_paragraph, send_text, Paragraph};
use super::{collect_pages, Animal, DataSource, Detail};

pub const NAME: &str = "ilovefamilydog";

const LISTING_URL: &str = "https://www.ilovefamilydog.org/wp-admin/admin-ajax.php";
const DETAIL_URL: &str = "https://www.ilovefamilydog.org/dog-details/";

/// Search filters the endpoint expects; `-` means "any".
const WILDCARD_FIELDS: [&str; 9] = [
    "gender",
    "age",
    "name",
    "breed",
    "primary_breed",
    "secondary_breed",
    "color_details",
    "energy_level",
    "special_needs",
];

/// Entries are kept raw so one malformed listing can be skipped on its own.
#[derive(Debug, Deserialize)]
struct ListingPage {
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(rename = "animalID")]
    id: AnimalId,
    #[serde(rename = "animalName")]
    name: String,
    #[serde(rename = "animalPictures", default)]
    pictures: Vec<Picture>,
    #[serde(rename = "animalDescriptionPlain", default)]
    description: Option<String>,
}

/// The API is inconsistent about whether IDs are strings or numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnimalId {
    Text(String),
    Number(u64),
}

impl AnimalId {
    fn into_string(self) -> String {
        match self {
            AnimalId::Text(s) => s,
            AnimalId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Picture {
    large: Option<PictureSize>,
}

#[derive(Debug, Deserialize)]
struct PictureSize {
    url: String,
}

/// One listing entry before it becomes an [`Animal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DogListing {
    pub identity: String,
    pub name: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

pub struct FamilyDogSource {
    client: Client,
}

impl FamilyDogSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Parse one page of the JSON listing.
    ///
    /// A body that isn't a listing page is an error; a single entry that
    /// doesn't decode is skipped with a warning.
    pub fn parse_page(body: &str) -> Result<Vec<DogListing>> {
        Ok(Self::parse_entries(body)?.into_iter().flatten().collect())
    }

    /// One slot per raw entry, `None` where the entry was skipped, so a page
    /// of only malformed entries still counts as non-empty for pagination.
    fn parse_entries(body: &str) -> Result<Vec<Option<DogListing>>> {
        let page: ListingPage = serde_json::from_str(body).context("parsing listing json")?;

        Ok(page
            .data
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, raw)| match serde_json::from_value::<Listing>(raw) {
                Ok(listing) => Some(DogListing::from(listing)),
                Err(e) => {
                    tracing::warn!(
                        source = NAME,
                        index,
                        error = %e,
                        "malformed listing; skipping"
                    );
                    None
                }
            })
            .collect())
    }

    fn fetch_page(&self, page: u32) -> Result<Vec<Option<DogListing>>> {
        tracing::debug!(source = NAME, page, "requesting listing page");
        let request = self.client.post(LISTING_URL).form(&page_form(page));
        let body = send_text(request, NAME)?;
        Self::parse_entries(&body).with_context(|| format!("{NAME} page {page}"))
    }
}

impl From<Listing> for DogListing {
    fn from(listing: Listing) -> Self {
        DogListing {
            identity: listing.id.into_string(),
            name: listing.name.trim().to_string(),
            image_url: listing
                .pictures
                .into_iter()
                .next()
                .and_then(|p| p.large)
                .map(|size| size.url),
            description: listing
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        }
    }
}

/// Form body for one listing page: every filter wildcarded, fosters excluded.
fn page_form(page: u32) -> Vec<(&'static str, String)> {
    let mut form: Vec<(&'static str, String)> = WILDCARD_FIELDS
        .iter()
        .map(|field| (*field, "-".to_string()))
        .collect();
    form.extend([
        ("action", "api_call".to_string()),
        ("page", page.to_string()),
        ("foster", "0".to_string()),
    ]);
    form
}

fn detail_url(identity: &str) -> String {
    format!("{DETAIL_URL}?id={identity}")
}

impl DataSource for FamilyDogSource {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch(&self) -> Result<Vec<Animal>> {
        tracing::info!(source = NAME, "querying paginated listing");
        let listings = collect_pages(|page| self.fetch_page(page))?;

        Ok(listings
            .into_iter()
            .flatten()
            .map(|listing| {
                let detail = match listing.description {
                    Some(text) => Detail::Text(text),
                    None => {
                        let link = detail_url(&listing.identity);
                        let client = self.client.clone();
                        let url = link.clone();
                        Detail::lazy(link, move || {
                            fetch_paragraph(&client, &url, Paragraph::Last)
                        })
                    }
                };
                Animal {
                    identity: listing.identity,
                    source_name: NAME.to_string(),
                    display_name: listing.name,
                    image_url: listing.image_url,
                    detail,
                }
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
