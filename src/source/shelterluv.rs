//! Shelterluv embedded listing (Milo Foundation).
//!
//! The embed is a flat list of anchors, each wrapping a photo and the
//! animal's name; the anchor's last path segment is the animal's ID.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use scraper::Html;
use url::Url;

use super::html::{element_text, fetch_paragraph, selector, send_text, Paragraph};
use super::{Animal, DataSource, Detail};

pub const NAME: &str = "shelterluv";

const LISTING_URL: &str = concat!(
    "https://www.shelterluv.com/available_pets/11413?saved_query=7503&embedded=1",
    "&iframeId=shelterluv_embed_114131597715231779&columns=2",
);
const DETAIL_URL: &str = "https://www.shelterluv.com/publish_animal/";

/// One anchor tile before it becomes an [`Animal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub identity: String,
    pub name: String,
    pub image_url: Option<String>,
}

pub struct ShelterluvSource {
    client: Client,
}

impl ShelterluvSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Parse the embed HTML into tiles.
    ///
    /// Only anchors that wrap an `<img>` are animal tiles; navigation links
    /// and anchors whose `href` has no final path segment are ignored.
    pub fn parse_listing(body: &str, base: &Url) -> Result<Vec<Tile>> {
        let document = Html::parse_document(body);
        let anchor_sel = selector("a[href]")?;
        let img_sel = selector("img")?;

        let mut tiles = Vec::new();
        for anchor in document.select(&anchor_sel) {
            let Some(img) = anchor.select(&img_sel).next() else {
                continue;
            };
            let href = anchor.value().attr("href").unwrap_or_default();
            let Some(identity) = identity_from_href(base, href) else {
                tracing::warn!(source = NAME, href, "cannot derive animal id from link; skipping");
                continue;
            };
            tiles.push(Tile {
                identity,
                name: element_text(anchor),
                image_url: img.value().attr("src").map(str::to_string),
            });
        }
        Ok(tiles)
    }
}

/// Last path segment of `href`, resolved against the listing page.
fn identity_from_href(base: &Url, href: &str) -> Option<String> {
    let url = base.join(href).ok()?;
    url.path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn detail_url(identity: &str) -> String {
    format!("{DETAIL_URL}{identity}")
}

impl DataSource for ShelterluvSource {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch(&self) -> Result<Vec<Animal>> {
        tracing::info!(source = NAME, "querying embedded listing");
        let base = Url::parse(LISTING_URL).context("listing url")?;
        let body = send_text(self.client.get(LISTING_URL), NAME)?;

        Ok(Self::parse_listing(&body, &base)?
            .into_iter()
            .map(|tile| {
                let link = detail_url(&tile.identity);
                let client = self.client.clone();
                let url = link.clone();
                Animal {
                    identity: tile.identity,
                    source_name: NAME.to_string(),
                    display_name: tile.name,
                    image_url: tile.image_url,
                    detail: Detail::lazy(link, move || {
                        fetch_paragraph(&client, &url, Paragraph::First)
                    }),
                }
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
