//! RescueGroups toolkit grid.
//!
//! The toolkit renders an HTML table; each `td.rgtkSearchResultsCell` holds
//! a thumbnail link and the animal's name.  The toolkit exposes no ID in the
//! markup, but the thumbnail lives at `.../<animal id>/<file>.jpg`, so the
//! identity is recovered from the image path.

use anyhow::Result;
use reqwest::blocking::Client;
use scraper::Html;

use super::html::{element_text, selector, send_text};
use super::{Animal, DataSource, Detail};

pub const NAME: &str = "rescuegroups";

const GRID_URL: &str =
    "https://toolkit.rescuegroups.org/j/3/grid3_layout.php?&toolkitIndex=0&toolkitKey=LQbZuUMn";

const DETAIL_URL: &str = concat!(
    "https://toolkit.rescuegroups.org/j/3/pet2_layout.php?toolkitIndex=0&toolkitKey=LQbZuUMn",
    "&petfocus_0=&resultSort_0=animalUpdatedDate&resultOrder_0=desc&page_0=1",
    "&age_0=&sex_0=&searchString_0=&petIndex=6",
);

/// One grid cell before it becomes an [`Animal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub identity: String,
    pub name: String,
    pub image_url: String,
}

pub struct RescueGroupsSource {
    client: Client,
}

impl RescueGroupsSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Parse the grid HTML into cells.
    ///
    /// Pure (no I/O) so tests can exercise it on fixtures.  Cells without a
    /// thumbnail carry no identity and are skipped.
    pub fn parse_grid(body: &str) -> Result<Vec<GridCell>> {
        let document = Html::parse_document(body);
        let cell_sel = selector("td.rgtkSearchResultsCell")?;
        let img_sel = selector("div a img")?;

        let mut cells = Vec::new();
        for cell in document.select(&cell_sel) {
            let name = element_text(cell);
            let Some(src) = cell
                .select(&img_sel)
                .next()
                .and_then(|img| img.value().attr("src"))
            else {
                tracing::warn!(
                    source = NAME,
                    name = %name,
                    "grid cell without thumbnail; skipping"
                );
                continue;
            };
            let Some(identity) = identity_from_image(src) else {
                tracing::warn!(
                    source = NAME,
                    src,
                    "cannot derive animal id from thumbnail; skipping"
                );
                continue;
            };
            cells.push(GridCell {
                identity: identity.to_string(),
                name,
                image_url: src.to_string(),
            });
        }
        Ok(cells)
    }
}

/// The second-to-last path segment of the thumbnail URL.
fn identity_from_image(src: &str) -> Option<&str> {
    src.rsplit('/').nth(1).filter(|segment| !segment.is_empty())
}

fn detail_url(identity: &str) -> String {
    format!("{DETAIL_URL}&animalID={identity}")
}

impl DataSource for RescueGroupsSource {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch(&self) -> Result<Vec<Animal>> {
        tracing::info!(source = NAME, "querying listing grid");
        let body = send_text(self.client.get(GRID_URL), NAME)?;

        let animals = Self::parse_grid(&body)?
            .into_iter()
            .map(|cell| {
                let link = detail_url(&cell.identity);
                let client = self.client.clone();
                let url = link.clone();
                Animal {
                    identity: cell.identity,
                    source_name: NAME.to_string(),
                    display_name: cell.name,
                    image_url: Some(cell.image_url),
                    detail: Detail::lazy(link, move || page_text(&client, &url)),
                }
            })
            .collect();
        Ok(animals)
    }
}

/// The detail layout has no stable paragraph structure; use its full text.
fn page_text(client: &Client, url: &str) -> Result<String> {
    let body = send_text(client.get(url), url)?;
    let document = Html::parse_document(&body);
    let body_sel = selector("body")?;
    Ok(document
        .select(&body_sel)
        .next()
        .map(element_text)
        .unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: &str = r##"<table><tr>
      <td class="rgtkSearchResultsCell">
        <div><a href="#"><img
          src="https://s3.amazonaws.com/filestore.rescuegroups.org/4212/pictures/animals/15937/15937621/72144389_100x100.jpg"
        ></a></div>
        <div>  Biscuit  </div>
      </td>
      <td class="rgtkSearchResultsCell">
        <div><a href="#"><img
          src="https://s3.amazonaws.com/filestore.rescuegroups.org/4212/pictures/animals/16001/16001234/1_100x100.jpg"
        ></a></div>
        Pepper
      </td>
      <td class="somethingElse">Not an animal</td>
    </tr></table>"##;

    #[test]
    fn parse_grid_extracts_cells_in_order() {
        let cells = RescueGroupsSource::parse_grid(GRID).unwrap();

        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].identity, "15937621");
        assert_eq!(cells[0].name, "Biscuit");
        assert!(cells[0].image_url.ends_with("72144389_100x100.jpg"));
        assert_eq!(cells[1].identity, "16001234");
        assert_eq!(cells[1].name, "Pepper");
    }

    #[test]
    fn cell_without_thumbnail_is_skipped() {
        let html = r#"<table><tr>
          <td class="rgtkSearchResultsCell"><div>No photo yet</div></td>
        </tr></table>"#;
        assert!(RescueGroupsSource::parse_grid(html).unwrap().is_empty());
    }

    #[test]
    fn empty_grid_is_not_an_error() {
        assert!(RescueGroupsSource::parse_grid("<html></html>").unwrap().is_empty());
    }

    #[test]
    fn identity_from_image_takes_parent_directory() {
        assert_eq!(identity_from_image("a/b/123/x.jpg"), Some("123"));
        assert_eq!(identity_from_image("x.jpg"), None);
        assert_eq!(identity_from_image("//x.jpg"), None);
    }

    #[test]
    fn detail_url_carries_animal_id() {
        assert!(detail_url("15937621").ends_with("&animalID=15937621"));
    }
}
