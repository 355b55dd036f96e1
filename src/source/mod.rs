//! Data source abstraction layer.
//!
//! This module defines the [`DataSource`] trait and the canonical [`Animal`]
//! record.  Concrete adapters live in sub-modules, one per adoption site.
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `petfinder.rs`).
//! 2. Define a struct holding the HTTP client and implement [`DataSource`].
//! 3. Add `mod petfinder;` below and re-export your struct.
//! 4. Construct an instance in `main.rs` and add it to the `sources` vec.
//!
//! The poller, seen-store and notifier are all source-agnostic.

mod animal;
mod family_dog;
mod html;
mod rescue_groups;
mod shelterluv;

pub use animal::{Animal, DedupKey, Detail};
pub use family_dog::FamilyDogSource;
pub use rescue_groups::RescueGroupsSource;
pub use shelterluv::ShelterluvSource;

use anyhow::Result;

/// Trait that every adoption source must implement.
///
/// The poller calls [`fetch()`](DataSource::fetch) once per cycle, in
/// configuration order, on the main thread.
pub trait DataSource {
    /// Short, stable label.  Part of every [`DedupKey`], so renaming a
    /// source re-alerts all of its animals.
    fn name(&self) -> &str;

    /// Fetch every animal currently listed.
    ///
    /// An empty listing is `Ok(vec![])`.  Transport and payload errors are
    /// returned; the poller logs them and retries next cycle.  Pagination
    /// must be resolved before returning.
    fn fetch(&self) -> Result<Vec<Animal>>;
}

/// Upper bound on pages requested from a single paginated source per cycle.
const MAX_PAGES: u32 = 200;

/// Drive a paginated listing from page 1 until a page comes back empty,
/// accumulating every page in order.
pub(crate) fn collect_pages<T>(
    mut fetch_page: impl FnMut(u32) -> Result<Vec<T>>,
) -> Result<Vec<T>> {
    let mut all = Vec::new();
    for page in 1..=MAX_PAGES {
        let items = fetch_page(page)?;
        if items.is_empty() {
            return Ok(all);
        }
        all.extend(items);
    }
    tracing::warn!(
        pages = MAX_PAGES,
        "page limit reached before an empty page; listing may be truncated"
    );
    Ok(all)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_pages_stops_at_first_empty_page() {
        let mut requested = Vec::new();
        let items = collect_pages(|page| {
            requested.push(page);
            Ok(match page {
                1 => vec!["a", "b"],
                2 => vec!["c"],
                _ => vec![],
            })
        })
        .unwrap();

        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(requested, vec![1, 2, 3]);
    }

    #[test]
    fn collect_pages_empty_first_page_is_ok() {
        let items: Vec<u8> = collect_pages(|_| Ok(vec![])).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn collect_pages_propagates_errors() {
        let result: Result<Vec<u8>> = collect_pages(|page| {
            if page == 2 {
                anyhow::bail!("HTTP 502");
            }
            Ok(vec![1])
        });
        assert!(result.is_err());
    }

    #[test]
    fn collect_pages_is_bounded() {
        let items = collect_pages(|page| Ok(vec![page])).unwrap();
        assert_eq!(items.len(), MAX_PAGES as usize);
    }
}
