//! The canonical record shared across all adoption sources.
//!
//! Every adapter converts its native listing format into [`Animal`] values so
//! the poller, seen-store and notifier never need to know which site an
//! animal came from.

use std::fmt;

use anyhow::Result;

/// A single adoptable animal, normalised from any data source.
///
/// Records are rebuilt from scratch on every poll cycle; only their
/// [`DedupKey`] is ever persisted.
#[derive(Debug)]
pub struct Animal {
    /// Source-assigned identifier, stable and unique within its source.
    pub identity: String,

    /// Name of the adapter that produced this record (e.g. "shelterluv").
    pub source_name: String,

    /// Human-readable name used in alert text.
    pub display_name: String,

    /// Thumbnail or photo URL, when the listing has one.
    pub image_url: Option<String>,

    /// What to say about the animal in the alert body.
    pub detail: Detail,
}

impl Animal {
    /// The `(source_name, identity)` pair that decides "already alerted".
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(&self.source_name, &self.identity)
    }
}

/// Identity of an animal across sources and across poll cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    pub source_name: String,
    pub identity: String,
}

impl DedupKey {
    pub fn new(source_name: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            identity: identity.into(),
        }
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source_name, self.identity)
    }
}

/// Detail content for an animal.
///
/// Adapters either embed it directly ([`Detail::Text`]) or defer a second
/// network call until an alert body is actually needed ([`Detail::Lazy`]).
/// The lazy closure is bound to the animal's identity when the record is
/// built, so callers resolve every variant the same way.
pub enum Detail {
    Text(String),
    Lazy {
        /// Page the fetch reads from; used as the fallback link.
        link: String,
        fetch: Box<dyn Fn() -> Result<String>>,
    },
}

impl Detail {
    pub fn lazy(link: impl Into<String>, fetch: impl Fn() -> Result<String> + 'static) -> Self {
        Detail::Lazy {
            link: link.into(),
            fetch: Box::new(fetch),
        }
    }

    /// Resolve the descriptive text, performing the deferred fetch if any.
    pub fn content(&self) -> Result<String> {
        match self {
            Detail::Text(text) => Ok(text.clone()),
            Detail::Lazy { fetch, .. } => fetch(),
        }
    }

    /// Page to point at when the content is unavailable.
    pub fn link(&self) -> Option<&str> {
        match self {
            Detail::Text(_) => None,
            Detail::Lazy { link, .. } => Some(link),
        }
    }
}

impl fmt::Debug for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detail::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Detail::Lazy { link, .. } => {
                f.debug_struct("Lazy").field("link", link).finish_non_exhaustive()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
