//! Durable record of animals that have already been alerted.
//!
//! One zero-byte marker file per [`DedupKey`], laid out as
//! `<root>/<source_name>/<escaped identity>`.  Existence means seen.  Markers
//! are never removed.  Identities too long to escape into a file name are
//! stored under a `#`-prefixed SHA-256 digest instead.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::source::DedupKey;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("seen-store I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeenStore {
    root: PathBuf,
}

impl SeenStore {
    /// Open (creating if needed) the marker directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::io(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a marker exists for `key`.  Never-written keys are `false`.
    pub fn has_seen(&self, key: &DedupKey) -> Result<bool, StoreError> {
        let path = self.marker_path(key);
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Record `key` as seen.  Repeated calls leave the same single marker.
    pub fn mark_seen(&self, key: &DedupKey) -> Result<(), StoreError> {
        let dir = self.root.join(escape_component(&key.source_name));
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let path = dir.join(escape_component(&key.identity));
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map(drop)
            .map_err(|e| StoreError::io(path, e))
    }

    fn marker_path(&self, key: &DedupKey) -> PathBuf {
        self.root
            .join(escape_component(&key.source_name))
            .join(escape_component(&key.identity))
    }
}

/// Longest escaped name written as-is; common filesystems cap names at 255 bytes.
const MAX_ESCAPED_LEN: usize = 200;

/// Map an arbitrary string onto a single, portable file name.
///
/// Bytes outside `[A-Za-z0-9._-]`, and a leading `.`, are written as `%XX`.
/// The empty string maps to a lone `%`, which no other input produces.
/// Names longer than [`MAX_ESCAPED_LEN`] become `#<sha256 hex>`; escaping
/// never emits `#`, so the two forms cannot collide.
fn escape_component(raw: &str) -> String {
    if raw.is_empty() {
        return "%".to_string();
    }
    let mut out = String::with_capacity(raw.len());
    for (i, b) in raw.bytes().enumerate() {
        let keep = b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || (b == b'.' && i > 0);
        if keep {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    if out.len() > MAX_ESCAPED_LEN {
        return format!("#{}", hex::encode(Sha256::digest(raw.as_bytes())));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
