//! Defines the records read from the store: [`Entry`], [`OneOff`] and
//! [`HistoryRecord`], plus the helpers every view uses to turn an entry id into
//! a path or a date.

use chrono::{DateTime, TimeZone, Utc};

/// An entry id is the Unix timestamp (in seconds) at which the entry was
/// published. It doubles as the entry's primary key.
pub type EntryId = i64;

/// The path prefix under which entry pages are served.
pub const ENTRY_PREFIX: &str = "/entry/";

/// A dated blog post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// Publish timestamp and primary key.
    pub id: EntryId,

    pub title: String,

    /// The chronologically later entry, if any.
    pub next: Option<EntryId>,

    /// The chronologically earlier entry, if any.
    pub previous: Option<EntryId>,

    /// Paragraphs, delimited by the two characters `\n`. See
    /// [`crate::text::split_text_blob`].
    pub content: String,

    /// Image references, delimited the same way as `content`.
    pub image: String,
}

/// A page addressed by an arbitrary identifier rather than by date. One-offs
/// have no navigation links and no date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OneOff {
    pub uid: String,
    pub content: String,
    pub image: String,
}

/// The projection of an [`Entry`] used to build the history index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryRecord {
    pub id: EntryId,
    pub title: String,
}

/// Returns the site-relative path of the entry page for `id`, e.g.
/// `/entry/1489554739`.
pub fn entry_path(id: EntryId) -> String {
    format!("{}{}", ENTRY_PREFIX, id)
}

/// Interprets `id` as a Unix timestamp in UTC. Fails if the id falls outside
/// the range chrono can represent.
pub fn published_at(id: EntryId) -> Result<DateTime<Utc>, TimestampError> {
    Utc.timestamp_opt(id, 0).single().ok_or(TimestampError(id))
}

/// Returned when an entry id cannot be read as a date. Such an entry has no
/// year, month or day, so every view built from it fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("entry id {0} is not a representable timestamp")]
pub struct TimestampError(pub EntryId);
