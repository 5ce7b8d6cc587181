//! Defines [`EntryView`], the view model shared by entry, landing and one-off
//! pages. See [`crate::value`] for how it is handed to a template.

use crate::entry::{entry_path, published_at, Entry, EntryId, OneOff, TimestampError};
use crate::text::split_text_blob;
use chrono::Datelike;

/// Everything an entry template needs to render a page. Empty strings mean
/// "absent": a template should omit the navigation link or date when the
/// corresponding field is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryView {
    pub title: String,

    /// Path of the chronologically later entry, or empty.
    pub next_path: String,

    /// Path of the chronologically earlier entry, or empty.
    pub prev_path: String,

    /// English month name, e.g. `March`.
    pub month: String,

    /// Day of month without padding, e.g. `5`.
    pub day: String,

    pub year: String,

    pub content: Vec<String>,

    pub image: Vec<String>,
}

impl EntryView {
    /// Builds the view for a dated entry. Date parts are computed in UTC from
    /// the entry id, which must be a representable timestamp.
    pub fn from_entry(entry: &Entry) -> Result<EntryView, TimestampError> {
        let date = published_at(entry.id)?;
        Ok(EntryView {
            title: entry.title.clone(),
            next_path: link_path(entry.next),
            prev_path: link_path(entry.previous),
            month: date.format("%B").to_string(),
            day: date.day().to_string(),
            year: date.year().to_string(),
            content: split_text_blob(&entry.content),
            image: split_text_blob(&entry.image),
        })
    }

    /// Builds the view for a one-off page. The uid stands in for the title;
    /// navigation links and date parts stay empty.
    pub fn from_one_off(one_off: &OneOff) -> EntryView {
        EntryView {
            title: one_off.uid.clone(),
            content: split_text_blob(&one_off.content),
            image: split_text_blob(&one_off.image),
            ..EntryView::default()
        }
    }
}

fn link_path(link: Option<EntryId>) -> String {
    link.map(entry_path).unwrap_or_default()
}
