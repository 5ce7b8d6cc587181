//! Support for creating Atom, RSS and JSON feeds from the most recent entries.
//!
//! [`Feed::new`] turns a list of [`Entry`]s into [`FeedItem`]s (truncating each
//! entry's raw content into a short description), and [`Feed::render`]
//! serializes the result in the format selected by a [`FeedKind`].

use crate::config::Author;
use crate::entry::{entry_path, published_at, Entry, EntryId, TimestampError};
use atom_syndication as atom;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// The number of entries in a feed unless configured otherwise.
pub const DEFAULT_RECENT: usize = 15;

/// The number of content characters kept in an item description unless
/// configured otherwise.
pub const DEFAULT_DESCRIPTION_CUTOFF: usize = 50;

/// Appended to every item description, truncated or not.
pub const ELLIPSIS: &str = "...";

/// The static identity of the feed. None of it is derived from entries.
#[derive(Clone, Debug, Deserialize)]
pub struct FeedConfig {
    pub title: String,

    /// The site's base URL, without a trailing slash. Item links are built by
    /// appending `/entry/{id}` to it.
    pub link: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub author: Option<Author>,

    /// When the site was created, as a Unix timestamp.
    pub created: EntryId,
}

/// The three supported output formats, selected by the last path segment of
/// `/feeds/{type}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedKind {
    Atom,
    Rss,
    JsonFeed,
}

impl FeedKind {
    pub const ALL: [FeedKind; 3] = [FeedKind::Atom, FeedKind::Rss, FeedKind::JsonFeed];

    /// Validates a feed type selector. An absent (or empty) selector and an
    /// unknown one are reported as different errors.
    pub fn from_selector(selector: Option<&str>) -> Result<FeedKind> {
        match selector {
            None | Some("") => Err(Error::MissingType),
            Some(selector) => FeedKind::ALL
                .iter()
                .copied()
                .find(|kind| kind.selector() == selector)
                .ok_or_else(|| Error::InvalidType(selector.to_owned())),
        }
    }

    /// The path segment that selects this format.
    pub fn selector(self) -> &'static str {
        match self {
            FeedKind::Atom => "atom.xml",
            FeedKind::Rss => "rss.xml",
            FeedKind::JsonFeed => "jsonfeed.json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            FeedKind::Atom => "application/atom+xml; charset=utf-8",
            FeedKind::Rss => "application/rss+xml; charset=utf-8",
            FeedKind::JsonFeed => "application/feed+json; charset=utf-8",
        }
    }
}

/// One entry as it appears in a feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,

    /// The entry id in decimal.
    pub id: String,

    /// Absolute URL of the entry page.
    pub link: String,

    /// The first characters of the entry's raw content followed by
    /// [`ELLIPSIS`].
    pub description: String,

    pub created_at: DateTime<Utc>,
}

impl FeedItem {
    /// Converts an entry into a feed item. The description is cut from the
    /// stored blob as-is, so blob delimiters inside the first `cutoff`
    /// characters show up literally.
    pub fn from_entry(entry: &Entry, base_url: &str, cutoff: usize) -> Result<FeedItem> {
        Ok(FeedItem {
            title: entry.title.clone(),
            id: entry.id.to_string(),
            link: format!("{}{}", base_url, entry_path(entry.id)),
            description: format!("{}{}", truncate(&entry.content, cutoff), ELLIPSIS),
            created_at: published_at(entry.id)?,
        })
    }
}

/// Returns at most the first `max_chars` characters of `s`. Counts characters
/// rather than bytes so a multi-byte code point is never split.
fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// A feed ready to be serialized: the configured identity plus one
/// [`FeedItem`] per entry, in the order the entries were given.
#[derive(Clone, Debug)]
pub struct Feed {
    pub config: FeedConfig,
    pub items: Vec<FeedItem>,
}

impl Feed {
    /// Creates a feed from some configuration ([`FeedConfig`]) and the most
    /// recent entries, newest first.
    pub fn new(config: &FeedConfig, entries: &[Entry], cutoff: usize) -> Result<Feed> {
        Ok(Feed {
            items: entries
                .iter()
                .map(|entry| FeedItem::from_entry(entry, &config.link, cutoff))
                .collect::<Result<_>>()?,
            config: config.clone(),
        })
    }

    /// Serializes the feed in the requested format.
    pub fn render(&self, kind: FeedKind) -> Result<String> {
        match kind {
            FeedKind::Atom => self.to_atom(),
            FeedKind::Rss => self.to_rss(),
            FeedKind::JsonFeed => self.to_json_feed(),
        }
    }

    fn created(&self) -> Result<DateTime<Utc>> {
        Ok(published_at(self.config.created)?)
    }

    /// The newest item's date, or the site's creation date for an empty feed.
    fn updated(&self) -> Result<DateTime<Utc>> {
        match self.items.iter().map(|item| item.created_at).max() {
            Some(updated) => Ok(updated),
            None => self.created(),
        }
    }

    pub fn to_atom(&self) -> Result<String> {
        let mut feed = atom::Feed::default();
        feed.set_title(atom::Text::plain(self.config.title.clone()));
        feed.set_id(self.config.link.clone());
        feed.set_updated(fixed(self.updated()?));
        feed.set_authors(self.atom_authors());
        feed.set_links(vec![atom_link(&self.config.link)]);
        if !self.config.description.is_empty() {
            feed.set_subtitle(Some(atom::Text::plain(self.config.description.clone())));
        }

        feed.set_entries(
            self.items
                .iter()
                .map(|item| {
                    let date = fixed(item.created_at);
                    let mut entry = atom::Entry::default();
                    entry.set_id(item.link.clone());
                    entry.set_title(atom::Text::plain(item.title.clone()));
                    entry.set_updated(date);
                    entry.set_published(Some(date));
                    entry.set_links(vec![atom_link(&item.link)]);
                    entry.set_summary(Some(atom::Text::plain(item.description.clone())));
                    entry
                })
                .collect::<Vec<_>>(),
        );

        Ok(String::from_utf8(feed.write_to(Vec::new())?)?)
    }

    fn atom_authors(&self) -> Vec<atom::Person> {
        match &self.config.author {
            Some(author) => {
                let mut person = atom::Person::default();
                person.set_name(author.name.clone());
                person.set_email(author.email.clone());
                vec![person]
            }
            None => Vec::new(),
        }
    }

    pub fn to_rss(&self) -> Result<String> {
        let mut channel = rss::Channel::default();
        channel.set_title(self.config.title.clone());
        channel.set_link(self.config.link.clone());
        channel.set_description(self.config.description.clone());
        channel.set_pub_date(Some(self.created()?.to_rfc2822()));
        if let Some(author) = &self.config.author {
            channel.set_managing_editor(author.email.as_ref().map(|email| {
                format!("{} ({})", email, author.name)
            }));
        }

        channel.set_items(
            self.items
                .iter()
                .map(|item| {
                    let mut guid = rss::Guid::default();
                    guid.set_value(item.link.clone());
                    guid.set_permalink(true);

                    let mut rss_item = rss::Item::default();
                    rss_item.set_title(Some(item.title.clone()));
                    rss_item.set_link(Some(item.link.clone()));
                    rss_item.set_description(Some(item.description.clone()));
                    rss_item.set_guid(Some(guid));
                    rss_item.set_pub_date(Some(item.created_at.to_rfc2822()));
                    rss_item
                })
                .collect::<Vec<_>>(),
        );

        Ok(String::from_utf8(channel.write_to(Vec::new())?)?)
    }

    pub fn to_json_feed(&self) -> Result<String> {
        let feed = JsonFeed {
            version: JSON_FEED_VERSION,
            title: &self.config.title,
            home_page_url: &self.config.link,
            description: &self.config.description,
            authors: self
                .config
                .author
                .iter()
                .map(|author| JsonFeedAuthor { name: &author.name })
                .collect(),
            items: self
                .items
                .iter()
                .map(|item| JsonFeedItem {
                    id: &item.id,
                    url: &item.link,
                    title: &item.title,
                    summary: &item.description,
                    date_published: item.created_at.to_rfc3339(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&feed)?)
    }
}

fn fixed(date: DateTime<Utc>) -> DateTime<FixedOffset> {
    date.into()
}

fn atom_link(href: &str) -> atom::Link {
    let mut link = atom::Link::default();
    link.set_href(href);
    link.set_rel("alternate");
    link
}

const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version/1.1";

#[derive(Serialize)]
struct JsonFeed<'a> {
    version: &'static str,
    title: &'a str,
    home_page_url: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    authors: Vec<JsonFeedAuthor<'a>>,
    items: Vec<JsonFeedItem<'a>>,
}

#[derive(Serialize)]
struct JsonFeedAuthor<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct JsonFeedItem<'a> {
    id: &'a str,
    url: &'a str,
    title: &'a str,
    summary: &'a str,
    date_published: String,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem validating a feed request or creating a feed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when no feed type was given.
    #[error("no feed type specified")]
    MissingType,

    /// Returned when the feed type is not one of `atom.xml`, `rss.xml` or
    /// `jsonfeed.json`.
    #[error("invalid feed type `{0}`")]
    InvalidType(String),

    /// Returned when an entry id (or the site's creation date) cannot be read
    /// as a timestamp.
    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    /// Returned when there is an Atom-related error.
    #[error("writing atom feed: {0}")]
    Atom(#[from] atom::Error),

    /// Returned when there is an RSS-related error.
    #[error("writing rss feed: {0}")]
    Rss(#[from] rss::Error),

    /// Returned when the JSON feed cannot be serialized.
    #[error("writing json feed: {0}")]
    Json(#[from] serde_json::Error),

    /// Returned when a serializer produced invalid UTF-8.
    #[error("feed is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
