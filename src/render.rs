//! Loads the page templates and renders view models through them.
//!
//! Templates use Go's `text/template` syntax (via `gtmpl`). Three files are
//! expected in the templates directory, one per [`Page`]. Entry and landing
//! pages receive an [`EntryView`]; the history page receives the list of year
//! groups of a [`HistoryView`]. See [`crate::value`] for the field names.

use crate::history::HistoryView;
use crate::view::EntryView;
use gtmpl::{Context, Template, Value};
use std::path::{Path, PathBuf};

/// The pages this crate knows how to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    /// A single entry or one-off page.
    Entry,
    /// The front page, showing the most recent entry.
    Landing,
    /// The year-grouped index of all entries.
    History,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Entry, Page::Landing, Page::History];

    /// The template file for this page, relative to the templates directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Page::Entry => "entry.html",
            Page::Landing => "index.html",
            Page::History => "history.html",
        }
    }
}

/// The parsed template set. Parsed once at startup and shared read-only
/// between requests.
pub struct Templates {
    entry: Template,
    landing: Template,
    history: Template,
}

impl Templates {
    /// Reads and parses every [`Page`] template from `dir`.
    pub fn load(dir: &Path) -> Result<Templates> {
        let read = |page: Page| -> Result<String> {
            let path = dir.join(page.file_name());
            std::fs::read_to_string(&path).map_err(|err| Error::Read { path, err })
        };
        Templates::from_sources(
            &read(Page::Entry)?,
            &read(Page::Landing)?,
            &read(Page::History)?,
        )
    }

    /// Parses templates from already loaded sources.
    pub fn from_sources(entry: &str, landing: &str, history: &str) -> Result<Templates> {
        Ok(Templates {
            entry: parse_template(Page::Entry, entry)?,
            landing: parse_template(Page::Landing, landing)?,
            history: parse_template(Page::History, history)?,
        })
    }

    pub fn render_entry(&self, view: &EntryView) -> Result<String> {
        self.render(Page::Entry, Value::from(view))
    }

    pub fn render_landing(&self, view: &EntryView) -> Result<String> {
        self.render(Page::Landing, Value::from(view))
    }

    pub fn render_history(&self, history: &HistoryView) -> Result<String> {
        self.render(Page::History, Value::from(history))
    }

    fn template(&self, page: Page) -> &Template {
        match page {
            Page::Entry => &self.entry,
            Page::Landing => &self.landing,
            Page::History => &self.history,
        }
    }

    fn render(&self, page: Page, value: Value) -> Result<String> {
        let context = Context::from(value).map_err(|err| Error::Execute {
            page,
            message: err.to_string(),
        })?;
        let mut out: Vec<u8> = Vec::new();
        self.template(page)
            .execute(&mut out, &context)
            .map_err(|err| Error::Execute {
                page,
                message: err.to_string(),
            })?;
        String::from_utf8(out).map_err(|_| Error::Execute {
            page,
            message: "output is not valid utf-8".to_owned(),
        })
    }
}

fn parse_template(page: Page, source: &str) -> Result<Template> {
    let mut template = Template::default();
    template.parse(source).map_err(|err| Error::Parse {
        page,
        message: err.to_string(),
    })?;
    Ok(template)
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading or executing a template.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a template file cannot be read.
    #[error("Opening template file '{}': {err}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when a template fails to parse.
    #[error("Parsing {} template: {message}", page.file_name())]
    Parse { page: Page, message: String },

    /// Returned when a template fails while rendering.
    #[error("Executing {} template: {message}", page.file_name())]
    Execute { page: Page, message: String },
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::history::{HistoryLink, HistoryYear};

    const ENTRY: &str = "{{.Title}}|{{.NextPath}}|{{.Month}} {{.Day}}, {{.Year}}|{{range .Content}}<p>{{.}}</p>{{end}}";
    const LANDING: &str = "latest: {{.Title}}";
    const HISTORY: &str =
        "{{range .}}[{{.Year}}{{range .Metadata}} {{.Title}}={{.Path}}{{end}}]{{end}}";

    fn templates() -> Templates {
        Templates::from_sources(ENTRY, LANDING, HISTORY).unwrap()
    }

    #[test]
    fn test_render_entry() {
        let view = EntryView {
            title: "Hello".to_owned(),
            next_path: "/entry/42".to_owned(),
            month: "March".to_owned(),
            day: "15".to_owned(),
            year: "2017".to_owned(),
            content: vec!["one".to_owned(), "two".to_owned()],
            ..EntryView::default()
        };
        assert_eq!(
            "Hello|/entry/42|March 15, 2017|<p>one</p><p>two</p>",
            templates().render_entry(&view).unwrap()
        );
    }

    #[test]
    fn test_render_landing() {
        let view = EntryView {
            title: "Newest".to_owned(),
            ..EntryView::default()
        };
        assert_eq!("latest: Newest", templates().render_landing(&view).unwrap());
    }

    #[test]
    fn test_render_history() {
        let history = HistoryView(vec![
            HistoryYear {
                year: 2021,
                entries: vec![HistoryLink {
                    title: "b".to_owned(),
                    path: "/entry/2".to_owned(),
                }],
            },
            HistoryYear {
                year: 2020,
                entries: vec![HistoryLink {
                    title: "a".to_owned(),
                    path: "/entry/1".to_owned(),
                }],
            },
        ]);
        assert_eq!(
            "[2021 b=/entry/2][2020 a=/entry/1]",
            templates().render_history(&history).unwrap()
        );
    }

    #[test]
    fn test_parse_error_names_page() {
        match Templates::from_sources(ENTRY, "{{.Title", HISTORY) {
            Err(Error::Parse { page, .. }) => assert_eq!(Page::Landing, page),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected a parse error"),
        }
    }

    #[test]
    fn test_load_missing_directory() {
        match Templates::load(Path::new("/nonexistent/almanac/templates")) {
            Err(Error::Read { path, .. }) => assert!(path.ends_with("entry.html")),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected a read error"),
        }
    }

    #[test]
    fn test_shipped_templates_parse() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        let templates = Templates::load(&dir).unwrap();
        let view = EntryView {
            title: "Hello".to_owned(),
            content: vec!["Hi".to_owned()],
            image: vec![String::new()],
            ..EntryView::default()
        };
        assert!(templates.render_entry(&view).unwrap().contains("Hello"));
        assert!(templates.render_landing(&view).unwrap().contains("Hi"));
    }
}
