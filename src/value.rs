//! Converts view models into [`Value`]s for templating. Keys use the field
//! names existing templates were written against (`.Title`, `.NextPath`,
//! `.Metadata`, ...), so they render unchanged.

use crate::history::{HistoryLink, HistoryView, HistoryYear};
use crate::view::EntryView;
use gtmpl_value::Value;
use std::collections::HashMap;

fn strings(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| Value::String(s.clone())).collect())
}

impl From<&EntryView> for Value {
    fn from(view: &EntryView) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Title".to_owned(), Value::String(view.title.clone()));
        m.insert("NextPath".to_owned(), Value::String(view.next_path.clone()));
        m.insert("PrevPath".to_owned(), Value::String(view.prev_path.clone()));
        m.insert("Month".to_owned(), Value::String(view.month.clone()));
        m.insert("Day".to_owned(), Value::String(view.day.clone()));
        m.insert("Year".to_owned(), Value::String(view.year.clone()));
        m.insert("Content".to_owned(), strings(&view.content));
        m.insert("Image".to_owned(), strings(&view.image));
        Value::Object(m)
    }
}

impl From<&HistoryLink> for Value {
    fn from(link: &HistoryLink) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Title".to_owned(), Value::String(link.title.clone()));
        m.insert("Path".to_owned(), Value::String(link.path.clone()));
        Value::Object(m)
    }
}

impl From<&HistoryYear> for Value {
    fn from(year: &HistoryYear) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Year".to_owned(), Value::from(year.year));
        m.insert(
            "Metadata".to_owned(),
            Value::Array(year.entries.iter().map(Value::from).collect()),
        );
        Value::Object(m)
    }
}

impl From<&HistoryView> for Value {
    fn from(history: &HistoryView) -> Value {
        Value::Array(history.years().iter().map(Value::from).collect())
    }
}
