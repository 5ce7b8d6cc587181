//! Builds the year-grouped history index from a flat list of
//! [`HistoryRecord`]s.

use crate::entry::{entry_path, published_at, HistoryRecord, TimestampError};
use chrono::Datelike;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// A single link in the history index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryLink {
    pub title: String,
    pub path: String,
}

/// All entries published in one calendar year, most recent first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryYear {
    pub year: i32,
    pub entries: Vec<HistoryLink>,
}

/// The history index: one [`HistoryYear`] per year with at least one entry,
/// most recent year first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryView(pub Vec<HistoryYear>);

impl HistoryView {
    /// Groups `records` by the UTC calendar year of their ids. Both the year
    /// groups and the entries within a group are sorted descending, so the
    /// result does not depend on the order of `records`.
    ///
    /// Every record lands in exactly one group. A record whose id has no
    /// calendar year fails the whole index rather than being left out.
    pub fn from_history(records: &[HistoryRecord]) -> Result<HistoryView, TimestampError> {
        let mut years: BTreeMap<Reverse<i32>, Vec<&HistoryRecord>> = BTreeMap::new();
        for record in records {
            let year = published_at(record.id)?.year();
            years.entry(Reverse(year)).or_default().push(record);
        }

        Ok(HistoryView(
            years
                .into_iter()
                .map(|(Reverse(year), mut records)| {
                    records.sort_by_key(|r| Reverse(r.id));
                    HistoryYear {
                        year,
                        entries: records
                            .into_iter()
                            .map(|r| HistoryLink {
                                title: r.title.clone(),
                                path: entry_path(r.id),
                            })
                            .collect(),
                    }
                })
                .collect(),
        ))
    }

    /// The year groups, most recent first.
    pub fn years(&self) -> &[HistoryYear] {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // 2020-06-01T00:00:00Z, 2021-01-01T00:00:00Z, 2021-06-01T00:00:00Z
    const JUNE_2020: i64 = 1590969600;
    const JAN_2021: i64 = 1609459200;
    const JUNE_2021: i64 = 1622505600;

    fn record(id: i64, title: &str) -> HistoryRecord {
        HistoryRecord {
            id,
            title: title.to_owned(),
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(Ok(HistoryView::default()), HistoryView::from_history(&[]));
    }

    #[test]
    fn test_two_years() {
        let view =
            HistoryView::from_history(&[record(JUNE_2020, "a"), record(JUNE_2021, "b")]).unwrap();
        assert_eq!(
            vec![
                HistoryYear {
                    year: 2021,
                    entries: vec![HistoryLink {
                        title: "b".to_owned(),
                        path: format!("/entry/{}", JUNE_2021),
                    }],
                },
                HistoryYear {
                    year: 2020,
                    entries: vec![HistoryLink {
                        title: "a".to_owned(),
                        path: format!("/entry/{}", JUNE_2020),
                    }],
                },
            ],
            view.0
        );
    }

    #[test]
    fn test_sorted_regardless_of_input_order() {
        let records = vec![
            record(JAN_2021, "new year"),
            record(JUNE_2020, "summer"),
            record(JUNE_2021, "later"),
        ];
        let view = HistoryView::from_history(&records).unwrap();

        let years: Vec<i32> = view.years().iter().map(|y| y.year).collect();
        assert_eq!(vec![2021, 2020], years);

        let titles: Vec<&str> = view.years()[0]
            .entries
            .iter()
            .map(|l| l.title.as_str())
            .collect();
        assert_eq!(vec!["later", "new year"], titles);
    }

    #[test]
    fn test_every_record_appears_once() {
        let records: Vec<HistoryRecord> = (0..40)
            .map(|i| record(JUNE_2020 + i * 2_000_000, &format!("title {}", i)))
            .collect();
        let view = HistoryView::from_history(&records).unwrap();

        let mut titles: Vec<String> = view
            .years()
            .iter()
            .flat_map(|y| y.entries.iter().map(|l| l.title.clone()))
            .collect();
        titles.sort();
        let mut expected: Vec<String> = records.iter().map(|r| r.title.clone()).collect();
        expected.sort();
        assert_eq!(expected, titles);
    }

    #[test]
    fn test_unrepresentable_id_is_an_error() {
        let far_future = 9_000_000_000_000;
        assert_eq!(
            Err(TimestampError(far_future)),
            HistoryView::from_history(&[record(JUNE_2020, "ok"), record(far_future, "lost")])
        );
    }
}
