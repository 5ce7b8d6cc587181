//! The library code for the `almanac` blog server. A request passes through
//! three distinct steps:
//!
//! 1. Reading entries from the store ([`crate::store`])
//! 2. Converting them into view models ([`crate::view`], [`crate::history`],
//!    [`crate::feed`])
//! 3. Rendering the view models ([`crate::render`] for pages, [`crate::feed`]
//!    for syndication formats)
//!
//! The second step holds the interesting logic. Entry pages derive their
//! previous/next links and calendar date from the entry id, which is the Unix
//! timestamp the entry was published at (always read in UTC). The history
//! page groups every entry by year, newest year first and newest entry first
//! within a year. Feeds list the most recent entries with a description cut
//! from the first characters of each entry's stored text.
//!
//! Stored text blobs separate paragraphs with the two characters `\n` rather
//! than a real newline; [`crate::text`] splits them.
//!
//! The view-building steps are pure functions and never log. The HTTP
//! boundary ([`crate::serve`]) owns the store handle and the parsed templates,
//! and [`crate::error`] decides how each failure is reported.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod config;
pub mod entry;
pub mod error;
pub mod feed;
pub mod history;
pub mod render;
pub mod serve;
pub mod store;
pub mod text;
pub mod value;
pub mod view;
