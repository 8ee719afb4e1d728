//! Utilities for collecting badge images and composing them into strips.
//!
//! The library covers two independent flows. The fetch flow extracts badge
//! URLs from a markdown document and downloads them one by one into an assets
//! directory as `NN-slug.svg`. The compose flow reads configured groups of
//! those files and lays each group out horizontally into a single SVG.

mod compose;
mod config;
mod error;
mod extract;
mod fetch;
mod fragment;
mod slug;

pub use compose::{Composition, Layout, compose_all, compose_group, render_combined_svg};
pub use config::{BadgeGroup, ComposeConfig, GroupEntry, GroupsDocument};
pub use error::{Error, badge_io_error, io_error, svg_io_error};
pub use extract::extract_badge_urls;
pub use fetch::{BadgeFetch, FetchFailure, FetchSummary, HttpFetcher, fetch_all, fetch_from_markdown};
pub use fragment::{BadgeFragment, DEFAULT_HEIGHT, DEFAULT_WIDTH, ParsedSvg, parse_fragment};
pub use slug::{SlugStrategy, badge_filename, derive_badge_slug};
