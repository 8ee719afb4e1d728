// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Utilities for deriving badge filenames from remote badge URLs.
//!
//! Slugs produced by this module contain only lowercase ASCII alphanumeric
//! characters and hyphens. Every character outside `[a-z0-9]` maps to exactly
//! one hyphen, so the slug keeps the shape of the source segment (for example
//! the colour suffix of a shields.io badge survives as `pnpm-f69220`).

use reqwest::Url;

/// Path segment used by badge services for their generic endpoint.
const GENERIC_SEGMENT: &str = "badge";
/// Query parameter consulted when the path segment is generic.
const LOGO_PARAMETER: &str = "logo";

/// Builder for slug strings derived from a single URL path segment.
#[derive(Debug, Clone, Copy,)]
pub struct SlugStrategy<'input,>
{
    source: &'input str,
}

impl<'input,> SlugStrategy<'input,>
{
    /// Creates a new slug builder for the provided string slice.
    ///
    /// The builder retains a borrowed view of the source to avoid allocations
    /// until [`build`](Self::build) is invoked.
    pub fn builder(source: &'input str,) -> Self
    {
        Self {
            source,
        }
    }

    /// Builds a slug by lower-casing ASCII letters and replacing every other
    /// character outside `[a-z0-9]` with a hyphen.
    ///
    /// # Examples
    ///
    /// ```
    /// use badgesmith::SlugStrategy;
    ///
    /// let slug = SlugStrategy::builder("Node.js-339933",).build();
    /// assert_eq!(slug, "node-js-339933");
    /// ```
    pub fn build(self,) -> String
    {
        self.source
            .chars()
            .map(|candidate| match candidate.to_ascii_lowercase() {
                lowered @ ('a'..='z' | '0'..='9') => lowered,
                _ => '-',
            },)
            .collect()
    }
}

/// Derives the slug for a badge URL from its final path segment.
///
/// When the segment is empty or equals the generic `badge` endpoint, the
/// `logo` query parameter is used instead if present.
///
/// # Examples
///
/// ```
/// use badgesmith::derive_badge_slug;
///
/// let url = "https://img.shields.io/badge/pnpm-F69220?style=for-the-badge&logo=pnpm";
/// assert_eq!(derive_badge_slug(url,), "pnpm-f69220");
/// ```
pub fn derive_badge_slug(url: &str,) -> String
{
    let segment = match Url::parse(url,) {
        Ok(parsed,) => resolve_segment(&parsed,),
        Err(_,) => fallback_segment(url,).to_owned(),
    };

    SlugStrategy::builder(&segment,).build()
}

/// Builds the on-disk filename `NN-slug.svg` for the `sequence`-th URL.
///
/// `sequence` is 1-based and rendered with at least two digits.
pub fn badge_filename(sequence: usize, url: &str,) -> String
{
    format!("{sequence:02}-{}.svg", derive_badge_slug(url))
}

fn resolve_segment(url: &Url,) -> String
{
    let segment = url.path().rsplit('/',).next().unwrap_or_default();

    if segment.is_empty() || segment == GENERIC_SEGMENT {
        let logo = url
            .query_pairs()
            .find(|(key, value,)| key == LOGO_PARAMETER && !value.is_empty(),)
            .map(|(_, value,)| value.into_owned(),);
        if let Some(logo,) = logo {
            return logo;
        }
        if segment.is_empty() {
            return GENERIC_SEGMENT.to_owned();
        }
    }

    segment.to_owned()
}

fn fallback_segment(url: &str,) -> &str
{
    let end = url.find(['?', '#',],).unwrap_or(url.len(),);
    let trimmed = &url[..end];
    trimmed.rsplit('/',).next().unwrap_or(trimmed,)
}
