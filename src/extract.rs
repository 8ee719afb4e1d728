// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Extraction of badge image URLs from markdown documents.
//!
//! Only HTML `<img>` tags whose first attribute is a double-quoted `src` are
//! recognized, which is how badge tables are usually written in README-style
//! documents. All other attributes are ignored.

use std::sync::LazyLock;

use regex::Regex;

static IMG_SRC: LazyLock<Regex,> = LazyLock::new(|| {
    Regex::new(r#"<img\s+src="([^"]+)""#,).unwrap_or_else(|error| panic!("invalid pattern: {error}"),)
},);

/// Returns every image URL referenced by an `<img src="...">` tag.
///
/// The result preserves document order and keeps duplicates. A document
/// without image tags yields an empty vector.
///
/// # Examples
///
/// ```
/// use badgesmith::extract_badge_urls;
///
/// let markdown = r#"<img src="https://a.example/one.svg"/> <img src="https://a.example/two.svg"/>"#;
/// let urls = extract_badge_urls(markdown,);
/// assert_eq!(urls, ["https://a.example/one.svg", "https://a.example/two.svg"]);
/// ```
pub fn extract_badge_urls(markdown: &str,) -> Vec<String,>
{
    IMG_SRC
        .captures_iter(markdown,)
        .filter_map(|captures| captures.get(1,),)
        .map(|url| url.as_str().to_owned(),)
        .collect()
}
