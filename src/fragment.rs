// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Parsing of badge SVG documents into composable fragments.
//!
//! The parser is intentionally shallow: it reads the numeric `width` and
//! `height` attributes of the root `<svg>` opening tag and slices out the
//! markup between that tag and the last `</svg>`. No structural validation is
//! performed.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Width assumed when the root element declares none.
pub const DEFAULT_WIDTH: u32 = 0;
/// Height assumed when the root element declares none.
pub const DEFAULT_HEIGHT: u32 = 20;

static ROOT_TAG: LazyLock<Regex,> = LazyLock::new(|| compile(r"<svg\b[^>]*>",),);
static ROOT_WIDTH: LazyLock<Regex,> = LazyLock::new(|| compile(r#"\swidth="(\d+)""#,),);
static ROOT_HEIGHT: LazyLock<Regex,> = LazyLock::new(|| compile(r#"\sheight="(\d+)""#,),);
const CLOSING_TAG: &str = "</svg>";

fn compile(pattern: &str,) -> Regex
{
    Regex::new(pattern,).unwrap_or_else(|error| panic!("invalid pattern {pattern}: {error}"),)
}

/// Dimensions and inner markup of a single badge document.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ParsedSvg
{
    /// Declared width, or [`DEFAULT_WIDTH`].
    pub width:        u32,
    /// Declared height, or [`DEFAULT_HEIGHT`].
    pub height:       u32,
    /// Markup between the root opening tag and the final closing tag.
    pub inner_markup: String,
}

/// A parsed badge positioned inside a combined document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct BadgeFragment
{
    /// Name of the source file inside the assets directory.
    pub filename:     String,
    /// Width of the fragment in pixels.
    pub width:        u32,
    /// Height of the fragment in pixels.
    pub height:       u32,
    /// Inner markup copied verbatim into the combined document.
    #[serde(skip)]
    pub inner_markup: String,
    /// Horizontal offset equal to the sum of all preceding widths.
    pub x_offset:     u32,
}

/// Parses the root dimensions and inner markup of an SVG document.
///
/// Missing dimensions fall back to [`DEFAULT_WIDTH`] and [`DEFAULT_HEIGHT`]
/// silently; a document without a root element yields empty markup.
///
/// # Examples
///
/// ```
/// use badgesmith::parse_fragment;
///
/// let parsed = parse_fragment(r#"<svg xmlns="http://www.w3.org/2000/svg" width="88" height="28"><rect width="10"/></svg>"#,);
/// assert_eq!((parsed.width, parsed.height), (88, 28));
/// assert_eq!(parsed.inner_markup, r#"<rect width="10"/>"#);
/// ```
pub fn parse_fragment(svg: &str,) -> ParsedSvg
{
    let Some(root,) = ROOT_TAG.find(svg,) else {
        return ParsedSvg {
            width:        DEFAULT_WIDTH,
            height:       DEFAULT_HEIGHT,
            inner_markup: String::new(),
        };
    };

    let tag = root.as_str();
    let width = numeric_attribute(&ROOT_WIDTH, tag,).unwrap_or(DEFAULT_WIDTH,);
    let height = numeric_attribute(&ROOT_HEIGHT, tag,).unwrap_or(DEFAULT_HEIGHT,);

    let body = &svg[root.end()..];
    let inner_markup = match body.rfind(CLOSING_TAG,) {
        Some(end,) => body[..end].to_owned(),
        None => String::new(),
    };

    ParsedSvg {
        width,
        height,
        inner_markup,
    }
}

fn numeric_attribute(pattern: &Regex, tag: &str,) -> Option<u32,>
{
    pattern
        .captures(tag,)
        .and_then(|captures| captures.get(1,),)
        .and_then(|value| value.as_str().parse().ok(),)
}
